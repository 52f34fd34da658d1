/// Crawl state definitions
///
/// This module defines the states the coordinator moves through during one
/// harvest run and which moves between them are legal.
use std::fmt;

/// Represents the current state of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Setup =====
    /// Nothing has happened yet
    Idle,

    /// The browser process is starting
    LaunchingBrowser,

    // ===== Page loop =====
    /// The list page is loading list page `page`
    Navigating { page: u32 },

    /// Records or detail links are being read from list page `page`
    Extracting { page: u32 },

    /// Detail pages linked from list page `page` are being visited
    DetailLoop { page: u32 },

    /// List page `page` is finished
    Advancing { page: u32 },

    // ===== Terminal =====
    /// Browser resources are released
    Closed,
}

impl CrawlState {
    /// Returns true if moving from this state to `next` is allowed
    ///
    /// Any non-terminal state may move to `Closed`. Page numbers never move
    /// backwards and only `Advancing` may start the next page.
    pub fn can_transition_to(&self, next: &CrawlState) -> bool {
        use CrawlState::*;

        match (*self, *next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Idle, LaunchingBrowser) => true,
            (LaunchingBrowser, Navigating { page }) => page == 1,
            (Navigating { page: a }, Extracting { page: b }) => a == b,
            (Navigating { page: a }, Advancing { page: b }) => a == b,
            (Extracting { page: a }, DetailLoop { page: b }) => a == b,
            (Extracting { page: a }, Advancing { page: b }) => a == b,
            (DetailLoop { page: a }, Advancing { page: b }) => a == b,
            (Advancing { page: a }, Navigating { page: b }) => b == a + 1,
            _ => false,
        }
    }

    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns the list page this state refers to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Navigating { page }
            | Self::Extracting { page }
            | Self::DetailLoop { page }
            | Self::Advancing { page } => Some(*page),
            Self::Idle | Self::LaunchingBrowser | Self::Closed => None,
        }
    }

    /// Returns a short name for log output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LaunchingBrowser => "launching_browser",
            Self::Navigating { .. } => "navigating",
            Self::Extracting { .. } => "extracting",
            Self::DetailLoop { .. } => "detail_loop",
            Self::Advancing { .. } => "advancing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page() {
            Some(page) => write!(f, "{}(page {})", self.name(), page),
            None => write!(f, "{}", self.name()),
        }
    }
}
