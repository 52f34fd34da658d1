use std::path::PathBuf;
use std::time::Duration;

/// Pages scanned when the caller does not say otherwise
pub const DEFAULT_PAGE_COUNT: u32 = 2;

/// Pacing delay between list pages when the caller does not say otherwise
pub const DEFAULT_INTER_PAGE_DELAY_SECS: f64 = 2.0;

/// Main configuration structure for a harvest run
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// First list page of the directory
    pub start_url: String,

    /// Number of list pages to visit (1-50)
    pub page_count: u32,

    /// Pause before each list page after the first (seconds, 0.5-10.0)
    ///
    /// Detail pages are paced at half this value.
    pub inter_page_delay_secs: f64,

    /// Browser behavior
    pub browser: BrowserSettings,
}

impl HarvestConfig {
    /// Creates a configuration with default pacing and browser settings
    ///
    /// Surrounding whitespace is removed from `start_url`.
    pub fn new(start_url: impl Into<String>) -> Self {
        let start_url: String = start_url.into();
        Self {
            start_url: start_url.trim().to_string(),
            page_count: DEFAULT_PAGE_COUNT,
            inter_page_delay_secs: DEFAULT_INTER_PAGE_DELAY_SECS,
            browser: BrowserSettings::default(),
        }
    }

    /// Delay applied before every list page except the first
    pub fn inter_page_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.inter_page_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Delay applied after each detail page
    pub fn detail_delay(&self) -> Duration {
        self.inter_page_delay() / 2
    }
}

/// Browser launch and navigation settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,

    /// Additional command-line switches passed to the browser
    pub extra_args: Vec<String>,

    /// Navigation timeout for list pages
    pub list_navigation_timeout: Duration,

    /// Navigation timeout for detail pages
    pub detail_navigation_timeout: Duration,

    /// Timeout for a single DevTools protocol request
    pub request_timeout: Duration,

    /// Per-site waits used by the extractors
    pub timings: SiteTimings,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            extra_args: Vec::new(),
            list_navigation_timeout: Duration::from_secs(45),
            detail_navigation_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            timings: SiteTimings::default(),
        }
    }
}

/// Bounded waits applied while extracting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTimings {
    /// How long the listing family may take to render its detail links
    pub listing_link_wait: Duration,

    /// How long the directory family may take to render its entry headings
    pub directory_heading_wait: Duration,

    /// Extra pause letting the directory decoding scripts finish
    pub directory_settle: Duration,
}

impl Default for SiteTimings {
    fn default() -> Self {
        Self {
            listing_link_wait: Duration::from_secs(10),
            directory_heading_wait: Duration::from_secs(15),
            directory_settle: Duration::from_secs(2),
        }
    }
}

impl SiteTimings {
    /// Timings without any waiting, for pages that are already complete
    pub fn immediate() -> Self {
        Self {
            listing_link_wait: Duration::ZERO,
            directory_heading_wait: Duration::ZERO,
            directory_settle: Duration::ZERO,
        }
    }
}
