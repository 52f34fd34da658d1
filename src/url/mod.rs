//! URL handling module for Directory-Harvest
//!
//! This module provides host extraction, site-family classification and the
//! pagination address resolver.

mod domain;
mod pagination;

// Re-export main functions
pub use domain::extract_domain;
pub use pagination::resolve_page_url;

use std::fmt;

/// Host fragment identifying the listing (detail-crawl) site family
pub const LISTING_HOST_MARKER: &str = "make-it-in-germany";

/// Host fragment identifying the directory (list-page) site family
pub const DIRECTORY_HOST_MARKER: &str = "altenpflege.de";

/// The two supported site families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteFamily {
    /// List pages link out to one detail page per entry
    Listing,
    /// List pages carry complete entries, decoded by client-side script
    Directory,
}

impl SiteFamily {
    /// Returns true if this family needs a second navigation per entry
    pub fn crawls_details(&self) -> bool {
        matches!(self, Self::Listing)
    }

    /// Returns a short name for log output
    pub fn name(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Directory => "directory",
        }
    }
}

impl fmt::Display for SiteFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classifies a URL into one of the known site families
///
/// The host is matched by substring against a fixed table:
/// 1. Listing family (`make-it-in-germany`)
/// 2. Directory family (`altenpflege.de`)
///
/// URLs that cannot be parsed or whose host matches neither entry are not
/// supported and yield `None`.
///
/// # Examples
///
/// ```
/// use directory_harvest::url::{classify_site, SiteFamily};
///
/// assert_eq!(
///     classify_site("https://www.make-it-in-germany.com/de/jobs"),
///     Some(SiteFamily::Listing)
/// );
/// assert_eq!(
///     classify_site("https://www.altenpflege.de/anbieter?page=1"),
///     Some(SiteFamily::Directory)
/// );
/// assert_eq!(classify_site("https://example.com/"), None);
/// ```
pub fn classify_site(url: &str) -> Option<SiteFamily> {
    let host = extract_domain(url)?;

    if host.contains(LISTING_HOST_MARKER) {
        Some(SiteFamily::Listing)
    } else if host.contains(DIRECTORY_HOST_MARKER) {
        Some(SiteFamily::Directory)
    } else {
        None
    }
}
