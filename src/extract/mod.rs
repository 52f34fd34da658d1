//! Site-specific extraction
//!
//! This module provides:
//! - The typed `ExtractionRecord` every extractor produces
//! - Text normalization and link decoding helpers
//! - One extractor per supported site family
//! - `SiteExtractor`, the closed dispatch over those extractors

pub mod directory;
pub mod listing;
mod record;
pub mod text;

pub use directory::{parse_listing_records, DirectorySiteExtractor};
pub use listing::{parse_detail_record, parse_listing_links, ListingSiteExtractor};
pub use record::{ExtractionRecord, EXPORT_COLUMNS};

use crate::config::BrowserSettings;
use crate::url::SiteFamily;

/// The extractor for one site family
#[derive(Debug, Clone)]
pub enum SiteExtractor {
    /// List pages link to detail pages holding the records
    Listing(ListingSiteExtractor),

    /// List pages hold complete records
    Directory(DirectorySiteExtractor),
}

impl SiteExtractor {
    /// Builds the extractor for `site` with the configured waits
    pub fn for_site(site: SiteFamily, settings: &BrowserSettings) -> Self {
        match site {
            SiteFamily::Listing => Self::Listing(ListingSiteExtractor::new(
                &settings.timings,
                settings.detail_navigation_timeout,
            )),
            SiteFamily::Directory => Self::Directory(DirectorySiteExtractor::new(&settings.timings)),
        }
    }

    /// The site family this extractor handles
    pub fn site(&self) -> SiteFamily {
        match self {
            Self::Listing(_) => SiteFamily::Listing,
            Self::Directory(_) => SiteFamily::Directory,
        }
    }
}
