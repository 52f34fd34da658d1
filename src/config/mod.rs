//! Configuration module for Directory-Harvest
//!
//! A run is configured entirely by the caller (the CLI builds it from flags);
//! nothing is read from or persisted to disk.
//!
//! # Example
//!
//! ```
//! use directory_harvest::config::{validate, HarvestConfig};
//!
//! let mut config = HarvestConfig::new("https://www.altenpflege.de/anbieter");
//! config.page_count = 5;
//! assert!(validate(&config).is_ok());
//! ```

mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserSettings, HarvestConfig, SiteTimings, DEFAULT_INTER_PAGE_DELAY_SECS,
    DEFAULT_PAGE_COUNT,
};

// Re-export validation
pub use validation::{
    validate, MAX_INTER_PAGE_DELAY_SECS, MAX_PAGE_COUNT, MIN_INTER_PAGE_DELAY_SECS,
    MIN_PAGE_COUNT,
};
