//! Directory-Harvest: contact record extraction from paginated directory sites
//!
//! This crate drives a headless browser through the list pages of two known
//! directory websites and turns their markup into flat contact records
//! (organization, address, email, phone, website, description).

pub mod browser;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Directory-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported site: {url}")]
    UnsupportedSite { url: String },

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to load {url}: {message}")]
    PageLoad { url: String, message: String },

    #[error("Timed out loading {url}")]
    Timeout { url: String },

    #[error("Failed to fetch detail page {url}: {message}")]
    DetailFetch { url: String, message: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Directory-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::HarvestConfig;
pub use crawler::{harvest, CrawlReport};
pub use extract::ExtractionRecord;
pub use state::CrawlState;
pub use url::{classify_site, resolve_page_url, SiteFamily};
