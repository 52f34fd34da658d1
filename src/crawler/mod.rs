//! Crawler module for driving a harvest run
//!
//! This module contains the core crawling logic, including:
//! - Site pre-flight checks
//! - The page loop and nested detail loop
//! - Progress and status reporting

mod coordinator;
mod progress;

pub use coordinator::{Coordinator, CrawlReport};
pub use progress::{CrawlProgress, ProgressSink, StatusLevel, StatusMessage, TracingSink};

use crate::browser::BrowserLauncher;
use crate::config::{validate, HarvestConfig};
use crate::url::{classify_site, DIRECTORY_HOST_MARKER, LISTING_HOST_MARKER};
use crate::{HarvestError, Result};
use std::sync::Arc;

/// Runs a complete harvest
///
/// This is the main entry point for a harvest. It will:
/// 1. Validate the configuration
/// 2. Classify the start URL, refusing unknown sites before any browser starts
/// 3. Launch the browser and walk the list pages
/// 4. Close the browser and return what was collected
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `launcher` - Starts the browser session
/// * `sink` - Receives progress, status messages and records as they arrive
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Harvest finished (possibly with skipped pages)
/// * `Err(HarvestError)` - Configuration invalid, site unsupported or browser
///   unavailable
pub async fn harvest<L: BrowserLauncher>(
    config: HarvestConfig,
    launcher: L,
    sink: Arc<dyn ProgressSink>,
) -> Result<CrawlReport> {
    validate(&config)?;

    let site = match classify_site(&config.start_url) {
        Some(site) => site,
        None => {
            sink.status(StatusMessage::error(format!(
                "Unsupported site: {} (expected a {} or {} URL)",
                config.start_url, LISTING_HOST_MARKER, DIRECTORY_HOST_MARKER
            )));
            return Err(HarvestError::UnsupportedSite {
                url: config.start_url,
            });
        }
    };

    sink.status(StatusMessage::info(format!("Detected {} site", site)));

    Coordinator::new(config, site, launcher)
        .with_sink(sink)
        .run()
        .await
}
