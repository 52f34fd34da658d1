//! Progress and status reporting for a running harvest
//!
//! The coordinator pushes three kinds of events to a `ProgressSink`:
//! - page and item progress (`CrawlProgress`)
//! - status messages (unsupported site, empty page, per-page failure, done)
//! - records as soon as each list page yields them

use crate::extract::ExtractionRecord;
use std::fmt;

/// Position of the crawl within the configured page range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// 1-based number of the list page being processed
    pub current_page: u32,

    /// Number of list pages the run was configured for
    pub total_pages: u32,

    /// 1-based index of the detail page being fetched, if any
    pub current_item: Option<usize>,

    /// Number of detail links found on the current list page, if any
    pub total_items: Option<usize>,
}

impl CrawlProgress {
    /// Progress at the start of a list page
    pub fn page(current_page: u32, total_pages: u32) -> Self {
        Self {
            current_page,
            total_pages,
            current_item: None,
            total_items: None,
        }
    }

    /// Progress within the detail loop of a list page
    pub fn item(self, current_item: usize, total_items: usize) -> Self {
        Self {
            current_item: Some(current_item),
            total_items: Some(total_items),
            ..self
        }
    }

    /// Fraction of list pages completed, between 0.0 and 1.0
    pub fn fraction(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        let completed = self.current_page.saturating_sub(1).min(self.total_pages);
        f64::from(completed) / f64::from(self.total_pages)
    }
}

impl fmt::Display for CrawlProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}/{}", self.current_page, self.total_pages)?;
        if let (Some(item), Some(total)) = (self.current_item, self.total_items) {
            write!(f, ", item {}/{}", item, total)?;
        }
        Ok(())
    }
}

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// A human-readable status line for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

/// Receives events from a running harvest
pub trait ProgressSink: Send + Sync {
    /// Called at the start of every list page and every detail item
    fn progress(&self, progress: CrawlProgress);

    /// Called for every status message
    fn status(&self, message: StatusMessage);

    /// Called with the records of each list page, in crawl order
    fn records(&self, _records: &[ExtractionRecord]) {}
}

/// Sink that writes every event to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn progress(&self, progress: CrawlProgress) {
        if progress.current_item.is_some() {
            tracing::debug!("Progress: {}", progress);
        } else {
            tracing::info!(
                "Progress: {} ({:.0}% done)",
                progress,
                progress.fraction() * 100.0
            );
        }
    }

    fn status(&self, message: StatusMessage) {
        match message.level {
            StatusLevel::Info => tracing::info!("{}", message.text),
            StatusLevel::Warning => tracing::warn!("{}", message.text),
            StatusLevel::Error => tracing::error!("{}", message.text),
        }
    }

    fn records(&self, records: &[ExtractionRecord]) {
        tracing::debug!("Received {} records", records.len());
    }
}
