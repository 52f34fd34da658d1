//! Output module for harvested records
//!
//! This module handles:
//! - Exporting records as CSV and JSON files
//! - Computing and printing result statistics

mod export;
pub mod stats;

pub use export::{
    export_file_name, export_records, write_csv, write_export, write_json, ExportFormat,
    EXPORT_FILE_STEM,
};
pub use stats::{print_statistics, HarvestStatistics};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exporting records
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
