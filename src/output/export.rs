//! CSV and JSON export of harvested records

use crate::extract::{ExtractionRecord, EXPORT_COLUMNS};
use crate::output::{ExportError, ExportResult};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Stem shared by every export file
pub const EXPORT_FILE_STEM: &str = "data";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Writes records as CSV with a header row in `EXPORT_COLUMNS` order
///
/// Absent fields become empty cells.
pub fn write_csv<W: Write>(records: &[ExtractionRecord], writer: W) -> ExportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(EXPORT_COLUMNS)?;
    for record in records {
        csv_writer.write_record(record.to_row())?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes records as a pretty-printed JSON array
///
/// Absent fields are `null`; non-ASCII text is written as UTF-8.
pub fn write_json<W: Write>(records: &[ExtractionRecord], mut writer: W) -> ExportResult<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Builds the file name for an export taken at `timestamp`
///
/// # Example
///
/// ```
/// use chrono::{Local, TimeZone};
/// use directory_harvest::output::{export_file_name, ExportFormat};
///
/// let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
/// assert_eq!(export_file_name(ExportFormat::Csv, &at), "data_20240309_140500.csv");
/// ```
pub fn export_file_name<Tz: TimeZone>(format: ExportFormat, timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "{}_{}.{}",
        EXPORT_FILE_STEM,
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Writes `records` into `dir` in the given format, named after the current
/// local time
///
/// # Returns
///
/// The path of the written file.
pub fn export_records(
    records: &[ExtractionRecord],
    dir: &Path,
    format: ExportFormat,
) -> ExportResult<PathBuf> {
    let path = dir.join(export_file_name(format, &Local::now()));
    write_export(records, &path, format)?;
    Ok(path)
}

/// Writes `records` to `path` in the given format
pub fn write_export(
    records: &[ExtractionRecord],
    path: &Path,
    format: ExportFormat,
) -> ExportResult<()> {
    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => write_csv(records, writer)?,
        ExportFormat::Json => write_json(records, writer)?,
    }

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
