//! Statistics over harvested records
//!
//! This module computes the summary shown after a run: how many records were
//! collected, how many columns carry data, and how many records can be
//! contacted by email or phone.

use crate::crawler::CrawlReport;
use crate::extract::{ExtractionRecord, EXPORT_COLUMNS};

/// Harvest statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Number of records
    pub items: usize,

    /// Number of export columns holding a value in at least one record
    pub fields: usize,

    /// Records with an email address
    pub with_email: usize,

    /// Records with a phone number
    pub with_phone: usize,
}

impl HarvestStatistics {
    /// Computes statistics over a record sequence
    pub fn from_records(records: &[ExtractionRecord]) -> Self {
        let mut column_used = [false; EXPORT_COLUMNS.len()];
        for record in records {
            for (used, cell) in column_used.iter_mut().zip(record.to_row()) {
                *used |= !cell.is_empty();
            }
        }

        Self {
            items: records.len(),
            fields: column_used.iter().filter(|used| **used).count(),
            with_email: records.iter().filter(|r| r.email.is_some()).count(),
            with_phone: records.iter().filter(|r| r.phone.is_some()).count(),
        }
    }

    /// Share of records with an email address, in percent
    pub fn email_rate(&self) -> f64 {
        percentage(self.with_email, self.items)
    }

    /// Share of records with a phone number, in percent
    pub fn phone_rate(&self) -> f64 {
        percentage(self.with_phone, self.items)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

/// Prints statistics and the crawl summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The record statistics to display
/// * `report` - The finished crawl
pub fn print_statistics(stats: &HarvestStatistics, report: &CrawlReport) {
    println!("=== Harvest Statistics ===\n");

    println!("Records:");
    println!("  Items: {}", stats.items);
    println!("  Fields: {}", stats.fields);
    println!("  Emails: {} ({:.1}%)", stats.with_email, stats.email_rate());
    println!("  Phones: {} ({:.1}%)", stats.with_phone, stats.phone_rate());
    println!();

    println!("Pages:");
    println!("  Attempted: {}", report.pages_attempted);
    println!("  Failed: {}", report.pages_failed);
    if report.detail_failures > 0 {
        println!("  Failed detail pages: {}", report.detail_failures);
    }
    if let Some(page) = report.halted_at {
        println!("  Stopped early: no results on page {}", page);
    }
}
