//! Extraction rules for the directory (list-page) site family
//!
//! Each entry on a list page is a heading followed by sibling blocks:
//!
//! ```text
//! h2.has-text-weight-bold    organization name
//! div.columns                address fragments in span.show-unscaled
//! div                        contacts (tel:, mailto:, a.icon website)
//! div                        description
//! ```
//!
//! Contact links are written by client-side scripts, so the page is only read
//! after the headings appear and a short settle delay has passed.

use crate::browser::{PageHandle, WaitCondition};
use crate::config::SiteTimings;
use crate::extract::record::ExtractionRecord;
use crate::extract::text::{
    clean_text, decode_mailto, decode_tel, element_text, non_empty, truncate_description,
};
use crate::Result;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Selector of the heading that opens every entry
pub const ENTRY_HEADING_SELECTOR: &str = "h2.has-text-weight-bold";

const ENTRY_HEADING_CLASS: &str = "has-text-weight-bold";
const ADDRESS_BLOCK_CLASS: &str = "columns";

/// Extractor for the directory site family
#[derive(Debug, Clone)]
pub struct DirectorySiteExtractor {
    heading_wait: Duration,
    settle: Duration,
}

impl DirectorySiteExtractor {
    pub fn new(timings: &SiteTimings) -> Self {
        Self {
            heading_wait: timings.directory_heading_wait,
            settle: timings.directory_settle,
        }
    }

    /// Reads every entry of the loaded list page
    ///
    /// # Arguments
    ///
    /// * `page` - The list page, already navigated
    /// * `base_url` - The list page URL, recorded as each record's source
    ///
    /// # Returns
    ///
    /// The substantive records in page order. An empty vector means the
    /// headings never rendered, i.e. the end of pagination.
    pub async fn extract_listing_records(
        &self,
        page: &dyn PageHandle,
        base_url: &str,
    ) -> Result<Vec<ExtractionRecord>> {
        let heading = WaitCondition::Selector(ENTRY_HEADING_SELECTOR.to_string());
        if !page.wait_for(&heading, self.heading_wait).await? {
            tracing::debug!("No entry headings rendered on {}", base_url);
            return Ok(Vec::new());
        }

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let html = page.content().await?;
        Ok(parse_listing_records(&html, base_url))
    }
}

/// Parses all entries of a directory list page
pub fn parse_listing_records(html: &str, base_url: &str) -> Vec<ExtractionRecord> {
    let document = Html::parse_document(html);
    let Ok(heading_selector) = Selector::parse(ENTRY_HEADING_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&heading_selector)
        .map(|heading| parse_entry(heading, base_url))
        .filter(ExtractionRecord::is_substantive)
        .collect()
}

fn parse_entry(heading: ElementRef<'_>, base_url: &str) -> ExtractionRecord {
    let mut record = ExtractionRecord::new(base_url);
    record.company_name = non_empty(&element_text(&heading));

    let block = entry_block(heading);

    let Some(address_at) = block.iter().position(is_address_block) else {
        return record;
    };
    record.address = read_address(&block[address_at]);

    let Some(contacts_at) = next_div(&block, address_at) else {
        return record;
    };
    read_contacts(&block[contacts_at], &mut record);

    if let Some(description_at) = next_div(&block, contacts_at) {
        let text = clean_text(&block[description_at].text().collect::<String>());
        if !text.is_empty() {
            record.description = Some(truncate_description(&text));
        }
    }

    record
}

/// Sibling elements after `heading`, up to the next entry heading
fn entry_block(heading: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !is_entry_heading(el))
        .collect()
}

fn read_address(block: &ElementRef<'_>) -> Option<String> {
    let parts: Vec<String> = select_all(*block, "span.show-unscaled")
        .iter()
        .map(element_text)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn read_contacts(block: &ElementRef<'_>, record: &mut ExtractionRecord) {
    if let Some(link) = select_all(*block, r#"a[href^="tel:"]"#).into_iter().next() {
        record.phone = non_empty(&element_text(&link))
            .or_else(|| link.value().attr("href").and_then(decode_tel));
    }

    record.email = select_all(*block, r#"a[href^="mailto:"]"#)
        .into_iter()
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(decode_mailto);

    record.website = select_all(*block, r#"a.icon[href^="http"]"#)
        .into_iter()
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string());
}

fn next_div(block: &[ElementRef<'_>], after: usize) -> Option<usize> {
    block
        .iter()
        .enumerate()
        .skip(after + 1)
        .find(|(_, el)| el.value().name() == "div")
        .map(|(index, _)| index)
}

fn is_address_block(element: &ElementRef<'_>) -> bool {
    element.value().name() == "div" && has_class(element, ADDRESS_BLOCK_CLASS)
}

fn is_entry_heading(element: &ElementRef<'_>) -> bool {
    element.value().name() == "h2" && has_class(element, ENTRY_HEADING_CLASS)
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}
