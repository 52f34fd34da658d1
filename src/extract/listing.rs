//! Extraction rules for the listing (detail-crawl) site family
//!
//! List pages only carry "Details ansehen" links; every record is read from
//! its own detail page:
//!
//! ```text
//! article.detail-page__overview
//!   h1.h3                  heading (organization, or role when an anchor follows)
//!   a.head__children       organization anchor (optional)
//!   ul.il > li             "Arbeitsort: ..." work location
//! div.additional__text     mailto:, tel: and external links
//! ```

use crate::browser::{LoadCondition, PageHandle, WaitCondition};
use crate::config::SiteTimings;
use crate::extract::record::ExtractionRecord;
use crate::extract::text::{decode_mailto, decode_tel, element_text, joined_text, non_empty};
use crate::{HarvestError, Result};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Text of the affordance linking a list entry to its detail page
pub const DETAIL_LINK_MARKER: &str = "Details ansehen";

/// Label prefixing the work location in the overview list
const LOCATION_LABEL: &str = "Arbeitsort";

/// Extractor for the listing site family
#[derive(Debug, Clone)]
pub struct ListingSiteExtractor {
    link_wait: Duration,
    detail_timeout: Duration,
}

impl ListingSiteExtractor {
    pub fn new(timings: &SiteTimings, detail_timeout: Duration) -> Self {
        Self {
            link_wait: timings.listing_link_wait,
            detail_timeout,
        }
    }

    /// Collects the absolute detail-page URLs of the loaded list page
    ///
    /// An empty result means the affordance never rendered within the wait,
    /// which the crawl treats as the end of the results.
    pub async fn extract_listing_links(
        &self,
        page: &dyn PageHandle,
        base_url: &str,
    ) -> Result<Vec<String>> {
        let marker = WaitCondition::Text(DETAIL_LINK_MARKER.to_string());
        if !page.wait_for(&marker, self.link_wait).await? {
            tracing::debug!("No detail links rendered on {}", base_url);
            return Ok(Vec::new());
        }

        let html = page.content().await?;
        Ok(parse_listing_links(&html, base_url))
    }

    /// Navigates `page` to a detail URL and reads its record
    ///
    /// Returns `Ok(None)` when the page yields nothing substantive.
    pub async fn extract_detail_record(
        &self,
        page: &dyn PageHandle,
        url: &str,
    ) -> Result<Option<ExtractionRecord>> {
        page.goto(url, LoadCondition::DomContentLoaded, self.detail_timeout)
            .await
            .map_err(|e| detail_fetch(url, e))?;

        let html = page.content().await.map_err(|e| detail_fetch(url, e))?;
        let record = parse_detail_record(&html, url);

        Ok(Some(record).filter(ExtractionRecord::is_substantive))
    }
}

/// Parses detail-page links out of a list page
///
/// Every `<a href>` whose text contains the marker is resolved against
/// `base_url`. Document order is kept.
pub fn parse_listing_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor_selector)
        .filter(|anchor| anchor.text().any(|t| t.contains(DETAIL_LINK_MARKER)))
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_link(href, &base))
        .collect()
}

/// Parses one detail page into a record; missing fields stay `None`
pub fn parse_detail_record(html: &str, url: &str) -> ExtractionRecord {
    let document = Html::parse_document(html);
    let mut record = ExtractionRecord::new(url);

    if let Some(overview) = select_first(document.root_element(), "article.detail-page__overview")
    {
        read_overview(&overview, &mut record);
    }

    if let Some(additional) = select_first(document.root_element(), "div.additional__text") {
        read_contacts(&additional, &mut record);
    }

    record
}

/// Reads heading, organization anchor and work location
fn read_overview(overview: &ElementRef<'_>, record: &mut ExtractionRecord) {
    record.company_name =
        select_first(*overview, "h1.h3").and_then(|h1| non_empty(&element_text(&h1)));

    // The heading names the role when an organization anchor is present.
    // Nothing in the markup tells the variants apart otherwise.
    if let Some(anchor) = select_first(*overview, "a.head__children") {
        record.job_title = record.company_name.take();
        record.company_name = non_empty(&element_text(&anchor));
    }

    if let Some(list) = select_first(*overview, "ul.il") {
        record.address = select_all(list, "li")
            .into_iter()
            .map(|li| joined_text(&li))
            .filter(|text| text.contains(LOCATION_LABEL))
            .last()
            .and_then(|text| non_empty(&text.replace("Arbeitsort:", "")));
    }
}

/// Reads email, phone and website from the additional information block
fn read_contacts(additional: &ElementRef<'_>, record: &mut ExtractionRecord) {
    let links = select_all(*additional, "a[href]");
    let hrefs = links
        .iter()
        .filter_map(|a| a.value().attr("href").map(|href| (a, href)));

    for (_, href) in hrefs.clone() {
        if href.to_ascii_lowercase().contains("mailto:") && record.email.is_none() {
            let start = href.to_ascii_lowercase().find("mailto:").unwrap_or(0);
            record.email = decode_mailto(&href[start..]);
        }
        if href.contains("tel:") && record.phone.is_none() {
            let start = href.find("tel:").unwrap_or(0);
            record.phone = decode_tel(&href[start..]);
        }
    }

    record.website = hrefs
        .filter(|(a, href)| href.contains("http") && a.value().attr("target") == Some("_blank"))
        .map(|(_, href)| href.to_string())
        .next();
}

/// Resolves a link href against the list page URL
///
/// Returns None for empty hrefs, fragment-only anchors and anything that
/// does not resolve to an HTTP(S) URL.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    let found = scope.select(&selector).next();
    found
}

fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn detail_fetch(url: &str, error: HarvestError) -> HarvestError {
    match error {
        HarvestError::DetailFetch { .. } => error,
        other => HarvestError::DetailFetch {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
