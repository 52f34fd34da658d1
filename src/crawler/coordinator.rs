//! Crawler coordinator - main harvest orchestration logic
//!
//! This module contains the page loop that coordinates one harvest run:
//! - Launching the browser and opening the list page
//! - Resolving, pacing and loading each list page in order
//! - Dispatching to the site extractor, including the nested detail loop
//! - Stopping at the first empty page and skipping failed ones
//! - Releasing every browser resource, whatever the outcome

use crate::browser::{
    BrowserLauncher, BrowserSession, LoadCondition, PageHandle, HEAVY_RESOURCES,
};
use crate::config::HarvestConfig;
use crate::crawler::progress::{CrawlProgress, ProgressSink, StatusMessage, TracingSink};
use crate::extract::{
    DirectorySiteExtractor, ExtractionRecord, ListingSiteExtractor, SiteExtractor,
};
use crate::state::CrawlState;
use crate::url::{classify_site, resolve_page_url, SiteFamily};
use crate::{HarvestError, Result};
use std::sync::Arc;

type PageOf<L> = <<L as BrowserLauncher>::Session as BrowserSession>::Page;

/// Summary of a finished harvest run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// Every record, in page order and detail-link order
    pub records: Vec<ExtractionRecord>,

    /// List pages the coordinator tried to load
    pub pages_attempted: u32,

    /// List pages that failed to load or extract
    pub pages_failed: u32,

    /// Detail pages that failed to load
    pub detail_failures: u32,

    /// Page whose empty result ended pagination, if any
    pub halted_at: Option<u32>,

    /// State the coordinator ended in
    pub final_state: CrawlState,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            pages_attempted: 0,
            pages_failed: 0,
            detail_failures: 0,
            halted_at: None,
            final_state: CrawlState::Idle,
        }
    }
}

/// Result of harvesting one list page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    /// The page produced this many records (possibly zero for failed details)
    Harvested(usize),

    /// Nothing was found: the end of pagination
    Exhausted,
}

/// Main harvest coordinator structure
pub struct Coordinator<L: BrowserLauncher> {
    config: HarvestConfig,
    extractor: SiteExtractor,
    launcher: L,
    sink: Arc<dyn ProgressSink>,
    state: CrawlState,
    report: CrawlReport,
}

impl<L: BrowserLauncher> Coordinator<L> {
    /// Creates a coordinator for an already classified site
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `site` - The site family whose extraction rules apply
    /// * `launcher` - Starts the browser session when the run begins
    pub fn new(config: HarvestConfig, site: SiteFamily, launcher: L) -> Self {
        let extractor = SiteExtractor::for_site(site, &config.browser);
        Self {
            config,
            extractor,
            launcher,
            sink: Arc::new(TracingSink),
            state: CrawlState::Idle,
            report: CrawlReport::new(),
        }
    }

    /// Creates a coordinator, classifying the site from the start URL
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - The start URL belongs to a supported site
    /// * `Err(HarvestError::UnsupportedSite)` - It does not
    pub fn for_url(config: HarvestConfig, launcher: L) -> Result<Self> {
        let site =
            classify_site(&config.start_url).ok_or_else(|| HarvestError::UnsupportedSite {
                url: config.start_url.clone(),
            })?;
        Ok(Self::new(config, site, launcher))
    }

    /// Replaces the default tracing sink
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Current state of the run
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the harvest to completion
    ///
    /// Per-page and per-detail failures are reported and skipped. Only a
    /// failure to start the browser or open the list page ends the run with
    /// an error. The browser is closed on every path.
    pub async fn run(mut self) -> Result<CrawlReport> {
        tracing::info!(
            "Starting {} harvest of {} ({} pages)",
            self.extractor.site(),
            self.config.start_url,
            self.config.page_count
        );

        self.transition(CrawlState::LaunchingBrowser)?;

        let mut session = match self.launcher.launch(&self.config.browser).await {
            Ok(session) => session,
            Err(e) => {
                self.sink
                    .status(StatusMessage::error(format!("Could not start browser: {}", e)));
                self.transition(CrawlState::Closed)?;
                return Err(e);
            }
        };

        let list_page = match session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                self.sink
                    .status(StatusMessage::error(format!("Could not open page: {}", e)));
                if let Err(close_err) = session.close().await {
                    tracing::warn!("Failed to close browser: {}", close_err);
                }
                self.transition(CrawlState::Closed)?;
                return Err(e);
            }
        };

        let result = self.page_loop(&mut session, &list_page).await;

        if let Err(e) = session.close_page(list_page).await {
            tracing::warn!("Failed to close list page: {}", e);
        }
        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        self.transition(CrawlState::Closed)?;
        result?;

        self.report.final_state = self.state;
        self.sink.status(StatusMessage::info(format!(
            "Harvest complete: {} records from {} pages",
            self.report.records.len(),
            self.report.pages_attempted
        )));

        Ok(self.report)
    }

    /// Visits list pages in ascending order until the range or the results
    /// run out
    async fn page_loop(&mut self, session: &mut L::Session, list_page: &PageOf<L>) -> Result<()> {
        let total_pages = self.config.page_count;
        let extractor = self.extractor.clone();

        for page in 1..=total_pages {
            self.transition(CrawlState::Navigating { page })?;
            self.sink.progress(CrawlProgress::page(page, total_pages));

            if page > 1 {
                let delay = self.config.inter_page_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            let url = resolve_page_url(&self.config.start_url, page);
            self.report.pages_attempted += 1;
            tracing::info!("Loading page {}/{}: {}", page, total_pages, url);

            let loaded = list_page
                .goto(
                    &url,
                    LoadCondition::Load,
                    self.config.browser.list_navigation_timeout,
                )
                .await;
            if let Err(e) = loaded {
                self.report.pages_failed += 1;
                self.sink.status(StatusMessage::warning(format!(
                    "Skipping page {}: {}",
                    page, e
                )));
                self.transition(CrawlState::Advancing { page })?;
                continue;
            }

            self.transition(CrawlState::Extracting { page })?;

            let outcome = match &extractor {
                SiteExtractor::Directory(directory) => {
                    self.harvest_directory_page(directory, list_page, &url)
                        .await
                }
                SiteExtractor::Listing(listing) => {
                    self.harvest_listing_page(listing, session, list_page, &url, page)
                        .await
                }
            };

            match outcome {
                Ok(PageOutcome::Harvested(count)) => {
                    tracing::info!("Page {} yielded {} records", page, count);
                }
                Ok(PageOutcome::Exhausted) => {
                    self.report.halted_at = Some(page);
                    self.sink.status(StatusMessage::warning(format!(
                        "No results on page {}, stopping",
                        page
                    )));
                    return Ok(());
                }
                Err(e @ HarvestError::InvalidTransition { .. }) => return Err(e),
                Err(e) => {
                    self.report.pages_failed += 1;
                    self.sink.status(StatusMessage::warning(format!(
                        "Skipping page {}: {}",
                        page, e
                    )));
                }
            }

            self.transition(CrawlState::Advancing { page })?;
        }

        Ok(())
    }

    async fn harvest_directory_page(
        &mut self,
        extractor: &DirectorySiteExtractor,
        list_page: &PageOf<L>,
        url: &str,
    ) -> Result<PageOutcome> {
        let records = extractor.extract_listing_records(list_page, url).await?;
        if records.is_empty() {
            return Ok(PageOutcome::Exhausted);
        }

        Ok(PageOutcome::Harvested(self.append(records)))
    }

    async fn harvest_listing_page(
        &mut self,
        extractor: &ListingSiteExtractor,
        session: &mut L::Session,
        list_page: &PageOf<L>,
        url: &str,
        page: u32,
    ) -> Result<PageOutcome> {
        let links = extractor.extract_listing_links(list_page, url).await?;
        if links.is_empty() {
            return Ok(PageOutcome::Exhausted);
        }

        tracing::info!("Found {} detail links on page {}", links.len(), page);
        self.transition(CrawlState::DetailLoop { page })?;

        let mut detail_page = session.new_page().await?;
        let result = self
            .detail_loop(extractor, session, &mut detail_page, &links, page)
            .await;

        if let Err(e) = session.close_page(detail_page).await {
            tracing::warn!("Failed to close detail page: {}", e);
        }

        result
    }

    /// Fetches each detail link in order on one shared page
    async fn detail_loop(
        &mut self,
        extractor: &ListingSiteExtractor,
        session: &mut L::Session,
        detail_page: &mut PageOf<L>,
        links: &[String],
        page: u32,
    ) -> Result<PageOutcome> {
        if let Err(e) = session.block_resources(detail_page, &HEAVY_RESOURCES).await {
            tracing::warn!("Could not install resource filter: {}", e);
        }

        let total_items = links.len();
        let delay = self.config.detail_delay();
        let mut harvested = 0;

        for (index, link) in links.iter().enumerate() {
            self.sink.progress(
                CrawlProgress::page(page, self.config.page_count).item(index + 1, total_items),
            );

            match extractor.extract_detail_record(&*detail_page, link).await {
                Ok(Some(record)) => harvested += self.append(vec![record]),
                Ok(None) => tracing::debug!("No usable data on {}", link),
                Err(e) => {
                    self.report.detail_failures += 1;
                    self.sink
                        .status(StatusMessage::warning(format!("Skipping detail: {}", e)));
                }
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(PageOutcome::Harvested(harvested))
    }

    /// Appends records and hands them to the sink
    fn append(&mut self, records: Vec<ExtractionRecord>) -> usize {
        let count = records.len();
        if count > 0 {
            self.sink.records(&records);
            self.report.records.extend(records);
        }
        count
    }

    fn transition(&mut self, next: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("State {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}
