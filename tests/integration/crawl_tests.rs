//! Integration tests for the harvest coordinator
//!
//! These tests drive the full page loop against an in-memory browser that
//! serves canned HTML per URL and records every call made to it. One ignored
//! test runs a real Chromium against a wiremock server.

use async_trait::async_trait;
use directory_harvest::browser::{
    BrowserLauncher, BrowserSession, LoadCondition, PageHandle, ResourceKind, WaitCondition,
    HEAVY_RESOURCES,
};
use directory_harvest::config::{BrowserSettings, HarvestConfig, SiteTimings};
use directory_harvest::crawler::{
    harvest, Coordinator, CrawlProgress, ProgressSink, StatusLevel, StatusMessage,
};
use directory_harvest::{CrawlState, ExtractionRecord, HarvestError, SiteFamily};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const DIRECTORY_START: &str = "https://www.altenpflege.de/anbieter?page=1";
const LISTING_START: &str = "https://www.make-it-in-germany.com/de/jobs?tx_solr%5Bpage%5D=1";

// ===== In-memory browser =====

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Launch,
    NewPage(usize),
    Goto {
        page: usize,
        url: String,
        until: LoadCondition,
    },
    Block(usize, Vec<ResourceKind>),
    ClosePage(usize),
    CloseBrowser,
}

#[derive(Default)]
struct FakeWeb {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    events: Vec<Event>,
    goto_times: Vec<(String, Instant)>,
    next_page_id: usize,
    open_pages: usize,
    max_open_pages: usize,
    fail_launch: bool,
}

#[derive(Clone, Default)]
struct FakeLauncher {
    web: Arc<Mutex<FakeWeb>>,
}

impl FakeLauncher {
    fn serve(&self, url: &str, html: impl Into<String>) {
        self.web
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), html.into());
    }

    fn fail(&self, url: &str) {
        self.web.lock().unwrap().failing.insert(url.to_string());
    }

    fn fail_launch(&self) {
        self.web.lock().unwrap().fail_launch = true;
    }

    fn events(&self) -> Vec<Event> {
        self.web.lock().unwrap().events.clone()
    }

    fn visited(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Goto { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Navigations with their offset from `start` on the tokio clock
    fn goto_offsets(&self, start: Instant) -> Vec<(String, Duration)> {
        self.web
            .lock()
            .unwrap()
            .goto_times
            .iter()
            .map(|(url, at)| (url.clone(), at.duration_since(start)))
            .collect()
    }

    fn max_open_pages(&self) -> usize {
        self.web.lock().unwrap().max_open_pages
    }

    fn open_pages(&self) -> usize {
        self.web.lock().unwrap().open_pages
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _settings: &BrowserSettings) -> directory_harvest::Result<FakeSession> {
        let mut web = self.web.lock().unwrap();
        if web.fail_launch {
            return Err(HarvestError::BrowserLaunch(
                "could not find a chrome executable".to_string(),
            ));
        }
        web.events.push(Event::Launch);
        Ok(FakeSession {
            web: self.web.clone(),
        })
    }
}

struct FakeSession {
    web: Arc<Mutex<FakeWeb>>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn new_page(&mut self) -> directory_harvest::Result<FakePage> {
        let mut web = self.web.lock().unwrap();
        let id = web.next_page_id;
        web.next_page_id += 1;
        web.open_pages += 1;
        web.max_open_pages = web.max_open_pages.max(web.open_pages);
        web.events.push(Event::NewPage(id));

        Ok(FakePage {
            id,
            web: self.web.clone(),
            current: Mutex::new(String::new()),
        })
    }

    async fn block_resources(
        &mut self,
        page: &mut FakePage,
        kinds: &[ResourceKind],
    ) -> directory_harvest::Result<()> {
        self.web
            .lock()
            .unwrap()
            .events
            .push(Event::Block(page.id, kinds.to_vec()));
        Ok(())
    }

    async fn close_page(&mut self, page: FakePage) -> directory_harvest::Result<()> {
        let mut web = self.web.lock().unwrap();
        web.open_pages -= 1;
        web.events.push(Event::ClosePage(page.id));
        Ok(())
    }

    async fn close(self) -> directory_harvest::Result<()> {
        self.web.lock().unwrap().events.push(Event::CloseBrowser);
        Ok(())
    }
}

struct FakePage {
    id: usize,
    web: Arc<Mutex<FakeWeb>>,
    current: Mutex<String>,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn goto(
        &self,
        url: &str,
        until: LoadCondition,
        _timeout: Duration,
    ) -> directory_harvest::Result<()> {
        let html = {
            let mut web = self.web.lock().unwrap();
            web.events.push(Event::Goto {
                page: self.id,
                url: url.to_string(),
                until,
            });
            web.goto_times.push((url.to_string(), Instant::now()));
            if web.failing.contains(url) {
                return Err(HarvestError::PageLoad {
                    url: url.to_string(),
                    message: "net::ERR_CONNECTION_REFUSED".to_string(),
                });
            }
            web.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| "<html><body></body></html>".to_string())
        };

        *self.current.lock().unwrap() = html;
        Ok(())
    }

    async fn wait_for(
        &self,
        condition: &WaitCondition,
        _timeout: Duration,
    ) -> directory_harvest::Result<bool> {
        let html = self.current.lock().unwrap().clone();
        let found = match condition {
            WaitCondition::Selector(css) => {
                let selector = Selector::parse(css).unwrap();
                let document = Html::parse_document(&html);
                let found = document.select(&selector).next().is_some();
                found
            }
            WaitCondition::Text(text) => html.contains(text.as_str()),
        };
        Ok(found)
    }

    async fn content(&self) -> directory_harvest::Result<String> {
        Ok(self.current.lock().unwrap().clone())
    }
}

// ===== Recording sink =====

#[derive(Default)]
struct RecordingSink {
    progress: Mutex<Vec<CrawlProgress>>,
    statuses: Mutex<Vec<StatusMessage>>,
    streamed: Mutex<Vec<ExtractionRecord>>,
    batches: Mutex<Vec<usize>>,
}

impl RecordingSink {
    fn statuses(&self, level: StatusLevel) -> Vec<String> {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.level == level)
            .map(|message| message.text.clone())
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn progress(&self, progress: CrawlProgress) {
        self.progress.lock().unwrap().push(progress);
    }

    fn status(&self, message: StatusMessage) {
        self.statuses.lock().unwrap().push(message);
    }

    fn records(&self, records: &[ExtractionRecord]) {
        self.streamed.lock().unwrap().extend_from_slice(records);
        self.batches.lock().unwrap().push(records.len());
    }
}

// ===== Fixtures =====

/// Creates a test configuration without any waiting
fn create_test_config(start_url: &str, page_count: u32) -> HarvestConfig {
    let mut config = HarvestConfig::new(start_url);
    config.page_count = page_count;
    config.inter_page_delay_secs = 0.0;
    config.browser.timings = SiteTimings::immediate();
    config
}

fn directory_page(names: &[&str]) -> String {
    let entries: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<h2 class="has-text-weight-bold">{name}</h2>
                <div class="columns"><span class="show-unscaled">{name}weg 1</span></div>
                <div><a href="tel:030{len}">030 {len}</a></div>
                <div>Pflege und Betreuung</div>"#,
                name = name,
                len = name.len()
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", entries)
}

fn directory_url(page: u32) -> String {
    format!("https://www.altenpflege.de/anbieter?page={}", page)
}

fn listing_url(page: u32) -> String {
    format!(
        "https://www.make-it-in-germany.com/de/jobs?tx_solr%5Bpage%5D={}",
        page
    )
}

fn detail_url(id: u32) -> String {
    format!("https://www.make-it-in-germany.com/de/jobs/detail/{}", id)
}

fn listing_page(detail_ids: &[u32]) -> String {
    let links: String = detail_ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="card"><a href="/de/jobs/detail/{}">Details ansehen</a></div>"#,
                id
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", links)
}

fn detail_page(company: &str, email: &str) -> String {
    format!(
        r#"<html><body>
        <article class="detail-page__overview">
          <h1 class="h3">Pflegefachkraft</h1>
          <a class="head__children" href="/firma">{}</a>
          <ul class="il"><li>Arbeitsort: Berlin</li></ul>
        </article>
        <div class="additional__text"><a href="mailto:{}">Mail</a></div>
        </body></html>"#,
        company, email
    )
}

fn names(records: &[ExtractionRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.company_name.clone())
        .collect()
}

// ===== Directory family =====

#[tokio::test]
async fn test_directory_multi_page_crawl() {
    let launcher = FakeLauncher::default();
    launcher.serve(&directory_url(1), directory_page(&["Alpha", "Beta"]));
    launcher.serve(&directory_url(2), directory_page(&["Gamma", "Delta"]));

    let config = create_test_config(DIRECTORY_START, 2);
    let report = Coordinator::for_url(config, launcher.clone())
        .expect("directory site is supported")
        .run()
        .await
        .expect("harvest should succeed");

    assert_eq!(names(&report.records), vec!["Alpha", "Beta", "Gamma", "Delta"]);
    assert_eq!(report.records[0].address.as_deref(), Some("Alphaweg 1"));
    assert_eq!(report.records[0].phone.as_deref(), Some("030 5"));
    assert_eq!(report.records[3].source_url, directory_url(2));
    assert_eq!(report.pages_attempted, 2);
    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.halted_at, None);
    assert_eq!(report.final_state, CrawlState::Closed);

    assert_eq!(
        launcher.events(),
        vec![
            Event::Launch,
            Event::NewPage(0),
            Event::Goto {
                page: 0,
                url: directory_url(1),
                until: LoadCondition::Load
            },
            Event::Goto {
                page: 0,
                url: directory_url(2),
                until: LoadCondition::Load
            },
            Event::ClosePage(0),
            Event::CloseBrowser,
        ]
    );
}

#[tokio::test]
async fn test_directory_halts_on_empty_page() {
    let launcher = FakeLauncher::default();
    launcher.serve(&directory_url(1), directory_page(&["Alpha"]));
    launcher.serve(&directory_url(2), "<html><body><p>Keine Treffer</p></body></html>");
    launcher.serve(&directory_url(3), directory_page(&["Never"]));

    let sink = Arc::new(RecordingSink::default());
    let config = create_test_config(DIRECTORY_START, 5);
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(names(&report.records), vec!["Alpha"]);
    assert_eq!(report.halted_at, Some(2));
    assert_eq!(report.pages_attempted, 2);
    assert_eq!(launcher.visited(), vec![directory_url(1), directory_url(2)]);
    assert!(!launcher.visited().contains(&directory_url(3)));

    let warnings = sink.statuses(StatusLevel::Warning);
    assert!(warnings.iter().any(|w| w.contains("No results on page 2")));
    assert_eq!(launcher.events().last(), Some(&Event::CloseBrowser));
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let launcher = FakeLauncher::default();
    launcher.serve(&directory_url(1), directory_page(&["Alpha"]));
    launcher.fail(&directory_url(2));
    launcher.serve(&directory_url(3), directory_page(&["Gamma"]));

    let sink = Arc::new(RecordingSink::default());
    let config = create_test_config(DIRECTORY_START, 3);
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(names(&report.records), vec!["Alpha", "Gamma"]);
    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.halted_at, None);

    let warnings = sink.statuses(StatusLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Skipping page 2"));
}

#[tokio::test]
async fn test_progress_and_records_streamed() {
    let launcher = FakeLauncher::default();
    launcher.serve(&directory_url(1), directory_page(&["Alpha"]));
    launcher.serve(&directory_url(2), directory_page(&["Beta"]));

    let sink = Arc::new(RecordingSink::default());
    let config = create_test_config(DIRECTORY_START, 2);
    let report = Coordinator::for_url(config, launcher)
        .unwrap()
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    let progress = sink.progress.lock().unwrap().clone();
    assert_eq!(
        progress,
        vec![CrawlProgress::page(1, 2), CrawlProgress::page(2, 2)]
    );
    assert_eq!(*sink.streamed.lock().unwrap(), report.records);

    let infos = sink.statuses(StatusLevel::Info);
    assert!(infos.iter().any(|i| i.contains("2 records")));
}

// ===== Listing family =====

#[tokio::test]
async fn test_listing_detail_crawl() {
    let launcher = FakeLauncher::default();
    launcher.serve(&listing_url(1), listing_page(&[11, 12]));
    launcher.serve(&listing_url(2), listing_page(&[21, 22]));
    launcher.serve(&detail_url(11), detail_page("Klinik Eins", "a%40eins.de"));
    launcher.fail(&detail_url(12));
    launcher.serve(&detail_url(21), detail_page("Heim Zwei", "b@zwei.de"));
    launcher.serve(&detail_url(22), detail_page("Dienst Drei", "c@drei.de"));

    let sink = Arc::new(RecordingSink::default());
    let config = create_test_config(LISTING_START, 2);
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(
        names(&report.records),
        vec!["Klinik Eins", "Heim Zwei", "Dienst Drei"]
    );
    let first = &report.records[0];
    assert_eq!(first.job_title.as_deref(), Some("Pflegefachkraft"));
    assert_eq!(first.email.as_deref(), Some("a@eins.de"));
    assert_eq!(first.address.as_deref(), Some("Berlin"));
    assert_eq!(first.source_url, detail_url(11));
    assert_eq!(report.detail_failures, 1);
    assert_eq!(report.pages_failed, 0);

    assert_eq!(
        launcher.visited(),
        vec![
            listing_url(1),
            detail_url(11),
            detail_url(12),
            listing_url(2),
            detail_url(21),
            detail_url(22),
        ]
    );

    let item_progress: Vec<_> = sink
        .progress
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p.current_item.is_some())
        .copied()
        .collect();
    assert_eq!(item_progress.len(), 4);
    assert_eq!(item_progress[1], CrawlProgress::page(1, 2).item(2, 2));
}

#[tokio::test]
async fn test_detail_records_streamed_one_at_a_time() {
    let launcher = FakeLauncher::default();
    launcher.serve(&listing_url(1), listing_page(&[1, 2, 3]));
    launcher.serve(&detail_url(1), detail_page("Eins", "e@eins.de"));
    launcher.serve(&detail_url(2), detail_page("Zwei", "z@zwei.de"));
    launcher.serve(&detail_url(3), detail_page("Drei", "d@drei.de"));

    let sink = Arc::new(RecordingSink::default());
    let config = create_test_config(LISTING_START, 1);
    let report = Coordinator::for_url(config, launcher)
        .unwrap()
        .with_sink(sink.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(*sink.batches.lock().unwrap(), vec![1, 1, 1]);
    assert_eq!(*sink.streamed.lock().unwrap(), report.records);
}

#[tokio::test]
async fn test_listing_detail_page_lifecycle() {
    let launcher = FakeLauncher::default();
    launcher.serve(&listing_url(1), listing_page(&[1]));
    launcher.serve(&listing_url(2), listing_page(&[2]));
    launcher.serve(&detail_url(1), detail_page("Eins", "e@eins.de"));
    launcher.serve(&detail_url(2), detail_page("Zwei", "z@zwei.de"));

    let config = create_test_config(LISTING_START, 2);
    Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    let events = launcher.events();
    let detail_gotos: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::Goto { page, until, .. } if *page != 0 => Some((*page, *until)),
            _ => None,
        })
        .collect();
    assert_eq!(
        detail_gotos,
        vec![
            (1, LoadCondition::DomContentLoaded),
            (2, LoadCondition::DomContentLoaded)
        ]
    );

    // One fresh, filtered detail page per list page, closed after its loop
    for id in [1, 2] {
        let opened = events.iter().position(|e| *e == Event::NewPage(id)).unwrap();
        let blocked = events
            .iter()
            .position(|e| *e == Event::Block(id, HEAVY_RESOURCES.to_vec()))
            .unwrap();
        let closed = events.iter().position(|e| *e == Event::ClosePage(id)).unwrap();
        assert!(opened < blocked && blocked < closed);
    }

    assert_eq!(launcher.max_open_pages(), 2);
    assert_eq!(launcher.open_pages(), 0);
    assert_eq!(events.last(), Some(&Event::CloseBrowser));
}

#[tokio::test]
async fn test_listing_halts_without_links() {
    let launcher = FakeLauncher::default();
    launcher.serve(&listing_url(1), listing_page(&[1]));
    launcher.serve(&listing_url(2), "<html><body>Keine Stellen</body></html>");
    launcher.serve(&detail_url(1), detail_page("Eins", "e@eins.de"));

    let config = create_test_config(LISTING_START, 4);
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(names(&report.records), vec!["Eins"]);
    assert_eq!(report.halted_at, Some(2));
    assert!(!launcher.visited().contains(&listing_url(3)));

    // No detail page is opened for the empty list page
    let opened = launcher
        .events()
        .iter()
        .filter(|e| matches!(e, Event::NewPage(_)))
        .count();
    assert_eq!(opened, 2);
}

#[tokio::test]
async fn test_empty_detail_pages_are_not_emitted() {
    let launcher = FakeLauncher::default();
    launcher.serve(&listing_url(1), listing_page(&[1, 2, 3]));
    launcher.serve(&detail_url(1), "<html><body><p>Stelle besetzt</p></body></html>");
    launcher.serve(&detail_url(2), detail_page("Zwei", "z@zwei.de"));
    launcher.serve(
        &detail_url(3),
        r#"<html><body><div class="additional__text"><a href="tel:0301">Anruf</a></div></body></html>"#,
    );

    let config = create_test_config(LISTING_START, 1);
    let report = Coordinator::for_url(config, launcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].company_name.as_deref(), Some("Zwei"));
    assert_eq!(report.records[1].company_name, None);
    assert_eq!(report.records[1].phone.as_deref(), Some("0301"));
    assert!(report.records.iter().all(ExtractionRecord::is_substantive));
    assert_eq!(report.detail_failures, 0);
}

// ===== Pacing =====

#[tokio::test(start_paused = true)]
async fn test_inter_page_delay_before_later_pages() {
    let launcher = FakeLauncher::default();
    for page in 1..=3 {
        launcher.serve(&directory_url(page), directory_page(&["Alpha"]));
    }

    let mut config = create_test_config(DIRECTORY_START, 3);
    config.inter_page_delay_secs = 2.0;

    let start = Instant::now();
    Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(
        launcher.goto_offsets(start),
        vec![
            (directory_url(1), Duration::ZERO),
            (directory_url(2), Duration::from_secs(2)),
            (directory_url(3), Duration::from_secs(4)),
        ]
    );
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_half_delay_after_each_detail() {
    let launcher = FakeLauncher::default();
    launcher.serve(&listing_url(1), listing_page(&[11, 12]));
    launcher.serve(&listing_url(2), listing_page(&[21]));
    launcher.serve(&detail_url(11), detail_page("Eins", "e@eins.de"));
    launcher.serve(&detail_url(12), detail_page("Zwei", "z@zwei.de"));
    launcher.serve(&detail_url(21), detail_page("Drei", "d@drei.de"));

    let mut config = create_test_config(LISTING_START, 2);
    config.inter_page_delay_secs = 1.0;

    let start = Instant::now();
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.records.len(), 3);
    assert_eq!(
        launcher.goto_offsets(start),
        vec![
            (listing_url(1), Duration::ZERO),
            (detail_url(11), Duration::ZERO),
            (detail_url(12), Duration::from_millis(500)),
            (listing_url(2), Duration::from_millis(2000)),
            (detail_url(21), Duration::from_millis(2000)),
        ]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn test_directory_settles_only_after_headings() {
    let launcher = FakeLauncher::default();
    launcher.serve(&directory_url(1), directory_page(&["Alpha"]));
    launcher.serve(&directory_url(2), "<html><body><p>Keine Treffer</p></body></html>");

    let mut config = create_test_config(DIRECTORY_START, 3);
    config.browser.timings.directory_settle = Duration::from_secs(2);

    let start = Instant::now();
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(names(&report.records), vec!["Alpha"]);
    assert_eq!(report.halted_at, Some(2));
    assert_eq!(
        launcher.goto_offsets(start),
        vec![
            (directory_url(1), Duration::ZERO),
            (directory_url(2), Duration::from_secs(2)),
        ]
    );
    // The empty page ends the run without a settle pause
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

// ===== Pre-flight and lifecycle =====

#[tokio::test]
async fn test_unsupported_site_never_launches() {
    let launcher = FakeLauncher::default();
    let sink = Arc::new(RecordingSink::default());

    let mut config = HarvestConfig::new("https://www.example.com/verzeichnis");
    config.inter_page_delay_secs = 0.5;
    let result = harvest(config, launcher.clone(), sink.clone()).await;

    assert!(matches!(
        result,
        Err(HarvestError::UnsupportedSite { ref url }) if url == "https://www.example.com/verzeichnis"
    ));
    assert!(launcher.events().is_empty());
    assert_eq!(sink.statuses(StatusLevel::Error).len(), 1);
}

#[tokio::test]
async fn test_invalid_config_never_launches() {
    let launcher = FakeLauncher::default();
    let mut config = HarvestConfig::new(DIRECTORY_START);
    config.page_count = 0;

    let result = harvest(config, launcher.clone(), Arc::new(RecordingSink::default())).await;

    assert!(matches!(result, Err(HarvestError::Config(_))));
    assert!(launcher.events().is_empty());
}

#[tokio::test]
async fn test_harvest_single_page() {
    let launcher = FakeLauncher::default();
    launcher.serve(&directory_url(1), directory_page(&["Alpha", "Beta"]));

    let mut config = HarvestConfig::new(DIRECTORY_START);
    config.page_count = 1;
    config.browser.timings = SiteTimings::immediate();

    let sink = Arc::new(RecordingSink::default());
    let report = harvest(config, launcher.clone(), sink.clone())
        .await
        .unwrap();

    assert_eq!(names(&report.records), vec!["Alpha", "Beta"]);
    let infos = sink.statuses(StatusLevel::Info);
    assert!(infos.iter().any(|i| i.contains("directory")));
    assert_eq!(launcher.visited(), vec![directory_url(1)]);
}

#[tokio::test]
async fn test_launch_failure_is_fatal() {
    let launcher = FakeLauncher::default();
    launcher.fail_launch();
    let sink = Arc::new(RecordingSink::default());

    let config = create_test_config(DIRECTORY_START, 2);
    let result = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .with_sink(sink.clone())
        .run()
        .await;

    assert!(matches!(result, Err(HarvestError::BrowserLaunch(_))));
    assert!(launcher.events().is_empty());
    assert_eq!(sink.statuses(StatusLevel::Error).len(), 1);
}

#[tokio::test]
async fn test_browser_closed_when_every_page_fails() {
    let launcher = FakeLauncher::default();
    launcher.fail(&directory_url(1));
    launcher.fail(&directory_url(2));

    let config = create_test_config(DIRECTORY_START, 2);
    let report = Coordinator::for_url(config, launcher.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.pages_failed, 2);
    assert_eq!(report.final_state, CrawlState::Closed);

    let events = launcher.events();
    assert!(events.contains(&Event::ClosePage(0)));
    assert_eq!(events.last(), Some(&Event::CloseBrowser));
    assert_eq!(launcher.open_pages(), 0);
}

#[test]
fn test_for_url_rejects_unknown_host() {
    let config = create_test_config("https://altenpflege.example.org/liste", 1);
    let result = Coordinator::for_url(config, FakeLauncher::default());
    assert!(matches!(result, Err(HarvestError::UnsupportedSite { .. })));
}

// ===== Real browser =====

#[tokio::test]
#[ignore = "requires a local Chrome/Chromium installation"]
async fn test_chromium_directory_crawl() {
    use directory_harvest::browser::ChromiumLauncher;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anbieter"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(directory_page(&["Alpha", "Beta"]))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/anbieter"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Keine Treffer</p></body></html>")
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let mut config = HarvestConfig::new(format!("{}/anbieter", mock_server.uri()));
    config.page_count = 3;
    config.inter_page_delay_secs = 0.5;
    config.browser.timings = SiteTimings {
        listing_link_wait: Duration::from_secs(2),
        directory_heading_wait: Duration::from_secs(2),
        directory_settle: Duration::ZERO,
    };

    // 127.0.0.1 matches no site, so the family is given explicitly
    let report = Coordinator::new(config, SiteFamily::Directory, ChromiumLauncher::new())
        .run()
        .await
        .expect("Chromium harvest failed");

    assert_eq!(names(&report.records), vec!["Alpha", "Beta"]);
    assert_eq!(report.halted_at, Some(2));
}
