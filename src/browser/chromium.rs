//! Headless Chromium driver built on chromiumoxide
//!
//! The CDP event handler runs on its own task for the lifetime of the
//! session. Resource blocking uses the Fetch domain: matching requests are
//! paused by the browser and failed from a per-page listener task.

use crate::browser::{
    BrowserLauncher, BrowserSession, LoadCondition, PageHandle, ResourceKind, WaitCondition,
};
use crate::config::BrowserSettings;
use crate::{HarvestError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

/// Interval between checks of a `WaitCondition`
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Resolves once the document has been parsed
const DOM_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'interactive' || document.readyState === 'complete') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

/// Launches local Chromium processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }

    fn build_config(settings: &BrowserSettings) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().request_timeout(settings.request_timeout);

        // with_head means NOT headless
        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(ref executable) = settings.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &settings.extra_args {
            builder = builder.arg(arg);
        }

        builder.build().map_err(HarvestError::BrowserLaunch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self, settings: &BrowserSettings) -> Result<ChromiumSession> {
        tracing::info!("Launching browser (headless={})", settings.headless);

        let config = Self::build_config(settings)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| HarvestError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(ChromiumSession {
            browser,
            handler_task,
        })
    }
}

/// A running Chromium process and its event handler task
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn new_page(&mut self) -> Result<ChromiumPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to open page: {}", e)))?;

        Ok(ChromiumPage {
            page,
            interceptor: None,
        })
    }

    async fn block_resources(
        &mut self,
        page: &mut ChromiumPage,
        kinds: &[ResourceKind],
    ) -> Result<()> {
        let patterns: Vec<RequestPattern> = kinds
            .iter()
            .map(|kind| {
                RequestPattern::builder()
                    .url_pattern("*")
                    .resource_type(resource_type(*kind))
                    .request_stage(RequestStage::Request)
                    .build()
            })
            .collect();

        // Subscribe before enabling so no paused request is missed
        let mut paused = page
            .page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(|e| HarvestError::Browser(e.to_string()))?;

        page.page
            .execute(EnableParams::builder().patterns(patterns).build())
            .await
            .map_err(|e| HarvestError::Browser(e.to_string()))?;

        let target = page.page.clone();
        let interceptor = tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let abort =
                    FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
                if let Err(e) = target.execute(abort).await {
                    tracing::trace!("Failed to abort {}: {}", event.request.url, e);
                }
            }
        });

        if let Some(previous) = page.interceptor.replace(interceptor) {
            previous.abort();
        }

        tracing::debug!("Blocking {:?} requests on detail page", kinds);
        Ok(())
    }

    async fn close_page(&mut self, page: ChromiumPage) -> Result<()> {
        if let Some(interceptor) = page.interceptor {
            interceptor.abort();
        }

        page.page
            .close()
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to close page: {}", e)))
    }

    async fn close(mut self) -> Result<()> {
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| HarvestError::Browser(format!("failed to close browser: {}", e)));

        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process wait failed: {}", e);
        }
        self.handler_task.abort();

        tracing::info!("Browser closed");
        result
    }
}

/// A Chromium tab, with the request interceptor installed on it if any
pub struct ChromiumPage {
    page: Page,
    interceptor: Option<JoinHandle<()>>,
}

impl ChromiumPage {
    async fn navigate_dom_ready(&self, url: &str, limit: Duration) -> Result<()> {
        let deadline = Instant::now() + limit;

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| page_load(url, e))?;

        let response = timeout(limit, self.page.execute(params))
            .await
            .map_err(|_| HarvestError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| page_load(url, e))?;

        // Navigation errors (DNS, refused connection) come back as error_text
        if let Some(error_text) = response.result.error_text.as_deref() {
            return Err(page_load(url, error_text));
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        timeout(remaining, self.page.evaluate(DOM_READY_SCRIPT.to_string()))
            .await
            .map_err(|_| HarvestError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| page_load(url, e))?;

        Ok(())
    }

    async fn navigate_full_load(&self, url: &str, limit: Duration) -> Result<()> {
        timeout(limit, self.page.goto(url))
            .await
            .map_err(|_| HarvestError::Timeout {
                url: url.to_string(),
            })?
            .map_err(|e| page_load(url, e))?;

        Ok(())
    }

    async fn condition_holds(&self, script: &str, limit: Duration) -> bool {
        match timeout(limit, self.page.evaluate(script.to_string())).await {
            Ok(Ok(result)) => result.into_value::<bool>().unwrap_or(false),
            Ok(Err(e)) => {
                tracing::trace!("Wait condition check failed: {}", e);
                false
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn goto(&self, url: &str, until: LoadCondition, timeout: Duration) -> Result<()> {
        tracing::debug!("Navigating to {} (until {:?})", url, until);
        match until {
            LoadCondition::Load => self.navigate_full_load(url, timeout).await,
            LoadCondition::DomContentLoaded => self.navigate_dom_ready(url, timeout).await,
        }
    }

    async fn wait_for(&self, condition: &WaitCondition, timeout: Duration) -> Result<bool> {
        let script = condition.to_script();
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if self.condition_holds(&script, remaining.max(POLL_INTERVAL)).await {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                tracing::debug!("Timed out waiting for {:?}", condition);
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to read page content: {}", e)))
    }
}

fn resource_type(kind: ResourceKind) -> ResourceType {
    match kind {
        ResourceKind::Image => ResourceType::Image,
        ResourceKind::Media => ResourceType::Media,
        ResourceKind::Font => ResourceType::Font,
    }
}

fn page_load(url: &str, error: impl std::fmt::Display) -> HarvestError {
    HarvestError::PageLoad {
        url: url.to_string(),
        message: error.to_string(),
    }
}
