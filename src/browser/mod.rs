//! Browser abstraction used by the crawler
//!
//! The crawl drives a browser through three small traits:
//! - `BrowserLauncher` starts a session
//! - `BrowserSession` owns the browser process and opens/closes pages
//! - `PageHandle` is what the site extractors read from
//!
//! `chromium` provides the headless Chromium implementation.

pub mod chromium;

pub use chromium::{ChromiumLauncher, ChromiumPage, ChromiumSession};

use crate::config::BrowserSettings;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Navigation milestone to wait for before `goto` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCondition {
    /// The full `load` event (subresources included)
    Load,
    /// DOM parsed; images and late scripts may still be loading
    DomContentLoaded,
}

/// A page condition awaited with a bounded timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// At least one element matches the CSS selector
    Selector(String),
    /// The rendered page text contains the string
    Text(String),
}

impl WaitCondition {
    /// Returns the JavaScript expression that evaluates to true once the
    /// condition holds
    pub fn to_script(&self) -> String {
        // serde_json escapes the argument into a valid JS string literal
        match self {
            Self::Selector(selector) => format!(
                "document.querySelector({}) !== null",
                serde_json::Value::from(selector.as_str())
            ),
            Self::Text(text) => format!(
                "!!document.body && document.body.innerText.includes({})",
                serde_json::Value::from(text.as_str())
            ),
        }
    }
}

/// Request types the detail page can refuse to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Media,
    Font,
}

/// Resource kinds a text-only detail page never needs
pub const HEAVY_RESOURCES: [ResourceKind; 3] =
    [ResourceKind::Image, ResourceKind::Media, ResourceKind::Font];

/// A single browser tab
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigates to `url`, failing with `HarvestError::Timeout` after `timeout`
    async fn goto(&self, url: &str, until: LoadCondition, timeout: Duration) -> Result<()>;

    /// Waits until `condition` holds
    ///
    /// Returns `Ok(false)` if the timeout elapses first.
    async fn wait_for(&self, condition: &WaitCondition, timeout: Duration) -> Result<bool>;

    /// Returns the current serialized DOM
    async fn content(&self) -> Result<String>;
}

/// An open browser process
#[async_trait]
pub trait BrowserSession: Send {
    type Page: PageHandle;

    /// Opens a new blank page
    async fn new_page(&mut self) -> Result<Self::Page>;

    /// Aborts every request of the given kinds made by `page`
    async fn block_resources(&mut self, page: &mut Self::Page, kinds: &[ResourceKind])
        -> Result<()>;

    /// Closes a page and releases its resources
    async fn close_page(&mut self, page: Self::Page) -> Result<()>;

    /// Shuts the browser down
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Starts browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    /// Launches a browser configured by `settings`
    async fn launch(&self, settings: &BrowserSettings) -> Result<Self::Session>;
}
