use crate::config::types::{BrowserSettings, HarvestConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Smallest number of list pages per run
pub const MIN_PAGE_COUNT: u32 = 1;

/// Largest number of list pages per run
pub const MAX_PAGE_COUNT: u32 = 50;

/// Shortest allowed pacing delay in seconds
pub const MIN_INTER_PAGE_DELAY_SECS: f64 = 0.5;

/// Longest allowed pacing delay in seconds
pub const MAX_INTER_PAGE_DELAY_SECS: f64 = 10.0;

/// Validates the entire configuration
pub fn validate(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_start_url(&config.start_url)?;
    validate_page_count(config.page_count)?;
    validate_delay(config.inter_page_delay_secs)?;
    validate_browser_settings(&config.browser)?;
    Ok(())
}

/// Validates the start URL: non-empty, absolute, HTTP(S)
fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    if start_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "start_url cannot be empty".to_string(),
        ));
    }

    if start_url.trim() != start_url {
        return Err(ConfigError::Validation(format!(
            "start_url '{}' has surrounding whitespace",
            start_url
        )));
    }

    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start_url '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "start_url '{}' must use http or https",
            start_url
        )));
    }

    Ok(())
}

fn validate_page_count(page_count: u32) -> Result<(), ConfigError> {
    if !(MIN_PAGE_COUNT..=MAX_PAGE_COUNT).contains(&page_count) {
        return Err(ConfigError::Validation(format!(
            "page_count must be between {} and {}, got {}",
            MIN_PAGE_COUNT, MAX_PAGE_COUNT, page_count
        )));
    }

    Ok(())
}

fn validate_delay(delay_secs: f64) -> Result<(), ConfigError> {
    // NaN fails the range check too
    if !(MIN_INTER_PAGE_DELAY_SECS..=MAX_INTER_PAGE_DELAY_SECS).contains(&delay_secs) {
        return Err(ConfigError::Validation(format!(
            "inter_page_delay must be between {} and {} seconds, got {}",
            MIN_INTER_PAGE_DELAY_SECS, MAX_INTER_PAGE_DELAY_SECS, delay_secs
        )));
    }

    Ok(())
}

fn validate_browser_settings(settings: &BrowserSettings) -> Result<(), ConfigError> {
    let timeouts = [
        ("list_navigation_timeout", settings.list_navigation_timeout),
        ("detail_navigation_timeout", settings.detail_navigation_timeout),
        ("request_timeout", settings.request_timeout),
    ];

    for (name, value) in timeouts {
        if value < Duration::from_secs(1) {
            return Err(ConfigError::Validation(format!(
                "{} must be at least 1s, got {:?}",
                name, value
            )));
        }
    }

    if let Some(ref executable) = settings.chrome_executable {
        if executable.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "chrome_executable cannot be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}
