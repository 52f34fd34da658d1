//! Page address resolution for the supported pagination conventions
//!
//! Three conventions are recognized, checked in order:
//! 1. Solr-style `tx_solr[page]=N` (brackets literal or percent-encoded)
//! 2. Plain `page=N` query parameter
//! 3. Neither present: a parameter is appended, its name chosen by site family

use crate::url::{classify_site, SiteFamily};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SOLR_PAGE_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(tx_solr(?:%5B|\[)page(?:%5D|\])=)\d+")
        .expect("solr page regex is hardcoded and valid")
});

static PLAIN_PAGE_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:^|[?&;])page=)\d+")
        .expect("page regex is hardcoded and valid")
});

/// Encoded parameter appended for listing-family URLs
const SOLR_PAGE_APPEND: &str = "tx_solr%5Bpage%5D";

/// Returns the URL of page `page_number` for the list starting at `base_url`
///
/// Only the numeric page value is touched when a page parameter already
/// exists; every other part of the URL is kept byte-for-byte. When no page
/// parameter exists one is appended, using `&` if the URL already has a query
/// string and `?` otherwise.
///
/// This never fails: malformed input simply falls through to the append
/// branch.
///
/// # Examples
///
/// ```
/// use directory_harvest::url::resolve_page_url;
///
/// assert_eq!(
///     resolve_page_url("https://x.example/?tx_solr%5Bpage%5D=3&foo=bar", 5),
///     "https://x.example/?tx_solr%5Bpage%5D=5&foo=bar"
/// );
/// assert_eq!(
///     resolve_page_url("https://x.example/list", 2),
///     "https://x.example/list?page=2"
/// );
/// ```
pub fn resolve_page_url(base_url: &str, page_number: u32) -> String {
    if SOLR_PAGE_PARAM.is_match(base_url) {
        return replace_page_value(&SOLR_PAGE_PARAM, base_url, page_number);
    }

    if PLAIN_PAGE_PARAM.is_match(base_url) {
        return replace_page_value(&PLAIN_PAGE_PARAM, base_url, page_number);
    }

    let separator = if base_url.contains('?') { '&' } else { '?' };
    let param = match classify_site(base_url) {
        Some(SiteFamily::Listing) => SOLR_PAGE_APPEND,
        _ => "page",
    };

    format!("{}{}{}={}", base_url, separator, param, page_number)
}

fn replace_page_value(pattern: &Regex, base_url: &str, page_number: u32) -> String {
    pattern
        .replace_all(base_url, |caps: &Captures| {
            format!("{}{}", &caps[1], page_number)
        })
        .into_owned()
}
