//! Text normalization helpers shared by the site extractors

use scraper::ElementRef;

/// Maximum number of characters kept from a description
pub const DESCRIPTION_LIMIT: usize = 300;

/// Marker appended to truncated descriptions
pub const ELLIPSIS: &str = "...";

/// Collapses every run of whitespace into a single space and trims the ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans text and returns `None` when nothing is left
pub fn non_empty(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Returns the cleaned text content of an element
pub fn element_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

/// Joins the element's text nodes with single spaces, dropping empty ones
///
/// Unlike `element_text`, adjacent text nodes are always separated, so
/// `<b>Arbeitsort:</b>Berlin` reads as `Arbeitsort: Berlin`.
pub fn joined_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts a description to `DESCRIPTION_LIMIT` characters and appends `...`
pub fn truncate_description(text: &str) -> String {
    let mut truncated: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Decodes a `mailto:` href into a bare address
///
/// The scheme is matched case-insensitively, the remainder is percent-decoded
/// and anything after `?` (subject, cc, ...) is dropped. Returns `None` unless
/// the result looks like an address.
pub fn decode_mailto(href: &str) -> Option<String> {
    let rest = strip_scheme(href, "mailto:")?;
    let decoded = percent_decode(rest);
    let address = decoded.split('?').next().unwrap_or_default().trim();

    if address.contains('@') {
        Some(address.to_string())
    } else {
        None
    }
}

/// Decodes a `tel:` href into the dialable number
pub fn decode_tel(href: &str) -> Option<String> {
    let rest = strip_scheme(href, "tel:")?;
    non_empty(&percent_decode(rest))
}

fn strip_scheme<'a>(href: &'a str, scheme: &str) -> Option<&'a str> {
    let href = href.trim();
    let prefix = href.get(..scheme.len())?;
    if prefix.eq_ignore_ascii_case(scheme) {
        Some(&href[scheme.len()..])
    } else {
        None
    }
}

fn percent_decode(text: &str) -> String {
    match urlencoding::decode(text) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(text.as_bytes())).into_owned(),
    }
}
