use url::Url;

/// Extracts the lowercase host from a URL string
///
/// Returns `None` when the string is not an absolute URL or has no host.
///
/// # Examples
///
/// ```
/// use directory_harvest::url::extract_domain;
///
/// assert_eq!(
///     extract_domain("https://EXAMPLE.COM/path"),
///     Some("example.com".to_string())
/// );
/// assert_eq!(extract_domain("/relative/path"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}
