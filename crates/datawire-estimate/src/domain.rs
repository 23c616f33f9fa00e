//! Hostname extraction.

use url::Url;

/// Domain used when a URL cannot be attributed to a host.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Returns the hostname of `url`, or [`UNKNOWN_DOMAIN`] if it has none.
///
/// Hosts are normalized by the URL parser (lowercase, IDNA, bracketed IPv6).
///
/// # Example
///
/// ```
/// use datawire_estimate::extract_domain;
///
/// assert_eq!(extract_domain("https://Example.COM:8443/path?q=1"), "example.com");
/// assert_eq!(extract_domain("not a url"), "unknown");
/// ```
#[must_use]
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string())
}
