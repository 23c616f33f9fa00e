//! Transfer size estimation.

use serde::{Deserialize, Serialize};

use crate::data::DownloadRuleTable;

/// Bytes added per header for the `": "` separator and the CRLF terminator.
const HEADER_OVERHEAD_BYTES: u64 = 4;

/// Assumed request body size for POST requests.
const POST_BODY_ALLOWANCE_BYTES: u64 = 512;

/// A single HTTP header as reported by the network observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value, if the observer exposed one.
    #[serde(default)]
    pub value: Option<String>,
}

impl Header {
    /// Creates a header with a value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Parses a `"Name: value"` line.
    ///
    /// Returns `None` if there is no colon or the name is empty.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let (name, value) = line.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }

    /// Estimated on-the-wire size of this header line, counting UTF-8 bytes.
    #[must_use]
    pub fn wire_len(&self) -> u64 {
        let value_len = self.value.as_deref().map_or(0, str::len);
        (self.name.len() + value_len) as u64 + HEADER_OVERHEAD_BYTES
    }
}

/// Metadata of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMeta {
    /// Request URL.
    pub url: String,
    /// HTTP method, if known.
    #[serde(default)]
    pub method: Option<String>,
    /// Request headers.
    #[serde(default)]
    pub request_headers: Vec<Header>,
}

impl RequestMeta {
    /// Creates request metadata without headers.
    #[must_use]
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Some(method.into()),
            request_headers: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.request_headers.push(header);
        self
    }
}

/// What a response said about its body size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLength {
    /// No `content-length` header.
    Absent,
    /// A positive byte count; authoritative.
    Exact(u64),
    /// An explicit zero-length body.
    Empty,
    /// A header whose value is not a usable integer.
    Invalid,
}

impl ContentLength {
    /// Classifies the `content-length` header in `headers` (name compared
    /// case-insensitively, first occurrence wins).
    #[must_use]
    pub fn from_headers(headers: &[Header]) -> Self {
        headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case("content-length"))
            .map_or(Self::Absent, |h| {
                h.value.as_deref().map_or(Self::Invalid, Self::parse_value)
            })
    }

    /// Parses a header value by its leading decimal digits.
    #[must_use]
    pub fn parse_value(value: &str) -> Self {
        let trimmed = value.trim_start();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let digits_end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());

        match unsigned[..digits_end].parse::<u64>() {
            Ok(0) => Self::Empty,
            Ok(n) => Self::Exact(n),
            Err(_) => Self::Invalid,
        }
    }

    /// Returns the exact size, if the header carried one.
    #[must_use]
    pub const fn exact(&self) -> Option<u64> {
        match self {
            Self::Exact(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true if the URL-based fallback estimate should be used.
    #[must_use]
    pub const fn needs_fallback(&self) -> bool {
        matches!(self, Self::Absent | Self::Invalid)
    }
}

/// Size estimator backed by a download rule table.
#[derive(Debug, Clone, Copy)]
pub struct SizeEstimator {
    rules: &'static DownloadRuleTable,
}

impl SizeEstimator {
    /// Creates an estimator using the given rule table.
    #[must_use]
    pub const fn new(rules: &'static DownloadRuleTable) -> Self {
        Self { rules }
    }

    /// Returns an estimator using the embedded rule table.
    #[must_use]
    pub fn global() -> Self {
        Self::new(DownloadRuleTable::global())
    }

    /// Returns the rule table.
    #[must_use]
    pub const fn rules(&self) -> &'static DownloadRuleTable {
        self.rules
    }

    /// Estimates the bytes sent for a request.
    ///
    /// Header lines, the URL, the method and a fixed allowance for POST
    /// bodies. Zero means nothing measurable was supplied.
    #[must_use]
    pub fn upload_size(&self, request: &RequestMeta) -> u64 {
        let headers: u64 = request.request_headers.iter().map(Header::wire_len).sum();
        let method = request.method.as_deref().unwrap_or_default();
        let post_allowance = if method == "POST" {
            POST_BODY_ALLOWANCE_BYTES
        } else {
            0
        };

        headers + request.url.len() as u64 + method.len() as u64 + post_allowance
    }

    /// Estimates a response size from its URL alone.
    #[must_use]
    pub fn download_size_from_url(&self, url: &str) -> u64 {
        self.rules.estimate(url)
    }
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::global()
    }
}

/// Estimates upload bytes for a request using the embedded rules.
#[must_use]
pub fn estimate_upload_size(request: &RequestMeta) -> u64 {
    SizeEstimator::global().upload_size(request)
}

/// Estimates download bytes for a URL using the embedded rules.
#[must_use]
pub fn estimate_download_size_from_url(url: &str) -> u64 {
    SizeEstimator::global().download_size_from_url(url)
}

/// Formats bytes with binary units and up to two decimals ("1.5 KB", "2 MB").
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit < UNITS.len() - 1 && bytes / divisor >= 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = format!("{:.2}", bytes as f64 / divisor as f64);
    let value = value.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", value, UNITS[unit])
}

/// Short numeric label for a toolbar badge (at most four characters).
#[must_use]
pub fn badge_text(bytes: u64) -> String {
    let formatted = format_bytes(bytes);
    let number = formatted.split(' ').next().unwrap_or_default();
    let truncated: String = number.chars().take(4).collect();
    truncated.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_without_headers() {
        let url = "https://example.com/index.html";
        let request = RequestMeta::new(url, "GET");
        assert_eq!(estimate_upload_size(&request), url.len() as u64 + 3);
    }

    #[test]
    fn test_post_with_headers() {
        let request = RequestMeta::new("https://a.io/", "POST")
            .with_header(Header::new("Accept", "*/*"))
            .with_header(Header {
                name: "X-Empty".to_string(),
                value: None,
            });

        // (6 + 3 + 4) + (7 + 0 + 4) + 13 url + 4 method + 512
        assert_eq!(estimate_upload_size(&request), 13 + 11 + 13 + 4 + 512);
    }

    #[test]
    fn test_lengths_count_utf8_bytes() {
        let header = Header::new("X-Name", "é");
        assert_eq!(header.wire_len(), 6 + 2 + 4);

        let url = "https://例え.jp/";
        let request = RequestMeta::new(url, "GET");
        assert_eq!(estimate_upload_size(&request), url.len() as u64 + 3);
        assert_ne!(url.len(), url.chars().count());
    }

    #[test]
    fn test_nothing_measurable() {
        assert_eq!(estimate_upload_size(&RequestMeta::default()), 0);
    }

    #[test]
    fn test_download_heuristics() {
        assert_eq!(estimate_download_size_from_url("https://x.com/app.JS"), 50000);
        assert_eq!(estimate_download_size_from_url("https://x.com/site.css"), 20000);
        assert_eq!(estimate_download_size_from_url("https://x.com/a.jpeg"), 100000);
        assert_eq!(estimate_download_size_from_url("https://x.com/v.webm"), 1000000);
        assert_eq!(estimate_download_size_from_url("https://x.com/report.pdf"), 500000);
        assert_eq!(estimate_download_size_from_url("https://x.com/api/users"), 10000);
        assert_eq!(estimate_download_size_from_url("https://x.com/"), 5000);
        assert_eq!(estimate_download_size_from_url(""), 5000);
    }

    #[test]
    fn test_content_length_classification() {
        let headers = vec![Header::new("Content-Length", "2048")];
        assert_eq!(ContentLength::from_headers(&headers), ContentLength::Exact(2048));
        assert_eq!(ContentLength::from_headers(&[]), ContentLength::Absent);
        assert_eq!(ContentLength::parse_value("0"), ContentLength::Empty);
        assert_eq!(ContentLength::parse_value("12abc"), ContentLength::Exact(12));
        assert_eq!(ContentLength::parse_value("abc"), ContentLength::Invalid);
        assert_eq!(ContentLength::parse_value("-5"), ContentLength::Invalid);
        assert!(ContentLength::Invalid.needs_fallback());
        assert!(!ContentLength::Empty.needs_fallback());
        assert!(!ContentLength::Exact(1).needs_fallback());
    }

    #[test]
    fn test_header_parse_line() {
        let header = Header::parse_line("Cookie: a=b; c=d").unwrap();
        assert_eq!(header.name, "Cookie");
        assert_eq!(header.value.as_deref(), Some("a=b; c=d"));
        assert!(Header::parse_line("no colon").is_none());
        assert!(Header::parse_line(": value").is_none());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_bytes(1_610_612_736), "1.5 GB");
    }

    #[test]
    fn test_badge_text() {
        assert_eq!(badge_text(0), "0");
        assert_eq!(badge_text(1536), "1.5");
        assert_eq!(badge_text(1_288_490_189), "1.2");
        // "123.45" would end on a dot after truncation
        assert_eq!(badge_text(123 * 1024 * 1024 + 460_000), "123");
    }
}
