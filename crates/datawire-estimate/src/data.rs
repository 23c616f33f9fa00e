//! Download size rule table.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Embedded JSON with the URL sniffing rules.
const DOWNLOAD_ESTIMATES_JSON: &str = include_str!("../data/download_estimates.json");

/// Static rule table instance.
static RULES: OnceLock<DownloadRuleTable> = OnceLock::new();

/// One URL sniffing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRule {
    /// Short name of the resource class (e.g., "script", "image").
    pub label: String,
    /// Lowercase substrings, any of which selects this rule.
    pub patterns: Vec<String>,
    /// Estimated response size in bytes.
    pub bytes: u64,
}

impl DownloadRule {
    /// Creates a new rule.
    #[must_use]
    pub fn new(label: impl Into<String>, patterns: &[&str], bytes: u64) -> Self {
        Self {
            label: label.into(),
            patterns: patterns.iter().map(|p| p.to_ascii_lowercase()).collect(),
            bytes,
        }
    }

    /// Returns true if the already-lowercased URL contains any pattern.
    #[must_use]
    pub fn matches(&self, url_lower: &str) -> bool {
        self.patterns.iter().any(|p| url_lower.contains(p.as_str()))
    }
}

/// Ordered URL sniffing rules; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRuleTable {
    /// Size used when no rule matches.
    pub default_bytes: u64,
    /// Rules in priority order.
    pub rules: Vec<DownloadRule>,
}

impl DownloadRuleTable {
    /// Returns the global rule table.
    ///
    /// This lazily initializes the table from embedded JSON on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        RULES.get_or_init(|| {
            Self::from_json(DOWNLOAD_ESTIMATES_JSON)
                .expect("embedded download_estimates.json should be valid")
        })
    }

    /// Creates a rule table from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut table: Self = serde_json::from_str(json)?;
        for rule in &mut table.rules {
            for pattern in &mut rule.patterns {
                *pattern = pattern.to_ascii_lowercase();
            }
        }
        Ok(table)
    }

    /// Returns the first rule matching `url`, compared case-insensitively.
    #[must_use]
    pub fn matching_rule(&self, url: &str) -> Option<&DownloadRule> {
        let lower = url.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lower))
    }

    /// Returns the estimated size for `url`.
    #[must_use]
    pub fn estimate(&self, url: &str) -> u64 {
        self.matching_rule(url)
            .map_or(self.default_bytes, |rule| rule.bytes)
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for DownloadRuleTable {
    fn default() -> Self {
        Self::global().clone()
    }
}
