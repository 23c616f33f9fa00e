//! Upload/download counters.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::DataWireError;

/// Direction of an observed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Bytes sent by the browser.
    Upload,
    /// Bytes received by the browser.
    Download,
}

impl Direction {
    /// Returns the direction as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Download => "download",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DataWireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upload" | "up" => Ok(Self::Upload),
            "download" | "down" => Ok(Self::Download),
            _ => Err(DataWireError::InvalidDirection(s.to_string())),
        }
    }
}

/// Upload and download byte counters for one scope (session, day or domain).
///
/// Both counters only grow until the owning scope is reset or cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    /// Estimated bytes uploaded.
    #[serde(default)]
    pub upload: u64,
    /// Estimated bytes downloaded.
    #[serde(default)]
    pub download: u64,
}

impl UsageTotals {
    /// Creates totals with the given counters.
    #[must_use]
    pub const fn new(upload: u64, download: u64) -> Self {
        Self { upload, download }
    }

    /// Zeroed totals.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Adds bytes to the counter for `direction`, saturating at `u64::MAX`.
    pub const fn add(&mut self, direction: Direction, bytes: u64) {
        match direction {
            Direction::Upload => self.upload = self.upload.saturating_add(bytes),
            Direction::Download => self.download = self.download.saturating_add(bytes),
        }
    }

    /// Returns the counter for `direction`.
    #[must_use]
    pub const fn get(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Upload => self.upload,
            Direction::Download => self.download,
        }
    }

    /// Returns upload + download.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.upload.saturating_add(self.download)
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.upload == 0 && self.download == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_by_direction() {
        let mut totals = UsageTotals::zero();
        totals.add(Direction::Upload, 1024);
        totals.add(Direction::Download, 5120);
        totals.add(Direction::Download, 2048);

        assert_eq!(totals, UsageTotals::new(1024, 7168));
        assert_eq!(totals.total(), 8192);
        assert_eq!(totals.get(Direction::Download), 7168);
    }

    #[test]
    fn test_add_saturates() {
        let mut totals = UsageTotals::new(u64::MAX - 1, 0);
        totals.add(Direction::Upload, 10);
        assert_eq!(totals.upload, u64::MAX);
        assert_eq!(totals.total(), u64::MAX);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("upload".parse::<Direction>().unwrap(), Direction::Upload);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Download);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let totals: UsageTotals = serde_json::from_str(r#"{"upload": 12}"#).unwrap();
        assert_eq!(totals, UsageTotals::new(12, 0));
    }
}
