//! Recent transfer activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Direction;

/// One observed transfer in the recent-activity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// When the transfer was recorded (epoch milliseconds on the wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Transfer direction.
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Estimated bytes.
    pub bytes: u64,
    /// Domain the transfer was attributed to.
    pub domain: String,
}

impl ActivityRecord {
    /// Creates a new activity record.
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        direction: Direction,
        bytes: u64,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            direction,
            bytes,
            domain: domain.into(),
        }
    }
}

/// Instantaneous transfer rate in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRate {
    /// Upload bytes per second.
    pub upload: u64,
    /// Download bytes per second.
    pub download: u64,
}
