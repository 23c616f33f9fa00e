//! Current session counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Direction, UsageTotals};

/// Running totals since process start or the last explicit reset.
///
/// Serialized as `{"upload", "download", "startTime"}` with the start time in
/// epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session counters.
    #[serde(flatten)]
    pub totals: UsageTotals,
    /// When the session started.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
}

impl Session {
    /// Creates an empty session starting at `start_time`.
    #[must_use]
    pub const fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            totals: UsageTotals::zero(),
            start_time,
        }
    }

    /// Adds bytes to the session.
    pub const fn add(&mut self, direction: Direction, bytes: u64) {
        self.totals.add(direction, bytes);
    }

    /// Bytes uploaded this session.
    #[must_use]
    pub const fn upload(&self) -> u64 {
        self.totals.upload
    }

    /// Bytes downloaded this session.
    #[must_use]
    pub const fn download(&self) -> u64 {
        self.totals.download
    }

    /// Total bytes this session.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.totals.total()
    }
}
