//! Trailing window of recent transfers.

use chrono::{DateTime, TimeDelta, Utc};
use datawire_types::{ActivityRecord, Direction, TransferRate};
use std::collections::VecDeque;
use std::time::Duration;

/// Trailing window of individual transfers, used for rate computation.
#[derive(Debug, Clone)]
pub struct RecentActivity {
    window: TimeDelta,
    records: VecDeque<ActivityRecord>,
}

impl RecentActivity {
    /// Default window length (5 minutes).
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

    /// Span used for the instantaneous rate.
    const RATE_SPAN: TimeDelta = TimeDelta::seconds(1);

    /// Creates an empty window of the given length.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
            records: VecDeque::new(),
        }
    }

    /// Returns the window length.
    #[must_use]
    pub const fn window(&self) -> TimeDelta {
        self.window
    }

    /// Appends a record and evicts everything that fell out of the window.
    pub fn push(&mut self, record: ActivityRecord, now: DateTime<Utc>) {
        self.records.push_back(record);
        self.evict(now);
    }

    /// Drops records with `timestamp <= now - window`.
    pub fn evict(&mut self, now: DateTime<Utc>) {
        let cutoff = now.checked_sub_signed(self.window).unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.records.retain(|r| r.timestamp > cutoff);
    }

    /// Bytes per direction recorded within the last second before `now`.
    #[must_use]
    pub fn rate(&self, now: DateTime<Utc>) -> TransferRate {
        let since = now - Self::RATE_SPAN;
        self.records
            .iter()
            .filter(|r| r.timestamp > since)
            .fold(TransferRate::default(), |mut rate, r| {
                match r.direction {
                    Direction::Upload => rate.upload = rate.upload.saturating_add(r.bytes),
                    Direction::Download => rate.download = rate.download.saturating_add(r.bytes),
                }
                rate
            })
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.records.iter()
    }

    /// Returns the records as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ActivityRecord> {
        self.records.iter().cloned().collect()
    }

    /// Number of records in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for RecentActivity {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}
