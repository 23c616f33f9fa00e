//! Calendar day keys.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::DataWireError;

/// Identity of one calendar day, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Wraps a date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the underlying date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Number of whole days from `self` to `later` (negative if `later` is earlier).
    #[must_use]
    pub fn days_until(&self, later: Self) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for DayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = DataWireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|source| DataWireError::InvalidDay {
                value: s.to_string(),
                source,
            })
    }
}

/// Maps instants to calendar days using a fixed UTC offset.
///
/// Day boundaries fall on local midnight for the configured offset, which
/// keeps bucketing independent of the host locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCalendar {
    offset: FixedOffset,
}

impl DayCalendar {
    /// Calendar with midnight boundaries at UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar for a fixed offset.
    #[must_use]
    pub const fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Calendar for an offset expressed in minutes east of UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is not strictly within +/- 24 hours.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, DataWireError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::with_offset)
            .ok_or(DataWireError::InvalidOffset(minutes))
    }

    /// Returns the configured offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the calendar day containing `instant`.
    #[must_use]
    pub fn day_of(&self, instant: DateTime<Utc>) -> DayKey {
        DayKey(instant.with_timezone(&self.offset).date_naive())
    }

    /// Returns the day `days` calendar days before the day containing `instant`.
    #[must_use]
    pub fn days_before(&self, instant: DateTime<Utc>, days: u32) -> DayKey {
        let today = self.day_of(instant).0;
        DayKey(
            today
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        )
    }
}

impl Default for DayCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_day_boundaries() {
        let calendar = DayCalendar::utc();
        let before = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();

        assert_eq!(calendar.day_of(before).to_string(), "2024-05-01");
        assert_eq!(calendar.day_of(after).to_string(), "2024-05-02");
    }

    #[test]
    fn test_offset_shifts_day() {
        let calendar = DayCalendar::from_offset_minutes(-300).unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 0).unwrap();
        assert_eq!(calendar.day_of(instant).to_string(), "2024-05-01");
    }

    #[test]
    fn test_invalid_offset() {
        assert!(matches!(
            DayCalendar::from_offset_minutes(24 * 60),
            Err(DataWireError::InvalidOffset(_))
        ));
    }

    #[test]
    fn test_days_before() {
        let calendar = DayCalendar::utc();
        let instant = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        assert_eq!(calendar.days_before(instant, 30).to_string(), "2024-02-04");
    }

    #[test]
    fn test_day_key_parse_and_order() {
        let a: DayKey = "2024-01-31".parse().unwrap();
        let b: DayKey = "2024-02-01".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.days_until(b), 1);
        assert!("yesterday".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_day_key_as_json_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("2024-01-31".parse::<DayKey>().unwrap(), 1u64);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"2024-01-31":1}"#);

        let back: std::collections::BTreeMap<DayKey, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
