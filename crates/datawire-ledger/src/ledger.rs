//! The usage ledger.

use chrono::{DateTime, Utc};
use datawire_estimate::extract_domain;
use datawire_types::{
    ActivityRecord, DEFAULT_RETENTION_DAYS, DayCalendar, DayKey, Direction, Session,
    TransferRate, UsageTotals,
};
use std::time::Duration;

use crate::snapshot::{DailyUsage, DurableState, DurableView, SiteUsage, UsageSnapshot};
use crate::window::RecentActivity;

/// Result of a rollover check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// The day the check ran on.
    pub today: DayKey,
    /// True if today's bucket did not exist and was created.
    pub created: bool,
    /// Days removed by retention pruning.
    pub pruned: Vec<DayKey>,
}

/// Aggregates recorded transfers into session, day, domain and recent-activity views.
///
/// Every mutating method takes `&mut self` and completes all of its updates
/// before returning, so callers that serialize access (one lock, one task)
/// never expose a half-applied record.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    session: Session,
    daily: DailyUsage,
    sites: SiteUsage,
    recent: RecentActivity,
    calendar: DayCalendar,
    retention_days: u32,
}

impl UsageLedger {
    /// Creates an empty ledger whose session starts at `now`.
    ///
    /// Uses UTC day boundaries, a 5 minute activity window and 30 days of
    /// retention.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            session: Session::new(now),
            daily: DailyUsage::new(),
            sites: SiteUsage::new(),
            recent: RecentActivity::default(),
            calendar: DayCalendar::utc(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }

    /// Uses `calendar` for day bucketing.
    #[must_use]
    pub fn with_calendar(mut self, calendar: DayCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Uses an activity window of `window`.
    #[must_use]
    pub fn with_activity_window(mut self, window: Duration) -> Self {
        self.recent = RecentActivity::new(window);
        self
    }

    /// Keeps `days` days of history (minimum one).
    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.set_retention_days(days);
        self
    }

    /// Changes the retention window used by future rollovers.
    pub fn set_retention_days(&mut self, days: u32) {
        self.retention_days = days.max(1);
    }

    /// Returns the retention window in days.
    #[must_use]
    pub const fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Returns the day calendar.
    #[must_use]
    pub const fn calendar(&self) -> DayCalendar {
        self.calendar
    }

    /// Returns today's key.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> DayKey {
        self.calendar.day_of(now)
    }

    /// Validates an untyped byte count.
    ///
    /// Only finite, integral, strictly positive values are accepted.
    #[must_use]
    pub fn validate_bytes(value: f64) -> Option<u64> {
        if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Some(value as u64)
        } else {
            None
        }
    }

    /// Records uploaded bytes. See [`record`](Self::record).
    pub fn record_upload(&mut self, bytes: u64, url: &str, now: DateTime<Utc>) -> bool {
        self.record(Direction::Upload, bytes, url, now)
    }

    /// Records downloaded bytes. See [`record`](Self::record).
    pub fn record_download(&mut self, bytes: u64, url: &str, now: DateTime<Utc>) -> bool {
        self.record(Direction::Download, bytes, url, now)
    }

    /// Adds `bytes` to the session, today's bucket, the URL's domain bucket
    /// and the activity window.
    ///
    /// Zero-byte records are dropped and leave every view untouched. Returns
    /// whether the record was applied.
    pub fn record(
        &mut self,
        direction: Direction,
        bytes: u64,
        url: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if bytes == 0 {
            return false;
        }

        let domain = extract_domain(url);
        let today = self.calendar.day_of(now);

        self.session.add(direction, bytes);
        self.daily.entry(today).or_default().add(direction, bytes);
        self.sites
            .entry(domain.clone())
            .or_default()
            .add(direction, bytes);
        self.recent
            .push(ActivityRecord::new(now, direction, bytes, domain.as_str()), now);

        tracing::debug!(%direction, bytes, %domain, day = %today, "recorded transfer");
        true
    }

    /// Upload + download for today, without creating today's bucket.
    #[must_use]
    pub fn today_total(&self, now: DateTime<Utc>) -> u64 {
        self.daily
            .get(&self.calendar.day_of(now))
            .map_or(0, UsageTotals::total)
    }

    /// Instantaneous transfer rate from the activity window.
    #[must_use]
    pub fn transfer_rate(&self, now: DateTime<Utc>) -> TransferRate {
        self.recent.rate(now)
    }

    /// Returns a copy of all views.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> UsageSnapshot {
        UsageSnapshot {
            current_session: self.session,
            daily_usage: self.daily.clone(),
            site_usage: self.sites.clone(),
            realtime_data: self.recent.to_vec(),
            today_total: self.today_total(now),
        }
    }

    /// Borrows the parts of the ledger that are persisted.
    #[must_use]
    pub const fn durable_state(&self) -> DurableView<'_> {
        DurableView {
            daily_usage: &self.daily,
            site_usage: &self.sites,
            current_session: &self.session,
        }
    }

    /// Starts a new empty session; history and domains are untouched.
    pub fn reset_session(&mut self, now: DateTime<Utc>) {
        self.session = Session::new(now);
        tracing::info!("session reset");
    }

    /// Resets the session and empties history, domains and the activity window.
    pub fn clear_all(&mut self, now: DateTime<Utc>) {
        self.session = Session::new(now);
        self.daily.clear();
        self.sites.clear();
        self.recent.clear();
        tracing::info!("all usage data cleared");
    }

    /// Replaces the durable views with stored state and ensures today exists.
    ///
    /// Missing parts fall back to an empty map or a fresh session. Today's
    /// bucket is created through [`roll_over`](Self::roll_over), so stored
    /// history from before a long idle period is pruned on startup. The
    /// activity window is not persisted and is left as is.
    pub fn restore(&mut self, state: DurableState, now: DateTime<Utc>) -> RolloverOutcome {
        self.daily = state.daily_usage.unwrap_or_default();
        self.sites = state.site_usage.unwrap_or_default();
        self.session = state.current_session.unwrap_or_else(|| Session::new(now));

        tracing::info!(
            days = self.daily.len(),
            sites = self.sites.len(),
            "restored usage state"
        );

        self.roll_over(now)
    }

    /// Creates today's bucket if it is missing and, only in that case,
    /// prunes days older than the retention window.
    ///
    /// Pruning removes every day strictly before `today - retention_days`, so
    /// a single check after a long idle period catches up in one pass.
    pub fn roll_over(&mut self, now: DateTime<Utc>) -> RolloverOutcome {
        let today = self.calendar.day_of(now);

        if self.daily.contains_key(&today) {
            return RolloverOutcome {
                today,
                created: false,
                pruned: Vec::new(),
            };
        }

        self.daily.insert(today, UsageTotals::zero());

        let cutoff = self.calendar.days_before(now, self.retention_days);
        let pruned: Vec<DayKey> = self.daily.range(..cutoff).map(|(day, _)| *day).collect();
        for day in &pruned {
            self.daily.remove(day);
        }

        tracing::info!(%today, pruned = pruned.len(), "new day bucket created");

        RolloverOutcome {
            today,
            created: true,
            pruned,
        }
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Daily history.
    #[must_use]
    pub const fn daily_usage(&self) -> &DailyUsage {
        &self.daily
    }

    /// Per-domain totals.
    #[must_use]
    pub const fn site_usage(&self) -> &SiteUsage {
        &self.sites
    }

    /// Recent-activity window.
    #[must_use]
    pub const fn recent_activity(&self) -> &RecentActivity {
        &self.recent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_three_record_scenario() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);

        assert!(ledger.record_upload(1024, "https://example.com/test", now));
        assert!(ledger.record_download(5120, "https://google.com/search", now));
        assert!(ledger.record_download(2048, "https://github.com/test", now));

        let snapshot = ledger.snapshot(now);
        assert_eq!(snapshot.current_session.upload(), 1024);
        assert_eq!(snapshot.current_session.download(), 7168);
        assert_eq!(snapshot.site_usage["example.com"].upload, 1024);
        assert_eq!(snapshot.site_usage["google.com"].download, 5120);
        assert_eq!(snapshot.site_usage["github.com"].download, 2048);
        assert_eq!(snapshot.today_total, 8192);
        assert_eq!(snapshot.realtime_data.len(), 3);
    }

    #[test]
    fn test_zero_bytes_changes_nothing() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_upload(10, "https://a.com/", now);
        let before = ledger.snapshot(now);

        assert!(!ledger.record_upload(0, "https://a.com/", now));
        assert!(!ledger.record_download(0, "https://b.com/", now));

        assert_eq!(ledger.snapshot(now), before);
    }

    #[test]
    fn test_validate_bytes() {
        assert_eq!(UsageLedger::validate_bytes(512.0), Some(512));
        assert_eq!(UsageLedger::validate_bytes(0.0), None);
        assert_eq!(UsageLedger::validate_bytes(-3.0), None);
        assert_eq!(UsageLedger::validate_bytes(1.5), None);
        assert_eq!(UsageLedger::validate_bytes(f64::NAN), None);
        assert_eq!(UsageLedger::validate_bytes(f64::INFINITY), None);
    }

    #[test]
    fn test_unparseable_url_goes_to_unknown() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_download(99, "::not a url::", now);
        assert_eq!(ledger.site_usage()["unknown"].download, 99);
    }

    #[test]
    fn test_today_total_does_not_create_bucket() {
        let now = noon();
        let ledger = UsageLedger::new(now);
        assert_eq!(ledger.today_total(now), 0);
        assert!(ledger.daily_usage().is_empty());
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_upload(1, "https://a.com/", now);

        let first = ledger.snapshot(now);
        let second = ledger.snapshot(now);
        assert_eq!(first, second);
        assert_eq!(ledger.today_total(now), ledger.today_total(now));
    }

    #[test]
    fn test_activity_window_trimmed_on_record() {
        let start = noon();
        let mut ledger = UsageLedger::new(start);
        ledger.record_upload(1, "https://a.com/", start);
        ledger.record_upload(1, "https://a.com/", start + TimeDelta::seconds(60));

        let now = start + TimeDelta::minutes(5);
        ledger.record_upload(1, "https://a.com/", now);

        let cutoff = now - TimeDelta::minutes(5);
        assert!(ledger.recent_activity().iter().all(|r| r.timestamp > cutoff));
        assert_eq!(ledger.recent_activity().len(), 2);
    }

    #[test]
    fn test_reset_session_keeps_history() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_upload(100, "https://a.com/", now);
        let daily = ledger.daily_usage().clone();
        let sites = ledger.site_usage().clone();

        let later = now + TimeDelta::seconds(1);
        ledger.reset_session(later);

        assert_eq!(ledger.session().total(), 0);
        assert_eq!(ledger.session().start_time, later);
        assert_ne!(ledger.session().start_time, now);
        assert_eq!(ledger.daily_usage(), &daily);
        assert_eq!(ledger.site_usage(), &sites);
        assert_eq!(ledger.recent_activity().len(), 1);
    }

    #[test]
    fn test_durable_state_wire_keys() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_download(7, "https://a.com/", now);

        let json = serde_json::to_value(ledger.durable_state()).unwrap();
        assert_eq!(json["dailyUsage"]["2024-06-15"]["download"], 7);
        assert_eq!(json["siteUsage"]["a.com"]["download"], 7);
        assert_eq!(json["currentSession"]["startTime"], now.timestamp_millis());
    }

    #[test]
    fn test_clear_all() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_upload(100, "https://a.com/", now);
        ledger.record_download(100, "https://b.com/", now);

        ledger.clear_all(now + TimeDelta::seconds(1));

        assert_eq!(ledger.session().total(), 0);
        assert!(ledger.daily_usage().is_empty());
        assert!(ledger.site_usage().is_empty());
        assert!(ledger.recent_activity().is_empty());
    }

    #[test]
    fn test_rollover_prunes_old_days() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        let mut state = DurableState::default();
        let mut daily = DailyUsage::new();
        daily.insert(day("2024-05-11"), UsageTotals::new(1, 1)); // 35 days old
        daily.insert(day("2024-06-13"), UsageTotals::new(2, 2)); // 2 days old
        state.daily_usage = Some(daily);
        ledger.restore(state, now - TimeDelta::days(2));

        let outcome = ledger.roll_over(now);

        assert!(outcome.created);
        assert_eq!(outcome.today, day("2024-06-15"));
        assert_eq!(outcome.pruned, vec![day("2024-05-11")]);
        assert!(!ledger.daily_usage().contains_key(&day("2024-05-11")));
        assert_eq!(ledger.daily_usage()[&day("2024-06-13")], UsageTotals::new(2, 2));
        assert_eq!(ledger.daily_usage()[&day("2024-06-15")], UsageTotals::zero());
    }

    #[test]
    fn test_rollover_keeps_boundary_day() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        let mut daily = DailyUsage::new();
        daily.insert(day("2024-05-16"), UsageTotals::new(1, 0)); // exactly 30 days
        daily.insert(day("2024-05-15"), UsageTotals::new(1, 0)); // 31 days
        ledger.restore(
            DurableState {
                daily_usage: Some(daily),
                ..DurableState::default()
            },
            now - TimeDelta::days(1),
        );

        let outcome = ledger.roll_over(now);
        assert_eq!(outcome.pruned, vec![day("2024-05-15")]);
        assert!(ledger.daily_usage().contains_key(&day("2024-05-16")));
    }

    #[test]
    fn test_rollover_is_noop_when_today_exists() {
        let now = noon();
        let mut ledger = UsageLedger::new(now);
        ledger.record_upload(1, "https://a.com/", now);
        let mut old = DailyUsage::new();
        old.insert(day("2023-01-01"), UsageTotals::new(1, 1));
        old.extend(ledger.daily_usage().clone());
        ledger.restore(
            DurableState {
                daily_usage: Some(old),
                ..DurableState::default()
            },
            now,
        );

        let outcome = ledger.roll_over(now);
        assert!(!outcome.created);
        assert!(outcome.pruned.is_empty());
        assert!(ledger.daily_usage().contains_key(&day("2023-01-01")));
    }

    #[test]
    fn test_rollover_respects_retention_setting() {
        let now = noon();
        let mut ledger = UsageLedger::new(now).with_retention_days(7);
        let mut daily = DailyUsage::new();
        daily.insert(day("2024-06-01"), UsageTotals::new(1, 0));
        daily.insert(day("2024-06-14"), UsageTotals::new(1, 0));
        ledger.restore(
            DurableState {
                daily_usage: Some(daily),
                ..DurableState::default()
            },
            now - TimeDelta::days(1),
        );

        let outcome = ledger.roll_over(now);
        assert_eq!(outcome.pruned, vec![day("2024-06-01")]);
    }

    #[test]
    fn test_restore_defaults_and_today() {
        let now = noon();
        let mut ledger = UsageLedger::new(now - TimeDelta::hours(1));
        ledger.record_upload(5, "https://a.com/", now);

        ledger.restore(DurableState::default(), now);

        assert_eq!(ledger.session().total(), 0);
        assert_eq!(ledger.session().start_time, now);
        assert!(ledger.site_usage().is_empty());
        assert_eq!(ledger.daily_usage().len(), 1);
        assert_eq!(ledger.daily_usage()[&day("2024-06-15")], UsageTotals::zero());
    }

    #[test]
    fn test_restore_after_idle_prunes() {
        let now = noon();
        let mut daily = DailyUsage::new();
        daily.insert(day("2024-04-01"), UsageTotals::new(1, 0));
        daily.insert(day("2024-06-10"), UsageTotals::new(1, 0));

        let mut ledger = UsageLedger::new(now);
        let outcome = ledger.restore(
            DurableState {
                daily_usage: Some(daily),
                ..DurableState::default()
            },
            now,
        );

        assert!(outcome.created);
        assert_eq!(outcome.pruned, vec![day("2024-04-01")]);
        assert_eq!(ledger.daily_usage().len(), 2);
    }

    #[test]
    fn test_restore_keeps_stored_session() {
        let now = noon();
        let mut stored = Session::new(now - TimeDelta::days(3));
        stored.add(Direction::Download, 42);

        let mut ledger = UsageLedger::new(now);
        ledger.restore(
            DurableState {
                current_session: Some(stored),
                ..DurableState::default()
            },
            now,
        );
        assert_eq!(ledger.session(), &stored);
    }

    #[test]
    fn test_session_sum_survives_rollover_interleaving() {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 0).unwrap();
        let mut ledger = UsageLedger::new(start);
        let mut expected_up = 0;
        let mut expected_down = 0;

        for i in 0..10i64 {
            let now = start + TimeDelta::seconds(i * 20);
            let bytes = (i as u64 + 1) * 100;
            if i % 2 == 0 {
                ledger.record_upload(bytes, "https://a.com/", now);
                expected_up += bytes;
            } else {
                ledger.record_download(bytes, "https://b.com/", now);
                expected_down += bytes;
            }
            ledger.roll_over(now);
        }

        assert_eq!(ledger.session().upload(), expected_up);
        assert_eq!(ledger.session().download(), expected_down);
        assert_eq!(ledger.daily_usage().len(), 2);
    }

    #[test]
    fn test_calendar_offset_changes_bucket() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 2, 0, 0).unwrap();
        let calendar = DayCalendar::from_offset_minutes(-6 * 60).unwrap();
        let mut ledger = UsageLedger::new(now).with_calendar(calendar);
        ledger.record_upload(1, "https://a.com/", now);
        assert!(ledger.daily_usage().contains_key(&day("2024-06-14")));
    }
}
