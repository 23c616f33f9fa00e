//! Read-only views of ledger state.

use datawire_types::{ActivityRecord, DayKey, Session, UsageTotals};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Daily history keyed by calendar day.
pub type DailyUsage = BTreeMap<DayKey, UsageTotals>;

/// Per-domain totals keyed by hostname.
pub type SiteUsage = BTreeMap<String, UsageTotals>;

/// Consistent copy of everything the ledger tracks, as served to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    /// Current session.
    pub current_session: Session,
    /// Daily history.
    pub daily_usage: DailyUsage,
    /// Per-domain totals.
    pub site_usage: SiteUsage,
    /// Recent-activity window contents.
    pub realtime_data: Vec<ActivityRecord>,
    /// Upload + download for today.
    pub today_total: u64,
}

impl UsageSnapshot {
    /// Returns domains sorted by total bytes, largest first.
    #[must_use]
    pub fn top_sites(&self, limit: usize) -> Vec<(&str, UsageTotals)> {
        let mut sites: Vec<_> = self
            .site_usage
            .iter()
            .map(|(domain, totals)| (domain.as_str(), *totals))
            .collect();
        sites.sort_by(|a, b| b.1.total().cmp(&a.1.total()).then_with(|| a.0.cmp(b.0)));
        sites.truncate(limit);
        sites
    }

    /// Returns the most recent `limit` days, newest first.
    #[must_use]
    pub fn recent_days(&self, limit: usize) -> Vec<(DayKey, UsageTotals)> {
        self.daily_usage
            .iter()
            .rev()
            .take(limit)
            .map(|(day, totals)| (*day, *totals))
            .collect()
    }
}

/// Durable part of the ledger as loaded from storage.
///
/// Every part is optional; missing parts fall back to defaults on restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurableState {
    /// Stored daily history.
    pub daily_usage: Option<DailyUsage>,
    /// Stored per-domain totals.
    pub site_usage: Option<SiteUsage>,
    /// Stored session.
    pub current_session: Option<Session>,
}

/// Borrowed view of the durable part of the ledger, for persistence.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurableView<'a> {
    /// Daily history.
    pub daily_usage: &'a DailyUsage,
    /// Per-domain totals.
    pub site_usage: &'a SiteUsage,
    /// Current session.
    pub current_session: &'a Session,
}
