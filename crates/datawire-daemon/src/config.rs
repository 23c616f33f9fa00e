//! Monitor configuration.

use datawire_types::DayCalendar;
use std::time::Duration;

/// Timing and policy knobs for [`UsageMonitor`](crate::UsageMonitor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between persistence flushes.
    pub persist_interval: Duration,
    /// Interval between rollover checks.
    pub rollover_interval: Duration,
    /// Interval between alert checks.
    pub alert_interval: Duration,
    /// Length of the recent-activity window.
    pub activity_window: Duration,
    /// How long a query may take before the caller gets an error.
    pub query_timeout: Duration,
    /// Calendar used to bucket days.
    pub calendar: DayCalendar,
    /// Fire the usage alert at most once per calendar day.
    pub suppress_repeat_alerts: bool,
}

impl MonitorConfig {
    /// Default persistence interval (10 seconds).
    pub const DEFAULT_PERSIST_INTERVAL: Duration = Duration::from_secs(10);

    /// Default rollover check interval (1 hour).
    pub const DEFAULT_ROLLOVER_INTERVAL: Duration = Duration::from_secs(60 * 60);

    /// Default alert check interval (1 hour).
    pub const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_secs(60 * 60);

    /// Default recent-activity window (5 minutes).
    pub const DEFAULT_ACTIVITY_WINDOW: Duration = Duration::from_secs(5 * 60);

    /// Default query timeout (5 seconds).
    pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Sets the persistence interval.
    #[must_use]
    pub const fn with_persist_interval(mut self, interval: Duration) -> Self {
        self.persist_interval = interval;
        self
    }

    /// Sets the rollover check interval.
    #[must_use]
    pub const fn with_rollover_interval(mut self, interval: Duration) -> Self {
        self.rollover_interval = interval;
        self
    }

    /// Sets the alert check interval.
    #[must_use]
    pub const fn with_alert_interval(mut self, interval: Duration) -> Self {
        self.alert_interval = interval;
        self
    }

    /// Sets the query timeout.
    #[must_use]
    pub const fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the day calendar.
    #[must_use]
    pub const fn with_calendar(mut self, calendar: DayCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Enables or disables once-per-day alert suppression.
    #[must_use]
    pub const fn with_suppress_repeat_alerts(mut self, suppress: bool) -> Self {
        self.suppress_repeat_alerts = suppress;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            persist_interval: Self::DEFAULT_PERSIST_INTERVAL,
            rollover_interval: Self::DEFAULT_ROLLOVER_INTERVAL,
            alert_interval: Self::DEFAULT_ALERT_INTERVAL,
            activity_window: Self::DEFAULT_ACTIVITY_WINDOW,
            query_timeout: Self::DEFAULT_QUERY_TIMEOUT,
            calendar: DayCalendar::utc(),
            suppress_repeat_alerts: false,
        }
    }
}
