//! Usage alerts and the notification collaborator.

use async_trait::async_trait;
use datawire_estimate::format_bytes;
use datawire_types::{DayKey, Settings};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Prefix applied to every notification title.
const TITLE_PREFIX: &str = "DataWire";

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// A notification the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub message: String,
}

impl NotificationIntent {
    /// Creates an intent with the product prefix on the title.
    #[must_use]
    pub fn new(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: format!("{TITLE_PREFIX}: {title}"),
            message: message.into(),
        }
    }

    /// Alert for today's usage exceeding the threshold.
    #[must_use]
    pub fn high_usage(today_bytes: u64, threshold_mb: f64) -> Self {
        Self::new(
            "High Data Usage Alert",
            format!(
                "You've used {} today, exceeding your {threshold_mb}MB threshold.",
                format_bytes(today_bytes)
            ),
        )
    }

    /// Confirmation of a session reset from the keyboard shortcut.
    #[must_use]
    pub fn session_reset() -> Self {
        Self::new("Session Reset", "Your current session data has been reset.")
    }
}

/// Errors reported by a [`Notifier`].
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notification mechanism is not available.
    #[error("Notifications unavailable: {0}")]
    Unavailable(String),

    /// Writing the notification failed.
    #[error("Failed to deliver notification: {0}")]
    Io(#[from] std::io::Error),
}

/// Displays notification intents.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be delivered.
    async fn notify(&self, intent: &NotificationIntent) -> Result<(), NotifyError>;
}

/// Notifier that writes intents to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, intent: &NotificationIntent) -> Result<(), NotifyError> {
        tracing::info!(title = %intent.title, message = %intent.message, "notification");
        Ok(())
    }
}

/// Decides when today's usage warrants an alert.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    suppress_repeat: bool,
    last_fired: Option<DayKey>,
}

impl AlertEvaluator {
    /// Creates an evaluator. With `suppress_repeat`, the alert fires at most
    /// once per day; otherwise it fires on every check while over threshold.
    #[must_use]
    pub const fn new(suppress_repeat: bool) -> Self {
        Self {
            suppress_repeat,
            last_fired: None,
        }
    }

    /// Evaluates one check for `today` with `today_bytes` recorded so far.
    pub fn evaluate(
        &mut self,
        settings: &Settings,
        today: DayKey,
        today_bytes: u64,
    ) -> Option<NotificationIntent> {
        if !settings.usage_alerts {
            return None;
        }
        let threshold = settings.threshold_mb()?;

        let used_mb = today_bytes as f64 / BYTES_PER_MEGABYTE;
        if used_mb <= threshold {
            return None;
        }
        if self.suppress_repeat && self.last_fired == Some(today) {
            tracing::debug!(%today, "usage alert already sent today");
            return None;
        }

        self.last_fired = Some(today);
        Some(NotificationIntent::high_usage(today_bytes, threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn enabled(threshold: f64) -> Settings {
        Settings {
            usage_alerts: true,
            alert_threshold: Some(threshold),
            ..Settings::default()
        }
    }

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_alert_message() {
        let intent = NotificationIntent::high_usage(150 * MB, 100.0);
        assert_eq!(intent.title, "DataWire: High Data Usage Alert");
        assert_eq!(
            intent.message,
            "You've used 150 MB today, exceeding your 100MB threshold."
        );
    }

    #[test]
    fn test_fires_only_strictly_over_threshold() {
        let mut evaluator = AlertEvaluator::default();
        let today = day("2024-06-15");
        assert!(evaluator.evaluate(&enabled(100.0), today, 100 * MB).is_none());
        assert!(evaluator.evaluate(&enabled(100.0), today, 100 * MB + 1).is_some());
    }

    #[test]
    fn test_disabled_or_unset_never_fires() {
        let mut evaluator = AlertEvaluator::default();
        let today = day("2024-06-15");

        let mut settings = enabled(1.0);
        settings.usage_alerts = false;
        assert!(evaluator.evaluate(&settings, today, 500 * MB).is_none());

        let settings = Settings {
            usage_alerts: true,
            ..Settings::default()
        };
        assert!(evaluator.evaluate(&settings, today, 500 * MB).is_none());
    }

    #[test]
    fn test_repeats_every_check_by_default() {
        let mut evaluator = AlertEvaluator::new(false);
        let today = day("2024-06-15");
        assert!(evaluator.evaluate(&enabled(1.0), today, 2 * MB).is_some());
        assert!(evaluator.evaluate(&enabled(1.0), today, 2 * MB).is_some());
    }

    #[test]
    fn test_suppression_is_per_day() {
        let mut evaluator = AlertEvaluator::new(true);
        let settings = enabled(1.0);
        assert!(evaluator.evaluate(&settings, day("2024-06-15"), 2 * MB).is_some());
        assert!(evaluator.evaluate(&settings, day("2024-06-15"), 3 * MB).is_none());
        assert!(evaluator.evaluate(&settings, day("2024-06-16"), 2 * MB).is_some());
    }
}
