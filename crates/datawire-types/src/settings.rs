//! User settings.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::DataWireError;

/// Default number of days of daily history to keep.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default UI refresh interval in seconds.
const DEFAULT_UPDATE_INTERVAL_SECS: u32 = 5;

/// Settings stored under the `settings` key.
///
/// Every field falls back to its default when absent or of the wrong type,
/// and unknown fields written by other front ends are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSettings")]
pub struct Settings {
    /// Whether usage alerts (and all other notifications) are enabled.
    pub usage_alerts: bool,
    /// Daily alert threshold in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<f64>,
    /// Days of daily history to keep.
    pub data_retention: u32,
    /// UI refresh interval in seconds. Not used by the engine.
    pub update_interval: u32,
}

impl Settings {
    /// Returns the alert threshold in megabytes if one is configured.
    ///
    /// Zero, negative and non-finite thresholds count as unset.
    #[must_use]
    pub fn threshold_mb(&self) -> Option<f64> {
        self.alert_threshold
            .filter(|mb| mb.is_finite() && *mb > 0.0)
    }

    /// Returns the retention window in days (never zero).
    #[must_use]
    pub fn retention_days(&self) -> u32 {
        if self.data_retention == 0 {
            DEFAULT_RETENTION_DAYS
        } else {
            self.data_retention
        }
    }

    /// Sets the alert threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is not a positive finite number.
    pub fn set_threshold(&mut self, megabytes: f64) -> Result<(), DataWireError> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(DataWireError::InvalidSetting {
                name: "alertThreshold",
                reason: format!("{megabytes} is not a positive number of megabytes"),
            });
        }
        self.alert_threshold = Some(megabytes);
        Ok(())
    }

    /// Sets the retention window.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is zero.
    pub fn set_retention(&mut self, days: u32) -> Result<(), DataWireError> {
        if days == 0 {
            return Err(DataWireError::InvalidSetting {
                name: "dataRetention",
                reason: "retention must be at least one day".to_string(),
            });
        }
        self.data_retention = days;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            usage_alerts: false,
            alert_threshold: None,
            data_retention: DEFAULT_RETENTION_DAYS,
            update_interval: DEFAULT_UPDATE_INTERVAL_SECS,
        }
    }
}

/// Settings as found in storage, each field decoded on its own.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredSettings {
    #[serde(deserialize_with = "lenient")]
    usage_alerts: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    alert_threshold: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    data_retention: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    update_interval: Option<u32>,
}

impl From<StoredSettings> for Settings {
    fn from(stored: StoredSettings) -> Self {
        let defaults = Self::default();
        Self {
            usage_alerts: stored.usage_alerts.unwrap_or(defaults.usage_alerts),
            alert_threshold: stored.alert_threshold,
            data_retention: stored.data_retention.unwrap_or(defaults.data_retention),
            update_interval: stored.update_interval.unwrap_or(defaults.update_interval),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

/// Decodes a value, mapping anything of the wrong type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Valid(value) => Some(value),
        Lenient::Invalid(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"usageAlerts": true}"#).unwrap();
        assert!(settings.usage_alerts);
        assert_eq!(settings.threshold_mb(), None);
        assert_eq!(settings.retention_days(), 30);
        assert_eq!(settings.update_interval, 5);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let settings: Settings =
            serde_json::from_str(r#"{"alertThreshold": 500, "theme": "dark"}"#).unwrap();
        assert_eq!(settings.threshold_mb(), Some(500.0));
    }

    #[test]
    fn test_wrong_typed_field_keeps_the_others() {
        let settings: Settings = serde_json::from_str(
            r#"{"usageAlerts": true, "alertThreshold": 250, "dataRetention": "30", "updateInterval": null}"#,
        )
        .unwrap();
        assert!(settings.usage_alerts);
        assert_eq!(settings.threshold_mb(), Some(250.0));
        assert_eq!(settings.data_retention, DEFAULT_RETENTION_DAYS);
        assert_eq!(settings.update_interval, 5);

        let settings: Settings =
            serde_json::from_str(r#"{"usageAlerts": "yes", "dataRetention": -3}"#).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_zero_threshold_is_unset() {
        let settings = Settings {
            alert_threshold: Some(0.0),
            ..Settings::default()
        };
        assert_eq!(settings.threshold_mb(), None);
    }

    #[test]
    fn test_setters_validate() {
        let mut settings = Settings::default();
        assert!(settings.set_threshold(-1.0).is_err());
        assert!(settings.set_threshold(f64::NAN).is_err());
        assert!(settings.set_retention(0).is_err());

        settings.set_threshold(250.0).unwrap();
        settings.set_retention(7).unwrap();
        assert_eq!(settings.threshold_mb(), Some(250.0));
        assert_eq!(settings.retention_days(), 7);
    }
}
