//! Settings command.

use super::open_offline;
use crate::display::print_settings;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// View settings, applying any requested changes first.
pub(crate) async fn settings(
    data_dir: Option<PathBuf>,
    alerts: Option<bool>,
    threshold: Option<f64>,
    retention: Option<u32>,
) -> Result<()> {
    let monitor = open_offline(data_dir).await?;
    let mut settings = monitor.settings().await;
    let changed = alerts.is_some() || threshold.is_some() || retention.is_some();

    if let Some(enabled) = alerts {
        settings.usage_alerts = enabled;
    }
    if let Some(mb) = threshold {
        settings.set_threshold(mb)?;
    }
    if let Some(days) = retention {
        settings.set_retention(days)?;
    }

    if changed {
        monitor
            .update_settings(settings.clone())
            .await
            .context("Failed to save settings")?;
        println!("Settings saved.");
        println!();
    }

    print_settings(&settings);
    Ok(())
}
