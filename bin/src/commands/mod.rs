//! CLI command implementations.

pub(crate) mod estimate;
pub(crate) mod reset;
pub(crate) mod run;
pub(crate) mod settings;
pub(crate) mod status;

use anyhow::{Context, Result};
use datawire_lib::{LogNotifier, MonitorConfig, Notifier, SystemClock, UsageMonitor, UsageStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Opens the store in `data_dir`, or the default data directory.
pub(crate) fn open_store(data_dir: Option<PathBuf>) -> Result<UsageStore> {
    let dir = data_dir.unwrap_or_else(UsageStore::default_path);
    UsageStore::open(dir.clone())
        .with_context(|| format!("Failed to open data directory '{}'", dir.display()))
}

/// Opens the store and loads it into a ready monitor.
pub(crate) async fn open_monitor(
    data_dir: Option<PathBuf>,
    config: MonitorConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<UsageMonitor> {
    let store = open_store(data_dir)?;
    let monitor = UsageMonitor::new(store, notifier, Arc::new(SystemClock), config);
    monitor.initialize().await;
    Ok(monitor)
}

/// Opens a monitor for one-shot commands that log instead of notifying.
pub(crate) async fn open_offline(data_dir: Option<PathBuf>) -> Result<UsageMonitor> {
    open_monitor(data_dir, MonitorConfig::default(), Arc::new(LogNotifier)).await
}
