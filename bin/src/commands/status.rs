//! Stored usage report.

use super::open_offline;
use crate::display::{OutputFormat, print_snapshot};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Execute the status command.
pub(crate) async fn status(
    data_dir: Option<PathBuf>,
    format: OutputFormat,
    days: usize,
    sites: usize,
) -> Result<()> {
    let monitor = open_offline(data_dir).await?;
    let snapshot = monitor.snapshot().await;

    match format {
        OutputFormat::Text => print_snapshot(&snapshot, days, sites),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&snapshot).context("Failed to encode usage data")?;
            println!("{json}");
        }
    }

    Ok(())
}
