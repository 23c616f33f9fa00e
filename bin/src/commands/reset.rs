//! Session reset and data clearing commands.

use super::open_offline;
use anyhow::{Context, Result};
use inquire::Confirm;
use std::path::PathBuf;

/// Start a new session in the stored state.
pub(crate) async fn reset_session(data_dir: Option<PathBuf>) -> Result<()> {
    let monitor = open_offline(data_dir).await?;
    monitor.reset_session().await;
    monitor
        .persist()
        .await
        .context("Failed to save the new session")?;

    println!("Session reset.");
    Ok(())
}

/// Delete all stored usage data after confirmation.
pub(crate) async fn clear(data_dir: Option<PathBuf>, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new("Delete all stored usage data?")
            .with_default(false)
            .with_help_message("Daily history, site totals and the current session are removed")
            .prompt()
            .context("Confirmation prompt failed")?;

        if !confirmed {
            println!("Nothing deleted.");
            return Ok(());
        }
    }

    let monitor = open_offline(data_dir).await?;
    monitor.clear_all().await;
    monitor
        .persist()
        .await
        .context("Failed to save cleared state")?;

    println!("All usage data cleared.");
    Ok(())
}
