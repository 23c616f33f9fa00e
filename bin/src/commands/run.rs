//! Foreground monitor fed by JSON lines.
//!
//! Every input line is one of: a request event (`{"event": ...}`), a UI query
//! (`{"action": ...}`) or a shortcut command (`{"command": ...}`). Query
//! responses and notifications are written to stdout as JSON lines; logs go
//! to stderr.

use super::open_monitor;
use crate::notify::{JsonLines, StdoutNotifier};
use anyhow::{Context, Result};
use datawire_lib::{DayCalendar, InboundMessage, MonitorConfig, Scheduler, UsageMonitor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Options for [`run`].
pub(crate) struct RunOptions {
    pub(crate) events: Option<PathBuf>,
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) utc_offset_minutes: i32,
    pub(crate) persist_interval: u64,
    pub(crate) suppress_repeat_alerts: bool,
}

/// Execute the run command.
pub(crate) async fn run(options: RunOptions) -> Result<()> {
    let calendar = DayCalendar::from_offset_minutes(options.utc_offset_minutes)
        .context("Invalid --utc-offset-minutes")?;
    let config = MonitorConfig::default()
        .with_calendar(calendar)
        .with_persist_interval(Duration::from_secs(options.persist_interval.max(1)))
        .with_suppress_repeat_alerts(options.suppress_repeat_alerts);

    let output = JsonLines::stdout();
    let notifier = Arc::new(StdoutNotifier::new(output.clone()));
    let monitor = Arc::new(open_monitor(options.data_dir, config, notifier).await?);
    let scheduler = Scheduler::spawn(Arc::clone(&monitor));

    let input: Box<dyn AsyncBufRead + Send + Unpin> = match &options.events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let result = pump(&monitor, input, &output).await;
    scheduler.shutdown().await;
    result
}

async fn pump(
    monitor: &UsageMonitor,
    input: Box<dyn AsyncBufRead + Send + Unpin>,
    output: &JsonLines,
) -> Result<()> {
    let mut lines = input.lines();
    let mut processed = 0u64;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                handle_line(monitor, &line, output).await?;
                processed += 1;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    tracing::info!(processed, "input finished");
    Ok(())
}

async fn handle_line(monitor: &UsageMonitor, line: &str, output: &JsonLines) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let message = match InboundMessage::parse(line) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed input line");
            return Ok(());
        }
    };

    match message {
        InboundMessage::Event(event) => {
            monitor.handle_event(event).await;
        }
        InboundMessage::Query(query) => {
            let response = monitor.handle_query_with_timeout(query).await;
            output
                .write(&response)
                .await
                .context("Failed to write response")?;
        }
        InboundMessage::Command(command) => monitor.handle_command(command).await,
    }

    Ok(())
}
