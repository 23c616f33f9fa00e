//! Display utilities and output formatting for the datawire CLI.

use chrono::{DateTime, Local, Utc};
use clap::ValueEnum;
use datawire_lib::prelude::*;

/// Output format for reports.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Formats upload/download totals on one line.
pub(crate) fn totals_line(totals: UsageTotals) -> String {
    format!(
        "{:>10} total  ({} up, {} down)",
        format_bytes(totals.total()),
        format_bytes(totals.upload),
        format_bytes(totals.download),
    )
}

fn local_time(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Prints a usage snapshot as a text report.
pub(crate) fn print_snapshot(snapshot: &UsageSnapshot, days: usize, sites: usize) {
    let session = snapshot.current_session;
    println!("Session (since {})", local_time(session.start_time));
    println!("  {}", totals_line(session.totals));
    println!();

    println!("Today: {}", format_bytes(snapshot.today_total));
    println!();

    let recent = snapshot.recent_days(days);
    if !recent.is_empty() {
        println!("Daily usage:");
        for (day, totals) in recent {
            println!("  {day}  {}", totals_line(totals));
        }
        println!();
    }

    let top = snapshot.top_sites(sites);
    if top.is_empty() {
        println!("No site usage recorded.");
        return;
    }

    let width = top.iter().map(|(domain, _)| domain.len()).max().unwrap_or(0);
    println!("Top sites:");
    for (domain, totals) in top {
        println!("  {domain:<width$}  {}", totals_line(totals));
    }
}

/// Prints settings as a text report.
pub(crate) fn print_settings(settings: &Settings) {
    println!(
        "Alerts:     {}",
        if settings.usage_alerts { "on" } else { "off" }
    );
    println!(
        "Threshold:  {}",
        settings
            .threshold_mb()
            .map_or_else(|| "not set".to_string(), |mb| format!("{mb} MB"))
    );
    println!("Retention:  {} days", settings.retention_days());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_line() {
        let line = totals_line(UsageTotals::new(1024, 2048));
        assert!(line.contains("3 KB total"));
        assert!(line.contains("1 KB up"));
        assert!(line.contains("2 KB down"));
    }
}
