//! datawire CLI - Browser network data usage estimator.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod notify;

use display::OutputFormat;

#[derive(Parser)]
#[command(name = "datawire")]
#[command(about = "Estimate and track browser network data usage", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (only warnings and errors are logged)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Data directory. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process request events, queries and commands as JSON lines
    Run {
        /// Read input from a file instead of stdin
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Offset of the local calendar day from UTC, in minutes
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        utc_offset_minutes: i32,

        /// Seconds between persistence flushes
        #[arg(long, default_value = "10")]
        persist_interval: u64,

        /// Send the usage alert at most once per day
        #[arg(long)]
        suppress_repeat_alerts: bool,
    },

    /// Show stored usage totals
    Status {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Number of recent days to show
        #[arg(long, default_value = "7")]
        days: usize,

        /// Number of top sites to show
        #[arg(long, default_value = "10")]
        sites: usize,
    },

    /// Start a new session
    ResetSession,

    /// Delete all stored usage data
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// View or change settings
    Settings {
        /// Enable or disable alerts and notifications
        #[arg(long, value_parser = parse_switch)]
        alerts: Option<bool>,

        /// Daily alert threshold in megabytes
        #[arg(long)]
        threshold: Option<f64>,

        /// Days of daily history to keep
        #[arg(long)]
        retention: Option<u32>,
    },

    /// Show the size estimates for a request
    Estimate {
        /// Request URL
        url: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request header ("Name: value"), may be repeated
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got '{s}'")),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let default_filter = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_logging(cli.verbose, cli.quiet);
    let data_dir = cli.data_dir;

    match command {
        Commands::Run {
            events,
            utc_offset_minutes,
            persist_interval,
            suppress_repeat_alerts,
        } => {
            let options = commands::run::RunOptions {
                events,
                data_dir,
                utc_offset_minutes,
                persist_interval,
                suppress_repeat_alerts,
            };
            commands::run::run(options).await
        }
        Commands::Status {
            format,
            days,
            sites,
        } => commands::status::status(data_dir, format, days, sites).await,
        Commands::ResetSession => commands::reset::reset_session(data_dir).await,
        Commands::Clear { yes } => commands::reset::clear(data_dir, yes).await,
        Commands::Settings {
            alerts,
            threshold,
            retention,
        } => commands::settings::settings(data_dir, alerts, threshold, retention).await,
        Commands::Estimate {
            url,
            method,
            headers,
        } => commands::estimate::estimate(&url, &method, &headers),
    }
}
