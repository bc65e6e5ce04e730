use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use claude_tracker::logging::init_logging;
use claude_tracker::tracker::{ReportOptions, UsageTracker};

#[derive(Parser)]
#[command(name = "claude-tracker")]
#[command(about = "Local usage telemetry and cost estimation for Claude Code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full usage report (default)
    Report {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Trailing window for the daily table, in days
        #[arg(long, default_value_t = 7)]
        days: i64,
        /// Number of projects in the top-N breakdown
        #[arg(long, default_value_t = 5)]
        top: usize,
        /// Model key for the equivalent-API-cost estimate
        #[arg(long, default_value = "claude-sonnet-4-20250514")]
        model: String,
        /// Parse at most N transcripts (newest first)
        #[arg(long)]
        limit: Option<usize>,
        /// Skip the API connectivity probe
        #[arg(long)]
        skip_probe: bool,
    },
    /// Show stored snapshots and API-call totals
    History,
    /// Run only the API connectivity probe
    Probe,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let tracker = UsageTracker::new();

    let result = match cli.command.unwrap_or(Commands::Report {
        json: false,
        days: 7,
        top: 5,
        model: "claude-sonnet-4-20250514".to_string(),
        limit: None,
        skip_probe: false,
    }) {
        Commands::Report {
            json,
            days,
            top,
            model,
            limit,
            skip_probe,
        } => {
            let options = ReportOptions {
                days,
                top,
                model,
                limit,
                skip_probe,
                json_output: json,
            };
            let json_output = options.json_output;
            match tracker.run_report(options).await {
                Ok(()) => Ok(()),
                Err(e) => return handle_error(e, json_output),
            }
        }
        Commands::History => tracker.run_history(),
        Commands::Probe => tracker.run_probe().await,
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => handle_error(e, false),
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
    } else {
        eprintln!("Error: {}", e);
    }
    process::exit(1);
}
