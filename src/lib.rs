//! Claude Tracker Library
//!
//! Aggregates local Claude Code usage telemetry: scans JSONL session
//! transcripts, extracts per-session token, message, and tool-call
//! statistics, rolls them up across sessions, projects, and trailing time
//! windows, and converts token counts into estimated API cost. A rolling
//! history of snapshots and API-call records persists across runs, and an
//! optional connectivity probe verifies the configured credential against
//! the Messages API.
//!
//! ## Pipeline
//!
//! 1. **Discovery**: [`file_discovery`] enumerates `*.jsonl` transcripts
//!    under `~/.claude/projects`, newest first
//! 2. **Parsing**: [`parser`] turns each transcript into a
//!    [`SessionStats`], skipping malformed lines instead of failing
//! 3. **Aggregation**: [`aggregator`] reduces sessions into totals, daily
//!    buckets, and a top-N project breakdown
//! 4. **Costing**: [`cost`] prices token counts against the static
//!    [`pricing`] table
//! 5. **Persistence**: [`history`] appends capped snapshot and API-call
//!    records to a JSON history file
//! 6. **Reporting**: [`tracker`] orchestrates the pass and [`display`]
//!    renders it
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use claude_tracker::tracker::{ReportOptions, UsageTracker};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let tracker = UsageTracker::new();
//! tracker.run_report(ReportOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod cost;
pub mod display;
pub mod file_discovery;
pub mod history;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pricing;
pub mod timestamp_parser;
pub mod tracker;

#[cfg(feature = "probe")]
pub mod probe;

pub use models::*;
pub use tracker::UsageTracker;
