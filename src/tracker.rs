//! Usage Tracking Engine
//!
//! Orchestrates the full report pass: discover transcript files, parse each
//! one into per-session statistics, aggregate, derive cost, persist a
//! snapshot, optionally probe the API, and render. Sessions are parsed
//! independently and sequentially; nothing here shares mutable state across
//! sources.
//!
//! Failure policy follows the rest of the crate: unreadable sources and a
//! failed probe are reported and absorbed, and only the inability to produce
//! the report at all (no transcripts directory is fine, a broken history
//! write is not) bubbles up as an error.

use crate::aggregator::Aggregator;
use crate::config::get_config;
use crate::cost::CostCalculator;
use crate::display::ReportDisplay;
use crate::file_discovery::FileDiscovery;
use crate::history::{HistoryStore, Snapshot};
use crate::models::{DailyRow, SessionStats, TokenBundle};
use crate::parser::SessionParser;
use crate::pricing::pricing;
use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

/// Options for a report pass.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Trailing window for the daily table, in days.
    pub days: i64,
    /// Number of projects in the top-N breakdown.
    pub top: usize,
    /// Model key used for the equivalent-API-cost estimate.
    pub model: String,
    /// Parse at most this many transcript files (newest first).
    pub limit: Option<usize>,
    pub skip_probe: bool,
    pub json_output: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            days: 7,
            top: 5,
            model: "claude-sonnet-4-20250514".to_string(),
            limit: None,
            skip_probe: false,
            json_output: false,
        }
    }
}

pub struct UsageTracker {
    parser: SessionParser,
    discovery: FileDiscovery,
    display: ReportDisplay,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            parser: SessionParser::new(),
            discovery: FileDiscovery::new(),
            display: ReportDisplay::new(),
        }
    }

    /// Parse all discovered transcripts into session statistics, dropping
    /// sessions without any user message.
    pub fn collect_sessions(&self, limit: Option<usize>) -> Result<Vec<SessionStats>> {
        let mut files = self.discovery.find_transcripts()?;
        if let Some(limit) = limit {
            files.truncate(limit);
        }

        let mut sessions = Vec::with_capacity(files.len());
        for file in &files {
            let stats = self.parser.parse(file);
            if let Some(failure) = &stats.parse_failure {
                warn!(source = %file.display(), error = %failure, "transcript unreadable");
            }
            if !stats.is_empty() {
                sessions.push(stats);
            }
        }

        info!(
            discovered = files.len(),
            kept = sessions.len(),
            "collected session statistics"
        );
        Ok(sessions)
    }

    /// Full report pass: aggregate, price, snapshot, probe, render.
    pub async fn run_report(&self, options: ReportOptions) -> Result<()> {
        let config = get_config();
        let sessions = self.collect_sessions(options.limit)?;

        let agg = Aggregator::aggregate(&sessions);
        let cost = CostCalculator::cost_for_tokens(
            &TokenBundle::from(&agg),
            &options.model,
            pricing(),
        );
        let daily = Aggregator::daily_stats(&sessions, options.days);
        let top = Aggregator::top_projects(&sessions, options.top);

        let mut history = HistoryStore::load(&config.paths.history_file);
        if agg.session_count > 0 {
            history.add_snapshot(Snapshot {
                timestamp: Utc::now(),
                total_tokens: agg.total_all_tokens(),
                total_messages: agg.message_count,
                total_sessions: agg.session_count,
            })?;
        }

        let probe_outcome = if options.skip_probe || !config.probe_enabled() {
            None
        } else {
            Some(self.run_probe_once(&mut history).await)
        };

        if options.json_output {
            let daily_rows: Vec<DailyRow> = daily
                .iter()
                .map(|(date, bucket)| DailyRow {
                    date: *date,
                    bucket: *bucket,
                })
                .collect();
            let probe_json = match &probe_outcome {
                None => serde_json::Value::Null,
                Some(Ok(result)) => serde_json::json!({
                    "status": "success",
                    "model": result.model,
                    "tokensIn": result.tokens_in,
                    "tokensOut": result.tokens_out,
                    "cost": result.cost,
                }),
                Some(Err(e)) => serde_json::json!({ "error": e.to_string() }),
            };
            let output = serde_json::json!({
                "aggregate": &agg,
                "cost": &cost,
                "daily": daily_rows,
                "topProjects": &top,
                "probe": probe_json,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        self.display.local_usage(&agg, &cost, &daily, &top);

        self.display.section("CLAUDE API - PLATFORM");
        match &probe_outcome {
            None if options.skip_probe => {}
            None => self.display.probe_disabled(),
            Some(Ok(result)) => self.display.probe_success(&result.model, result.cost),
            Some(Err(e)) => self.display.probe_failure(&e.to_string()),
        }
        self.display.api_history(&history.api_totals());

        let equivalent = (agg.session_count > 0).then_some(cost.total_cost);
        self.display.plan(config.plan, equivalent);
        self.display.pricing_reference(pricing());

        println!();
        println!("  History saved to: {}", history.path().display());
        Ok(())
    }

    /// Print stored history without re-scanning transcripts.
    pub fn run_history(&self) -> Result<()> {
        let config = get_config();
        let history = HistoryStore::load(&config.paths.history_file);

        self.display.section("USAGE HISTORY");
        println!();
        println!("  Snapshots stored : {}", history.snapshots().len());
        if let Some(last) = history.snapshots().last() {
            println!(
                "  Latest snapshot  : {} ({} tokens, {} messages, {} sessions)",
                last.timestamp.format("%Y-%m-%d %H:%M:%S"),
                crate::display::format_number(last.total_tokens),
                last.total_messages,
                last.total_sessions
            );
        }
        self.display.api_history(&history.api_totals());
        Ok(())
    }

    /// Run only the connectivity probe and record the call.
    pub async fn run_probe(&self) -> Result<()> {
        let config = get_config();
        self.display.section("CLAUDE API - PLATFORM");

        if !config.probe_enabled() {
            self.display.probe_disabled();
            return Ok(());
        }

        let mut history = HistoryStore::load(&config.paths.history_file);
        match self.run_probe_once(&mut history).await {
            Ok(result) => self.display.probe_success(&result.model, result.cost),
            Err(e) => self.display.probe_failure(&e.to_string()),
        }
        Ok(())
    }

    #[cfg(feature = "probe")]
    async fn run_probe_once(
        &self,
        history: &mut HistoryStore,
    ) -> Result<crate::probe::ProbeResult> {
        let config = get_config();
        let probe = crate::probe::ApiProbe::new(config.probe.clone())?;
        let result = probe.run().await?;
        history.add_api_call(crate::history::ApiCallRecord {
            timestamp: Utc::now(),
            tokens_in: result.tokens_in,
            tokens_out: result.tokens_out,
            model: result.model.clone(),
            cost: result.cost,
        })?;
        Ok(result)
    }

    #[cfg(not(feature = "probe"))]
    async fn run_probe_once(&self, _history: &mut HistoryStore) -> Result<ProbeResultStub> {
        anyhow::bail!("built without the probe feature")
    }
}

#[cfg(not(feature = "probe"))]
#[derive(Debug, Clone)]
pub struct ProbeResultStub {
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost: f64,
}
