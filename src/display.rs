//! Terminal Report Rendering
//!
//! Human-readable colored output for the usage report, mirroring the data
//! the tracker computes: local usage totals, equivalent API cost, daily
//! activity, top projects, probe outcome, stored history totals, plan
//! details, and the pricing reference table. Machine consumers use `--json`
//! and never touch this module.

use crate::config::Plan;
use crate::history::ApiTotals;
use crate::models::{AggregateStats, CostBreakdown, DailyBucket, ProjectUsage};
use crate::pricing::PricingTable;
use chrono::NaiveDate;
use colored::Colorize;
use std::collections::BTreeMap;

pub struct ReportDisplay;

impl Default for ReportDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportDisplay {
    pub fn new() -> Self {
        Self
    }

    pub fn section(&self, title: &str) {
        println!();
        println!("{}", "═".repeat(60));
        println!("  {}", title.bold());
        println!("{}", "═".repeat(60));
    }

    pub fn local_usage(
        &self,
        agg: &AggregateStats,
        cost: &CostBreakdown,
        daily: &BTreeMap<NaiveDate, DailyBucket>,
        top: &[ProjectUsage],
    ) {
        self.section("CLAUDE CODE - LOCAL USAGE");

        if agg.session_count == 0 {
            println!("  No Claude Code sessions found.");
            return;
        }

        println!();
        println!("  Sessions      : {}", agg.session_count);
        println!("  Projects      : {}", agg.projects.len());
        println!("  Messages sent : {}", format_number(agg.message_count));
        println!("  Tool calls    : {}", format_number(agg.tool_call_count));
        if agg.error_count > 0 {
            println!("  Errors        : {}", format_number(agg.error_count).red());
        }

        println!();
        println!("  {}", "TOKENS".bold());
        println!("    Input       : {}", format_number(agg.input_tokens));
        println!("    Output      : {}", format_number(agg.output_tokens));
        println!("    Cache read  : {}", format_number(agg.cache_read_tokens));
        println!("    Cache write : {}", format_number(agg.cache_write_tokens));
        println!("    {}", "─".repeat(30));
        println!(
            "    TOTAL       : {}",
            format_number(agg.total_all_tokens()).cyan()
        );

        println!();
        println!(
            "  {} ({})",
            "EQUIVALENT API COST".bold(),
            cost.model_key
        );
        println!("    Input       : {}", format_cost(cost.input_cost));
        println!("    Output      : {}", format_cost(cost.output_cost));
        println!("    Cache read  : {}", format_cost(cost.cache_read_cost));
        println!("    Cache write : {}", format_cost(cost.cache_write_cost));
        println!("    {}", "─".repeat(30));
        println!("    TOTAL       : {}", format_cost(cost.total_cost).green());

        if !agg.models_used.is_empty() {
            println!();
            println!("  {}", "Models used".bold());
            for model in &agg.models_used {
                println!("    • {}", model);
            }
        }

        if !daily.is_empty() {
            println!();
            println!("  {}", "RECENT DAILY USAGE".bold());
            println!(
                "    {:<12} {:>12} {:>10} {:>10}",
                "Date", "Tokens", "Messages", "Sessions"
            );
            for (date, bucket) in daily {
                println!(
                    "    {:<12} {:>12} {:>10} {:>10}",
                    date.format("%Y-%m-%d"),
                    format_number(bucket.tokens),
                    bucket.messages,
                    bucket.sessions
                );
            }
        }

        if !top.is_empty() {
            println!();
            println!("  {} (by tokens)", "TOP PROJECTS".bold());
            for p in top {
                println!(
                    "    • {:<24} {:>12} tokens  {:>8} messages",
                    p.project,
                    format_number(p.tokens),
                    p.messages
                );
            }
        }
    }

    pub fn probe_success(&self, model: &str, cost: f64) {
        println!("  {} Connection OK ({}, {})", "✓".green(), model, format_cost(cost));
    }

    pub fn probe_failure(&self, error: &str) {
        println!("  {} Probe failed: {}", "✗".red(), error);
    }

    pub fn probe_disabled(&self) {
        println!("  {} ANTHROPIC_API_KEY not configured, probe skipped", "⚠".yellow());
    }

    pub fn api_history(&self, totals: &ApiTotals) {
        if totals.calls == 0 {
            return;
        }
        println!();
        println!("  {}", "API HISTORY (this installation)".bold());
        println!("    Calls       : {}", totals.calls);
        println!("    Tokens in   : {}", format_number(totals.tokens_in));
        println!("    Tokens out  : {}", format_number(totals.tokens_out));
        println!("    Total cost  : {}", format_cost(totals.cost).green());
    }

    pub fn plan(&self, plan: Plan, equivalent_api_cost: Option<f64>) {
        self.section("CLAUDE SUBSCRIPTION");
        println!();
        println!("  Plan          : {}", plan.display_name().bold());
        println!("  Price         : {}/month", format_cost(plan.monthly_price()));
        println!("  Quota         : {}", plan.quota_description());

        if let Some(cost) = equivalent_api_cost {
            let price = plan.monthly_price();
            if price > 0.0 && cost > price {
                let savings = cost - price;
                println!();
                println!(
                    "  {} {} (API {} - plan {})",
                    "SAVINGS vs API:".bold(),
                    format_cost(savings).green(),
                    format_cost(cost),
                    format_cost(price)
                );
            }
        }
    }

    pub fn pricing_reference(&self, table: &PricingTable) {
        self.section("API PRICING REFERENCE (per 1M tokens)");
        println!();
        println!(
            "  {:<28} {:>9} {:>9} {:>9} {:>9}",
            "Model", "Input", "Output", "Cache R", "Cache W"
        );
        println!("  {}", "-".repeat(68));
        for key in table.model_keys() {
            let rates = table.for_model(key);
            println!(
                "  {:<28} {:>9} {:>9} {:>9} {:>9}",
                key,
                format!("${:.2}", rates.input),
                format!("${:.2}", rates.output),
                format!("${:.2}", rates.cache_read),
                format!("${:.2}", rates.cache_write)
            );
        }
    }
}

/// Thousands separated with spaces: 1234567 -> "1 234 567".
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Sub-dollar amounts keep four decimals so small probe costs stay visible.
pub fn format_cost(c: f64) -> String {
    if c < 1.0 {
        format!("${:.4}", c)
    } else {
        format!("${:.2}", c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1 000");
        assert_eq!(format_number(1234567), "1 234 567");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.1234), "$0.1234");
        assert_eq!(format_cost(0.99999), "$1.0000");
        assert_eq!(format_cost(18.0), "$18.00");
        assert_eq!(format_cost(1.0), "$1.00");
    }
}
