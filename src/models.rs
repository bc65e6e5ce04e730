//! Core Data Models
//!
//! This module defines the data structures used throughout the usage tracker.
//! They fall into two groups:
//!
//! 1. **Record schema**: [`LogRecord`], [`MessageData`], [`UsageData`],
//!    [`ContentItem`] - the lenient shape of a single JSONL transcript line.
//!    Every field defaults when missing, so a record never fails to decode
//!    just because the upstream schema drifted.
//! 2. **Derived statistics**: [`SessionStats`] (one per transcript),
//!    [`AggregateStats`] (totals across sessions), [`CostBreakdown`]
//!    (estimated USD cost), plus the [`DailyBucket`] and [`ProjectUsage`]
//!    report views.
//!
//! ## Data Flow
//!
//! JSONL lines -> [`LogRecord`] -> [`SessionStats`] -> [`AggregateStats`]
//! -> [`CostBreakdown`] / daily / top-N views.
//!
//! Two derived token totals exist on purpose: [`AggregateStats::total_tokens`]
//! counts conversation volume (input + output only), while
//! [`AggregateStats::total_all_tokens`] includes the cache categories that are
//! billed but are not part of the conversation itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One decoded line of a session transcript.
///
/// Transcripts interleave user turns, assistant turns, and bookkeeping
/// records; only the fields consumed here are modeled and all of them are
/// optional or defaulted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogRecord {
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<MessageData>,
    /// Free-form error payload; any truthy value counts as an error record.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MessageData {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<UsageData>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UsageData {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

/// Entry in an assistant message's content list. Only the discriminator is
/// needed, to count `tool_use` invocations.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContentItem {
    #[serde(rename = "type", default)]
    pub item_type: String,
}

/// Statistics extracted from a single transcript file.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub source: PathBuf,
    pub project: String,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "cacheReadTokens")]
    pub cache_read_tokens: u64,
    #[serde(rename = "cacheWriteTokens")]
    pub cache_write_tokens: u64,
    #[serde(rename = "messageCount")]
    pub message_count: u64,
    #[serde(rename = "toolCallCount")]
    pub tool_call_count: u64,
    /// Sorted, duplicate-free.
    #[serde(rename = "modelsUsed")]
    pub models_used: Vec<String>,
    #[serde(rename = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "errorCount")]
    pub error_count: u64,
    /// Set when the source itself could not be opened or read. Per-line
    /// decode failures are skipped silently and never recorded here.
    #[serde(rename = "parseFailure", skip_serializing_if = "Option::is_none")]
    pub parse_failure: Option<String>,
}

impl SessionStats {
    pub fn new(source: PathBuf, project: String) -> Self {
        Self {
            source,
            project,
            input_tokens: 0,
            output_tokens: 0,
            cache_read_tokens: 0,
            cache_write_tokens: 0,
            message_count: 0,
            tool_call_count: 0,
            models_used: Vec::new(),
            start_time: None,
            end_time: None,
            error_count: 0,
            parse_failure: None,
        }
    }

    /// A session with no user messages carries no reportable activity.
    pub fn is_empty(&self) -> bool {
        self.message_count == 0
    }

    /// Conversation volume: input + output, cache categories excluded.
    pub fn conversation_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Totals across all non-empty sessions, recomputed on demand.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    #[serde(rename = "totalSessions")]
    pub session_count: u64,
    #[serde(rename = "totalInputTokens")]
    pub input_tokens: u64,
    #[serde(rename = "totalOutputTokens")]
    pub output_tokens: u64,
    #[serde(rename = "totalCacheReadTokens")]
    pub cache_read_tokens: u64,
    #[serde(rename = "totalCacheWriteTokens")]
    pub cache_write_tokens: u64,
    #[serde(rename = "totalMessages")]
    pub message_count: u64,
    #[serde(rename = "totalToolCalls")]
    pub tool_call_count: u64,
    #[serde(rename = "totalErrors")]
    pub error_count: u64,
    /// Sorted, distinct.
    pub projects: Vec<String>,
    /// Sorted, distinct.
    #[serde(rename = "modelsUsed")]
    pub models_used: Vec<String>,
    #[serde(rename = "oldestSession")]
    pub oldest_session: Option<DateTime<Utc>>,
    #[serde(rename = "newestSession")]
    pub newest_session: Option<DateTime<Utc>>,
}

impl AggregateStats {
    /// Conversation volume across sessions (input + output only).
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Grand total of all four token categories, as billed.
    pub fn total_all_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.cache_read_tokens + self.cache_write_tokens
    }
}

/// Bundle of the four billable token counters, the input shape of the cost
/// calculator. Built from an [`AggregateStats`] or assembled directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBundle {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
}

impl From<&AggregateStats> for TokenBundle {
    fn from(agg: &AggregateStats) -> Self {
        Self {
            input_tokens: agg.input_tokens,
            output_tokens: agg.output_tokens,
            cache_read_tokens: agg.cache_read_tokens,
            cache_write_tokens: agg.cache_write_tokens,
        }
    }
}

/// Estimated USD cost of a token bundle under a given model's pricing.
#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    #[serde(rename = "inputCost")]
    pub input_cost: f64,
    #[serde(rename = "outputCost")]
    pub output_cost: f64,
    #[serde(rename = "cacheReadCost")]
    pub cache_read_cost: f64,
    #[serde(rename = "cacheWriteCost")]
    pub cache_write_cost: f64,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    /// The model key the rates were requested under, even when the table
    /// fell back to its default entry.
    #[serde(rename = "modelPricing")]
    pub model_key: String,
}

/// One calendar day of usage inside the trailing report window.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DailyBucket {
    pub tokens: u64,
    pub messages: u64,
    pub sessions: u64,
}

/// Per-project rollup for the top-N report, ordered descending by tokens.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectUsage {
    pub project: String,
    pub tokens: u64,
    pub messages: u64,
}

/// Serializable daily report row (the map key flattened out).
#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub bucket: DailyBucket,
}
