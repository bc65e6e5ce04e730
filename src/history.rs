//! Persistent Usage History
//!
//! A small JSON-file-backed store with two append-only lists: periodic
//! aggregate snapshots and individual API-call records. The file is loaded
//! fully at startup and rewritten wholesale (pretty-printed) on every
//! append; a missing, unreadable, or malformed file is treated as an empty
//! store rather than an error. Single local user, single process - no
//! concurrent-writer protection is attempted.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Most recent snapshots retained across appends.
pub const SNAPSHOT_RETENTION: usize = 100;
/// Most recent API-call records retained across appends.
pub const API_CALL_RETENTION: usize = 1000;

/// Point-in-time rollup of aggregate totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    /// Grand total of all four token categories.
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub total_sessions: u64,
}

/// One recorded call against the Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tokens_in: u64,
    #[serde(default)]
    pub tokens_out: u64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub cost: f64,
}

/// Summed totals over the stored API-call records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApiTotals {
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost: f64,
    pub calls: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryData {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
    #[serde(default)]
    api_calls: Vec<ApiCallRecord>,
}

pub struct HistoryStore {
    path: PathBuf,
    data: HistoryData,
}

impl HistoryStore {
    /// Load the history file, falling back to an empty store when the file
    /// is missing or cannot be decoded.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(file = %path.display(), error = %e, "history file malformed, starting empty");
                HistoryData::default()
            }),
            Err(_) => HistoryData::default(),
        };

        Self {
            path: path.to_path_buf(),
            data,
        }
    }

    /// Append a snapshot, enforce retention, and persist.
    pub fn add_snapshot(&mut self, snapshot: Snapshot) -> Result<()> {
        self.data.snapshots.push(snapshot);
        trim_to_last(&mut self.data.snapshots, SNAPSHOT_RETENTION);
        self.save()
    }

    /// Append an API-call record, enforce retention, and persist.
    pub fn add_api_call(&mut self, call: ApiCallRecord) -> Result<()> {
        self.data.api_calls.push(call);
        trim_to_last(&mut self.data.api_calls, API_CALL_RETENTION);
        self.save()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.data.snapshots
    }

    pub fn api_calls(&self) -> &[ApiCallRecord] {
        &self.data.api_calls
    }

    /// Totals across all stored API-call records.
    pub fn api_totals(&self) -> ApiTotals {
        let mut totals = ApiTotals::default();
        for call in &self.data.api_calls {
            totals.tokens_in += call.tokens_in;
            totals.tokens_out += call.tokens_out;
            totals.cost += call.cost;
            totals.calls += 1;
        }
        totals
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&self.data)
            .context("Failed to serialize history")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))?;
        Ok(())
    }
}

fn trim_to_last<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        items.drain(..items.len() - cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot(tokens: u64) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            total_tokens: tokens,
            total_messages: 1,
            total_sessions: 1,
        }
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::load(&dir.path().join("none.json"));
        assert!(store.snapshots().is_empty());
        assert!(store.api_calls().is_empty());
        assert_eq!(store.api_totals(), ApiTotals::default());
    }

    #[test]
    fn test_corrupt_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_history.json");
        fs::write(&path, "{not json at all").unwrap();
        let store = HistoryStore::load(&path);
        assert!(store.snapshots().is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_history.json");

        let mut store = HistoryStore::load(&path);
        store.add_snapshot(snapshot(12345)).unwrap();

        let reloaded = HistoryStore::load(&path);
        assert_eq!(reloaded.snapshots().len(), 1);
        assert_eq!(reloaded.snapshots()[0].total_tokens, 12345);
    }

    #[test]
    fn test_snapshot_retention_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_history.json");

        let mut store = HistoryStore::load(&path);
        for i in 0..(SNAPSHOT_RETENTION as u64 + 20) {
            store.add_snapshot(snapshot(i)).unwrap();
        }
        assert_eq!(store.snapshots().len(), SNAPSHOT_RETENTION);
        // Oldest entries were dropped, newest kept.
        assert_eq!(store.snapshots().last().unwrap().total_tokens, 119);
        assert_eq!(store.snapshots()[0].total_tokens, 20);
    }

    #[test]
    fn test_api_totals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage_history.json");

        let mut store = HistoryStore::load(&path);
        for (tin, tout, cost) in [(10, 20, 0.5), (5, 5, 0.25)] {
            store
                .add_api_call(ApiCallRecord {
                    timestamp: Utc::now(),
                    tokens_in: tin,
                    tokens_out: tout,
                    model: "claude-sonnet-4-20250514".into(),
                    cost,
                })
                .unwrap();
        }

        let totals = store.api_totals();
        assert_eq!(totals.tokens_in, 15);
        assert_eq!(totals.tokens_out, 25);
        assert_eq!(totals.calls, 2);
        assert!((totals.cost - 0.75).abs() < f64::EPSILON);
    }
}
