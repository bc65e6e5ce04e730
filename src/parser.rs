//! Transcript Parsing
//!
//! Turns one JSONL transcript file into one [`SessionStats`]. Parsing is
//! strictly line-oriented and fault-tolerant: a line that is not valid JSON
//! (or not an object) is skipped, an unparsable timestamp is ignored, and
//! only a failure to open or read the file itself aborts the parse - in
//! which case the stats come back with zeroed counters and `parse_failure`
//! set so the session still shows up in diagnostics.

use crate::models::{LogRecord, SessionStats};
use crate::timestamp_parser::TimestampParser;
use anyhow::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub struct SessionParser;

impl Default for SessionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a transcript file into session statistics.
    ///
    /// Never returns an error: unreadable sources are reported through
    /// [`SessionStats::parse_failure`] so one broken file cannot abort a
    /// whole report pass.
    pub fn parse(&self, path: &Path) -> SessionStats {
        let project = Self::extract_project_name(path);
        let mut stats = SessionStats::new(path.to_path_buf(), project);

        match self.scan_lines(path, &mut stats) {
            Ok(lines) => {
                debug!(source = %path.display(), lines, "parsed transcript");
            }
            Err(e) => {
                stats.parse_failure = Some(e.to_string());
            }
        }

        stats.models_used.sort();
        stats.models_used.dedup();
        stats
    }

    fn scan_lines(&self, path: &Path, stats: &mut SessionStats) -> Result<usize> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = 0;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            lines += 1;

            // Malformed lines are skipped without aborting the parse.
            if let Ok(record) = serde_json::from_str::<LogRecord>(line) {
                self.process_record(&record, stats);
            }
        }

        Ok(lines)
    }

    fn process_record(&self, record: &LogRecord, stats: &mut SessionStats) {
        if let Some(raw_ts) = &record.timestamp {
            // An unparsable timestamp does not invalidate the record.
            if let Ok(ts) = TimestampParser::parse(raw_ts) {
                if stats.start_time.map_or(true, |cur| ts < cur) {
                    stats.start_time = Some(ts);
                }
                if stats.end_time.map_or(true, |cur| ts > cur) {
                    stats.end_time = Some(ts);
                }
            }
        }

        if record.record_type == "user" {
            stats.message_count += 1;
        }

        if record.record_type == "assistant" {
            if let Some(message) = &record.message {
                if let Some(usage) = &message.usage {
                    stats.input_tokens += usage.input_tokens;
                    stats.output_tokens += usage.output_tokens;
                    stats.cache_read_tokens += usage.cache_read_input_tokens;
                    stats.cache_write_tokens += usage.cache_creation_input_tokens;
                }

                if let Some(model) = &message.model {
                    if !model.is_empty() && !stats.models_used.contains(model) {
                        stats.models_used.push(model.clone());
                    }
                }

                stats.tool_call_count += message
                    .content
                    .iter()
                    .filter(|item| item.item_type == "tool_use")
                    .count() as u64;
            }
        }

        if record.record_type.to_lowercase().contains("error") || is_truthy(&record.error) {
            stats.error_count += 1;
        }
    }

    /// Derive the project label from a transcript path.
    ///
    /// Transcripts live under `.../projects/<encoded>/<session>.jsonl` where
    /// `<encoded>` is either a plain name or a sanitized absolute path such
    /// as `-Users-alice-workspace-myproject`. For the sanitized form the
    /// last non-empty segment is the readable project name.
    pub fn extract_project_name(path: &Path) -> String {
        let segments: Vec<&str> = path
            .iter()
            .filter_map(|s| s.to_str())
            .collect();

        for (i, segment) in segments.iter().enumerate() {
            if *segment == "projects" {
                if let Some(&token) = segments.get(i + 1) {
                    if let Some(stripped) = token.strip_prefix('-') {
                        return stripped
                            .rsplit('-')
                            .find(|piece| !piece.is_empty())
                            .unwrap_or(token)
                            .to_string();
                    }
                    return token.to_string();
                }
            }
        }

        "unknown".to_string()
    }
}

/// Loose truthiness over an optional JSON value, matching how transcript
/// records flag errors (any non-null, non-false, non-empty payload).
fn is_truthy(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
