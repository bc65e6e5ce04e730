//! Session Aggregation
//!
//! Pure reducers over slices of [`SessionStats`]: overall totals, daily
//! buckets over a trailing window, and a top-N project breakdown. Sessions
//! without any user message are excluded everywhere - callers usually filter
//! them already, but the reducers are safe against being handed empties.
//!
//! All time arithmetic is in UTC. Timestamps are normalized to UTC at
//! ingestion and the daily cutoff is computed against a UTC "now", so a
//! session lands in the same bucket regardless of the host timezone.

use crate::models::{AggregateStats, DailyBucket, ProjectUsage, SessionStats};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub struct Aggregator;

impl Aggregator {
    /// Combine per-session statistics into overall totals.
    pub fn aggregate(sessions: &[SessionStats]) -> AggregateStats {
        let mut agg = AggregateStats::default();
        let mut projects = BTreeSet::new();
        let mut models = BTreeSet::new();

        for s in sessions.iter().filter(|s| !s.is_empty()) {
            agg.session_count += 1;
            agg.input_tokens += s.input_tokens;
            agg.output_tokens += s.output_tokens;
            agg.cache_read_tokens += s.cache_read_tokens;
            agg.cache_write_tokens += s.cache_write_tokens;
            agg.message_count += s.message_count;
            agg.tool_call_count += s.tool_call_count;
            agg.error_count += s.error_count;
            projects.insert(s.project.clone());
            models.extend(s.models_used.iter().cloned());

            if let Some(start) = s.start_time {
                if agg.oldest_session.map_or(true, |cur| start < cur) {
                    agg.oldest_session = Some(start);
                }
            }
            if let Some(end) = s.end_time {
                if agg.newest_session.map_or(true, |cur| end > cur) {
                    agg.newest_session = Some(end);
                }
            }
        }

        agg.projects = projects.into_iter().collect();
        agg.models_used = models.into_iter().collect();
        agg
    }

    /// Daily usage buckets for the trailing `window_days`, keyed by UTC
    /// calendar date, ascending.
    pub fn daily_stats(
        sessions: &[SessionStats],
        window_days: i64,
    ) -> BTreeMap<NaiveDate, DailyBucket> {
        Self::daily_stats_at(sessions, window_days, Utc::now())
    }

    /// Same as [`daily_stats`](Self::daily_stats) with an explicit "now",
    /// so the window cutoff is deterministic under test.
    pub fn daily_stats_at(
        sessions: &[SessionStats],
        window_days: i64,
        now: DateTime<Utc>,
    ) -> BTreeMap<NaiveDate, DailyBucket> {
        let cutoff = now - Duration::days(window_days);
        let mut daily: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();

        for s in sessions.iter().filter(|s| !s.is_empty()) {
            // Sessions without a valid end timestamp cannot be bucketed.
            let Some(end) = s.end_time else { continue };
            if end <= cutoff {
                continue;
            }

            let bucket = daily.entry(end.date_naive()).or_default();
            bucket.tokens += s.conversation_tokens();
            bucket.messages += s.message_count;
            bucket.sessions += 1;
        }

        daily
    }

    /// The `n` projects with the highest conversation-token volume,
    /// descending. Ties keep the order in which the projects were first
    /// seen in the input.
    pub fn top_projects(sessions: &[SessionStats], n: usize) -> Vec<ProjectUsage> {
        let mut order: Vec<ProjectUsage> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for s in sessions.iter().filter(|s| !s.is_empty()) {
            let idx = *index.entry(s.project.clone()).or_insert_with(|| {
                order.push(ProjectUsage {
                    project: s.project.clone(),
                    tokens: 0,
                    messages: 0,
                });
                order.len() - 1
            });
            order[idx].tokens += s.conversation_tokens();
            order[idx].messages += s.message_count;
        }

        // Vec::sort_by is stable, preserving discovery order on ties.
        order.sort_by(|a, b| b.tokens.cmp(&a.tokens));
        order.truncate(n);
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn session(project: &str, input: u64, output: u64, messages: u64) -> SessionStats {
        let mut s = SessionStats::new(PathBuf::from("s.jsonl"), project.to_string());
        s.input_tokens = input;
        s.output_tokens = output;
        s.message_count = messages;
        s
    }

    fn at(ts: &str) -> DateTime<Utc> {
        ts.parse().unwrap()
    }

    #[test]
    fn test_aggregate_sums_and_unions() {
        let mut a = session("alpha", 100, 50, 3);
        a.models_used = vec!["m1".into()];
        a.start_time = Some(at("2026-02-01T10:00:00Z"));
        a.end_time = Some(at("2026-02-01T11:00:00Z"));
        let mut b = session("beta", 10, 5, 1);
        b.models_used = vec!["m1".into(), "m2".into()];
        b.start_time = Some(at("2026-02-02T10:00:00Z"));
        b.end_time = Some(at("2026-02-02T11:00:00Z"));

        let agg = Aggregator::aggregate(&[a, b]);
        assert_eq!(agg.session_count, 2);
        assert_eq!(agg.input_tokens, 110);
        assert_eq!(agg.output_tokens, 55);
        assert_eq!(agg.total_tokens(), 165);
        assert_eq!(agg.projects, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(agg.models_used, vec!["m1".to_string(), "m2".to_string()]);
        assert_eq!(agg.oldest_session, Some(at("2026-02-01T10:00:00Z")));
        assert_eq!(agg.newest_session, Some(at("2026-02-02T11:00:00Z")));
    }

    #[test]
    fn test_aggregate_excludes_empty_sessions() {
        let empty = session("ghost", 999, 999, 0);
        let real = session("alpha", 10, 5, 1);
        let agg = Aggregator::aggregate(&[empty, real]);
        assert_eq!(agg.session_count, 1);
        assert_eq!(agg.input_tokens, 10);
        assert_eq!(agg.projects, vec!["alpha".to_string()]);
    }

    #[test]
    fn test_total_all_tokens_includes_cache() {
        let mut s = session("alpha", 100, 50, 1);
        s.cache_read_tokens = 7;
        s.cache_write_tokens = 3;
        let agg = Aggregator::aggregate(&[s]);
        assert_eq!(agg.total_tokens(), 150);
        assert_eq!(agg.total_all_tokens(), 160);
    }

    #[test]
    fn test_daily_stats_window_and_order() {
        let now = at("2026-02-10T12:00:00Z");
        let mut recent = session("alpha", 100, 0, 2);
        recent.end_time = Some(at("2026-02-09T08:00:00Z"));
        let mut older = session("alpha", 200, 0, 1);
        older.end_time = Some(at("2026-02-05T08:00:00Z"));
        let mut stale = session("alpha", 400, 0, 4);
        stale.end_time = Some(at("2026-01-20T08:00:00Z"));
        let dateless = session("alpha", 800, 0, 8);

        let daily = Aggregator::daily_stats_at(&[recent, older, stale, dateless], 7, now);
        let dates: Vec<NaiveDate> = daily.keys().copied().collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
            ]
        );
        let first = daily[&dates[0]];
        assert_eq!(first, DailyBucket { tokens: 200, messages: 1, sessions: 1 });
    }

    #[test]
    fn test_daily_stats_cutoff_is_strict() {
        let now = at("2026-02-10T12:00:00Z");
        let mut on_cutoff = session("alpha", 100, 0, 1);
        on_cutoff.end_time = Some(at("2026-02-03T12:00:00Z"));
        let daily = Aggregator::daily_stats_at(&[on_cutoff], 7, now);
        assert!(daily.is_empty());
    }

    #[test]
    fn test_top_projects_sorted_with_stable_ties() {
        let sessions = vec![
            session("alpha", 50, 0, 1),
            session("beta", 100, 0, 2),
            session("gamma", 50, 0, 1),
            session("alpha", 0, 0, 1),
        ];
        let top = Aggregator::top_projects(&sessions, 5);
        let names: Vec<&str> = top.iter().map(|p| p.project.as_str()).collect();
        // alpha and gamma tie at 50 tokens; alpha was discovered first.
        assert_eq!(names, vec!["beta", "alpha", "gamma"]);
        assert_eq!(top[0].tokens, 100);
        assert_eq!(top[1].messages, 2);
    }

    #[test]
    fn test_top_projects_truncates() {
        let sessions = vec![
            session("a", 3, 0, 1),
            session("b", 2, 0, 1),
            session("c", 1, 0, 1),
        ];
        let top = Aggregator::top_projects(&sessions, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].project, "a");
    }
}
