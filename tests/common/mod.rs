use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a throwaway Claude home with a `projects` directory.
pub fn setup_claude_home() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("projects"))?;
    Ok(dir)
}

/// Write a transcript under `<home>/projects/<project_dir>/<filename>`.
#[allow(dead_code)]
pub fn write_transcript(
    home: &Path,
    project_dir: &str,
    filename: &str,
    lines: &[&str],
) -> Result<PathBuf> {
    let dir = home.join("projects").join(project_dir);
    fs::create_dir_all(&dir)?;
    let path = dir.join(filename);
    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}

/// A small, well-formed transcript: one user turn, one assistant turn with
/// usage and a tool call.
#[allow(dead_code)]
pub fn sample_lines() -> Vec<&'static str> {
    vec![
        r#"{"type":"user","timestamp":"2026-02-01T10:00:00Z"}"#,
        r#"{"type":"assistant","timestamp":"2026-02-01T10:00:05Z","message":{"model":"claude-sonnet-4-20250514","usage":{"input_tokens":100,"output_tokens":50,"cache_read_input_tokens":10,"cache_creation_input_tokens":5},"content":[{"type":"text"},{"type":"tool_use"}]}}"#,
    ]
}
