use crate::config::get_config;
use anyhow::Result;
use glob::glob;
use std::fs::metadata;
use std::path::PathBuf;
use tracing::debug;

/// Handles file system traversal and discovery of session transcript files
pub struct FileDiscovery;

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self
    }

    /// Find all transcript files under `<claude_home>/projects`, recursively,
    /// ordered most-recently-modified first.
    pub fn find_transcripts(&self) -> Result<Vec<PathBuf>> {
        let config = get_config();
        self.find_transcripts_under(&config.paths.claude_home)
    }

    /// Same as [`find_transcripts`](Self::find_transcripts) against an
    /// explicit root, for tests and non-default installs.
    pub fn find_transcripts_under(&self, claude_home: &std::path::Path) -> Result<Vec<PathBuf>> {
        let projects_dir = claude_home.join("projects");
        if !projects_dir.exists() {
            debug!(dir = %projects_dir.display(), "projects directory not found");
            return Ok(Vec::new());
        }

        let pattern = projects_dir.join("**").join("*.jsonl");
        let mut files = Vec::new();
        if let Ok(paths) = glob(&pattern.to_string_lossy()) {
            for entry in paths.flatten() {
                if entry.is_file() {
                    files.push(entry);
                }
            }
        }

        // Newest activity first
        files.sort_by(|a, b| {
            let a_mtime = metadata(a)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::UNIX_EPOCH);
            let b_mtime = metadata(b)
                .and_then(|m| m.modified())
                .unwrap_or(std::time::UNIX_EPOCH);
            b_mtime.cmp(&a_mtime)
        });

        debug!(count = files.len(), "discovered transcript files");
        Ok(files)
    }
}
