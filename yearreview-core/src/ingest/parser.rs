//! Parser trait abstraction
//!
//! All tool parsers implement the [`ToolParser`] trait to provide a unified
//! interface for discovering and parsing a tool's log directory.
//!
//! ## Design Principles
//!
//! 1. **Raw data is authoritative**: token counts are re-derived from
//!    per-message usage records, never copied from summary caches
//! 2. **Resilience**: a missing directory, unreadable file or malformed line
//!    is skipped at the smallest granularity; parsing never fails
//! 3. **Independence**: parsers share no mutable state
//! 4. **Extensible**: new tools only require implementing this trait and
//!    registering it in [`parsers`](super::parsers)

use crate::error::{Error, Result};
use crate::types::{SourceRecord, Tool};
use std::path::{Path, PathBuf};

/// Pattern for discovering a tool's log files.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    /// Glob pattern relative to the tool root (e.g., "sessions/**/*.jsonl")
    pub pattern: String,
    /// Human-readable description for logging
    pub description: String,
}

impl SourcePattern {
    pub fn new(pattern: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            description: description.into(),
        }
    }
}

/// Trait implemented by all tool parsers.
///
/// ## Example
///
/// ```rust,ignore
/// use yearreview_core::ingest::ToolParser;
///
/// struct MyParser;
///
/// impl ToolParser for MyParser {
///     fn tool(&self) -> Tool { Tool::Codex }
///     // ... implement other methods
/// }
/// ```
pub trait ToolParser: Send + Sync {
    /// Which tool this parser handles
    fn tool(&self) -> Tool;

    /// Root directory for this tool's data (e.g., ~/.claude)
    ///
    /// Returns `None` if the path cannot be determined (e.g., $HOME not set).
    fn default_root(&self) -> Option<PathBuf> {
        self.tool().default_log_path()
    }

    /// Check if this tool has data on this machine (root path exists)
    fn is_installed(&self) -> bool {
        self.default_root().map(|p| p.exists()).unwrap_or(false)
    }

    /// Patterns for discovering log files, relative to a tool root.
    fn source_patterns(&self) -> Vec<SourcePattern>;

    /// Scan a tool root and build the record for `source`.
    ///
    /// Never fails: anything unreadable is skipped and logged, and a missing
    /// root produces an empty record.
    fn parse(&self, root: &Path, source: &str) -> SourceRecord;

    /// Discover all files under `root` matching one of this parser's patterns.
    ///
    /// Results are sorted so that parsing order is deterministic.
    fn discover_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for pattern in self.source_patterns() {
            let matched = glob_files(self.tool(), root, &pattern.pattern)?;
            tracing::debug!(
                tool = %self.tool(),
                files = matched.len(),
                "Discovered {}",
                pattern.description
            );
            files.extend(matched);
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Expand a glob relative to `root`, keeping regular files only.
///
/// Only `pattern` is treated as a glob; metacharacters in `root` match
/// literally.
pub(crate) fn glob_files(tool: Tool, root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let pattern_str = Path::new(&escaped_root).join(pattern);
    let pattern_str = pattern_str.to_string_lossy();

    let entries = glob::glob(&pattern_str).map_err(|e| Error::Parse {
        tool: tool.to_string(),
        message: format!("Invalid glob pattern: {}", e),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!(tool = %tool, error = %e, "Skipping unreadable path");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
