//! Claude Code log parser
//!
//! Reads a `~/.claude`-shaped directory:
//!
//! | Path | Used for |
//! |------|----------|
//! | `history.jsonl` | activity events (one per prompt) |
//! | `transcripts/*.jsonl` | activity events |
//! | `stats-cache.json` | session/message counts, longest session |
//! | `projects/[encoded-path]/*.jsonl` | project list, per-message token usage |
//!
//! # Token accounting
//!
//! `stats-cache.json` is undocumented and often stale, so token usage is
//! always re-derived by scanning every project session file (agent files
//! included). The cache is only trusted for session and message counts,
//! which are not recoverable from the raw logs alone.
//!
//! # Error Handling
//!
//! - **Malformed JSON lines**: skipped, the rest of the file is still read.
//! - **Missing files or directories**: contribute nothing.
//! - **Records without a parseable timestamp**: produce no event.

use crate::ingest::jsonl::{read_json, read_jsonl};
use crate::ingest::parser::{glob_files, SourcePattern, ToolParser};
use crate::timestamp::normalize_timestamp;
use crate::types::{LongestSession, ModelUsage, ProjectSummary, SourceRecord, Tool};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Model name used when a usage record does not say which model produced it
pub const UNKNOWN_MODEL: &str = "unknown";

/// Parser for Claude Code logs.
pub struct ClaudeCodeParser {
    root: Option<PathBuf>,
}

impl ClaudeCodeParser {
    /// Create a new parser with the default root path (~/.claude).
    pub fn new() -> Self {
        Self {
            root: Tool::ClaudeCode.default_log_path(),
        }
    }

    /// Create a parser with a custom root path.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root: Some(root) }
    }
}

impl Default for ClaudeCodeParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================
// Raw record types (serde deserialization)
// ============================================

/// Any record that may carry a timestamp (history and transcript lines).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TimestampedRecord {
    timestamp: Option<Value>,
}

/// A line from a project session file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SessionRecord {
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawMessage {
    model: Option<String>,
    usage: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StatsCache {
    total_sessions: u64,
    total_messages: u64,
    longest_session: Option<RawLongestSession>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawLongestSession {
    duration: u64,
    message_count: u64,
}

/// Read a token counter, treating absent or non-numeric values as zero.
fn counter(usage: &Map<String, Value>, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Decode a project directory name back into a readable path.
///
/// Claude Code stores `/home/me/dev/app` as `-home-me-dev-app`. Literal
/// dashes in the original path are indistinguishable from separators and
/// come back as `/`.
pub fn decode_project_dir(encoded: &str) -> String {
    encoded.replace('-', "/").trim_start_matches('/').to_string()
}

impl ToolParser for ClaudeCodeParser {
    fn tool(&self) -> Tool {
        Tool::ClaudeCode
    }

    fn default_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern::new("history.jsonl", "Claude Code prompt history"),
            SourcePattern::new("transcripts/*.jsonl", "Claude Code transcripts"),
            SourcePattern::new("projects/*/*.jsonl", "Claude Code session logs"),
        ]
    }

    fn parse(&self, root: &Path, source: &str) -> SourceRecord {
        let mut record = SourceRecord::new(source, self.tool());

        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "Claude Code root missing");
            return record;
        }

        self.collect_events(root, &mut record);
        self.apply_stats_cache(root, &mut record);
        self.collect_projects(root, &mut record);

        tracing::debug!(
            source,
            events = record.events.len(),
            projects = record.projects.len(),
            models = record.model_usage.len(),
            "Parsed Claude Code data"
        );

        record
    }
}

impl ClaudeCodeParser {
    /// Events from prompt history and transcripts.
    fn collect_events(&self, root: &Path, record: &mut SourceRecord) {
        let mut files = vec![root.join("history.jsonl")];
        files.extend(self.files(root, "transcripts/*.jsonl"));

        for file in files {
            for entry in read_jsonl::<TimestampedRecord>(&file) {
                if let Some(ts) = normalize_timestamp(entry.timestamp.as_ref()) {
                    record.push_event(ts);
                }
            }
        }
    }

    /// Session/message totals and the longest session from the stats cache.
    fn apply_stats_cache(&self, root: &Path, record: &mut SourceRecord) {
        let Some(stats) = read_json::<StatsCache>(&root.join("stats-cache.json")) else {
            return;
        };

        record.total_sessions = stats.total_sessions;
        record.total_messages = stats.total_messages;
        record.longest_session = stats.longest_session.map(|ls| LongestSession {
            duration_ms: ls.duration,
            message_count: ls.message_count,
        });
    }

    /// Project list plus token usage from every session file.
    fn collect_projects(&self, root: &Path, record: &mut SourceRecord) {
        let projects_dir = root.join("projects");
        let entries = match std::fs::read_dir(&projects_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        let mut project_dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        project_dirs.sort();

        for project_dir in project_dirs {
            let Some(dir_name) = project_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let session_files = self.files(&project_dir, "*.jsonl");
            let sessions = session_files
                .iter()
                .filter(|f| !is_agent_file(f))
                .count() as u64;

            record.projects.push(ProjectSummary {
                name: decode_project_dir(dir_name),
                sessions,
            });

            for session_file in &session_files {
                accumulate_usage(session_file, record);
            }
        }
    }

    fn files(&self, root: &Path, pattern: &str) -> Vec<PathBuf> {
        glob_files(self.tool(), root, pattern).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Skipping Claude Code file pattern");
            Vec::new()
        })
    }
}

/// Agent (sub-task) transcripts live next to sessions as `agent-*.jsonl`.
fn is_agent_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with("agent-"))
        .unwrap_or(false)
}

/// Fold every usage record of a session file into the source's counters.
fn accumulate_usage(path: &Path, record: &mut SourceRecord) {
    for entry in read_jsonl::<SessionRecord>(path) {
        let Some(message) = entry.message else {
            continue;
        };
        let Some(usage) = message.usage.filter(|u| !u.is_empty()) else {
            continue;
        };

        let model = message.model.as_deref().unwrap_or(UNKNOWN_MODEL);
        let counts = ModelUsage::from_counts(
            counter(&usage, "input_tokens"),
            counter(&usage, "output_tokens"),
            counter(&usage, "cache_read_input_tokens"),
            counter(&usage, "cache_creation_input_tokens"),
        );
        record.add_usage(model, &counts);
    }
}
