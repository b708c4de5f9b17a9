//! OpenAI Codex CLI log parser
//!
//! Reads session logs from `~/.codex/sessions/YYYY/MM/DD/rollout-*.jsonl`.
//!
//! # Token accounting
//!
//! Codex emits `token_count` events whose figures are cumulative for the
//! session, not per-turn deltas. Each session keeps only its latest
//! snapshot, and that snapshot is committed once when the file ends.
//! Summing every `token_count` would count early turns many times over.
//!
//! `total` here is input + output + reasoning tokens; cached input is
//! reported as `cache_read` but is already part of `input`.
//!
//! # Error Handling
//!
//! - **Malformed JSON lines**: skipped, parsing continues.
//! - **Unknown event types**: ignored apart from their timestamp.
//! - **Missing `sessions/` directory**: empty record.

use crate::ingest::jsonl::read_jsonl;
use crate::ingest::parser::{SourcePattern, ToolParser};
use crate::timestamp::normalize_timestamp;
use crate::types::{LongestSession, ModelUsage, SourceRecord, Tool};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::claude::UNKNOWN_MODEL;

/// Parser for OpenAI Codex CLI JSONL logs.
pub struct CodexParser {
    root: Option<PathBuf>,
}

impl CodexParser {
    /// Create a new parser with the default root path (~/.codex).
    pub fn new() -> Self {
        Self {
            root: Tool::Codex.default_log_path(),
        }
    }

    /// Create a parser with a custom root path.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root: Some(root) }
    }
}

impl Default for CodexParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================
// Raw JSONL record types (serde deserialization)
// ============================================

/// Top-level event container for Codex JSONL records.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawEvent {
    timestamp: Option<Value>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    payload: Value,
}

/// Turn context payload.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TurnContextPayload {
    model: Option<String>,
}

/// Event message payload subtypes.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EventMsgPayload {
    #[serde(rename = "type")]
    msg_type: Option<String>,
    info: Option<TokenInfo>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TokenInfo {
    total_token_usage: Option<Map<String, Value>>,
    last_token_usage: Option<Map<String, Value>>,
}

impl TokenInfo {
    /// Cumulative usage, falling back to the last turn's figures.
    ///
    /// Empty usage maps count as absent.
    fn snapshot(self) -> Option<Map<String, Value>> {
        self.total_token_usage
            .filter(|u| !u.is_empty())
            .or(self.last_token_usage.filter(|u| !u.is_empty()))
    }
}

fn counter(usage: &Map<String, Value>, key: &str) -> u64 {
    usage.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Convert a usage snapshot into counters.
fn snapshot_usage(usage: &Map<String, Value>) -> ModelUsage {
    let input = counter(usage, "input_tokens");
    let output = counter(usage, "output_tokens");
    let cached = counter(usage, "cached_input_tokens");
    let reasoning = counter(usage, "reasoning_output_tokens");

    ModelUsage {
        input,
        output,
        cache_read: cached,
        cache_creation: 0,
        total: input.saturating_add(output).saturating_add(reasoning),
    }
}

/// What one session file contributes.
#[derive(Debug, Default)]
struct SessionScan {
    model: Option<String>,
    usage: Option<Map<String, Value>>,
    user_messages: u64,
    first: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
}

impl SessionScan {
    fn duration_ms(&self) -> Option<u64> {
        let span = self.last? - self.first?;
        u64::try_from(span.num_milliseconds()).ok()
    }
}

impl ToolParser for CodexParser {
    fn tool(&self) -> Tool {
        Tool::Codex
    }

    fn default_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![SourcePattern::new(
            "sessions/**/*.jsonl",
            "Codex session rollouts",
        )]
    }

    fn parse(&self, root: &Path, source: &str) -> SourceRecord {
        let mut record = SourceRecord::new(source, self.tool());

        if !root.join("sessions").is_dir() {
            tracing::debug!(root = %root.display(), "Codex sessions directory missing");
            return record;
        }

        let session_files = self.discover_files(root).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not list Codex sessions");
            Vec::new()
        });
        record.total_sessions = session_files.len() as u64;

        for session_file in &session_files {
            let scan = scan_session(session_file, &mut record);
            record.total_messages += scan.user_messages;

            if let Some(duration_ms) = scan.duration_ms() {
                let longer = record
                    .longest_session
                    .map(|ls| duration_ms > ls.duration_ms)
                    .unwrap_or(true);
                if longer {
                    record.longest_session = Some(LongestSession {
                        duration_ms,
                        message_count: scan.user_messages,
                    });
                }
            }

            if let Some(usage) = scan.usage.as_ref() {
                let model = scan.model.as_deref().unwrap_or(UNKNOWN_MODEL);
                record.add_usage(model, &snapshot_usage(usage));
            }
        }

        tracing::debug!(
            source,
            sessions = record.total_sessions,
            events = record.events.len(),
            "Parsed Codex data"
        );

        record
    }
}

/// Walk one session file, pushing events into `record`.
fn scan_session(path: &Path, record: &mut SourceRecord) -> SessionScan {
    let mut scan = SessionScan::default();

    for entry in read_jsonl::<RawEvent>(path) {
        if let Some(ts) = normalize_timestamp(entry.timestamp.as_ref()) {
            record.push_event(ts);
            scan.first = Some(scan.first.map_or(ts, |f| f.min(ts)));
            scan.last = Some(scan.last.map_or(ts, |l| l.max(ts)));
        }

        match entry.event_type.as_deref() {
            Some("turn_context") => {
                let payload: TurnContextPayload =
                    serde_json::from_value(entry.payload).unwrap_or_default();
                if let Some(model) = payload.model.filter(|m| !m.is_empty()) {
                    scan.model = Some(model);
                }
            }
            Some("event_msg") => {
                let payload: EventMsgPayload =
                    serde_json::from_value(entry.payload).unwrap_or_default();
                match payload.msg_type.as_deref() {
                    Some("user_message") => scan.user_messages += 1,
                    Some("token_count") => {
                        if let Some(snapshot) = payload.info.and_then(TokenInfo::snapshot) {
                            scan.usage = Some(snapshot);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    scan
}
