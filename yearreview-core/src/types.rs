//! Core domain types for yearreview
//!
//! These types are the canonical model every tool parser normalizes into,
//! and that the aggregator merges into one [`AggregatedView`].
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Source** | A logical origin of usage data: a machine, a remote host, or an imported directory |
//! | **Tool** | The coding assistant that wrote the logs (Claude Code, Codex, OpenCode) |
//! | **Event** | One timestamped activity instant, tagged with its source and tool |
//! | **ModelUsage** | Accumulated token counters for one model identifier |
//! | **Streak** | A run of consecutive calendar days containing at least one event |

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================
// Tool
// ============================================

/// Supported coding assistants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// The primary tool; events without an explicit tag belong here
    #[default]
    ClaudeCode,
    Codex,
    OpenCode,
}

impl Tool {
    /// All tools, in registry order
    pub const ALL: [Tool; 3] = [Tool::ClaudeCode, Tool::Codex, Tool::OpenCode];

    /// Returns the display name for this tool
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::ClaudeCode => "Claude Code",
            Tool::Codex => "Codex",
            Tool::OpenCode => "OpenCode",
        }
    }

    /// Returns the identifier used on the command line and in output
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::ClaudeCode => "claude_code",
            Tool::Codex => "codex",
            Tool::OpenCode => "opencode",
        }
    }

    /// Returns the default path where this tool stores logs
    pub fn default_log_path(&self) -> Option<PathBuf> {
        let home = crate::config::home_dir();
        Some(match self {
            Tool::ClaudeCode => home.join(".claude"),
            Tool::Codex => home.join(".codex"),
            Tool::OpenCode => home.join(".local/share/opencode"),
        })
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude_code" | "claude" | "ClaudeCode" => Ok(Tool::ClaudeCode),
            "codex" | "Codex" => Ok(Tool::Codex),
            "opencode" | "OpenCode" => Ok(Tool::OpenCode),
            _ => Err(format!("unknown tool: {}", s)),
        }
    }
}

// ============================================
// Events
// ============================================

/// One observed activity instant.
///
/// Immutable once created, except that aggregation relabels `source`
/// according to the alias mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When it happened (timezone-naive wall-clock time)
    pub timestamp: NaiveDateTime,
    /// Logical origin label (machine, remote host, imported path)
    pub source: String,
    /// Which assistant produced it
    #[serde(default)]
    pub tool: Tool,
}

impl Event {
    pub fn new(timestamp: NaiveDateTime, source: impl Into<String>, tool: Tool) -> Self {
        Self {
            timestamp,
            source: source.into(),
            tool,
        }
    }

    /// Calendar date of the event
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

// ============================================
// Token usage
// ============================================

/// Running token counters for one model.
///
/// `total` is normally the sum of the other four; Codex folds reasoning
/// tokens into `total` without tracking them separately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_creation: u64,
    pub total: u64,
}

impl ModelUsage {
    /// Usage whose total is the sum of the four counters.
    pub fn from_counts(input: u64, output: u64, cache_read: u64, cache_creation: u64) -> Self {
        Self {
            input,
            output,
            cache_read,
            cache_creation,
            total: input
                .saturating_add(output)
                .saturating_add(cache_read)
                .saturating_add(cache_creation),
        }
    }

    /// Add another usage record field by field, saturating at `u64::MAX`.
    pub fn merge(&mut self, other: &ModelUsage) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
        self.cache_read = self.cache_read.saturating_add(other.cache_read);
        self.cache_creation = self.cache_creation.saturating_add(other.cache_creation);
        self.total = self.total.saturating_add(other.total);
    }
}

/// Model name → accumulated usage
pub type UsageByModel = BTreeMap<String, ModelUsage>;

/// Sum of `total` across every model
pub fn total_tokens(usage: &UsageByModel) -> u64 {
    usage
        .values()
        .fold(0u64, |acc, u| acc.saturating_add(u.total))
}

// ============================================
// Projects and sessions
// ============================================

/// A project seen in a source, with how many sessions touched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub sessions: u64,
}

/// The longest single session a source knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestSession {
    pub duration_ms: u64,
    pub message_count: u64,
}

impl LongestSession {
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.duration_ms.min(i64::MAX as u64) as i64)
    }
}

// ============================================
// Per-source record
// ============================================

/// Everything one parser extracted from one source directory.
///
/// Built once, then handed to the aggregator, which consumes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Raw source name, before alias merging
    pub source: String,
    /// Tool whose logs were scanned
    #[serde(default)]
    pub tool: Tool,
    pub events: Vec<Event>,
    pub total_sessions: u64,
    pub total_messages: u64,
    pub model_usage: UsageByModel,
    pub projects: Vec<ProjectSummary>,
    pub longest_session: Option<LongestSession>,
}

impl SourceRecord {
    /// Empty record for a source.
    pub fn new(source: impl Into<String>, tool: Tool) -> Self {
        Self {
            source: source.into(),
            tool,
            ..Default::default()
        }
    }

    /// Record an activity instant for this source.
    pub fn push_event(&mut self, timestamp: NaiveDateTime) {
        self.events.push(Event::new(timestamp, self.source.clone(), self.tool));
    }

    /// Fold usage for a model into this record's counters.
    pub fn add_usage(&mut self, model: &str, usage: &ModelUsage) {
        self.model_usage
            .entry(model.to_string())
            .or_default()
            .merge(usage);
    }

    /// Total tokens across this record's models.
    pub fn tokens(&self) -> u64 {
        total_tokens(&self.model_usage)
    }

    /// Whether the scan turned up anything worth reporting.
    pub fn has_data(&self) -> bool {
        !self.events.is_empty() || self.total_sessions > 0 || !self.model_usage.is_empty()
    }
}

// ============================================
// Aggregated view
// ============================================

/// Colors handed out to sources in order of first appearance.
pub const MACHINE_COLORS: [&str; 8] = [
    "#ff6b35", "#4ecdc4", "#a855f7", "#22c55e", "#f43f5e", "#3b82f6", "#eab308", "#ec4899",
];

/// One entry of a [`SourcePalette`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColor {
    pub source: String,
    pub color: String,
}

/// Source → color assignment, in first-seen order.
///
/// Built once per aggregation; colors are stable within a run only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourcePalette {
    entries: Vec<SourceColor>,
}

impl SourcePalette {
    /// Assign the next palette color to `source` unless it already has one.
    ///
    /// Returns true when the source was new.
    pub fn assign(&mut self, source: &str) -> bool {
        if self.color_for(source).is_some() {
            return false;
        }
        let color = MACHINE_COLORS[self.entries.len() % MACHINE_COLORS.len()];
        self.entries.push(SourceColor {
            source: source.to_string(),
            color: color.to_string(),
        });
        true
    }

    /// Color assigned to a source, if any.
    pub fn color_for(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.color.as_str())
    }

    /// Color for a source, falling back to the first palette color.
    pub fn color_or_default(&self, source: &str) -> &str {
        self.color_for(source).unwrap_or(MACHINE_COLORS[0])
    }

    pub fn entries(&self) -> &[SourceColor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per merged-source breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub tokens: u64,
    pub sessions: u64,
    pub messages: u64,
    /// Distinct active calendar dates
    pub days: u64,
    /// Raw event count
    pub events: u64,
}

/// Streak statistics over distinct active dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Consecutive days ending today or yesterday; 0 when broken
    #[serde(rename = "current")]
    pub current_streak: u64,
    /// Longest run of consecutive active days
    #[serde(rename = "longest")]
    pub longest_streak: u64,
    /// Distinct active dates
    pub total_days: u64,
}

/// First and last event instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

/// The merged result of every source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedView {
    /// Merged source names, first-seen order
    pub sources: Vec<String>,
    pub source_colors: SourcePalette,
    pub per_source_stats: BTreeMap<String, SourceStats>,
    pub date_range: Option<DateRange>,
    /// Every event, relabeled and sorted by time. Not serialized.
    #[serde(skip)]
    pub events: Vec<Event>,
    pub total_sessions: u64,
    pub total_messages: u64,
    pub total_tokens: u64,
    pub model_usage: UsageByModel,
    pub projects: Vec<ProjectSummary>,
    pub streaks: StreakInfo,
    pub longest_session: Option<LongestSession>,
}

impl AggregatedView {
    /// Models ordered by total tokens, largest first.
    pub fn models_by_tokens(&self) -> Vec<(&str, &ModelUsage)> {
        let mut models: Vec<_> = self
            .model_usage
            .iter()
            .map(|(name, usage)| (name.as_str(), usage))
            .collect();
        models.sort_by(|a, b| b.1.total.cmp(&a.1.total));
        models
    }

    /// Pretty-printed JSON export (events are not included).
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
        }
        assert_eq!("claude".parse::<Tool>().unwrap(), Tool::ClaudeCode);
        assert!("aider".parse::<Tool>().is_err());
        assert_eq!(Tool::default(), Tool::ClaudeCode);
    }

    #[test]
    fn test_event_without_tool_defaults_to_primary() {
        let event: Event =
            serde_json::from_str(r#"{"timestamp":"2024-01-01T10:00:00","source":"a"}"#).unwrap();
        assert_eq!(event.tool, Tool::ClaudeCode);
    }

    #[test]
    fn test_model_usage_merge() {
        let mut a = ModelUsage::from_counts(1, 2, 3, 4);
        assert_eq!(a.total, 10);
        a.merge(&ModelUsage {
            input: 10,
            output: 20,
            cache_read: 30,
            cache_creation: 40,
            total: 77,
        });
        assert_eq!(
            a,
            ModelUsage {
                input: 11,
                output: 22,
                cache_read: 33,
                cache_creation: 44,
                total: 87,
            }
        );
    }

    #[test]
    fn test_model_usage_saturates() {
        let mut a = ModelUsage::from_counts(u64::MAX, 1, 0, 0);
        assert_eq!(a.total, u64::MAX);
        a.merge(&ModelUsage::from_counts(5, 5, 5, 5));
        assert_eq!(a.input, u64::MAX);
        assert_eq!(a.output, 6);
        assert_eq!(a.total, u64::MAX);

        let mut usage = UsageByModel::new();
        usage.insert("a".into(), a);
        usage.insert("b".into(), ModelUsage::from_counts(1, 0, 0, 0));
        assert_eq!(total_tokens(&usage), u64::MAX);
    }

    #[test]
    fn test_has_data() {
        let mut record = SourceRecord::new("local", Tool::Codex);
        assert!(!record.has_data());
        record.total_sessions = 1;
        assert!(record.has_data());

        let mut record = SourceRecord::new("local", Tool::Codex);
        record.add_usage("m", &ModelUsage::default());
        assert!(record.has_data());
    }

    #[test]
    fn test_palette_wraps() {
        let mut palette = SourcePalette::default();
        for i in 0..10 {
            assert!(palette.assign(&format!("s{i}")));
        }
        assert!(!palette.assign("s0"));
        assert_eq!(palette.len(), 10);
        assert_eq!(palette.color_for("s0"), Some(MACHINE_COLORS[0]));
        assert_eq!(palette.color_for("s7"), Some(MACHINE_COLORS[7]));
        assert_eq!(palette.color_for("s8"), Some(MACHINE_COLORS[0]));
        assert_eq!(palette.color_for("s9"), Some(MACHINE_COLORS[1]));
        assert_eq!(palette.color_or_default("missing"), MACHINE_COLORS[0]);
    }

    #[test]
    fn test_json_export_skips_events() {
        let mut view = AggregatedView::default();
        view.events.push(Event::new(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            "local",
            Tool::Codex,
        ));
        view.total_tokens = 42;

        let json = view.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_tokens"], 42);
        assert!(value.get("events").is_none());
        assert_eq!(value["streaks"]["current"], 0);
    }

    #[test]
    fn test_longest_session_duration() {
        let ls = LongestSession {
            duration_ms: 90_000,
            message_count: 3,
        };
        assert_eq!(ls.duration().num_seconds(), 90);
    }
}
