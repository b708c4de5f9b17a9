//! Integration tests for the parse → collect → aggregate pipeline
//!
//! These tests use the fixture trees in `tests/fixtures/` to verify that each
//! tool's directory layout is normalized and merged as expected.

use chrono::{NaiveDate, NaiveDateTime};
use yearreview_core::config::RemoteConfig;
use yearreview_core::ingest::parsers::{ClaudeCodeParser, CodexParser, OpenCodeParser};
use yearreview_core::ingest::{CollectOptions, DataPathSpec, ToolParser};
use yearreview_core::{
    aggregate_at, AggregatedView, AliasMap, Error, ModelUsage, SourceCollector, SourceRecord,
    Tool,
};
use std::path::{Path, PathBuf};

/// Get the path to a fixture directory
fn fixture_path(name: &str) -> PathBuf {
    yearreview_core::logging::init_test();
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn copy_dir(source: &Path, target: &Path) {
    std::fs::create_dir_all(target).unwrap();
    for entry in std::fs::read_dir(source).unwrap() {
        let entry = entry.unwrap();
        let dest = target.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &dest);
        } else {
            std::fs::copy(entry.path(), dest).unwrap();
        }
    }
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================
// Parser Tests
// ============================================

#[test]
fn test_parse_claude_fixture() {
    let root = fixture_path("claude");
    let record = ClaudeCodeParser::with_root(root.clone()).parse(&root, "laptop");

    assert_eq!(record.source, "laptop");
    assert_eq!(record.tool, Tool::ClaudeCode);

    // Two valid history lines plus one transcript line; the rest are skipped
    let stamps: Vec<_> = record.events.iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps.len(), 3);
    assert!(stamps.contains(&ts("2024-01-01T12:00:00")));
    assert!(stamps.iter().any(|t| {
        t.date() == date(2024, 1, 2) && t.format("%H:%M:%S%.3f").to_string() == "09:30:00.123"
    }));
    assert!(record.events.iter().all(|e| e.source == "laptop"));

    // Counts come from the stats cache, tokens never do
    assert_eq!(record.total_sessions, 4);
    assert_eq!(record.total_messages, 42);
    let longest = record.longest_session.unwrap();
    assert_eq!(longest.duration_ms, 3_600_000);
    assert_eq!(longest.message_count, 30);

    assert_eq!(record.model_usage.len(), 1);
    assert_eq!(
        record.model_usage["claude-sonnet-4"],
        ModelUsage {
            input: 125,
            output: 65,
            cache_read: 10,
            cache_creation: 5,
            total: 205,
        }
    );

    assert_eq!(record.projects.len(), 1);
    assert_eq!(record.projects[0].name, "home/me/app");
    assert_eq!(record.projects[0].sessions, 1);
}

#[test]
fn test_parse_codex_fixture() {
    let root = fixture_path("codex");
    let record = CodexParser::with_root(root.clone()).parse(&root, "local");

    assert_eq!(record.tool, Tool::Codex);
    assert_eq!(record.total_sessions, 1);
    assert_eq!(record.total_messages, 1);
    assert_eq!(record.events.len(), 5);

    // Only the final cumulative snapshot counts
    let usage = record.model_usage["gpt-5-codex"];
    assert_eq!(usage.input, 300);
    assert_eq!(usage.output, 50);
    assert_eq!(usage.cache_read, 120);
    assert_eq!(usage.total, 375);

    let longest = record.longest_session.unwrap();
    assert_eq!(longest.duration_ms, 30 * 60 * 1000);
    assert_eq!(longest.message_count, 1);
}

#[test]
fn test_parse_opencode_fixture() {
    let root = fixture_path("opencode");
    let record = OpenCodeParser::with_root(root.clone()).parse(&root, "local");

    assert_eq!(record.tool, Tool::OpenCode);
    assert_eq!(record.total_sessions, 1);
    assert_eq!(record.events.len(), 1);
    assert_eq!(record.events[0].timestamp, ts("2024-01-04T00:00:00"));
    assert!(record.model_usage.is_empty());
    assert_eq!(record.projects.len(), 1);
    assert_eq!(record.projects[0].name, "abc123");
}

#[test]
fn test_discover_files_uses_patterns() {
    let root = fixture_path("claude");
    let files = ClaudeCodeParser::with_root(root.clone())
        .discover_files(&root)
        .unwrap();
    let names: Vec<_> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();

    assert!(names.contains(&"history.jsonl"));
    assert!(names.contains(&"t1.jsonl"));
    assert!(names.contains(&"s1.jsonl"));
    assert!(names.contains(&"agent-x.jsonl"));
    assert!(!names.contains(&"stats-cache.json"));
}

// ============================================
// Aggregation Tests
// ============================================

#[test]
fn test_all_tools_aggregate_under_local() {
    let records: Vec<SourceRecord> = [
        ClaudeCodeParser::with_root(fixture_path("claude")).parse(&fixture_path("claude"), "local"),
        CodexParser::with_root(fixture_path("codex")).parse(&fixture_path("codex"), "local"),
        OpenCodeParser::with_root(fixture_path("opencode"))
            .parse(&fixture_path("opencode"), "local"),
    ]
    .into_iter()
    .collect();

    let view = aggregate_at(records, &AliasMap::new(), date(2024, 1, 5));

    assert_eq!(view.sources, vec!["local".to_string()]);
    assert_eq!(view.total_tokens, 205 + 375);
    assert_eq!(view.total_sessions, 4 + 1 + 1);
    assert_eq!(view.streaks.total_days, 4);
    assert_eq!(view.streaks.longest_streak, 4);
    assert_eq!(view.streaks.current_streak, 4);
    assert_eq!(view.per_source_stats["local"].days, 4);
    assert_eq!(view.projects.len(), 2);
    assert_eq!(view.longest_session.unwrap().duration_ms, 3_600_000);

    let range = view.date_range.unwrap();
    assert_eq!(range.first.date(), date(2024, 1, 1));
    assert_eq!(range.last.date(), date(2024, 1, 4));
}

fn scenario_record(source: &str, days: &[(u32, u64)]) -> SourceRecord {
    let mut record = SourceRecord::new(source, Tool::ClaudeCode);
    for &(day, tokens) in days {
        record.push_event(date(2024, 1, day).and_hms_opt(12, 0, 0).unwrap());
        record.add_usage(
            "m1",
            &ModelUsage {
                input: tokens,
                total: tokens,
                ..Default::default()
            },
        );
    }
    record
}

#[test]
fn test_two_sources_merged_under_one_alias() {
    let a = scenario_record("A", &[(1, 100), (2, 100)]);
    let b = scenario_record("B", &[(2, 50)]);
    let aliases: AliasMap = "A=me,B=me".parse().unwrap();

    let view = aggregate_at(vec![a, b], &aliases, date(2030, 1, 1));

    assert_eq!(view.total_tokens, 250);
    assert_eq!(view.streaks.total_days, 2);
    assert_eq!(view.streaks.longest_streak, 2);
    assert_eq!(view.streaks.current_streak, 0);
    assert_eq!(view.sources, vec!["me".to_string()]);
    assert_eq!(view.per_source_stats["me"].days, 2);
    assert_eq!(view.per_source_stats["me"].events, 3);
}

#[test]
fn test_view_json_round_trip() {
    let a = scenario_record("laptop", &[(1, 100), (2, 100)]);
    let b = scenario_record("desktop", &[(3, 50)]);
    let view = aggregate_at(vec![a, b], &AliasMap::new(), date(2024, 1, 4));

    let json = serde_json::to_string(&view).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["streaks"]["current"], 3);
    assert_eq!(value["streaks"]["longest"], 3);
    assert_eq!(value["date_range"]["first"], "2024-01-01T12:00:00");
    assert!(value.get("events").is_none());

    let back: AggregatedView = serde_json::from_str(&json).unwrap();
    assert_eq!(back.total_tokens, view.total_tokens);
    assert_eq!(back.total_sessions, view.total_sessions);
    assert_eq!(back.sources, vec!["laptop".to_string(), "desktop".to_string()]);
    assert_eq!(back.streaks, view.streaks);
    assert_eq!(back.source_colors, view.source_colors);
    assert_eq!(back.per_source_stats, view.per_source_stats);
}

// ============================================
// Collection Tests
// ============================================

#[test]
fn test_collect_data_path_fixture() {
    let spec = DataPathSpec::parse(&format!("{}:imported", fixture_path("claude").display()));
    let collector = SourceCollector::with_parsers(
        CollectOptions {
            data_paths: vec![spec],
            remote_only: true,
            ..Default::default()
        },
        RemoteConfig::default(),
        Vec::new(),
    );

    let records = collector.collect().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "imported");
    assert_eq!(records[0].tokens(), 205);
}

#[test]
fn test_collect_data_path_with_glob_characters() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("backup[2024]/.claude");
    copy_dir(&fixture_path("claude"), &root);

    let collector = SourceCollector::with_parsers(
        CollectOptions {
            data_paths: vec![DataPathSpec::parse(&root.to_string_lossy())],
            remote_only: true,
            ..Default::default()
        },
        RemoteConfig::default(),
        Vec::new(),
    );

    let records = collector.collect().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "backup[2024]");
    assert_eq!(records[0].events.len(), 3);
    assert_eq!(records[0].tokens(), 205);
}

#[test]
fn test_collect_with_no_sources_is_fatal() {
    let empty = tempfile::tempdir().unwrap();
    let collector = SourceCollector::with_parsers(
        CollectOptions {
            data_paths: vec![DataPathSpec::parse(&empty.path().to_string_lossy())],
            ..Default::default()
        },
        RemoteConfig::default(),
        Tool::ALL
            .into_iter()
            .map(|tool| {
                yearreview_core::ingest::parsers::parser_with_root(tool, empty.path().join("none"))
            })
            .collect(),
    );

    let err = collector.collect().unwrap_err();
    assert!(matches!(err, Error::NoData));
}
