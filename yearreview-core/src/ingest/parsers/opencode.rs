//! OpenCode log parser
//!
//! OpenCode keeps no per-message token usage on disk, so this parser only
//! recovers activity and projects:
//!
//! - `log/<YYYY-MM-DD>T<time>.log`: one session per log file, dated by the
//!   file name (midnight of that day)
//! - `storage/project/<id>.json`: one project per file

use crate::ingest::parser::{glob_files, SourcePattern, ToolParser};
use crate::timestamp::parse_timestamp_str;
use crate::types::{ProjectSummary, SourceRecord, Tool};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Parser for OpenCode data directories.
pub struct OpenCodeParser {
    root: Option<PathBuf>,
}

impl OpenCodeParser {
    /// Create a new parser with the default root path (~/.local/share/opencode).
    pub fn new() -> Self {
        Self {
            root: Tool::OpenCode.default_log_path(),
        }
    }

    /// Create a parser with a custom root path.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root: Some(root) }
    }
}

impl Default for OpenCodeParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Session start date encoded in a log file stem (`2025-03-04T101500`).
fn log_file_date(path: &Path) -> Option<NaiveDateTime> {
    let stem = path.file_stem()?.to_str()?;
    let (date_part, _) = stem.split_once('T')?;
    parse_timestamp_str(&format!("{}T00:00:00Z", date_part))
}

impl ToolParser for OpenCodeParser {
    fn tool(&self) -> Tool {
        Tool::OpenCode
    }

    fn default_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn source_patterns(&self) -> Vec<SourcePattern> {
        vec![
            SourcePattern::new("log/*.log", "OpenCode session logs"),
            SourcePattern::new("storage/project/*.json", "OpenCode projects"),
        ]
    }

    fn parse(&self, root: &Path, source: &str) -> SourceRecord {
        let mut record = SourceRecord::new(source, self.tool());

        let logs = glob_files(self.tool(), root, "log/*.log").unwrap_or_default();
        for log in &logs {
            match log_file_date(log) {
                Some(ts) => {
                    record.push_event(ts);
                    record.total_sessions += 1;
                }
                None => {
                    tracing::debug!(path = %log.display(), "Log file name carries no date");
                }
            }
        }

        let projects = glob_files(self.tool(), root, "storage/project/*.json").unwrap_or_default();
        record.projects = projects
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()))
            .map(|name| ProjectSummary {
                name: name.to_string(),
                sessions: 1,
            })
            .collect();

        tracing::debug!(
            source,
            sessions = record.total_sessions,
            projects = record.projects.len(),
            "Parsed OpenCode data"
        );

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    #[test]
    fn test_log_file_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            log_file_date(Path::new("/x/log/2025-03-04T101500.log")),
            Some(expected)
        );
        assert_eq!(log_file_date(Path::new("/x/log/dev.log")), None);
        assert_eq!(log_file_date(Path::new("/x/log/notadateT1.log")), None);
    }

    #[test]
    fn test_parse_logs_and_projects() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("log")).unwrap();
        fs::create_dir_all(root.join("storage/project")).unwrap();
        fs::write(root.join("log/2025-03-04T101500.log"), "").unwrap();
        fs::write(root.join("log/2025-03-05T090000.log"), "").unwrap();
        fs::write(root.join("log/dev.log"), "").unwrap();
        fs::write(root.join("storage/project/abc123.json"), "{}").unwrap();

        let record = OpenCodeParser::new().parse(root, "laptop");
        assert_eq!(record.total_sessions, 2);
        assert_eq!(record.events.len(), 2);
        assert!(record.events.iter().all(|e| e.tool == Tool::OpenCode));
        assert_eq!(
            record.projects,
            vec![ProjectSummary {
                name: "abc123".to_string(),
                sessions: 1
            }]
        );
        assert!(record.model_usage.is_empty());
    }
}
