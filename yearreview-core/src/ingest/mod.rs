//! Ingestion layer: turning log directories into [`SourceRecord`]s
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Log roots      │ ──► │ SourceCollector  │ ──► │ Vec<SourceRecord>│
//! │ (~/.claude/...) │     │                  │     │  (→ aggregate)  │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!         ▲                       │
//!         │                       ▼
//!  ┌──────────────┐    ┌──────────────────────┐
//!  │RemoteFetcher │    │  ToolParser          │
//!  │ (rsync)      │    │  ├─ ClaudeCodeParser │
//!  └──────────────┘    │  ├─ CodexParser      │
//!                      │  └─ OpenCodeParser   │
//!                      └──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use yearreview_core::{Config, SourceCollector};
//! use yearreview_core::ingest::CollectOptions;
//!
//! let config = Config::load()?;
//! let collector = SourceCollector::from_config(CollectOptions::default(), &config);
//! let records = collector.collect()?;
//! ```

pub mod jsonl;
mod parser;
pub mod parsers;

pub use parser::{SourcePattern, ToolParser};

use crate::config::{Config, RemoteConfig};
use crate::error::{Error, Result};
use crate::remote::RemoteFetcher;
use crate::types::{SourceRecord, Tool};
use std::path::{Path, PathBuf};

/// Source name given to data found in this machine's own tool directories.
pub const LOCAL_SOURCE: &str = "local";

/// A `--data-path` argument: a pre-fetched Claude Code directory and the
/// source name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPathSpec {
    path: PathBuf,
    name: String,
}

impl DataPathSpec {
    /// Parse `path[:name]`.
    ///
    /// The text after the last `:` is a name only if it is non-empty and
    /// contains no `/`; otherwise the whole argument is the path. Without a
    /// name, the directory name is used, or its parent's name when the
    /// directory is `.claude`.
    pub fn parse(spec: &str) -> Self {
        let (path, name) = match spec.rsplit_once(':') {
            Some((path, name)) if !name.is_empty() && !name.contains('/') => {
                (PathBuf::from(path), Some(name.to_string()))
            }
            _ => (PathBuf::from(spec), None),
        };

        let name = name.unwrap_or_else(|| default_source_name(&path));
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::str::FromStr for DataPathSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

fn default_source_name(path: &Path) -> String {
    let file_name = |p: &Path| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    };

    let name = file_name(path);
    if name == ".claude" {
        path.parent().map(file_name).unwrap_or(name)
    } else {
        name
    }
}

/// What to collect.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Remotes to mirror with rsync (`user@host`)
    pub remotes: Vec<String>,
    /// Pre-fetched Claude Code directories
    pub data_paths: Vec<DataPathSpec>,
    /// Skip this machine's own tool directories
    pub remote_only: bool,
    /// Local tools to scan
    pub tools: Vec<Tool>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            remotes: Vec::new(),
            data_paths: Vec::new(),
            remote_only: false,
            tools: Tool::ALL.to_vec(),
        }
    }
}

/// Gathers one [`SourceRecord`] per usable source.
///
/// Sources are visited in a fixed order (remotes, data paths, then local
/// tools), which fixes palette colors and project order downstream.
pub struct SourceCollector {
    options: CollectOptions,
    remote: RemoteConfig,
    parsers: Vec<Box<dyn ToolParser>>,
}

impl SourceCollector {
    /// Create a collector using each tool's default root.
    pub fn new(options: CollectOptions, remote: RemoteConfig) -> Self {
        let parsers = options
            .tools
            .iter()
            .map(|&tool| parsers::parser_for(tool))
            .collect();
        Self::with_parsers(options, remote, parsers)
    }

    /// Create a collector honoring tool path overrides from the config.
    pub fn from_config(options: CollectOptions, config: &Config) -> Self {
        let parsers = options
            .tools
            .iter()
            .map(|&tool| match config.tools.root_for(tool) {
                Some(root) => parsers::parser_with_root(tool, root.to_path_buf()),
                None => parsers::parser_for(tool),
            })
            .collect();
        Self::with_parsers(options, config.remote.clone(), parsers)
    }

    /// Create a collector with custom local parsers.
    pub fn with_parsers(
        options: CollectOptions,
        remote: RemoteConfig,
        parsers: Vec<Box<dyn ToolParser>>,
    ) -> Self {
        Self {
            options,
            remote,
            parsers,
        }
    }

    /// Get the list of local tools with data on this machine.
    pub fn installed_tools(&self) -> Vec<Tool> {
        self.parsers
            .iter()
            .filter(|p| p.is_installed())
            .map(|p| p.tool())
            .collect()
    }

    /// Scan every configured source.
    ///
    /// Individual sources that are missing or empty are logged and skipped.
    /// Returns [`Error::NoData`] when nothing usable was found at all.
    pub fn collect(&self) -> Result<Vec<SourceRecord>> {
        let mut records = Vec::new();

        if !self.options.remotes.is_empty() {
            self.collect_remotes(&mut records);
        }
        self.collect_data_paths(&mut records);
        if !self.options.remote_only {
            self.collect_local(&mut records);
        }

        if records.is_empty() {
            return Err(Error::NoData);
        }

        tracing::info!(sources = records.len(), "Collected sources");
        Ok(records)
    }

    fn collect_remotes(&self, records: &mut Vec<SourceRecord>) {
        let fetcher = match RemoteFetcher::new(self.remote.clone()) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Could not create remote staging area, skipping remotes"
                );
                return;
            }
        };
        let claude = parsers::ClaudeCodeParser::new();

        for remote in &self.options.remotes {
            let Some(root) = fetcher.fetch(remote) else {
                continue;
            };
            let record = claude.parse(&root, remote);
            if record.events.is_empty() {
                tracing::warn!(remote = %remote, "Remote produced no activity, skipping");
                continue;
            }
            records.push(record);
        }
    }

    fn collect_data_paths(&self, records: &mut Vec<SourceRecord>) {
        let claude = parsers::ClaudeCodeParser::new();

        for spec in &self.options.data_paths {
            if !spec.path().exists() {
                tracing::warn!(path = %spec.path().display(), "Data path not found");
                continue;
            }

            tracing::info!(
                path = %spec.path().display(),
                source = spec.name(),
                "Including data path"
            );
            let record = claude.parse(spec.path(), spec.name());
            if record.has_data() {
                records.push(record);
            }
        }
    }

    fn collect_local(&self, records: &mut Vec<SourceRecord>) {
        for parser in &self.parsers {
            if !parser.is_installed() {
                tracing::debug!(tool = %parser.tool(), "Tool not installed, skipping");
                continue;
            }
            let Some(root) = parser.default_root() else {
                continue;
            };

            let record = parser.parse(&root, LOCAL_SOURCE);
            if record.has_data() {
                tracing::info!(
                    tool = parser.tool().display_name(),
                    events = record.events.len(),
                    "Scanned local data"
                );
                records.push(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_with_name() {
        let spec = DataPathSpec::parse("/backups/work/.claude:work");
        assert_eq!(spec.path(), Path::new("/backups/work/.claude"));
        assert_eq!(spec.name(), "work");
    }

    #[test]
    fn test_data_path_default_names() {
        let spec = DataPathSpec::parse("/backups/laptop/.claude");
        assert_eq!(spec.name(), "laptop");

        let spec = DataPathSpec::parse("/backups/desktop-claude");
        assert_eq!(spec.name(), "desktop-claude");
    }

    #[test]
    fn test_data_path_colon_without_name() {
        // Trailing colon and a colon inside the path are not names
        let spec = DataPathSpec::parse("/data/dir:");
        assert_eq!(spec.path(), Path::new("/data/dir:"));
        assert_eq!(spec.name(), "dir:");

        let spec = DataPathSpec::parse("/mnt/c:/logs");
        assert_eq!(spec.path(), Path::new("/mnt/c:/logs"));
        assert_eq!(spec.name(), "logs");
    }

    fn write_history(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(
            dir.join("history.jsonl"),
            "{\"timestamp\": \"2024-03-01T12:00:00Z\"}\n",
        )
        .unwrap();
    }

    #[test]
    fn test_collect_nothing_is_no_data() {
        let collector = SourceCollector::with_parsers(
            CollectOptions {
                remote_only: true,
                ..Default::default()
            },
            RemoteConfig::default(),
            Vec::new(),
        );
        assert!(matches!(collector.collect(), Err(Error::NoData)));
    }

    #[test]
    fn test_collect_data_paths_and_local() {
        let tmp = tempfile::tempdir().unwrap();
        let imported = tmp.path().join("laptop/.claude");
        write_history(&imported);
        let local = tmp.path().join("home/.claude");
        write_history(&local);

        let options = CollectOptions {
            data_paths: vec![
                DataPathSpec::parse(&imported.to_string_lossy()),
                DataPathSpec::parse(&tmp.path().join("missing").to_string_lossy()),
            ],
            ..Default::default()
        };
        let collector = SourceCollector::with_parsers(
            options,
            RemoteConfig::default(),
            vec![parsers::parser_with_root(Tool::ClaudeCode, local)],
        );

        let records = collector.collect().unwrap();
        let names: Vec<_> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["laptop", LOCAL_SOURCE]);
    }

    #[test]
    fn test_remote_only_skips_local() {
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join(".claude");
        write_history(&local);

        let collector = SourceCollector::with_parsers(
            CollectOptions {
                remote_only: true,
                ..Default::default()
            },
            RemoteConfig::default(),
            vec![parsers::parser_with_root(Tool::ClaudeCode, local)],
        );
        assert!(matches!(collector.collect(), Err(Error::NoData)));
    }

    #[test]
    fn test_empty_local_root_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let collector = SourceCollector::with_parsers(
            CollectOptions::default(),
            RemoteConfig::default(),
            vec![
                parsers::parser_with_root(Tool::Codex, tmp.path().to_path_buf()),
                parsers::parser_with_root(Tool::OpenCode, tmp.path().join("absent")),
            ],
        );
        assert!(matches!(collector.collect(), Err(Error::NoData)));
        assert_eq!(collector.installed_tools(), vec![Tool::Codex]);
    }

    #[test]
    fn test_unreachable_remote_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join(".claude");
        write_history(&local);

        let collector = SourceCollector::with_parsers(
            CollectOptions {
                remotes: vec!["me@unreachable".to_string()],
                ..Default::default()
            },
            RemoteConfig {
                rsync_path: "/nonexistent/rsync-binary".to_string(),
                ..Default::default()
            },
            vec![parsers::parser_with_root(Tool::ClaudeCode, local)],
        );

        let records = collector.collect().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, LOCAL_SOURCE);
    }

    #[test]
    fn test_remote_staging_failure_keeps_local_data() {
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join(".claude");
        write_history(&local);

        let collector = SourceCollector::with_parsers(
            CollectOptions {
                remotes: vec!["me@box".to_string()],
                ..Default::default()
            },
            RemoteConfig {
                staging_root: Some(tmp.path().join("no-such-dir")),
                ..Default::default()
            },
            vec![parsers::parser_with_root(Tool::ClaudeCode, local)],
        );

        let records = collector.collect().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, LOCAL_SOURCE);
        assert_eq!(records[0].events.len(), 1);
    }
}
