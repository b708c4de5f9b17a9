//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/yearreview/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/yearreview/` (~/.config/yearreview/)
//! - State/Logs: `$XDG_STATE_HOME/yearreview/` (~/.local/state/yearreview/)

use crate::aliases::AliasMap;
use crate::error::{Error, Result};
use crate::types::Tool;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Returns a best-effort home directory path.
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tool data path overrides
    #[serde(default)]
    pub tools: ToolPaths,

    /// Source aliases applied before `--merge-sources`
    #[serde(default)]
    pub aliases: AliasMap,

    /// Remote mirroring
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
}

/// Override paths for tool data directories
#[derive(Debug, Deserialize, Default)]
pub struct ToolPaths {
    /// Override path for Claude Code data
    pub claude_code_path: Option<PathBuf>,
    /// Override path for Codex data
    pub codex_path: Option<PathBuf>,
    /// Override path for OpenCode data
    pub opencode_path: Option<PathBuf>,
}

impl ToolPaths {
    /// Configured root for a tool, if overridden.
    pub fn root_for(&self, tool: Tool) -> Option<&Path> {
        match tool {
            Tool::ClaudeCode => self.claude_code_path.as_deref(),
            Tool::Codex => self.codex_path.as_deref(),
            Tool::OpenCode => self.opencode_path.as_deref(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Remote mirroring configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    /// Seconds before a remote fetch is abandoned
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,

    /// rsync executable
    #[serde(default = "default_rsync_path")]
    pub rsync_path: String,

    /// Directory mirrored from the remote, relative to its home
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    /// Where staging directories are created (default: system temp dir)
    #[serde(default)]
    pub staging_root: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_remote_timeout(),
            rsync_path: default_rsync_path(),
            remote_dir: default_remote_dir(),
            staging_root: None,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "remote.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.rsync_path.trim().is_empty() {
            return Err(Error::Config("remote.rsync_path must not be empty".to_string()));
        }
        Ok(())
    }
}

fn default_remote_timeout() -> u64 {
    120
}

fn default_rsync_path() -> String {
    "rsync".to_string()
}

fn default_remote_dir() -> String {
    ".claude/".to_string()
}

/// Report output configuration
#[derive(Debug, Deserialize, Default)]
pub struct ReportConfig {
    /// Where the HTML report is written (default ~/claude-year-review.html)
    pub output_path: Option<PathBuf>,
}

impl ReportConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| home_dir().join("claude-year-review.html"))
    }
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.remote.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/yearreview/config.toml` (~/.config/yearreview/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("yearreview").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/yearreview/` (~/.local/state/yearreview/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("yearreview")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/yearreview/yearreview.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("yearreview.log")
    }
}
