//! # yearreview-core
//!
//! Core library for yearreview - a year-in-review of AI coding assistant usage.
//!
//! This library provides:
//! - Domain types for events, token usage and per-source records
//! - Parsers for Claude Code, Codex and OpenCode log directories
//! - Source collection across local tools, pre-fetched paths and remotes
//! - Aggregation with source aliasing, streaks and activity rollups
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three stages:
//! - **Collect:** each source's log directory is parsed into a [`SourceRecord`]
//! - **Aggregate:** records are merged into one [`AggregatedView`]
//! - **Render:** the view is serialized or turned into a report by the CLI
//!
//! ## Example
//!
//! ```rust,no_run
//! use yearreview_core::ingest::CollectOptions;
//! use yearreview_core::{aggregate, Config, SourceCollector};
//!
//! let config = Config::load().expect("failed to load config");
//! let records = SourceCollector::from_config(CollectOptions::default(), &config)
//!     .collect()
//!     .expect("no usage data");
//! let view = aggregate(records, &config.aliases);
//! println!("{} tokens over {} days", view.total_tokens, view.streaks.total_days);
//! ```

// Re-export commonly used items at the crate root
pub use aggregate::{aggregate, aggregate_at};
pub use aliases::AliasMap;
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::SourceCollector;
pub use types::*;

// Public modules
pub mod aggregate;
pub mod aliases;
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod remote;
pub mod timestamp;
pub mod types;
