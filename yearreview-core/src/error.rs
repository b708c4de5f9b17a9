//! Error types for yearreview-core

use thiserror::Error;

/// Main error type for the yearreview-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error while discovering or reading a tool's logs
    #[error("parse error in {tool} logs: {message}")]
    Parse { tool: String, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote mirror could not be fetched
    #[error("remote {remote} unavailable: {message}")]
    Remote { remote: String, message: String },

    /// Every source came back empty
    #[error("no usable usage data found in any source")]
    NoData,
}

/// Result type alias for yearreview-core
pub type Result<T> = std::result::Result<T, Error>;
