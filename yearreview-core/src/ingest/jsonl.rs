//! JSON-lines reading.
//!
//! Every helper here is total. A line that fails to parse becomes `None`
//! and is filtered out; an unreadable file yields no records.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse one raw line into a record, or `None` if it is blank or malformed.
pub fn parse_line<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Read every well-formed record of a JSONL file.
///
/// Invalid UTF-8 is replaced rather than rejected, blank and malformed lines
/// are dropped, and a missing or unreadable file gives an empty list.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable file");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_number, chunk) in BufReader::new(file).split(b'\n').enumerate() {
        let bytes = match chunk {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    line = line_number + 1,
                    error = %e,
                    "Read error, stopping file"
                );
                break;
            }
        };

        let line = String::from_utf8_lossy(&bytes);
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(path = %path.display(), skipped, "Skipped malformed lines");
    }

    records
}

/// Read a whole JSON document, or `None` if missing or malformed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Ignoring malformed JSON file");
            None
        }
    }
}
