//! Source alias mapping.
//!
//! Aliases fold several raw source names into one merged name before
//! aggregation, e.g. `--merge-sources "laptop=me,desktop=me"`.

use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;

/// Raw source name → merged source name. Unmapped names resolve to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    map: HashMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `raw` to `merged`, replacing any previous mapping.
    pub fn insert(&mut self, raw: impl Into<String>, merged: impl Into<String>) {
        self.map.insert(raw.into(), merged.into());
    }

    /// Merged name for a raw source name.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.map.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Add every mapping of `other`, which wins on conflicts.
    pub fn extend(&mut self, other: AliasMap) {
        self.map.extend(other.map);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromStr for AliasMap {
    type Err = Infallible;

    /// Parse `raw=merged` pairs separated by commas.
    ///
    /// Whitespace around names is trimmed, pairs without `=` are ignored,
    /// and a later pair for the same raw name wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut aliases = AliasMap::new();
        for pair in s.split(',') {
            if let Some((raw, merged)) = pair.split_once('=') {
                aliases.insert(raw.trim(), merged.trim());
            }
        }
        Ok(aliases)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut aliases = AliasMap::new();
        for (raw, merged) in iter {
            aliases.insert(raw, merged);
        }
        aliases
    }
}
