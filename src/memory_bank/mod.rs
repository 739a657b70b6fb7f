//! Timestamped memory bank for StudyConcierge.
//!
//! An append-only, multi-valued map from string keys to timestamped entries.
//! Writes never overwrite; they append. Reads return data newest first.

mod bank;

pub use bank::MemoryBank;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Default number of values returned by [`MemoryBank::retrieve`].
pub const DEFAULT_RETRIEVE_LIMIT: usize = 10;

/// Default number of hits returned by [`MemoryBank::search`].
pub const DEFAULT_SEARCH_TOP_K: usize = 5;

/// A single value stored under a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// Key this entry was saved under.
    pub key: String,
    /// Opaque stored value.
    pub data: Value,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Bank-wide append sequence. Breaks timestamp ties deterministically.
    #[serde(skip)]
    pub(crate) seq: u64,
}

/// A keyword search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Key the matching entry lives under.
    pub key: String,
    /// The matching entry's data.
    pub data: Value,
    /// Number of distinct query tokens found in the entry.
    pub score: usize,
    /// When the matching entry was appended.
    pub timestamp: DateTime<Utc>,
}

/// Split text on whitespace into a set of lowercase tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Render a stored value as plain searchable text.
///
/// Strings are used verbatim, other scalars use their JSON form, and containers
/// are flattened so that object keys and leaf values become separate words.
pub fn entry_text(value: &Value) -> String {
    let mut words = Vec::new();
    collect_words(value, &mut words);
    words.join(" ")
}

fn collect_words(value: &Value, words: &mut Vec<String>) {
    match value {
        Value::String(s) => words.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_words(item, words);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                words.push(key.clone());
                collect_words(item, words);
            }
        }
        other => words.push(other.to_string()),
    }
}

/// Number of distinct query tokens that also appear in the text.
pub fn overlap_score(query_tokens: &HashSet<String>, text: &str) -> usize {
    tokenize(text).intersection(query_tokens).count()
}
