//! In-memory memory bank implementation.

use super::{entry_text, overlap_score, tokenize, SearchHit, StoreEntry};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// Append-only timestamped store.
///
/// Single owner, no internal locking. Wrap it in a mutex if it has to be
/// shared across tasks.
#[derive(Debug, Default)]
pub struct MemoryBank {
    entries: HashMap<String, Vec<StoreEntry>>,
    /// Keys in first-save order.
    keys: Vec<String>,
    next_seq: u64,
}

impl MemoryBank {
    /// Create an empty memory bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` under `key` with the current timestamp.
    pub fn save(&mut self, key: impl Into<String>, data: Value) -> &StoreEntry {
        let key = key.into();
        info!("Saving data to memory with key: {}", key);

        let entry = StoreEntry {
            key: key.clone(),
            data,
            timestamp: Utc::now(),
            seq: self.next_seq,
        };
        self.next_seq += 1;

        if !self.entries.contains_key(&key) {
            self.keys.push(key.clone());
        }
        let log = self.entries.entry(key).or_default();
        log.push(entry);
        &log[log.len() - 1]
    }

    /// Up to `limit` values for `key`, newest first. Unknown keys yield nothing.
    pub fn retrieve(&self, key: &str, limit: usize) -> Vec<Value> {
        info!("Retrieving data from memory with key: {}", key);

        let Some(log) = self.entries.get(key) else {
            return Vec::new();
        };

        let mut sorted: Vec<&StoreEntry> = log.iter().collect();
        sorted.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        sorted
            .into_iter()
            .take(limit)
            .map(|e| e.data.clone())
            .collect()
    }

    /// Keyword search across every key.
    ///
    /// Hits are ordered by descending score; equal scores keep insertion order.
    /// Entries sharing no token with the query are never returned.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        info!("Searching memory for: {}", query);

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &StoreEntry)> = self
            .keys
            .iter()
            .filter_map(|k| self.entries.get(k))
            .flatten()
            .map(|e| (overlap_score(&query_tokens, &entry_text(&e.data)), e))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.seq.cmp(&b.seq)));
        scored.truncate(top_k);

        debug!("Search matched {} entries", scored.len());

        scored
            .into_iter()
            .map(|(score, e)| SearchHit {
                key: e.key.clone(),
                data: e.data.clone(),
                score,
                timestamp: e.timestamp,
            })
            .collect()
    }

    /// Remove every entry under `key`. Returns false if the key was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        info!("Deleting data from memory with key: {}", key);

        if self.entries.remove(key).is_some() {
            self.keys.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    /// All keys currently present, in first-save order.
    pub fn get_all_keys(&self) -> Vec<String> {
        self.keys.clone()
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        info!("Clearing all data from memory");
        self.entries.clear();
        self.keys.clear();
    }

    /// Raw entries under `key` in append order.
    pub fn entries(&self, key: &str) -> &[StoreEntry] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of entries across all keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
