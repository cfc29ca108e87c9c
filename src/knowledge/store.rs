//! Capacity-bounded knowledge store
//!
//! Maps normalized words to what has been learned about them. Two caps are
//! enforced on every write: the store holds at most `capacity` words, with
//! the least-recently-updated entry evicted first, and each entry tracks at
//! most `related_capacity` co-occurring words, with the lowest-count ones
//! pruned first. Evictions are silent and observable only through the store
//! contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};

/// Default maximum number of words held in the store.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default maximum number of related words tracked per entry.
pub const DEFAULT_RELATED_CAPACITY: usize = 50;

/// Everything learned about a single word.
///
/// Serialized field names match the persisted JSON blob (`type`,
/// `lastUpdated`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub definition: String,
    #[serde(rename = "type")]
    pub word_type: String,
    /// Co-occurring words with their observation counts.
    #[serde(default)]
    pub related: BTreeMap<String, u32>,
    #[serde(rename = "lastUpdated", default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

/// Bounded mapping from word to knowledge entry.
///
/// A `BTreeMap` keeps iteration order stable, which makes eviction and
/// pruning tie-breaks deterministic: among equally old or equally counted
/// entries the lexicographically first key goes.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    entries: BTreeMap<String, KnowledgeEntry>,
    capacity: usize,
    related_capacity: usize,
}

impl KnowledgeStore {
    /// Create an empty store with explicit caps.
    pub fn new(capacity: usize, related_capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: capacity.max(1),
            related_capacity: related_capacity.max(1),
        }
    }

    /// Create an empty store with the default caps.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_RELATED_CAPACITY)
    }

    /// Build a store from a loaded blob.
    ///
    /// If the blob holds more entries than the store may, only the most
    /// recently updated ones are kept; every retained entry has its related
    /// map pruned down to the cap by the same lowest-count-first rule used
    /// on writes.
    pub fn from_entries(
        entries: BTreeMap<String, KnowledgeEntry>,
        capacity: usize,
        related_capacity: usize,
    ) -> Self {
        let mut store = Self::new(capacity, related_capacity);
        if entries.len() > store.capacity {
            let mut ordered: Vec<(String, KnowledgeEntry)> = entries.into_iter().collect();
            ordered.sort_by(|a, b| {
                b.1.last_updated
                    .cmp(&a.1.last_updated)
                    .then_with(|| a.0.cmp(&b.0))
            });
            ordered.truncate(store.capacity);
            store.entries = ordered.into_iter().collect();
        } else {
            store.entries = entries;
        }
        for entry in store.entries.values_mut() {
            Self::prune_related(&mut entry.related, store.related_capacity);
        }
        store
    }

    pub fn get(&self, word: &str) -> Option<&KnowledgeEntry> {
        self.entries.get(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored words in key order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The full entry map, for persistence and export.
    pub fn entries(&self) -> &BTreeMap<String, KnowledgeEntry> {
        &self.entries
    }

    /// Create or update an entry, stamping it with the current time.
    ///
    /// The definition and type always take the latest values; counts in
    /// `related_batch` are merged additively into the existing related map.
    /// Inserting a new word into a full store first evicts the entry with
    /// the oldest update time.
    pub fn upsert(&mut self, word: &str, definition: &str, word_type: &str, related_batch: &[String]) {
        self.upsert_at(word, definition, word_type, related_batch, Utc::now());
    }

    /// Same as [`upsert`](Self::upsert) with an explicit timestamp.
    pub fn upsert_at(
        &mut self,
        word: &str,
        definition: &str,
        word_type: &str,
        related_batch: &[String],
        timestamp: DateTime<Utc>,
    ) {
        if !self.entries.contains_key(word) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let entry = self
            .entries
            .entry(word.to_string())
            .or_insert_with(|| KnowledgeEntry {
                definition: String::new(),
                word_type: String::new(),
                related: BTreeMap::new(),
                last_updated: timestamp,
            });

        entry.definition = definition.to_string();
        entry.word_type = word_type.to_string();
        entry.last_updated = timestamp;
        for related in related_batch {
            *entry.related.entry(related.clone()).or_insert(0) += 1;
        }

        Self::prune_related(&mut entry.related, self.related_capacity);
    }

    /// Complete, indented JSON serialization of the store contents.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Remove the entry with the oldest update time.
    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_updated)
            .map(|(word, _)| word.clone());
        if let Some(word) = oldest {
            debug!(%word, "evicting least-recently-updated entry");
            self.entries.remove(&word);
        }
    }

    /// Drop lowest-count related words until the map fits the cap.
    fn prune_related(related: &mut BTreeMap<String, u32>, cap: usize) {
        while related.len() > cap {
            let lowest = related
                .iter()
                .min_by_key(|(_, count)| **count)
                .map(|(word, _)| word.clone());
            match lowest {
                Some(word) => {
                    related.remove(&word);
                }
                None => break,
            }
        }
    }
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
