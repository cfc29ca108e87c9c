//! Knowledge-store persistence boundary
//!
//! The store travels as one JSON blob. Saves larger than the batch size are
//! split into fixed-size chunks, each sent as an independent request; the
//! first failed chunk aborts the remaining ones and surfaces a single
//! error, leaving the in-memory store untouched.

mod http;

pub use http::HttpPersistenceGateway;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::knowledge::KnowledgeEntry;

/// Default number of entries per save chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// One chunk of a (possibly multi-part) save request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveChunk {
    pub chunk: BTreeMap<String, KnowledgeEntry>,
    #[serde(rename = "isPartial")]
    pub is_partial: bool,
    pub timestamp: DateTime<Utc>,
}

/// Saves and loads the full knowledge-store content.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Persist the full store content. Fails on the first failing chunk;
    /// the caller may simply save again later.
    async fn save(&self, entries: &BTreeMap<String, KnowledgeEntry>) -> Result<()>;

    /// Load the last saved content. A blob that was never saved is an
    /// empty mapping, not an error.
    async fn load(&self) -> Result<BTreeMap<String, KnowledgeEntry>>;
}

/// Split store content into save chunks of at most `chunk_size` entries.
///
/// Every chunk of a multi-chunk save is flagged partial, including the
/// final short one; content that fits a single chunk is not partial.
pub fn chunk_entries(
    entries: &BTreeMap<String, KnowledgeEntry>,
    chunk_size: usize,
    timestamp: DateTime<Utc>,
) -> Vec<SaveChunk> {
    let chunk_size = chunk_size.max(1);
    if entries.is_empty() {
        return vec![SaveChunk {
            chunk: BTreeMap::new(),
            is_partial: false,
            timestamp,
        }];
    }

    let total_chunks = entries.len().div_ceil(chunk_size);
    let mut chunks = Vec::with_capacity(total_chunks);
    let mut current: BTreeMap<String, KnowledgeEntry> = BTreeMap::new();

    for (word, entry) in entries {
        current.insert(word.clone(), entry.clone());
        if current.len() == chunk_size {
            chunks.push(SaveChunk {
                chunk: std::mem::take(&mut current),
                is_partial: total_chunks > 1,
                timestamp,
            });
        }
    }
    if !current.is_empty() {
        chunks.push(SaveChunk {
            chunk: current,
            is_partial: total_chunks > 1,
            timestamp,
        });
    }

    chunks
}
