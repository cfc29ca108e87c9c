//! HTTP persistence gateway
//!
//! Saves POST each chunk to the save endpoint; loads GET the blob URL.
//! A missing blob on load is treated as never-saved and comes back empty.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{chunk_entries, PersistenceGateway, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::knowledge::KnowledgeEntry;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Persistence gateway backed by the training-data HTTP endpoints.
pub struct HttpPersistenceGateway {
    client: Client,
    save_url: Url,
    load_url: Url,
    chunk_size: usize,
}

impl HttpPersistenceGateway {
    pub fn new(save_url: &str, load_url: &str, chunk_size: usize) -> Result<Self> {
        let save_url = Url::parse(save_url)
            .map_err(|e| Error::Persistence(format!("invalid save endpoint: {e}")))?;
        let load_url = Url::parse(load_url)
            .map_err(|e| Error::Persistence(format!("invalid load endpoint: {e}")))?;
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Persistence(e.to_string()))?;
        Ok(Self {
            client,
            save_url,
            load_url,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn with_default_chunk_size(save_url: &str, load_url: &str) -> Result<Self> {
        Self::new(save_url, load_url, DEFAULT_CHUNK_SIZE)
    }
}

#[async_trait]
impl PersistenceGateway for HttpPersistenceGateway {
    async fn save(&self, entries: &BTreeMap<String, KnowledgeEntry>) -> Result<()> {
        let chunks = chunk_entries(entries, self.chunk_size, Utc::now());
        let total = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            let response = self
                .client
                .post(self.save_url.clone())
                .json(chunk)
                .send()
                .await
                .map_err(|e| {
                    Error::Persistence(format!("chunk {}/{total} failed: {e}", index + 1))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::Persistence(format!(
                    "chunk {}/{total} rejected with {status}",
                    index + 1
                )));
            }
            debug!(chunk = index + 1, total, entries = chunk.chunk.len(), "chunk saved");
        }

        info!(entries = entries.len(), chunks = total, "knowledge store saved");
        Ok(())
    }

    async fn load(&self) -> Result<BTreeMap<String, KnowledgeEntry>> {
        let response = self
            .client
            .get(self.load_url.clone())
            .send()
            .await
            .map_err(|e| Error::Persistence(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("no persisted knowledge found");
            return Ok(BTreeMap::new());
        }

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Persistence(format!("load returned {status}")));
        }

        let entries: BTreeMap<String, KnowledgeEntry> = response
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("unreadable blob: {e}")))?;

        debug!(entries = entries.len(), "knowledge store loaded");
        Ok(entries)
    }
}
