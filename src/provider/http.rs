//! HTTP definition provider
//!
//! Queries the word-data endpoint with `?word=` and maps its two response
//! shapes onto the crate's error kinds: an error envelope means the word is
//! unknown, anything transport-level means the lookup failed outright.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{DefinitionProvider, WordData};
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire response: either word data or an error envelope echoing the word.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LookupResponse {
    Failure {
        error: String,
        #[serde(default)]
        word: Option<String>,
    },
    Success(WordData),
}

/// Definition provider backed by the word-data HTTP endpoint.
pub struct HttpDefinitionProvider {
    client: Client,
    endpoint: Url,
}

impl HttpDefinitionProvider {
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::LookupTransport(format!("invalid lookup endpoint: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::LookupTransport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl DefinitionProvider for HttpDefinitionProvider {
    async fn lookup(&self, word: &str) -> Result<WordData> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("word", word)])
            .send()
            .await
            .map_err(|e| Error::LookupTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::LookupTransport(format!("lookup returned {status}")));
        }

        let payload: LookupResponse = response
            .json()
            .await
            .map_err(|e| Error::LookupTransport(e.to_string()))?;

        match payload {
            LookupResponse::Success(data) => {
                debug!(%word, word_type = %data.word_type, "definition fetched");
                Ok(data)
            }
            LookupResponse::Failure { error, word: echoed } => Err(Error::LookupNotFound {
                word: echoed.unwrap_or_else(|| word.to_string()),
                message: error,
            }),
        }
    }
}
