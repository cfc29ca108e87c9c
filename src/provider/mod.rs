//! Definition lookup boundary
//!
//! The engine learns words by asking a [`DefinitionProvider`] what they
//! mean. The trait is the whole contract; the bundled implementation talks
//! to the word-data HTTP endpoint.

mod http;

pub use http::HttpDefinitionProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One successful lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordData {
    pub definition: String,
    /// Extra encyclopedia-style text, when the backend has any.
    #[serde(default)]
    pub wiki: Option<String>,
    /// Short tag such as a part of speech.
    #[serde(rename = "type")]
    pub word_type: String,
}

impl WordData {
    /// Definition and extra info joined into the single text block the
    /// history and the selection heuristics operate on.
    pub fn combined_text(&self) -> String {
        match &self.wiki {
            Some(wiki) => format!("{} {}", self.definition, wiki),
            None => self.definition.clone(),
        }
    }
}

/// Looks up what a word means.
///
/// Callers normalize the word before asking; implementations only transport
/// the request. An unknown word and an unreachable backend are both plain
/// lookup failures to the engine.
#[async_trait]
pub trait DefinitionProvider: Send + Sync {
    async fn lookup(&self, word: &str) -> Result<WordData>;
}
