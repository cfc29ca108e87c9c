//! Word Explorer - autonomous word-learning library
//!
//! Incrementally builds a capacity-bounded knowledge base of words, their
//! definitions, and co-occurring related words:
//! - A continuous learning loop that looks words up, records what it
//!   finds, and follows the most interesting word onward
//! - A bounded knowledge store with recency- and frequency-based eviction
//! - A fixed-length word codec feeding a pluggable sequence predictor
//! - A chat path that composes replies from whatever is already known
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use word_explorer::config::Config;
//! use word_explorer::engine::LearningEngine;
//! use word_explorer::persistence::HttpPersistenceGateway;
//! use word_explorer::predictor::NearestPredictor;
//! use word_explorer::provider::HttpDefinitionProvider;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let engine = LearningEngine::new(
//!         config.engine(),
//!         Arc::new(HttpDefinitionProvider::new(&config.provider.lookup_url)?),
//!         Arc::new(HttpPersistenceGateway::with_default_chunk_size(
//!             &config.persistence.save_url,
//!             &config.persistence.load_url,
//!         )?),
//!         Arc::new(NearestPredictor::new()),
//!     );
//!     engine.start("spear").await;
//!     Ok(())
//! }
//! ```

// Core modules
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod persistence;
pub mod predictor;
pub mod provider;
pub mod cli;

// Re-export commonly used types for convenience
pub use engine::{EngineConfig, EngineState, LearningEngine, LearningStats};
pub use error::Error;
pub use knowledge::{DefinitionHistory, KnowledgeEntry, KnowledgeStore};
pub use persistence::PersistenceGateway;
pub use predictor::Predictor;
pub use provider::{DefinitionProvider, WordData};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Autonomous Word-Learning Library", NAME, VERSION)
}
