//! Error types shared across the crate
//!
//! Every failure the engine can encounter falls into one of four kinds,
//! and all of them are recoverable: the learning loop maps them to a
//! fallback word selection instead of terminating.

use thiserror::Error;

/// Closed set of failure kinds the engine knows how to recover from.
#[derive(Debug, Error)]
pub enum Error {
    /// The definition backend does not know the word.
    #[error("no definition for '{word}': {message}")]
    LookupNotFound { word: String, message: String },

    /// The definition backend could not be reached or returned an
    /// unreadable response.
    #[error("definition lookup failed: {0}")]
    LookupTransport(String),

    /// Saving or loading the knowledge store failed.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// The sequence predictor failed to train or predict.
    #[error("predictor failed: {0}")]
    Predictor(String),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_word() {
        let err = Error::LookupNotFound {
            word: "spear".to_string(),
            message: "Word not found".to_string(),
        };
        assert_eq!(err.to_string(), "no definition for 'spear': Word not found");
    }
}
