//! Sequence predictor boundary
//!
//! The engine feeds (input, output) vector pairs in during learning and
//! asks for a prediction back when selection comes up empty. What happens
//! between those two calls is the predictor's business; the engine only
//! sees fixed-length vectors from the word codec.

mod nearest;

pub use nearest::NearestPredictor;

use async_trait::async_trait;

use crate::error::Result;

/// Opaque sequence model consumed through train/predict over vectors.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Record one training pair. Best-effort; the engine logs and ignores
    /// failures.
    async fn train(&self, input: &[f32], output: &[f32]) -> Result<()>;

    /// Predict an output vector for the input.
    async fn predict(&self, input: &[f32]) -> Result<Vec<f32>>;

    /// Drop anything learned so far.
    async fn reset(&self);
}
