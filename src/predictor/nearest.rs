//! In-process nearest-neighbor predictor
//!
//! Keeps the trained pairs and answers with the output of the most similar
//! input seen so far, measured by cosine similarity. Stands in for an
//! external sequence model when none is wired up.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::debug;

use super::Predictor;
use crate::error::{Error, Result};

/// Trained pairs kept before the oldest are dropped.
const DEFAULT_MEMORY: usize = 4096;

/// Nearest-neighbor lookup over everything the engine has trained on.
pub struct NearestPredictor {
    pairs: Mutex<VecDeque<(Vec<f32>, Vec<f32>)>>,
    memory: usize,
}

impl NearestPredictor {
    pub fn new() -> Self {
        Self::with_memory(DEFAULT_MEMORY)
    }

    pub fn with_memory(memory: usize) -> Self {
        Self {
            pairs: Mutex::new(VecDeque::new()),
            memory: memory.max(1),
        }
    }
}

impl Default for NearestPredictor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Predictor for NearestPredictor {
    async fn train(&self, input: &[f32], output: &[f32]) -> Result<()> {
        let mut pairs = self.pairs.lock().await;
        if pairs.len() == self.memory {
            pairs.pop_front();
        }
        pairs.push_back((input.to_vec(), output.to_vec()));
        debug!(pairs = pairs.len(), "training pair recorded");
        Ok(())
    }

    async fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        let pairs = self.pairs.lock().await;
        pairs
            .iter()
            .max_by(|a, b| {
                cosine_similarity(&a.0, input)
                    .partial_cmp(&cosine_similarity(&b.0, input))
                    .unwrap_or(Ordering::Equal)
            })
            .map(|(_, output)| output.clone())
            .ok_or_else(|| Error::Predictor("no training pairs yet".to_string()))
    }

    async fn reset(&self) {
        self.pairs.lock().await.clear();
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
