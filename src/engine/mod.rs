//! Learning engine - the autonomous core
//!
//! Owns the knowledge store and drives the continuous learning loop; also
//! serves the user-facing message path.

pub mod learning;

pub use learning::{EngineConfig, EngineState, LearningEngine, LearningStats};
