//! Error types shared across the engine seams.
//!
//! Similarity failures never leave the similarity layer (they degrade to 0.0),
//! and per-policy failures never leave the orchestrator. Only start-up errors
//! (`EngineError`) reach callers.

use thiserror::Error;

/// Raised inside a similarity strategy. Callers outside `similarity` only
/// ever see the degraded 0.0 score.
#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("empty vocabulary; documents contain no usable terms")]
    EmptyVocabulary,
    #[error("after pruning, no terms remain (min_df={min_df}, max_df={max_df})")]
    AllTermsPruned { min_df: usize, max_df: f64 },
    #[error("encoder failed: {0}")]
    Encoder(String),
    #[error("embedding dimensions differ ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
    #[error("similarity is not a finite number")]
    NotFinite,
}

/// A single policy could not be scored; the orchestrator skips it.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("policy {policy_id} has no name")]
    MissingName { policy_id: String },
}

/// Fatal at engine construction.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("embedding model `{model}` unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },
}
