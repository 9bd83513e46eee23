// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod keywords;
pub mod logging;
pub mod matcher;
pub mod metrics;
pub mod morph;
pub mod sentiment;
pub mod similarity;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::config::RecommenderConfig;
pub use crate::engine::{AnalysisResult, RecommendationEngine};
pub use crate::error::{EngineError, MatchError, SimilarityError};
pub use crate::matcher::{MatchResult, Policy};
pub use crate::sentiment::Sentiment;
pub use crate::similarity::{SentenceEncoder, SimilarityStrategy};
