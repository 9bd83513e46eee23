// src/similarity/mod.rs
//! Text-to-text similarity behind one interface.
//!
//! The strategy is picked once when the engine is built. Callers only see
//! `similarity(a, b) -> f64`; failures inside a strategy are logged and
//! scored 0.0 so a single bad pair never aborts a batch.

pub mod embedding;
pub mod tfidf;

use tracing::warn;

use crate::config::StrategyKind;
use crate::error::SimilarityError;

pub use embedding::{EmbeddingSimilarity, RemoteEncoder, SentenceEncoder, SerializedEncoder};
pub use tfidf::{LexicalSimilarity, TfidfParams, TfidfVectorizer};

#[derive(Debug, Clone)]
pub enum SimilarityStrategy {
    Lexical(LexicalSimilarity),
    Embedding(EmbeddingSimilarity),
}

impl SimilarityStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            SimilarityStrategy::Lexical(_) => StrategyKind::Lexical,
            SimilarityStrategy::Embedding(_) => StrategyKind::Embedding,
        }
    }

    /// Name reported by health checks.
    pub fn model_type(&self) -> &'static str {
        match self {
            SimilarityStrategy::Lexical(_) => "TfidfRecommender",
            SimilarityStrategy::Embedding(_) => "EmbeddingRecommender",
        }
    }

    /// Raw similarity of `a` and `b`. Lexical scores lie in [0, 1],
    /// embedding scores in [-1, 1]. Blank input on either side is 0.0 and
    /// never reaches the model.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        if a.trim().is_empty() || b.trim().is_empty() {
            return 0.0;
        }
        let result = match self {
            SimilarityStrategy::Lexical(lex) => lex.score(a, b),
            SimilarityStrategy::Embedding(emb) => emb.score(a, b),
        };
        match result.and_then(|s| if s.is_finite() { Ok(s) } else { Err(SimilarityError::NotFinite) }) {
            Ok(s) => s,
            Err(e) => {
                warn!(strategy = self.kind().as_str(), error = %e, "similarity failed; scoring 0.0");
                0.0
            }
        }
    }

    /// Map a raw similarity onto [0, 1] for fusion.
    pub fn normalize(&self, raw: f64) -> f64 {
        match self {
            SimilarityStrategy::Lexical(_) => raw,
            SimilarityStrategy::Embedding(_) => (raw + 1.0) / 2.0,
        }
    }
}

/// Cosine of two equal-length vectors; 0.0 when either has zero norm.
/// Extra trailing components of the longer slice are ignored.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}
