// src/config/mod.rs
//! Process-wide configuration, loaded once at start-up.

pub mod recommender;

pub use recommender::{
    AnalyzerKind, EmbeddingConfig, RecommendationSettings, RecommenderConfig, SentimentWords,
    StrategyConfig, StrategyKind, TokenizerConfig, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH,
    ENV_EMBEDDING_URL, ENV_MAX_RECOMMENDATIONS, ENV_MIN_MATCH_SCORE, ENV_STRATEGY,
};
