//! # Recommendation Engine
//! Combines comments, runs the sentiment gate, extracts keywords, scores
//! every policy, then filters, ranks and truncates.
//!
//! Built once at start-up and shared behind `Arc`. `analyze` is synchronous
//! and pure with respect to its inputs and the injected configuration; the
//! embedding strategy may block on network I/O, so async callers should run
//! it on the blocking pool.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{RecommendationSettings, RecommenderConfig, StrategyKind};
use crate::error::EngineError;
use crate::keywords;
use crate::logging::{anon_hash, truncate_vec};
use crate::matcher::{MatchResult, Policy, PolicyMatcher};
use crate::metrics;
use crate::sentiment::{Sentiment, SentimentLexicon, NEGATIVE_SKIP_REASON};
use crate::similarity::{EmbeddingSimilarity, LexicalSimilarity, SimilarityStrategy};
use crate::text::{join_texts, Tokenizer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub recommendations: Vec<MatchResult>,
    pub extracted_keywords: Vec<String>,
    pub overall_sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl AnalysisResult {
    /// `{[], [], neutral}`: what an empty request yields.
    pub fn empty() -> Self {
        Self {
            recommendations: Vec::new(),
            extracted_keywords: Vec::new(),
            overall_sentiment: Sentiment::Neutral,
            skip_reason: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    tokenizer: Tokenizer,
    lexicon: SentimentLexicon,
    matcher: PolicyMatcher,
    settings: RecommendationSettings,
}

impl RecommendationEngine {
    /// Build the configured strategy. An embedding model that cannot be
    /// reached is fatal unless `strategy.fallback_to_lexical` is set.
    ///
    /// May block (embedding warm-up).
    pub fn from_config(cfg: &RecommenderConfig) -> Result<Self, EngineError> {
        let tokenizer = Tokenizer::from_config(&cfg.tokenizer);
        let lexical = || SimilarityStrategy::Lexical(LexicalSimilarity::new(tokenizer.clone(), cfg.tfidf.clone()));

        let strategy = match cfg.strategy.kind {
            StrategyKind::Lexical => lexical(),
            StrategyKind::Embedding => match EmbeddingSimilarity::from_config(&cfg.embedding) {
                Ok(emb) => SimilarityStrategy::Embedding(emb),
                Err(e) if cfg.strategy.fallback_to_lexical => {
                    warn!(error = %e, "embedding model unavailable; falling back to lexical strategy");
                    lexical()
                }
                Err(e) => return Err(e),
            },
        };
        Ok(Self::with_strategy(cfg, tokenizer, strategy))
    }

    /// Assemble an engine around an already-built strategy.
    pub fn with_strategy(cfg: &RecommenderConfig, tokenizer: Tokenizer, strategy: SimilarityStrategy) -> Self {
        info!(
            model_type = strategy.model_type(),
            analyzer = tokenizer.analyzer_name(),
            min_match_score = cfg.recommendation.min_match_score,
            max_recommendations = cfg.recommendation.max_recommendations,
            policies_known = cfg.policy_keywords.len(),
            "recommendation engine ready"
        );
        let matcher = PolicyMatcher::new(strategy, cfg.keyword_dictionary(), cfg.fusion, cfg.reason_bands);
        Self {
            tokenizer,
            lexicon: cfg.sentiment_lexicon(),
            matcher,
            settings: cfg.recommendation.clone(),
        }
    }

    pub fn analyze<S: AsRef<str>>(&self, comments: &[S], policies: &[Policy]) -> AnalysisResult {
        if comments.is_empty() || policies.is_empty() {
            debug!(comments = comments.len(), policies = policies.len(), "empty input; nothing to analyze");
            return AnalysisResult::empty();
        }
        let started = Instant::now();

        let combined = join_texts(comments);
        let text_id = anon_hash(&combined);
        let extracted_keywords = self.extract_keywords(&combined, self.settings.keyword_top_n);
        let sentiment = self.analyze_sentiment(&combined);

        if sentiment.is_negative() {
            info!(%text_id, sentiment = %sentiment, "negative evaluation; recommendations skipped");
            metrics::record_analysis(self.strategy_kind().as_str(), true, 0, elapsed_ms(started));
            return AnalysisResult {
                recommendations: Vec::new(),
                extracted_keywords,
                overall_sentiment: sentiment,
                skip_reason: Some(NEGATIVE_SKIP_REASON.to_string()),
            };
        }

        let mut recommendations: Vec<MatchResult> = policies
            .iter()
            .filter_map(|policy| match self.matcher.match_policy(&combined, policy) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!(%text_id, error = %e, "skipping malformed policy");
                    metrics::record_policy_error();
                    None
                }
            })
            .filter(|m| m.match_score >= self.settings.min_match_score)
            .collect();

        // Stable: equal scores keep input order.
        recommendations.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        recommendations.truncate(self.settings.max_recommendations);

        let top: Vec<String> = recommendations
            .iter()
            .map(|r| format!("{}={}", r.policy_name, r.match_score))
            .collect();
        info!(
            %text_id,
            sentiment = %sentiment,
            policies = policies.len(),
            recommended = recommendations.len(),
            top = ?truncate_vec(&top, 3),
            "analysis complete"
        );
        metrics::record_analysis(
            self.strategy_kind().as_str(),
            false,
            recommendations.len(),
            elapsed_ms(started),
        );

        AnalysisResult {
            recommendations,
            extracted_keywords,
            overall_sentiment: sentiment,
            skip_reason: None,
        }
    }

    pub fn extract_keywords(&self, text: &str, top_n: usize) -> Vec<String> {
        keywords::extract_keywords(&self.tokenizer, text, top_n)
    }

    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        self.matcher.strategy().similarity(a, b)
    }

    pub fn match_policy(&self, combined_text: &str, policy: &Policy) -> Result<MatchResult, crate::error::MatchError> {
        self.matcher.match_policy(combined_text, policy)
    }

    pub fn analyze_sentiment(&self, text: &str) -> Sentiment {
        self.lexicon.classify(text)
    }

    pub fn model_type(&self) -> &'static str {
        self.matcher.strategy().model_type()
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        self.matcher.strategy().kind()
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
