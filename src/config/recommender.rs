// src/config/recommender.rs
//! Recommender configuration (TOML).
//!
//! Resolution order:
//! 1) `$REWARD_CONFIG_PATH` (must exist)
//! 2) `config/recommender.toml`
//! 3) built-in defaults
//!
//! Every section is optional; missing fields fall back to the defaults below.
//! A few scalar knobs can be overridden from the environment after loading.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::matcher::{FusionConfig, KeywordDictionary, ReasonBands, DEFAULT_POLICY_KEYWORDS};
use crate::sentiment::{SentimentLexicon, DEFAULT_NEGATIVE_WORDS, DEFAULT_POSITIVE_WORDS};
use crate::similarity::tfidf::TfidfParams;

pub const DEFAULT_CONFIG_PATH: &str = "config/recommender.toml";

pub const ENV_CONFIG_PATH: &str = "REWARD_CONFIG_PATH";
pub const ENV_STRATEGY: &str = "REWARD_STRATEGY";
pub const ENV_MIN_MATCH_SCORE: &str = "REWARD_MIN_MATCH_SCORE";
pub const ENV_MAX_RECOMMENDATIONS: &str = "REWARD_MAX_RECOMMENDATIONS";
pub const ENV_EMBEDDING_URL: &str = "REWARD_EMBEDDING_URL";

fn default_min_match_score() -> u32 {
    20
}
fn default_max_recommendations() -> usize {
    3
}
fn default_keyword_top_n() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSettings {
    /// Recommendations scoring below this (0..=100) are dropped.
    #[serde(default = "default_min_match_score")]
    pub min_match_score: u32,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    /// Size of `extractedKeywords` in an analysis.
    #[serde(default = "default_keyword_top_n")]
    pub keyword_top_n: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            min_match_score: default_min_match_score(),
            max_recommendations: default_max_recommendations(),
            keyword_top_n: default_keyword_top_n(),
        }
    }
}

/// Which similarity strategy the engine runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Lexical,
    Embedding,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Lexical => "lexical",
            StrategyKind::Embedding => "embedding",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "tfidf" => Ok(StrategyKind::Lexical),
            "embedding" | "bert" | "kobert" => Ok(StrategyKind::Embedding),
            other => Err(anyhow!("unknown strategy `{other}` (expected lexical|embedding)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub kind: StrategyKind,
    /// Build the lexical strategy when the embedding model cannot be loaded.
    #[serde(default)]
    pub fallback_to_lexical: bool,
}

fn default_model() -> String {
    "jhgan/ko-sroberta-multitask".to_string()
}
fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Sentence-embedding model name as known to the embedding server.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Serialize encode calls behind a mutex (for non-reentrant encoders).
    #[serde(default)]
    pub serialize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            serialize: false,
        }
    }
}

/// Morphological analyzer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    #[default]
    Suffix,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub analyzer: AnalyzerKind,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

fn default_positive() -> Vec<String> {
    DEFAULT_POSITIVE_WORDS.iter().map(|s| s.to_string()).collect()
}
fn default_negative() -> Vec<String> {
    DEFAULT_NEGATIVE_WORDS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentWords {
    #[serde(default = "default_positive")]
    pub positive: Vec<String>,
    #[serde(default = "default_negative")]
    pub negative: Vec<String>,
}

impl Default for SentimentWords {
    fn default() -> Self {
        Self {
            positive: default_positive(),
            negative: default_negative(),
        }
    }
}

fn default_policy_keywords() -> BTreeMap<String, Vec<String>> {
    DEFAULT_POLICY_KEYWORDS
        .iter()
        .map(|(name, kws)| {
            (
                name.to_string(),
                kws.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub tfidf: TfidfParams,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub sentiment: SentimentWords,
    #[serde(default = "default_policy_keywords")]
    pub policy_keywords: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub reason_bands: ReasonBands,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            recommendation: RecommendationSettings::default(),
            strategy: StrategyConfig::default(),
            tfidf: TfidfParams::default(),
            embedding: EmbeddingConfig::default(),
            tokenizer: TokenizerConfig::default(),
            sentiment: SentimentWords::default(),
            policy_keywords: default_policy_keywords(),
            fusion: FusionConfig::default(),
            reason_bands: ReasonBands::default(),
        }
    }
}

impl RecommenderConfig {
    /// Resolve the config file (env → default path → built-ins), then apply
    /// env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        path.display()
                    ));
                }
                Self::from_path(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_path(&path)?
                } else {
                    info!("no {DEFAULT_CONFIG_PATH} found; using built-in defaults");
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading recommender config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing recommender config {}", path.display()))?;
        info!(path = %path.display(), strategy = cfg.strategy.kind.as_str(), "recommender config loaded");
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: RecommenderConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override scalar knobs from a key lookup (env in production, a map in tests).
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = get(ENV_STRATEGY) {
            match raw.parse::<StrategyKind>() {
                Ok(kind) => self.strategy.kind = kind,
                Err(e) => warn!(error = %e, "ignoring {ENV_STRATEGY}"),
            }
        }
        if let Some(raw) = get(ENV_MIN_MATCH_SCORE) {
            match raw.trim().parse::<u32>() {
                Ok(v) => self.recommendation.min_match_score = v,
                Err(e) => warn!(error = %e, "ignoring {ENV_MIN_MATCH_SCORE}"),
            }
        }
        if let Some(raw) = get(ENV_MAX_RECOMMENDATIONS) {
            match raw.trim().parse::<usize>() {
                Ok(v) => self.recommendation.max_recommendations = v,
                Err(e) => warn!(error = %e, "ignoring {ENV_MAX_RECOMMENDATIONS}"),
            }
        }
        if let Some(raw) = get(ENV_EMBEDDING_URL) {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.embedding.base_url = raw.to_string();
            }
        }
        self.sanitize();
    }

    /// Clamp values into their valid ranges.
    pub fn sanitize(&mut self) {
        self.recommendation.min_match_score = self.recommendation.min_match_score.min(100);
        if self.recommendation.keyword_top_n == 0 {
            self.recommendation.keyword_top_n = default_keyword_top_n();
        }
        if self.embedding.timeout_secs == 0 {
            self.embedding.timeout_secs = default_timeout_secs();
        }
        self.tfidf.sanitize();
        self.fusion.sanitize();
        self.reason_bands.sanitize();
    }

    pub fn keyword_dictionary(&self) -> KeywordDictionary {
        KeywordDictionary::new(self.policy_keywords.clone())
    }

    pub fn sentiment_lexicon(&self) -> SentimentLexicon {
        SentimentLexicon::new(&self.sentiment.positive, &self.sentiment.negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = RecommenderConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, RecommenderConfig::default());
        assert_eq!(cfg.strategy.kind, StrategyKind::Lexical);
        assert!(cfg.policy_keywords.contains_key("팀워크상"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = RecommenderConfig::from_toml_str(
            r#"
[recommendation]
min_match_score = 35

[strategy]
kind = "embedding"
fallback_to_lexical = true

[policy_keywords]
"혁신상" = ["혁신", "아이디어"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.recommendation.min_match_score, 35);
        assert_eq!(cfg.recommendation.max_recommendations, 3);
        assert_eq!(cfg.strategy.kind, StrategyKind::Embedding);
        assert!(cfg.strategy.fallback_to_lexical);
        assert_eq!(cfg.policy_keywords.len(), 1);
        assert_eq!(cfg.embedding.model, "jhgan/ko-sroberta-multitask");
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let cfg = RecommenderConfig::from_toml_str(
            r#"
[recommendation]
min_match_score = 250
keyword_top_n = 0

[tfidf]
max_df = 3.5
min_df = 0
"#,
        )
        .unwrap();
        assert_eq!(cfg.recommendation.min_match_score, 100);
        assert_eq!(cfg.recommendation.keyword_top_n, 10);
        assert_eq!(cfg.tfidf.max_df, 1.0);
        assert_eq!(cfg.tfidf.min_df, 1);
    }

    #[test]
    fn shipped_config_matches_builtin_defaults() {
        let cfg = RecommenderConfig::from_path(Path::new(DEFAULT_CONFIG_PATH)).unwrap();
        assert_eq!(cfg, RecommenderConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(RecommenderConfig::from_toml_str("[strategy]\nkind = \"quantum\"").is_err());
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_STRATEGY, "kobert"),
            (ENV_MIN_MATCH_SCORE, "not-a-number"),
            (ENV_MAX_RECOMMENDATIONS, "5"),
            (ENV_EMBEDDING_URL, "http://embed:8080"),
        ]);
        let mut cfg = RecommenderConfig::default();
        cfg.apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.strategy.kind, StrategyKind::Embedding);
        assert_eq!(cfg.recommendation.min_match_score, 20);
        assert_eq!(cfg.recommendation.max_recommendations, 5);
        assert_eq!(cfg.embedding.base_url, "http://embed:8080");
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("TFIDF".parse::<StrategyKind>().unwrap(), StrategyKind::Lexical);
        assert_eq!(" embedding ".parse::<StrategyKind>().unwrap(), StrategyKind::Embedding);
        assert!("".parse::<StrategyKind>().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn load_prefers_env_path_and_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.toml");
        fs::write(&path, "[recommendation]\nmax_recommendations = 7\n").unwrap();

        env::remove_var(ENV_MAX_RECOMMENDATIONS);
        env::set_var(ENV_CONFIG_PATH, path.display().to_string());
        let cfg = RecommenderConfig::load().unwrap();
        assert_eq!(cfg.recommendation.max_recommendations, 7);

        env::set_var(ENV_CONFIG_PATH, dir.path().join("missing.toml").display().to_string());
        assert!(RecommenderConfig::load().is_err());
        env::remove_var(ENV_CONFIG_PATH);
    }
}
