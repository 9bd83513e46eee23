// src/matcher.rs
//! Score one policy against the combined comment text.
//!
//! The score fuses text similarity with the share of the policy's boost
//! keywords found in the text, then scales to an integer in 0..=100. Each
//! result carries a short Korean justification for the employee-facing UI.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::MatchError;
use crate::similarity::SimilarityStrategy;

/// Built-in boost keywords per policy name.
pub const DEFAULT_POLICY_KEYWORDS: &[(&str, &[&str])] = &[
    ("프로젝트 MVP", &["프로젝트", "완료", "기여", "성과", "달성", "목표", "주도"]),
    ("팀워크상", &["협업", "팀워크", "팀원", "협력", "소통", "배려"]),
    ("혁신상", &["혁신", "아이디어", "개선", "제안", "창의"]),
    ("성실상", &["성실", "근면", "책임감", "꾸준"]),
    ("리더십상", &["리더십", "주도", "멘토", "이끌", "지도"]),
    ("고객만족상", &["고객", "만족", "친절", "응대", "서비스"]),
];

/// Keyword clauses name at most this many matches.
const MAX_REASON_KEYWORDS: usize = 3;

/// A reward policy as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Opaque; echoed back untouched.
    #[serde(default)]
    pub policy_id: Value,
    #[serde(default)]
    pub policy_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Policy {
    pub fn new(policy_id: impl Into<Value>, name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            policy_id: policy_id.into(),
            policy_name: name.into(),
            description: description.map(str::to_string),
        }
    }

    /// Description, or the name when the description is missing or blank.
    pub fn description_or_name(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => &self.policy_name,
        }
    }

    /// Text compared against the comments: `"{name}. {description}"`.
    pub fn match_text(&self) -> String {
        format!("{}. {}", self.policy_name, self.description_or_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub policy_id: Value,
    pub policy_name: String,
    pub match_score: u32,
    pub similarity_score: f64,
    pub reason: String,
    pub keywords: Vec<String>,
}

/// Policy name → ordered, de-duplicated boost keywords.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl KeywordDictionary {
    pub fn new<I, K, V, W>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = W>,
        W: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, words)| {
                let mut seen: Vec<String> = Vec::new();
                for w in words {
                    let w: String = w.into();
                    let w = w.trim().to_string();
                    if !w.is_empty() && !seen.contains(&w) {
                        seen.push(w);
                    }
                }
                (name.into(), seen)
            })
            .collect();
        Self { entries }
    }

    pub fn korean_default() -> Self {
        Self::new(DEFAULT_POLICY_KEYWORDS.iter().map(|(n, kws)| (*n, kws.iter().copied())))
    }

    /// Keywords for `policy_name`; empty when the policy is unknown.
    pub fn keywords_for(&self, policy_name: &str) -> &[String] {
        self.entries.get(policy_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub similarity: f64,
    pub keyword: f64,
}

impl FusionWeights {
    fn sanitize(&mut self, fallback: FusionWeights) {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        if !ok(self.similarity) || !ok(self.keyword) {
            *self = fallback;
        }
    }
}

fn default_lexical_weights() -> FusionWeights {
    FusionWeights { similarity: 0.5, keyword: 0.5 }
}
fn default_embedding_weights() -> FusionWeights {
    FusionWeights { similarity: 0.7, keyword: 0.3 }
}

/// Per-strategy weights for similarity vs. keyword ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_lexical_weights")]
    pub lexical: FusionWeights,
    #[serde(default = "default_embedding_weights")]
    pub embedding: FusionWeights,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            lexical: default_lexical_weights(),
            embedding: default_embedding_weights(),
        }
    }
}

impl FusionConfig {
    pub fn sanitize(&mut self) {
        self.lexical.sanitize(default_lexical_weights());
        self.embedding.sanitize(default_embedding_weights());
    }

    pub fn weights_for(&self, strategy: &SimilarityStrategy) -> FusionWeights {
        match strategy {
            SimilarityStrategy::Lexical(_) => self.lexical,
            SimilarityStrategy::Embedding(_) => self.embedding,
        }
    }
}

fn default_high() -> f64 {
    0.5
}
fn default_medium() -> f64 {
    0.3
}
fn default_weak() -> f64 {
    0.1
}

/// Similarity thresholds for the relevance clause, applied to the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReasonBands {
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_weak")]
    pub weak: f64,
}

impl Default for ReasonBands {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            weak: default_weak(),
        }
    }
}

impl ReasonBands {
    /// Bands must be finite and descending; otherwise reset to defaults.
    pub fn sanitize(&mut self) {
        let finite = self.high.is_finite() && self.medium.is_finite() && self.weak.is_finite();
        if !finite || self.high < self.medium || self.medium < self.weak {
            *self = Self::default();
        }
    }
}

/// Scores policies with one similarity strategy and one keyword dictionary.
#[derive(Debug, Clone)]
pub struct PolicyMatcher {
    strategy: SimilarityStrategy,
    dictionary: KeywordDictionary,
    fusion: FusionConfig,
    bands: ReasonBands,
}

impl PolicyMatcher {
    pub fn new(
        strategy: SimilarityStrategy,
        dictionary: KeywordDictionary,
        fusion: FusionConfig,
        bands: ReasonBands,
    ) -> Self {
        Self {
            strategy,
            dictionary,
            fusion,
            bands,
        }
    }

    pub fn strategy(&self) -> &SimilarityStrategy {
        &self.strategy
    }

    pub fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    pub fn match_policy(&self, combined_text: &str, policy: &Policy) -> Result<MatchResult, MatchError> {
        let name = policy.policy_name.trim();
        if name.is_empty() {
            return Err(MatchError::MissingName {
                policy_id: policy.policy_id.to_string(),
            });
        }

        let policy_keywords = self.dictionary.keywords_for(&policy.policy_name);
        let similarity = self.strategy.similarity(combined_text, &policy.match_text());

        let matched: Vec<String> = policy_keywords
            .iter()
            .filter(|k| combined_text.contains(k.as_str()))
            .cloned()
            .collect();
        let keyword_score = keyword_ratio(matched.len(), policy_keywords.len());

        let weights = self.fusion.weights_for(&self.strategy);
        let fused = self.strategy.normalize(similarity) * weights.similarity + keyword_score * weights.keyword;
        let high_clause = match self.strategy {
            SimilarityStrategy::Lexical(_) => HighClause::Lexical,
            SimilarityStrategy::Embedding(_) => HighClause::Semantic,
        };

        Ok(MatchResult {
            policy_id: policy.policy_id.clone(),
            policy_name: policy.policy_name.clone(),
            match_score: to_match_score(fused * 100.0),
            similarity_score: round4(similarity),
            reason: build_reason(&policy.policy_name, &matched, similarity, &self.bands, high_clause),
            keywords: matched,
        })
    }
}

/// `matched / total`, or 0.0 for an empty keyword set.
pub fn keyword_ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

/// Clamp to 0..=100 and floor. Non-finite input scores 0.
pub fn to_match_score(raw: f64) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    raw.clamp(0.0, 100.0).floor() as u32
}

pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Wording of the high-relevance clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighClause {
    Lexical,
    Semantic,
}

pub fn build_reason(
    policy_name: &str,
    matched: &[String],
    similarity: f64,
    bands: &ReasonBands,
    high_clause: HighClause,
) -> String {
    let mut clauses: Vec<String> = Vec::with_capacity(2);

    if similarity >= bands.high {
        clauses.push(match high_clause {
            HighClause::Lexical => format!("'{policy_name}' 정책과 높은 연관성 확인"),
            HighClause::Semantic => format!("'{policy_name}' 정책과 높은 의미적 연관성 확인 (임베딩 분석)"),
        });
    } else if similarity >= bands.medium {
        clauses.push(format!("'{policy_name}' 정책과 연관성 확인"));
    } else if similarity >= bands.weak {
        clauses.push(format!("'{policy_name}' 정책과 약한 연관성"));
    }

    if !matched.is_empty() {
        let shown: Vec<&str> = matched.iter().take(MAX_REASON_KEYWORDS).map(String::as_str).collect();
        clauses.push(format!("핵심 키워드 '{}' 발견", shown.join("', '")));
    }

    if clauses.is_empty() {
        clauses.push("기본 조건 충족".to_string());
    }
    format!("{}.", clauses.join(". "))
}
