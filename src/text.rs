// src/text.rs
//! Text normalization and tokenization.
//!
//! `preprocess` cleans raw comment text; `Tokenizer` turns it into content
//! tokens. With an analyzer attached, only content morphemes (nouns, verbs,
//! adjectives, roots) survive; without one, tokens are plain whitespace
//! splits. Both paths share the same stopword and length filter, and both
//! keep source order (ranking happens in `keywords`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{AnalyzerKind, TokenizerConfig};
use crate::morph::{Morphology, SuffixAnalyzer};

/// Korean function words that carry no evaluative signal.
pub const STOPWORDS: &[&str] = &[
    "의", "가", "이", "은", "들", "는", "좀", "잘", "걍", "과", "도", "를", "으로", "자", "에",
    "와", "한", "하다", "것", "수", "있다", "없다", "되다", "이다", "그", "저", "등", "및",
    "더", "에서", "로", "에게", "까지", "부터", "만", "또", "또한",
];

/// Tokens shorter than this (in chars, not bytes) are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

// Rust's \w is Unicode-aware and already covers Hangul; the explicit range
// keeps the intent readable.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s가-힣]").expect("non-word regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Lower-case, replace punctuation/symbols with spaces, collapse whitespace, trim.
pub fn preprocess(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");
    let collapsed = WHITESPACE.replace_all(&cleaned, " ");
    collapsed.trim().to_string()
}

/// Space-join comments, dropping empty entries.
pub fn join_texts<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenizer with an optional morphological analyzer.
///
/// The analyzer is fixed at construction; a tokenizer built without one uses
/// the naive path for its whole lifetime.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    analyzer: Option<Arc<dyn Morphology>>,
    stopwords: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::naive()
    }
}

impl Tokenizer {
    /// Whitespace tokenizer, no analyzer.
    pub fn naive() -> Self {
        Self {
            analyzer: None,
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_analyzer(analyzer: Arc<dyn Morphology>) -> Self {
        Self {
            analyzer: Some(analyzer),
            ..Self::naive()
        }
    }

    pub fn from_config(cfg: &TokenizerConfig) -> Self {
        let base = match cfg.analyzer {
            AnalyzerKind::Suffix => Self::with_analyzer(Arc::new(SuffixAnalyzer::new())),
            AnalyzerKind::None => Self::naive(),
        };
        base.with_extra_stopwords(cfg.extra_stopwords.iter().map(String::as_str))
    }

    pub fn with_extra_stopwords<'a, I>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for w in words {
            let w = w.trim();
            if !w.is_empty() {
                self.stopwords.insert(w.to_lowercase());
            }
        }
        self
    }

    pub fn has_analyzer(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Name of the active analyzer, or "whitespace" for the naive path.
    pub fn analyzer_name(&self) -> &'static str {
        self.analyzer.as_ref().map(|a| a.name()).unwrap_or("whitespace")
    }

    /// Content tokens in source order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = preprocess(text);
        if text.is_empty() {
            return Vec::new();
        }
        match &self.analyzer {
            Some(analyzer) => analyzer
                .analyze(&text)
                .into_iter()
                .filter(|m| m.tag.is_content())
                .map(|m| m.form)
                .filter(|t| self.keep(t))
                .collect(),
            None => self.split_naive(&text),
        }
    }

    /// Nouns only (NNG/NNP). Without an analyzer this is the naive split.
    pub fn extract_nouns(&self, text: &str) -> Vec<String> {
        let text = preprocess(text);
        if text.is_empty() {
            return Vec::new();
        }
        match &self.analyzer {
            Some(analyzer) => analyzer
                .analyze(&text)
                .into_iter()
                .filter(|m| m.tag.is_noun())
                .map(|m| m.form)
                .filter(|t| self.keep(t))
                .collect(),
            None => self.split_naive(&text),
        }
    }

    fn split_naive(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter(|t| self.keep(t))
            .map(str::to_string)
            .collect()
    }

    fn keep(&self, token: &str) -> bool {
        !self.stopwords.contains(token) && token.chars().count() >= MIN_TOKEN_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_cleans_and_collapses() {
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess("  Great JOB!!  팀원들과,   협업 "), "great job 팀원들과 협업");
        assert_eq!(preprocess("a\t\nb"), "a b");
    }

    #[test]
    fn join_drops_empty_entries() {
        assert_eq!(join_texts(&["a", "", "b"]), "a b");
        assert_eq!(join_texts::<&str>(&[]), "");
    }

    #[test]
    fn naive_filters_stopwords_and_short_tokens() {
        let t = Tokenizer::naive();
        let toks = t.tokenize("프로젝트 및 완료 a 더 협업");
        assert_eq!(toks, vec!["프로젝트", "완료", "협업"]);
    }

    #[test]
    fn length_is_counted_in_chars_not_bytes() {
        // "팀" is 3 bytes but 1 char: must be dropped.
        let t = Tokenizer::naive();
        assert!(t.tokenize("팀").is_empty());
        assert_eq!(t.tokenize("팀장"), vec!["팀장"]);
    }

    #[test]
    fn analyzer_path_keeps_content_morphemes_in_order() {
        let t = Tokenizer::with_analyzer(Arc::new(SuffixAnalyzer::new()));
        let toks = t.tokenize("프로젝트 완료에 크게 기여함");
        assert_eq!(toks, vec!["프로젝트", "완료", "기여"]);
    }

    #[test]
    fn analyzer_path_drops_non_content_morphemes() {
        let t = Tokenizer::with_analyzer(Arc::new(SuffixAnalyzer::new()));
        assert_eq!(t.tokenize("매우 성실"), vec!["성실"]);
    }

    #[test]
    fn extract_nouns_skips_verbs() {
        let t = Tokenizer::with_analyzer(Arc::new(SuffixAnalyzer::new()));
        let nouns = t.extract_nouns("목표를 이끌었다");
        assert_eq!(nouns, vec!["목표"]);
    }

    #[test]
    fn extra_stopwords_apply_on_both_paths() {
        let t = Tokenizer::naive().with_extra_stopwords(["협업"]);
        assert_eq!(t.tokenize("협업 성과"), vec!["성과"]);
    }

    #[test]
    fn deterministic() {
        let t = Tokenizer::with_analyzer(Arc::new(SuffixAnalyzer::new()));
        let text = "고객 응대가 친절하고 고객 만족도가 높음";
        assert_eq!(t.tokenize(text), t.tokenize(text));
    }
}
