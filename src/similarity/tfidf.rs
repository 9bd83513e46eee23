//! TF-IDF vectorizer over pre-tokenized documents.
//!
//! Stateless: every call fits a fresh vocabulary on the documents it is
//! given and transforms the same documents. Weighting:
//! - TF: raw n-gram counts
//! - IDF: smoothed, `ln((1 + n) / (1 + df)) + 1`
//! - rows L2-normalized
//!
//! Vocabulary pruning happens in order: `min_df` / `max_df` by document
//! frequency, then `max_features` by corpus term frequency.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::SimilarityError;
use crate::text::Tokenizer;

fn default_max_features() -> Option<usize> {
    Some(1000)
}
fn default_min_df() -> usize {
    1
}
fn default_max_df() -> f64 {
    1.0
}
fn default_ngram_min() -> usize {
    1
}
fn default_ngram_max() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Keep at most this many terms (highest corpus frequency first).
    #[serde(default = "default_max_features")]
    pub max_features: Option<usize>,
    /// Drop terms found in fewer documents than this.
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    /// Drop terms found in more than this fraction of documents.
    #[serde(default = "default_max_df")]
    pub max_df: f64,
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            min_df: default_min_df(),
            max_df: default_max_df(),
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
        }
    }
}

impl TfidfParams {
    pub fn sanitize(&mut self) {
        if self.min_df == 0 {
            self.min_df = 1;
        }
        if !self.max_df.is_finite() || self.max_df <= 0.0 || self.max_df > 1.0 {
            self.max_df = 1.0;
        }
        if self.ngram_min == 0 {
            self.ngram_min = 1;
        }
        if self.ngram_max < self.ngram_min {
            self.ngram_max = self.ngram_min;
        }
        if self.max_features == Some(0) {
            self.max_features = None;
        }
    }
}

/// Space-joined n-grams of `tokens` for every n in `min..=max`, in order.
pub fn ngrams(tokens: &[String], min: usize, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in min.max(1)..=max {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    params: TfidfParams,
}

impl TfidfVectorizer {
    pub fn new(params: TfidfParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TfidfParams {
        &self.params
    }

    /// Fit on `docs` and return one L2-normalized row per document, in the
    /// column order of the fitted vocabulary.
    pub fn fit_transform(&self, docs: &[Vec<String>]) -> Result<Vec<Vec<f64>>, SimilarityError> {
        let p = &self.params;
        let counts: Vec<HashMap<String, usize>> = docs
            .iter()
            .map(|tokens| {
                let mut m = HashMap::new();
                for g in ngrams(tokens, p.ngram_min, p.ngram_max) {
                    *m.entry(g).or_insert(0) += 1;
                }
                m
            })
            .collect();

        // term -> (document frequency, corpus frequency); BTreeMap for a
        // stable column order.
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for doc in &counts {
            for (term, &c) in doc {
                let e = stats.entry(term.as_str()).or_insert((0, 0));
                e.0 += 1;
                e.1 += c;
            }
        }
        if stats.is_empty() {
            return Err(SimilarityError::EmptyVocabulary);
        }

        let n_docs = docs.len();
        let max_doc_count = p.max_df * n_docs as f64;
        let mut vocab: Vec<(&str, usize, usize)> = stats
            .into_iter()
            .filter(|(_, (df, _))| *df >= p.min_df && (*df as f64) <= max_doc_count)
            .map(|(t, (df, tf))| (t, df, tf))
            .collect();
        if vocab.is_empty() {
            return Err(SimilarityError::AllTermsPruned {
                min_df: p.min_df,
                max_df: p.max_df,
            });
        }

        if let Some(limit) = p.max_features {
            if vocab.len() > limit {
                vocab.sort_by_key(|&(_, _, tf)| std::cmp::Reverse(tf));
                vocab.truncate(limit);
                vocab.sort_by(|a, b| a.0.cmp(b.0));
            }
        }

        let n = n_docs as f64;
        let idf: Vec<f64> = vocab
            .iter()
            .map(|&(_, df, _)| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                let mut row: Vec<f64> = vocab
                    .iter()
                    .zip(&idf)
                    .map(|(&(term, _, _), &w)| doc.get(term).copied().unwrap_or(0) as f64 * w)
                    .collect();
                l2_normalize(&mut row);
                row
            })
            .collect();
        Ok(rows)
    }
}

/// Cosine of TF-IDF vectors fitted on the two texts alone, in [0, 1].
#[derive(Debug, Clone)]
pub struct LexicalSimilarity {
    tokenizer: Tokenizer,
    vectorizer: TfidfVectorizer,
}

impl LexicalSimilarity {
    pub fn new(tokenizer: Tokenizer, params: TfidfParams) -> Self {
        Self {
            tokenizer,
            vectorizer: TfidfVectorizer::new(params),
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn score(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        let docs = [self.tokenizer.tokenize(a), self.tokenizer.tokenize(b)];
        let rows = self.vectorizer.fit_transform(&docs)?;
        Ok(super::cosine_similarity(&rows[0], &rows[1]))
    }
}

fn l2_normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
