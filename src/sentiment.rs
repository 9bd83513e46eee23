//! Sentiment gate: counts configured positive/negative words in the combined
//! comment text and votes. A negative verdict vetoes every recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Skip reason attached to a vetoed analysis.
pub const NEGATIVE_SKIP_REASON: &str = "부정적 평가가 많아 포상 추천 대상에서 제외되었습니다.";

pub const DEFAULT_POSITIVE_WORDS: &[&str] = &[
    "우수", "뛰어", "탁월", "훌륭", "기여", "성공", "완료", "달성", "협업", "적극", "성실",
    "모범", "향상", "칭찬", "신뢰", "주도", "혁신", "헌신", "책임감", "친절", "만족", "꼼꼼",
];

pub const DEFAULT_NEGATIVE_WORDS: &[&str] = &[
    "부족", "미흡", "실수", "지각", "결근", "불성실", "저조", "미달", "지연", "갈등", "불만",
    "소극", "태만", "부진", "무단", "누락", "불친절", "개선 필요",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    pub fn is_negative(self) -> bool {
        self == Sentiment::Negative
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count how many of `words` occur in `folded` (each word counts once).
/// Plain substring containment, not token-boundary aware.
fn count_present<W: AsRef<str>>(folded: &str, words: &[W]) -> usize {
    words
        .iter()
        .filter(|w| {
            let w = w.as_ref();
            !w.is_empty() && folded.contains(w)
        })
        .count()
}

fn vote(positive: usize, negative: usize) -> Sentiment {
    use std::cmp::Ordering;
    match positive.cmp(&negative) {
        Ordering::Greater => Sentiment::Positive,
        Ordering::Less => Sentiment::Negative,
        Ordering::Equal => Sentiment::Neutral,
    }
}

/// Stateless form of the gate: case-fold `text`, count word hits, vote.
pub fn analyze_sentiment<P, N>(text: &str, positive_words: &[P], negative_words: &[N]) -> Sentiment
where
    P: AsRef<str>,
    N: AsRef<str>,
{
    if text.is_empty() {
        return Sentiment::Neutral;
    }
    let folded = text.to_lowercase();
    vote(
        count_present(&folded, positive_words),
        count_present(&folded, negative_words),
    )
}

/// Configured word lists, case-folded once at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentimentLexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl SentimentLexicon {
    pub fn new<I, J, S, T>(positive: I, negative: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        fn fold<X: AsRef<str>>(it: impl IntoIterator<Item = X>) -> Vec<String> {
            it.into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }
        Self {
            positive: fold(positive),
            negative: fold(negative),
        }
    }

    pub fn korean_default() -> Self {
        Self::new(DEFAULT_POSITIVE_WORDS.iter(), DEFAULT_NEGATIVE_WORDS.iter())
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    /// `(positive_hits, negative_hits)` for diagnostics.
    pub fn counts(&self, text: &str) -> (usize, usize) {
        let folded = text.to_lowercase();
        (
            count_present(&folded, &self.positive),
            count_present(&folded, &self.negative),
        )
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        analyze_sentiment(text, &self.positive, &self.negative)
    }
}
