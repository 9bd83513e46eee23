//! Frequency-ranked keyword extraction over the shared tokenizer.

use std::collections::HashMap;

use crate::text::Tokenizer;

pub const DEFAULT_TOP_N: usize = 10;

/// Top `top_n` tokens of `text` by frequency; ties keep first-seen order.
pub fn extract_keywords(tokenizer: &Tokenizer, text: &str, top_n: usize) -> Vec<String> {
    if text.is_empty() || top_n == 0 {
        return Vec::new();
    }
    let tokens = tokenizer.tokenize(text);
    rank_by_frequency(&tokens, top_n)
}

/// Rank distinct tokens by descending count. The sort is stable over
/// first-occurrence order, so equal counts keep the order they appeared in.
pub fn rank_by_frequency(tokens: &[String], top_n: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for t in tokens {
        let c = counts.entry(t.as_str()).or_insert(0);
        if *c == 0 {
            order.push(t.as_str());
        }
        *c += 1;
    }

    order.sort_by_key(|t| std::cmp::Reverse(counts.get(t).copied().unwrap_or(0)));
    order.into_iter().take(top_n).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract_keywords(&Tokenizer::naive(), "", 10).is_empty());
        assert!(extract_keywords(&Tokenizer::naive(), "! ? .", 10).is_empty());
    }

    #[test]
    fn ranks_by_count_then_first_seen() {
        let ranked = rank_by_frequency(&toks(&["협업", "성과", "고객", "성과", "고객", "리더"]), 10);
        assert_eq!(ranked, vec!["성과", "고객", "협업", "리더"]);
    }

    #[test]
    fn respects_top_n() {
        let t = Tokenizer::naive();
        let text = "가나 다라 마바 사아 자차 카타 파하";
        assert_eq!(extract_keywords(&t, text, 3), vec!["가나", "다라", "마바"]);
        assert!(extract_keywords(&t, text, 0).is_empty());
    }
}
