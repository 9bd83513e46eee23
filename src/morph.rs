// src/morph.rs
//! Morphological analysis seam for the tokenizer.
//!
//! The tokenizer treats an analyzer as an optional capability chosen once at
//! start-up. `SuffixAnalyzer` is the built-in implementation: it needs no
//! dictionary and splits each eojeol into a stem plus a trailing particle or
//! ending using fixed suffix tables. It is shallow; anything
//! smarter can be plugged in through the `Morphology` trait.

use once_cell::sync::Lazy;
use std::fmt;

/// Part-of-speech tags, named after the Sejong tag set where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    /// NNG: common noun
    CommonNoun,
    /// NNP: proper noun
    ProperNoun,
    /// VV: verb
    Verb,
    /// VA: adjective
    Adjective,
    /// XR: root
    Root,
    /// MAG: adverb
    Adverb,
    /// J*: particle
    Particle,
    /// E*: verbal ending
    Ending,
    /// XS*: derivational suffix
    Suffix,
    /// SL: Latin letters
    Foreign,
    /// SN: digits
    Number,
}

impl PosTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PosTag::CommonNoun => "NNG",
            PosTag::ProperNoun => "NNP",
            PosTag::Verb => "VV",
            PosTag::Adjective => "VA",
            PosTag::Root => "XR",
            PosTag::Adverb => "MAG",
            PosTag::Particle => "J",
            PosTag::Ending => "E",
            PosTag::Suffix => "XS",
            PosTag::Foreign => "SL",
            PosTag::Number => "SN",
        }
    }

    /// Allow-list used by the tokenizer: nouns, verbs, adjectives and roots.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            PosTag::CommonNoun
                | PosTag::ProperNoun
                | PosTag::Verb
                | PosTag::Adjective
                | PosTag::Root
        )
    }

    pub fn is_noun(self) -> bool {
        matches!(self, PosTag::CommonNoun | PosTag::ProperNoun)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analyzed unit in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    pub form: String,
    pub tag: PosTag,
}

impl Morpheme {
    fn new(form: &str, tag: PosTag) -> Self {
        Self {
            form: form.to_string(),
            tag,
        }
    }
}

/// A morphological analyzer. Implementations must be read-only after
/// construction so one instance can serve concurrent requests.
pub trait Morphology: Send + Sync + fmt::Debug {
    /// Analyze already-normalized text into morphemes, in source order.
    fn analyze(&self, text: &str) -> Vec<Morpheme>;

    /// Short name for logs and health output.
    fn name(&self) -> &'static str;
}

/// (suffix, tag of the stem in front of it, tag of the suffix itself)
type SuffixRule = (&'static str, PosTag, PosTag);

const SUFFIX_RULES: &[SuffixRule] = &[
    // noun + 하다/되다 derivations
    ("하였습니다", PosTag::CommonNoun, PosTag::Suffix),
    ("했습니다", PosTag::CommonNoun, PosTag::Suffix),
    ("합니다", PosTag::CommonNoun, PosTag::Suffix),
    ("하였음", PosTag::CommonNoun, PosTag::Suffix),
    ("하였다", PosTag::CommonNoun, PosTag::Suffix),
    ("했음", PosTag::CommonNoun, PosTag::Suffix),
    ("했다", PosTag::CommonNoun, PosTag::Suffix),
    ("하다", PosTag::CommonNoun, PosTag::Suffix),
    ("하고", PosTag::CommonNoun, PosTag::Suffix),
    ("하며", PosTag::CommonNoun, PosTag::Suffix),
    ("하여", PosTag::CommonNoun, PosTag::Suffix),
    ("해서", PosTag::CommonNoun, PosTag::Suffix),
    ("한다", PosTag::CommonNoun, PosTag::Suffix),
    ("하는", PosTag::CommonNoun, PosTag::Suffix),
    ("함", PosTag::CommonNoun, PosTag::Suffix),
    ("되었음", PosTag::CommonNoun, PosTag::Suffix),
    ("되었다", PosTag::CommonNoun, PosTag::Suffix),
    ("된다", PosTag::CommonNoun, PosTag::Suffix),
    ("되어", PosTag::CommonNoun, PosTag::Suffix),
    ("되는", PosTag::CommonNoun, PosTag::Suffix),
    ("됨", PosTag::CommonNoun, PosTag::Suffix),
    ("시킴", PosTag::CommonNoun, PosTag::Suffix),
    ("적으로", PosTag::CommonNoun, PosTag::Suffix),
    ("적인", PosTag::CommonNoun, PosTag::Suffix),
    // root + adjective/adverb derivations
    ("스러운", PosTag::Root, PosTag::Suffix),
    ("스럽게", PosTag::Root, PosTag::Suffix),
    ("스러움", PosTag::Root, PosTag::Suffix),
    ("로운", PosTag::Root, PosTag::Suffix),
    ("롭게", PosTag::Root, PosTag::Suffix),
    ("하게", PosTag::Root, PosTag::Suffix),
    ("하지", PosTag::Root, PosTag::Suffix),
    ("히", PosTag::Root, PosTag::Suffix),
    // verb/adjective stems + endings
    ("었습니다", PosTag::Verb, PosTag::Ending),
    ("았습니다", PosTag::Verb, PosTag::Ending),
    ("었음", PosTag::Verb, PosTag::Ending),
    ("았음", PosTag::Verb, PosTag::Ending),
    ("었다", PosTag::Verb, PosTag::Ending),
    ("았다", PosTag::Verb, PosTag::Ending),
    ("어서", PosTag::Verb, PosTag::Ending),
    ("으며", PosTag::Verb, PosTag::Ending),
    ("게", PosTag::Adjective, PosTag::Ending),
    // particles
    ("에게서", PosTag::CommonNoun, PosTag::Particle),
    ("에서는", PosTag::CommonNoun, PosTag::Particle),
    ("들에게", PosTag::CommonNoun, PosTag::Particle),
    ("으로써", PosTag::CommonNoun, PosTag::Particle),
    ("으로서", PosTag::CommonNoun, PosTag::Particle),
    ("으로", PosTag::CommonNoun, PosTag::Particle),
    ("에서", PosTag::CommonNoun, PosTag::Particle),
    ("에게", PosTag::CommonNoun, PosTag::Particle),
    ("까지", PosTag::CommonNoun, PosTag::Particle),
    ("부터", PosTag::CommonNoun, PosTag::Particle),
    ("처럼", PosTag::CommonNoun, PosTag::Particle),
    ("보다", PosTag::CommonNoun, PosTag::Particle),
    ("과의", PosTag::CommonNoun, PosTag::Particle),
    ("와의", PosTag::CommonNoun, PosTag::Particle),
    ("들과", PosTag::CommonNoun, PosTag::Particle),
    ("들이", PosTag::CommonNoun, PosTag::Particle),
    ("들은", PosTag::CommonNoun, PosTag::Particle),
    ("들을", PosTag::CommonNoun, PosTag::Particle),
    ("들의", PosTag::CommonNoun, PosTag::Particle),
    ("과", PosTag::CommonNoun, PosTag::Particle),
    ("와", PosTag::CommonNoun, PosTag::Particle),
    ("을", PosTag::CommonNoun, PosTag::Particle),
    ("를", PosTag::CommonNoun, PosTag::Particle),
    ("이", PosTag::CommonNoun, PosTag::Particle),
    ("가", PosTag::CommonNoun, PosTag::Particle),
    ("은", PosTag::CommonNoun, PosTag::Particle),
    ("는", PosTag::CommonNoun, PosTag::Particle),
    ("의", PosTag::CommonNoun, PosTag::Particle),
    ("에", PosTag::CommonNoun, PosTag::Particle),
    ("로", PosTag::CommonNoun, PosTag::Particle),
    ("도", PosTag::CommonNoun, PosTag::Particle),
    ("만", PosTag::CommonNoun, PosTag::Particle),
    ("께", PosTag::CommonNoun, PosTag::Particle),
];

const ADVERBS: &[&str] = &[
    "매우", "아주", "정말", "너무", "항상", "언제나", "특히", "더욱", "많이", "조금", "다소",
    "자주", "가장", "훨씬", "크게", "잘", "늘", "또", "다시",
];

/// Rules ordered longest suffix first so "에서" wins over "서".
static RULES_BY_LENGTH: Lazy<Vec<SuffixRule>> = Lazy::new(|| {
    let mut rules = SUFFIX_RULES.to_vec();
    rules.sort_by_key(|(suffix, _, _)| std::cmp::Reverse(suffix.chars().count()));
    rules
});

fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Dictionary-free Korean analyzer based on suffix stripping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixAnalyzer;

impl SuffixAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn analyze_eojeol(&self, word: &str, out: &mut Vec<Morpheme>) {
        if !word.chars().any(is_hangul) {
            let tag = if word.chars().all(|c| c.is_ascii_digit()) {
                PosTag::Number
            } else {
                PosTag::Foreign
            };
            out.push(Morpheme::new(word, tag));
            return;
        }

        if ADVERBS.contains(&word) {
            out.push(Morpheme::new(word, PosTag::Adverb));
            return;
        }

        let word_len = word.chars().count();
        for (suffix, stem_tag, suffix_tag) in RULES_BY_LENGTH.iter() {
            if word_len > suffix.chars().count() {
                if let Some(stem) = word.strip_suffix(suffix) {
                    out.push(Morpheme::new(stem, *stem_tag));
                    out.push(Morpheme::new(suffix, *suffix_tag));
                    return;
                }
            }
        }

        out.push(Morpheme::new(word, PosTag::CommonNoun));
    }
}

impl Morphology for SuffixAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Morpheme> {
        let mut out = Vec::new();
        for word in text.split_whitespace() {
            self.analyze_eojeol(word, &mut out);
        }
        out
    }

    fn name(&self) -> &'static str {
        "suffix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(text: &str) -> Vec<(String, PosTag)> {
        SuffixAnalyzer::new()
            .analyze(text)
            .into_iter()
            .map(|m| (m.form, m.tag))
            .collect()
    }

    #[test]
    fn strips_particles_and_derivations() {
        let got = forms("완료에 기여함 팀원들과");
        assert_eq!(
            got,
            vec![
                ("완료".to_string(), PosTag::CommonNoun),
                ("에".to_string(), PosTag::Particle),
                ("기여".to_string(), PosTag::CommonNoun),
                ("함".to_string(), PosTag::Suffix),
                ("팀원".to_string(), PosTag::CommonNoun),
                ("들과".to_string(), PosTag::Particle),
            ]
        );
    }

    #[test]
    fn longest_suffix_wins() {
        let got = forms("회의에서");
        assert_eq!(got[0], ("회의".to_string(), PosTag::CommonNoun));
        assert_eq!(got[1], ("에서".to_string(), PosTag::Particle));
    }

    #[test]
    fn never_strips_the_whole_word() {
        // "이" alone is both a suffix and the full word.
        let got = forms("이");
        assert_eq!(got, vec![("이".to_string(), PosTag::CommonNoun)]);
    }

    #[test]
    fn latin_digits_and_adverbs_are_not_content() {
        let got = forms("mvp 2024 매우");
        assert_eq!(got[0].1, PosTag::Foreign);
        assert_eq!(got[1].1, PosTag::Number);
        assert_eq!(got[2].1, PosTag::Adverb);
        assert!(got.iter().all(|(_, t)| !t.is_content()));
    }
}
