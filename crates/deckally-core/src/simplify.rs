//! Text simplification.
//!
//! Two paths produce candidate rewrites: a local heuristic
//! ([`basic_simplify`]) that swaps known complex words for plain ones and
//! breaks run-on sentences, and an external rewrite (whatever a describer
//! backend returns) post-processed by [`apply_external`]. Either way the
//! candidate only replaces the original when [`improvement_score`] clears
//! [`MIN_IMPROVEMENT`]; a rewrite that does not measurably reduce
//! complexity is discarded.

use crate::complexity::COMPLEX_WORD_LEN;
use regex::Regex;
use std::sync::OnceLock;

/// Minimum improvement score (percent) for a rewrite to be accepted
pub const MIN_IMPROVEMENT: u8 = 15;

/// Texts shorter than this (in chars) are never simplified
pub const MIN_TEXT_LEN: usize = 10;

/// An external rewrite longer than this fraction of the original is condensed
pub const MAX_GROWTH_FACTOR: f64 = 1.2;

/// Plain-word substitutions applied by the local simplifier.
///
/// Matched case-insensitively on whole words; the replacement keeps the
/// original word's leading capitalization.
const SYNONYMS: &[(&str, &str)] = &[
    ("utilize", "use"),
    ("utilizes", "uses"),
    ("utilizing", "using"),
    ("utilization", "use"),
    ("implementation", "setup"),
    ("implement", "set up"),
    ("facilitate", "help"),
    ("demonstrate", "show"),
    ("demonstrates", "shows"),
    ("approximately", "about"),
    ("additional", "more"),
    ("numerous", "many"),
    ("subsequently", "then"),
    ("consequently", "so"),
    ("methodology", "method"),
    ("functionality", "features"),
    ("prioritize", "rank"),
    ("leverage", "use"),
    ("commence", "start"),
    ("terminate", "end"),
    ("endeavor", "try"),
    ("ascertain", "find out"),
    ("sufficient", "enough"),
    ("fundamental", "basic"),
];

/// Filler phrases removed when condensing an overgrown rewrite
const REDUNDANT_PHRASES: &[&str] = &[
    "it is important to note that",
    "it should be noted that",
    "it is worth mentioning that",
    "as you can see",
    "as shown above",
];

/// Connectors a run-on sentence can be split at
const SPLIT_POINTS: &[&str] = &[", and ", ", but ", "; "];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn redundant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = REDUNDANT_PHRASES
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i)(?:{})", alternation)).unwrap()
    })
}

/// Outcome of a simplification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Simplification {
    /// The rewrite cleared the gate; the new text should replace the original
    Applied { text: String, improvement: u8 },
    /// No rewrite was attempted or the candidate did not help enough
    Unchanged,
}

impl Simplification {
    /// The accepted text, if any
    pub fn applied_text(&self) -> Option<&str> {
        match self {
            Simplification::Applied { text, .. } => Some(text),
            Simplification::Unchanged => None,
        }
    }
}

/// Local heuristic rewrite: synonym substitution plus sentence splitting.
///
/// Deterministic and always safe to call; gating against the original is the
/// caller's job (see [`simplify`]).
pub fn basic_simplify(text: &str) -> String {
    let mut out = replace_synonyms(text);
    out = split_long_sentences(&out);
    out
}

/// Attempt a local simplification, applying the improvement gate
pub fn simplify(text: &str) -> Simplification {
    if text.trim().chars().count() < MIN_TEXT_LEN {
        return Simplification::Unchanged;
    }
    let candidate = basic_simplify(text);
    gate(text, candidate)
}

/// Post-process and gate an externally produced rewrite.
///
/// The external text is trimmed, condensed if it grew past
/// [`MAX_GROWTH_FACTOR`] times the original, and then held to the same
/// improvement gate as the local path.
pub fn apply_external(original: &str, external: &str) -> Simplification {
    let mut candidate = external.trim().to_string();
    if candidate.is_empty() {
        return Simplification::Unchanged;
    }
    if candidate.chars().count() as f64 > original.chars().count() as f64 * MAX_GROWTH_FACTOR {
        candidate = condense(&candidate);
    }
    gate(original, candidate)
}

fn gate(original: &str, candidate: String) -> Simplification {
    if candidate == original {
        return Simplification::Unchanged;
    }
    let improvement = improvement_score(original, &candidate);
    if improvement >= MIN_IMPROVEMENT {
        Simplification::Applied {
            text: candidate,
            improvement,
        }
    } else {
        log::debug!(
            "discarding rewrite with improvement {}% (< {}%)",
            improvement,
            MIN_IMPROVEMENT
        );
        Simplification::Unchanged
    }
}

/// Strip filler phrases and collapse whitespace
pub fn condense(text: &str) -> String {
    let stripped = redundant_re().replace_all(text, "");
    whitespace_re().replace_all(&stripped, " ").trim().to_string()
}

/// Percentage improvement of `simplified` over `original`, in [0, 100].
///
/// Weighted blend of three reductions, average word length (0.3), complex
/// word ratio (0.4), and average sentence length (0.3), minus a penalty when
/// the rewrite grew more than 10% in characters.
pub fn improvement_score(original: &str, simplified: &str) -> u8 {
    let orig_words: Vec<&str> = original.split_whitespace().collect();
    let simp_words: Vec<&str> = simplified.split_whitespace().collect();
    if orig_words.is_empty() || simp_words.is_empty() {
        return 0;
    }

    let avg_len = |words: &[&str]| {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
    };
    let complex_ratio = |words: &[&str]| {
        words
            .iter()
            .filter(|w| w.chars().count() > COMPLEX_WORD_LEN)
            .count() as f64
            / words.len() as f64
    };
    let sentence_count = |text: &str| {
        text.split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count()
            .max(1)
    };

    let orig_avg_word = avg_len(&orig_words);
    let simp_avg_word = avg_len(&simp_words);
    let orig_ratio = complex_ratio(&orig_words);
    let simp_ratio = complex_ratio(&simp_words);
    let orig_sent_len = orig_words.len() as f64 / sentence_count(original) as f64;
    let simp_sent_len = simp_words.len() as f64 / sentence_count(simplified) as f64;

    let word_len_improvement = ((orig_avg_word - simp_avg_word) / orig_avg_word * 100.0).max(0.0);
    let ratio_improvement = ((orig_ratio - simp_ratio) / orig_ratio.max(0.01) * 100.0).max(0.0);
    let sent_len_improvement =
        ((orig_sent_len - simp_sent_len) / orig_sent_len * 100.0).max(0.0);

    let overall = word_len_improvement * 0.3 + ratio_improvement * 0.4 + sent_len_improvement * 0.3;

    let orig_len = original.chars().count() as f64;
    let simp_len = simplified.chars().count() as f64;
    let length_penalty = ((simp_len - orig_len * 1.1) / (orig_len * 0.1) * 20.0).max(0.0);

    (overall - length_penalty).clamp(0.0, 100.0) as u8
}

fn replace_synonyms(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word = String::new();

    let flush = |word: &mut String, result: &mut String| {
        if word.is_empty() {
            return;
        }
        result.push_str(&substitute(word));
        word.clear();
    };

    for ch in text.chars() {
        if ch.is_alphabetic() {
            word.push(ch);
        } else {
            flush(&mut word, &mut result);
            result.push(ch);
        }
    }
    flush(&mut word, &mut result);
    result
}

/// Replace a single word if it has a known plain synonym, preserving the
/// original leading capitalization
fn substitute(word: &str) -> String {
    let lower = word.to_lowercase();
    for (complex, plain) in SYNONYMS {
        if lower == *complex {
            let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());
            if capitalized {
                let mut chars = plain.chars();
                return match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                };
            }
            return plain.to_string();
        }
    }
    word.to_string()
}

/// Break run-on sentences at soft connectors.
///
/// Only sentences over 15 words are touched, and each split point is used at
/// most once per sentence to avoid producing choppy fragments.
fn split_long_sentences(text: &str) -> String {
    text.split_inclusive(['.', '!', '?'])
        .map(|sentence| {
            if sentence.split_whitespace().count() <= 15 {
                return sentence.to_string();
            }
            for connector in SPLIT_POINTS {
                if let Some(pos) = sentence.find(connector) {
                    let (head, tail) = sentence.split_at(pos);
                    let tail = &tail[connector.len()..];
                    let mut rest = tail.trim_start().to_string();
                    if let Some(first) = rest.chars().next() {
                        if first.is_lowercase() {
                            let upper: String = first.to_uppercase().collect();
                            rest.replace_range(..first.len_utf8(), &upper);
                        }
                    }
                    return format!("{}. {}", head.trim_end(), rest);
                }
            }
            sentence.to_string()
        })
        .collect()
}
