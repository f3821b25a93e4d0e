//! Text complexity metrics.
//!
//! Shared between the scorer (which flags complex slides) and the
//! simplifier (which decides whether a rewrite is worth attempting and
//! whether it actually helped). All metrics are plain word statistics:
//! no dictionary, no syllable counting.

/// Words longer than this count as "complex"
pub const COMPLEX_WORD_LEN: usize = 6;

/// Average word length above which a block is flagged
pub const AVG_WORD_LEN_THRESHOLD: f64 = 6.8;

/// Complex-word ratio above which a block is flagged (with enough words)
pub const COMPLEX_RATIO_THRESHOLD: f64 = 0.3;

/// Word count above which a single unbroken block is flagged
pub const LONG_BLOCK_WORDS: usize = 35;

/// Minimum word count for the complex-ratio rule to apply
pub const RATIO_MIN_WORDS: usize = 15;

/// Word statistics for a block of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Number of whitespace-separated words
    pub word_count: usize,
    /// Mean word length in characters
    pub avg_word_length: f64,
    /// Fraction of words longer than [`COMPLEX_WORD_LEN`]
    pub complex_word_ratio: f64,
    /// Mean words per sentence (sentences split on runs of `.`, `!`, `?`)
    pub avg_sentence_length: f64,
    /// Number of line breaks in the block
    pub line_breaks: usize,
}

impl TextMetrics {
    /// Compute metrics for a block of text
    pub fn of(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();

        let (avg_word_length, complex_word_ratio) = if word_count == 0 {
            (0.0, 0.0)
        } else {
            let total_len: usize = words.iter().map(|w| w.chars().count()).sum();
            let complex = words
                .iter()
                .filter(|w| w.chars().count() > COMPLEX_WORD_LEN)
                .count();
            (
                total_len as f64 / word_count as f64,
                complex as f64 / word_count as f64,
            )
        };

        let sentences = sentence_count(text).max(1);
        let avg_sentence_length = word_count as f64 / sentences as f64;

        let line_breaks = text.matches('\n').count();

        Self {
            word_count,
            avg_word_length,
            complex_word_ratio,
            avg_sentence_length,
            line_breaks,
        }
    }

    /// Whether this block should be flagged as complex.
    ///
    /// A block is complex when any of:
    /// - average word length exceeds [`AVG_WORD_LEN_THRESHOLD`]
    /// - it runs past [`LONG_BLOCK_WORDS`] words without multiple line breaks
    /// - the complex-word ratio exceeds [`COMPLEX_RATIO_THRESHOLD`] and there
    ///   are at least [`RATIO_MIN_WORDS`] words
    pub fn is_complex(&self) -> bool {
        self.avg_word_length > AVG_WORD_LEN_THRESHOLD
            || (self.word_count > LONG_BLOCK_WORDS && self.line_breaks < 2)
            || (self.complex_word_ratio > COMPLEX_RATIO_THRESHOLD
                && self.word_count > RATIO_MIN_WORDS)
    }
}

/// Check whether a block of text is complex
pub fn is_complex(text: &str) -> bool {
    TextMetrics::of(text).is_complex()
}

/// Count sentences: non-empty segments between runs of `.`, `!`, `?`
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let m = TextMetrics::of("");
        assert_eq!(m.word_count, 0);
        assert_eq!(m.avg_word_length, 0.0);
        assert!(!m.is_complex());
    }

    #[test]
    fn test_simple_text_not_complex() {
        assert!(!is_complex("The cat sat on the mat."));
    }

    #[test]
    fn test_long_words_are_complex() {
        // Average word length well over 6.8
        assert!(is_complex(
            "Organizational prioritization methodology necessitates considerable deliberation."
        ));
    }

    #[test]
    fn test_long_block_without_breaks_is_complex() {
        let text = "word ".repeat(40);
        let m = TextMetrics::of(&text);
        assert!(m.word_count > LONG_BLOCK_WORDS);
        assert!(m.is_complex());
    }

    #[test]
    fn test_long_block_with_breaks_is_fine() {
        // Same word count, but broken into paragraphs
        let text = format!("{}\n\n{}", "word ".repeat(20), "word ".repeat(20));
        assert!(!is_complex(&text));
    }

    #[test]
    fn test_complex_ratio_rule() {
        // 6 of 17 words over 6 chars (ratio 0.35) but short average length
        let text = "utilizing utilizing utilizing utilizing utilizing utilizing \
                    to to to to to to to to to to to";
        let m = TextMetrics::of(text);
        assert_eq!(m.word_count, 17);
        assert!(m.complex_word_ratio > COMPLEX_RATIO_THRESHOLD);
        assert!(m.avg_word_length <= AVG_WORD_LEN_THRESHOLD);
        assert!(m.is_complex());
    }

    #[test]
    fn test_sentence_count() {
        assert_eq!(sentence_count("One. Two! Three?"), 3);
        assert_eq!(sentence_count("No terminator"), 1);
        assert_eq!(sentence_count("Trailing dots..."), 1);
        assert_eq!(sentence_count(""), 0);
    }

    #[test]
    fn test_avg_sentence_length() {
        let m = TextMetrics::of("One two three. Four five six.");
        assert_eq!(m.word_count, 6);
        assert!((m.avg_sentence_length - 3.0).abs() < f64::EPSILON);
    }
}
