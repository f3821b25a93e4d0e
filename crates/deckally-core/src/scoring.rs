//! Accessibility scoring heuristics.
//!
//! Four independent, stateless scorers (alt text, font size, contrast,
//! text complexity), each taking a flat sample collection and returning a
//! clamped [0, 100] score plus the issues behind it. [`score_all`] combines
//! them into a [`ScoreReport`].
//!
//! The scorers take lightweight sample structs rather than document-model
//! units so this crate stays free of any OOXML dependency; the extraction
//! layer maps its units down to samples.

use crate::complexity::TextMetrics;
use crate::contrast::{contrast_ratio, required_ratio, Rgb};
use crate::report::{Category, CategoryScores, Issue, IssueSet, ScoreReport};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum readable font size in points
pub const MIN_FONT_SIZE_PT: f32 = 18.0;

/// Alt text shorter than this (in chars) is flagged as brief
pub const BRIEF_ALT_TEXT_LEN: usize = 10;

/// Stricter alt-text length bar (in chars) for the only image on a slide
pub const SINGLE_IMAGE_ALT_TEXT_LEN: usize = 25;

/// Marker phrase found in auto-generated placeholder alt text
pub const GENERIC_ALT_MARKER: &str = "automatically generated";

/// Prefix used by captions this tool inserts; such shapes are not scored.
/// Matches both the bare form ("Image Description: ...") and the
/// slide-numbered form ("Image Description (slide 3): ...").
pub const CAPTION_PREFIX: &str = "Image Description";

/// Text content of one shape, as seen by the scorers
#[derive(Debug, Clone, PartialEq)]
pub struct TextSample {
    /// Zero-based slide index
    pub slide_index: usize,
    /// Concatenated run text of the shape
    pub text: String,
    /// Minimum declared run size in points, if any run declares one
    pub font_size_pt: Option<f32>,
}

/// One image, as seen by the alt-text scorer
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSample {
    /// Zero-based slide index
    pub slide_index: usize,
    /// Alt text as extracted (may be empty)
    pub alt_text: String,
}

/// A sampled text/background color pair for real contrast checking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastSample {
    pub slide_index: usize,
    pub foreground: Rgb,
    pub background: Rgb,
    pub font_size_pt: Option<f32>,
    pub bold: bool,
}

/// Score plus supporting issues for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryResult {
    pub score: u8,
    pub issues: Vec<Issue>,
}

impl CategoryResult {
    fn perfect() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
        }
    }
}

/// How one image's alt text classifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltTextQuality {
    /// Empty or whitespace only
    Missing,
    /// Contains a known auto-generated placeholder phrase
    Generic,
    /// Non-empty but under the length threshold
    Brief,
    /// Good enough
    Acceptable,
}

/// Classify a single alt text string
pub fn classify_alt_text(alt: &str) -> AltTextQuality {
    let trimmed = alt.trim();
    if trimmed.is_empty() {
        AltTextQuality::Missing
    } else if trimmed.to_lowercase().contains(GENERIC_ALT_MARKER) {
        AltTextQuality::Generic
    } else if trimmed.chars().count() < BRIEF_ALT_TEXT_LEN {
        AltTextQuality::Brief
    } else {
        AltTextQuality::Acceptable
    }
}

/// Whether a text shape is a caption, footnote, or other generated
/// annotation that should be excluded from font-size and complexity scoring
pub fn is_caption_or_footnote(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('*')
        || trimmed.starts_with("Source:")
        || trimmed.starts_with(CAPTION_PREFIX)
}

/// Score alt-text coverage.
///
/// Score is the fraction of images with acceptable alt text. Brief and
/// generic alt text count against the score only by not being acceptable;
/// they are surfaced as issues either way. Slides with exactly one image get
/// a stricter length bar, since that image presumably carries the slide.
pub fn score_alt_text(images: &[ImageSample]) -> CategoryResult {
    if images.is_empty() {
        return CategoryResult::perfect();
    }

    let mut per_slide: BTreeMap<usize, usize> = BTreeMap::new();
    for img in images {
        *per_slide.entry(img.slide_index).or_insert(0) += 1;
    }

    let mut acceptable = 0usize;
    let mut issues = Vec::new();

    for img in images {
        let quality = classify_alt_text(&img.alt_text);
        match quality {
            AltTextQuality::Missing => {
                issues.push(Issue::new(img.slide_index, "Missing alt text"));
            }
            AltTextQuality::Generic => {
                issues.push(
                    Issue::new(img.slide_index, "Alt text is an auto-generated placeholder")
                        .with_detail(img.alt_text.trim().to_string()),
                );
            }
            AltTextQuality::Brief => {
                issues.push(
                    Issue::new(img.slide_index, "Alt text too short")
                        .with_detail(img.alt_text.trim().to_string()),
                );
            }
            AltTextQuality::Acceptable => acceptable += 1,
        }

        // Single-image slides: the image is presumably central, so even
        // alt text that passes the general bar gets a stricter check.
        if per_slide[&img.slide_index] == 1
            && quality != AltTextQuality::Missing
            && quality != AltTextQuality::Generic
            && img.alt_text.trim().chars().count() < SINGLE_IMAGE_ALT_TEXT_LEN
        {
            issues.push(
                Issue::new(img.slide_index, "Brief alt text on a single-image slide")
                    .with_detail(img.alt_text.trim().to_string()),
            );
        }
    }

    let score = ((acceptable as f64 / images.len() as f64) * 100.0).round() as u8;
    CategoryResult { score, issues }
}

/// Score font sizes against the 18pt readability threshold.
///
/// Empty shapes, captions/footnotes, and shapes with no detectable size are
/// excluded from the denominator.
pub fn score_font_size(texts: &[TextSample]) -> CategoryResult {
    let mut eligible = 0usize;
    let mut ok = 0usize;
    let mut issues = Vec::new();

    for sample in texts {
        if sample.text.trim().is_empty() || is_caption_or_footnote(&sample.text) {
            continue;
        }
        let Some(size) = sample.font_size_pt else {
            // Cannot judge a shape that never declares a size
            continue;
        };
        eligible += 1;
        if size >= MIN_FONT_SIZE_PT {
            ok += 1;
        } else {
            issues.push(
                Issue::new(
                    sample.slide_index,
                    format!("Font size {}pt is below {}pt", size, MIN_FONT_SIZE_PT),
                )
                .with_detail(excerpt(&sample.text)),
            );
        }
    }

    if eligible == 0 {
        return CategoryResult::perfect();
    }
    let score = ((ok as f64 / eligible as f64) * 100.0).round() as u8;
    CategoryResult { score, issues }
}

/// Score contrast.
///
/// Without background sampling there is nothing real to measure, so a fixed
/// passing-but-not-perfect score of 80 is reported. With samples, each pair
/// failing its WCAG threshold costs 20 points.
pub fn score_contrast(samples: Option<&[ContrastSample]>) -> CategoryResult {
    let Some(samples) = samples else {
        return CategoryResult {
            score: 80,
            issues: Vec::new(),
        };
    };

    let mut issues = Vec::new();
    for sample in samples {
        let ratio = contrast_ratio(sample.foreground, sample.background);
        let required = required_ratio(sample.font_size_pt, sample.bold);
        if ratio < required {
            issues.push(
                Issue::new(
                    sample.slide_index,
                    format!(
                        "Contrast ratio {:.2}:1 is below the required {}:1",
                        ratio, required
                    ),
                )
                .with_detail(format!(
                    "#{} on #{}",
                    sample.foreground.to_hex(),
                    sample.background.to_hex()
                )),
            );
        }
    }

    let score = (100i64 - 20 * issues.len() as i64).clamp(0, 100) as u8;
    CategoryResult { score, issues }
}

/// Score text complexity per slide.
///
/// A slide is penalized when any of its text shapes is flagged complex; the
/// score is the fraction of slides (with eligible text) that stay clean.
pub fn score_text_complexity(texts: &[TextSample]) -> CategoryResult {
    let mut slides_with_text: BTreeSet<usize> = BTreeSet::new();
    let mut complex_slides: BTreeSet<usize> = BTreeSet::new();
    let mut issues = Vec::new();

    for sample in texts {
        if sample.text.trim().is_empty() || is_caption_or_footnote(&sample.text) {
            continue;
        }
        slides_with_text.insert(sample.slide_index);

        let metrics = TextMetrics::of(&sample.text);
        if metrics.is_complex() {
            complex_slides.insert(sample.slide_index);
            issues.push(
                Issue::new(sample.slide_index, "Text is too complex").with_detail(format!(
                    "{} words, avg word length {:.1}, {:.0}% complex words",
                    metrics.word_count,
                    metrics.avg_word_length,
                    metrics.complex_word_ratio * 100.0
                )),
            );
        }
    }

    if slides_with_text.is_empty() {
        return CategoryResult::perfect();
    }
    let clean = slides_with_text.len() - complex_slides.len();
    let score = ((clean as f64 / slides_with_text.len() as f64) * 100.0).round() as u8;
    CategoryResult { score, issues }
}

/// Run all four scorers and assemble a [`ScoreReport`]
pub fn score_all(
    texts: &[TextSample],
    images: &[ImageSample],
    contrast_samples: Option<&[ContrastSample]>,
) -> ScoreReport {
    let alt = score_alt_text(images);
    let font = score_font_size(texts);
    let contrast = score_contrast(contrast_samples);
    let complexity = score_text_complexity(texts);

    let mut scores = CategoryScores::default();
    scores.set(Category::AltText, alt.score);
    scores.set(Category::FontSize, font.score);
    scores.set(Category::Contrast, contrast.score);
    scores.set(Category::TextComplexity, complexity.score);

    let issues = IssueSet {
        alt_text: alt.issues,
        font_size: font.issues,
        contrast: contrast.issues,
        text_complexity: complexity.issues,
    };

    ScoreReport::new(scores, issues)
}

/// First ~60 chars of a text block, for issue detail
fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= 60 {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(60).collect();
        format!("{}...", cut)
    }
}
