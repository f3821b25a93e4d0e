//! Accessibility score reports.
//!
//! A [`ScoreReport`] is the structured result handed to whatever surface
//! displays it (CLI, web UI). The core only produces the structure; rendering
//! is the caller's concern.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AltText,
    FontSize,
    Contrast,
    TextComplexity,
}

impl Category {
    /// All categories, in report order
    pub const ALL: [Category; 4] = [
        Category::AltText,
        Category::FontSize,
        Category::Contrast,
        Category::TextComplexity,
    ];

    /// Weight of this category in the overall score
    pub fn weight(self) -> f64 {
        match self {
            Category::AltText => 0.35,
            Category::FontSize => 0.25,
            Category::Contrast => 0.20,
            Category::TextComplexity => 0.20,
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Category::AltText => "Alt Text",
            Category::FontSize => "Font Size",
            Category::Contrast => "Contrast",
            Category::TextComplexity => "Text Complexity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single accessibility issue tied to a slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Zero-based slide index
    pub slide_index: usize,
    /// Short description of the problem
    pub message: String,
    /// Optional supporting detail (measured value, offending text excerpt)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Issue {
    /// Create an issue without detail
    pub fn new(slide_index: usize, message: impl Into<String>) -> Self {
        Self {
            slide_index,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach supporting detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Per-category scores, each clamped to [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub alt_text: u8,
    pub font_size: u8,
    pub contrast: u8,
    pub text_complexity: u8,
}

impl CategoryScores {
    /// Get the score for a category
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::AltText => self.alt_text,
            Category::FontSize => self.font_size,
            Category::Contrast => self.contrast,
            Category::TextComplexity => self.text_complexity,
        }
    }

    /// Set the score for a category, clamping to 100
    pub fn set(&mut self, category: Category, score: u8) {
        let score = score.min(100);
        match category {
            Category::AltText => self.alt_text = score,
            Category::FontSize => self.font_size = score,
            Category::Contrast => self.contrast = score,
            Category::TextComplexity => self.text_complexity = score,
        }
    }
}

/// Issues grouped by category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSet {
    pub alt_text: Vec<Issue>,
    pub font_size: Vec<Issue>,
    pub contrast: Vec<Issue>,
    pub text_complexity: Vec<Issue>,
}

impl IssueSet {
    /// Issues for a category
    pub fn get(&self, category: Category) -> &[Issue] {
        match category {
            Category::AltText => &self.alt_text,
            Category::FontSize => &self.font_size,
            Category::Contrast => &self.contrast,
            Category::TextComplexity => &self.text_complexity,
        }
    }

    /// Mutable issues for a category
    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Issue> {
        match category {
            Category::AltText => &mut self.alt_text,
            Category::FontSize => &mut self.font_size,
            Category::Contrast => &mut self.contrast,
            Category::TextComplexity => &mut self.text_complexity,
        }
    }

    /// Total number of issues across all categories
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }

    /// Whether there are no issues at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete accessibility report for one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Weighted overall score in [0, 100]
    pub overall_score: u8,
    /// Individual category scores
    pub category_scores: CategoryScores,
    /// Issues grouped by category
    pub issues: IssueSet,
    /// One-line verdict derived from the overall score
    pub summary: String,
}

impl ScoreReport {
    /// Build a report from category scores and issues.
    ///
    /// The overall score is the weighted sum of the already-clamped category
    /// scores (weights: alt text 0.35, font size 0.25, contrast 0.20, text
    /// complexity 0.20), rounded to the nearest integer. Because each input
    /// is clamped and the weights sum to 1, the result cannot leave [0, 100].
    pub fn new(category_scores: CategoryScores, issues: IssueSet) -> Self {
        let overall: f64 = Category::ALL
            .iter()
            .map(|c| category_scores.get(*c).min(100) as f64 * c.weight())
            .sum();
        let overall_score = overall.round() as u8;

        Self {
            overall_score,
            category_scores,
            issues,
            summary: summary_for(overall_score).to_string(),
        }
    }

    /// Plain average of the four category scores.
    ///
    /// Some historical report surfaces used an unweighted average; this is
    /// provided for them but `overall_score` is always the weighted formula.
    pub fn unweighted_average(&self) -> u8 {
        let total: u32 = Category::ALL
            .iter()
            .map(|c| self.category_scores.get(*c) as u32)
            .sum();
        ((total as f64) / Category::ALL.len() as f64).round() as u8
    }
}

/// One-line verdict for a score
fn summary_for(score: u8) -> &'static str {
    if score >= 90 {
        "Excellent accessibility. Minor improvements possible."
    } else if score >= 70 {
        "Good accessibility. Some improvements recommended."
    } else if score >= 50 {
        "Fair accessibility. Several important issues to address."
    } else {
        "Poor accessibility. Major issues need immediate attention."
    }
}
