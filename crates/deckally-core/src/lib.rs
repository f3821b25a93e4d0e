//! deckally-core - Presentation accessibility heuristics
//!
//! Core library for deckally: accessibility scoring, text complexity
//! metrics, WCAG contrast math, text simplification, and the image
//! description contract. Everything here is pure logic over plain values:
//! no file formats, no I/O beyond the describer trait. The OOXML layer
//! lives in `deckally-pptx`.
//!
//! # Example
//!
//! ```
//! use deckally_core::scoring::{score_all, ImageSample, TextSample};
//!
//! let texts = vec![TextSample {
//!     slide_index: 0,
//!     text: "Quarterly results".to_string(),
//!     font_size_pt: Some(24.0),
//! }];
//! let images = vec![ImageSample {
//!     slide_index: 0,
//!     alt_text: "Bar chart of revenue by quarter".to_string(),
//! }];
//!
//! let report = score_all(&texts, &images, None);
//! assert_eq!(report.category_scores.alt_text, 100);
//! assert!(report.overall_score >= 90);
//! ```

pub mod complexity;
pub mod contrast;
pub mod describe;
pub mod report;
pub mod scoring;
pub mod simplify;

// Re-export main types and functions
pub use complexity::{is_complex, TextMetrics};
pub use contrast::{contrast_ratio, Rgb};
pub use describe::{DescribeError, DetailLevel, ImageDescriber, PlaceholderDescriber, Resilient};
pub use report::{Category, CategoryScores, Issue, IssueSet, ScoreReport};
pub use scoring::{score_all, CategoryResult, ContrastSample, ImageSample, TextSample};
pub use simplify::{apply_external, basic_simplify, simplify, Simplification};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
