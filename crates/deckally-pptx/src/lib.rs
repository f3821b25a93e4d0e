//! # deckally-pptx
//!
//! PPTX reading, mutation, and the accessibility pipeline for deckally.
//!
//! This crate provides functionality to:
//! - Read PPTX archives and parse slide shapes
//! - Extract text and image content for scoring
//! - Apply accessibility fixes in place (alt text, font size, contrast,
//!   simplified text, visible captions)
//! - Run the full analyze/enhance pipeline with save-and-reload verification
//!
//! ## Example: Analyzing a Presentation
//!
//! ```no_run
//! use deckally_pptx::pipeline::analyze;
//!
//! let analysis = analyze("deck.pptx")?;
//! println!("overall score: {}", analysis.report.overall_score);
//! for issue in &analysis.report.issues.alt_text {
//!     println!("slide {}: {}", issue.slide_index + 1, issue.message);
//! }
//! # Ok::<(), deckally_pptx::PptxError>(())
//! ```

pub mod archive;
pub mod caption;
pub mod error;
pub mod extract;
pub mod media;
pub mod mutate;
pub mod pipeline;
pub mod presentation;
pub mod shape;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use archive::PptxArchive;
pub use error::{PptxError, Result};
pub use extract::{extract_image_units, extract_text_units, ImageUnit, TextUnit};
pub use media::{ImageClass, LegacyVectorKind, MediaStore};
pub use pipeline::{analyze, Analysis, EnhanceOutcome, FixCounts, FixOptions, Pipeline};
pub use presentation::{Presentation, Slide};
pub use shape::{Rect, ShapeInfo, ShapeKind, ShapeRef};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
