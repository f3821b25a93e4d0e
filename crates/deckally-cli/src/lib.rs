//! deckally CLI - Command-line interface library
//!
//! This library provides the CLI functionality for deckally, including:
//! - Analyze: score a presentation's accessibility
//! - Enhance: apply fixes and write an accessible copy
//!
//! # Library Usage
//!
//! ```ignore
//! use deckally_cli::{analyze_command, OutputFormat};
//!
//! // Run the full CLI
//! run_cli();
//!
//! // Or use individual commands programmatically
//! analyze_command(&input, OutputFormat::Json)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Score a deck
//! deckally analyze quarterly.pptx
//!
//! # Fix it, writing quarterly_accessible.pptx
//! deckally enhance quarterly.pptx
//!
//! # Machine-readable report
//! deckally analyze quarterly.pptx --format json
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{analyze_command, default_output_path, enhance_command, run_cli, OutputFormat};
