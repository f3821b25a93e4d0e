//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use deckally_core::describe::PlaceholderDescriber;
use deckally_core::{Category, ScoreReport};
use deckally_pptx::{EnhanceOutcome, FixOptions, Pipeline};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "deckally")]
#[command(author, version, about = "Presentation accessibility, measured and fixed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a presentation's accessibility without changing it
    Analyze {
        /// Input PPTX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply accessibility fixes and write an enhanced copy
    Enhance {
        /// Input PPTX file
        input: PathBuf,

        /// Output PPTX file (defaults to <input>_accessible.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip alt text generation
        #[arg(long)]
        skip_alt_text: bool,

        /// Skip font size fixes
        #[arg(long)]
        skip_font_size: bool,

        /// Skip contrast fixes
        #[arg(long)]
        skip_contrast: bool,

        /// Skip text simplification
        #[arg(long)]
        skip_simplify: bool,

        /// Skip visible captions
        #[arg(long)]
        no_captions: bool,

        /// Minimum body font size in points
        #[arg(long, default_value_t = 18.0)]
        min_font_size: f32,

        /// Flip dark text toward white instead of light text toward black
        #[arg(long)]
        lighten: bool,
    },
}

/// Parse arguments and dispatch to the matching command
pub fn run_cli() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, format } => analyze_command(&input, format),
        Commands::Enhance {
            input,
            output,
            format,
            skip_alt_text,
            skip_font_size,
            skip_contrast,
            skip_simplify,
            no_captions,
            min_font_size,
            lighten,
        } => {
            let options = FixOptions {
                fix_alt_text: !skip_alt_text,
                fix_font_size: !skip_font_size,
                fix_contrast: !skip_contrast,
                simplify_text: !skip_simplify,
                add_captions: !no_captions,
                min_font_size_pt: min_font_size,
                darken_text: !lighten,
            };
            enhance_command(&input, output.as_deref(), options, format)
        }
    }
}

/// Execute the analyze command
pub fn analyze_command(input: &Path, format: OutputFormat) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let analysis = deckally_pptx::analyze(input)
        .with_context(|| format!("Failed to analyze: {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&analysis.report)?);
        }
        OutputFormat::Text => {
            println!("deckally v{}", deckally_core::VERSION);
            println!("Analyzing: {}", input.display());
            println!();
            print_report(&analysis.report);
            for warning in &analysis.warnings {
                println!("  Warning: {}", warning);
            }
        }
    }
    Ok(())
}

/// Execute the enhance command
pub fn enhance_command(
    input: &Path,
    output: Option<&Path>,
    options: FixOptions,
    format: OutputFormat,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => default_output_path(input),
    };

    let outcome = Pipeline::new(&PlaceholderDescriber)
        .with_options(options)
        .enhance(input, &output_path)
        .with_context(|| format!("Failed to enhance: {}", input.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
        }
        OutputFormat::Text => {
            println!("deckally v{}", deckally_core::VERSION);
            println!("Enhancing: {}", input.display());
            println!();
            println!(
                "Overall score: {} -> {}",
                outcome.before.overall_score, outcome.after.overall_score
            );
            for category in Category::ALL {
                println!(
                    "  {:<16} {:>3} -> {:>3}",
                    category.display_name(),
                    outcome.before.category_scores.get(category),
                    outcome.after.category_scores.get(category)
                );
            }
            println!();
            println!("Fixes applied:");
            println!("  Alt text:    {}", outcome.fixes.alt_text);
            println!("  Font size:   {}", outcome.fixes.font_size);
            println!("  Contrast:    {}", outcome.fixes.contrast);
            println!("  Simplified:  {}", outcome.fixes.simplified);
            println!("  Captions:    {}", outcome.fixes.captions);
            for warning in &outcome.warnings {
                println!("  Warning: {}", warning);
            }
            println!();
            println!("Created: {}", outcome.output_path.display());
        }
    }
    Ok(())
}

/// Default output path: the input path with `_accessible` before the extension
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());
    input.with_file_name(format!("{}_accessible.pptx", stem))
}

fn print_report(report: &ScoreReport) {
    println!("Overall score: {}/100", report.overall_score);
    println!("{}", report.summary);
    println!();
    for category in Category::ALL {
        println!(
            "  {:<16} {:>3}  (weight {:.0}%)",
            category.display_name(),
            report.category_scores.get(category),
            category.weight() * 100.0
        );
    }
    if !report.issues.is_empty() {
        println!();
        println!("Issues:");
        for category in Category::ALL {
            for issue in report.issues.get(category) {
                match &issue.detail {
                    Some(detail) => println!(
                        "  [{}] slide {}: {} ({})",
                        category.display_name(),
                        issue.slide_index + 1,
                        issue.message,
                        detail
                    ),
                    None => println!(
                        "  [{}] slide {}: {}",
                        category.display_name(),
                        issue.slide_index + 1,
                        issue.message
                    ),
                }
            }
        }
    }
}

fn outcome_json(outcome: &EnhanceOutcome) -> serde_json::Value {
    serde_json::json!({
        "before": outcome.before,
        "after": outcome.after,
        "fixes": {
            "alt_text": outcome.fixes.alt_text,
            "font_size": outcome.fixes.font_size,
            "contrast": outcome.fixes.contrast,
            "simplified": outcome.fixes.simplified,
            "captions": outcome.fixes.captions,
        },
        "warnings": outcome.warnings,
        "output": outcome.output_path.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("decks/q3.pptx")),
            Path::new("decks/q3_accessible.pptx")
        );
        assert_eq!(
            default_output_path(Path::new("plain")),
            Path::new("plain_accessible.pptx")
        );
    }
}
