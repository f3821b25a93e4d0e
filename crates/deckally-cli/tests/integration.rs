//! Integration tests for the deckally CLI
//!
//! Exercise the command functions programmatically against decks written to
//! temporary files, covering both output formats and the default output path.

use std::io::Write;

use deckally_cli::{analyze_command, default_output_path, enhance_command, OutputFormat};
use deckally_pptx::test_utils::{
    minimal_pptx, slide_with_picture, slide_with_text_runs, tiny_png,
};
use deckally_pptx::{FixOptions, Presentation};

fn write_deck(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

#[test]
fn test_analyze_command_text_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let deck = minimal_pptx(
        &[slide_with_text_runs(&[("Readable title", Some(2400))])],
        &[],
    );
    let input = write_deck(&dir, "deck.pptx", &deck);

    analyze_command(&input, OutputFormat::Text).unwrap();
    analyze_command(&input, OutputFormat::Json).unwrap();
}

#[test]
fn test_analyze_command_missing_input_fails() {
    let err = analyze_command(std::path::Path::new("no-such-deck.pptx"), OutputFormat::Text)
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_enhance_command_writes_default_output() {
    let dir = tempfile::tempdir().unwrap();
    let deck = minimal_pptx(
        &[slide_with_picture("rId2", None)],
        &[("image1.png", tiny_png())],
    );
    let input = write_deck(&dir, "deck.pptx", &deck);

    enhance_command(&input, None, FixOptions::default(), OutputFormat::Text).unwrap();

    let expected = default_output_path(&input);
    assert!(expected.exists(), "missing {}", expected.display());

    // The written deck loads and has the fix in place
    let enhanced = Presentation::open(&expected).unwrap();
    let pic = &enhanced.shapes_of(0).unwrap()[0];
    assert!(pic.alt_text.is_some());
}

#[test]
fn test_enhance_command_honors_explicit_output_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    let deck = minimal_pptx(
        &[slide_with_picture("rId2", None)],
        &[("image1.png", tiny_png())],
    );
    let input = write_deck(&dir, "deck.pptx", &deck);
    let output = dir.path().join("fixed.pptx");

    let options = FixOptions {
        fix_alt_text: false,
        add_captions: false,
        ..FixOptions::default()
    };
    enhance_command(&input, Some(&output), options, OutputFormat::Json).unwrap();

    assert!(output.exists());
    let enhanced = Presentation::open(&output).unwrap();
    // Alt text fix was skipped, so the picture is still bare
    let pic = &enhanced.shapes_of(0).unwrap()[0];
    assert!(pic.alt_text.is_none());
}
