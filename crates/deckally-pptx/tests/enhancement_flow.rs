//! End-to-end enhancement flow tests.
//!
//! Every test here goes through the public API only: build a deck, write it
//! to disk, run analyze or enhance, and assert on what a fresh load of the
//! output actually contains. Nothing reaches into crate internals.
//!
//! Covered properties:
//! 1. Degenerate decks score cleanly (no images, no text)
//! 2. Legacy metafiles are classified and kept, never dropped
//! 3. Enhancement strictly improves a deficient deck
//! 4. Captions land inside slide bounds
//! 5. An available describer's output wins over the placeholder

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use deckally_core::describe::{DescribeError, DetailLevel, ImageDescriber, PlaceholderDescriber};
use deckally_pptx::test_utils::{
    minimal_pptx, picture_shape_xml, slide_with_picture, slide_with_shapes, slide_with_text_runs,
    text_shape_xml, tiny_png, wmf_bytes,
};
use deckally_pptx::{analyze, Pipeline, Presentation, ShapeKind};

fn write_temp_pptx(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".pptx").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn output_file() -> tempfile::NamedTempFile {
    tempfile::Builder::new().suffix(".pptx").tempfile().unwrap()
}

// =============================================================================
// PART 1: DEGENERATE DECKS
// =============================================================================

mod degenerate_decks {
    use super::*;

    #[test]
    fn test_deck_without_images_scores_full_alt_text() {
        let bytes = minimal_pptx(
            &[slide_with_text_runs(&[("Readable title", Some(2400))])],
            &[],
        );
        let input = write_temp_pptx(&bytes);

        let analysis = analyze(input.path()).unwrap();
        assert_eq!(analysis.report.category_scores.alt_text, 100);
        assert!(analysis.report.issues.alt_text.is_empty());
        assert!(analysis.image_units.is_empty());
    }

    #[test]
    fn test_deck_without_text_scores_full_font_and_complexity() {
        let bytes = minimal_pptx(
            &[slide_with_picture("rId2", Some("A detailed photo of the venue"))],
            &[("image1.png", tiny_png())],
        );
        let input = write_temp_pptx(&bytes);

        let analysis = analyze(input.path()).unwrap();
        assert_eq!(analysis.report.category_scores.font_size, 100);
        assert_eq!(analysis.report.category_scores.text_complexity, 100);
        assert!(analysis.text_units.is_empty());
    }

    #[test]
    fn test_enhancing_clean_deck_changes_nothing() {
        let bytes = minimal_pptx(
            &[slide_with_shapes(&[
                text_shape_xml(&[("Short and clear words", Some(2400))]),
                picture_shape_xml("rId2", Some("A detailed photo of the venue")),
            ])],
            &[("image1.png", tiny_png())],
        );
        let input = write_temp_pptx(&bytes);
        let output = output_file();

        let outcome = Pipeline::new(&PlaceholderDescriber)
            .enhance(input.path(), output.path())
            .unwrap();

        assert_eq!(outcome.fixes.alt_text, 0);
        assert_eq!(outcome.fixes.font_size, 0);
        assert_eq!(outcome.fixes.simplified, 0);
        assert_eq!(outcome.fixes.captions, 0);
        assert_eq!(outcome.before.overall_score, outcome.after.overall_score);
    }
}

// =============================================================================
// PART 2: LEGACY METAFILE HANDLING
// =============================================================================

mod legacy_metafiles {
    use super::*;

    #[test]
    fn test_wmf_image_is_kept_and_flagged() {
        let bytes = minimal_pptx(
            &[slide_with_picture("rId2", None)],
            &[("image1.wmf", wmf_bytes())],
        );
        let input = write_temp_pptx(&bytes);

        let analysis = analyze(input.path()).unwrap();
        assert_eq!(analysis.image_units.len(), 1);

        let unit = &analysis.image_units[0];
        assert!(unit.converted_from_legacy_vector);
        assert!(unit.raster_path.is_some());
        assert!(analysis.warnings.iter().any(|w| w.contains("WMF")));

        // Still scored like any other image without alt text
        assert_eq!(analysis.report.category_scores.alt_text, 0);
    }

    #[test]
    fn test_wmf_survives_enhancement_with_advisory_alt() {
        let bytes = minimal_pptx(
            &[slide_with_picture("rId2", None)],
            &[("image1.wmf", wmf_bytes())],
        );
        let input = write_temp_pptx(&bytes);
        let output = output_file();

        Pipeline::new(&PlaceholderDescriber)
            .enhance(input.path(), output.path())
            .unwrap();

        let reloaded = Presentation::open(output.path()).unwrap();
        let shapes = reloaded.shapes_of(0).unwrap();
        let pic = shapes
            .iter()
            .find(|s| s.kind == ShapeKind::Picture)
            .unwrap();
        let alt = pic.alt_text.as_deref().unwrap();
        assert!(alt.contains("Legacy vector"), "got: {}", alt);

        // The original media part is still in the saved archive
        let media = reloaded.media_bytes("ppt/media/image1.wmf");
        assert_eq!(media, Some(wmf_bytes().as_slice()));
    }
}

// =============================================================================
// PART 3: ENHANCEMENT IMPROVES DEFICIENT DECKS
// =============================================================================

mod enhancement {
    use super::*;

    fn deficient_deck() -> Vec<u8> {
        let wall =
            "We must utilize the implementation to facilitate the methodology and demonstrate \
             that the approximately finalized infrastructure can accommodate the requirements \
             of the organization";
        minimal_pptx(
            &[
                slide_with_shapes(&[
                    picture_shape_xml("rId2", None),
                    text_shape_xml(&[(wall, Some(1000))]),
                ]),
                slide_with_text_runs(&[("A fine second slide", Some(2400))]),
            ],
            &[("image1.png", tiny_png())],
        )
    }

    #[test]
    fn test_overall_score_strictly_increases() {
        let input = write_temp_pptx(&deficient_deck());
        let output = output_file();

        let outcome = Pipeline::new(&PlaceholderDescriber)
            .enhance(input.path(), output.path())
            .unwrap();

        assert!(
            outcome.after.overall_score > outcome.before.overall_score,
            "{} -> {}",
            outcome.before.overall_score,
            outcome.after.overall_score
        );
        assert_eq!(outcome.after.category_scores.alt_text, 100);
        assert_eq!(outcome.after.category_scores.font_size, 100);
    }

    #[test]
    fn test_after_report_comes_from_the_saved_file() {
        let input = write_temp_pptx(&deficient_deck());
        let output = output_file();

        let outcome = Pipeline::new(&PlaceholderDescriber)
            .enhance(input.path(), output.path())
            .unwrap();

        // Scoring the output file independently must agree with the outcome
        let fresh = analyze(output.path()).unwrap();
        assert_eq!(fresh.report.overall_score, outcome.after.overall_score);
        assert_eq!(fresh.report.category_scores, outcome.after.category_scores);
    }

    #[test]
    fn test_caption_is_added_within_slide_bounds() {
        let input = write_temp_pptx(&deficient_deck());
        let output = output_file();

        Pipeline::new(&PlaceholderDescriber)
            .enhance(input.path(), output.path())
            .unwrap();

        let reloaded = Presentation::open(output.path()).unwrap();
        let (slide_w, slide_h) = reloaded.slide_size();
        let caption = reloaded
            .shapes_of(0)
            .unwrap()
            .iter()
            .find(|s| s.text.starts_with("Image Description"))
            .expect("caption shape present after enhancement")
            .clone();

        let frame = caption.frame.expect("caption has a frame");
        assert!(frame.x >= 0 && frame.y >= 0);
        assert!(frame.right() <= slide_w);
        assert!(frame.bottom() <= slide_h);
    }

    #[test]
    fn test_untouched_slides_are_preserved_verbatim() {
        let input = write_temp_pptx(&deficient_deck());
        let output = output_file();

        Pipeline::new(&PlaceholderDescriber)
            .enhance(input.path(), output.path())
            .unwrap();

        // Slide 2 needed no fixes; its XML must be byte-identical
        let before = Presentation::open(input.path()).unwrap();
        let after = Presentation::open(output.path()).unwrap();
        assert_eq!(before.slide_xml(1).unwrap(), after.slide_xml(1).unwrap());
    }
}

// =============================================================================
// PART 4: DESCRIBER INTEGRATION
// =============================================================================

mod describers {
    use super::*;

    /// A describer that always answers with a fixed caption
    struct Fixed {
        calls: AtomicUsize,
    }

    impl ImageDescriber for Fixed {
        fn is_available(&self) -> bool {
            true
        }

        fn describe(&self, _path: &Path, _detail: DetailLevel) -> Result<String, DescribeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("A red square used as a section marker".to_string())
        }
    }

    /// A describer that counts how often availability is probed
    struct ProbeCounting {
        probes: AtomicUsize,
    }

    impl ImageDescriber for ProbeCounting {
        fn is_available(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            true
        }

        fn describe(&self, _path: &Path, _detail: DetailLevel) -> Result<String, DescribeError> {
            Ok("A plain blue divider graphic".to_string())
        }
    }

    /// A describer that claims availability but always fails
    struct Failing;

    impl ImageDescriber for Failing {
        fn is_available(&self) -> bool {
            true
        }

        fn describe(&self, _path: &Path, _detail: DetailLevel) -> Result<String, DescribeError> {
            Err(DescribeError::RequestFailed("connection refused".to_string()))
        }
    }

    #[test]
    fn test_available_describer_output_becomes_alt_text() {
        let bytes = minimal_pptx(
            &[slide_with_picture("rId2", None)],
            &[("image1.png", tiny_png())],
        );
        let input = write_temp_pptx(&bytes);
        let output = output_file();

        let describer = Fixed {
            calls: AtomicUsize::new(0),
        };
        Pipeline::new(&describer)
            .enhance(input.path(), output.path())
            .unwrap();
        assert_eq!(describer.calls.load(Ordering::SeqCst), 1);

        let reloaded = Presentation::open(output.path()).unwrap();
        let pic = &reloaded.shapes_of(0).unwrap()[0];
        assert_eq!(
            pic.alt_text.as_deref(),
            Some("A red square used as a section marker")
        );
    }

    #[test]
    fn test_failing_describer_falls_back_to_placeholder() {
        let bytes = minimal_pptx(
            &[slide_with_picture("rId2", None)],
            &[("image1.png", tiny_png())],
        );
        let input = write_temp_pptx(&bytes);
        let output = output_file();

        let outcome = Pipeline::new(&Failing)
            .enhance(input.path(), output.path())
            .unwrap();
        assert_eq!(outcome.fixes.alt_text, 1);

        let reloaded = Presentation::open(output.path()).unwrap();
        let pic = &reloaded.shapes_of(0).unwrap()[0];
        let alt = pic.alt_text.as_deref().unwrap();
        assert!(alt.contains("AI description not available"), "got: {}", alt);
        // Placeholder alt text still lifts the score off the floor
        assert_eq!(outcome.after.category_scores.alt_text, 100);
    }

    #[test]
    fn test_availability_probed_once_per_run() {
        let bytes = minimal_pptx(
            &[
                slide_with_picture("rId2", None),
                slide_with_picture("rId2", None),
            ],
            &[("image1.png", tiny_png())],
        );
        let input = write_temp_pptx(&bytes);
        let output = output_file();

        let describer = ProbeCounting {
            probes: AtomicUsize::new(0),
        };
        let outcome = Pipeline::new(&describer)
            .enhance(input.path(), output.path())
            .unwrap();

        // Two images get described off a single availability probe
        assert_eq!(outcome.fixes.alt_text, 2);
        assert_eq!(describer.probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_existing_alt_text_is_not_overwritten() {
        let bytes = minimal_pptx(
            &[slide_with_picture("rId2", Some("A carefully authored description"))],
            &[("image1.png", tiny_png())],
        );
        let input = write_temp_pptx(&bytes);
        let output = output_file();

        let describer = Fixed {
            calls: AtomicUsize::new(0),
        };
        Pipeline::new(&describer)
            .enhance(input.path(), output.path())
            .unwrap();
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);

        let reloaded = Presentation::open(output.path()).unwrap();
        let pic = &reloaded.shapes_of(0).unwrap()[0];
        assert_eq!(
            pic.alt_text.as_deref(),
            Some("A carefully authored description")
        );
    }
}
