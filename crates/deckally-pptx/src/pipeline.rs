//! The analyze/enhance pipeline.
//!
//! One [`Pipeline`] run owns everything it touches: the loaded
//! presentation, the scoped media directory, and the warnings it collects.
//! Enhancement follows a strict sequence: extract, score, mutate, save,
//! then reload the saved file from disk and score again. The "after"
//! report always reflects what was actually persisted, never the in-memory
//! state. A serialization bug shows up as a scoring regression instead of
//! passing silently.

use std::path::{Path, PathBuf};

use deckally_core::describe::{
    clip_description, placeholder_description, single_image_placeholder, DetailLevel,
    ImageDescriber, PlaceholderDescriber,
};
use deckally_core::scoring::{classify_alt_text, is_caption_or_footnote, AltTextQuality};
use deckally_core::simplify::{simplify, Simplification};
use deckally_core::ScoreReport;

use crate::error::Result;
use crate::extract::{
    extract_image_units, extract_text_units, image_samples, text_samples, ImageUnit, TextUnit,
};
use crate::media::MediaStore;
use crate::mutate::{
    add_visible_caption, update_alt_text, update_font_size, update_text, update_text_contrast,
};
use crate::presentation::Presentation;

/// Minimum word count for a text shape to be considered for simplification
const SIMPLIFY_MIN_WORDS: usize = 15;

/// Which fixes an enhancement run applies
#[derive(Debug, Clone, Copy)]
pub struct FixOptions {
    pub fix_alt_text: bool,
    pub fix_font_size: bool,
    pub fix_contrast: bool,
    pub simplify_text: bool,
    pub add_captions: bool,
    /// Target minimum font size in points
    pub min_font_size_pt: f32,
    /// Flip light text toward black (true) or dark text toward white
    pub darken_text: bool,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            fix_alt_text: true,
            fix_font_size: true,
            fix_contrast: true,
            simplify_text: true,
            add_captions: true,
            min_font_size_pt: 18.0,
            darken_text: true,
        }
    }
}

/// Result of an analysis pass
#[derive(Debug)]
pub struct Analysis {
    pub report: ScoreReport,
    pub text_units: Vec<TextUnit>,
    pub image_units: Vec<ImageUnit>,
    /// Per-shape extraction warnings (unsupported formats, missing media)
    pub warnings: Vec<String>,
}

/// Counts of applied fixes, per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixCounts {
    pub alt_text: usize,
    pub font_size: usize,
    pub contrast: usize,
    pub simplified: usize,
    pub captions: usize,
}

/// Result of an enhancement run
#[derive(Debug)]
pub struct EnhanceOutcome {
    pub before: ScoreReport,
    pub after: ScoreReport,
    pub fixes: FixCounts,
    /// Non-fatal per-shape problems collected along the way
    pub warnings: Vec<String>,
    pub output_path: PathBuf,
}

/// Analyze a presentation with no describer configured
pub fn analyze<P: AsRef<Path>>(path: P) -> Result<Analysis> {
    Pipeline::new(&PlaceholderDescriber).analyze(path)
}

/// A configured analyze/enhance pipeline
pub struct Pipeline<'a> {
    describer: &'a dyn ImageDescriber,
    options: FixOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(describer: &'a dyn ImageDescriber) -> Self {
        Self {
            describer,
            options: FixOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FixOptions) -> Self {
        self.options = options;
        self
    }

    /// Load, extract, and score a presentation
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        let presentation = Presentation::open(path)?;
        self.analyze_loaded(&presentation)
    }

    fn analyze_loaded(&self, presentation: &Presentation) -> Result<Analysis> {
        let mut store = MediaStore::new()?;
        let text_units = extract_text_units(presentation);
        let image_units = extract_image_units(presentation, &mut store)?;

        let warnings: Vec<String> = image_units
            .iter()
            .filter_map(|u| {
                u.format_warning
                    .as_ref()
                    .map(|w| format!("slide {}: {}", u.slide_index + 1, w))
            })
            .collect();

        let report = deckally_core::score_all(
            &text_samples(&text_units),
            &image_samples(&image_units),
            None,
        );

        Ok(Analysis {
            report,
            text_units,
            image_units,
            warnings,
        })
    }

    /// Apply the configured fixes to `input`, writing the result to `output`.
    ///
    /// The input file is never modified. The "after" report is computed from
    /// a fresh load of the written output file.
    pub fn enhance<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<EnhanceOutcome> {
        let output = output.as_ref();
        let mut presentation = Presentation::open(input)?;

        let before_analysis = self.analyze_loaded(&presentation)?;
        let mut warnings = before_analysis.warnings.clone();
        let mut fixes = FixCounts::default();

        if self.options.fix_alt_text {
            self.fix_alt_text(
                &mut presentation,
                &before_analysis.image_units,
                &mut fixes,
                &mut warnings,
            );
        }
        if self.options.fix_font_size {
            self.fix_font_sizes(
                &mut presentation,
                &before_analysis.text_units,
                &mut fixes,
                &mut warnings,
            );
        }
        if self.options.fix_contrast {
            self.fix_contrast(
                &mut presentation,
                &before_analysis.text_units,
                &mut fixes,
                &mut warnings,
            );
        }
        if self.options.simplify_text {
            self.simplify_texts(
                &mut presentation,
                &before_analysis.text_units,
                &mut fixes,
                &mut warnings,
            );
        }

        presentation.save(output)?;

        // Reload from disk so the after report reflects the persisted file
        let reloaded = Presentation::open(output)?;
        let after_analysis = self.analyze_loaded(&reloaded)?;

        log::info!(
            "enhanced {}: score {} -> {}",
            output.display(),
            before_analysis.report.overall_score,
            after_analysis.report.overall_score
        );

        Ok(EnhanceOutcome {
            before: before_analysis.report,
            after: after_analysis.report,
            fixes,
            warnings,
            output_path: output.to_path_buf(),
        })
    }

    fn fix_alt_text(
        &self,
        presentation: &mut Presentation,
        images: &[ImageUnit],
        fixes: &mut FixCounts,
        warnings: &mut Vec<String>,
    ) {
        // One availability probe covers the whole batch
        let describer_ready = self.describer.is_available();

        for unit in images {
            let quality = classify_alt_text(&unit.alt_text);
            if quality != AltTextQuality::Missing && quality != AltTextQuality::Generic {
                continue;
            }

            let single_image = images
                .iter()
                .filter(|u| u.slide_index == unit.slide_index)
                .count()
                == 1;
            let description = self.describe(presentation, unit, single_image, describer_ready);

            match update_alt_text(presentation, unit.shape, &description) {
                Ok(result) if result.applied => {
                    fixes.alt_text += 1;
                    if self.options.add_captions {
                        match add_visible_caption(
                            presentation,
                            unit.shape,
                            &description,
                            single_image,
                        ) {
                            Ok(_) => fixes.captions += 1,
                            Err(err) => warnings.push(format!(
                                "slide {}: caption not added: {}",
                                unit.slide_index + 1,
                                err
                            )),
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => warnings.push(format!(
                    "slide {}: alt text not set: {}",
                    unit.slide_index + 1,
                    err
                )),
            }
        }
    }

    /// Produce a description for one image, degrading through the tiers:
    /// real describer, then deterministic placeholder.
    fn describe(
        &self,
        presentation: &Presentation,
        unit: &ImageUnit,
        single_image: bool,
        describer_ready: bool,
    ) -> String {
        let slide_number = presentation.slides()[unit.slide_index].number as usize;

        if unit.converted_from_legacy_vector {
            return format!(
                "Legacy vector image on slide {} - consider replacing it with a more accessible format",
                slide_number
            );
        }

        if let Some(path) = unit.raster_path.as_deref() {
            if describer_ready {
                match self.describer.describe(path, DetailLevel::Brief) {
                    Ok(text) => return clip_description(&text),
                    Err(err) => {
                        log::warn!("describer failed for slide {}: {}", slide_number, err);
                    }
                }
            }
        }

        if single_image {
            single_image_placeholder(slide_number)
        } else {
            placeholder_description(slide_number)
        }
    }

    fn fix_font_sizes(
        &self,
        presentation: &mut Presentation,
        texts: &[TextUnit],
        fixes: &mut FixCounts,
        warnings: &mut Vec<String>,
    ) {
        for unit in texts {
            if unit.text.trim().is_empty() || is_caption_or_footnote(&unit.text) {
                continue;
            }
            let Some(size) = unit.font_size_pt else {
                continue;
            };
            if size >= self.options.min_font_size_pt {
                continue;
            }
            match update_font_size(presentation, unit.shape, self.options.min_font_size_pt) {
                Ok(result) if result.applied => fixes.font_size += 1,
                Ok(_) => {}
                Err(err) => warnings.push(format!(
                    "slide {}: font size not raised: {}",
                    unit.slide_index + 1,
                    err
                )),
            }
        }
    }

    fn fix_contrast(
        &self,
        presentation: &mut Presentation,
        texts: &[TextUnit],
        fixes: &mut FixCounts,
        warnings: &mut Vec<String>,
    ) {
        for unit in texts {
            if unit.text.trim().is_empty() {
                continue;
            }
            match update_text_contrast(presentation, unit.shape, self.options.darken_text) {
                Ok(result) if result.applied => fixes.contrast += 1,
                Ok(_) => {}
                Err(err) => warnings.push(format!(
                    "slide {}: contrast not adjusted: {}",
                    unit.slide_index + 1,
                    err
                )),
            }
        }
    }

    fn simplify_texts(
        &self,
        presentation: &mut Presentation,
        texts: &[TextUnit],
        fixes: &mut FixCounts,
        warnings: &mut Vec<String>,
    ) {
        for unit in texts {
            if is_caption_or_footnote(&unit.text) || unit.text.contains("This image") {
                continue;
            }
            if unit.text.split_whitespace().count() < SIMPLIFY_MIN_WORDS {
                continue;
            }
            if !deckally_core::is_complex(&unit.text) {
                continue;
            }

            let Simplification::Applied { text, improvement } = simplify(&unit.text) else {
                continue;
            };
            match update_text(presentation, unit.shape, &text) {
                Ok(result) if result.applied => {
                    log::debug!(
                        "simplified text on slide {} (improvement {}%)",
                        unit.slide_index + 1,
                        improvement
                    );
                    fixes.simplified += 1;
                }
                Ok(_) => {}
                Err(err) => warnings.push(format!(
                    "slide {}: text not simplified: {}",
                    unit.slide_index + 1,
                    err
                )),
            }
        }
    }
}
