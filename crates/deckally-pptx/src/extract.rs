//! Content extraction.
//!
//! Walks a loaded [`Presentation`] producing two flat collections, one per
//! concern: [`TextUnit`] for anything scoring needs to know about text, and
//! [`ImageUnit`] for pictures. Units are snapshots: they hold copies of the
//! values plus a [`ShapeRef`] back-reference for later mutation, and are
//! invalidated wholesale when the presentation is reloaded.

use std::path::PathBuf;

use deckally_core::scoring::{ImageSample, TextSample};

use crate::error::Result;
use crate::media::MediaStore;
use crate::presentation::Presentation;
use crate::shape::{ShapeInfo, ShapeKind, ShapeRef};

/// One text-bearing shape's content
#[derive(Debug, Clone, PartialEq)]
pub struct TextUnit {
    pub slide_index: usize,
    pub shape: ShapeRef,
    /// Run text concatenated in run order, paragraphs joined with newlines
    pub text: String,
    /// Minimum declared size across non-empty runs
    pub font_size_pt: Option<f32>,
}

/// One picture shape's content
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUnit {
    pub slide_index: usize,
    pub shape_index: usize,
    pub shape: ShapeRef,
    /// Extracted raster file, or the legacy-vector placeholder
    pub raster_path: Option<PathBuf>,
    /// Alt text after the two-tier lookup; empty when neither tier is set
    pub alt_text: String,
    /// Set when the media bytes were not a plain raster
    pub format_warning: Option<String>,
    /// The raster at `raster_path` is a placeholder, not the real image
    pub converted_from_legacy_vector: bool,
}

/// Resolve a shape's alt text.
///
/// Tier 1 is the `descr` attribute on the shape's non-visual properties;
/// tier 2 falls back to `title`. Producers populate these inconsistently,
/// so both must be consulted.
pub fn resolve_alt_text(shape: &ShapeInfo) -> String {
    if let Some(descr) = shape.alt_text.as_deref() {
        if !descr.trim().is_empty() {
            return descr.to_string();
        }
    }
    if let Some(title) = shape.title.as_deref() {
        if !title.trim().is_empty() {
            return title.to_string();
        }
    }
    String::new()
}

/// Extract all text units, in slide and shape order.
///
/// Shapes whose text is empty still produce a unit; downstream consumers
/// that only care about content filter them out.
pub fn extract_text_units(presentation: &Presentation) -> Vec<TextUnit> {
    let mut units = Vec::new();
    for (slide_index, slide) in presentation.slides().iter().enumerate() {
        for (shape_index, shape) in slide.shapes().iter().enumerate() {
            if shape.kind != ShapeKind::Text {
                continue;
            }
            units.push(TextUnit {
                slide_index,
                shape: ShapeRef::new(slide_index, shape_index),
                text: shape.text.clone(),
                font_size_pt: shape.min_font_size_pt,
            });
        }
    }
    units
}

/// Extract all image units, materializing their media into `store`.
///
/// Per-image problems (missing relationship, unreadable media part,
/// unrecognized bytes) become `format_warning`s on the unit; they never
/// abort extraction of the remaining slides.
pub fn extract_image_units(
    presentation: &Presentation,
    store: &mut MediaStore,
) -> Result<Vec<ImageUnit>> {
    let mut units = Vec::new();
    for (slide_index, slide) in presentation.slides().iter().enumerate() {
        for (shape_index, shape) in slide.shapes().iter().enumerate() {
            if shape.kind != ShapeKind::Picture {
                continue;
            }

            let mut unit = ImageUnit {
                slide_index,
                shape_index,
                shape: ShapeRef::new(slide_index, shape_index),
                raster_path: None,
                alt_text: resolve_alt_text(shape),
                format_warning: None,
                converted_from_legacy_vector: false,
            };

            match media_bytes_for(presentation, slide_index, shape) {
                Ok(Some(bytes)) => match store.materialize(bytes) {
                    Ok(materialized) => {
                        unit.raster_path = materialized.raster_path;
                        unit.format_warning = materialized.format_warning;
                        unit.converted_from_legacy_vector =
                            materialized.converted_from_legacy_vector;
                    }
                    Err(err) => {
                        log::warn!(
                            "failed to materialize image on slide {}: {}",
                            slide_index + 1,
                            err
                        );
                        unit.format_warning = Some(format!("Could not extract image: {}", err));
                    }
                },
                Ok(None) => {
                    unit.format_warning = Some("Image media part not found".to_string());
                }
                Err(err) => {
                    log::warn!(
                        "failed to resolve image relationship on slide {}: {}",
                        slide_index + 1,
                        err
                    );
                    unit.format_warning = Some(format!("Could not resolve image: {}", err));
                }
            }

            units.push(unit);
        }
    }
    Ok(units)
}

fn media_bytes_for<'a>(
    presentation: &'a Presentation,
    slide_index: usize,
    shape: &ShapeInfo,
) -> Result<Option<&'a [u8]>> {
    let Some(rel_id) = shape.media_rel_id.as_deref() else {
        return Ok(None);
    };
    let Some(path) = presentation.media_path_for(slide_index, rel_id)? else {
        return Ok(None);
    };
    Ok(presentation.media_bytes(&path))
}

/// Map text units to scoring samples
pub fn text_samples(units: &[TextUnit]) -> Vec<TextSample> {
    units
        .iter()
        .map(|u| TextSample {
            slide_index: u.slide_index,
            text: u.text.clone(),
            font_size_pt: u.font_size_pt,
        })
        .collect()
}

/// Map image units to scoring samples
pub fn image_samples(units: &[ImageUnit]) -> Vec<ImageSample> {
    units
        .iter()
        .map(|u| ImageSample {
            slide_index: u.slide_index,
            alt_text: u.alt_text.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_with_alt(descr: Option<&str>, title: Option<&str>) -> ShapeInfo {
        let mut shape = ShapeInfo::new(ShapeKind::Picture);
        shape.alt_text = descr.map(String::from);
        shape.title = title.map(String::from);
        shape
    }

    #[test]
    fn test_two_tier_alt_lookup() {
        // Tier 1 wins when set
        let shape = shape_with_alt(Some("A chart"), Some("ignored"));
        assert_eq!(resolve_alt_text(&shape), "A chart");

        // Blank tier 1 falls through to tier 2
        let shape = shape_with_alt(Some("   "), Some("From title"));
        assert_eq!(resolve_alt_text(&shape), "From title");

        let shape = shape_with_alt(None, Some("From title"));
        assert_eq!(resolve_alt_text(&shape), "From title");

        // Neither set
        let shape = shape_with_alt(None, None);
        assert_eq!(resolve_alt_text(&shape), "");
    }
}
