//! Accessibility mutations.
//!
//! Every operation here rewrites one slide's XML with a streaming pass that
//! copies events through untouched except inside the target shape's subtree,
//! so markup the operation does not own passes through byte-for-byte.
//! Each operation checks the shape's capability first and fails explicitly
//! on a mismatch rather than probing the XML.
//!
//! All operations are idempotent where the semantics allow: raising font
//! sizes twice reports no change the second time, and setting alt text to
//! its current value still rewrites but produces identical output.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use deckally_core::contrast::Rgb;

use crate::caption::{caption_shape_xml, caption_text, fallback_rect, place_caption};
use crate::error::{PptxError, Result};
use crate::presentation::Presentation;
use crate::shape::{ShapeInfo, ShapeKind, ShapeRef};

/// Outcome of one mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Whether anything actually changed
    pub applied: bool,
    pub shape: ShapeRef,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl MutationResult {
    fn unchanged(shape: ShapeRef) -> Self {
        Self {
            applied: false,
            shape,
            before: None,
            after: None,
        }
    }
}

fn require_kind(info: &ShapeInfo, shape_ref: ShapeRef, required: ShapeKind) -> Result<()> {
    if info.kind != required {
        return Err(PptxError::IncompatibleShape {
            slide: shape_ref.slide,
            actual: info.kind.name(),
            required: required.name(),
        });
    }
    Ok(())
}

/// Set a picture's alt text (`descr` attribute on its non-visual properties)
pub fn update_alt_text(
    presentation: &mut Presentation,
    shape_ref: ShapeRef,
    text: &str,
) -> Result<MutationResult> {
    let info = presentation.shape(shape_ref)?;
    require_kind(info, shape_ref, ShapeKind::Picture)?;
    let before = info.alt_text.clone();

    let mut found = false;
    let xml = rewrite_shape(
        presentation.slide_xml(shape_ref.slide)?,
        shape_ref.shape,
        |events| {
            for event in events.iter_mut() {
                let replacement = match event {
                    Event::Start(e) if e.local_name().as_ref() == b"cNvPr" => {
                        Some(Event::Start(set_attribute(e, b"descr", text)?))
                    }
                    Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                        Some(Event::Empty(set_attribute(e, b"descr", text)?))
                    }
                    _ => None,
                };
                if let Some(new_event) = replacement {
                    *event = new_event;
                    found = true;
                    break;
                }
            }
            Ok(())
        },
    )?;

    if !found {
        log::warn!(
            "picture on slide {} has no non-visual properties element",
            shape_ref.slide + 1
        );
        return Ok(MutationResult::unchanged(shape_ref));
    }

    presentation.set_slide_xml(shape_ref.slide, xml)?;
    Ok(MutationResult {
        applied: true,
        shape: shape_ref,
        before,
        after: Some(text.to_string()),
    })
}

/// Raise every non-empty run with a declared size below `min_pt` to exactly
/// `min_pt`. Runs at or above the minimum, and runs with no declared size,
/// are untouched.
pub fn update_font_size(
    presentation: &mut Presentation,
    shape_ref: ShapeRef,
    min_pt: f32,
) -> Result<MutationResult> {
    let info = presentation.shape(shape_ref)?;
    require_kind(info, shape_ref, ShapeKind::Text)?;
    let before = info.min_font_size_pt;

    let min_hundredths = (min_pt * 100.0).round() as i64;
    let mut changed = false;

    let xml = rewrite_shape(
        presentation.slide_xml(shape_ref.slide)?,
        shape_ref.shape,
        |events| {
            for (start, end) in run_spans(events) {
                if !run_has_text(&events[start..=end]) {
                    continue;
                }
                for event in &mut events[start..=end] {
                    let raised = match event {
                        Event::Start(e) if e.local_name().as_ref() == b"rPr" => {
                            raise_sz(e, min_hundredths)?.map(Event::Start)
                        }
                        Event::Empty(e) if e.local_name().as_ref() == b"rPr" => {
                            raise_sz(e, min_hundredths)?.map(Event::Empty)
                        }
                        _ => None,
                    };
                    if let Some(new_event) = raised {
                        *event = new_event;
                        changed = true;
                    }
                }
            }
            Ok(())
        },
    )?;

    if !changed {
        return Ok(MutationResult::unchanged(shape_ref));
    }

    presentation.set_slide_xml(shape_ref.slide, xml)?;
    Ok(MutationResult {
        applied: true,
        shape: shape_ref,
        before: before.map(|pt| format!("{}pt", pt)),
        after: Some(format!("{}pt", min_pt)),
    })
}

/// Flip run colors toward the requested pole for contrast.
///
/// Only runs with an explicit solid sRGB color are touched; theme and
/// gradient colors cannot be flipped safely and are skipped.
pub fn update_text_contrast(
    presentation: &mut Presentation,
    shape_ref: ShapeRef,
    darken: bool,
) -> Result<MutationResult> {
    let info = presentation.shape(shape_ref)?;
    require_kind(info, shape_ref, ShapeKind::Text)?;

    let mut flipped = 0usize;
    let target_hex = if darken { "000000" } else { "FFFFFF" };

    let xml = rewrite_shape(
        presentation.slide_xml(shape_ref.slide)?,
        shape_ref.shape,
        |events| {
            let mut rpr_depth: Option<u32> = None;
            let mut depth = 0u32;
            for event in events.iter_mut() {
                match event {
                    Event::Start(e) => {
                        depth += 1;
                        if e.local_name().as_ref() == b"rPr" && rpr_depth.is_none() {
                            rpr_depth = Some(depth);
                        } else if e.local_name().as_ref() == b"srgbClr" && rpr_depth.is_some() {
                            if let Some(new_elem) = flip_color(e, darken, target_hex)? {
                                *event = Event::Start(new_elem);
                                flipped += 1;
                            }
                        }
                    }
                    Event::Empty(e) => {
                        if e.local_name().as_ref() == b"srgbClr" && rpr_depth.is_some() {
                            if let Some(new_elem) = flip_color(e, darken, target_hex)? {
                                *event = Event::Empty(new_elem);
                                flipped += 1;
                            }
                        }
                    }
                    Event::End(_) => {
                        if rpr_depth == Some(depth) {
                            rpr_depth = None;
                        }
                        depth = depth.saturating_sub(1);
                    }
                    _ => {}
                }
            }
            Ok(())
        },
    )?;

    if flipped == 0 {
        return Ok(MutationResult::unchanged(shape_ref));
    }

    presentation.set_slide_xml(shape_ref.slide, xml)?;
    Ok(MutationResult {
        applied: true,
        shape: shape_ref,
        before: None,
        after: Some(format!("{} run colors set to #{}", flipped, target_hex)),
    })
}

/// Replace a text shape's content with `new_text`.
///
/// The first paragraph's node and its first run's formatting survive; any
/// further runs of that paragraph and any further paragraphs are dropped.
/// This mirrors how the text is rewritten as a whole by simplification.
pub fn update_text(
    presentation: &mut Presentation,
    shape_ref: ShapeRef,
    new_text: &str,
) -> Result<MutationResult> {
    let info = presentation.shape(shape_ref)?;
    require_kind(info, shape_ref, ShapeKind::Text)?;
    let before = info.text.clone();

    if before == new_text {
        return Ok(MutationResult::unchanged(shape_ref));
    }

    let mut replaced = false;
    let xml = rewrite_shape(
        presentation.slide_xml(shape_ref.slide)?,
        shape_ref.shape,
        |events| {
            let rewritten = rewrite_text_body(events, new_text)?;
            replaced = rewritten.is_some();
            if let Some(new_events) = rewritten {
                *events = new_events;
            }
            Ok(())
        },
    )?;

    if !replaced {
        log::warn!("shape on slide {} has no text body", shape_ref.slide + 1);
        return Ok(MutationResult::unchanged(shape_ref));
    }

    presentation.set_slide_xml(shape_ref.slide, xml)?;
    Ok(MutationResult {
        applied: true,
        shape: shape_ref,
        before: Some(before),
        after: Some(new_text.to_string()),
    })
}

/// Add a visible caption text box for a picture.
///
/// Placement follows [`place_caption`] when the picture declares a frame
/// and falls back to a fixed bottom strip otherwise.
pub fn add_visible_caption(
    presentation: &mut Presentation,
    shape_ref: ShapeRef,
    description: &str,
    single_image: bool,
) -> Result<MutationResult> {
    let info = presentation.shape(shape_ref)?;
    require_kind(info, shape_ref, ShapeKind::Picture)?;

    let slide_size = presentation.slide_size();
    let rect = match info.frame {
        Some(frame) => place_caption(frame, slide_size, single_image).0,
        None => fallback_rect(slide_size),
    };

    let slide_number = presentation.slides()[shape_ref.slide].number as usize;
    let text = caption_text(slide_number, description);

    let xml = presentation.slide_xml(shape_ref.slide)?;
    let shape_id = next_shape_id(xml)?;
    let caption = caption_shape_xml(shape_id, rect, &text);

    let xml_str = String::from_utf8_lossy(xml);
    let Some(insert_at) = xml_str.rfind("</p:spTree>") else {
        return Err(PptxError::InvalidStructure(
            "slide has no shape tree close tag".to_string(),
        ));
    };
    let mut new_xml = String::with_capacity(xml_str.len() + caption.len());
    new_xml.push_str(&xml_str[..insert_at]);
    new_xml.push_str(&caption);
    new_xml.push_str(&xml_str[insert_at..]);

    presentation.set_slide_xml(shape_ref.slide, new_xml.into_bytes())?;
    Ok(MutationResult {
        applied: true,
        shape: shape_ref,
        before: None,
        after: Some(text),
    })
}

// =========================================================================
// Streaming rewrite machinery
// =========================================================================

/// Rewrite one slide's XML, letting `transform` edit the buffered events of
/// the shape at `shape_index` while everything else streams through.
fn rewrite_shape<F>(xml: &[u8], shape_index: usize, transform: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut Vec<Event<'static>>) -> Result<()>,
{
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    let mut in_sp_tree = false;
    let mut depth = 0u32;
    let mut shape_counter = 0usize;
    let mut buffering = false;
    let mut buffered: Vec<Event<'static>> = Vec::new();
    let mut transform = Some(transform);

    loop {
        let event = reader.read_event_into(&mut buf)?.into_owned();
        buf.clear();

        let mut closes_target = false;
        match &event {
            Event::Eof => break,
            Event::Start(e) => {
                let name = e.local_name();
                let local = name.as_ref();
                if in_sp_tree && depth == 0 {
                    if is_shape_element(local) {
                        let index = shape_counter;
                        shape_counter += 1;
                        if index == shape_index {
                            buffering = true;
                        }
                    }
                    depth = 1;
                } else if in_sp_tree {
                    depth += 1;
                } else if local == b"spTree" {
                    in_sp_tree = true;
                }
            }
            Event::End(e) => {
                if in_sp_tree && depth > 0 {
                    depth -= 1;
                    closes_target = buffering && depth == 0;
                } else if in_sp_tree && e.local_name().as_ref() == b"spTree" {
                    in_sp_tree = false;
                }
            }
            _ => {}
        }

        if closes_target {
            buffered.push(event);
            buffering = false;
            if let Some(f) = transform.take() {
                f(&mut buffered)?;
            }
            for owned in buffered.drain(..) {
                writer.write_event(owned)?;
            }
        } else if buffering {
            buffered.push(event);
        } else {
            writer.write_event(event)?;
        }
    }

    if transform.is_some() {
        return Err(PptxError::ShapeNotFound {
            slide: 0,
            shape: shape_index,
        });
    }

    Ok(writer.into_inner().into_inner())
}

fn is_shape_element(local: &[u8]) -> bool {
    matches!(
        local,
        b"sp" | b"pic" | b"graphicFrame" | b"grpSp" | b"cxnSp" | b"contentPart"
    )
}

/// Rebuild an element with one attribute set or replaced
fn set_attribute(
    e: &BytesStart<'_>,
    key: &[u8],
    value: &str,
) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut new_elem = BytesStart::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() != key {
            new_elem.push_attribute(attr);
        }
    }
    new_elem.push_attribute((
        String::from_utf8_lossy(key).as_ref(),
        value,
    ));
    Ok(new_elem)
}

/// Indexes of `(start, end)` event pairs delimiting each `a:r` subtree
fn run_spans(events: &[Event<'static>]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"r" && open.is_none() => {
                open = Some(i);
            }
            Event::End(e) if e.local_name().as_ref() == b"r" => {
                if let Some(start) = open.take() {
                    spans.push((start, i));
                }
            }
            _ => {}
        }
    }
    spans
}

fn run_has_text(run_events: &[Event<'static>]) -> bool {
    run_events.iter().any(|event| match event {
        Event::Text(t) => t
            .unescape()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false),
        _ => false,
    })
}

/// Raise an rPr's `sz` attribute to `min_hundredths` if it declares a
/// smaller one; `None` when no change is needed
fn raise_sz(e: &BytesStart<'_>, min_hundredths: i64) -> Result<Option<BytesStart<'static>>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"sz" {
            if let Ok(current) = attr.unescape_value()?.parse::<i64>() {
                if current < min_hundredths {
                    return Ok(Some(set_attribute(e, b"sz", &min_hundredths.to_string())?));
                }
            }
            return Ok(None);
        }
    }
    Ok(None)
}

/// Flip an `srgbClr` toward black or white based on perceptual luminance;
/// `None` when the color is already on the right side
fn flip_color(
    e: &BytesStart<'_>,
    darken: bool,
    target_hex: &str,
) -> Result<Option<BytesStart<'static>>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"val" {
            let hex = attr.unescape_value()?;
            let Some(color) = Rgb::from_hex(&hex) else {
                return Ok(None);
            };
            let luminance = color.perceptual_luminance();
            let should_flip = (darken && luminance > 0.5) || (!darken && luminance < 0.5);
            if should_flip {
                return Ok(Some(set_attribute(e, b"val", target_hex)?));
            }
            return Ok(None);
        }
    }
    Ok(None)
}

/// Rewrite a shape's text body so its content is exactly `new_text`.
///
/// Returns `None` when the shape has no text body.
fn rewrite_text_body(
    events: &[Event<'static>],
    new_text: &str,
) -> Result<Option<Vec<Event<'static>>>> {
    if !events.iter().any(|event| {
        matches!(event, Event::Start(e) if e.local_name().as_ref() == b"txBody")
    }) {
        return Ok(None);
    }

    let mut out: Vec<Event<'static>> = Vec::with_capacity(events.len());
    let mut in_tx_body = false;
    let mut paragraph_seen = false;
    let mut in_first_paragraph = false;
    let mut run_written = false;
    // Depth of a subtree currently being skipped
    let mut skip_depth = 0u32;

    let mut iter = events.iter().peekable();
    while let Some(event) = iter.next() {
        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) if e.local_name().as_ref() == b"txBody" && !paragraph_seen => {
                in_tx_body = true;
                out.push(event.clone());
            }
            Event::Start(e) if in_tx_body && e.local_name().as_ref() == b"p" => {
                if paragraph_seen {
                    // Later paragraphs are dropped entirely
                    skip_depth = 1;
                    continue;
                }
                paragraph_seen = true;
                in_first_paragraph = true;
                out.push(event.clone());
            }
            Event::Start(e) if in_first_paragraph && e.local_name().as_ref() == b"r" => {
                if run_written {
                    skip_depth = 1;
                    continue;
                }
                run_written = true;
                out.push(event.clone());
                // Carry the first run's formatting through
                if let Some(Event::Start(next)) = iter.peek() {
                    if next.local_name().as_ref() == b"rPr" {
                        let mut depth = 0u32;
                        for inner in iter.by_ref() {
                            out.push(inner.clone());
                            match inner {
                                Event::Start(_) => depth += 1,
                                Event::End(_) => {
                                    depth -= 1;
                                    if depth == 0 {
                                        break;
                                    }
                                }
                                _ => {}
                            }
                        }
                    }
                }
                if let Some(Event::Empty(next)) = iter.peek() {
                    if next.local_name().as_ref() == b"rPr" {
                        out.push(iter.next().cloned().ok_or_else(|| {
                            PptxError::InvalidStructure("run ended unexpectedly".into())
                        })?);
                    }
                }
                push_text_element(&mut out, new_text);
                // Drop the run's original content
                let mut depth = 1u32;
                for inner in iter.by_ref() {
                    match inner {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => {
                            depth -= 1;
                            if depth == 0 {
                                out.push(inner.clone());
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::End(e) if in_first_paragraph && e.local_name().as_ref() == b"p" => {
                if !run_written {
                    // Paragraph had no runs; synthesize one
                    out.push(Event::Start(BytesStart::new("a:r")));
                    push_text_element(&mut out, new_text);
                    out.push(Event::End(BytesEnd::new("a:r")));
                    run_written = true;
                }
                in_first_paragraph = false;
                out.push(event.clone());
            }
            Event::Start(e)
                if in_first_paragraph
                    && run_written
                    && e.local_name().as_ref() != b"pPr" =>
            {
                // Anything after the rewritten run in paragraph one goes
                skip_depth = 1;
            }
            Event::Empty(e)
                if in_first_paragraph && run_written && e.local_name().as_ref() == b"br" => {}
            Event::End(e) if e.local_name().as_ref() == b"txBody" => {
                in_tx_body = false;
                out.push(event.clone());
            }
            _ => out.push(event.clone()),
        }
    }

    Ok(Some(out))
}

fn push_text_element(out: &mut Vec<Event<'static>>, text: &str) {
    out.push(Event::Start(BytesStart::new("a:t")));
    out.push(Event::Text(BytesText::new(text).into_owned()));
    out.push(Event::End(BytesEnd::new("a:t")));
}

/// Smallest unused shape id on a slide
fn next_shape_id(xml: &[u8]) -> Result<u32> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut max_id = 1u32;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"cNvPr" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"id" {
                        if let Ok(id) = attr.unescape_value()?.parse::<u32>() {
                            max_id = max_id.max(id);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(max_id + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{presentation_with_slides, slide_with_picture, slide_with_text_runs};

    #[test]
    fn test_update_alt_text_read_after_write() {
        let mut presentation =
            presentation_with_slides(&[slide_with_picture("rId2", None)]).unwrap();
        let shape_ref = ShapeRef::new(0, 0);

        let result = update_alt_text(&mut presentation, shape_ref, "A bar chart").unwrap();
        assert!(result.applied);
        assert_eq!(result.after.as_deref(), Some("A bar chart"));

        // Read-after-write within the same load
        let shape = presentation.shape(shape_ref).unwrap();
        assert_eq!(shape.alt_text.as_deref(), Some("A bar chart"));
    }

    #[test]
    fn test_update_alt_text_replaces_existing() {
        let mut presentation =
            presentation_with_slides(&[slide_with_picture("rId2", Some("old text"))]).unwrap();
        let result = update_alt_text(&mut presentation, ShapeRef::new(0, 0), "new text").unwrap();
        assert_eq!(result.before.as_deref(), Some("old text"));
        let shape = presentation.shape(ShapeRef::new(0, 0)).unwrap();
        assert_eq!(shape.alt_text.as_deref(), Some("new text"));
    }

    #[test]
    fn test_wrapper_element_does_not_shift_target() {
        // An extension wrapper carrying a nested sp sits between the spTree
        // and the picture; parser and rewriter must count it the same way
        let wrapper = format!(
            r#"<p:extLst><p:ext uri="{{F00}}">{}</p:ext></p:extLst>"#,
            crate::test_utils::text_shape_xml(&[("hidden", None)])
        );
        let mut presentation = presentation_with_slides(&[crate::test_utils::slide_with_shapes(
            &[wrapper, crate::test_utils::picture_shape_xml("rId2", None)],
        )])
        .unwrap();

        let shapes = presentation.shapes_of(0).unwrap();
        assert_eq!(shapes.len(), 1);

        update_alt_text(&mut presentation, ShapeRef::new(0, 0), "aligned").unwrap();
        let shape = presentation.shape(ShapeRef::new(0, 0)).unwrap();
        assert_eq!(shape.alt_text.as_deref(), Some("aligned"));
        assert_eq!(shape.kind, crate::shape::ShapeKind::Picture);
    }

    #[test]
    fn test_alt_text_requires_picture() {
        let mut presentation =
            presentation_with_slides(&[slide_with_text_runs(&[("hello", Some(1200))])]).unwrap();
        let err = update_alt_text(&mut presentation, ShapeRef::new(0, 0), "x").unwrap_err();
        assert!(matches!(err, PptxError::IncompatibleShape { .. }));
    }

    #[test]
    fn test_font_size_raise_only() {
        let mut presentation = presentation_with_slides(&[slide_with_text_runs(&[
            ("small", Some(1000)),
            ("large", Some(2400)),
        ])])
        .unwrap();
        let shape_ref = ShapeRef::new(0, 0);

        let result = update_font_size(&mut presentation, shape_ref, 18.0).unwrap();
        assert!(result.applied);

        let shape = presentation.shape(shape_ref).unwrap();
        // The small run was raised to exactly 18; the large run kept 24
        assert_eq!(shape.min_font_size_pt, Some(18.0));
        let xml = String::from_utf8_lossy(presentation.slide_xml(0).unwrap()).into_owned();
        assert!(xml.contains(r#"sz="1800""#));
        assert!(xml.contains(r#"sz="2400""#));
        assert!(!xml.contains(r#"sz="1000""#));
    }

    #[test]
    fn test_font_size_idempotent() {
        let mut presentation =
            presentation_with_slides(&[slide_with_text_runs(&[("small", Some(1000))])]).unwrap();
        let shape_ref = ShapeRef::new(0, 0);

        assert!(update_font_size(&mut presentation, shape_ref, 18.0)
            .unwrap()
            .applied);
        // Second application reports no change
        assert!(!update_font_size(&mut presentation, shape_ref, 18.0)
            .unwrap()
            .applied);
    }

    #[test]
    fn test_font_size_skips_empty_runs() {
        let mut presentation =
            presentation_with_slides(&[slide_with_text_runs(&[("   ", Some(800))])]).unwrap();
        let result = update_font_size(&mut presentation, ShapeRef::new(0, 0), 18.0).unwrap();
        assert!(!result.applied);
    }

    #[test]
    fn test_contrast_flips_light_text_to_black() {
        let slide = crate::test_utils::slide_with_colored_text("EEEEEE", Some(1800));
        let mut presentation = presentation_with_slides(&[slide]).unwrap();
        let result =
            update_text_contrast(&mut presentation, ShapeRef::new(0, 0), true).unwrap();
        assert!(result.applied);

        let xml = String::from_utf8_lossy(presentation.slide_xml(0).unwrap()).into_owned();
        assert!(xml.contains(r#"val="000000""#));
        assert!(!xml.contains("EEEEEE"));
    }

    #[test]
    fn test_contrast_skips_dark_text_when_darkening() {
        let slide = crate::test_utils::slide_with_colored_text("1A1A1A", Some(1800));
        let mut presentation = presentation_with_slides(&[slide]).unwrap();
        let result =
            update_text_contrast(&mut presentation, ShapeRef::new(0, 0), true).unwrap();
        assert!(!result.applied);
    }

    #[test]
    fn test_contrast_skips_runs_without_explicit_color() {
        let mut presentation =
            presentation_with_slides(&[slide_with_text_runs(&[("plain", Some(1800))])]).unwrap();
        let result =
            update_text_contrast(&mut presentation, ShapeRef::new(0, 0), true).unwrap();
        assert!(!result.applied);
    }

    #[test]
    fn test_update_text_replaces_content() {
        let mut presentation = presentation_with_slides(&[slide_with_text_runs(&[
            ("Original complicated sentence", Some(1400)),
            (" with two runs", Some(1400)),
        ])])
        .unwrap();
        let shape_ref = ShapeRef::new(0, 0);

        let result = update_text(&mut presentation, shape_ref, "Short and clear").unwrap();
        assert!(result.applied);
        assert_eq!(
            result.before.as_deref(),
            Some("Original complicated sentence with two runs")
        );

        let shape = presentation.shape(shape_ref).unwrap();
        assert_eq!(shape.text, "Short and clear");
        // First run's size survives the rewrite
        assert_eq!(shape.min_font_size_pt, Some(14.0));
    }

    #[test]
    fn test_update_text_noop_when_identical() {
        let mut presentation =
            presentation_with_slides(&[slide_with_text_runs(&[("same", Some(1400))])]).unwrap();
        let result = update_text(&mut presentation, ShapeRef::new(0, 0), "same").unwrap();
        assert!(!result.applied);
    }

    #[test]
    fn test_add_caption_appends_shape() {
        let mut presentation =
            presentation_with_slides(&[slide_with_picture("rId2", Some("alt"))]).unwrap();
        let shape_ref = ShapeRef::new(0, 0);
        let before_count = presentation.shapes_of(0).unwrap().len();

        let result =
            add_visible_caption(&mut presentation, shape_ref, "A network diagram", false)
                .unwrap();
        assert!(result.applied);
        assert!(result.after.as_deref().unwrap().starts_with("Image Description"));

        let shapes = presentation.shapes_of(0).unwrap();
        assert_eq!(shapes.len(), before_count + 1);
        let caption = shapes.last().unwrap();
        assert_eq!(caption.kind, ShapeKind::Text);
        assert!(caption.text.contains("A network diagram"));

        // Caption stays inside the slide
        let (slide_w, slide_h) = presentation.slide_size();
        let frame = caption.frame.unwrap();
        assert!(frame.right() <= slide_w);
        assert!(frame.bottom() <= slide_h);
    }

    #[test]
    fn test_mutations_preserve_untouched_shapes() {
        let mut presentation = presentation_with_slides(&[crate::test_utils::slide_with_shapes(
            &[
                crate::test_utils::text_shape_xml(&[("Keep me", Some(900))]),
                crate::test_utils::picture_shape_xml("rId2", None),
            ],
        )])
        .unwrap();

        update_alt_text(&mut presentation, ShapeRef::new(0, 1), "desc").unwrap();

        let text_shape = presentation.shape(ShapeRef::new(0, 0)).unwrap();
        assert_eq!(text_shape.text, "Keep me");
        assert_eq!(text_shape.min_font_size_pt, Some(9.0));
    }

    #[test]
    fn test_next_shape_id() {
        let mut presentation =
            presentation_with_slides(&[slide_with_picture("rId2", None)]).unwrap();
        let xml = presentation.slide_xml(0).unwrap();
        let id = next_shape_id(xml).unwrap();
        assert!(id > 1);

        // Adding a caption bumps the next id
        add_visible_caption(&mut presentation, ShapeRef::new(0, 0), "x", false).unwrap();
        let next = next_shape_id(presentation.slide_xml(0).unwrap()).unwrap();
        assert_eq!(next, id + 1);
    }
}
