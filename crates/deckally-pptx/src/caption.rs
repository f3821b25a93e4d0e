//! Caption placement geometry and markup.
//!
//! Captions are visible text boxes positioned relative to the image they
//! describe. Placement is deterministic: below the image when there is
//! room, then above, then beside on whichever side is wider. Every result
//! is clamped to the slide bounds, so a caption can never hang off an edge.

use quick_xml::escape::escape;

use crate::shape::{inches_to_emu, Rect};

/// Gap between the image and its caption
const CAPTION_GAP_IN: f64 = 0.05;

/// Caption box height for above/below placement
const CAPTION_HEIGHT_IN: f64 = 0.4;

/// Margin kept from slide edges by the fallback strip
const FALLBACK_MARGIN_IN: f64 = 0.5;

/// Height of the fallback strip
const FALLBACK_HEIGHT_IN: f64 = 0.75;

/// Captions longer than this many characters are truncated
pub const MAX_CAPTION_CHARS: usize = 150;

/// Caption fill color (light beige)
const CAPTION_FILL: &str = "F5F5DC";

/// Caption border color (gray)
const CAPTION_BORDER: &str = "646464";

/// Where a caption ended up relative to its image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSlot {
    Below,
    Above,
    Left,
    Right,
}

/// Compute a caption rectangle for an image.
///
/// Single-image slides always place below, clamped upward into the slide if
/// the image runs to the bottom edge; their caption is considered too
/// important to push aside.
pub fn place_caption(
    image: Rect,
    slide: (i64, i64),
    single_image: bool,
) -> (Rect, CaptionSlot) {
    let (slide_w, slide_h) = slide;
    let gap = inches_to_emu(CAPTION_GAP_IN);
    let height = inches_to_emu(CAPTION_HEIGHT_IN);

    if single_image {
        let max_y = slide_h - inches_to_emu(CAPTION_HEIGHT_IN + CAPTION_GAP_IN);
        let y = (image.bottom() + gap).min(max_y);
        let rect = Rect::new(image.x, y, image.w, height).clamped(slide_w, slide_h);
        return (rect, CaptionSlot::Below);
    }

    // Below
    if image.bottom() + gap + height <= slide_h {
        let rect =
            Rect::new(image.x, image.bottom() + gap, image.w, height).clamped(slide_w, slide_h);
        return (rect, CaptionSlot::Below);
    }

    // Above
    if image.y - gap - height >= 0 {
        let rect =
            Rect::new(image.x, image.y - gap - height, image.w, height).clamped(slide_w, slide_h);
        return (rect, CaptionSlot::Above);
    }

    // Beside, on whichever side has more room
    let left_space = image.x;
    let right_space = slide_w - image.right();
    let side_height = image.h.min(inches_to_emu(2.0)).max(height);
    if left_space >= right_space {
        let width = (left_space - gap).max(inches_to_emu(0.5));
        let rect =
            Rect::new(image.x - gap - width, image.y, width, side_height).clamped(slide_w, slide_h);
        (rect, CaptionSlot::Left)
    } else {
        let width = (right_space - gap).max(inches_to_emu(0.5));
        let rect =
            Rect::new(image.right() + gap, image.y, width, side_height).clamped(slide_w, slide_h);
        (rect, CaptionSlot::Right)
    }
}

/// Fixed-position fallback: a strip along the bottom of the slide.
///
/// Used when the image has no usable frame or the primary placement fails
/// partway; trades layout quality for reliability.
pub fn fallback_rect(slide: (i64, i64)) -> Rect {
    let (slide_w, slide_h) = slide;
    let margin = inches_to_emu(FALLBACK_MARGIN_IN);
    let height = inches_to_emu(FALLBACK_HEIGHT_IN);
    Rect::new(
        margin,
        slide_h - height - margin,
        slide_w - 2 * margin,
        height,
    )
    .clamped(slide_w, slide_h)
}

/// Build the caption's display text: the caption marker, originating slide
/// number, and the description truncated to [`MAX_CAPTION_CHARS`]
pub fn caption_text(slide_number: usize, description: &str) -> String {
    let description = description.trim();
    let truncated = if description.chars().count() > MAX_CAPTION_CHARS {
        let cut: String = description.chars().take(MAX_CAPTION_CHARS).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    };
    format!("Image Description (slide {}): {}", slide_number, truncated)
}

/// Render a caption text-box shape: bordered, tinted background,
/// center-aligned bold text
pub fn caption_shape_xml(shape_id: u32, rect: Rect, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Caption {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{w}" cy="{h}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:solidFill><a:srgbClr val="{fill}"/></a:solidFill><a:ln w="12700"><a:solidFill><a:srgbClr val="{border}"/></a:solidFill></a:ln></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="1400" b="1"><a:solidFill><a:srgbClr val="000000"/></a:solidFill><a:latin typeface="Calibri"/></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id = shape_id,
        x = rect.x,
        y = rect.y,
        w = rect.w,
        h = rect.h,
        fill = CAPTION_FILL,
        border = CAPTION_BORDER,
        text = escape(text),
    )
}
