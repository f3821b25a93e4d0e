//! Shape classification, handles, and geometry.
//!
//! Shapes are classified once at parse time into a closed set of kinds; each
//! mutation declares the kind it requires and fails explicitly on a mismatch
//! instead of probing the XML again.

/// English Metric Units per inch
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per point
pub const EMU_PER_POINT: i64 = 12_700;

/// Convert inches to EMU
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert EMU to inches
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// What kind of content a shape carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A shape with a text frame
    Text,
    /// A picture
    Picture,
    /// A table inside a graphic frame
    Table,
    /// Anything else (connectors, group shapes, charts, media)
    Other,
}

impl ShapeKind {
    /// The slide-XML element that introduces this kind of shape
    pub fn ooxml_tag(&self) -> &'static str {
        match self {
            Self::Text => "p:sp",
            Self::Picture => "p:pic",
            Self::Table => "p:graphicFrame",
            Self::Other => "",
        }
    }

    /// Short name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Picture => "picture",
            Self::Table => "table",
            Self::Other => "other",
        }
    }
}

/// Opaque handle to one shape in a loaded presentation.
///
/// Valid only for the [`Presentation`](crate::presentation::Presentation)
/// it was extracted from; reloading the document invalidates every handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeRef {
    /// Zero-based slide index
    pub slide: usize,
    /// Zero-based position among the slide's top-level shapes
    pub shape: usize,
}

impl ShapeRef {
    pub fn new(slide: usize, shape: usize) -> Self {
        Self { slide, shape }
    }
}

/// An axis-aligned rectangle in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }

    /// Clamp this rectangle so it lies entirely within `(0,0)..(bound_w, bound_h)`.
    ///
    /// Position is adjusted first; if the rectangle is larger than the bound
    /// it is shrunk to fit.
    pub fn clamped(self, bound_w: i64, bound_h: i64) -> Rect {
        let w = self.w.min(bound_w);
        let h = self.h.min(bound_h);
        let x = self.x.clamp(0, bound_w - w);
        let y = self.y.clamp(0, bound_h - h);
        Rect { x, y, w, h }
    }
}

/// Parsed summary of one top-level shape.
///
/// Holds everything extraction and scoring need so the slide XML is only
/// re-walked when a mutation rewrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    pub kind: ShapeKind,
    /// Shape name from its non-visual properties
    pub name: String,
    /// `descr` attribute from the non-visual properties, if present
    pub alt_text: Option<String>,
    /// `title` attribute from the non-visual properties, if present
    pub title: Option<String>,
    /// Relationship id of the picture's media part
    pub media_rel_id: Option<String>,
    /// Concatenated run text, in run order
    pub text: String,
    /// Minimum declared run size in points across non-empty runs
    pub min_font_size_pt: Option<f32>,
    /// Offset/extent from the shape's transform, if declared
    pub frame: Option<Rect>,
}

impl ShapeInfo {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            name: String::new(),
            alt_text: None,
            title: None,
            media_rel_id: None,
            text: String::new(),
            min_font_size_pt: None,
            frame: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_conversions() {
        assert_eq!(inches_to_emu(1.0), EMU_PER_INCH);
        assert_eq!(inches_to_emu(0.5), 457_200);
        assert!((emu_to_inches(914_400) - 1.0).abs() < 1e-9);
        // A point is 1/72 inch
        assert_eq!(EMU_PER_POINT * 72, EMU_PER_INCH);
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
    }

    #[test]
    fn test_rect_clamping() {
        let bound = (1000, 800);

        // Hanging off the right/bottom edges: shifted back in
        let r = Rect::new(950, 790, 100, 50).clamped(bound.0, bound.1);
        assert_eq!(r, Rect::new(900, 750, 100, 50));

        // Negative position: shifted to origin
        let r = Rect::new(-5, -5, 100, 50).clamped(bound.0, bound.1);
        assert_eq!(r, Rect::new(0, 0, 100, 50));

        // Larger than the bound: shrunk
        let r = Rect::new(0, 0, 2000, 50).clamped(bound.0, bound.1);
        assert_eq!(r.w, 1000);
        assert_eq!(r.right(), 1000);
    }

    #[test]
    fn test_shape_kind_tags() {
        assert_eq!(ShapeKind::Text.ooxml_tag(), "p:sp");
        assert_eq!(ShapeKind::Picture.ooxml_tag(), "p:pic");
        assert_eq!(ShapeKind::Table.ooxml_tag(), "p:graphicFrame");
    }
}
