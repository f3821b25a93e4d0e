//! The presentation document model.
//!
//! A [`Presentation`] owns the unpacked archive plus a parsed shape table
//! per slide. The raw slide XML is retained verbatim; mutations rewrite it
//! with a streaming pass (see [`mutate`](crate::mutate)), so any markup the
//! pipeline never touches passes through byte-for-byte. After any rewrite
//! the slide's shape table is reparsed, keeping handles consistent with
//! what a reload from disk would produce.

use std::io::{Read, Seek, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::archive::PptxArchive;
use crate::error::{PptxError, Result};
use crate::shape::{Rect, ShapeInfo, ShapeKind, ShapeRef};

/// Default slide size (16:9, 13.333 x 7.5 in) when the presentation part
/// does not declare one
const DEFAULT_SLIDE_SIZE: (i64, i64) = (12_192_000, 6_858_000);

/// One slide: its part number, raw XML, and parsed shape table
#[derive(Debug)]
pub struct Slide {
    /// One-based part number (slideN.xml)
    pub number: u32,
    /// Raw slide XML as stored in the archive
    xml: Vec<u8>,
    /// Top-level shapes in document order
    shapes: Vec<ShapeInfo>,
}

impl Slide {
    pub fn xml(&self) -> &[u8] {
        &self.xml
    }

    pub fn shapes(&self) -> &[ShapeInfo] {
        &self.shapes
    }
}

/// A loaded presentation
#[derive(Debug)]
pub struct Presentation {
    archive: PptxArchive,
    slide_size: (i64, i64),
    slides: Vec<Slide>,
}

impl Presentation {
    /// Load a presentation from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let archive = PptxArchive::open(path)?;
        Self::from_archive(archive)
    }

    /// Load a presentation from any reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let archive = PptxArchive::from_reader(reader)?;
        Self::from_archive(archive)
    }

    /// Build the model from an unpacked archive
    pub fn from_archive(archive: PptxArchive) -> Result<Self> {
        let slide_size = parse_slide_size(archive.presentation_xml()?)?;

        let mut slides = Vec::new();
        for number in archive.slide_numbers() {
            let xml = archive
                .slide_xml(number)
                .ok_or_else(|| PptxError::MissingFile(format!("ppt/slides/slide{}.xml", number)))?
                .to_vec();
            let shapes = parse_slide_shapes(&xml)?;
            slides.push(Slide {
                number,
                xml,
                shapes,
            });
        }

        log::debug!(
            "loaded presentation: {} slides, slide size {}x{} EMU",
            slides.len(),
            slide_size.0,
            slide_size.1
        );

        Ok(Self {
            archive,
            slide_size,
            slides,
        })
    }

    /// Slide size in EMU (width, height)
    pub fn slide_size(&self) -> (i64, i64) {
        self.slide_size
    }

    /// Number of slides
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// All slides in presentation order
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Shapes of one slide, in document order
    pub fn shapes_of(&self, slide_index: usize) -> Result<&[ShapeInfo]> {
        self.slides
            .get(slide_index)
            .map(|s| s.shapes.as_slice())
            .ok_or_else(|| PptxError::InvalidStructure(format!("no slide {}", slide_index)))
    }

    /// Resolve a shape handle
    pub fn shape(&self, shape_ref: ShapeRef) -> Result<&ShapeInfo> {
        self.slides
            .get(shape_ref.slide)
            .and_then(|s| s.shapes.get(shape_ref.shape))
            .ok_or(PptxError::ShapeNotFound {
                slide: shape_ref.slide,
                shape: shape_ref.shape,
            })
    }

    /// Raw XML of one slide
    pub fn slide_xml(&self, slide_index: usize) -> Result<&[u8]> {
        self.slides
            .get(slide_index)
            .map(|s| s.xml.as_slice())
            .ok_or_else(|| PptxError::InvalidStructure(format!("no slide {}", slide_index)))
    }

    /// Resolve a relationship id on a slide to a media part path.
    ///
    /// Relationship targets are relative to `ppt/slides/`; the usual
    /// `../media/imageN.ext` resolves to `ppt/media/imageN.ext`.
    pub fn media_path_for(&self, slide_index: usize, rel_id: &str) -> Result<Option<String>> {
        let slide = self
            .slides
            .get(slide_index)
            .ok_or_else(|| PptxError::InvalidStructure(format!("no slide {}", slide_index)))?;

        let Some(rels) = self.archive.slide_rels_xml(slide.number) else {
            return Ok(None);
        };
        let Some(target) = find_relationship_target(rels, rel_id)? else {
            return Ok(None);
        };

        let resolved = if let Some(stripped) = target.strip_prefix("../") {
            format!("ppt/{}", stripped)
        } else if target.starts_with('/') {
            target.trim_start_matches('/').to_string()
        } else {
            format!("ppt/slides/{}", target)
        };
        Ok(Some(resolved))
    }

    /// Raw bytes of a media part
    pub fn media_bytes(&self, path: &str) -> Option<&[u8]> {
        self.archive.get(path)
    }

    /// Replace one slide's XML and reparse its shape table.
    ///
    /// Handles into this slide stay valid as long as the rewrite preserved
    /// the top-level shape order, which every mutation in this crate does
    /// (captions append, nothing reorders or deletes).
    pub fn set_slide_xml(&mut self, slide_index: usize, xml: Vec<u8>) -> Result<()> {
        let shapes = parse_slide_shapes(&xml)?;
        let slide = self
            .slides
            .get_mut(slide_index)
            .ok_or_else(|| PptxError::InvalidStructure(format!("no slide {}", slide_index)))?;
        self.archive
            .set(format!("ppt/slides/slide{}.xml", slide.number), xml.clone());
        slide.xml = xml;
        slide.shapes = shapes;
        Ok(())
    }

    /// Save the presentation to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.archive.write_to_file(path)
    }

    /// Write the presentation to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        self.archive.write_to(writer)
    }
}

/// Parse `p:sldSz` from the presentation part
fn parse_slide_size(xml: &[u8]) -> Result<(i64, i64)> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldSz" => {
                let mut cx = None;
                let mut cy = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"cx" => cx = attr.unescape_value()?.parse::<i64>().ok(),
                        b"cy" => cy = attr.unescape_value()?.parse::<i64>().ok(),
                        _ => {}
                    }
                }
                if let (Some(cx), Some(cy)) = (cx, cy) {
                    return Ok((cx, cy));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::debug!("presentation part declares no slide size, assuming 16:9");
    Ok(DEFAULT_SLIDE_SIZE)
}

/// Find a relationship target by id in a rels part
fn find_relationship_target(xml: &[u8], rel_id: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rel_id) {
                    return Ok(target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(None)
}

/// Parse the top-level shapes of a slide.
///
/// Walks the shape tree (`p:spTree`) and summarizes each direct child that
/// is a text shape, picture, or graphic frame. Group shapes and anything
/// else become [`ShapeKind::Other`] so their positions in the shape table
/// stay aligned with the XML document order.
pub(crate) fn parse_slide_shapes(xml: &[u8]) -> Result<Vec<ShapeInfo>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut shapes = Vec::new();
    let mut in_sp_tree = false;
    // Depth within the current top-level shape subtree; 0 = between shapes
    let mut shape_depth = 0u32;
    let mut current: Option<ShapeBuilder> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) => {
                let local = e.local_name().as_ref().to_vec();
                if !in_sp_tree {
                    if local == b"spTree" {
                        in_sp_tree = true;
                    }
                } else if shape_depth == 0 {
                    // Every spTree child opens a depth-1 subtree, shape or not
                    // (nvGrpSpPr, grpSpPr, extension wrappers). Only recognized
                    // shape elements get a builder, so table indices stay in
                    // step with the mutation rewriter's counting.
                    if let Some(kind) = top_level_kind(&local) {
                        current = Some(ShapeBuilder::new(kind));
                    }
                    shape_depth = 1;
                } else {
                    shape_depth += 1;
                    if let Some(builder) = current.as_mut() {
                        builder.on_element(&local, e)?;
                    }
                }
            }
            Event::Empty(ref e) => {
                if in_sp_tree && shape_depth > 0 {
                    let local = e.local_name().as_ref().to_vec();
                    if let Some(builder) = current.as_mut() {
                        builder.on_element(&local, e)?;
                    }
                }
            }
            Event::Text(ref t) => {
                if shape_depth > 0 {
                    if let Some(builder) = current.as_mut() {
                        if builder.in_text_run {
                            builder.push_text(&t.unescape()?);
                        }
                    }
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                let local = name.as_ref();
                if in_sp_tree && shape_depth > 0 {
                    shape_depth -= 1;
                    if let Some(builder) = current.as_mut() {
                        builder.on_element_end(local);
                    }
                    if shape_depth == 0 {
                        if let Some(builder) = current.take() {
                            shapes.push(builder.finish());
                        }
                    }
                } else if in_sp_tree && local == b"spTree" {
                    in_sp_tree = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

fn top_level_kind(local: &[u8]) -> Option<ShapeKind> {
    match local {
        b"sp" => Some(ShapeKind::Text),
        b"pic" => Some(ShapeKind::Picture),
        b"graphicFrame" => Some(ShapeKind::Table),
        b"grpSp" | b"cxnSp" | b"contentPart" => Some(ShapeKind::Other),
        _ => None,
    }
}

/// Accumulates one shape's summary during the streaming parse
struct ShapeBuilder {
    info: ShapeInfo,
    /// Paragraph texts collected so far
    paragraphs: Vec<String>,
    /// Whether a text body (a:txBody) has been seen
    has_text_body: bool,
    /// Inside an a:t element
    in_text_run: bool,
    /// Size declared by the current run's a:rPr, pending until its text
    pending_run_size: Option<f32>,
    /// First cNvPr in the subtree is the shape's own
    seen_cnvpr: bool,
    frame_x: Option<i64>,
    frame_y: Option<i64>,
    frame_w: Option<i64>,
    frame_h: Option<i64>,
}

impl ShapeBuilder {
    fn new(kind: ShapeKind) -> Self {
        Self {
            info: ShapeInfo::new(kind),
            paragraphs: Vec::new(),
            has_text_body: false,
            in_text_run: false,
            pending_run_size: None,
            seen_cnvpr: false,
            frame_x: None,
            frame_y: None,
            frame_w: None,
            frame_h: None,
        }
    }

    fn on_element(&mut self, local: &[u8], e: &quick_xml::events::BytesStart<'_>) -> Result<()> {
        match local {
            b"cNvPr" if !self.seen_cnvpr => {
                self.seen_cnvpr = true;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"name" => self.info.name = attr.unescape_value()?.into_owned(),
                        b"descr" => {
                            self.info.alt_text = Some(attr.unescape_value()?.into_owned())
                        }
                        b"title" => self.info.title = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
            }
            b"blip" if self.info.media_rel_id.is_none() => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.local_name().as_ref() == b"embed" {
                        self.info.media_rel_id = Some(attr.unescape_value()?.into_owned());
                    }
                }
            }
            b"off" if self.frame_x.is_none() => {
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"x" => self.frame_x = attr.unescape_value()?.parse().ok(),
                        b"y" => self.frame_y = attr.unescape_value()?.parse().ok(),
                        _ => {}
                    }
                }
            }
            b"ext" if self.frame_w.is_none() => {
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"cx" => self.frame_w = attr.unescape_value()?.parse().ok(),
                        b"cy" => self.frame_h = attr.unescape_value()?.parse().ok(),
                        _ => {}
                    }
                }
            }
            b"txBody" => {
                self.has_text_body = true;
            }
            b"p" if self.has_text_body => {
                self.paragraphs.push(String::new());
            }
            b"rPr" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"sz" {
                        // Hundredths of a point
                        if let Ok(hundredths) = attr.unescape_value()?.parse::<i64>() {
                            self.pending_run_size = Some(hundredths as f32 / 100.0);
                        }
                    }
                }
            }
            b"t" => {
                self.in_text_run = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_element_end(&mut self, local: &[u8]) {
        match local {
            b"t" => self.in_text_run = false,
            b"r" => self.pending_run_size = None,
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraphs.last_mut() {
            paragraph.push_str(text);
        } else {
            self.paragraphs.push(text.to_string());
        }
        if !text.trim().is_empty() {
            if let Some(size) = self.pending_run_size {
                self.info.min_font_size_pt = Some(match self.info.min_font_size_pt {
                    Some(current) => current.min(size),
                    None => size,
                });
            }
        }
    }

    fn finish(mut self) -> ShapeInfo {
        self.info.text = self.paragraphs.join("\n");
        if let (Some(x), Some(y), Some(w), Some(h)) =
            (self.frame_x, self.frame_y, self.frame_w, self.frame_h)
        {
            self.info.frame = Some(Rect::new(x, y, w, h));
        }
        self.info
    }
}
