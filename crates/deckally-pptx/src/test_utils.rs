//! Shared test utilities for deckally-pptx
//!
//! Builders for minimal in-memory PPTX archives: slide XML fragments for
//! text shapes and pictures, plus a complete archive wrapper with the
//! package parts a real producer would emit.

use std::io::Cursor;

use image::{Rgb, RgbImage};

use crate::archive::PptxArchive;
use crate::error::Result;
use crate::presentation::Presentation;

const SLIDE_NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// A 2x2 red PNG
pub fn tiny_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Bytes with a placeable WMF header
pub fn wmf_bytes() -> Vec<u8> {
    let mut bytes = vec![0xD7, 0xCD, 0xC6, 0x9A];
    bytes.extend_from_slice(&[0u8; 60]);
    bytes
}

/// A text shape with one paragraph of runs; sizes are in hundredths of a
/// point, `None` leaves the run without a declared size
pub fn text_shape_xml(runs: &[(&str, Option<u32>)]) -> String {
    let mut run_xml = String::new();
    for (text, size) in runs {
        match size {
            Some(sz) => run_xml.push_str(&format!(
                r#"<a:r><a:rPr lang="en-US" sz="{}"/><a:t>{}</a:t></a:r>"#,
                sz, text
            )),
            None => run_xml.push_str(&format!(r#"<a:r><a:t>{}</a:t></a:r>"#, text)),
        }
    }
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="4572000" cy="914400"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p>{}</a:p></p:txBody></p:sp>"#,
        run_xml
    )
}

/// A text shape whose single run declares a solid sRGB color
pub fn colored_text_shape_xml(hex: &str, size: Option<u32>) -> String {
    let sz_attr = size.map(|sz| format!(r#" sz="{}""#, sz)).unwrap_or_default();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="4572000" cy="914400"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"{}><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>Colored text</a:t></a:r></a:p></p:txBody></p:sp>"#,
        sz_attr, hex
    )
}

/// A picture shape referencing a media relationship
pub fn picture_shape_xml(rel_id: &str, descr: Option<&str>) -> String {
    let descr_attr = descr
        .map(|d| format!(r#" descr="{}""#, d))
        .unwrap_or_default();
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Picture 2"{}/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/></p:blipFill><p:spPr><a:xfrm><a:off x="2286000" y="1143000"/><a:ext cx="3048000" cy="2286000"/></a:xfrm></p:spPr></p:pic>"#,
        descr_attr, rel_id
    )
}

/// Wrap shape fragments into a complete slide part
pub fn slide_with_shapes(shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {ns}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm></p:grpSpPr>{shapes}</p:spTree></p:cSld></p:sld>"#,
        ns = SLIDE_NAMESPACES,
        shapes = shapes.concat(),
    )
}

/// A slide with a single text shape
pub fn slide_with_text_runs(runs: &[(&str, Option<u32>)]) -> String {
    slide_with_shapes(&[text_shape_xml(runs)])
}

/// A slide with a single picture
pub fn slide_with_picture(rel_id: &str, descr: Option<&str>) -> String {
    slide_with_shapes(&[picture_shape_xml(rel_id, descr)])
}

/// A slide with a single colored text shape
pub fn slide_with_colored_text(hex: &str, size: Option<u32>) -> String {
    slide_with_shapes(&[colored_text_shape_xml(hex, size)])
}

/// Build a complete in-memory PPTX from slide parts and media files.
///
/// Every slide gets a rels part mapping `rId2` to the first media file.
pub fn minimal_pptx(slides: &[String], media: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut archive = PptxArchive::new();

    archive.set_string(
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="wmf" ContentType="image/x-wmf"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#,
    );

    archive.set_string(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#,
    );

    let slide_rels: String = (1..=slides.len())
        .map(|n| format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            n + 1, n
        ))
        .collect();
    archive.set_string(
        "ppt/_rels/presentation.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            slide_rels
        ),
    );

    archive.set_string(
        "ppt/presentation.xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#,
    );

    for (i, slide) in slides.iter().enumerate() {
        let number = i + 1;
        archive.set_string(format!("ppt/slides/slide{}.xml", number), slide.clone());

        let media_rel = media.first().map(|(name, _)| {
            format!(
                r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/{}"/>"#,
                name
            )
        });
        archive.set_string(
            format!("ppt/slides/_rels/slide{}.xml.rels", number),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                media_rel.unwrap_or_default()
            ),
        );
    }

    for (name, bytes) in media {
        archive.set(format!("ppt/media/{}", name), bytes.clone());
    }

    let mut buffer = Cursor::new(Vec::new());
    archive.write_to(&mut buffer).unwrap();
    buffer.into_inner()
}

/// Load a presentation built from slide parts, with a default PNG media part
pub fn presentation_with_slides(slides: &[String]) -> Result<Presentation> {
    let bytes = minimal_pptx(slides, &[("image1.png", tiny_png())]);
    Presentation::from_reader(Cursor::new(bytes))
}

/// Load a presentation whose only media part is a WMF metafile
pub fn presentation_with_wmf(slides: &[String]) -> Result<Presentation> {
    let bytes = minimal_pptx(slides, &[("image1.wmf", wmf_bytes())]);
    Presentation::from_reader(Cursor::new(bytes))
}
