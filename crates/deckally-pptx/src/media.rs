//! Image classification and media materialization.
//!
//! Media parts in a PPTX can be modern rasters (PNG, JPEG, ...) or legacy
//! vector metafiles (WMF, EMF) that common raster libraries cannot decode.
//! Classification sniffs magic bytes before asking the raster decoder, since
//! mistaking a metafile for a raster crashes downstream consumers. Legacy
//! vectors get a placeholder raster instead of a real conversion; the
//! placeholder is tagged so reporting never mistakes it for a faithful
//! rendering.

use std::path::{Path, PathBuf};

use image::{ImageFormat as RasterFormat, Rgb, RgbImage};
use tempfile::TempDir;

use crate::error::Result;

/// WMF placeable header magic
const WMF_PLACEABLE_MAGIC: [u8; 4] = [0xD7, 0xCD, 0xC6, 0x9A];

/// WMF standard (non-placeable) header: type=1 (memory metafile would be 0),
/// header size = 9 words
const WMF_STANDARD_MAGIC: [u8; 4] = [0x01, 0x00, 0x09, 0x00];

/// EMF record type 1 (EMR_HEADER)
const EMF_RECORD_MAGIC: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// " EMF" signature at offset 40 of an EMF header
const EMF_SIGNATURE: &[u8; 4] = b" EMF";

/// Placeholder canvas dimensions in pixels
const PLACEHOLDER_SIZE: (u32, u32) = (400, 200);

/// Placeholder background (a light neutral gray)
const PLACEHOLDER_BACKGROUND: Rgb<u8> = Rgb([0xF8, 0xF9, 0xFA]);

/// Placeholder border color
const PLACEHOLDER_BORDER: Rgb<u8> = Rgb([0xAD, 0xB5, 0xBD]);

/// How a media part's bytes classify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClass {
    /// Decodable by the raster library
    Raster(RasterFormat),
    /// A legacy vector metafile needing conversion
    LegacyVector(LegacyVectorKind),
    /// Carries a known raster signature but the body does not decode
    Corrupt(RasterFormat),
    /// Neither a known raster nor a known metafile
    Unknown,
}

/// The two legacy metafile families special-cased by classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyVectorKind {
    Wmf,
    Emf,
}

impl LegacyVectorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wmf => "WMF",
            Self::Emf => "EMF",
        }
    }
}

/// Classify raw image bytes.
///
/// Metafile signatures are checked first and take priority over the raster
/// library's own sniffing. A recognized signature is not trusted on its own:
/// the body must actually decode, so a PNG header followed by garbage
/// classifies as [`ImageClass::Corrupt`] instead of a usable raster.
pub fn classify_image(bytes: &[u8]) -> ImageClass {
    if let Some(kind) = sniff_legacy_vector(bytes) {
        return ImageClass::LegacyVector(kind);
    }
    let Ok(format) = image::guess_format(bytes) else {
        return ImageClass::Unknown;
    };
    match image::load_from_memory(bytes) {
        Ok(_) => ImageClass::Raster(format),
        Err(err) => match reclassify_decode_failure(&err) {
            Some(kind) => ImageClass::LegacyVector(kind),
            None => ImageClass::Corrupt(format),
        },
    }
}

/// Metafiles occasionally travel inside another container; a decode error
/// naming WMF or EMF is treated as a legacy vector sighting.
fn reclassify_decode_failure(err: &image::ImageError) -> Option<LegacyVectorKind> {
    let text = err.to_string();
    if text.contains("WMF") {
        Some(LegacyVectorKind::Wmf)
    } else if text.contains("EMF") {
        Some(LegacyVectorKind::Emf)
    } else {
        None
    }
}

/// Detect WMF/EMF by magic bytes
pub fn sniff_legacy_vector(bytes: &[u8]) -> Option<LegacyVectorKind> {
    if bytes.len() >= 4
        && (bytes[..4] == WMF_PLACEABLE_MAGIC || bytes[..4] == WMF_STANDARD_MAGIC)
    {
        return Some(LegacyVectorKind::Wmf);
    }
    if bytes.len() >= 44 && bytes[..4] == EMF_RECORD_MAGIC && &bytes[40..44] == EMF_SIGNATURE {
        return Some(LegacyVectorKind::Emf);
    }
    None
}

/// File extension for a raster format, for materialized file names
fn raster_extension(format: RasterFormat) -> &'static str {
    match format {
        RasterFormat::Png => "png",
        RasterFormat::Jpeg => "jpg",
        RasterFormat::Gif => "gif",
        RasterFormat::Bmp => "bmp",
        RasterFormat::Tiff => "tiff",
        RasterFormat::WebP => "webp",
        _ => "img",
    }
}

/// A materialized media part
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedImage {
    /// Path of the raster file on disk, when one could be produced
    pub raster_path: Option<PathBuf>,
    /// Human-readable warning when the bytes were not a plain raster
    pub format_warning: Option<String>,
    /// The raster at `raster_path` is a placeholder, not a conversion
    pub converted_from_legacy_vector: bool,
}

/// Scoped directory of extracted media, removed on drop.
///
/// Describers work on files, not in-memory byte slices, so each processing
/// run extracts the media parts it needs into its own temporary directory.
#[derive(Debug)]
pub struct MediaStore {
    dir: TempDir,
    counter: u32,
}

impl MediaStore {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        log::debug!("media store at {}", dir.path().display());
        Ok(Self { dir, counter: 0 })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Classify media bytes and write a usable raster file.
    ///
    /// - Decodable rasters are written out unchanged.
    /// - Legacy vectors get a placeholder canvas and a warning.
    /// - Corrupt or unknown bytes produce no file, only a warning.
    pub fn materialize(&mut self, bytes: &[u8]) -> Result<MaterializedImage> {
        match classify_image(bytes) {
            ImageClass::Raster(format) => {
                let path = self.next_path(raster_extension(format));
                std::fs::write(&path, bytes)?;
                Ok(MaterializedImage {
                    raster_path: Some(path),
                    format_warning: None,
                    converted_from_legacy_vector: false,
                })
            }
            ImageClass::LegacyVector(kind) => {
                let path = self.next_path("png");
                write_placeholder_canvas(&path)?;
                Ok(MaterializedImage {
                    raster_path: Some(path),
                    format_warning: Some(format!(
                        "{} is a legacy vector format; a placeholder raster was substituted",
                        kind.name()
                    )),
                    converted_from_legacy_vector: true,
                })
            }
            ImageClass::Corrupt(format) => Ok(MaterializedImage {
                raster_path: None,
                format_warning: Some(format!(
                    "{:?} signature but the image data did not decode",
                    format
                )),
                converted_from_legacy_vector: false,
            }),
            ImageClass::Unknown => Ok(MaterializedImage {
                raster_path: None,
                format_warning: Some("Unrecognized image format".to_string()),
                converted_from_legacy_vector: false,
            }),
        }
    }

    fn next_path(&mut self, extension: &str) -> PathBuf {
        self.counter += 1;
        self.dir
            .path()
            .join(format!("media{}.{}", self.counter, extension))
    }
}

/// Write the fixed placeholder canvas: a light panel with a border.
///
/// No text is rasterized onto it; the explanation travels in the
/// accompanying format warning.
fn write_placeholder_canvas(path: &Path) -> Result<()> {
    let (w, h) = PLACEHOLDER_SIZE;
    let mut canvas = RgbImage::from_pixel(w, h, PLACEHOLDER_BACKGROUND);
    for x in 0..w {
        for y in [0, 1, h - 2, h - 1] {
            canvas.put_pixel(x, y, PLACEHOLDER_BORDER);
        }
    }
    for y in 0..h {
        for x in [0, 1, w - 2, w - 1] {
            canvas.put_pixel(x, y, PLACEHOLDER_BORDER);
        }
    }
    canvas.save_with_format(path, RasterFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), RasterFormat::Png)
            .unwrap();
        bytes
    }

    fn wmf_placeable_bytes() -> Vec<u8> {
        let mut bytes = WMF_PLACEABLE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 60]);
        bytes
    }

    fn emf_bytes() -> Vec<u8> {
        let mut bytes = vec![0u8; 88];
        bytes[..4].copy_from_slice(&EMF_RECORD_MAGIC);
        bytes[40..44].copy_from_slice(EMF_SIGNATURE);
        bytes
    }

    #[test]
    fn test_classify_png() {
        assert_eq!(
            classify_image(&tiny_png()),
            ImageClass::Raster(RasterFormat::Png)
        );
    }

    #[test]
    fn test_classify_wmf_variants() {
        assert_eq!(
            classify_image(&wmf_placeable_bytes()),
            ImageClass::LegacyVector(LegacyVectorKind::Wmf)
        );
        let mut standard = WMF_STANDARD_MAGIC.to_vec();
        standard.extend_from_slice(&[0u8; 20]);
        assert_eq!(
            classify_image(&standard),
            ImageClass::LegacyVector(LegacyVectorKind::Wmf)
        );
    }

    #[test]
    fn test_classify_emf() {
        assert_eq!(
            classify_image(&emf_bytes()),
            ImageClass::LegacyVector(LegacyVectorKind::Emf)
        );
        // The EMR_HEADER record type alone is not enough without the signature
        let mut truncated = vec![0u8; 20];
        truncated[..4].copy_from_slice(&EMF_RECORD_MAGIC);
        assert_eq!(classify_image(&truncated), ImageClass::Unknown);
    }

    #[test]
    fn test_classify_garbage() {
        assert_eq!(classify_image(b"not an image at all"), ImageClass::Unknown);
        assert_eq!(classify_image(&[]), ImageClass::Unknown);
    }

    #[test]
    fn test_classify_corrupt_raster() {
        // A valid PNG signature followed by garbage must not pass as a raster
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0xAB; 64]);
        assert_eq!(
            classify_image(&bytes),
            ImageClass::Corrupt(RasterFormat::Png)
        );
    }

    #[test]
    fn test_materialize_corrupt_raster_warns() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0xAB; 64]);

        let mut store = MediaStore::new().unwrap();
        let result = store.materialize(&bytes).unwrap();
        assert!(result.raster_path.is_none());
        assert!(result.format_warning.as_ref().unwrap().contains("decode"));
        assert!(!result.converted_from_legacy_vector);
    }

    #[test]
    fn test_materialize_raster() {
        let mut store = MediaStore::new().unwrap();
        let result = store.materialize(&tiny_png()).unwrap();
        let path = result.raster_path.unwrap();
        assert!(path.exists());
        assert!(result.format_warning.is_none());
        assert!(!result.converted_from_legacy_vector);
        assert!(image::open(&path).is_ok());
    }

    #[test]
    fn test_materialize_wmf_gets_placeholder() {
        let mut store = MediaStore::new().unwrap();
        let result = store.materialize(&wmf_placeable_bytes()).unwrap();
        assert!(result.converted_from_legacy_vector);
        assert!(result.format_warning.as_ref().unwrap().contains("WMF"));

        // The placeholder is a real decodable raster of the fixed size
        let img = image::open(result.raster_path.unwrap()).unwrap();
        assert_eq!(img.width(), PLACEHOLDER_SIZE.0);
        assert_eq!(img.height(), PLACEHOLDER_SIZE.1);
    }

    #[test]
    fn test_materialize_unknown() {
        let mut store = MediaStore::new().unwrap();
        let result = store.materialize(b"garbage").unwrap();
        assert!(result.raster_path.is_none());
        assert!(result.format_warning.is_some());
    }

    #[test]
    fn test_store_cleanup_on_drop() {
        let path;
        {
            let mut store = MediaStore::new().unwrap();
            let result = store.materialize(&tiny_png()).unwrap();
            path = result.raster_path.unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
