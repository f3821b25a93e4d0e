//! Error types for PPTX operations

use thiserror::Error;

/// Errors that can occur while reading, mutating, or writing a presentation
#[derive(Error, Debug)]
pub enum PptxError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error reading an XML attribute
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid presentation structure
    #[error("Invalid presentation structure: {0}")]
    InvalidStructure(String),

    /// A shape handle points at nothing in the current model
    #[error("Shape not found: slide {slide}, shape {shape}")]
    ShapeNotFound { slide: usize, shape: usize },

    /// A mutation was applied to a shape lacking the required capability
    #[error("Shape on slide {slide} is {actual}, operation requires {required}")]
    IncompatibleShape {
        slide: usize,
        actual: &'static str,
        required: &'static str,
    },

    /// Error decoding image bytes
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;
