//! WCAG contrast math.
//!
//! Implements the relative-luminance contrast ratio from WCAG 2.1 plus the
//! simpler perceptual luminance used when deciding whether to flip a text
//! color to black or white. WCAG AA requires 4.5:1 for normal text and 3:1
//! for large text (18pt, or 14pt bold).

use serde::{Deserialize, Serialize};

/// Minimum contrast ratio for normal text (WCAG AA)
pub const MIN_CONTRAST_RATIO: f64 = 4.5;

/// Minimum contrast ratio for large text (WCAG AA)
pub const MIN_LARGE_TEXT_CONTRAST_RATIO: f64 = 3.0;

/// Point size at which text counts as large
pub const LARGE_TEXT_PT: f32 = 18.0;

/// Point size at which bold text counts as large
pub const LARGE_BOLD_TEXT_PT: f32 = 14.0;

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a color from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six-digit hex string like `1A2B3C` (no leading `#`)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Format as a six-digit uppercase hex string (no leading `#`)
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Perceptual luminance in [0, 1]: `(0.299 R + 0.587 G + 0.114 B) / 255`.
    ///
    /// This is the cheap heuristic used for "is this color light or dark",
    /// not the WCAG relative luminance.
    pub fn perceptual_luminance(self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }

    /// WCAG 2.1 relative luminance
    pub fn relative_luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

/// WCAG contrast ratio between two colors, in [1, 21]
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Whether text of the given size/weight counts as large for WCAG purposes
pub fn is_large_text(font_size_pt: Option<f32>, bold: bool) -> bool {
    match font_size_pt {
        Some(pt) => pt >= LARGE_TEXT_PT || (bold && pt >= LARGE_BOLD_TEXT_PT),
        None => false,
    }
}

/// Minimum required ratio for the given text size/weight
pub fn required_ratio(font_size_pt: Option<f32>, bold: bool) -> f64 {
    if is_large_text(font_size_pt, bold) {
        MIN_LARGE_TEXT_CONTRAST_RATIO
    } else {
        MIN_CONTRAST_RATIO
    }
}
