//! Domain types flowing through the conversion pipeline.
//!
//! Page-space values are PDF points with a top-left origin and y growing
//! downwards. Canvas-space values are EMU (English Metric Units).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// PDF points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// PowerPoint EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per PDF point.
pub const EMU_PER_POINT: i64 = EMU_PER_INCH / 72;

/// Convert PDF points to EMU.
pub fn points_to_emu(points: f64) -> f64 {
    points * EMU_PER_POINT as f64
}

/// Convert EMU to PDF points.
pub fn emu_to_points(emu: f64) -> f64 {
    emu / EMU_PER_POINT as f64
}

/// Axis-aligned box `(x0, y0) - (x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Create a box, putting the corners in top-left / bottom-right order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// All four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Length of the shared y-range; negative when the boxes are apart.
    pub fn vertical_overlap(&self, other: &Rect) -> f64 {
        self.y1.min(other.y1) - self.y0.max(other.y0)
    }

    /// Length of the shared x-range; negative when the boxes are apart.
    pub fn horizontal_overlap(&self, other: &Rect) -> f64 {
        self.x1.min(other.x1) - self.x0.max(other.x0)
    }

    /// Boxes share at least one point.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.vertical_overlap(other) >= 0.0 && self.horizontal_overlap(other) >= 0.0
    }
}

/// Where a fragment's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentSource {
    /// The PDF's own text layer.
    Native,
    /// Optical character recognition of a rendered page.
    Ocr,
}

/// One raw positioned span of text, as emitted by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub bbox: Rect,
    pub text: String,
    pub source: FragmentSource,
}

impl TextFragment {
    /// Create a fragment. Returns `None` for whitespace-only text, which
    /// never enters the model.
    pub fn new(bbox: Rect, text: impl Into<String>, source: FragmentSource) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self { bbox, text, source })
    }

    /// Shorthand for a native fragment from raw corner coordinates.
    pub fn native(x0: f64, y0: f64, x1: f64, y1: f64, text: impl Into<String>) -> Option<Self> {
        Self::new(Rect::new(x0, y0, x1, y1), text, FragmentSource::Native)
    }

    /// Shorthand for an OCR line fragment from raw corner coordinates.
    pub fn ocr(x0: f64, y0: f64, x1: f64, y1: f64, text: impl Into<String>) -> Option<Self> {
        Self::new(Rect::new(x0, y0, x1, y1), text, FragmentSource::Ocr)
    }

    /// Number of characters once surrounding whitespace is removed.
    pub fn trimmed_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// A normalized, merged, reading-order-ranked unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    pub bbox: Rect,
    pub text: String,
    pub order_index: usize,
}

/// Physical page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    /// Validate and create page dimensions. Zero, negative or non-finite
    /// sizes are malformed input.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::MalformedInput(format!(
                "invalid page size {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// The whole page as a box.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Output slide size, shared by every slide of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    /// Width in EMU.
    pub width: i64,
    /// Height in EMU.
    pub height: i64,
    /// Fraction of each dimension kept free on every side.
    pub margin_factor: f64,
}

impl CanvasSpec {
    pub fn margin_x(&self) -> f64 {
        self.width as f64 * self.margin_factor
    }

    pub fn margin_y(&self) -> f64 {
        self.height as f64 * self.margin_factor
    }

    pub fn width_inches(&self) -> f64 {
        self.width as f64 / EMU_PER_INCH as f64
    }

    pub fn height_inches(&self) -> f64 {
        self.height as f64 / EMU_PER_INCH as f64
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Final output unit handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRegion {
    /// Left edge in EMU.
    pub x: i64,
    /// Top edge in EMU.
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub text: String,
    /// Font size in points.
    pub font_size: f64,
}

/// Placed regions for one page, in reading order. Empty for blank pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based page number.
    pub page_number: usize,
    pub regions: Vec<PlacedRegion>,
}

impl PageLayout {
    /// Create an empty layout for the given page.
    pub fn blank(page_number: usize) -> Self {
        Self {
            page_number,
            regions: Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.regions.is_empty()
    }

    /// All region texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Format of a file handed to the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Modern PPTX (Office Open XML).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    ///
    /// PDF readers accept junk before the header, so `%PDF-` is searched in
    /// the first kilobyte.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        let head = &bytes[..bytes.len().min(1024)];
        if head.windows(5).any(|w| w == b"%PDF-") {
            return Some(Self::Pdf);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let r = Rect::new(100.0, 80.0, 10.0, 20.0);
        assert_eq!(r, Rect::new(10.0, 20.0, 100.0, 80.0));
        assert_eq!(r.width(), 90.0);
        assert_eq!(r.height(), 60.0);
    }

    #[test]
    fn test_rect_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 5.0);
        let b = Rect::new(20.0, 0.0, 30.0, 5.0);
        let c = Rect::new(0.0, 10.0, 10.0, 15.0);
        assert_eq!(a.vertical_overlap(&b), 5.0);
        assert_eq!(a.horizontal_overlap(&b), -10.0);
        assert_eq!(a.vertical_overlap(&c), -5.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.union(&c), Rect::new(0.0, 0.0, 10.0, 15.0));
    }

    #[test]
    fn test_fragment_rejects_blank_text() {
        assert!(TextFragment::native(0.0, 0.0, 1.0, 1.0, "   \n\t").is_none());
        let frag = TextFragment::native(0.0, 0.0, 1.0, 1.0, "  hi  ").unwrap();
        assert_eq!(frag.trimmed_len(), 2);
        assert_eq!(frag.source, FragmentSource::Native);
    }

    #[test]
    fn test_page_geometry_validation() {
        assert!(PageGeometry::new(612.0, 792.0).is_ok());
        assert!(matches!(
            PageGeometry::new(0.0, 792.0),
            Err(Error::MalformedInput(_))
        ));
        assert!(PageGeometry::new(612.0, -1.0).is_err());
        assert!(PageGeometry::new(f64::NAN, 792.0).is_err());
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(EMU_PER_POINT, 12_700);
        assert_eq!(points_to_emu(72.0), 914_400.0);
        assert_eq!(emu_to_points(914_400.0), 72.0);
    }

    #[test]
    fn test_format_from_magic() {
        assert_eq!(
            DocumentFormat::from_magic(b"%PDF-1.7\n%...."),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_magic(b"\xEF\xBB\xBF%PDF-1.4"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_magic(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
            Some(DocumentFormat::Pptx)
        );
        assert_eq!(DocumentFormat::from_magic(b"GIF89a"), None);
        assert_eq!(DocumentFormat::from_magic(b"%P"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("pptx"), Some(DocumentFormat::Pptx));
        assert_eq!(DocumentFormat::from_extension("ppt"), None);
    }
}
