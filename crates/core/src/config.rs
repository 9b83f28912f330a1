//! Tunable thresholds for the layout pipeline and per-request options.

use crate::error::{Error, Result};
use crate::types::EMU_PER_POINT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pages with fewer trimmed native characters than this go through OCR.
pub const MINIMUM_TEXT_THRESHOLD: usize = 20;

/// Fraction of the canvas kept free on every side.
pub const SLIDE_MARGIN_FACTOR: f64 = 0.02;

/// Resolution used to render pages for OCR.
pub const DEFAULT_OCR_DPI: u32 = 300;

/// Smallest placed region width: 50pt.
pub const MIN_REGION_WIDTH: i64 = 50 * EMU_PER_POINT;

/// Smallest placed region height: 20pt.
pub const MIN_REGION_HEIGHT: i64 = 20 * EMU_PER_POINT;

/// Layout thresholds shared by every page of every conversion.
///
/// Constructed once and handed to the [`Converter`](crate::Converter); never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum trimmed native characters for a page to skip OCR (default 20).
    pub text_threshold: usize,

    /// Canvas margin as a fraction of each dimension (default 0.02).
    pub margin_factor: f64,

    /// Minimum placed region width in EMU (default 50pt).
    pub min_region_width: i64,

    /// Minimum placed region height in EMU (default 20pt).
    pub min_region_height: i64,

    /// Smallest font size in points (default 10).
    pub min_font_size: f64,

    /// Largest font size in points (default 28).
    pub max_font_size: f64,

    /// Share of the smaller height two boxes must overlap vertically to sit
    /// on the same line band (default 0.5).
    pub line_band_overlap: f64,

    /// Largest horizontal gap, in multiples of the band height, between
    /// fragments merged into one line (default 1.0).
    pub word_gap_factor: f64,

    /// Largest vertical gap, in multiples of the line height, between lines
    /// merged into one paragraph (default 0.5).
    pub paragraph_gap_factor: f64,

    /// OCR words below this confidence (0-100) are ignored (default 30).
    pub min_ocr_confidence: f32,

    /// OCR line boxes are grown to at least this many points per side
    /// (default 5).
    pub ocr_min_box_points: f64,

    /// Relative aspect ratio deviation from 16:9 tolerated before the canvas
    /// height is adjusted (default 0.10).
    pub aspect_tolerance: f64,

    /// Narrowest canvas width/height ratio (default 0.5).
    pub min_canvas_ratio: f64,

    /// Widest canvas width/height ratio (default 3.0).
    pub max_canvas_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            text_threshold: MINIMUM_TEXT_THRESHOLD,
            margin_factor: SLIDE_MARGIN_FACTOR,
            min_region_width: MIN_REGION_WIDTH,
            min_region_height: MIN_REGION_HEIGHT,
            min_font_size: 10.0,
            max_font_size: 28.0,
            line_band_overlap: 0.5,
            word_gap_factor: 1.0,
            paragraph_gap_factor: 0.5,
            min_ocr_confidence: 30.0,
            ocr_min_box_points: 5.0,
            aspect_tolerance: 0.10,
            min_canvas_ratio: 0.5,
            max_canvas_ratio: 3.0,
        }
    }
}

impl LayoutConfig {
    /// Create a configuration with the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the insufficient-text threshold.
    pub fn with_text_threshold(mut self, chars: usize) -> Self {
        self.text_threshold = chars;
        self
    }

    /// Set the canvas margin factor.
    pub fn with_margin_factor(mut self, factor: f64) -> Self {
        self.margin_factor = factor;
        self
    }

    /// Set the minimum region size in EMU.
    pub fn with_min_region_size(mut self, width: i64, height: i64) -> Self {
        self.min_region_width = width;
        self.min_region_height = height;
        self
    }

    /// Set the font size bounds in points.
    pub fn with_font_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_font_size = min;
        self.max_font_size = max;
        self
    }

    /// Set the OCR word confidence floor.
    pub fn with_min_ocr_confidence(mut self, confidence: f32) -> Self {
        self.min_ocr_confidence = confidence;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..0.5).contains(&self.margin_factor) {
            return Err(Error::InvalidConfig(format!(
                "margin factor must be in [0, 0.5), got {}",
                self.margin_factor
            )));
        }
        if self.min_region_width <= 0 || self.min_region_height <= 0 {
            return Err(Error::InvalidConfig(
                "minimum region size must be positive".to_string(),
            ));
        }
        if !(self.min_font_size > 0.0 && self.min_font_size <= self.max_font_size) {
            return Err(Error::InvalidConfig(format!(
                "font bounds must satisfy 0 < min <= max, got {}..{}",
                self.min_font_size, self.max_font_size
            )));
        }
        if !(0.0..=1.0).contains(&self.line_band_overlap) {
            return Err(Error::InvalidConfig(format!(
                "line band overlap must be in [0, 1], got {}",
                self.line_band_overlap
            )));
        }
        if self.word_gap_factor < 0.0 || self.paragraph_gap_factor < 0.0 {
            return Err(Error::InvalidConfig(
                "gap factors must not be negative".to_string(),
            ));
        }
        if !(self.min_canvas_ratio > 0.0 && self.min_canvas_ratio <= self.max_canvas_ratio) {
            return Err(Error::InvalidConfig(format!(
                "canvas ratio bounds must satisfy 0 < min <= max, got {}..{}",
                self.min_canvas_ratio, self.max_canvas_ratio
            )));
        }
        if self.aspect_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "aspect tolerance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-request conversion options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Tesseract language codes, e.g. `["eng", "deu"]`.
    pub ocr_languages: Vec<String>,

    /// Join words split by an end-of-line hyphen.
    pub dehyphenate: bool,

    /// Render resolution for OCR.
    pub ocr_dpi: u32,

    /// Wall-clock budget for all OCR work in one request. Pages reaching OCR
    /// after the budget is spent come out blank.
    pub ocr_timeout: Option<Duration>,

    /// When OCR fails, keep whatever sparse native text the page had instead
    /// of emitting a blank slide.
    pub ocr_fallback_to_native: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            ocr_languages: vec!["eng".to_string()],
            dehyphenate: true,
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_timeout: None,
            ocr_fallback_to_native: false,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the OCR language set.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ocr_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dehyphenate(mut self, dehyphenate: bool) -> Self {
        self.dehyphenate = dehyphenate;
        self
    }

    /// Set the OCR DPI (at least 1).
    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr_dpi = dpi.max(1);
        self
    }

    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = Some(timeout);
        self
    }

    pub fn with_ocr_fallback_to_native(mut self, fallback: bool) -> Self {
        self.ocr_fallback_to_native = fallback;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = LayoutConfig::default();
        assert_eq!(config.text_threshold, 20);
        assert_eq!(config.margin_factor, 0.02);
        assert_eq!(config.min_font_size, 10.0);
        assert_eq!(config.max_font_size, 28.0);
        assert_eq!(config.min_region_width, 635_000);
        assert_eq!(config.min_region_height, 254_000);
        assert!(config.validate().is_ok());

        let options = ConvertOptions::default();
        assert_eq!(options.ocr_dpi, 300);
        assert!(options.dehyphenate);
        assert_eq!(options.ocr_languages, vec!["eng"]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(LayoutConfig::new().with_margin_factor(0.5).validate().is_err());
        assert!(LayoutConfig::new().with_font_bounds(30.0, 10.0).validate().is_err());
        assert!(LayoutConfig::new().with_min_region_size(0, 10).validate().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: LayoutConfig = serde_json::from_str(r#"{"text_threshold": 40}"#).unwrap();
        assert_eq!(config.text_threshold, 40);
        assert_eq!(config.margin_factor, 0.02);
    }
}
