//! OCR word model and grouping of recognized words into line fragments.

use crate::config::LayoutConfig;
use crate::types::{FragmentSource, Rect, TextFragment, POINTS_PER_INCH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rendered page bitmap, PNG encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub width_px: u32,
    pub height_px: u32,
    /// Resolution the page was rendered at.
    pub dpi: u32,
    pub png: Vec<u8>,
}

/// One recognized word with its pixel box and place in the OCR hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// Recognition confidence, 0-100.
    pub confidence: f32,
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

impl OcrWord {
    /// Word box converted from pixels at `dpi` to points.
    pub fn bbox_points(&self, dpi: u32) -> Rect {
        let scale = POINTS_PER_INCH / dpi.max(1) as f64;
        Rect::new(
            self.left as f64 * scale,
            self.top as f64 * scale,
            (self.left + self.width) as f64 * scale,
            (self.top + self.height) as f64 * scale,
        )
    }
}

/// Group recognized words into one OCR fragment per text line.
///
/// Words under the confidence floor or with blank text are dropped. Lines
/// come out in block / paragraph / line order, words joined by single
/// spaces. Each line box is grown around its centre to at least
/// `ocr_min_box_points` per side.
pub fn group_ocr_words(words: &[OcrWord], dpi: u32, config: &LayoutConfig) -> Vec<TextFragment> {
    let mut lines: BTreeMap<(u32, u32, u32), (Rect, Vec<&str>)> = BTreeMap::new();
    let mut dropped = 0usize;

    for word in words {
        let text = word.text.trim();
        if text.is_empty() || word.confidence < config.min_ocr_confidence {
            dropped += 1;
            continue;
        }

        let bbox = word.bbox_points(dpi);
        lines
            .entry((word.block, word.paragraph, word.line))
            .and_modify(|(line_box, texts)| {
                *line_box = line_box.union(&bbox);
                texts.push(text);
            })
            .or_insert_with(|| (bbox, vec![text]));
    }

    if dropped > 0 {
        log::debug!("dropped {} low-confidence or empty OCR words", dropped);
    }

    lines
        .into_values()
        .filter_map(|(bbox, texts)| {
            let bbox = grow_to_minimum(bbox, config.ocr_min_box_points);
            TextFragment::new(bbox, texts.join(" "), FragmentSource::Ocr)
        })
        .collect()
}

fn grow_to_minimum(bbox: Rect, min_side: f64) -> Rect {
    let (cx, cy) = bbox.center();
    let half_w = bbox.width().max(min_side) / 2.0;
    let half_h = bbox.height().max(min_side) / 2.0;
    Rect::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, left: u32, top: u32, conf: f32, line: u32) -> OcrWord {
        OcrWord {
            text: text.to_string(),
            left,
            top,
            width: 100,
            height: 50,
            confidence: conf,
            block: 1,
            paragraph: 1,
            line,
        }
    }

    #[test]
    fn test_words_join_into_lines() {
        let words = vec![
            word("Hello", 300, 300, 90.0, 1),
            word("world", 420, 300, 85.0, 1),
            word("Second", 300, 400, 92.0, 2),
        ];

        let fragments = group_ocr_words(&words, 300, &LayoutConfig::default());
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello world", "Second"]);

        // 300px at 300 DPI is one inch
        let bbox = fragments[0].bbox;
        for (got, want) in [(bbox.x0, 72.0), (bbox.y0, 72.0), (bbox.x1, 124.8), (bbox.y1, 84.0)] {
            assert!((got - want).abs() < 1e-9, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_low_confidence_words_are_dropped() {
        let words = vec![
            word("noise", 300, 300, 12.0, 1),
            word("kept", 420, 300, 30.0, 1),
            word("   ", 540, 300, 99.0, 1),
        ];

        let fragments = group_ocr_words(&words, 300, &LayoutConfig::default());
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "kept");
    }

    #[test]
    fn test_tiny_boxes_grow_to_minimum() {
        let mut dot = word("i", 600, 600, 80.0, 1);
        dot.width = 3;
        dot.height = 3;

        let fragments = group_ocr_words(&[dot], 300, &LayoutConfig::default());
        let bbox = fragments[0].bbox;
        assert!((bbox.width() - 5.0).abs() < 1e-9);
        assert!((bbox.height() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_hierarchy_order_wins_over_input_order() {
        let mut late = word("later", 0, 0, 90.0, 1);
        late.block = 2;
        let early = word("earlier", 0, 900, 90.0, 1);

        let fragments = group_ocr_words(&[late, early], 300, &LayoutConfig::default());
        assert_eq!(fragments[0].text, "earlier");
        assert_eq!(fragments[1].text, "later");
    }

    #[test]
    fn test_no_words() {
        assert!(group_ocr_words(&[], 300, &LayoutConfig::default()).is_empty());
    }
}
