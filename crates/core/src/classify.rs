//! Decide whether a page's native text layer is usable or OCR is needed.

use crate::config::MINIMUM_TEXT_THRESHOLD;
use crate::types::{PageGeometry, TextFragment};
use serde::{Deserialize, Serialize};

/// Outcome of classifying one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Native text is sufficient.
    NativeOk,
    /// The page is effectively an image; run OCR.
    NeedsOcr,
}

/// Character-count classifier.
///
/// A scanned page often still carries a stray watermark or page number in
/// its text layer, so "some text" is not enough: the page needs at least
/// `threshold` trimmed characters.
#[derive(Debug, Clone, Copy)]
pub struct PageClassifier {
    threshold: usize,
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self {
            threshold: MINIMUM_TEXT_THRESHOLD,
        }
    }
}

impl PageClassifier {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Classify a page from its native fragments.
    ///
    /// Fragments lying entirely outside the page box, or with non-finite
    /// geometry, are not counted.
    pub fn classify(&self, fragments: &[TextFragment], geometry: &PageGeometry) -> Classification {
        let page = geometry.bounds();
        let total: usize = fragments
            .iter()
            .filter(|f| f.bbox.is_finite() && f.bbox.intersects(&page))
            .map(TextFragment::trimmed_len)
            .sum();

        log::debug!(
            "native text: {} chars (threshold {})",
            total,
            self.threshold
        );

        if total < self.threshold {
            Classification::NeedsOcr
        } else {
            Classification::NativeOk
        }
    }
}

/// Classify with the default 20-character threshold.
pub fn classify(fragments: &[TextFragment], geometry: &PageGeometry) -> Classification {
    PageClassifier::default().classify(fragments, geometry)
}
