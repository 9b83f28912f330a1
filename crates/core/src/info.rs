//! Document summary for callers deciding whether and how to convert.

use crate::source::{DocumentMetadata, PageSource};
use crate::types::PageGeometry;
use serde::{Deserialize, Serialize};

/// Seconds per page spent on native extraction and layout.
const SECONDS_PER_PAGE: f64 = 2.0;

/// Seconds per page spent on OCR.
const OCR_SECONDS_PER_PAGE: f64 = 5.0;

/// Expected share of pages needing OCR.
const OCR_PAGE_SHARE: f64 = 0.5;

/// Floor for any estimate.
const MIN_ESTIMATE_SECONDS: f64 = 5.0;

/// Metadata and size of a PDF, plus a rough conversion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub metadata: DocumentMetadata,
    pub page_count: usize,
    /// Size of the first page, if it has a usable one.
    pub first_page: Option<PageGeometry>,
    /// Width/height of the first page.
    pub aspect_ratio: Option<f64>,
    pub estimated_processing_seconds: f64,
}

impl DocumentInfo {
    pub fn from_source(source: &dyn PageSource) -> Self {
        let page_count = source.page_count();
        let first_page = if page_count > 0 {
            source.page_geometry(0).ok()
        } else {
            None
        };

        Self {
            metadata: source.metadata(),
            page_count,
            first_page,
            aspect_ratio: first_page.map(|g| g.aspect_ratio()),
            estimated_processing_seconds: estimate_processing_seconds(page_count),
        }
    }
}

/// Rough wall-clock estimate assuming half the pages need OCR.
pub fn estimate_processing_seconds(page_count: usize) -> f64 {
    let pages = page_count as f64;
    let estimate = pages * SECONDS_PER_PAGE + pages * OCR_PAGE_SHARE * OCR_SECONDS_PER_PAGE;
    estimate.max(MIN_ESTIMATE_SECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_has_a_floor() {
        assert_eq!(estimate_processing_seconds(0), 5.0);
        assert_eq!(estimate_processing_seconds(1), 5.0);
        assert_eq!(estimate_processing_seconds(2), 9.0);
        assert_eq!(estimate_processing_seconds(10), 45.0);
    }
}
