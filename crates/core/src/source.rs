//! Collaborator seams: document parsing, OCR and presentation rendering.
//!
//! The core never talks to a PDF library, an OCR engine or a ZIP writer
//! directly. Concrete implementations live in sibling crates; tests use
//! in-memory fakes.

use crate::error::Result;
use crate::ocr::{OcrWord, PageImage};
use crate::types::{CanvasSpec, PageGeometry, PageLayout, TextFragment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}

/// Opens documents.
pub trait DocumentLoader {
    /// Open a document from bytes. Fails with `MalformedInput` when the bytes
    /// cannot be parsed.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PageSource + 'a>>;
}

/// An opened document, page by page. Page indexes are 0-based.
pub trait PageSource {
    fn page_count(&self) -> usize;

    fn page_geometry(&self, index: usize) -> Result<PageGeometry>;

    /// Positioned native text of one page, in page points with a top-left
    /// origin.
    fn extract_page_fragments(&self, index: usize) -> Result<Vec<TextFragment>>;

    /// Rasterize one page for OCR.
    fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage>;

    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata::default()
    }
}

/// Parameters for one OCR call.
#[derive(Debug, Clone)]
pub struct OcrRequest<'a> {
    pub dpi: u32,
    pub languages: &'a [String],
    /// Time left in the request's OCR budget, if one was set.
    pub budget: Option<Duration>,
}

impl OcrRequest<'_> {
    /// Languages in `eng+deu` form.
    pub fn language_spec(&self) -> String {
        if self.languages.is_empty() {
            "eng".to_string()
        } else {
            self.languages.join("+")
        }
    }
}

/// Optical character recognition.
pub trait OcrEngine {
    fn recognize(&self, image: &PageImage, request: &OcrRequest<'_>) -> Result<Vec<OcrWord>>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn recognize(&self, image: &PageImage, request: &OcrRequest<'_>) -> Result<Vec<OcrWord>> {
        (**self).recognize(image, request)
    }
}

/// Serializes finished layouts into a presentation file. Performs no layout.
pub trait SlideRenderer {
    fn render(&self, canvas: &CanvasSpec, pages: &[PageLayout]) -> Result<Vec<u8>>;
}
