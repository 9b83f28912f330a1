//! PDF backends for PDF to PowerPoint conversion.
//!
//! Text extraction and page rendering go through pdfium. OCR goes through
//! Tesseract when the `tesseract` feature is enabled.

pub mod loader;
pub mod ocr;

pub use loader::{PdfiumDocument, PdfiumLoader};
#[cfg(feature = "tesseract")]
pub use ocr::TesseractOcr;
pub use ocr::{default_engine, UnavailableOcr};
