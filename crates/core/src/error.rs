//! Error types for PDF to PowerPoint conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during conversion.
///
/// Document-level variants abort a conversion. Page-level variants
/// (`PageExtraction`, `Ocr`, `LayoutInvariantViolation`) are absorbed by the
/// page pipeline and turn into a blank slide or a dropped region.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input is not a PDF or could not be opened at all.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The input document has no pages.
    #[error("Input document has no pages")]
    EmptyInput,

    /// Text could not be extracted from a single page.
    #[error("Text extraction failed on page {page}: {reason}")]
    PageExtraction { page: usize, reason: String },

    /// The OCR collaborator failed.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Geometry that must never reach the layout stage (NaN, inverted boxes).
    #[error("Layout invariant violated: {0}")]
    LayoutInvariantViolation(String),

    /// The presentation renderer failed.
    #[error("Render error: {0}")]
    Render(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A native library a collaborator needs could not be loaded.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_page() {
        let err = Error::PageExtraction {
            page: 2,
            reason: "bad stream".into(),
        };
        assert_eq!(err.to_string(), "Text extraction failed on page 2: bad stream");
    }
}
