//! PPTX (Office Open XML) backend for PDF to PowerPoint conversion.
//!
//! Writes text-only presentations from finished page layouts and reads
//! .pptx files back into a slide summary. A .pptx file is a ZIP archive of
//! XML parts.

pub mod reader;
pub mod writer;

pub use reader::{PptxReader, PptxSummary, ShapeSummary, SlideSummary};
pub use writer::PptxWriter;
