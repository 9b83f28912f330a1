//! Pdfium-backed document loader.

use image::ImageFormat;
use pdf2pptx_core::{
    DocumentLoader, DocumentMetadata, Error, PageGeometry, PageImage, PageSource, Result,
    TextFragment,
};
use pdfium_render::prelude::*;
use std::io::Cursor;

/// Longest rendered side in pixels. Larger pages are rendered at a lower
/// effective DPI.
const MAX_RENDER_SIDE: f64 = 10_000.0;

/// Opens PDFs with pdfium.
pub struct PdfiumLoader {
    pdfium: Pdfium,
}

impl PdfiumLoader {
    /// Bind pdfium from the working directory, falling back to the system
    /// library.
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Error::Unavailable(format!("Failed to bind pdfium library: {}", e)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// Bind pdfium from a directory holding the platform library.
    pub fn with_library_dir(dir: &str) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .map_err(|e| Error::Unavailable(format!("Failed to bind pdfium from '{}': {}", dir, e)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl DocumentLoader for PdfiumLoader {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PageSource + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| Error::MalformedInput(format!("Failed to load PDF: {}", e)))?;

        log::debug!("opened PDF with {} pages", document.pages().len());
        Ok(Box::new(PdfiumDocument { document }))
    }
}

/// An open pdfium document.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>> {
        let page_index = index.try_into().map_err(|_| Error::PageExtraction {
            page: index + 1,
            reason: "page index out of range".to_string(),
        })?;

        self.document
            .pages()
            .get(page_index)
            .map_err(|e| Error::PageExtraction {
                page: index + 1,
                reason: format!("Failed to load page: {}", e),
            })
    }

    fn metadata_value(&self, tag: PdfDocumentMetadataTagType) -> Option<String> {
        self.document
            .metadata()
            .get(tag)
            .map(|entry| entry.value().trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        let page = self.page(index)?;
        PageGeometry::new(page.width().value as f64, page.height().value as f64)
    }

    fn extract_page_fragments(&self, index: usize) -> Result<Vec<TextFragment>> {
        let page = self.page(index)?;
        let page_height = page.height().value as f64;

        let text = page.text().map_err(|e| Error::PageExtraction {
            page: index + 1,
            reason: format!("Failed to get page text: {}", e),
        })?;

        let mut fragments = Vec::new();
        for segment in text.segments().iter() {
            let bounds = segment.bounds();

            // Convert from PDF's bottom-left origin to top-left origin
            let x0 = bounds.left().value as f64;
            let x1 = bounds.right().value as f64;
            let y0 = page_height - bounds.top().value as f64;
            let y1 = page_height - bounds.bottom().value as f64;

            if let Some(fragment) = TextFragment::native(x0, y0, x1, y1, segment.text()) {
                fragments.push(fragment);
            }
        }

        log::debug!("page {}: {} native text segments", index + 1, fragments.len());
        Ok(fragments)
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage> {
        let page = self.page(index)?;
        let width_pt = page.width().value as f64;
        let height_pt = page.height().value as f64;

        let longest = width_pt.max(height_pt).max(1.0);
        let effective_dpi = (dpi as f64).min(MAX_RENDER_SIDE * 72.0 / longest).max(1.0);
        let scale = effective_dpi / 72.0;
        let width_px = ((width_pt * scale).round() as i32).max(1);
        let height_px = ((height_pt * scale).round() as i32).max(1);

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width_px)
                    .set_target_height(height_px)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|e| Error::Ocr(format!("Failed to render page {}: {}", index + 1, e)))?;

        let mut png = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| Error::Ocr(format!("Failed to encode page {} as PNG: {}", index + 1, e)))?;

        Ok(PageImage {
            width_px: width_px as u32,
            height_px: height_px as u32,
            dpi: effective_dpi.round() as u32,
            png: png.into_inner(),
        })
    }

    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            title: self.metadata_value(PdfDocumentMetadataTagType::Title),
            author: self.metadata_value(PdfDocumentMetadataTagType::Author),
            subject: self.metadata_value(PdfDocumentMetadataTagType::Subject),
            creator: self.metadata_value(PdfDocumentMetadataTagType::Creator),
            producer: self.metadata_value(PdfDocumentMetadataTagType::Producer),
            creation_date: self.metadata_value(PdfDocumentMetadataTagType::CreationDate),
            modification_date: self.metadata_value(PdfDocumentMetadataTagType::ModificationDate),
        }
    }
}
