//! OCR engines.

use pdf2pptx_core::{Error, OcrEngine, OcrRequest, OcrWord, PageImage, Result};

/// Engine used when no OCR backend is compiled in. Every call fails, so
/// pages that need OCR come out blank.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn recognize(&self, _image: &PageImage, _request: &OcrRequest<'_>) -> Result<Vec<OcrWord>> {
        Err(Error::Ocr(
            "OCR support not compiled in (enable the `tesseract` feature)".to_string(),
        ))
    }
}

/// The best OCR engine this build offers.
pub fn default_engine() -> Box<dyn OcrEngine> {
    #[cfg(feature = "tesseract")]
    {
        Box::new(TesseractOcr::new())
    }
    #[cfg(not(feature = "tesseract"))]
    {
        log::debug!("built without tesseract, scanned pages will be blank");
        Box::new(UnavailableOcr)
    }
}

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractOcr;

#[cfg(feature = "tesseract")]
mod tesseract {
    use super::*;
    use leptess::capi::{
        TessPageIteratorLevel_RIL_BLOCK, TessPageIteratorLevel_RIL_PARA,
        TessPageIteratorLevel_RIL_TEXTLINE, TessPageIteratorLevel_RIL_WORD,
    };
    use leptess::{LepTess, Variable};
    use std::time::Instant;

    /// Pixel box as `(x, y, w, h)`.
    type PixelBox = (i32, i32, i32, i32);

    /// Tesseract through leptess.
    #[derive(Debug, Clone, Default)]
    pub struct TesseractOcr {
        data_path: Option<String>,
        page_seg_mode: Option<u32>,
    }

    impl TesseractOcr {
        pub fn new() -> Self {
            Self::default()
        }

        /// Directory holding `*.traineddata` files.
        pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
            self.data_path = Some(path.into());
            self
        }

        /// Tesseract page segmentation mode (`--psm`).
        pub fn with_page_seg_mode(mut self, mode: u32) -> Self {
            self.page_seg_mode = Some(mode);
            self
        }

        fn boxes(lt: &mut LepTess, level: leptess::capi::TessPageIteratorLevel) -> Vec<PixelBox> {
            match lt.get_component_boxes(level, true) {
                Some(boxes) => (&boxes)
                    .into_iter()
                    .map(|b| {
                        let g = b.get_geometry();
                        (g.x, g.y, g.w, g.h)
                    })
                    .collect(),
                None => Vec::new(),
            }
        }
    }

    impl OcrEngine for TesseractOcr {
        fn recognize(&self, image: &PageImage, request: &OcrRequest<'_>) -> Result<Vec<OcrWord>> {
            let started = Instant::now();
            let languages = request.language_spec();

            let mut lt = LepTess::new(self.data_path.as_deref(), &languages)
                .map_err(|e| Error::Ocr(format!("Failed to initialize Tesseract ({}): {}", languages, e)))?;

            if let Some(mode) = self.page_seg_mode {
                lt.set_variable(Variable::TesseditPagesegMode, &mode.to_string())
                    .map_err(|e| Error::Ocr(format!("Failed to set page segmentation mode: {}", e)))?;
            }

            lt.set_image_from_mem(&image.png)
                .map_err(|e| Error::Ocr(format!("Failed to load page image: {}", e)))?;
            lt.set_source_resolution(image.dpi as i32);

            let blocks = Self::boxes(&mut lt, TessPageIteratorLevel_RIL_BLOCK);
            let paragraphs = Self::boxes(&mut lt, TessPageIteratorLevel_RIL_PARA);
            let lines = Self::boxes(&mut lt, TessPageIteratorLevel_RIL_TEXTLINE);
            let word_boxes = Self::boxes(&mut lt, TessPageIteratorLevel_RIL_WORD);

            let mut words = Vec::with_capacity(word_boxes.len());
            for (idx, word_box) in word_boxes.iter().enumerate() {
                if let Some(budget) = request.budget {
                    if started.elapsed() > budget {
                        return Err(Error::Ocr(format!(
                            "OCR budget of {:?} exhausted after {} of {} words",
                            budget,
                            idx,
                            word_boxes.len()
                        )));
                    }
                }

                let (x, y, w, h) = *word_box;
                lt.set_rectangle(x, y, w, h);
                let text = lt.get_utf8_text().unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    continue;
                }

                // Words outside every line get a line of their own
                let fallback = (lines.len() + idx) as u32;
                words.push(OcrWord {
                    text,
                    left: x.max(0) as u32,
                    top: y.max(0) as u32,
                    width: w.max(0) as u32,
                    height: h.max(0) as u32,
                    confidence: lt.mean_text_conf() as f32,
                    block: containing(&blocks, word_box).unwrap_or(0),
                    paragraph: containing(&paragraphs, word_box).unwrap_or(0),
                    line: containing(&lines, word_box).unwrap_or(fallback),
                });
            }

            log::debug!(
                "tesseract: {} words in {} lines ({:?})",
                words.len(),
                lines.len(),
                started.elapsed()
            );

            Ok(words)
        }
    }

    /// Index of the first box containing the centre of `inner`.
    fn containing(boxes: &[PixelBox], inner: &PixelBox) -> Option<u32> {
        let cx = inner.0 + inner.2 / 2;
        let cy = inner.1 + inner.3 / 2;
        boxes
            .iter()
            .position(|&(x, y, w, h)| cx >= x && cx <= x + w && cy >= y && cy <= y + h)
            .map(|idx| idx as u32)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_containing_uses_word_centre() {
            let lines = vec![(0, 0, 500, 40), (0, 50, 500, 40)];
            assert_eq!(containing(&lines, &(10, 55, 60, 30)), Some(1));
            assert_eq!(containing(&lines, &(10, 5, 60, 30)), Some(0));
            assert_eq!(containing(&lines, &(600, 5, 60, 30)), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_engine_fails() {
        let image = PageImage {
            width_px: 1,
            height_px: 1,
            dpi: 300,
            png: Vec::new(),
        };
        let languages = vec!["eng".to_string()];
        let request = OcrRequest {
            dpi: 300,
            languages: &languages,
            budget: None,
        };
        assert!(matches!(
            UnavailableOcr.recognize(&image, &request),
            Err(Error::Ocr(_))
        ));
    }
}
