//! Page pipeline orchestration.
//!
//! A document is processed in two passes: all page geometries first (to fix
//! the canvas), then every page through classify, extract, normalize,
//! project and size. A page that fails anywhere becomes a blank slide; only
//! document-level errors abort the conversion.

use crate::classify::{Classification, PageClassifier};
use crate::config::{ConvertOptions, LayoutConfig};
use crate::error::{Error, Result};
use crate::info::DocumentInfo;
use crate::normalize::FragmentNormalizer;
use crate::ocr::group_ocr_words;
use crate::sizer::RegionSizer;
use crate::source::{DocumentLoader, OcrEngine, OcrRequest, PageSource, SlideRenderer};
use crate::transform::CoordinateTransform;
use crate::types::{
    CanvasSpec, DocumentFormat, FragmentSource, PageGeometry, PageLayout, PlacedRegion, TextFragment,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Where a page is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Pending,
    Classified,
    Extracted,
    Normalized,
    Projected,
    Done,
    FailedBlank,
}

/// Why a page came out blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankReason {
    /// The page has no usable size.
    InvalidGeometry,
    /// Native text extraction failed.
    ExtractionFailed,
    /// Rendering or recognition failed.
    OcrFailed,
    /// The request's OCR budget ran out.
    OcrTimedOut,
    /// OCR ran but produced no words above the confidence floor.
    NoUsableOcrOutput,
    /// The page has no text at all.
    NoText,
}

/// Result of running one page through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Rendered {
        source: FragmentSource,
        layout: PageLayout,
    },
    Blank {
        layout: PageLayout,
        reason: BlankReason,
    },
}

impl PageOutcome {
    pub fn layout(&self) -> &PageLayout {
        match self {
            PageOutcome::Rendered { layout, .. } | PageOutcome::Blank { layout, .. } => layout,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, PageOutcome::Blank { .. })
    }

    pub fn blank_reason(&self) -> Option<BlankReason> {
        match self {
            PageOutcome::Blank { reason, .. } => Some(*reason),
            PageOutcome::Rendered { .. } => None,
        }
    }
}

/// Laid-out document, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub canvas: CanvasSpec,
    /// One entry per input page, in input order.
    pub pages: Vec<PageOutcome>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn blank_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_blank()).count()
    }

    /// Pages whose text came from OCR.
    pub fn ocr_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| {
                matches!(
                    p,
                    PageOutcome::Rendered {
                        source: FragmentSource::Ocr,
                        ..
                    }
                )
            })
            .count()
    }
}

/// Tracks and traces one page's state transitions.
struct PageRun {
    page_number: usize,
    state: PageState,
}

impl PageRun {
    fn new(page_number: usize) -> Self {
        Self {
            page_number,
            state: PageState::Pending,
        }
    }

    fn advance(&mut self, next: PageState) {
        log::trace!("page {}: {:?} -> {:?}", self.page_number, self.state, next);
        self.state = next;
    }

    fn blank(mut self, reason: BlankReason) -> PageOutcome {
        self.advance(PageState::FailedBlank);
        log::warn!("page {}: emitting blank slide ({:?})", self.page_number, reason);
        PageOutcome::Blank {
            layout: PageLayout::blank(self.page_number),
            reason,
        }
    }
}

/// PDF to presentation converter.
///
/// Holds the collaborators and the layout thresholds. One converter can serve
/// any number of requests; nothing is carried between them.
pub struct Converter {
    loader: Box<dyn DocumentLoader>,
    ocr: Box<dyn OcrEngine>,
    renderer: Box<dyn SlideRenderer>,
    config: LayoutConfig,
    classifier: PageClassifier,
    transform: CoordinateTransform,
    sizer: RegionSizer,
}

impl Converter {
    /// Create a converter with the default layout configuration.
    pub fn new(
        loader: impl DocumentLoader + 'static,
        ocr: impl OcrEngine + 'static,
        renderer: impl SlideRenderer + 'static,
    ) -> Self {
        let config = LayoutConfig::default();
        Self {
            loader: Box::new(loader),
            ocr: Box::new(ocr),
            renderer: Box::new(renderer),
            classifier: PageClassifier::new(config.text_threshold),
            transform: CoordinateTransform::from_config(&config),
            sizer: RegionSizer::from_config(&config),
            config,
        }
    }

    /// Replace the layout configuration. Fails with `InvalidConfig` when a
    /// value is out of range.
    pub fn with_config(mut self, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        self.classifier = PageClassifier::new(config.text_threshold);
        self.transform = CoordinateTransform::from_config(&config);
        self.sizer = RegionSizer::from_config(&config);
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Convert a PDF into presentation bytes, one slide per page.
    pub fn convert(&self, bytes: &[u8], options: &ConvertOptions) -> Result<Vec<u8>> {
        let layout = self.layout(bytes, options)?;
        self.render(&layout)
    }

    /// Render a finished layout with this converter's renderer.
    pub fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>> {
        let pages: Vec<PageLayout> = layout.pages.iter().map(|p| p.layout().clone()).collect();

        let output = self.renderer.render(&layout.canvas, &pages)?;
        log::info!("rendered {} slides ({} bytes)", pages.len(), output.len());
        Ok(output)
    }

    /// Run the layout pipeline without rendering.
    pub fn layout(&self, bytes: &[u8], options: &ConvertOptions) -> Result<DocumentLayout> {
        let source = self.open(bytes)?;
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(Error::EmptyInput);
        }

        log::info!("laying out {} pages", page_count);

        // First pass: geometry for every page
        let geometries: Vec<Option<PageGeometry>> = (0..page_count)
            .map(|index| match source.page_geometry(index) {
                Ok(geometry) => Some(geometry),
                Err(e) => {
                    log::warn!("page {}: unusable geometry: {}", index + 1, e);
                    None
                }
            })
            .collect();

        let valid: Vec<PageGeometry> = geometries.iter().flatten().copied().collect();
        let canvas = self.transform.compute_canvas(&valid);

        // Second pass: page layouts
        let deadline = options
            .ocr_timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));

        let pages: Vec<PageOutcome> = geometries
            .iter()
            .enumerate()
            .map(|(index, geometry)| {
                self.process_page(source.as_ref(), index, *geometry, &canvas, options, deadline)
            })
            .collect();

        let layout = DocumentLayout { canvas, pages };
        log::info!(
            "laid out {} pages ({} via OCR, {} blank)",
            layout.page_count(),
            layout.ocr_count(),
            layout.blank_count()
        );

        Ok(layout)
    }

    /// Document metadata, page count and processing estimate.
    pub fn inspect(&self, bytes: &[u8]) -> Result<DocumentInfo> {
        let source = self.open(bytes)?;
        Ok(DocumentInfo::from_source(source.as_ref()))
    }

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PageSource + 'a>> {
        if DocumentFormat::from_magic(bytes) != Some(DocumentFormat::Pdf) {
            return Err(Error::MalformedInput("input is not a PDF document".to_string()));
        }
        self.loader.open(bytes)
    }

    fn process_page(
        &self,
        source: &dyn PageSource,
        index: usize,
        geometry: Option<PageGeometry>,
        canvas: &CanvasSpec,
        options: &ConvertOptions,
        deadline: Option<Instant>,
    ) -> PageOutcome {
        let page_number = index + 1;
        let mut run = PageRun::new(page_number);

        let Some(geometry) = geometry else {
            return run.blank(BlankReason::InvalidGeometry);
        };

        let native = match source.extract_page_fragments(index) {
            Ok(fragments) => fragments,
            Err(e) => {
                log::warn!("page {}: {}", page_number, e);
                return run.blank(BlankReason::ExtractionFailed);
            }
        };

        let classification = self.classifier.classify(&native, &geometry);
        run.advance(PageState::Classified);

        let (fragments, fragment_source) = match classification {
            Classification::NativeOk => (native, FragmentSource::Native),
            Classification::NeedsOcr => match self.run_ocr(source, index, options, deadline) {
                Ok(fragments) => (fragments, FragmentSource::Ocr),
                Err(reason) if options.ocr_fallback_to_native && !native.is_empty() => {
                    log::warn!(
                        "page {}: OCR unusable ({:?}), keeping {} native fragments",
                        page_number,
                        reason,
                        native.len()
                    );
                    (native, FragmentSource::Native)
                }
                Err(reason) => return run.blank(reason),
            },
        };
        run.advance(PageState::Extracted);

        if fragments.is_empty() {
            return run.blank(BlankReason::NoText);
        }

        let regions = FragmentNormalizer::from_config(&self.config)
            .with_dehyphenation(options.dehyphenate)
            .normalize_and_group(&fragments);
        run.advance(PageState::Normalized);

        if regions.is_empty() {
            return run.blank(BlankReason::NoText);
        }

        let mut placed = Vec::with_capacity(regions.len());
        for region in regions {
            match self.transform.project(&region.bbox, &geometry, canvas) {
                Ok(p) => {
                    let font_size = self.sizer.font_size_for((p.width, p.height), &region.text);
                    placed.push(PlacedRegion {
                        x: p.x,
                        y: p.y,
                        width: p.width,
                        height: p.height,
                        text: region.text,
                        font_size,
                    });
                }
                Err(e) => {
                    log::warn!(
                        "page {}: dropping region {}: {}",
                        page_number,
                        region.order_index,
                        e
                    );
                }
            }
        }
        run.advance(PageState::Projected);

        log::debug!(
            "page {}: {} regions from {:?} text",
            page_number,
            placed.len(),
            fragment_source
        );
        run.advance(PageState::Done);

        PageOutcome::Rendered {
            source: fragment_source,
            layout: PageLayout {
                page_number,
                regions: placed,
            },
        }
    }

    /// Render the page and recognize it. Any failure maps to the blank
    /// reason it produces.
    fn run_ocr(
        &self,
        source: &dyn PageSource,
        index: usize,
        options: &ConvertOptions,
        deadline: Option<Instant>,
    ) -> std::result::Result<Vec<TextFragment>, BlankReason> {
        let page_number = index + 1;

        let budget = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    log::warn!("page {}: OCR budget spent, skipping", page_number);
                    return Err(BlankReason::OcrTimedOut);
                }
                Some(deadline - now)
            }
            None => None,
        };

        let image = source.render_page(index, options.ocr_dpi).map_err(|e| {
            log::warn!("page {}: render for OCR failed: {}", page_number, e);
            BlankReason::OcrFailed
        })?;

        let request = OcrRequest {
            dpi: image.dpi,
            languages: &options.ocr_languages,
            budget,
        };

        log::debug!(
            "page {}: OCR at {} DPI ({})",
            page_number,
            image.dpi,
            request.language_spec()
        );

        let words = self.ocr.recognize(&image, &request).map_err(|e| {
            log::warn!("page {}: {}", page_number, e);
            BlankReason::OcrFailed
        })?;

        if deadline.is_some_and(|deadline| Instant::now() > deadline) {
            log::warn!("page {}: OCR finished after the deadline, discarding", page_number);
            return Err(BlankReason::OcrTimedOut);
        }

        let fragments = group_ocr_words(&words, image.dpi, &self.config);
        if fragments.is_empty() {
            return Err(BlankReason::NoUsableOcrOutput);
        }

        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrWord, PageImage};
    use crate::source::DocumentMetadata;
    use crate::types::Rect;
    use std::collections::HashSet;
    use std::time::Duration;

    const PDF: &[u8] = b"%PDF-1.7 fake";

    #[derive(Clone)]
    struct FakePage {
        size: (f64, f64),
        fragments: std::result::Result<Vec<TextFragment>, String>,
    }

    impl FakePage {
        fn text(lines: &[&str]) -> Self {
            let fragments = lines
                .iter()
                .enumerate()
                .filter_map(|(i, line)| {
                    let top = 72.0 + i as f64 * 14.0;
                    TextFragment::native(72.0, top, 72.0 + line.len() as f64 * 6.0, top + 12.0, *line)
                })
                .collect();
            Self {
                size: (612.0, 792.0),
                fragments: Ok(fragments),
            }
        }

        fn scanned() -> Self {
            Self {
                size: (612.0, 792.0),
                fragments: Ok(Vec::new()),
            }
        }
    }

    struct FakeDocument {
        pages: Vec<FakePage>,
    }

    impl PageSource for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
            let (w, h) = self.pages[index].size;
            PageGeometry::new(w, h)
        }

        fn extract_page_fragments(&self, index: usize) -> Result<Vec<TextFragment>> {
            self.pages[index]
                .fragments
                .clone()
                .map_err(|reason| Error::PageExtraction {
                    page: index + 1,
                    reason,
                })
        }

        fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage> {
            Ok(PageImage {
                width_px: 2550,
                height_px: 3300,
                dpi,
                png: vec![index as u8],
            })
        }

        fn metadata(&self) -> DocumentMetadata {
            DocumentMetadata {
                title: Some("Fake".to_string()),
                ..Default::default()
            }
        }
    }

    struct FakeLoader {
        pages: Vec<FakePage>,
    }

    impl DocumentLoader for FakeLoader {
        fn open<'a>(&'a self, _bytes: &'a [u8]) -> Result<Box<dyn PageSource + 'a>> {
            Ok(Box::new(FakeDocument {
                pages: self.pages.clone(),
            }))
        }
    }

    /// Recognizes every page as one confident line, except the listed ones.
    #[derive(Default)]
    struct FakeOcr {
        failing: HashSet<usize>,
        confidence: f32,
        delay: Option<Duration>,
    }

    impl FakeOcr {
        fn working() -> Self {
            Self {
                confidence: 95.0,
                ..Default::default()
            }
        }

        fn failing_on(pages: &[usize]) -> Self {
            Self {
                failing: pages.iter().copied().collect(),
                confidence: 95.0,
                ..Default::default()
            }
        }
    }

    impl OcrEngine for FakeOcr {
        fn recognize(&self, image: &PageImage, request: &OcrRequest<'_>) -> Result<Vec<OcrWord>> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            let index = image.png[0] as usize;
            if self.failing.contains(&index) {
                return Err(Error::Ocr(format!("engine crashed on page {}", index + 1)));
            }
            assert_eq!(request.dpi, 300);
            Ok(["Scanned", "words"]
                .iter()
                .enumerate()
                .map(|(i, word)| OcrWord {
                    text: word.to_string(),
                    left: 300 + i as u32 * 400,
                    top: 300,
                    width: 350,
                    height: 60,
                    confidence: self.confidence,
                    block: 1,
                    paragraph: 1,
                    line: 1,
                })
                .collect())
        }
    }

    /// Serializes the layouts as JSON so tests can look at what was rendered.
    struct JsonRenderer;

    impl SlideRenderer for JsonRenderer {
        fn render(&self, _canvas: &CanvasSpec, pages: &[PageLayout]) -> Result<Vec<u8>> {
            serde_json::to_vec(pages).map_err(|e| Error::Render(e.to_string()))
        }
    }

    fn converter(pages: Vec<FakePage>, ocr: FakeOcr) -> Converter {
        Converter::new(FakeLoader { pages }, ocr, JsonRenderer)
    }

    const BODY: &str = "A line of native text long enough to trust";

    #[test]
    fn test_ocr_failure_blanks_only_that_page() {
        let pages = vec![FakePage::text(&[BODY]), FakePage::scanned(), FakePage::text(&[BODY])];
        let layout = converter(pages, FakeOcr::failing_on(&[1]))
            .layout(PDF, &ConvertOptions::default())
            .unwrap();

        assert_eq!(layout.page_count(), 3);
        assert!(!layout.pages[0].is_blank());
        assert_eq!(layout.pages[1].blank_reason(), Some(BlankReason::OcrFailed));
        assert!(layout.pages[1].layout().is_blank());
        assert!(!layout.pages[2].is_blank());

        let numbers: Vec<usize> = layout.pages.iter().map(|p| p.layout().page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_page_count_is_preserved() {
        let pages = vec![
            FakePage::text(&[BODY]),
            FakePage::scanned(),
            FakePage {
                size: (612.0, 792.0),
                fragments: Err("corrupt content stream".to_string()),
            },
            FakePage {
                size: (0.0, 792.0),
                fragments: Ok(Vec::new()),
            },
            FakePage::text(&[BODY, "second line"]),
        ];

        let output = converter(pages, FakeOcr::working())
            .convert(PDF, &ConvertOptions::default())
            .unwrap();
        let rendered: Vec<PageLayout> = serde_json::from_slice(&output).unwrap();

        assert_eq!(rendered.len(), 5);
        for (i, page) in rendered.iter().enumerate() {
            assert_eq!(page.page_number, i + 1);
        }
        assert!(rendered[2].is_blank());
        assert!(rendered[3].is_blank());
    }

    #[test]
    fn test_blank_reasons() {
        let pages = vec![
            FakePage {
                size: (612.0, 792.0),
                fragments: Err("corrupt content stream".to_string()),
            },
            FakePage {
                size: (f64::NAN, 792.0),
                fragments: Ok(Vec::new()),
            },
        ];
        let layout = converter(pages, FakeOcr::working())
            .layout(PDF, &ConvertOptions::default())
            .unwrap();

        assert_eq!(layout.pages[0].blank_reason(), Some(BlankReason::ExtractionFailed));
        assert_eq!(layout.pages[1].blank_reason(), Some(BlankReason::InvalidGeometry));
    }

    #[test]
    fn test_scanned_page_uses_ocr() {
        let layout = converter(vec![FakePage::scanned()], FakeOcr::working())
            .layout(PDF, &ConvertOptions::default())
            .unwrap();

        match &layout.pages[0] {
            PageOutcome::Rendered { source, layout } => {
                assert_eq!(*source, FragmentSource::Ocr);
                assert_eq!(layout.texts(), vec!["Scanned words"]);
            }
            other => panic!("expected rendered page, got {:?}", other),
        }
        assert_eq!(layout.ocr_count(), 1);
    }

    #[test]
    fn test_low_confidence_ocr_is_unusable() {
        let ocr = FakeOcr {
            confidence: 5.0,
            ..Default::default()
        };
        let layout = converter(vec![FakePage::scanned()], ocr)
            .layout(PDF, &ConvertOptions::default())
            .unwrap();
        assert_eq!(
            layout.pages[0].blank_reason(),
            Some(BlankReason::NoUsableOcrOutput)
        );
    }

    #[test]
    fn test_spent_budget_skips_ocr() {
        let pages = vec![FakePage::text(&[BODY]), FakePage::scanned()];
        let options = ConvertOptions::default().with_ocr_timeout(Duration::ZERO);
        let layout = converter(pages, FakeOcr::working()).layout(PDF, &options).unwrap();

        assert!(!layout.pages[0].is_blank());
        assert_eq!(layout.pages[1].blank_reason(), Some(BlankReason::OcrTimedOut));
    }

    #[test]
    fn test_late_ocr_result_is_discarded() {
        let ocr = FakeOcr {
            confidence: 95.0,
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let options = ConvertOptions::default().with_ocr_timeout(Duration::from_millis(10));
        let layout = converter(vec![FakePage::scanned()], ocr).layout(PDF, &options).unwrap();
        assert_eq!(layout.pages[0].blank_reason(), Some(BlankReason::OcrTimedOut));
    }

    #[test]
    fn test_fallback_to_native_text() {
        let pages = vec![FakePage::text(&["Page 4"])];

        let strict = converter(pages.clone(), FakeOcr::failing_on(&[0]))
            .layout(PDF, &ConvertOptions::default())
            .unwrap();
        assert!(strict.pages[0].is_blank());

        let lenient = converter(pages, FakeOcr::failing_on(&[0]))
            .layout(PDF, &ConvertOptions::default().with_ocr_fallback_to_native(true))
            .unwrap();
        assert_eq!(lenient.pages[0].layout().texts(), vec!["Page 4"]);
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let result = converter(Vec::new(), FakeOcr::working()).convert(PDF, &ConvertOptions::default());
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn test_non_pdf_is_rejected() {
        let result = converter(vec![FakePage::scanned()], FakeOcr::working())
            .convert(b"hello, world", &ConvertOptions::default());
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_placed_regions_respect_margins_and_minimum() {
        let pages = vec![FakePage::text(&[BODY, "tiny", "another line of text here"])];
        let converter = converter(pages, FakeOcr::working());
        let layout = converter.layout(PDF, &ConvertOptions::default()).unwrap();

        let canvas = layout.canvas;
        let config = converter.config();
        for region in &layout.pages[0].layout().regions {
            assert!(region.width >= config.min_region_width);
            assert!(region.height >= config.min_region_height);
            assert!(region.x as f64 >= canvas.margin_x());
            assert!(region.y as f64 >= canvas.margin_y());
            assert!((region.x + region.width) as f64 <= canvas.width as f64 - canvas.margin_x());
            assert!((region.y + region.height) as f64 <= canvas.height as f64 - canvas.margin_y());
            assert!((10.0..=28.0).contains(&region.font_size));
        }
    }

    #[test]
    fn test_letter_pages_get_portrait_canvas() {
        let layout = converter(vec![FakePage::text(&[BODY])], FakeOcr::working())
            .layout(PDF, &ConvertOptions::default())
            .unwrap();
        assert!(layout.canvas.height > layout.canvas.width);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = converter(Vec::new(), FakeOcr::working())
            .with_config(LayoutConfig::new().with_margin_factor(0.7));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_inspect() {
        let info = converter(vec![FakePage::text(&[BODY]); 4], FakeOcr::working())
            .inspect(PDF)
            .unwrap();
        assert_eq!(info.page_count, 4);
        assert_eq!(info.metadata.title.as_deref(), Some("Fake"));
        assert_eq!(info.estimated_processing_seconds, 18.0);
        assert_eq!(
            info.first_page.map(|g| g.bounds()),
            Some(Rect::new(0.0, 0.0, 612.0, 792.0))
        );
    }

    #[test]
    fn test_render_matches_convert() {
        let pages = vec![FakePage::text(&[BODY]), FakePage::scanned()];
        let converter = converter(pages, FakeOcr::failing_on(&[1]));
        let options = ConvertOptions::default();

        let layout = converter.layout(PDF, &options).unwrap();
        let rendered = converter.render(&layout).unwrap();
        assert_eq!(rendered, converter.convert(PDF, &options).unwrap());

        let slides: Vec<PageLayout> = serde_json::from_slice(&rendered).unwrap();
        assert_eq!(slides.len(), 2);
        assert!(slides[1].is_blank());
    }

    #[test]
    fn test_layout_serializes() {
        let layout = converter(vec![FakePage::scanned()], FakeOcr::failing_on(&[0]))
            .layout(PDF, &ConvertOptions::default())
            .unwrap();
        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["pages"][0]["status"], "blank");
        assert_eq!(json["pages"][0]["reason"], "ocr_failed");
    }
}
