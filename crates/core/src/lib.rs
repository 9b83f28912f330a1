//! Core layout pipeline for PDF to text-only PowerPoint conversion:
//! page classification, fragment regrouping, canvas projection and font
//! sizing, orchestrated per page behind collaborator traits.

pub mod classify;
pub mod config;
pub mod error;
pub mod info;
pub mod normalize;
pub mod ocr;
pub mod pipeline;
pub mod sizer;
pub mod source;
pub mod transform;
pub mod types;

pub use classify::{classify, Classification, PageClassifier};
pub use config::{ConvertOptions, LayoutConfig};
pub use error::{Error, Result};
pub use info::{estimate_processing_seconds, DocumentInfo};
pub use normalize::{normalize_and_group, FragmentNormalizer};
pub use ocr::{group_ocr_words, OcrWord, PageImage};
pub use pipeline::{BlankReason, Converter, DocumentLayout, PageOutcome, PageState};
pub use sizer::{font_size_for, RegionSizer};
pub use source::{DocumentLoader, DocumentMetadata, OcrEngine, OcrRequest, PageSource, SlideRenderer};
pub use transform::{compute_canvas, project, CoordinateTransform, Placement};
pub use types::{
    CanvasSpec, DocumentFormat, FragmentSource, PageGeometry, PageLayout, PlacedRegion, Rect,
    TextFragment, TextRegion, EMU_PER_INCH, EMU_PER_POINT,
};
