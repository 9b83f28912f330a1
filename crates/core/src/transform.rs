//! Page space to canvas space.
//!
//! The canvas is chosen once per document from the dominant page aspect
//! ratio. Regions are then scaled per axis into the canvas content box
//! (canvas minus margins), grown to the minimum readable size and kept
//! inside the margins.

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::types::{CanvasSpec, PageGeometry, Rect};
use serde::{Deserialize, Serialize};

/// Default widescreen slide width: 13.333in.
pub const DEFAULT_CANVAS_WIDTH: i64 = 12_192_000;

/// Default widescreen slide height: 7.5in.
pub const DEFAULT_CANVAS_HEIGHT: i64 = 6_858_000;

/// Smallest slide side PowerPoint accepts: 1in.
pub const MIN_SLIDE_SIDE: i64 = 914_400;

/// Largest slide side PowerPoint accepts: 56in.
pub const MAX_SLIDE_SIDE: i64 = 51_206_400;

const WIDESCREEN_RATIO: f64 = 16.0 / 9.0;

/// A box on the canvas in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Placement {
    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }
}

/// Canvas selection and region projection.
#[derive(Debug, Clone)]
pub struct CoordinateTransform {
    margin_factor: f64,
    min_width: i64,
    min_height: i64,
    aspect_tolerance: f64,
    min_ratio: f64,
    max_ratio: f64,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl CoordinateTransform {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            margin_factor: config.margin_factor,
            min_width: config.min_region_width,
            min_height: config.min_region_height,
            aspect_tolerance: config.aspect_tolerance,
            min_ratio: config.min_canvas_ratio,
            max_ratio: config.max_canvas_ratio,
        }
    }

    /// Pick the canvas for a document.
    ///
    /// Near-16:9 documents (and documents with no usable geometry) get the
    /// default widescreen canvas. Otherwise the width stays at 13.333in and
    /// the height follows the dominant page ratio.
    pub fn compute_canvas(&self, geometries: &[PageGeometry]) -> CanvasSpec {
        let canvas = CanvasSpec {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            margin_factor: self.margin_factor,
        };

        let Some(ratio) = dominant_ratio(geometries) else {
            return canvas;
        };

        let deviation = (ratio - WIDESCREEN_RATIO).abs() / WIDESCREEN_RATIO;
        if deviation <= self.aspect_tolerance {
            return canvas;
        }

        let ratio = ratio.clamp(self.min_ratio, self.max_ratio);
        let height = ((canvas.width as f64 / ratio).round() as i64).clamp(MIN_SLIDE_SIDE, MAX_SLIDE_SIDE);

        log::debug!(
            "page ratio {:.3} is {:.0}% off 16:9, canvas height {} EMU",
            ratio,
            deviation * 100.0,
            height
        );

        CanvasSpec { height, ..canvas }
    }

    /// Map a region in page points onto the canvas.
    ///
    /// The result always lies inside the margin boundary and is at least the
    /// minimum region size (unless the content box itself is smaller).
    pub fn project(&self, region: &Rect, page: &PageGeometry, canvas: &CanvasSpec) -> Result<Placement> {
        if !region.is_finite() || region.x1 < region.x0 || region.y1 < region.y0 {
            return Err(Error::LayoutInvariantViolation(format!(
                "unusable region geometry {:?}",
                region
            )));
        }
        if !(page.width.is_finite() && page.height.is_finite() && page.width > 0.0 && page.height > 0.0) {
            return Err(Error::LayoutInvariantViolation(format!(
                "unusable page geometry {}x{}",
                page.width, page.height
            )));
        }

        let margin_x = canvas.margin_x();
        let margin_y = canvas.margin_y();
        let content_w = canvas.width as f64 - 2.0 * margin_x;
        let content_h = canvas.height as f64 - 2.0 * margin_y;
        let scale_x = content_w / page.width;
        let scale_y = content_h / page.height;

        let clip_x = |v: f64| (margin_x + v * scale_x).clamp(margin_x, margin_x + content_w);
        let clip_y = |v: f64| (margin_y + v * scale_y).clamp(margin_y, margin_y + content_h);

        let (x0, x1) = (clip_x(region.x0), clip_x(region.x1));
        let (y0, y1) = (clip_y(region.y0), clip_y(region.y1));

        let placement = Placement {
            x: x0.round() as i64,
            y: y0.round() as i64,
            width: (x1 - x0).round() as i64,
            height: (y1 - y0).round() as i64,
        };

        Ok(self.enforce_minimum(placement, canvas))
    }

    /// Grow a placement to the minimum size around its centre and shift it
    /// back inside the margin boundary. Applying it twice changes nothing.
    pub fn enforce_minimum(&self, placement: Placement, canvas: &CanvasSpec) -> Placement {
        let left = canvas.margin_x().ceil() as i64;
        let right = (canvas.width as f64 - canvas.margin_x()).floor() as i64;
        let top = canvas.margin_y().ceil() as i64;
        let bottom = (canvas.height as f64 - canvas.margin_y()).floor() as i64;

        let (x, width) = fit_axis(placement.x, placement.width, self.min_width, left, right);
        let (y, height) = fit_axis(placement.y, placement.height, self.min_height, top, bottom);

        Placement { x, y, width, height }
    }
}

/// Pick the canvas with default settings.
pub fn compute_canvas(geometries: &[PageGeometry]) -> CanvasSpec {
    CoordinateTransform::default().compute_canvas(geometries)
}

/// Project with default settings.
pub fn project(region: &Rect, page: &PageGeometry, canvas: &CanvasSpec) -> Result<Placement> {
    CoordinateTransform::default().project(region, page, canvas)
}

/// One axis of minimum enforcement: grow `len` to `min` around the centre,
/// never past the available span, then clamp the start into `[lo, hi - len]`.
fn fit_axis(start: i64, len: i64, min: i64, lo: i64, hi: i64) -> (i64, i64) {
    let available = (hi - lo).max(0);
    let mut len = len.max(0);
    let mut start = start;

    if len < min {
        let doubled_center = 2 * start + len;
        len = min;
        start = (doubled_center - len).div_euclid(2);
    }

    let len = len.min(available);
    (start.clamp(lo, (hi - len).max(lo)), len)
}

/// Most frequent page ratio, bucketed to 0.01. Ties go to the earliest page.
fn dominant_ratio(geometries: &[PageGeometry]) -> Option<f64> {
    // (bucket, count, first ratio seen)
    let mut buckets: Vec<(i64, usize, f64)> = Vec::new();

    for geometry in geometries {
        let ratio = geometry.aspect_ratio();
        if !ratio.is_finite() || ratio <= 0.0 {
            continue;
        }
        let key = (ratio * 100.0).round() as i64;
        match buckets.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, count, _)) => *count += 1,
            None => buckets.push((key, 1, ratio)),
        }
    }

    let mut best: Option<(usize, f64)> = None;
    for (_, count, ratio) in buckets {
        if best.map_or(true, |(best_count, _)| count > best_count) {
            best = Some((count, ratio));
        }
    }
    best.map(|(_, ratio)| ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MIN_REGION_HEIGHT, MIN_REGION_WIDTH};

    fn page(width: f64, height: f64) -> PageGeometry {
        PageGeometry::new(width, height).unwrap()
    }

    fn default_canvas() -> CanvasSpec {
        compute_canvas(&[])
    }

    fn inside_margins(p: &Placement, canvas: &CanvasSpec) -> bool {
        p.x as f64 >= canvas.margin_x()
            && p.y as f64 >= canvas.margin_y()
            && p.right() as f64 <= canvas.width as f64 - canvas.margin_x()
            && p.bottom() as f64 <= canvas.height as f64 - canvas.margin_y()
    }

    #[test]
    fn test_widescreen_page_keeps_default_canvas() {
        let canvas = compute_canvas(&[page(960.0, 540.0)]);
        assert_eq!(canvas.width, DEFAULT_CANVAS_WIDTH);
        assert_eq!(canvas.height, DEFAULT_CANVAS_HEIGHT);
        assert_eq!(canvas.margin_factor, 0.02);
    }

    #[test]
    fn test_no_pages_gives_default_canvas() {
        let canvas = default_canvas();
        assert_eq!((canvas.width, canvas.height), (12_192_000, 6_858_000));
    }

    #[test]
    fn test_letter_portrait_canvas() {
        let canvas = compute_canvas(&[page(612.0, 792.0)]);
        assert_eq!(canvas.width, DEFAULT_CANVAS_WIDTH);
        assert_eq!(canvas.height, 15_777_882);
    }

    #[test]
    fn test_dominant_ratio_wins() {
        let pages = vec![
            page(612.0, 792.0),
            page(960.0, 540.0),
            page(960.0, 540.0),
        ];
        let canvas = compute_canvas(&pages);
        assert_eq!(canvas.height, DEFAULT_CANVAS_HEIGHT);

        // tie: earliest page decides
        let tie = vec![page(612.0, 792.0), page(960.0, 540.0)];
        assert_eq!(compute_canvas(&tie).height, 15_777_882);
    }

    #[test]
    fn test_extreme_ratio_is_clamped() {
        let canvas = compute_canvas(&[page(100.0, 1000.0)]);
        assert_eq!(canvas.height, 24_384_000);

        let banner = compute_canvas(&[page(5000.0, 100.0)]);
        assert_eq!(banner.height, 4_064_000);
    }

    #[test]
    fn test_full_page_region_fills_content_box() {
        let canvas = default_canvas();
        let placed = project(&Rect::new(0.0, 0.0, 960.0, 540.0), &page(960.0, 540.0), &canvas).unwrap();

        assert_eq!(placed.x, 243_840);
        assert_eq!(placed.y, 137_160);
        assert_eq!(placed.width, 11_704_320);
        assert_eq!(placed.height, 6_583_680);
        assert!(inside_margins(&placed, &canvas));
    }

    #[test]
    fn test_region_off_page_is_clipped() {
        let canvas = default_canvas();
        let placed = project(
            &Rect::new(900.0, 500.0, 2000.0, 1000.0),
            &page(960.0, 540.0),
            &canvas,
        )
        .unwrap();
        assert!(inside_margins(&placed, &canvas));
        assert!(placed.width >= MIN_REGION_WIDTH);
        assert!(placed.height >= MIN_REGION_HEIGHT);
    }

    #[test]
    fn test_tiny_region_grows_around_centre() {
        let canvas = default_canvas();
        let transform = CoordinateTransform::default();
        let tiny = Placement {
            x: 6_096_000,
            y: 3_429_000,
            width: 1,
            height: 1,
        };

        let grown = transform.enforce_minimum(tiny, &canvas);
        assert_eq!(grown.width, MIN_REGION_WIDTH);
        assert_eq!(grown.height, MIN_REGION_HEIGHT);

        let old_center = 2 * tiny.x + tiny.width;
        let new_center = 2 * grown.x + grown.width;
        assert!((old_center - new_center).abs() <= 1);
        assert!(inside_margins(&grown, &canvas));
    }

    #[test]
    fn test_corner_region_shifts_inside_margin() {
        let canvas = default_canvas();
        let placed = project(&Rect::new(0.0, 0.0, 1.0, 1.0), &page(960.0, 540.0), &canvas).unwrap();

        assert_eq!(placed.x, 243_840);
        assert_eq!(placed.y, 137_160);
        assert_eq!(placed.width, MIN_REGION_WIDTH);
        assert_eq!(placed.height, MIN_REGION_HEIGHT);

        let far = project(
            &Rect::new(959.0, 539.0, 960.0, 540.0),
            &page(960.0, 540.0),
            &canvas,
        )
        .unwrap();
        assert!(inside_margins(&far, &canvas));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let canvas = compute_canvas(&[page(612.0, 792.0)]);
        let transform = CoordinateTransform::default();
        let geometry = page(612.0, 792.0);

        for region in [
            Rect::new(72.0, 72.0, 540.0, 100.0),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(600.0, 780.0, 612.0, 792.0),
        ] {
            let first = transform.project(&region, &geometry, &canvas).unwrap();
            let second = transform.project(&region, &geometry, &canvas).unwrap();
            assert_eq!(first, second);
            assert_eq!(transform.enforce_minimum(first, &canvas), first);
        }
    }

    #[test]
    fn test_non_finite_region_is_rejected() {
        let canvas = default_canvas();
        let result = project(
            &Rect {
                x0: f64::NAN,
                y0: 0.0,
                x1: 10.0,
                y1: 10.0,
            },
            &page(960.0, 540.0),
            &canvas,
        );
        assert!(matches!(result, Err(Error::LayoutInvariantViolation(_))));

        let inverted = Rect {
            x0: 10.0,
            y0: 0.0,
            x1: 5.0,
            y1: 10.0,
        };
        assert!(project(&inverted, &page(960.0, 540.0), &canvas).is_err());
    }

    #[test]
    fn test_minimum_larger_than_content_is_capped() {
        let transform = CoordinateTransform::from_config(
            &LayoutConfig::new().with_min_region_size(20_000_000, 254_000),
        );
        let canvas = default_canvas();
        let placed = transform
            .project(&Rect::new(10.0, 10.0, 20.0, 20.0), &page(960.0, 540.0), &canvas)
            .unwrap();
        assert_eq!(placed.x, 243_840);
        assert_eq!(placed.width, 11_704_320);
    }
}
