//! Font size heuristic for placed regions.

use crate::config::LayoutConfig;
use crate::types::emu_to_points;

/// Estimated glyph cell width as a share of the font size.
const CELL_WIDTH: f64 = 0.5;

/// Estimated line height as a share of the font size.
const CELL_HEIGHT: f64 = 1.2;

/// Cells charged for every explicit line break.
const LINE_BREAK_CELLS: usize = 4;

/// Sizes are chosen in half-point steps.
const STEP: f64 = 0.5;

/// Picks the largest font size whose estimated text area fits a box.
#[derive(Debug, Clone, Copy)]
pub struct RegionSizer {
    min_size: f64,
    max_size: f64,
}

impl Default for RegionSizer {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl RegionSizer {
    pub fn new(min_size: f64, max_size: f64) -> Self {
        Self { min_size, max_size }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.min_font_size, config.max_font_size)
    }

    /// Font size in points for `text` in a `(width, height)` EMU box.
    pub fn font_size_for(&self, (width, height): (i64, i64), text: &str) -> f64 {
        let area = emu_to_points(width as f64) * emu_to_points(height as f64);
        let cells = effective_chars(text);

        if cells == 0 || !(area > 0.0) {
            return self.min_size;
        }

        // size^2 * cells * CELL_WIDTH * CELL_HEIGHT <= area
        let limit = (area / (cells as f64 * CELL_WIDTH * CELL_HEIGHT)).sqrt();
        if limit <= self.min_size {
            return self.min_size;
        }

        let steps = ((limit.min(self.max_size) - self.min_size) / STEP).floor();
        self.min_size + steps * STEP
    }
}

/// Size with the default 10-28pt bounds.
pub fn font_size_for(size: (i64, i64), text: &str) -> f64 {
    RegionSizer::default().font_size_for(size, text)
}

fn effective_chars(text: &str) -> usize {
    let breaks = text.matches('\n').count();
    text.chars().filter(|&c| c != '\n').count() + LINE_BREAK_CELLS * breaks
}
