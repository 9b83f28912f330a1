//! Fragment normalization and regrouping.
//!
//! Raw fragments (native text segments or OCR lines) are cleaned, merged
//! into lines and paragraphs, dehyphenated and ranked in reading order:
//! top-to-bottom by line band, left-to-right inside a band.

use crate::config::LayoutConfig;
use crate::types::{FragmentSource, Rect, TextFragment, TextRegion};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::decompose_compatible;

/// Regex to collapse runs of horizontal whitespace into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\x0B\x0C\p{Zs}]+").unwrap());

/// Regex to squeeze three or more newlines into one blank line.
static EXCESS_NEWLINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Regex matching a word broken by a hyphen at the end of an internal line.
static LINE_BREAK_HYPHEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{L})[-\x{00AD}\x{2010}]\n[\t\p{Zs}]*(\p{Ll})").unwrap()
});

/// Characters treated as an end-of-line hyphen.
const HYPHENS: &[char] = &['-', '\u{00AD}', '\u{2010}'];

/// Below this share of the line height, neighbouring fragments are glued
/// together without a space.
const TIGHT_GAP_FACTOR: f64 = 0.15;

/// Share of the smaller box two duplicates must cover.
const DUPLICATE_OVERLAP: f64 = 0.8;

/// Fragment normalizer and grouper.
#[derive(Debug, Clone)]
pub struct FragmentNormalizer {
    dehyphenate: bool,
    line_band_overlap: f64,
    word_gap_factor: f64,
    paragraph_gap_factor: f64,
}

impl Default for FragmentNormalizer {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

/// A line, or a run of lines, under construction.
#[derive(Debug, Clone)]
struct Line {
    bbox: Rect,
    /// First physical line.
    head: Rect,
    /// Last physical line.
    tail: Rect,
    text: String,
    /// Raw text ended with a hyphen glued to the line end.
    hyphenated: bool,
    source: FragmentSource,
}

impl FragmentNormalizer {
    /// Create a normalizer with default tolerances and dehyphenation on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the grouping tolerances from a layout configuration.
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            dehyphenate: true,
            line_band_overlap: config.line_band_overlap,
            word_gap_factor: config.word_gap_factor,
            paragraph_gap_factor: config.paragraph_gap_factor,
        }
    }

    /// Set whether end-of-line hyphenation is removed.
    pub fn with_dehyphenation(mut self, dehyphenate: bool) -> Self {
        self.dehyphenate = dehyphenate;
        self
    }

    /// Normalize the text of one fragment.
    ///
    /// - Converts `\r\n` and `\r` to `\n`
    /// - Joins `word-\nword` when the continuation is lowercase (if enabled)
    /// - Expands typographic ligatures
    /// - Collapses horizontal whitespace runs and trims every line
    /// - Keeps paragraph breaks, at most one blank line in a row
    pub fn normalize_text(&self, text: &str) -> String {
        let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

        if self.dehyphenate {
            result = LINE_BREAK_HYPHEN_REGEX
                .replace_all(&result, "${1}${2}")
                .into_owned();
        }

        result = expand_ligatures(&result);

        let collapsed = result
            .split('\n')
            .map(|line| {
                WHITESPACE_COLLAPSE_REGEX
                    .replace_all(line, " ")
                    .trim()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        EXCESS_NEWLINES_REGEX
            .replace_all(&collapsed, "\n\n")
            .trim()
            .to_string()
    }

    /// Turn one page's fragments into reading-ordered regions.
    ///
    /// Fragments with non-finite geometry or blank text are skipped.
    pub fn normalize_and_group(&self, fragments: &[TextFragment]) -> Vec<TextRegion> {
        let mut native = Vec::new();
        let mut ocr = Vec::new();

        for fragment in fragments {
            let Some(line) = self.prepare(fragment) else {
                continue;
            };
            match line.source {
                FragmentSource::Native => native.push(line),
                FragmentSource::Ocr => ocr.push(line),
            }
        }

        let mut lines = self.assemble_lines(native);
        lines.extend(ocr);

        let ordered: Vec<Line> = into_bands(lines, |l| l.bbox, self.line_band_overlap)
            .into_iter()
            .flatten()
            .collect();

        let paragraphs = self.group_paragraphs(ordered);

        let regions: Vec<TextRegion> = into_bands(paragraphs, |p| p.bbox, self.line_band_overlap)
            .into_iter()
            .flatten()
            .filter(|p| !p.text.is_empty())
            .enumerate()
            .map(|(order_index, p)| TextRegion {
                bbox: p.bbox,
                text: p.text,
                order_index,
            })
            .collect();

        log::debug!(
            "normalized {} fragments into {} regions",
            fragments.len(),
            regions.len()
        );

        regions
    }

    /// Filter and clean a single fragment.
    fn prepare(&self, fragment: &TextFragment) -> Option<Line> {
        if !fragment.bbox.is_finite() {
            log::debug!("skipping fragment with non-finite geometry: {:?}", fragment.bbox);
            return None;
        }

        let text = self.normalize_text(&fragment.text);
        if text.is_empty() {
            return None;
        }

        Some(Line {
            bbox: fragment.bbox,
            head: fragment.bbox,
            tail: fragment.bbox,
            hyphenated: ends_with_break_hyphen(&fragment.text),
            text,
            source: fragment.source,
        })
    }

    /// Merge native fragments sharing a line band and sitting close together.
    fn assemble_lines(&self, pieces: Vec<Line>) -> Vec<Line> {
        let mut lines = Vec::new();

        for band in into_bands(pieces, |l| l.bbox, self.line_band_overlap) {
            let mut current: Option<Line> = None;

            for piece in drop_duplicates(band) {
                current = match current.take() {
                    None => Some(piece),
                    Some(mut line) => {
                        let height = line.bbox.height().max(piece.bbox.height());
                        let gap = piece.bbox.x0 - line.bbox.x1;
                        if gap <= self.word_gap_factor * height {
                            if gap >= TIGHT_GAP_FACTOR * height {
                                line.text.push(' ');
                            }
                            line.text.push_str(&piece.text);
                            line.bbox = line.bbox.union(&piece.bbox);
                            line.head = line.bbox;
                            line.tail = line.bbox;
                            line.hyphenated = piece.hyphenated;
                            Some(line)
                        } else {
                            lines.push(line);
                            Some(piece)
                        }
                    }
                };
            }

            if let Some(line) = current {
                lines.push(line);
            }
        }

        lines
    }

    /// Stack lines into paragraphs, top to bottom.
    ///
    /// A native line extends the nearest paragraph right above it. OCR lines
    /// keep the grouping the OCR hierarchy gave them and only merge to undo a
    /// line-end hyphen.
    fn group_paragraphs(&self, lines: Vec<Line>) -> Vec<Line> {
        let mut paragraphs: Vec<Line> = Vec::new();

        for line in lines {
            let source = line.source;
            let target = paragraphs
                .iter_mut()
                .filter(|p| p.source == source)
                .filter_map(|p| {
                    let gap = self.paragraph_gap(p, &line)?;
                    let joins = source == FragmentSource::Native || self.continues_hyphenated(p, &line);
                    joins.then_some((gap, p))
                })
                .min_by(|a, b| a.0.total_cmp(&b.0));

            match target {
                Some((_, paragraph)) => self.extend(paragraph, line),
                None => paragraphs.push(line),
            }
        }

        paragraphs
    }

    /// Append a line to a paragraph, gluing a word broken at the line end.
    fn extend(&self, paragraph: &mut Line, line: Line) {
        if self.continues_hyphenated(paragraph, &line) {
            paragraph.text.pop();
        } else {
            paragraph.text.push('\n');
        }
        paragraph.text.push_str(&line.text);
        paragraph.bbox = paragraph.bbox.union(&line.bbox);
        paragraph.tail = line.tail;
        paragraph.hyphenated = line.hyphenated;
    }

    /// The paragraph ends in a break hyphen and `next` starts lowercase.
    /// Placement is checked by [`Self::paragraph_gap`].
    fn continues_hyphenated(&self, paragraph: &Line, next: &Line) -> bool {
        self.dehyphenate
            && paragraph.hyphenated
            && paragraph.text.ends_with(HYPHENS)
            && next.text.chars().next().is_some_and(char::is_lowercase)
    }

    /// Vertical gap between a paragraph and a line that may extend it.
    fn paragraph_gap(&self, paragraph: &Line, line: &Line) -> Option<f64> {
        if same_band(&paragraph.tail, &line.head, self.line_band_overlap)
            || line.head.y0 <= paragraph.tail.y0
            || paragraph.bbox.horizontal_overlap(&line.bbox) <= 0.0
        {
            return None;
        }

        let gap = line.head.y0 - paragraph.tail.y1;
        (gap <= self.paragraph_gap_factor * line.head.height()).then_some(gap)
    }
}

/// Normalize and group with default tolerances.
pub fn normalize_and_group(fragments: &[TextFragment], dehyphenate: bool) -> Vec<TextRegion> {
    FragmentNormalizer::new()
        .with_dehyphenation(dehyphenate)
        .normalize_and_group(fragments)
}

/// Two boxes sit on the same horizontal line band.
pub(crate) fn same_band(a: &Rect, b: &Rect, overlap_ratio: f64) -> bool {
    let overlap = a.vertical_overlap(b);
    let min_height = a.height().min(b.height());
    if min_height <= 0.0 {
        return overlap >= 0.0;
    }
    overlap >= overlap_ratio * min_height
}

/// Cluster items into line bands, top-to-bottom, each band left-to-right.
///
/// A band is anchored on its topmost item so that tall items cannot chain
/// unrelated lines together.
fn into_bands<T>(mut items: Vec<T>, bbox: impl Fn(&T) -> Rect, overlap_ratio: f64) -> Vec<Vec<T>> {
    items.sort_by(|a, b| {
        let (ra, rb) = (bbox(a), bbox(b));
        ra.y0.total_cmp(&rb.y0).then(ra.x0.total_cmp(&rb.x0))
    });

    let mut bands: Vec<(Rect, Vec<T>)> = Vec::new();
    for item in items {
        let rect = bbox(&item);
        match bands.last_mut() {
            Some((anchor, members)) if same_band(anchor, &rect, overlap_ratio) => members.push(item),
            _ => bands.push((rect, vec![item])),
        }
    }

    bands
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|a, b| bbox(a).x0.total_cmp(&bbox(b).x0));
            members
        })
        .collect()
}

/// Drop fragments repeated on top of an identical one (fake bold, overprint).
fn drop_duplicates(band: Vec<Line>) -> Vec<Line> {
    let mut kept: Vec<Line> = Vec::with_capacity(band.len());
    for piece in band {
        let duplicate = kept
            .iter()
            .any(|k| k.text == piece.text && covers(&k.bbox, &piece.bbox));
        if duplicate {
            log::trace!("dropping duplicate fragment {:?}", piece.text);
        } else {
            kept.push(piece);
        }
    }
    kept
}

/// The boxes overlap over most of the smaller one.
fn covers(a: &Rect, b: &Rect) -> bool {
    let min_area = a.area().min(b.area());
    if min_area <= 0.0 {
        return a == b;
    }
    let shared = a.horizontal_overlap(b).max(0.0) * a.vertical_overlap(b).max(0.0);
    shared >= DUPLICATE_OVERLAP * min_area
}

/// Raw text ends in a hyphen glued to a letter, with no trailing whitespace.
fn ends_with_break_hyphen(raw: &str) -> bool {
    let mut rev = raw.chars().rev();
    match (rev.next(), rev.next()) {
        (Some(hyphen), Some(prev)) => HYPHENS.contains(&hyphen) && prev.is_alphabetic(),
        _ => false,
    }
}

/// Replace ligature code points (ﬀ, ﬁ, ﬂ, ﬃ, ﬄ, ﬅ, ﬆ) with their letters.
fn expand_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if ('\u{FB00}'..='\u{FB06}').contains(&c) {
            decompose_compatible(c, |d| out.push(d));
        } else {
            out.push(c);
        }
    }
    out
}
