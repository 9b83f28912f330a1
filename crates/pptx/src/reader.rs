//! PPTX reader: slide size, slide order and positioned text shapes.

use pdf2pptx_core::{Error, Result, EMU_PER_INCH, EMU_PER_POINT};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Slide size used when `presentation.xml` has no `sldSz` (4:3 default).
const DEFAULT_SLIDE_SIZE: (i64, i64) = (9_144_000, 6_858_000);

/// Summary of a presentation's layout and text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PptxSummary {
    /// Slide width in EMU.
    pub slide_width: i64,
    /// Slide height in EMU.
    pub slide_height: i64,
    pub slides: Vec<SlideSummary>,
}

impl PptxSummary {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn width_inches(&self) -> f64 {
        self.slide_width as f64 / EMU_PER_INCH as f64
    }

    pub fn height_inches(&self) -> f64 {
        self.slide_height as f64 / EMU_PER_INCH as f64
    }

    pub fn width_points(&self) -> f64 {
        self.slide_width as f64 / EMU_PER_POINT as f64
    }

    pub fn height_points(&self) -> f64 {
        self.slide_height as f64 / EMU_PER_POINT as f64
    }
}

/// One slide's text shapes, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideSummary {
    /// 1-based slide number.
    pub number: usize,
    pub shapes: Vec<ShapeSummary>,
}

impl SlideSummary {
    pub fn texts(&self) -> Vec<&str> {
        self.shapes.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A shape carrying text, with its offset and extent in EMU.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapeSummary {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    /// Paragraphs joined with `\n`.
    pub text: String,
    /// Size of the first sized run, in points.
    pub font_size: Option<f64>,
}

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a PPTX file from a reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<PptxSummary> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let presentation = read_file_from_archive(&mut archive, "ppt/presentation.xml")?;
        let (slide_size, slide_ids) = parse_presentation(&presentation)?;

        let rels = read_file_from_archive(&mut archive, "ppt/_rels/presentation.xml.rels")?;
        let slide_paths = slide_order(&rels, &slide_ids)?;

        let (slide_width, slide_height) = slide_size.unwrap_or(DEFAULT_SLIDE_SIZE);
        let mut slides = Vec::with_capacity(slide_paths.len());

        for (idx, slide_path) in slide_paths.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, slide_path)?;
            slides.push(SlideSummary {
                number: idx + 1,
                shapes: extract_shapes_from_xml(&content),
            });
        }

        log::debug!(
            "read {} slides at {}x{} EMU",
            slides.len(),
            slide_width,
            slide_height
        );

        Ok(PptxSummary {
            slide_width,
            slide_height,
            slides,
        })
    }

    /// Read a PPTX file held in memory.
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<PptxSummary> {
        self.read(std::io::Cursor::new(bytes))
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Slide size and the `r:id`s of `sldIdLst`, in presentation order.
fn parse_presentation(xml: &str) -> Result<(Option<(i64, i64)>, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut size = None;
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sldSz" => {
                    let cx = attr_value(e, b"cx").and_then(|v| v.parse().ok());
                    let cy = attr_value(e, b"cy").and_then(|v| v.parse().ok());
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        size = Some((cx, cy));
                    }
                }
                b"sldId" => {
                    if let Some(id) = attr_value(e, b"r:id") {
                        ids.push(id);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok((size, ids))
}

/// Resolve slide part paths, following `sldIdLst` when present and falling
/// back to the numbering of the slide relationships otherwise.
fn slide_order(rels_content: &str, slide_ids: &[String]) -> Result<Vec<String>> {
    let mut by_id: HashMap<String, String> = HashMap::new();
    let mut slides: Vec<(String, Option<usize>)> = Vec::new();

    let mut reader = Reader::from_str(rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"Relationship" => {
                let rel_type = attr_value(e, b"Type").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                let id = attr_value(e, b"Id").unwrap_or_default();

                // Slide relationships only, not layouts or masters
                if rel_type.ends_with("/slide") {
                    let full_path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
                    let order_num = extract_slide_number(&target).or_else(|| extract_slide_number(&id));
                    by_id.insert(id, full_path.clone());
                    slides.push((full_path, order_num));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    if !slide_ids.is_empty() {
        let ordered: Vec<String> = slide_ids
            .iter()
            .filter_map(|id| {
                let path = by_id.get(id).cloned();
                if path.is_none() {
                    log::warn!("slide relationship {} not found", id);
                }
                path
            })
            .collect();
        return Ok(ordered);
    }

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// Extract text shapes with position, size and first font size.
fn extract_shapes_from_xml(xml_content: &str) -> Vec<ShapeSummary> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut current_shape: Option<ShapeSummary> = None;
    let mut in_text_body = false;
    let mut in_text_run = false;
    let mut paragraphs = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        current_shape = Some(ShapeSummary::default());
                        paragraphs = 0;
                    }
                    b"txBody" => in_text_body = true,
                    b"p" if in_text_body => {
                        if let Some(shape) = current_shape.as_mut() {
                            if paragraphs > 0 {
                                shape.text.push('\n');
                            }
                        }
                        paragraphs += 1;
                    }
                    b"t" if in_text_body => in_text_run = true,
                    other => apply_geometry(current_shape.as_mut(), other, e),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"p" if in_text_body => {
                        if let Some(shape) = current_shape.as_mut() {
                            if paragraphs > 0 {
                                shape.text.push('\n');
                            }
                        }
                        paragraphs += 1;
                    }
                    other => apply_geometry(current_shape.as_mut(), other, e),
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text_run {
                    if let Some(shape) = current_shape.as_mut() {
                        let text = e.unescape().unwrap_or_default();
                        shape.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        if let Some(mut shape) = current_shape.take() {
                            shape.text = shape.text.trim().to_string();
                            if !shape.text.is_empty() {
                                shapes.push(shape);
                            }
                        }
                        in_text_body = false;
                        in_text_run = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"t" => in_text_run = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                // Continue parsing despite errors
            }
            _ => {}
        }
    }

    shapes
}

/// Record offset, extent and run size attributes on the open shape.
fn apply_geometry(shape: Option<&mut ShapeSummary>, local: &[u8], e: &BytesStart) {
    let Some(shape) = shape else {
        return;
    };
    let number = |key: &[u8]| attr_value(e, key).and_then(|v| v.parse::<i64>().ok());

    match local {
        b"off" => {
            shape.x = number(b"x").unwrap_or(shape.x);
            shape.y = number(b"y").unwrap_or(shape.y);
        }
        b"ext" => {
            shape.width = number(b"cx").unwrap_or(shape.width);
            shape.height = number(b"cy").unwrap_or(shape.height);
        }
        b"rPr" | b"endParaRPr" if shape.font_size.is_none() => {
            shape.font_size = number(b"sz").map(|sz| sz as f64 / 100.0);
        }
        _ => {}
    }
}

/// Value of an attribute by its qualified name.
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
