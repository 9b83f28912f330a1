//! CLI tool for converting PDF files into text-only PowerPoint presentations.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2pptx_core::{ConvertOptions, Converter, DocumentFormat, DocumentLayout, LayoutConfig};
use pdf2pptx_pdf::PdfiumLoader;
use pdf2pptx_pptx::{PptxReader, PptxWriter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Convert PDF files into text-only PowerPoint presentations, one slide per page.
///
/// A .pptx input is summarized (slide size, slide texts) as JSON instead.
#[derive(Parser, Debug)]
#[command(name = "pdf2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) (.pdf to convert, .pptx to summarize)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the computed layout as JSON to stdout
    #[arg(long)]
    print_layout: bool,

    /// Also write the computed layout as <name>.layout.json
    #[arg(long)]
    layout_json: bool,

    /// Print document information as JSON instead of converting
    #[arg(long)]
    info: bool,

    /// OCR language (repeatable, e.g. -l eng -l deu)
    #[arg(short = 'l', long = "lang", default_value = "eng")]
    languages: Vec<String>,

    /// Keep end-of-line hyphens instead of joining split words
    #[arg(long)]
    no_dehyphenate: bool,

    /// Render resolution for OCR
    #[arg(long, default_value = "300")]
    dpi: u32,

    /// Total OCR time budget per document, in seconds
    #[arg(long)]
    ocr_timeout: Option<u64>,

    /// Keep sparse native text when OCR fails instead of a blank slide
    #[arg(long)]
    ocr_fallback_native: bool,

    /// Slide margin as a fraction of each side (default: 0.02)
    #[arg(long)]
    margin: Option<f64>,

    /// Minimum native characters before a page skips OCR (default: 20)
    #[arg(long)]
    text_threshold: Option<usize>,

    /// Smallest font size in points (default: 10)
    #[arg(long)]
    min_font: Option<f64>,

    /// Largest font size in points (default: 28)
    #[arg(long)]
    max_font: Option<f64>,

    /// Directory holding the pdfium library
    #[arg(long)]
    pdfium_dir: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn layout_config(&self) -> LayoutConfig {
        let mut config = LayoutConfig::new();
        if let Some(margin) = self.margin {
            config = config.with_margin_factor(margin);
        }
        if let Some(threshold) = self.text_threshold {
            config = config.with_text_threshold(threshold);
        }
        let min_font = self.min_font.unwrap_or(config.min_font_size);
        let max_font = self.max_font.unwrap_or(config.max_font_size);
        config.with_font_bounds(min_font, max_font)
    }

    fn convert_options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new()
            .with_languages(self.languages.iter().cloned())
            .with_dehyphenate(!self.no_dehyphenate)
            .with_ocr_dpi(self.dpi)
            .with_ocr_fallback_to_native(self.ocr_fallback_native);
        if let Some(secs) = self.ocr_timeout {
            options = options.with_ocr_timeout(Duration::from_secs(secs));
        }
        options
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let options = args.convert_options();
    let mut converter: Option<Converter> = None;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        if let Err(e) = process_file(input_path, &args, &options, &mut converter) {
            eprintln!("Error processing {}: {:#}", input_path.display(), e);
        }
    }

    Ok(())
}

/// Build the converter on first use, so .pptx-only runs never need pdfium.
fn converter<'a>(slot: &'a mut Option<Converter>, args: &Args) -> Result<&'a Converter> {
    if slot.is_none() {
        let loader = match &args.pdfium_dir {
            Some(dir) => PdfiumLoader::with_library_dir(dir)?,
            None => PdfiumLoader::new()?,
        };
        let converter = Converter::new(loader, pdf2pptx_pdf::default_engine(), PptxWriter::new())
            .with_config(args.layout_config())
            .context("Invalid layout settings")?;
        *slot = Some(converter);
    }
    slot.as_ref().context("converter not initialized")
}

/// Process a single input file.
fn process_file(
    input_path: &Path,
    args: &Args,
    options: &ConvertOptions,
    converter_slot: &mut Option<Converter>,
) -> Result<()> {
    let bytes = std::fs::read(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;

    let format = DocumentFormat::from_magic(&bytes)
        .or_else(|| {
            input_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(DocumentFormat::from_extension)
        })
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format"))?;

    match format {
        DocumentFormat::Pptx => {
            log::debug!("Reading as PPTX");
            let summary = PptxReader::new().read_bytes(&bytes)?;
            let report = serde_json::json!({
                "file": input_path.display().to_string(),
                "slide_count": summary.slide_count(),
                "width_inches": summary.width_inches(),
                "height_inches": summary.height_inches(),
                "width_points": summary.width_points(),
                "height_points": summary.height_points(),
                "presentation": summary,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        DocumentFormat::Pdf => {
            let converter = converter(converter_slot, args)?;

            if args.info {
                let info = converter.inspect(&bytes)?;
                println!("{}", serde_json::to_string_pretty(&info)?);
                return Ok(());
            }

            let output_path = get_output_path(input_path, args.output.as_ref(), "pptx")?;
            let pptx = if args.print_layout || args.layout_json {
                let layout = converter.layout(&bytes, options)?;
                report_layout(&layout, args);

                if args.print_layout {
                    println!("{}", serde_json::to_string_pretty(&layout)?);
                }
                if args.layout_json {
                    let json_path = get_output_path(input_path, args.output.as_ref(), "layout.json")?;
                    write_output(&json_path, serde_json::to_string_pretty(&layout)?.as_bytes())?;
                }

                converter.render(&layout)?
            } else {
                converter.convert(&bytes, options)?
            };

            write_output(&output_path, &pptx)?;
            if args.verbose {
                eprintln!("Written to: {}", output_path.display());
            }
        }
    }

    Ok(())
}

/// Print a one-line page summary in verbose mode.
fn report_layout(layout: &DocumentLayout, args: &Args) {
    if args.verbose {
        eprintln!(
            "  {} pages, {} via OCR, {} blank",
            layout.page_count(),
            layout.ocr_count(),
            layout.blank_count()
        );
    }
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>, extension: &str) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.{}", stem, extension);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_input() {
        let path = get_output_path(Path::new("docs/report.pdf"), None, "pptx").unwrap();
        assert_eq!(path, PathBuf::from("docs/report.pptx"));

        let json = get_output_path(Path::new("report.pdf"), None, "layout.json").unwrap();
        assert_eq!(json, PathBuf::from("report.layout.json"));
    }

    #[test]
    fn test_flags_map_onto_config() {
        let args = Args::parse_from([
            "pdf2pptx",
            "in.pdf",
            "--margin",
            "0.05",
            "--max-font",
            "40",
            "-l",
            "eng",
            "-l",
            "deu",
            "--ocr-timeout",
            "30",
            "--no-dehyphenate",
        ]);

        let config = args.layout_config();
        assert_eq!(config.margin_factor, 0.05);
        assert_eq!(config.min_font_size, 10.0);
        assert_eq!(config.max_font_size, 40.0);

        let options = args.convert_options();
        assert_eq!(options.ocr_languages, vec!["eng", "deu"]);
        assert_eq!(options.ocr_timeout, Some(Duration::from_secs(30)));
        assert!(!options.dehyphenate);
    }
}
