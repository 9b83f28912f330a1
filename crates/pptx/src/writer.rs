//! PPTX writer: one slide per page layout, one text box per placed region.

use pdf2pptx_core::{CanvasSpec, Error, PageLayout, PlacedRegion, Result, SlideRenderer};
use quick_xml::escape::escape;
use std::fmt::Write as _;
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// First relationship id used for slides in `presentation.xml.rels`.
const FIRST_SLIDE_REL: usize = 4;

/// Empty group shape properties every shape tree starts with.
const SP_TREE_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Writer for text-only PPTX presentations.
#[derive(Debug, Clone)]
pub struct PptxWriter {
    title: Option<String>,
    creator: String,
    language: String,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self {
            title: None,
            creator: "pdf2pptx".to_string(),
            language: "en-US".to_string(),
        }
    }
}

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title stored in the core properties.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author stored in the core properties.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Set the language tag put on every text run.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Write a presentation into any seekable sink.
    pub fn write<W: Write + Seek>(&self, sink: W, canvas: &CanvasSpec, pages: &[PageLayout]) -> Result<W> {
        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut add = |path: &str, content: &str| -> Result<()> {
            zip.start_file(path, options)
                .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
            zip.write_all(content.as_bytes())?;
            Ok(())
        };

        add("[Content_Types].xml", &content_types(pages.len()))?;
        add("_rels/.rels", &package_rels())?;
        add("docProps/app.xml", &self.app_props(pages.len()))?;
        add("docProps/core.xml", &self.core_props())?;
        add("ppt/presentation.xml", &presentation(canvas, pages.len()))?;
        add("ppt/_rels/presentation.xml.rels", &presentation_rels(pages.len()))?;
        add("ppt/presProps.xml", &pres_props())?;
        add("ppt/slideMasters/slideMaster1.xml", &slide_master())?;
        add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &relationships(&[
                (1, REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                (2, REL_THEME, "../theme/theme1.xml"),
            ]),
        )?;
        add("ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
        add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &relationships(&[(1, REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")]),
        )?;
        add("ppt/theme/theme1.xml", THEME)?;

        for (idx, page) in pages.iter().enumerate() {
            let number = idx + 1;
            add(&format!("ppt/slides/slide{}.xml", number), &self.slide(page))?;
            add(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &relationships(&[(1, REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")]),
            )?;
        }

        let sink = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;

        log::debug!(
            "wrote {} slides at {}x{} EMU",
            pages.len(),
            canvas.width,
            canvas.height
        );

        Ok(sink)
    }

    /// Write a presentation into memory.
    pub fn to_bytes(&self, canvas: &CanvasSpec, pages: &[PageLayout]) -> Result<Vec<u8>> {
        Ok(self.write(Cursor::new(Vec::new()), canvas, pages)?.into_inner())
    }

    fn slide(&self, page: &PageLayout) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>"#,
            NS_A, NS_R, NS_P
        );
        xml.push_str(SP_TREE_HEADER);

        for (idx, region) in page.regions.iter().enumerate() {
            self.text_box(&mut xml, idx + 2, region);
        }

        xml.push_str(r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#);
        xml
    }

    /// One `p:sp` text box. Shape ids start at 2; 1 is the shape tree.
    fn text_box(&self, xml: &mut String, id: usize, region: &PlacedRegion) {
        let size = font_size_hundredths(region.font_size);
        let lang = escape(self.language.as_str());

        let _ = write!(
            xml,
            concat!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {n}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#,
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
                r#"<p:txBody><a:bodyPr wrap="square" lIns="0" tIns="0" rIns="0" bIns="0" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#
            ),
            id = id,
            n = id - 1,
            x = region.x,
            y = region.y,
            cx = region.width,
            cy = region.height,
        );

        for line in region.text.split('\n') {
            let line = xml_safe(line);
            if line.is_empty() {
                let _ = write!(
                    xml,
                    r#"<a:p><a:endParaRPr lang="{}" sz="{}" dirty="0"/></a:p>"#,
                    lang, size
                );
            } else {
                let _ = write!(
                    xml,
                    r#"<a:p><a:r><a:rPr lang="{}" sz="{}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                    lang,
                    size,
                    escape(line.as_str())
                );
            }
        }

        xml.push_str("</p:txBody></p:sp>");
    }

    fn core_props(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push_str(concat!(
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
        ));
        if let Some(title) = &self.title {
            let _ = write!(xml, "<dc:title>{}</dc:title>", escape(xml_safe(title).as_str()));
        }
        let _ = write!(
            xml,
            "<dc:creator>{}</dc:creator></cp:coreProperties>",
            escape(xml_safe(&self.creator).as_str())
        );
        xml
    }

    fn app_props(&self, slide_count: usize) -> String {
        format!(
            concat!(
                "{}",
                r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
                r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
                "<Application>pdf2pptx</Application><PresentationFormat>Custom</PresentationFormat>",
                "<Slides>{}</Slides></Properties>"
            ),
            XML_DECLARATION, slide_count
        )
    }
}

impl SlideRenderer for PptxWriter {
    fn render(&self, canvas: &CanvasSpec, pages: &[PageLayout]) -> Result<Vec<u8>> {
        self.to_bytes(canvas, pages)
    }
}

fn content_types(slide_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    let _ = write!(xml, r#"<Types xmlns="{}">"#, NS_CT);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let parts = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/presProps.xml", CT_PRES_PROPS),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE_PROPERTIES),
        ("/docProps/app.xml", CT_EXTENDED_PROPERTIES),
    ];
    for (part, content_type) in parts {
        let _ = write!(xml, r#"<Override PartName="{}" ContentType="{}"/>"#, part, content_type);
    }
    for number in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            number, CT_SLIDE
        );
    }

    xml.push_str("</Types>");
    xml
}

fn package_rels() -> String {
    relationships(&[
        (1, REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        (2, REL_CORE_PROPERTIES, "docProps/core.xml"),
        (3, REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
    ])
}

fn presentation(canvas: &CanvasSpec, slide_count: usize) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    let _ = write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    );
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for idx in 0..slide_count {
            let _ = write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + idx,
                FIRST_SLIDE_REL + idx
            );
        }
        xml.push_str("</p:sldIdLst>");
    }

    let _ = write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        canvas.width, canvas.height
    );
    xml
}

fn presentation_rels(slide_count: usize) -> String {
    let slide_targets: Vec<String> = (1..=slide_count)
        .map(|number| format!("slides/slide{}.xml", number))
        .collect();

    let mut rels = vec![
        (1, REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        (2, REL_THEME, "theme/theme1.xml"),
        (3, REL_PRES_PROPS, "presProps.xml"),
    ];
    for (idx, target) in slide_targets.iter().enumerate() {
        rels.push((FIRST_SLIDE_REL + idx, REL_SLIDE, target.as_str()));
    }

    relationships(&rels)
}

fn pres_props() -> String {
    format!(
        r#"{}<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECLARATION, NS_A, NS_R, NS_P
    )
}

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{tree}</p:spTree></p:cSld>"#,
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" "#,
            r#"accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        decl = XML_DECLARATION,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = SP_TREE_HEADER,
    )
}

fn slide_layout() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{tree}</p:spTree></p:cSld>"#,
            r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
        ),
        decl = XML_DECLARATION,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        tree = SP_TREE_HEADER,
    )
}

fn relationships(rels: &[(usize, &str, &str)]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    let _ = write!(xml, r#"<Relationships xmlns="{}">"#, NS_RELS);
    for (id, rel_type, target) in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
            id, rel_type, target
        );
    }
    xml.push_str("</Relationships>");
    xml
}

/// Font size in the hundredths of a point `sz` expects, within 1-4000pt.
fn font_size_hundredths(points: f64) -> i64 {
    if !points.is_finite() {
        return 1800;
    }
    ((points * 100.0).round() as i64).clamp(100, 400_000)
}

/// Drop characters XML 1.0 cannot carry (control codes, noncharacters).
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .collect()
}

/// Office theme with the stock colour, font and format schemes.
const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements>"#,
    r#"<a:clrScheme name="Office">"#,
    r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
    r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Office">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Office">"#,
    r#"<a:fillStyleLst>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill>"#,
    r#"</a:fillStyleLst>"#,
    r#"<a:lnStyleLst>"#,
    r#"<a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"</a:lnStyleLst>"#,
    r#"<a:effectStyleLst>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"</a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>"#,
    r#"</a:bgFillStyleLst>"#,
    r#"</a:fmtScheme>"#,
    r#"</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
);
