//! PPTX package writer.
//!
//! Serializes a [`Deck`] into an Office Open XML ZIP package. Text boxes
//! become `p:sp` shapes with one `a:p` per paragraph.

use crate::templates::{self, content_type, rel_type, PML_NAMESPACES, XML_DECLARATION};
use deck_core::{Alignment, Deck, Error, Paragraph, Result, Slide, TextBox};
use quick_xml::escape::escape;
use std::fmt::Write as FmtWrite;
use std::fs::{self, File};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// First `p:sldId` value; PowerPoint requires ids of at least 256.
const FIRST_SLIDE_ID: usize = 256;

/// Application name written to the document properties.
const APPLICATION: &str = "html2pptx";

/// Writer for PPTX (Office Open XML) files.
pub struct PptxWriter;

impl PptxWriter {
    /// Create a new PPTX writer.
    pub fn new() -> Self {
        Self
    }

    /// Write `deck` as a PPTX package into `writer`, returning it when done.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut add = |path: &str, content: &str| -> Result<()> {
            zip.start_file(path, options)
                .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
            zip.write_all(content.as_bytes())?;
            Ok(())
        };

        add("[Content_Types].xml", &content_types_xml(deck.len()))?;
        add("_rels/.rels", &templates::root_rels_xml())?;
        add("docProps/core.xml", &core_props_xml(deck.title.as_deref()))?;
        add("docProps/app.xml", &app_props_xml(deck.len()))?;

        add("ppt/presentation.xml", &presentation_xml(deck)?)?;
        add("ppt/_rels/presentation.xml.rels", &presentation_rels_xml(deck.len()))?;
        add("ppt/presProps.xml", &templates::pres_props_xml())?;
        add("ppt/viewProps.xml", &templates::view_props_xml())?;
        add("ppt/tableStyles.xml", &templates::table_styles_xml())?;

        add("ppt/slideMasters/slideMaster1.xml", &templates::slide_master_xml())?;
        add(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &templates::slide_master_rels_xml(),
        )?;
        add("ppt/slideLayouts/slideLayout1.xml", &templates::blank_layout_xml())?;
        add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &templates::blank_layout_rels_xml(),
        )?;
        add("ppt/theme/theme1.xml", &templates::theme_xml())?;

        let slide_rels = templates::slide_rels_xml();
        for (idx, slide) in deck.slides().iter().enumerate() {
            let number = idx + 1;
            add(&format!("ppt/slides/slide{}.xml", number), &slide_xml(slide)?)?;
            add(&format!("ppt/slides/_rels/slide{}.xml.rels", number), &slide_rels)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Serialize `deck` to an in-memory PPTX package.
    pub fn to_bytes(&self, deck: &Deck) -> Result<Vec<u8>> {
        Ok(self.write(deck, Cursor::new(Vec::new()))?.into_inner())
    }

    /// Save `deck` to `path`.
    ///
    /// The package is written to a temporary sibling file and renamed into
    /// place, so `path` either receives the whole deck or is left untouched.
    pub fn save<P: AsRef<Path>>(&self, deck: &Deck, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes(deck)?;
        let temp_path = temp_path_for(path);

        let result = write_and_rename(&bytes, &temp_path, path);
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        log::info!(
            "Saved {} slides ({} bytes) to {}",
            deck.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_and_rename(bytes: &[u8], temp_path: &Path, path: &Path) -> Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)?;
    Ok(())
}

/// Hidden sibling of `path` used while saving.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("deck.pptx");
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// Escape text content, dropping characters XML 1.0 cannot carry.
fn xml_text(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(filtered.as_str()).into_owned()
}

/// Points to hundredths of a point, the unit of `sz` and `spcPts`.
fn centipoints(points: f64) -> i64 {
    (points * 100.0).round() as i64
}

fn alignment_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
        Alignment::Justify => "just",
    }
}

fn content_types_xml(slide_count: usize) -> String {
    let mut xml = String::with_capacity(2048 + slide_count * 160);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), content_type::PRESENTATION),
        ("/ppt/presProps.xml".to_string(), content_type::PRES_PROPS),
        ("/ppt/viewProps.xml".to_string(), content_type::VIEW_PROPS),
        ("/ppt/tableStyles.xml".to_string(), content_type::TABLE_STYLES),
        (
            "/ppt/slideMasters/slideMaster1.xml".to_string(),
            content_type::SLIDE_MASTER,
        ),
        (
            "/ppt/slideLayouts/slideLayout1.xml".to_string(),
            content_type::SLIDE_LAYOUT,
        ),
        ("/ppt/theme/theme1.xml".to_string(), content_type::THEME),
        ("/docProps/core.xml".to_string(), content_type::CORE_PROPERTIES),
        ("/docProps/app.xml".to_string(), content_type::EXTENDED_PROPERTIES),
    ];
    for number in 1..=slide_count {
        overrides.push((format!("/ppt/slides/slide{}.xml", number), content_type::SLIDE));
    }

    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}"/>"#,
            part, content_type
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn core_props_xml(title: Option<&str>) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    if let Some(title) = title {
        xml.push_str(&format!("<dc:title>{}</dc:title>", xml_text(title)));
    }
    xml.push_str(&format!("<dc:creator>{}</dc:creator>", APPLICATION));
    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_props_xml(slide_count: usize) -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{}</Application><Slides>{}</Slides>",
            "</Properties>"
        ),
        XML_DECLARATION, APPLICATION, slide_count
    )
}

/// Relationship id of the n-th slide (1-based); rId1 is the slide master.
fn slide_rel_id(number: usize) -> String {
    format!("rId{}", number + 1)
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels: Vec<(String, &str, String)> = vec![(
        "rId1".to_string(),
        rel_type::SLIDE_MASTER,
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    for number in 1..=slide_count {
        rels.push((
            slide_rel_id(number),
            rel_type::SLIDE,
            format!("slides/slide{}.xml", number),
        ));
    }
    let next = slide_count + 2;
    for (offset, (kind, target)) in [
        (rel_type::PRES_PROPS, "presProps.xml"),
        (rel_type::VIEW_PROPS, "viewProps.xml"),
        (rel_type::THEME, "theme/theme1.xml"),
        (rel_type::TABLE_STYLES, "tableStyles.xml"),
    ]
    .into_iter()
    .enumerate()
    {
        rels.push((format!("rId{}", next + offset), kind, target.to_string()));
    }

    let borrowed: Vec<(&str, &str, &str)> = rels
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    templates::relationships_xml(&borrowed)
}

fn presentation_xml(deck: &Deck) -> Result<String> {
    let mut xml = String::with_capacity(2048 + deck.len() * 64);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<p:presentation {} saveSubsetFonts="1">"#, PML_NAMESPACES).map_err(xml_err)?;

    xml.push_str("<p:sldMasterIdLst>");
    xml.push_str(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#);
    xml.push_str("</p:sldMasterIdLst>");

    if !deck.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for number in 1..=deck.len() {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                FIRST_SLIDE_ID + number - 1,
                slide_rel_id(number)
            )
            .map_err(xml_err)?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        deck.width.get(),
        deck.height.get()
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str(&templates::default_text_style());
    xml.push_str("</p:presentation>");

    Ok(xml)
}

/// Generate the XML of one slide.
pub fn slide_xml(slide: &Slide) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide.elements.len() * 1024);
    xml.push_str(XML_DECLARATION);
    write!(xml, "<p:sld {}>", PML_NAMESPACES).map_err(xml_err)?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(templates::GROUP_SHAPE_PROPERTIES);

    // Shape id 1 is the group shape itself.
    for (idx, text_box) in slide.elements.iter().enumerate() {
        write_text_box(&mut xml, text_box, idx as u32 + 2)?;
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");

    Ok(xml)
}

fn write_text_box(xml: &mut String, text_box: &TextBox, shape_id: u32) -> Result<()> {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
        shape_id,
        shape_id - 1
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr>");
    xml.push_str("<a:xfrm>");
    write!(
        xml,
        r#"<a:off x="{}" y="{}"/>"#,
        text_box.left.get(),
        text_box.top.get()
    )
    .map_err(xml_err)?;
    write!(
        xml,
        r#"<a:ext cx="{}" cy="{}"/>"#,
        text_box.width.get(),
        text_box.height.get()
    )
    .map_err(xml_err)?;
    xml.push_str("</a:xfrm>");
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("<a:noFill/>");
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    let wrap = if text_box.word_wrap { "square" } else { "none" };
    write!(xml, r#"<a:bodyPr wrap="{}" rtlCol="0"><a:spAutoFit/></a:bodyPr>"#, wrap)
        .map_err(xml_err)?;
    xml.push_str("<a:lstStyle/>");
    if text_box.paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in &text_box.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    xml.push_str("</p:txBody>");

    xml.push_str("</p:sp>");
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");

    let has_props = paragraph.alignment.is_some() || paragraph.space_after.is_some();
    if has_props {
        xml.push_str("<a:pPr");
        if let Some(alignment) = paragraph.alignment {
            write!(xml, r#" algn="{}""#, alignment_attr(alignment)).map_err(xml_err)?;
        }
        xml.push('>');
        if let Some(space_after) = paragraph.space_after {
            write!(
                xml,
                r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
                centipoints(space_after)
            )
            .map_err(xml_err)?;
        }
        xml.push_str("</a:pPr>");
    }

    xml.push_str("<a:r>");
    write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}""#,
        centipoints(paragraph.font_size)
    )
    .map_err(xml_err)?;
    if let Some(bold) = paragraph.bold {
        write!(xml, r#" b="{}""#, if bold { 1 } else { 0 }).map_err(xml_err)?;
    }
    xml.push_str(r#" dirty="0">"#);

    if let Some(color) = paragraph.color {
        write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            color.to_hex()
        )
        .map_err(xml_err)?;
    }
    if let Some(ref family) = paragraph.font_family {
        let family = xml_text(family);
        write!(
            xml,
            r#"<a:latin typeface="{0}"/><a:cs typeface="{0}"/>"#,
            family
        )
        .map_err(xml_err)?;
    }
    xml.push_str("</a:rPr>");

    write!(xml, "<a:t>{}</a:t>", xml_text(&paragraph.text)).map_err(xml_err)?;
    xml.push_str("</a:r>");
    xml.push_str("</a:p>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{Emu, RgbColor};
    use std::io::Read;
    use zip::ZipArchive;

    fn sample_deck() -> Deck {
        let mut deck = Deck::default();
        deck.title = Some("Market <Overview>".to_string());

        let slide = deck.add_slide();
        let mut title = TextBox::new(
            Emu::from_inches(0.5),
            Emu::from_inches(0.5),
            Emu::from_inches(9.0),
            Emu::from_inches(1.0),
        );
        title.add_paragraph(
            Paragraph::new("Market & Overview", 44.0)
                .with_bold(true)
                .with_color(RgbColor::new(26, 35, 126))
                .with_alignment(Alignment::Left),
        );
        slide.add_text_box(title);

        let mut list = TextBox::new(
            Emu::from_inches(0.7),
            Emu::from_inches(2.8),
            Emu::from_inches(9.0),
            Emu::from_inches(0.6),
        );
        list.add_paragraph(Paragraph::new("• Point A", 14.0).with_space_after(6.0));
        list.add_paragraph(Paragraph::new("• Point B", 14.0).with_space_after(6.0));
        slide.add_text_box(list);

        deck.add_slide();
        deck
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_parts() {
        let bytes = PptxWriter::new().to_bytes(&sample_deck()).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(names.contains(&expected), "missing part {}", expected);
        }
        assert!(!names.contains(&"ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_presentation_xml() {
        let bytes = PptxWriter::new().to_bytes(&sample_deck()).unwrap();
        let xml = read_part(&bytes, "ppt/presentation.xml");

        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(xml.contains(r#"<p:sldId id="257" r:id="rId3"/>"#));

        let rels = read_part(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml""#));
        assert!(rels.contains(r#"Id="rId4""#));
        assert!(rels.contains("theme/theme1.xml"));
    }

    #[test]
    fn test_empty_deck_has_no_slide_list() {
        let bytes = PptxWriter::new().to_bytes(&Deck::default()).unwrap();
        let xml = read_part(&bytes, "ppt/presentation.xml");
        assert!(!xml.contains("<p:sldIdLst>"));

        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(!types.contains("/ppt/slides/"));
    }

    #[test]
    fn test_slide_xml_text_box() {
        let deck = sample_deck();
        let xml = slide_xml(&deck.slides()[0]).unwrap();

        assert!(xml.contains(r#"<p:cNvPr id="2" name="TextBox 1"/>"#));
        assert!(xml.contains(r#"<p:cNvSpPr txBox="1"/>"#));
        assert!(xml.contains(r#"<a:off x="457200" y="457200"/>"#));
        assert!(xml.contains(r#"<a:ext cx="8229600" cy="914400"/>"#));
        assert!(xml.contains(r#"<a:bodyPr wrap="square""#));
        assert!(xml.contains(r#"<a:pPr algn="l">"#));
        assert!(xml.contains(r#"sz="4400" b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="1A237E"/>"#));
        assert!(xml.contains("<a:t>Market &amp; Overview</a:t>"));

        assert!(xml.contains(r#"<p:cNvPr id="3" name="TextBox 2"/>"#));
        assert!(xml.contains(r#"<a:spcAft><a:spcPts val="600"/></a:spcAft>"#));
        assert!(xml.contains("<a:t>• Point A</a:t>"));
        assert!(xml.contains("<a:t>• Point B</a:t>"));
    }

    #[test]
    fn test_blank_slide_xml() {
        let xml = slide_xml(&Slide::new()).unwrap();
        assert!(!xml.contains("<p:sp>"));
        assert!(xml.contains("<p:spTree>"));
    }

    #[test]
    fn test_core_props_title_is_escaped() {
        let bytes = PptxWriter::new().to_bytes(&sample_deck()).unwrap();
        let xml = read_part(&bytes, "docProps/core.xml");
        assert!(xml.contains("<dc:title>Market &lt;Overview&gt;</dc:title>"));
    }

    #[test]
    fn test_xml_text_drops_control_characters() {
        assert_eq!(xml_text("a\u{1}b\tc"), "ab\tc");
        assert_eq!(xml_text("<&>"), "&lt;&amp;&gt;");
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");

        PptxWriter::new().save(&sample_deck(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]));
        // No temporary file is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_to_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("deck.pptx");

        let err = PptxWriter::new().save(&sample_deck(), &path).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        fs::write(&path, b"old").unwrap();

        PptxWriter::new().save(&sample_deck(), &path).unwrap();
        assert_ne!(fs::read(&path).unwrap(), b"old");
    }
}
