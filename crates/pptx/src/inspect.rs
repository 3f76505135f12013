//! Read-back of PPTX files: slide order, page size, and positioned text.

use deck_core::{Emu, Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Text-bearing content of a PPTX file.
#[derive(Debug, Clone, Serialize)]
pub struct InspectedDeck {
    pub slide_width: Emu,
    pub slide_height: Emu,

    /// Slides in presentation order.
    pub slides: Vec<InspectedSlide>,
}

/// One slide read back from a package.
#[derive(Debug, Clone, Serialize)]
pub struct InspectedSlide {
    /// 1-based slide number.
    pub number: usize,

    /// Shapes in document order.
    pub shapes: Vec<InspectedShape>,
}

/// A shape with its frame and paragraph texts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InspectedShape {
    pub x: Emu,
    pub y: Emu,
    pub width: Emu,
    pub height: Emu,
    pub paragraphs: Vec<String>,
}

/// Inspector for PPTX (Office Open XML) files.
pub struct DeckInspector;

impl DeckInspector {
    /// Create a new inspector.
    pub fn new() -> Self {
        Self
    }

    /// Inspect a PPTX file on disk.
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<InspectedDeck> {
        let file = File::open(path.as_ref())?;
        self.read(BufReader::new(file))
    }

    /// Inspect a PPTX package from a reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<InspectedDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let presentation = read_file_from_archive(&mut archive, "ppt/presentation.xml")?;
        let (slide_width, slide_height) = slide_size(&presentation)?;

        let slide_order = get_slide_order(&mut archive)?;
        let mut slides = Vec::with_capacity(slide_order.len());
        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, slide_path)?;
            slides.push(InspectedSlide {
                number: idx + 1,
                shapes: extract_shapes_from_xml(&content)?,
            });
        }

        Ok(InspectedDeck {
            slide_width,
            slide_height,
            slides,
        })
    }
}

impl Default for DeckInspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Page size from the `p:sldSz` element of presentation.xml.
fn slide_size(xml: &str) -> Result<(Emu, Emu)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldSz" =>
            {
                let width = emu_attr(e, b"cx").unwrap_or_default();
                let height = emu_attr(e, b"cy").unwrap_or_default();
                return Ok((width, height));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Err(Error::XmlError("presentation.xml has no slide size".to_string()))
}

/// Ordered slide part paths from the presentation relationships.
fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels_content = read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
    let mut slides: Vec<(String, Option<usize>)> = Vec::new();

    let mut reader = Reader::from_str(&rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        b"Id" => id = value,
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    let order_num =
                        extract_slide_number(&id).or_else(|| extract_slide_number(&target));
                    let full_path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{}", target),
                    };
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

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// Shapes with their frames and paragraphs from slide XML.
fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<InspectedShape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(false);

    let mut current_shape: Option<InspectedShape> = None;
    let mut in_text_body = false;
    let mut current_paragraph: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => current_shape = Some(InspectedShape::default()),
                b"off" | b"ext" => apply_frame(&mut current_shape, e),
                b"txBody" => in_text_body = true,
                b"p" if in_text_body => current_paragraph = Some(String::new()),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"off" | b"ext" => apply_frame(&mut current_shape, e),
                b"p" if in_text_body => {
                    if let Some(ref mut shape) = current_shape {
                        shape.paragraphs.push(String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut paragraph) = current_paragraph {
                    let text = e.unescape().unwrap_or_default();
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(shape) = current_shape.take() {
                        shapes.push(shape);
                    }
                    in_text_body = false;
                    current_paragraph = None;
                }
                b"txBody" => in_text_body = false,
                b"p" => {
                    if let (Some(paragraph), Some(shape)) =
                        (current_paragraph.take(), current_shape.as_mut())
                    {
                        shape.paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parsing error (continuing): {}", e);
                break;
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Record an `a:off` or `a:ext` frame element on the current shape.
fn apply_frame(shape: &mut Option<InspectedShape>, e: &BytesStart) {
    let Some(shape) = shape.as_mut() else {
        return;
    };

    match local_name(e.name().as_ref()) {
        b"off" => {
            if let Some(x) = emu_attr(e, b"x") {
                shape.x = x;
            }
            if let Some(y) = emu_attr(e, b"y") {
                shape.y = y;
            }
        }
        b"ext" => {
            if let Some(cx) = emu_attr(e, b"cx") {
                shape.width = cx;
            }
            if let Some(cy) = emu_attr(e, b"cy") {
                shape.height = cy;
            }
        }
        _ => {}
    }
}

/// Integer EMU attribute value.
fn emu_attr(e: &BytesStart, key: &[u8]) -> Option<Emu> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse::<i64>().ok())
        .map(Emu)
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
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

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::PptxWriter;
    use deck_core::{Deck, Paragraph, TextBox};
    use std::io::Cursor;

    fn deck_with_slides(count: usize) -> Deck {
        let mut deck = Deck::default();
        for i in 1..=count {
            let mut text_box = TextBox::new(
                Emu::from_inches(0.5),
                Emu::from_inches(0.5),
                Emu::from_inches(9.0),
                Emu::from_inches(1.0),
            );
            text_box.add_paragraph(Paragraph::new(format!("Slide {}", i), 44.0));
            text_box.add_paragraph(Paragraph::new("R&D <second>", 14.0));
            deck.add_slide().add_text_box(text_box);
        }
        deck
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slides/slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_read_back_written_deck() {
        let bytes = PptxWriter::new().to_bytes(&deck_with_slides(3)).unwrap();
        let deck = DeckInspector::new().read(Cursor::new(bytes)).unwrap();

        assert_eq!(deck.slide_width, Emu(9_144_000));
        assert_eq!(deck.slide_height, Emu(6_858_000));
        assert_eq!(deck.slides.len(), 3);

        for (idx, slide) in deck.slides.iter().enumerate() {
            assert_eq!(slide.number, idx + 1);
            assert_eq!(slide.shapes.len(), 1);
            let shape = &slide.shapes[0];
            assert_eq!(shape.x, Emu::from_inches(0.5));
            assert_eq!(shape.height, Emu::from_inches(1.0));
            assert_eq!(
                shape.paragraphs,
                vec![format!("Slide {}", idx + 1), "R&D <second>".to_string()]
            );
        }
    }

    #[test]
    fn test_slide_order_beyond_nine() {
        let bytes = PptxWriter::new().to_bytes(&deck_with_slides(12)).unwrap();
        let deck = DeckInspector::new().read(Cursor::new(bytes)).unwrap();

        let firsts: Vec<&str> = deck
            .slides
            .iter()
            .map(|s| s.shapes[0].paragraphs[0].as_str())
            .collect();
        assert_eq!(firsts[9], "Slide 10");
        assert_eq!(firsts[11], "Slide 12");
    }

    #[test]
    fn test_read_empty_deck() {
        let bytes = PptxWriter::new().to_bytes(&Deck::default()).unwrap();
        let deck = DeckInspector::new().read(Cursor::new(bytes)).unwrap();
        assert!(deck.slides.is_empty());
    }

    #[test]
    fn test_not_a_zip() {
        let err = DeckInspector::new()
            .read(Cursor::new(b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
