//! Domain types for extracted slide content and the positioned deck.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// A length in English Metric Units, the native unit of PresentationML.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Emu(pub i64);

impl Emu {
    /// Zero length.
    pub const ZERO: Emu = Emu(0);

    /// Convert inches to EMU, rounding to the nearest unit.
    pub fn from_inches(inches: f64) -> Self {
        Emu((inches * EMU_PER_INCH as f64).round() as i64)
    }

    /// Convert points to EMU, rounding to the nearest unit.
    pub fn from_points(points: f64) -> Self {
        Emu((points * EMU_PER_POINT as f64).round() as i64)
    }

    /// This length in inches.
    pub fn as_inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    /// The raw EMU value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Add for Emu {
    type Output = Emu;

    fn add(self, rhs: Emu) -> Emu {
        Emu(self.0 + rhs.0)
    }
}

impl AddAssign for Emu {
    fn add_assign(&mut self, rhs: Emu) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}in", self.as_inches())
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case hex form used by `a:srgbClr`, e.g. `1A237E`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// Structured content of one slide fragment.
///
/// All strings are whitespace-normalized plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContent {
    /// Slide title, empty if the fragment has none.
    pub title: String,

    /// Slide subtitle, empty if the fragment has none.
    pub subtitle: String,

    /// Bullet lists in document order, each a list of item texts.
    pub lists: Vec<Vec<String>>,

    /// Highlighted free-text blocks in document order.
    pub content_blocks: Vec<String>,
}

impl SlideContent {
    /// Whether nothing was extracted for this slide.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.subtitle.is_empty()
            && self.lists.is_empty()
            && self.content_blocks.is_empty()
    }
}

/// A single paragraph inside a text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// The paragraph text.
    pub text: String,

    /// Font size in points.
    pub font_size: f64,

    /// Bold weight. None leaves the theme default.
    pub bold: Option<bool>,

    /// Text color. None leaves the theme default.
    pub color: Option<RgbColor>,

    /// Alignment. None leaves the theme default.
    pub alignment: Option<Alignment>,

    /// Space after the paragraph, in points.
    pub space_after: Option<f64>,

    /// Latin typeface override.
    pub font_family: Option<String>,
}

impl Paragraph {
    /// Create a paragraph with the given text and size and no other formatting.
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold: None,
            color: None,
            alignment: None,
            space_after: None,
            font_family: None,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_color(mut self, color: RgbColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_space_after(mut self, points: f64) -> Self {
        self.space_after = Some(points);
        self
    }

    pub fn with_font_family(mut self, family: Option<&str>) -> Self {
        self.font_family = family.map(str::to_string);
        self
    }
}

/// A positioned text box on a slide canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,

    /// Whether text wraps at the box width.
    pub word_wrap: bool,

    /// Paragraphs in rendering order.
    pub paragraphs: Vec<Paragraph>,
}

impl TextBox {
    /// Create an empty text box with word wrap enabled.
    pub fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
            word_wrap: true,
            paragraphs: Vec::new(),
        }
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Paragraph texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }
}

/// One rendered slide built on a blank layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Text boxes in placement order.
    pub elements: Vec<TextBox>,
}

impl Slide {
    /// Create a blank slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a text box on this slide.
    pub fn add_text_box(&mut self, text_box: TextBox) {
        self.elements.push(text_box);
    }

    /// Whether nothing was placed on this slide.
    pub fn is_blank(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A slide deck with fixed page dimensions.
///
/// Slides are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Page width.
    pub width: Emu,

    /// Page height.
    pub height: Emu,

    /// Optional document title written to the package properties.
    pub title: Option<String>,

    slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck with the given page size.
    pub fn new(width: Emu, height: Emu) -> Self {
        Self {
            width,
            height,
            title: None,
            slides: Vec::new(),
        }
    }

    /// Append a blank slide and return it for population.
    pub fn add_slide(&mut self) -> &mut Slide {
        self.slides.push(Slide::new());
        let index = self.slides.len() - 1;
        &mut self.slides[index]
    }

    /// Slides in order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

impl Default for Deck {
    /// A 10 x 7.5 inch (4:3) deck.
    fn default() -> Self {
        Self::new(Emu::from_inches(10.0), Emu::from_inches(7.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_conversions() {
        assert_eq!(Emu::from_inches(1.0), Emu(914_400));
        assert_eq!(Emu::from_inches(2.8), Emu(2_560_320));
        assert_eq!(Emu::from_inches(0.6), Emu(548_640));
        assert_eq!(Emu::from_points(14.0), Emu(177_800));
        assert_eq!(Emu(914_400).as_inches(), 1.0);
    }

    #[test]
    fn test_emu_add() {
        let mut e = Emu::from_inches(2.8);
        e += Emu::from_inches(0.6);
        e = e + Emu::from_inches(0.2);
        assert_eq!(e, Emu::from_inches(3.6));
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(RgbColor::new(26, 35, 126).to_hex(), "1A237E");
        assert_eq!(RgbColor::new(0, 0, 0).to_hex(), "000000");
    }

    #[test]
    fn test_slide_content_is_empty() {
        assert!(SlideContent::default().is_empty());

        let content = SlideContent {
            title: "Market Overview".to_string(),
            ..Default::default()
        };
        assert!(!content.is_empty());
    }

    #[test]
    fn test_deck_default_size() {
        let deck = Deck::default();
        assert_eq!(deck.width, Emu(9_144_000));
        assert_eq!(deck.height, Emu(6_858_000));
        assert!(deck.is_empty());
    }

    #[test]
    fn test_deck_add_slide() {
        let mut deck = Deck::default();
        deck.add_slide().add_text_box(TextBox::new(
            Emu::ZERO,
            Emu::ZERO,
            Emu::from_inches(1.0),
            Emu::from_inches(1.0),
        ));
        deck.add_slide();

        assert_eq!(deck.len(), 2);
        assert!(!deck.slides()[0].is_blank());
        assert!(deck.slides()[1].is_blank());
    }
}
