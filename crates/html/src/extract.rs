//! Slide content extraction.
//!
//! Each slide fragment is walked once. Every element is classified against a
//! fixed set of marker classes and tag names, and the matches are collected
//! into a [`SlideContent`].

use crate::dom::{Document, Element, NodeId};
use deck_core::normalize::{char_len, clean_optional, clean_text};
use deck_core::SlideContent;

/// Class of the container element of one slide.
pub const SLIDE_CLASS: &str = "slide";

/// Class of the slide title element.
pub const TITLE_CLASS: &str = "slide-title";

/// Class of the slide subtitle element.
pub const SUBTITLE_CLASS: &str = "slide-subtitle";

/// Classes that mark a free-text highlight block.
pub const HIGHLIGHT_CLASSES: &[&str] = &[
    "key-point",
    "highlight-box",
    "stat-box",
    "competitor-box",
    "collaboration-item",
    "utp-box",
];

/// Tags that can carry a highlight class.
const HIGHLIGHT_TAGS: &[&str] = &["div", "p", "span"];

/// Tags of list elements.
const LIST_TAGS: &[&str] = &["ul", "ol"];

/// Semantic role of an element inside a slide fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Title,
    Subtitle,
    List,
    Highlight,
}

impl Marker {
    /// All roles `element` plays. An element may play several.
    pub fn classify(element: &Element) -> Vec<Marker> {
        let mut markers = Vec::new();

        if element.has_class(TITLE_CLASS) {
            markers.push(Marker::Title);
        }
        if element.has_class(SUBTITLE_CLASS) {
            markers.push(Marker::Subtitle);
        }
        if element.is_one_of(LIST_TAGS) {
            markers.push(Marker::List);
        }
        if element.is_one_of(HIGHLIGHT_TAGS)
            && HIGHLIGHT_CLASSES.iter().any(|c| element.has_class(c))
        {
            markers.push(Marker::Highlight);
        }

        markers
    }
}

/// Whether `element` is a slide container.
pub fn is_slide_container(element: &Element) -> bool {
    element.name == "div" && element.has_class(SLIDE_CLASS)
}

/// Extracts [`SlideContent`] records from slide fragments.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    /// Highlight blocks must be longer than this many characters.
    min_block_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self { min_block_chars: 10 }
    }
}

impl ContentExtractor {
    /// Create an extractor with the default block length filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only highlight blocks longer than `min` characters.
    pub fn with_min_block_chars(mut self, min: usize) -> Self {
        self.min_block_chars = min;
        self
    }

    /// Slide containers in document order.
    pub fn slide_fragments(&self, document: &Document) -> Vec<NodeId> {
        document
            .find_all(document.root(), is_slide_container)
            .collect()
    }

    /// Extract every slide of `document`, in document order.
    pub fn extract_all(&self, document: &Document) -> Vec<SlideContent> {
        self.slide_fragments(document)
            .into_iter()
            .map(|fragment| self.extract(document, fragment))
            .collect()
    }

    /// Parse and extract a standalone slide fragment.
    pub fn extract_fragment(&self, html: &str) -> SlideContent {
        let document = Document::parse(html);
        self.extract(&document, document.root())
    }

    /// Extract the content of the fragment rooted at `fragment`.
    ///
    /// Missing markers yield empty values; this never fails.
    pub fn extract(&self, document: &Document, fragment: NodeId) -> SlideContent {
        let mut title: Option<String> = None;
        let mut subtitle: Option<String> = None;
        let mut content = SlideContent::default();

        for node in document.descendants(fragment) {
            let Some(element) = document.element(node) else {
                continue;
            };

            for marker in Marker::classify(element) {
                match marker {
                    Marker::Title => {
                        if title.is_none() {
                            title = Some(document.text_content(node));
                        }
                    }
                    Marker::Subtitle => {
                        if subtitle.is_none() {
                            subtitle = Some(document.text_content(node));
                        }
                    }
                    Marker::List => {
                        let items = self.list_items(document, node);
                        if items.iter().any(|item| !item.is_empty()) {
                            content.lists.push(items);
                        }
                    }
                    Marker::Highlight => {
                        let text = clean_text(&document.text_content(node));
                        if char_len(&text) > self.min_block_chars {
                            content.content_blocks.push(text);
                        }
                    }
                }
            }
        }

        content.title = clean_optional(title.as_deref());
        content.subtitle = clean_optional(subtitle.as_deref());

        log::debug!(
            "Extracted slide: title={:?}, {} lists, {} blocks",
            content.title,
            content.lists.len(),
            content.content_blocks.len()
        );

        content
    }

    /// Cleaned texts of the direct `li` children of `list`, empty ones included.
    fn list_items(&self, document: &Document, list: NodeId) -> Vec<String> {
        document
            .children(list)
            .iter()
            .filter(|&&child| {
                document
                    .element(child)
                    .map(|e| e.name == "li")
                    .unwrap_or(false)
            })
            .map(|&child| clean_text(&document.text_content(child)))
            .collect()
    }
}
