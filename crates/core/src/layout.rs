//! Slide layout: turns one [`SlideContent`] into positioned text boxes.
//!
//! Title and subtitle sit at fixed offsets. Lists and content blocks are
//! stacked top to bottom from a per-slide [`LayoutCursor`]; once the cursor
//! passes the bottom limit, whatever is left for the slide is dropped.

use crate::config::{BoxGeometry, LayoutConfig, RenderConfig, StyleConfig};
use crate::normalize::truncate_chars;
use crate::types::{Alignment, Deck, Emu, Paragraph, Slide, SlideContent, TextBox};

/// Running vertical placement offset within one slide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutCursor {
    position: Emu,
}

impl LayoutCursor {
    /// A cursor at the top of the canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the cursor to `origin`. Only done at the start of a slide.
    pub fn reset(&mut self, origin: Emu) {
        self.position = origin;
    }

    /// Move the cursor down by `by`. Negative amounts are ignored.
    pub fn advance(&mut self, by: Emu) {
        if by > Emu::ZERO {
            self.position += by;
        }
    }

    /// Current offset from the top of the canvas.
    pub fn position(&self) -> Emu {
        self.position
    }

    /// Whether the cursor is strictly below `limit`.
    pub fn exceeds(&self, limit: Emu) -> bool {
        self.position > limit
    }
}

/// Places extracted content onto slide canvases.
#[derive(Debug, Clone)]
pub struct SlideLayoutBuilder {
    style: StyleConfig,
    layout: LayoutConfig,
}

impl Default for SlideLayoutBuilder {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl SlideLayoutBuilder {
    /// Create a builder for the given configuration.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            style: config.style.clone(),
            layout: config.layout.clone(),
        }
    }

    /// An empty deck sized according to the configuration.
    pub fn new_deck(&self) -> Deck {
        Deck::new(
            Emu::from_inches(self.layout.slide_width),
            Emu::from_inches(self.layout.slide_height),
        )
    }

    /// Append a slide for `content` to `deck`, with a freshly reset cursor.
    ///
    /// Returns the final cursor position.
    pub fn add_to_deck(&self, deck: &mut Deck, content: &SlideContent) -> Emu {
        if deck.title.is_none() && !content.title.is_empty() {
            deck.title = Some(content.title.clone());
        }

        let mut cursor = LayoutCursor::new();
        self.layout(content, deck.add_slide(), &mut cursor)
    }

    /// Populate `slide` with the elements for `content`.
    ///
    /// Order is fixed: title, subtitle, lists, content blocks. Returns the
    /// final cursor position.
    pub fn layout(
        &self,
        content: &SlideContent,
        slide: &mut Slide,
        cursor: &mut LayoutCursor,
    ) -> Emu {
        if !content.title.is_empty() {
            slide.add_text_box(self.title_box(&content.title));
        }

        if !content.subtitle.is_empty() {
            slide.add_text_box(self.subtitle_box(&content.subtitle));
        }

        cursor.reset(Emu::from_inches(self.layout.list_top));
        let bottom = Emu::from_inches(self.layout.bottom_limit);

        let mut lists_placed = 0;
        for items in &content.lists {
            if cursor.exceeds(bottom) {
                break;
            }
            let list_box = self.list_box(items, cursor.position());
            cursor.advance(list_box.height + Emu::from_inches(self.layout.list_gap));
            slide.add_text_box(list_box);
            lists_placed += 1;
        }

        let mut blocks_placed = 0;
        for block in content.content_blocks.iter().take(self.layout.max_blocks) {
            if cursor.exceeds(bottom) {
                break;
            }
            slide.add_text_box(self.block_box(block, cursor.position()));
            cursor.advance(Emu::from_inches(self.layout.block_step));
            blocks_placed += 1;
        }

        log::debug!(
            "Placed {}/{} lists and {}/{} blocks, cursor at {}",
            lists_placed,
            content.lists.len(),
            blocks_placed,
            content.content_blocks.len(),
            cursor.position()
        );

        cursor.position()
    }

    fn title_box(&self, title: &str) -> TextBox {
        let mut text_box = fixed_box(&self.layout.title_box);
        text_box.add_paragraph(
            Paragraph::new(title, self.style.title_font_size)
                .with_bold(self.style.title_bold)
                .with_color(self.style.brand_color)
                .with_alignment(Alignment::Left)
                .with_font_family(self.style.font_family.as_deref()),
        );
        text_box
    }

    fn subtitle_box(&self, subtitle: &str) -> TextBox {
        let mut text_box = fixed_box(&self.layout.subtitle_box);
        text_box.add_paragraph(
            Paragraph::new(subtitle, self.style.subtitle_font_size)
                .with_color(self.style.brand_color)
                .with_alignment(Alignment::Left)
                .with_font_family(self.style.font_family.as_deref()),
        );
        text_box
    }

    /// Height comes from the full item count; rendering stops at the item limit.
    fn list_box(&self, items: &[String], top: Emu) -> TextBox {
        let height = (self.layout.list_item_height * items.len() as f64)
            .min(self.layout.max_list_height);

        let mut text_box = TextBox::new(
            Emu::from_inches(self.layout.list_left),
            top,
            Emu::from_inches(self.layout.list_width),
            Emu::from_inches(height),
        );

        for item in items.iter().take(self.layout.max_list_items) {
            text_box.add_paragraph(
                Paragraph::new(format!("{}{}", self.style.bullet, item), self.style.list_font_size)
                    .with_space_after(self.style.list_space_after)
                    .with_font_family(self.style.font_family.as_deref()),
            );
        }

        text_box
    }

    fn block_box(&self, block: &str, top: Emu) -> TextBox {
        let mut text_box = TextBox::new(
            Emu::from_inches(self.layout.block_left),
            top,
            Emu::from_inches(self.layout.block_width),
            Emu::from_inches(self.layout.block_height),
        );
        text_box.add_paragraph(
            Paragraph::new(
                truncate_chars(block, self.layout.max_block_chars),
                self.style.block_font_size,
            )
            .with_space_after(self.style.block_space_after)
            .with_font_family(self.style.font_family.as_deref()),
        );
        text_box
    }
}

fn fixed_box(geometry: &BoxGeometry) -> TextBox {
    TextBox::new(
        Emu::from_inches(geometry.left),
        Emu::from_inches(geometry.top),
        Emu::from_inches(geometry.width),
        Emu::from_inches(geometry.height),
    )
}
