//! The conversion pipeline: markup in, positioned deck out.

use anyhow::{Context, Result};
use deck_core::{Deck, RenderConfig, SlideContent, SlideLayoutBuilder};
use deck_html::{ContentExtractor, Document};
use deck_pptx::PptxWriter;
use std::path::{Path, PathBuf};

/// Summary of a finished conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub slide_count: usize,
}

/// Runs extraction, layout and serialization with one configuration.
pub struct Converter {
    extractor: ContentExtractor,
    builder: SlideLayoutBuilder,
    writer: PptxWriter,
}

impl Converter {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            extractor: ContentExtractor::new(),
            builder: SlideLayoutBuilder::new(config),
            writer: PptxWriter::new(),
        }
    }

    /// Extract every slide fragment of an HTML file.
    pub fn extract_file(&self, input: &Path) -> Result<Vec<SlideContent>> {
        let document = read_document(input)?;
        Ok(self.extractor.extract_all(&document))
    }

    /// Build a deck from parsed markup, one slide per fragment.
    pub fn build_deck(&self, document: &Document) -> Deck {
        let mut deck = self.builder.new_deck();

        for (idx, fragment) in self.extractor.slide_fragments(document).into_iter().enumerate() {
            let content = self.extractor.extract(document, fragment);
            let cursor = self.builder.add_to_deck(&mut deck, &content);
            log::debug!("Slide {}: final cursor {}", idx + 1, cursor);
        }

        deck
    }

    /// Convert `input` into a PPTX file at `output`.
    ///
    /// Either the whole deck is saved or nothing is written.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        let document = read_document(input)?;
        let deck = self.build_deck(&document);

        log::debug!("Built {} slides from {}", deck.len(), input.display());

        self.writer
            .save(&deck, output)
            .with_context(|| format!("Failed to save {}", output.display()))?;

        Ok(ConversionReport {
            output: output.to_path_buf(),
            slide_count: deck.len(),
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

fn read_document(input: &Path) -> Result<Document> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    Document::from_bytes(&bytes).with_context(|| format!("Failed to parse {}", input.display()))
}

/// Default output path: the input with a `.pptx` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("pptx")
}
