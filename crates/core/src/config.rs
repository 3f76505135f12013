//! Render configuration: fonts, colors and slide geometry.
//!
//! Lengths are in inches and font metrics in points. Every field has a
//! default, so a configuration file only needs the values it changes.

use crate::error::{Error, Result};
use crate::types::RgbColor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Brand color used for titles and subtitles (#1A237E).
pub const BRAND_BLUE: RgbColor = RgbColor::new(26, 35, 126);

/// Complete configuration for laying out and rendering a deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub style: StyleConfig,
    pub layout: LayoutConfig,
}

impl RenderConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Reject geometry that cannot produce a usable slide.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        if layout.slide_width <= 0.0 || layout.slide_height <= 0.0 {
            return Err(Error::ConfigError(format!(
                "Slide size must be positive, got {}x{}",
                layout.slide_width, layout.slide_height
            )));
        }

        let lengths = [
            ("list_item_height", layout.list_item_height),
            ("max_list_height", layout.max_list_height),
            ("list_gap", layout.list_gap),
            ("block_height", layout.block_height),
            ("block_step", layout.block_step),
        ];
        for (name, value) in lengths {
            if value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        let sizes = [
            ("title_font_size", self.style.title_font_size),
            ("subtitle_font_size", self.style.subtitle_font_size),
            ("list_font_size", self.style.list_font_size),
            ("block_font_size", self.style.block_font_size),
        ];
        for (name, value) in sizes {
            if value <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// Fonts and colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Color of titles and subtitles.
    pub brand_color: RgbColor,

    /// Latin typeface for every run. None uses the theme font.
    pub font_family: Option<String>,

    pub title_font_size: f64,
    pub title_bold: bool,
    pub subtitle_font_size: f64,

    pub list_font_size: f64,
    /// Space after each bullet paragraph, in points.
    pub list_space_after: f64,
    /// Literal prefix of every bullet paragraph.
    pub bullet: String,

    pub block_font_size: f64,
    /// Space after each content block paragraph, in points.
    pub block_space_after: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            brand_color: BRAND_BLUE,
            font_family: None,
            title_font_size: 44.0,
            title_bold: true,
            subtitle_font_size: 32.0,
            list_font_size: 14.0,
            list_space_after: 6.0,
            bullet: "• ".to_string(),
            block_font_size: 12.0,
            block_space_after: 8.0,
        }
    }
}

impl StyleConfig {
    /// Set the brand color.
    pub fn with_brand_color(mut self, color: RgbColor) -> Self {
        self.brand_color = color;
        self
    }

    /// Set the typeface used for all text.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }
}

/// Slide geometry and content limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub slide_width: f64,
    pub slide_height: f64,

    pub title_box: BoxGeometry,
    pub subtitle_box: BoxGeometry,

    /// Cursor position where the first list is placed.
    pub list_top: f64,
    pub list_left: f64,
    pub list_width: f64,
    /// Box height contributed by each list item.
    pub list_item_height: f64,
    pub max_list_height: f64,
    /// Vertical gap after each list box.
    pub list_gap: f64,
    pub max_list_items: usize,

    pub block_left: f64,
    pub block_width: f64,
    pub block_height: f64,
    /// Cursor advance after each content block, independent of its text.
    pub block_step: f64,
    pub max_blocks: usize,
    pub max_block_chars: usize,

    /// Nothing more is placed once the cursor is below this line.
    pub bottom_limit: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_width: 10.0,
            slide_height: 7.5,
            title_box: BoxGeometry::new(0.5, 0.5, 9.0, 1.0),
            subtitle_box: BoxGeometry::new(0.5, 1.8, 9.0, 0.8),
            list_top: 2.8,
            list_left: 0.7,
            list_width: 9.0,
            list_item_height: 0.3,
            max_list_height: 4.0,
            list_gap: 0.2,
            max_list_items: 15,
            block_left: 0.5,
            block_width: 9.0,
            block_height: 0.5,
            block_step: 0.7,
            max_blocks: 3,
            max_block_chars: 200,
            bottom_limit: 6.5,
        }
    }
}

/// A fixed box position and size, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxGeometry {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}
