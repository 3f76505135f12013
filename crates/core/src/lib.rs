//! Core domain types, text cleaning, render configuration and slide layout
//! for converting HTML slide presentations to PowerPoint decks.

pub mod config;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod types;

pub use config::{BoxGeometry, LayoutConfig, RenderConfig, StyleConfig};
pub use error::{Error, Result};
pub use layout::{LayoutCursor, SlideLayoutBuilder};
pub use normalize::clean_text;
pub use types::{Alignment, Deck, Emu, Paragraph, RgbColor, Slide, SlideContent, TextBox};
