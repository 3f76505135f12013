//! HTML front end: a tolerant document tree and slide content extraction.
//!
//! Slides are `div` elements carrying the `slide` class; their titles,
//! subtitles, lists and highlight blocks are found by marker classes.

pub mod dom;
pub mod extract;

pub use dom::{Document, Element, NodeId};
pub use extract::{ContentExtractor, Marker};
