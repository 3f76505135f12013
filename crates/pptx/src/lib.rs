//! PPTX (Office Open XML) backend: writes decks as .pptx packages and reads
//! them back for inspection.

pub mod inspect;
pub mod templates;
pub mod writer;

pub use inspect::{DeckInspector, InspectedDeck, InspectedShape, InspectedSlide};
pub use writer::PptxWriter;
