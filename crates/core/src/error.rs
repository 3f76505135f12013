//! Error types for HTML to PPTX conversion.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a presentation.
///
/// Missing titles, empty lists and similar gaps in the source are not
/// errors; they resolve to empty values during extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the input or write the output file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input document is not valid UTF-8.
    #[error("Invalid text encoding: {0}")]
    EncodingError(String),

    /// The markup could not be turned into a document tree.
    #[error("HTML parsing error: {0}")]
    HtmlError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML generation or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid or unreadable render configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
