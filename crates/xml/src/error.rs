//! Error types for fragment parsing and writing.

use thiserror::Error;

/// Errors raised while parsing or writing an XML fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    /// The input ended while elements were still open.
    #[error("unexpected end of input inside <{open}>")]
    UnexpectedEof { open: String },

    /// An end tag closes a different element than the one open.
    #[error("mismatched end tag at byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedEnd {
        position: usize,
        expected: String,
        found: String,
    },

    /// The input contains no element at all.
    #[error("fragment has no root element")]
    NoRootElement,

    /// Something other than whitespace, comments or processing instructions
    /// follows the root element.
    #[error("unexpected content after root element at byte {position}")]
    TrailingContent { position: usize },

    /// The writer failed to emit an event.
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Result type alias for fragment operations.
pub type Result<T> = std::result::Result<T, XmlError>;
