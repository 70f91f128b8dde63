//! Error types for XML marshalling.

use std::io;

/// Errors that can occur during storage XML serialization or parsing.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),

    /// The record schema uses a field kind the parser does not support.
    #[error("unsupported field kind: {0}")]
    Unsupported(&'static str),

    /// A feed document whose root is neither `feed` nor `entry`.
    #[error("unrecognized feed document root: {0}")]
    UnrecognizedDocument(String),

    /// A field descriptor whose kind does not fit the field's storage.
    #[error("field `{field}` of `{record}` cannot hold a {expected} value")]
    SlotMismatch {
        /// Record type name.
        record: &'static str,
        /// Field identifier.
        field: &'static str,
        /// What the descriptor asked for.
        expected: &'static str,
    },

    /// A byte-only request parameter received some other value.
    #[error("{0} should be of type bytes.")]
    InvalidArgumentType(String),
}
