//! Error types for XML document writing and error envelope parsing.

use std::io;

/// Errors that can occur while building, rendering or parsing XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),

    /// A node tree violates a structural rule (empty name, attribute root, attribute children).
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// A value handed to a writer could not be represented.
    #[error("invalid value for `{node}`: {reason}")]
    InvalidValue {
        /// Name of the node being written.
        node: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl XmlError {
    /// Create an [`XmlError::InvalidValue`] for the given node.
    #[must_use]
    pub fn invalid_value(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            node: node.into(),
            reason: reason.into(),
        }
    }
}
