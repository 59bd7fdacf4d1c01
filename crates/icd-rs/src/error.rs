// crates/icd-rs/src/error.rs

use crate::path::PathError;
use alloc::fmt;
use alloc::string::String;
use quick_xml::Error as XmlError;

/// Errors that can occur while parsing an ICD file or dumping its graph.
#[derive(Debug)]
pub enum IcdError {
    /// An error from the underlying `quick-xml` reader (malformed XML).
    XmlParsing(XmlError),

    /// A required XML element was missing (e.g., the document root).
    MissingElement { element: &'static str },

    /// Element text referenced an entity other than the predefined XML ones.
    UnknownEntity { entity: String },

    /// An element was still open when the input ended.
    UnclosedElement { tag: String },

    /// A required attribute was missing (e.g., @index on a `datas` element).
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// An attribute (e.g., @index) had an invalid format.
    InvalidAttributeFormat {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Two indexed elements declared the same @index.
    DuplicateIndex { index: u64 },

    /// No indexed element carries the requested @index.
    UnknownIndex { index: u64 },

    /// A reference-path expression could not be resolved during the second pass.
    UnresolvedReference {
        /// @index of the element holding the reference.
        index: u64,
        /// Attribute holding the expression (`channels`, `datas` or `filters`).
        field: &'static str,
        expression: String,
        source: PathError,
    },

    /// Dump options were rejected before any parsing started.
    Configuration(String),
}

impl From<XmlError> for IcdError {
    fn from(e: XmlError) -> Self {
        IcdError::XmlParsing(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for IcdError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        IcdError::XmlParsing(XmlError::from(e))
    }
}

impl fmt::Display for IcdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcdError::XmlParsing(e) => write!(f, "XML parsing error: {}", e),
            IcdError::MissingElement { element } => {
                write!(f, "Missing required XML element: {}", element)
            }
            IcdError::UnknownEntity { entity } => {
                write!(f, "Unknown entity reference '&{};'", entity)
            }
            IcdError::UnclosedElement { tag } => {
                write!(f, "Element <{}> is not closed before end of input", tag)
            }
            IcdError::MissingAttribute { element, attribute } => {
                write!(f, "Missing required attribute '{}' on <{}>", attribute, element)
            }
            IcdError::InvalidAttributeFormat {
                element,
                attribute,
                value,
            } => write!(
                f,
                "Invalid format for attribute '{}' on <{}>: {:?}",
                attribute, element, value
            ),
            IcdError::DuplicateIndex { index } => {
                write!(f, "Index {} is declared by more than one element", index)
            }
            IcdError::UnknownIndex { index } => write!(f, "No element with index {}", index),
            IcdError::UnresolvedReference {
                index,
                field,
                expression,
                source,
            } => write!(
                f,
                "Cannot resolve '{}' of element {} ({:?}): {}",
                field, index, expression, source
            ),
            IcdError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl core::error::Error for IcdError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            IcdError::XmlParsing(e) => Some(e),
            IcdError::UnresolvedReference { source, .. } => Some(source),
            _ => None,
        }
    }
}
