//! A small XML document model that survives a parse/edit/write cycle.
//!
//! Odoo view files are hand formatted. The tree keeps raw attribute text,
//! raw character data, comments and the blank lines between sibling
//! elements, so an untouched document writes back as it was read. Layout
//! is regenerated with two-space indentation, the way `lxml` indents.

mod document;
mod parse;
mod write;

pub use document::{Document, Element, Node};

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("closing tag `</{name}>` at byte {position} has no matching opening tag")]
    UnexpectedEnd { name: String, position: u64 },

    #[error("element `<{0}>` is never closed")]
    Unclosed(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text content outside the root element")]
    TextOutsideRoot,

    #[error("malformed attribute on `<{element}>`: {message}")]
    Attribute { element: String, message: String },
}

pub type Result<T, E = XmlError> = std::result::Result<T, E>;
