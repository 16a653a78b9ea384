//! Reading and minimally-invasive rewriting of Odoo `__manifest__.py` files.
//!
//! A manifest is a single Python literal mapping. It is parsed with ruff's
//! Python parser, and every edit is a string splice keyed by the byte ranges
//! of that tree. Bytes outside the edited spans, comments and blank lines
//! included, are never regenerated.

mod assets;
mod literal;
mod locate;
mod patch;
mod style;
mod value;

pub use assets::Assets;
pub use literal::{serialize_entry, serialize_value};
pub use locate::{locate_assets_insertion_point, locate_key_range};
pub use patch::{append_key, merge_assets, patch_manifest, remove_key, replace_key};
pub use style::{ManifestStyle, sniff_indent_width, sniff_quote_char};
pub use value::{ManifestDict, ManifestValue};

/// File names recognized as module manifests, newest first.
pub const MANIFEST_NAMES: &[&str] = &["__manifest__.py", "__openerp__.py"];

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to parse manifest: {0}")]
    Syntax(String),

    #[error("manifest is not a single literal mapping")]
    NotALiteralMapping,

    #[error("manifest mapping has a non-string key")]
    NonStringKey,

    #[error("manifest key `{0}` not found")]
    KeyNotFound(String),

    #[error("manifest value of `{0}` is not a literal that can be extended in place")]
    UnsupportedValue(String),

    #[error("could not determine the manifest indentation width")]
    UnknownIndentation,

    #[error("failed to serialize manifest value")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T, E = ManifestError> = std::result::Result<T, E>;
