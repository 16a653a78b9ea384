//! Helpers for end-to-end tests of the migration binary.

pub mod sandbox;
pub mod snapdir;

pub use insta::assert_snapshot;
pub use sandbox::Sandbox;
pub use snapdir::dir_manifest;
