//! Foundation types for the typegraph crate.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Opaque file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Name`] - Cheap-to-clone identifier strings
//!
//! This module has NO dependencies on other typegraph modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

/// An identifier as written in source. Short names are stored inline.
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size;
