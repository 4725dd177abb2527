//! Salsa database definition and queries.

use std::sync::Arc;

use crate::base::FileId;
use crate::syntax::{SourceUnit, SyntaxError};

// ============================================================================
// INPUTS
// ============================================================================

/// Input: The raw text content of a file.
///
/// Create a new input when a file is opened or changed.
#[salsa::input]
pub struct FileText {
    pub file: FileId,
    #[return_ref]
    pub text: String,
}

// ============================================================================
// DATABASE
// ============================================================================

/// The root Salsa database for HIR operations.
///
/// Parsing is memoized per [`FileText`]; everything downstream of the
/// declaration table lives in a [`Compilation`](super::Compilation).
#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for RootDatabase {
    fn salsa_event(&self, _event: &dyn Fn() -> salsa::Event) {
        // Default no-op implementation
    }
}

impl RootDatabase {
    /// Create a new, empty database.
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// PARSE RESULT
// ============================================================================

/// Parse result with optional declaration tree and errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResult {
    /// The parsed unit, if parsing succeeded.
    pub unit: Option<Arc<SourceUnit>>,
    pub errors: Vec<SyntaxError>,
}

impl ParseResult {
    pub fn ok(unit: SourceUnit) -> Self {
        Self {
            unit: Some(Arc::new(unit)),
            errors: Vec::new(),
        }
    }

    pub fn err(error: SyntaxError) -> Self {
        Self {
            unit: None,
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.unit.is_some()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ============================================================================
// TRACKED QUERIES
// ============================================================================

/// Parse a file into its declaration skeleton.
///
/// This is a tracked Salsa query - results are memoized per `FileText`.
#[salsa::tracked]
pub fn parse_file(db: &dyn salsa::Database, file_text: FileText) -> ParseResult {
    let text = file_text.text(db);
    match crate::parser::parse(text) {
        Ok(unit) => {
            tracing::trace!(
                "[PARSE] {:?}: {} top-level items",
                file_text.file(db),
                unit.items.len()
            );
            ParseResult::ok(unit)
        }
        Err(error) => {
            tracing::debug!("[PARSE] {:?}: {}", file_text.file(db), error);
            ParseResult::err(error)
        }
    }
}
