//! # typegraph
//!
//! Type and namespace symbol graph with lazy, cycle-safe resolution of base
//! classes and interface lists for a C#-like declaration language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost: file content in, name-based queries out
//!   ↓
//! hir       → Symbol table, name binding, base resolution, member lookup
//!   ↓
//! syntax    → Declaration AST, DeclarationTable, SyntaxError
//!   ↓
//! parser    → Logos lexer, recursive-descent declaration parser
//!   ↓
//! base      → Primitives (FileId, Name, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → ide)
// ============================================================================

/// Foundation types: FileId, Name, TextRange
pub mod base;

/// Parser: Logos lexer and recursive-descent declaration parser
pub mod parser;

/// Syntax: declaration AST, DeclarationTable, SyntaxError
pub mod syntax;

/// High-level IR: symbol graph and the base resolution engine
pub mod hir;

/// IDE-facing host over files and compilations
pub mod ide;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, Name, TextRange, TextSize};
