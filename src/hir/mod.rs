//! High-level IR (HIR): the type/namespace symbol graph and base resolution.
//!
//! ## Key Types
//!
//! - [`SymbolTable`] - arenas of namespaces, types, members and import scopes
//! - [`Compilation`] - a table plus lazily computed base/interface slots
//! - [`TypeRef`] - a bound type: constructed type, type parameter or error
//! - [`Diagnostic`] - structured errors, reported through a [`DiagnosticSink`]
//! - [`RootDatabase`] - Salsa database memoizing per-file parsing
//!
//! ## Query Layers
//!
//! ```text
//! parse_file(file)          ← Salsa: source text → declaration skeleton
//!     │
//!     ▼
//! SymbolTable::build        ← syntactic: types, members, usings, partials
//!     │
//!     ▼
//! declared(T)               ← bind base lists (may re-enter for other types)
//!     │
//!     ▼
//! base(T) / interfaces(T)   ← cycle checks
//!     │
//!     ▼
//! all_interfaces(T)         ← transitive closure
//! ```
//!
//! Every slot above the table is computed on first use, at most once, and
//! shared by all later queries on the same [`Compilation`].

mod bases;
mod compilation;
mod db;
mod diagnostics;
mod ids;
mod lookup;
mod resolve;
mod slot;
mod symbols;
mod table;
mod types;

pub use compilation::{Compilation, CompilationOptions};
pub use db::{FileText, ParseResult, RootDatabase, parse_file};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticKind, DiagnosticSink, Location, Severity, codes,
};
pub use ids::{Container, MemberId, NamespaceId, ScopeId, SymbolRef, TypeId, TypeParamId};
pub use lookup::{LookupHit, LookupOptions};
pub use symbols::{
    DeclarationPiece, ImportScope, MemberKind, MemberMap, MemberSymbol, NamespaceSymbol, Origin,
    TypeSymbol,
};
pub use table::{SpecialTypes, SymbolTable, SymbolTableBuilder, SymbolTableError, TypeDeclaration};
pub use types::{
    ErrorReason, ErrorType, ErrorTypeRef, NamedType, Substitution, TypeRef, display,
    instance_type,
};
