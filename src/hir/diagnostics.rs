//! Diagnostics: structured semantic errors.
//!
//! Diagnostics carry a [`DiagnosticKind`] with symbol ids rather than a
//! pre-rendered message, so tests and tools can match on them exactly.
//! [`DiagnosticKind::message`] renders default English text against a
//! [`SymbolTable`].
//!
//! Every resolution slot reports its diagnostics exactly once, when its value
//! is published, to the [`DiagnosticSink`] attached to the compilation.

use parking_lot::Mutex;

use super::ids::{SymbolRef, TypeId, TypeParamId};
use super::table::SymbolTable;
use crate::base::{FileId, Name, TextRange};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// Source location of a diagnostic: the base expression or declaration name it concerns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: FileId,
    pub range: TextRange,
}

/// What went wrong. `ty` is always the type whose declaration is being checked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // --- binding ---
    TypeNotFound { name: Name, arity: usize },
    DottedNameNotFound { container: SymbolRef, name: Name, arity: usize },
    AmbiguousReference { name: Name, candidates: Vec<SymbolRef> },
    /// A namespace was named where a type is required.
    NotAType { name: Name },
    NamespaceNotFound { name: Name },
    TypeParameterBase { ty: TypeId, param: TypeParamId },

    // --- base-list structure ---
    StaticBaseClass { ty: TypeId, base: TypeId },
    SealedBaseClass { ty: TypeId, base: TypeId },
    StaticClassBase { ty: TypeId, base: TypeId },
    StaticClassInterface { ty: TypeId, interface: TypeId },
    NotAnInterface { ty: TypeId, found: TypeId },
    BaseClassMustBeFirst { ty: TypeId, base: TypeId },
    PartialBaseClassMismatch { ty: TypeId },
    DuplicateInterface { ty: TypeId, interface: TypeId },

    // --- accessibility ---
    InconsistentBaseAccessibility { ty: TypeId, base: TypeId },
    InconsistentInterfaceAccessibility { ty: TypeId, interface: TypeId },

    // --- cycles ---
    /// `ty`'s base depends on itself; `neighbor` is the next type on the cycle.
    CircularBase { ty: TypeId, neighbor: TypeId },
    CycleInInterfaceInheritance { ty: TypeId, neighbor: TypeId },
    /// `ty`'s base chain reaches `imported`, an imported type whose own base chain is cyclic.
    ImportedCircularBase { ty: TypeId, imported: TypeId },

    // --- declarations ---
    DuplicateTypeDeclaration { ty: TypeId, existing: TypeId },
    PartialKindMismatch { ty: TypeId, existing: TypeId },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        use DiagnosticKind as K;
        match self {
            K::TypeNotFound { .. } => codes::TYPE_NOT_FOUND,
            K::AmbiguousReference { .. } => codes::AMBIGUOUS_REFERENCE,
            K::DottedNameNotFound { .. } => codes::DOTTED_NAME_NOT_FOUND,
            K::NotAType { .. } => codes::NOT_A_TYPE,
            K::NamespaceNotFound { .. } => codes::NAMESPACE_NOT_FOUND,
            K::TypeParameterBase { .. } => codes::TYPE_PARAMETER_BASE,
            K::StaticBaseClass { .. } => codes::STATIC_BASE_CLASS,
            K::SealedBaseClass { .. } => codes::SEALED_BASE_CLASS,
            K::StaticClassBase { .. } => codes::STATIC_CLASS_BASE,
            K::StaticClassInterface { .. } => codes::STATIC_CLASS_INTERFACE,
            K::NotAnInterface { .. } => codes::NOT_AN_INTERFACE,
            K::BaseClassMustBeFirst { .. } => codes::BASE_CLASS_MUST_BE_FIRST,
            K::PartialBaseClassMismatch { .. } => codes::PARTIAL_BASE_CLASS_MISMATCH,
            K::DuplicateInterface { .. } => codes::DUPLICATE_INTERFACE,
            K::InconsistentBaseAccessibility { .. } => codes::INCONSISTENT_BASE_ACCESSIBILITY,
            K::InconsistentInterfaceAccessibility { .. } => {
                codes::INCONSISTENT_INTERFACE_ACCESSIBILITY
            }
            K::CircularBase { .. } => codes::CIRCULAR_BASE,
            K::CycleInInterfaceInheritance { .. } => codes::CYCLE_IN_INTERFACE_INHERITANCE,
            K::ImportedCircularBase { .. } => codes::IMPORTED_CIRCULAR_BASE,
            K::DuplicateTypeDeclaration { .. } => codes::DUPLICATE_TYPE_DECLARATION,
            K::PartialKindMismatch { .. } => codes::PARTIAL_KIND_MISMATCH,
        }
    }

    /// The type this diagnostic is attributed to, if any.
    ///
    /// Pure binding failures carry no subject of their own; the compilation
    /// attributes them to the type whose base clause failed to bind.
    pub fn subject(&self) -> Option<TypeId> {
        use DiagnosticKind as K;
        match self {
            K::TypeNotFound { .. }
            | K::DottedNameNotFound { .. }
            | K::AmbiguousReference { .. }
            | K::NotAType { .. }
            | K::NamespaceNotFound { .. } => None,
            K::TypeParameterBase { ty, .. }
            | K::StaticBaseClass { ty, .. }
            | K::SealedBaseClass { ty, .. }
            | K::StaticClassBase { ty, .. }
            | K::StaticClassInterface { ty, .. }
            | K::NotAnInterface { ty, .. }
            | K::BaseClassMustBeFirst { ty, .. }
            | K::PartialBaseClassMismatch { ty }
            | K::DuplicateInterface { ty, .. }
            | K::InconsistentBaseAccessibility { ty, .. }
            | K::InconsistentInterfaceAccessibility { ty, .. }
            | K::CircularBase { ty, .. }
            | K::CycleInInterfaceInheritance { ty, .. }
            | K::ImportedCircularBase { ty, .. }
            | K::DuplicateTypeDeclaration { ty, .. }
            | K::PartialKindMismatch { ty, .. } => Some(*ty),
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::CircularBase { .. } | DiagnosticKind::CycleInInterfaceInheritance { .. }
        )
    }

    /// Render a default English message.
    pub fn message(&self, table: &SymbolTable) -> String {
        use DiagnosticKind as K;
        let ty = |id: &TypeId| table.qualified_name(*id);
        match self {
            K::TypeNotFound { name, arity } => {
                format!("type or namespace '{}' could not be found", with_arity(name, *arity))
            }
            K::DottedNameNotFound {
                container,
                name,
                arity,
            } => format!(
                "'{}' does not contain a type named '{}'",
                table.display_symbol(*container),
                with_arity(name, *arity)
            ),
            K::AmbiguousReference { name, candidates } => {
                let names: Vec<String> =
                    candidates.iter().map(|c| table.display_symbol(*c)).collect();
                format!(
                    "ambiguous reference: '{}' could be: {}",
                    name,
                    names.join(", ")
                )
            }
            K::NotAType { name } => format!("'{name}' is a namespace but is used like a type"),
            K::NamespaceNotFound { name } => format!("namespace '{name}' could not be found"),
            K::TypeParameterBase { ty: t, param } => format!(
                "'{}' cannot derive from type parameter '{}'",
                ty(t),
                table.display_symbol(SymbolRef::TypeParameter(*param))
            ),
            K::StaticBaseClass { ty: t, base } => {
                format!("'{}' cannot derive from static class '{}'", ty(t), ty(base))
            }
            K::SealedBaseClass { ty: t, base } => {
                format!("'{}' cannot derive from sealed type '{}'", ty(t), ty(base))
            }
            K::StaticClassBase { ty: t, base } => format!(
                "static class '{}' cannot derive from type '{}'; static classes must derive from object",
                ty(t),
                ty(base)
            ),
            K::StaticClassInterface { ty: t, interface } => format!(
                "static class '{}' cannot implement interface '{}'",
                ty(t),
                ty(interface)
            ),
            K::NotAnInterface { ty: t, found } => format!(
                "type '{}' in the base list of '{}' is not an interface",
                ty(found),
                ty(t)
            ),
            K::BaseClassMustBeFirst { ty: t, base } => format!(
                "base class '{}' must come before any interfaces in the base list of '{}'",
                ty(base),
                ty(t)
            ),
            K::PartialBaseClassMismatch { ty: t } => format!(
                "partial declarations of '{}' must not specify different base classes",
                ty(t)
            ),
            K::DuplicateInterface { ty: t, interface } => format!(
                "'{}' is already listed in the interface list of '{}'",
                ty(interface),
                ty(t)
            ),
            K::InconsistentBaseAccessibility { ty: t, base } => format!(
                "inconsistent accessibility: base class '{}' is less accessible than class '{}'",
                ty(base),
                ty(t)
            ),
            K::InconsistentInterfaceAccessibility { ty: t, interface } => format!(
                "inconsistent accessibility: base interface '{}' is less accessible than interface '{}'",
                ty(interface),
                ty(t)
            ),
            K::CircularBase { ty: t, neighbor } => format!(
                "circular base type dependency involving '{}' and '{}'",
                ty(t),
                ty(neighbor)
            ),
            K::CycleInInterfaceInheritance { ty: t, neighbor } => format!(
                "inherited interface '{}' causes a cycle in the interface hierarchy of '{}'",
                ty(neighbor),
                ty(t)
            ),
            K::ImportedCircularBase { ty: t, imported } => format!(
                "imported type '{}' in the base chain of '{}' has a circular base dependency",
                ty(imported),
                ty(t)
            ),
            K::DuplicateTypeDeclaration { ty: t, .. } => {
                format!("duplicate definition: '{}' is already defined", ty(t))
            }
            K::PartialKindMismatch { ty: t, .. } => format!(
                "partial declarations of '{}' must all be the same kind of type",
                ty(t)
            ),
        }
    }
}

fn with_arity(name: &Name, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{name}<{}>", ",".repeat(arity - 1))
    }
}

/// A diagnostic with location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// `None` for diagnostics on synthesized declarations.
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(kind: DiagnosticKind, location: Option<Location>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            location,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn file(&self) -> Option<FileId> {
        self.location.map(|l| l.file)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Error Code Ranges
///
/// - **E0001-E0019**: Name binding
/// - **E0020-E0029**: Base-list structure
/// - **E0030-E0039**: Accessibility consistency
/// - **E0040-E0049**: Inheritance cycles
/// - **E0050-E0059**: Declarations
pub mod codes {
    // ========================================================================
    // NAME BINDING (E0001-E0019)
    // ========================================================================

    /// Simple name not found in any enclosing scope.
    pub const TYPE_NOT_FOUND: &str = "E0001";
    /// Several candidates at the same scope level.
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    /// Qualified name's right side not found in its qualifier.
    pub const DOTTED_NAME_NOT_FOUND: &str = "E0003";
    /// Namespace used where a type is expected.
    pub const NOT_A_TYPE: &str = "E0004";
    /// `using` directive names an unknown namespace.
    pub const NAMESPACE_NOT_FOUND: &str = "E0005";
    /// Type parameter used as a base type.
    pub const TYPE_PARAMETER_BASE: &str = "E0006";

    // ========================================================================
    // BASE-LIST STRUCTURE (E0020-E0029)
    // ========================================================================

    pub const STATIC_BASE_CLASS: &str = "E0020";
    pub const SEALED_BASE_CLASS: &str = "E0021";
    pub const STATIC_CLASS_BASE: &str = "E0022";
    pub const STATIC_CLASS_INTERFACE: &str = "E0023";
    pub const NOT_AN_INTERFACE: &str = "E0024";
    pub const BASE_CLASS_MUST_BE_FIRST: &str = "E0025";
    pub const PARTIAL_BASE_CLASS_MISMATCH: &str = "E0026";
    pub const DUPLICATE_INTERFACE: &str = "E0027";

    // ========================================================================
    // ACCESSIBILITY (E0030-E0039)
    // ========================================================================

    pub const INCONSISTENT_BASE_ACCESSIBILITY: &str = "E0030";
    pub const INCONSISTENT_INTERFACE_ACCESSIBILITY: &str = "E0031";

    // ========================================================================
    // CYCLES (E0040-E0049)
    // ========================================================================

    pub const CIRCULAR_BASE: &str = "E0040";
    pub const CYCLE_IN_INTERFACE_INHERITANCE: &str = "E0041";
    pub const IMPORTED_CIRCULAR_BASE: &str = "E0042";

    // ========================================================================
    // DECLARATIONS (E0050-E0059)
    // ========================================================================

    pub const DUPLICATE_TYPE_DECLARATION: &str = "E0050";
    pub const PARTIAL_KIND_MISMATCH: &str = "E0051";
}

// ============================================================================
// DIAGNOSTIC SINK
// ============================================================================

/// Receives diagnostics as resolution publishes them.
///
/// Called from whichever thread publishes a slot; implementations must be thread-safe.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// A [`DiagnosticSink`] that keeps everything it receives, in arrival order.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all diagnostics received so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.file() == Some(file))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}
