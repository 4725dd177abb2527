//! Symbol records stored in the [`SymbolTable`](super::SymbolTable) arenas.

use indexmap::IndexMap;

use super::ids::{Container, NamespaceId, ScopeId, SymbolRef, TypeId};
use crate::base::{FileId, Name, TextRange};
use crate::syntax::{Accessibility, TypeExpr, TypeKind};

/// Where a type's definition comes from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Origin {
    /// Declared in a source file of this compilation.
    Source,
    /// Imported from compiled metadata (`extern` declarations and the synthesized core library).
    Metadata,
}

/// Ordered name → symbols map. Several symbols may share a name (overloads, duplicates).
pub type MemberMap = IndexMap<Name, Vec<SymbolRef>>;

/// A class, struct, interface, enum or delegate definition.
#[derive(Clone, Debug)]
pub struct TypeSymbol {
    pub name: Name,
    pub kind: TypeKind,
    /// Declared accessibility with the language default applied.
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub is_sealed: bool,
    pub is_abstract: bool,
    pub is_partial: bool,
    pub origin: Origin,
    pub container: Container,
    pub type_params: Vec<Name>,
    /// One entry per declaration piece; partial types have several.
    pub declarations: Vec<DeclarationPiece>,
    pub members: MemberMap,
}

impl TypeSymbol {
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Sealed either explicitly or by kind: structs, enums and delegates cannot be derived from.
    pub fn is_effectively_sealed(&self) -> bool {
        self.is_sealed
            || matches!(
                self.kind,
                TypeKind::Struct | TypeKind::Enum | TypeKind::Delegate
            )
    }

    pub fn containing_type(&self) -> Option<TypeId> {
        match self.container {
            Container::Type(ty) => Some(ty),
            Container::Namespace(_) => None,
        }
    }

    /// Total number of base-list entries across all pieces.
    pub fn base_expr_count(&self) -> usize {
        self.declarations.iter().map(|d| d.bases.len()).sum()
    }
}

/// One syntactic declaration of a type.
#[derive(Clone, Debug)]
pub struct DeclarationPiece {
    /// `None` for synthesized core-library types.
    pub file: Option<FileId>,
    /// Innermost namespace-declaration scope enclosing the declaration.
    pub scope: ScopeId,
    pub name_range: TextRange,
    /// Base-list expressions exactly as written.
    pub bases: Vec<TypeExpr>,
}

#[derive(Clone, Debug)]
pub struct NamespaceSymbol {
    /// Empty for the global namespace.
    pub name: Name,
    pub parent: Option<NamespaceId>,
    pub members: MemberMap,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MemberKind {
    Field,
    Method,
    Property,
    EnumMember,
}

/// A non-type member of a type.
#[derive(Clone, Debug)]
pub struct MemberSymbol {
    pub name: Name,
    pub kind: MemberKind,
    pub owner: TypeId,
    pub file: Option<FileId>,
    pub range: TextRange,
}

/// One namespace-declaration level: its namespace and the namespaces its `using` directives import.
///
/// Scopes form a chain from the innermost namespace declaration out to the
/// compilation unit, whose namespace is the global namespace.
#[derive(Clone, Debug)]
pub struct ImportScope {
    pub parent: Option<ScopeId>,
    pub namespace: NamespaceId,
    pub imports: Vec<NamespaceId>,
}
