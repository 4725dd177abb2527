//! Symbol table: arenas of namespaces, types, members and import scopes.
//!
//! The table is pure storage: building it is syntactic and never resolves a
//! base list. Lookups here are exact-name lookups in one container; walking
//! base types is the job of the compilation (see `lookup.rs`).

use indexmap::map::Entry;

use super::compilation::CompilationOptions;
use super::diagnostics::{Diagnostic, DiagnosticKind, Location};
use super::ids::{Container, MemberId, NamespaceId, ScopeId, SymbolRef, TypeId, TypeParamId};
use super::symbols::{
    DeclarationPiece, ImportScope, MemberKind, MemberSymbol, NamespaceSymbol, Origin, TypeSymbol,
};
use crate::base::{FileId, Name, TextRange};
use crate::syntax::{
    Accessibility, DeclarationTable, MemberDecl, Modifiers, NamespaceItem, SourceUnit, TypeDecl,
    TypeExpr, TypeKind,
};

/// Misuse of the table API: ids that this table did not create.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolTableError {
    #[error("unknown container {0:?}")]
    UnknownContainer(Container),
    #[error("unknown type {0:?}")]
    UnknownType(TypeId),
    #[error("unknown import scope {0:?}")]
    UnknownScope(ScopeId),
}

/// Core-library types that implicit bases refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpecialTypes {
    pub object: Option<TypeId>,
    pub value_type: Option<TypeId>,
    pub enum_type: Option<TypeId>,
    pub delegate: Option<TypeId>,
    pub multicast_delegate: Option<TypeId>,
}

/// Names and base classes of the synthesized core library, in dependency order.
const CORE_TYPES: &[(&str, Option<&str>)] = &[
    ("Object", None),
    ("ValueType", Some("Object")),
    ("Enum", Some("ValueType")),
    ("Delegate", Some("Object")),
    ("MulticastDelegate", Some("Delegate")),
];

#[derive(Clone, Debug)]
pub struct SymbolTable {
    types: Vec<TypeSymbol>,
    namespaces: Vec<NamespaceSymbol>,
    members: Vec<MemberSymbol>,
    scopes: Vec<ImportScope>,
    special: SpecialTypes,
    diagnostics: Vec<Diagnostic>,
}

impl SymbolTable {
    /// Build the table for every unit in `decls`.
    pub fn build(decls: &DeclarationTable, options: &CompilationOptions) -> Self {
        let mut builder = SymbolTableBuilder::new();
        for (file, unit) in decls.units() {
            builder.add_source_unit(file, unit);
        }
        builder.finish(options)
    }

    // ========================================================================
    // ARENA ACCESS
    // ========================================================================

    pub fn global_namespace(&self) -> NamespaceId {
        NamespaceId::from_index(0)
    }

    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.index()]
    }

    pub fn namespace(&self, id: NamespaceId) -> &NamespaceSymbol {
        &self.namespaces[id.index()]
    }

    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        &self.members[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &ImportScope {
        &self.scopes[id.index()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len()).map(TypeId::from_index)
    }

    pub fn special_types(&self) -> &SpecialTypes {
        &self.special
    }

    /// Diagnostics found while building: duplicate declarations and unresolved usings.
    pub fn declaration_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ========================================================================
    // LOOKUP (no base walk)
    // ========================================================================

    /// Symbols named `name` declared directly in `container`.
    pub fn members(
        &self,
        container: Container,
        name: &str,
    ) -> Result<&[SymbolRef], SymbolTableError> {
        let map = match container {
            Container::Namespace(ns) => self.namespaces.get(ns.index()).map(|n| &n.members),
            Container::Type(ty) => self.types.get(ty.index()).map(|t| &t.members),
        }
        .ok_or(SymbolTableError::UnknownContainer(container))?;
        Ok(map.get(name).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Like [`members`](Self::members) for ids known to come from this table.
    pub(crate) fn own_members(&self, container: Container, name: &str) -> &[SymbolRef] {
        self.members(container, name).unwrap_or(&[])
    }

    /// Types named `name` with `arity` type parameters declared directly in `ty`.
    pub fn nested_types(&self, ty: TypeId, name: &str, arity: usize) -> Vec<TypeId> {
        self.types_with_arity(self.own_members(Container::Type(ty), name), arity)
    }

    pub fn namespace_types(&self, ns: NamespaceId, name: &str, arity: usize) -> Vec<TypeId> {
        self.types_with_arity(self.own_members(Container::Namespace(ns), name), arity)
    }

    fn types_with_arity(&self, symbols: &[SymbolRef], arity: usize) -> Vec<TypeId> {
        symbols
            .iter()
            .filter_map(|s| s.as_type())
            .filter(|t| self.type_symbol(*t).arity() == arity)
            .collect()
    }

    pub fn child_namespace(&self, ns: NamespaceId, name: &str) -> Option<NamespaceId> {
        self.own_members(Container::Namespace(ns), name)
            .iter()
            .find_map(|s| s.as_namespace())
    }

    /// Find a namespace by dotted path from the global namespace. `""` is the global namespace.
    pub fn find_namespace(&self, dotted: &str) -> Option<NamespaceId> {
        let mut ns = self.global_namespace();
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            ns = self.child_namespace(ns, segment)?;
        }
        Some(ns)
    }

    /// Find every type at a dotted path such as `N.Outer.Inner`.
    ///
    /// Intermediate type segments match any arity; the last segment must have `arity`.
    pub fn find_types(&self, dotted: &str, arity: usize) -> Vec<TypeId> {
        let segments: Vec<&str> = dotted.split('.').collect();
        let Some((last, prefix)) = segments.split_last() else {
            return Vec::new();
        };
        let mut container = Container::Namespace(self.global_namespace());
        for segment in prefix {
            let next = self.own_members(container, segment).iter().find_map(|s| match s {
                SymbolRef::Namespace(ns) => Some(Container::Namespace(*ns)),
                SymbolRef::Type(ty) => Some(Container::Type(*ty)),
                _ => None,
            });
            match next {
                Some(c) => container = c,
                None => return Vec::new(),
            }
        }
        self.types_with_arity(self.own_members(container, last), arity)
    }

    pub fn find_type(&self, dotted: &str, arity: usize) -> Option<TypeId> {
        self.find_types(dotted, arity).into_iter().next()
    }

    // ========================================================================
    // NAMES
    // ========================================================================

    /// Dotted name through namespaces and enclosing types, e.g. `System.Object`.
    pub fn qualified_name(&self, ty: TypeId) -> String {
        let symbol = self.type_symbol(ty);
        let prefix = match symbol.container {
            Container::Type(outer) => self.qualified_name(outer),
            Container::Namespace(ns) => self.namespace_path(ns),
        };
        if prefix.is_empty() {
            symbol.name.to_string()
        } else {
            format!("{prefix}.{}", symbol.name)
        }
    }

    /// Dotted path of a namespace; empty for the global namespace.
    pub fn namespace_path(&self, ns: NamespaceId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(ns);
        while let Some(id) = current {
            let symbol = self.namespace(id);
            if !symbol.name.is_empty() {
                parts.push(symbol.name.as_str());
            }
            current = symbol.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn type_param_name(&self, param: TypeParamId) -> &Name {
        &self.type_symbol(param.owner).type_params[param.ordinal as usize]
    }

    /// Human-readable name of any symbol, for messages.
    pub fn display_symbol(&self, symbol: SymbolRef) -> String {
        match symbol {
            SymbolRef::Namespace(ns) => {
                let path = self.namespace_path(ns);
                if path.is_empty() {
                    "<global namespace>".to_string()
                } else {
                    path
                }
            }
            SymbolRef::Type(ty) => self.qualified_name(ty),
            SymbolRef::Member(m) => {
                let member = self.member(m);
                format!("{}.{}", self.qualified_name(member.owner), member.name)
            }
            SymbolRef::TypeParameter(p) => self.type_param_name(p).to_string(),
        }
    }

    /// Enclosing types of `ty`, innermost first.
    pub fn enclosing_types(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        std::iter::successors(self.type_symbol(ty).containing_type(), |t| {
            self.type_symbol(*t).containing_type()
        })
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Everything needed to declare one type (or one piece of a partial type).
#[derive(Clone, Debug)]
pub struct TypeDeclaration {
    pub name: Name,
    pub kind: TypeKind,
    pub type_params: Vec<Name>,
    pub modifiers: Modifiers,
    pub bases: Vec<TypeExpr>,
    pub file: Option<FileId>,
    pub scope: ScopeId,
    pub name_range: TextRange,
}

impl TypeDeclaration {
    fn from_syntax(decl: &TypeDecl, file: FileId, scope: ScopeId) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind,
            type_params: decl.type_params.clone(),
            modifiers: decl.modifiers,
            bases: decl.bases.clone(),
            file: Some(file),
            scope,
            name_range: decl.name_range,
        }
    }

    fn location(&self) -> Option<Location> {
        self.file.map(|file| Location {
            file,
            range: self.name_range,
        })
    }
}

/// Incrementally populates a [`SymbolTable`].
///
/// Declaration order is preserved everywhere: member maps, piece lists and
/// diagnostics all follow the order of the `declare_*` calls.
#[derive(Debug)]
pub struct SymbolTableBuilder {
    table: SymbolTable,
    usings: Vec<PendingUsing>,
}

#[derive(Debug)]
struct PendingUsing {
    scope: ScopeId,
    path: Vec<Name>,
    location: Option<Location>,
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        let global = NamespaceSymbol {
            name: Name::default(),
            parent: None,
            members: Default::default(),
        };
        Self {
            table: SymbolTable {
                types: Vec::new(),
                namespaces: vec![global],
                members: Vec::new(),
                scopes: Vec::new(),
                special: SpecialTypes::default(),
                diagnostics: Vec::new(),
            },
            usings: Vec::new(),
        }
    }

    pub fn global_namespace(&self) -> NamespaceId {
        self.table.global_namespace()
    }

    /// Get or create the child namespace `name` of `parent`.
    pub fn declare_namespace(
        &mut self,
        parent: NamespaceId,
        name: &str,
    ) -> Result<NamespaceId, SymbolTableError> {
        self.check_container(Container::Namespace(parent))?;
        Ok(self.namespace_in(parent, name))
    }

    /// Add an import scope. A scope without a parent is the outermost (compilation unit) level.
    pub fn add_scope(
        &mut self,
        parent: Option<ScopeId>,
        namespace: NamespaceId,
    ) -> Result<ScopeId, SymbolTableError> {
        if let Some(p) = parent {
            if p.index() >= self.table.scopes.len() {
                return Err(SymbolTableError::UnknownScope(p));
            }
        }
        self.check_container(Container::Namespace(namespace))?;
        Ok(self.scope_in(parent, namespace))
    }

    /// Record `using path;` for `scope`. Resolved when the table is finished.
    pub fn add_using(
        &mut self,
        scope: ScopeId,
        path: Vec<Name>,
        location: Option<Location>,
    ) -> Result<(), SymbolTableError> {
        if scope.index() >= self.table.scopes.len() {
            return Err(SymbolTableError::UnknownScope(scope));
        }
        self.usings.push(PendingUsing {
            scope,
            path,
            location,
        });
        Ok(())
    }

    /// Declare a type in `container`.
    ///
    /// A `partial` declaration whose container already holds a partial type of
    /// the same name, arity and kind is merged into it. Any other clash creates
    /// a distinct symbol and records a diagnostic; lookups then see both.
    pub fn declare_type(
        &mut self,
        container: Container,
        decl: TypeDeclaration,
    ) -> Result<TypeId, SymbolTableError> {
        self.check_container(container)?;
        if decl.scope.index() >= self.table.scopes.len() {
            return Err(SymbolTableError::UnknownScope(decl.scope));
        }
        Ok(self.type_in(container, decl))
    }

    pub fn declare_member(
        &mut self,
        owner: TypeId,
        name: Name,
        kind: MemberKind,
        file: Option<FileId>,
        range: TextRange,
    ) -> Result<MemberId, SymbolTableError> {
        if owner.index() >= self.table.types.len() {
            return Err(SymbolTableError::UnknownType(owner));
        }
        Ok(self.member_in(owner, name, kind, file, range))
    }

    /// Declare everything in a parsed source unit.
    pub fn add_source_unit(&mut self, file: FileId, unit: &SourceUnit) {
        let global = self.global_namespace();
        let scope = self.scope_in(None, global);
        for using in &unit.usings {
            self.usings.push(PendingUsing {
                scope,
                path: using.path.clone(),
                location: Some(Location {
                    file,
                    range: using.range,
                }),
            });
        }
        self.add_items(file, global, scope, &unit.items);
    }

    fn add_items(&mut self, file: FileId, ns: NamespaceId, scope: ScopeId, items: &[NamespaceItem]) {
        for item in items {
            match item {
                NamespaceItem::Namespace(decl) => {
                    // `namespace A.B` opens one scope per segment.
                    let mut inner_ns = ns;
                    let mut inner_scope = scope;
                    for segment in &decl.path {
                        inner_ns = self.namespace_in(inner_ns, segment);
                        inner_scope = self.scope_in(Some(inner_scope), inner_ns);
                    }
                    for using in &decl.usings {
                        self.usings.push(PendingUsing {
                            scope: inner_scope,
                            path: using.path.clone(),
                            location: Some(Location {
                                file,
                                range: using.range,
                            }),
                        });
                    }
                    self.add_items(file, inner_ns, inner_scope, &decl.items);
                }
                NamespaceItem::Type(decl) => {
                    self.add_type_decl(file, Container::Namespace(ns), scope, decl);
                }
            }
        }
    }

    fn add_type_decl(&mut self, file: FileId, container: Container, scope: ScopeId, decl: &TypeDecl) {
        let id = self.type_in(container, TypeDeclaration::from_syntax(decl, file, scope));
        for member in &decl.members {
            let (named, kind) = match member {
                MemberDecl::Type(nested) => {
                    self.add_type_decl(file, Container::Type(id), scope, nested);
                    continue;
                }
                MemberDecl::Field(m) => (m, MemberKind::Field),
                MemberDecl::Method(m) => (m, MemberKind::Method),
                MemberDecl::Property(m) => (m, MemberKind::Property),
                MemberDecl::EnumMember(m) => (m, MemberKind::EnumMember),
            };
            self.member_in(id, named.name.clone(), kind, Some(file), named.range);
        }
    }

    /// Resolve usings, synthesize the core library and record special types.
    pub fn finish(mut self, options: &CompilationOptions) -> SymbolTable {
        let core_ns = self.core_namespace(&options.core_namespace, options.include_core_library);
        if let Some(ns) = core_ns {
            if options.include_core_library {
                self.synthesize_core_library(ns);
            }
            let find = |name: &str| self.table.namespace_types(ns, name, 0).first().copied();
            let special = SpecialTypes {
                object: find("Object"),
                value_type: find("ValueType"),
                enum_type: find("Enum"),
                delegate: find("Delegate"),
                multicast_delegate: find("MulticastDelegate"),
            };
            self.table.special = special;
        }

        for using in std::mem::take(&mut self.usings) {
            self.resolve_using(using);
        }

        tracing::debug!(
            "[TABLE] {} types, {} namespaces, {} members, {} declaration diagnostics",
            self.table.types.len(),
            self.table.namespaces.len(),
            self.table.members.len(),
            self.table.diagnostics.len()
        );
        self.table
    }

    // ========================================================================
    // INTERNALS (ids known valid)
    // ========================================================================

    fn check_container(&self, container: Container) -> Result<(), SymbolTableError> {
        let known = match container {
            Container::Namespace(ns) => ns.index() < self.table.namespaces.len(),
            Container::Type(ty) => ty.index() < self.table.types.len(),
        };
        if known {
            Ok(())
        } else {
            Err(SymbolTableError::UnknownContainer(container))
        }
    }

    fn namespace_in(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        if let Some(existing) = self.table.child_namespace(parent, name) {
            return existing;
        }
        let id = NamespaceId::from_index(self.table.namespaces.len());
        self.table.namespaces.push(NamespaceSymbol {
            name: Name::new(name),
            parent: Some(parent),
            members: Default::default(),
        });
        self.push_member(Container::Namespace(parent), Name::new(name), SymbolRef::Namespace(id));
        id
    }

    fn scope_in(&mut self, parent: Option<ScopeId>, namespace: NamespaceId) -> ScopeId {
        let id = ScopeId::from_index(self.table.scopes.len());
        self.table.scopes.push(ImportScope {
            parent,
            namespace,
            imports: Vec::new(),
        });
        id
    }

    fn push_member(&mut self, container: Container, name: Name, symbol: SymbolRef) {
        let map = match container {
            Container::Namespace(ns) => &mut self.table.namespaces[ns.index()].members,
            Container::Type(ty) => &mut self.table.types[ty.index()].members,
        };
        match map.entry(name) {
            Entry::Occupied(mut e) => e.get_mut().push(symbol),
            Entry::Vacant(e) => {
                e.insert(vec![symbol]);
            }
        }
    }

    fn type_in(&mut self, container: Container, decl: TypeDeclaration) -> TypeId {
        let arity = decl.type_params.len();
        let existing: Vec<TypeId> = self.table.types_with_arity(
            self.table.own_members(container, &decl.name),
            arity,
        );

        if decl.modifiers.is_partial {
            if let Some(&partial) = existing.iter().find(|t| self.table.type_symbol(**t).is_partial) {
                if self.table.type_symbol(partial).kind == decl.kind {
                    self.merge_piece(partial, decl);
                    return partial;
                }
                let location = decl.location();
                let id = self.push_type(container, decl);
                self.table.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::PartialKindMismatch {
                        ty: id,
                        existing: partial,
                    },
                    location,
                ));
                return id;
            }
        }

        let location = decl.location();
        let id = self.push_type(container, decl);
        if let Some(&first) = existing.first() {
            tracing::debug!(
                "[TABLE] duplicate declaration of {}",
                self.table.qualified_name(id)
            );
            self.table.diagnostics.push(Diagnostic::error(
                DiagnosticKind::DuplicateTypeDeclaration {
                    ty: id,
                    existing: first,
                },
                location,
            ));
        }
        id
    }

    fn push_type(&mut self, container: Container, decl: TypeDeclaration) -> TypeId {
        let default_access = match container {
            Container::Namespace(_) => Accessibility::Internal,
            Container::Type(outer) if self.table.type_symbol(outer).is_interface() => {
                Accessibility::Public
            }
            Container::Type(_) => Accessibility::Private,
        };
        let origin = if decl.modifiers.is_extern {
            Origin::Metadata
        } else {
            Origin::Source
        };
        let id = TypeId::from_index(self.table.types.len());
        self.table.types.push(TypeSymbol {
            name: decl.name.clone(),
            kind: decl.kind,
            accessibility: decl.modifiers.accessibility.unwrap_or(default_access),
            is_static: decl.modifiers.is_static,
            is_sealed: decl.modifiers.is_sealed,
            is_abstract: decl.modifiers.is_abstract,
            is_partial: decl.modifiers.is_partial,
            origin,
            container,
            type_params: decl.type_params,
            declarations: vec![DeclarationPiece {
                file: decl.file,
                scope: decl.scope,
                name_range: decl.name_range,
                bases: decl.bases,
            }],
            members: Default::default(),
        });
        self.push_member(container, decl.name, SymbolRef::Type(id));
        id
    }

    fn merge_piece(&mut self, id: TypeId, decl: TypeDeclaration) {
        let symbol = &mut self.table.types[id.index()];
        if let Some(access) = decl.modifiers.accessibility {
            symbol.accessibility = access;
        }
        symbol.is_static |= decl.modifiers.is_static;
        symbol.is_sealed |= decl.modifiers.is_sealed;
        symbol.is_abstract |= decl.modifiers.is_abstract;
        symbol.declarations.push(DeclarationPiece {
            file: decl.file,
            scope: decl.scope,
            name_range: decl.name_range,
            bases: decl.bases,
        });
    }

    fn member_in(
        &mut self,
        owner: TypeId,
        name: Name,
        kind: MemberKind,
        file: Option<FileId>,
        range: TextRange,
    ) -> MemberId {
        let id = MemberId::from_index(self.table.members.len());
        self.table.members.push(MemberSymbol {
            name: name.clone(),
            kind,
            owner,
            file,
            range,
        });
        self.push_member(Container::Type(owner), name, SymbolRef::Member(id));
        id
    }

    /// The core namespace, created only when the core library will be synthesized into it.
    fn core_namespace(&mut self, dotted: &str, create: bool) -> Option<NamespaceId> {
        let mut ns = self.global_namespace();
        for segment in dotted.split('.').filter(|s| !s.is_empty()) {
            ns = match self.table.child_namespace(ns, segment) {
                Some(child) => child,
                None if create => self.namespace_in(ns, segment),
                None => return None,
            };
        }
        Some(ns)
    }

    fn synthesize_core_library(&mut self, ns: NamespaceId) {
        let scope = self.scope_in(None, ns);
        for (name, base) in CORE_TYPES {
            if !self.table.namespace_types(ns, name, 0).is_empty() {
                continue;
            }
            let modifiers = Modifiers {
                accessibility: Some(Accessibility::Public),
                is_abstract: base.is_some(),
                is_extern: true,
                ..Modifiers::default()
            };
            self.push_type(
                Container::Namespace(ns),
                TypeDeclaration {
                    name: Name::new(name),
                    kind: TypeKind::Class,
                    type_params: Vec::new(),
                    modifiers,
                    bases: base.map(TypeExpr::simple).into_iter().collect(),
                    file: None,
                    scope,
                    name_range: TextRange::default(),
                },
            );
            tracing::trace!("[TABLE] synthesized core type {name}");
        }
    }

    /// Bind `using A.B;` relative to the scope's namespace and then each enclosing namespace.
    fn resolve_using(&mut self, using: PendingUsing) {
        let mut candidate = Some(self.table.scope(using.scope).namespace);
        let mut found = None;
        while let Some(start) = candidate {
            let target = using
                .path
                .iter()
                .try_fold(start, |ns, segment| self.table.child_namespace(ns, segment));
            if target.is_some() {
                found = target;
                break;
            }
            candidate = self.table.namespace(start).parent;
        }

        match found {
            Some(ns) => self.table.scopes[using.scope.index()].imports.push(ns),
            None => {
                let name = Name::new(using.path.join("."));
                tracing::debug!("[TABLE] using '{}' not found", name);
                self.table.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::NamespaceNotFound { name },
                    using.location,
                ));
            }
        }
    }
}
