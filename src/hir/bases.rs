//! Base resolution: declared bases, cycle-checked bases and interface closures.
//!
//! ## Phases
//!
//! ```text
//! declared(T)        bind every base-list entry of every piece, classify,
//!     │              validate; may need declared(S) of other types
//!     ▼
//! base(T)            follow declared base definitions; reaching T is a cycle
//! interfaces(T)      follow declared interface closures; reaching T is a cycle
//!     │
//!     ▼
//! all_interfaces(T)  interfaces, their closures, then the base's closure
//! ```
//!
//! Binding cycles (a base clause whose binding needs T's own declared bases)
//! surface in the first phase through the resolution chain; inheritance
//! cycles surface in the second. A type reports at most one cycle
//! diagnostic for its base list in either phase.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;

use super::compilation::Compilation;
use super::diagnostics::{Diagnostic, DiagnosticKind, Location};
use super::ids::TypeId;
use super::resolve::BindContext;
use super::slot::{Evaluated, ResolutionChain};
use super::symbols::{Origin, TypeSymbol};
use super::table::SymbolTable;
use super::types::{ErrorReason, NamedType, TypeRef};
use crate::syntax::TypeKind;

/// The bound base list of a type, classified but not cycle-checked.
#[derive(Clone, Debug, Default)]
pub(crate) struct DeclaredBases {
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Where the base class was written; `None` for implicit bases.
    pub base_location: Option<Location>,
    /// Parallel to `interfaces`.
    pub interface_locations: Vec<Option<Location>>,
    /// A cycle was already reported while binding.
    pub cycle_reported: bool,
}

/// Accumulates one type's declared bases across its pieces.
struct DeclaredBuilder<'a> {
    table: &'a SymbolTable,
    ty: TypeId,
    symbol: &'a TypeSymbol,
    base: Option<(TypeRef, Option<Location>)>,
    interfaces: IndexSet<TypeRef>,
    interface_locations: Vec<Option<Location>>,
    diagnostics: Vec<Diagnostic>,
    cycle_reported: bool,
}

impl<'a> DeclaredBuilder<'a> {
    fn new(table: &'a SymbolTable, ty: TypeId) -> Self {
        Self {
            table,
            ty,
            symbol: table.type_symbol(ty),
            base: None,
            interfaces: IndexSet::new(),
            interface_locations: Vec::new(),
            diagnostics: Vec::new(),
            cycle_reported: false,
        }
    }

    fn error(&mut self, kind: DiagnosticKind, location: Option<Location>) {
        self.diagnostics.push(Diagnostic::error(kind, location));
    }

    fn add_interface(&mut self, entry: TypeRef, location: Option<Location>) {
        let def = entry.def();
        if self.interfaces.insert(entry) {
            self.interface_locations.push(location);
        } else if let Some(interface) = def {
            self.error(
                DiagnosticKind::DuplicateInterface {
                    ty: self.ty,
                    interface,
                },
                location,
            );
        }
    }

    /// The base-class candidate of one piece. Later pieces must agree with the first.
    fn set_piece_base(&mut self, entry: TypeRef, location: Option<Location>) {
        let differs = match &self.base {
            None => {
                self.base = Some((entry, location));
                return;
            }
            Some((first, _)) => first.def().is_some() && entry.def().is_some() && *first != entry,
        };
        if differs {
            self.error(DiagnosticKind::PartialBaseClassMismatch { ty: self.ty }, location);
        }
    }

    /// Sort the `index`-th entry of a piece into base class or interface position.
    fn classify(&mut self, entry: TypeRef, index: usize, location: Option<Location>) {
        let entry = match entry {
            TypeRef::TypeParameter(param) => {
                self.error(
                    DiagnosticKind::TypeParameterBase { ty: self.ty, param },
                    location,
                );
                TypeRef::error(
                    self.table.type_param_name(param).clone(),
                    0,
                    ErrorReason::TypeParameterBase,
                )
            }
            other => other,
        };

        let is_class = self.symbol.kind == TypeKind::Class;
        let Some(def) = entry.def() else {
            if is_class && index == 0 {
                self.set_piece_base(entry, location);
            } else {
                self.add_interface(entry, location);
            }
            return;
        };

        if self.table.type_symbol(def).is_interface() {
            self.add_interface(entry, location);
        } else if !is_class {
            self.error(
                DiagnosticKind::NotAnInterface {
                    ty: self.ty,
                    found: def,
                },
                location,
            );
        } else if index == 0 {
            self.set_piece_base(entry, location);
        } else {
            self.error(
                DiagnosticKind::BaseClassMustBeFirst {
                    ty: self.ty,
                    base: def,
                },
                location,
            );
        }
    }
}

impl Compilation {
    // ========================================================================
    // PHASE 1: DECLARED BASES
    // ========================================================================

    pub(crate) fn compute_declared(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Evaluated<DeclaredBases> {
        let symbol = self.table.type_symbol(ty);
        let mut builder = DeclaredBuilder::new(&self.table, ty);

        for piece in &symbol.declarations {
            let ctx = BindContext {
                ty,
                scope: piece.scope,
                file: piece.file,
                include_self: false,
            };
            for (index, expr) in piece.bases.iter().enumerate() {
                let location = ctx.location(expr.range);
                let hits_before = chain.top_hits();
                let mut expr_diagnostics = Vec::new();
                let mut bound = self.bind_type_expr(expr, &ctx, chain, &mut expr_diagnostics);

                if chain.top_hits() != hits_before {
                    let neighbor = chain.top_neighbor().unwrap_or(ty);
                    let (reason, kind) = if symbol.is_interface() {
                        (
                            ErrorReason::CycleInInterfaceInheritance { neighbor },
                            DiagnosticKind::CycleInInterfaceInheritance { ty, neighbor },
                        )
                    } else {
                        (
                            ErrorReason::CircularBase { neighbor },
                            DiagnosticKind::CircularBase { ty, neighbor },
                        )
                    };
                    tracing::debug!(
                        "[BASES] base clause '{}' of {} depends on itself through {}",
                        expr,
                        self.table.qualified_name(ty),
                        self.table.qualified_name(neighbor)
                    );
                    let (name, arity) = expr
                        .last()
                        .map(|s| (s.name.clone(), s.arity()))
                        .unwrap_or_default();
                    bound = TypeRef::error(name, arity, reason);
                    if !builder.cycle_reported {
                        builder.cycle_reported = true;
                        builder.error(kind, location);
                    }
                } else {
                    builder.diagnostics.extend(expr_diagnostics);
                }

                builder.classify(bound, index, location);
            }
        }

        let explicit_base = builder.base.is_some();
        if !explicit_base {
            if let Some(implicit) = self.implicit_base(ty, symbol) {
                builder.base = Some((TypeRef::named(implicit), None));
            }
        }

        self.validate_declared(&mut builder, explicit_base);

        let (base, base_location) = match builder.base {
            Some((base, location)) => (Some(base), location),
            None => (None, None),
        };
        tracing::trace!(
            "[BASES] declared {}: base {:?}, {} interfaces",
            self.table.qualified_name(ty),
            base.as_ref().map(|b| self.display(b)),
            builder.interfaces.len()
        );
        Evaluated::new(
            DeclaredBases {
                base,
                interfaces: builder.interfaces.into_iter().collect(),
                base_location,
                interface_locations: builder.interface_locations,
                cycle_reported: builder.cycle_reported,
            },
            builder.diagnostics,
        )
    }

    fn implicit_base(&self, ty: TypeId, symbol: &TypeSymbol) -> Option<TypeId> {
        let special = self.table.special_types();
        let implicit = match symbol.kind {
            TypeKind::Class => special.object,
            TypeKind::Struct => special.value_type,
            TypeKind::Enum => special.enum_type,
            TypeKind::Delegate => special.multicast_delegate,
            TypeKind::Interface => None,
        };
        implicit.filter(|base| *base != ty)
    }

    /// Soft checks: the offending entry stays in place.
    fn validate_declared(&self, builder: &mut DeclaredBuilder<'_>, explicit_base: bool) {
        let ty = builder.ty;
        let symbol = builder.symbol;
        let object = self.table.special_types().object;

        let explicit = if explicit_base {
            builder
                .base
                .as_ref()
                .and_then(|(base, location)| base.def().map(|def| (def, *location)))
        } else {
            None
        };

        if let Some((base, location)) = explicit {
            let base_symbol = self.table.type_symbol(base);
            if base_symbol.is_static {
                builder.error(DiagnosticKind::StaticBaseClass { ty, base }, location);
            }
            if base_symbol.is_effectively_sealed() {
                builder.error(DiagnosticKind::SealedBaseClass { ty, base }, location);
            }
            if symbol.is_static && Some(base) != object {
                builder.error(DiagnosticKind::StaticClassBase { ty, base }, location);
            }
        }
        if symbol.is_static {
            let listed: Vec<(TypeId, Option<Location>)> = builder
                .interfaces
                .iter()
                .zip(&builder.interface_locations)
                .filter_map(|(entry, location)| entry.def().map(|def| (def, *location)))
                .collect();
            for (interface, location) in listed {
                builder.error(DiagnosticKind::StaticClassInterface { ty, interface }, location);
            }
        }

        if !self.options.check_accessibility {
            return;
        }
        let own_rank = self.effective_rank(&TypeRef::named(ty));
        let checked_base = builder.base.clone().filter(|_| explicit_base);
        if let Some((base, location)) = checked_base {
            if let Some(def) = base.def() {
                if self.effective_rank(&base) < own_rank {
                    builder.error(
                        DiagnosticKind::InconsistentBaseAccessibility { ty, base: def },
                        location,
                    );
                }
            }
        }
        if symbol.is_interface() {
            let weaker: Vec<(TypeId, Option<Location>)> = builder
                .interfaces
                .iter()
                .zip(&builder.interface_locations)
                .filter(|(entry, _)| self.effective_rank(entry) < own_rank)
                .filter_map(|(entry, location)| entry.def().map(|def| (def, *location)))
                .collect();
            for (interface, location) in weaker {
                builder.error(
                    DiagnosticKind::InconsistentInterfaceAccessibility { ty, interface },
                    location,
                );
            }
        }
    }

    /// Accessibility rank of a type as seen from outside: the least visible of
    /// the definition, its containers and its type arguments.
    fn effective_rank(&self, ty: &TypeRef) -> u8 {
        match ty {
            TypeRef::Named(named) => self.effective_rank_named(named),
            TypeRef::TypeParameter(_) | TypeRef::Error(_) => u8::MAX,
        }
    }

    fn effective_rank_named(&self, named: &NamedType) -> u8 {
        let mut rank = self.table.type_symbol(named.def).accessibility.rank();
        for outer in self.table.enclosing_types(named.def) {
            rank = rank.min(self.table.type_symbol(outer).accessibility.rank());
        }
        for arg in named.args.iter() {
            rank = rank.min(self.effective_rank(arg));
        }
        if let Some(containing) = &named.containing {
            rank = rank.min(self.effective_rank_named(containing));
        }
        rank
    }

    // ========================================================================
    // PHASE 2: CYCLE CHECKS
    // ========================================================================

    pub(crate) fn compute_base(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Evaluated<Option<TypeRef>> {
        let Some(declared) = self.declared_slot(ty, chain) else {
            return Evaluated::new(None, Vec::new());
        };
        let declared = &declared.value;
        let Some(base) = declared.base.clone() else {
            return Evaluated::new(None, Vec::new());
        };
        let Some(first) = base.def() else {
            return Evaluated::new(Some(base), Vec::new());
        };

        let symbol = self.table.type_symbol(ty);
        let mut diagnostics = Vec::new();
        let mut visited = FxHashSet::default();
        visited.insert(ty);
        let mut current = first;
        loop {
            if current == ty {
                let name = self.table.type_symbol(first).name.clone();
                let arity = self.table.type_symbol(first).arity();
                if symbol.origin == Origin::Metadata {
                    tracing::debug!(
                        "[BASES] imported {} has a circular base chain",
                        self.table.qualified_name(ty)
                    );
                    let err = TypeRef::error(name, arity, ErrorReason::ImportedCircularBase);
                    return Evaluated::new(Some(err), diagnostics);
                }
                tracing::debug!(
                    "[BASES] circular base: {} -> {}",
                    self.table.qualified_name(ty),
                    self.table.qualified_name(first)
                );
                if !declared.cycle_reported {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::CircularBase {
                            ty,
                            neighbor: first,
                        },
                        declared.base_location,
                    ));
                }
                let err = TypeRef::error(name, arity, ErrorReason::CircularBase { neighbor: first });
                return Evaluated::new(Some(err), diagnostics);
            }
            if !visited.insert(current) {
                // the chain loops without coming back to `ty`
                let looping = self.table.type_symbol(current);
                if looping.origin == Origin::Metadata && symbol.origin == Origin::Source {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::ImportedCircularBase {
                            ty,
                            imported: current,
                        },
                        declared.base_location,
                    ));
                }
                break;
            }
            let next = self
                .declared_slot(current, chain)
                .and_then(|d| d.value.base.as_ref())
                .and_then(TypeRef::def);
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        Evaluated::new(Some(base), diagnostics)
    }

    pub(crate) fn compute_interfaces(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Evaluated<Vec<TypeRef>> {
        let Some(declared) = self.declared_slot(ty, chain) else {
            return Evaluated::new(Vec::new(), Vec::new());
        };
        let declared = &declared.value;
        if !self.table.type_symbol(ty).is_interface() {
            return Evaluated::new(declared.interfaces.clone(), Vec::new());
        }

        let mut diagnostics = Vec::new();
        let mut reported = declared.cycle_reported;
        let mut checked = Vec::with_capacity(declared.interfaces.len());
        for (entry, location) in declared.interfaces.iter().zip(&declared.interface_locations) {
            let Some(def) = entry.def() else {
                checked.push(entry.clone());
                continue;
            };
            if !self.interface_reaches(def, ty, chain) {
                checked.push(entry.clone());
                continue;
            }
            tracing::debug!(
                "[BASES] interface cycle: {} -> {}",
                self.table.qualified_name(ty),
                self.table.qualified_name(def)
            );
            if !reported {
                reported = true;
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::CycleInInterfaceInheritance { ty, neighbor: def },
                    *location,
                ));
            }
            let target = self.table.type_symbol(def);
            checked.push(TypeRef::error(
                target.name.clone(),
                target.arity(),
                ErrorReason::CycleInInterfaceInheritance { neighbor: def },
            ));
        }
        Evaluated::new(checked, diagnostics)
    }

    /// Whether the declared interface closure of `from` contains `target`.
    fn interface_reaches(&self, from: TypeId, target: TypeId, chain: &mut ResolutionChain) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(declared) = self.declared_slot(current, chain) {
                stack.extend(declared.value.interfaces.iter().filter_map(TypeRef::def));
            }
        }
        false
    }

    pub(crate) fn compute_all_interfaces(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Evaluated<Vec<TypeRef>> {
        let interfaces: Vec<TypeRef> = self
            .interfaces_slot(ty, chain)
            .map(|e| e.value.clone())
            .unwrap_or_default();
        let base = self
            .base_slot(ty, chain)
            .and_then(|e| e.value.as_ref())
            .and_then(TypeRef::as_named)
            .cloned();

        let mut all = IndexSet::new();
        for interface in interfaces {
            let TypeRef::Named(named) = &interface else {
                continue;
            };
            let inherited = self.all_interfaces_in(named, chain);
            all.insert(interface);
            all.extend(inherited);
        }
        if let Some(base) = base {
            all.extend(self.all_interfaces_in(&base, chain));
        }
        Evaluated::new(all.into_iter().collect(), Vec::new())
    }

    fn all_interfaces_in(&self, ty: &NamedType, chain: &mut ResolutionChain) -> Vec<TypeRef> {
        let subst = ty.substitution();
        self.all_interfaces_slot(ty.def, chain)
            .map(|e| e.value.iter().map(|i| i.substitute(&subst)).collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // CONSTRUCTED TYPES
    // ========================================================================

    /// Base type of a constructed type, with its type arguments substituted.
    pub fn base_type_of(&self, ty: &NamedType) -> Option<TypeRef> {
        let subst = ty.substitution();
        self.base_type(ty.def).map(|b| b.substitute(&subst))
    }

    pub fn interfaces_of(&self, ty: &NamedType) -> Vec<TypeRef> {
        let subst = ty.substitution();
        self.interfaces(ty.def)
            .iter()
            .map(|i| i.substitute(&subst))
            .collect()
    }

    pub fn all_interfaces_of(&self, ty: &NamedType) -> Vec<TypeRef> {
        self.all_interfaces_in(ty, &mut ResolutionChain::new())
    }
}
