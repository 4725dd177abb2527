//! The compilation: an immutable symbol table plus the lazily filled resolution slots.
//!
//! Queries on a [`Compilation`] look read-only but may compute and cache
//! slots on first use. Caching is per symbol, not per query, and published
//! values never change, so repeated queries return the same allocation.

use std::sync::Arc;

use rayon::prelude::*;

use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::ids::{SymbolRef, TypeId};
use super::slot::{ClaimOutcome, Claims, Evaluated, ResolutionChain, SlotKey, SlotKind, SlotValue, TypeSlots};
use super::table::SymbolTable;
use super::types::TypeRef;
use crate::syntax::{DeclarationTable, TypeExpr};

// ============================================================================
// OPTIONS
// ============================================================================

/// Settings that change what a compilation reports or synthesizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Synthesize `Object`, `ValueType`, `Enum`, `Delegate` and `MulticastDelegate`
    /// when the sources do not declare them.
    pub include_core_library: bool,
    /// Report bases that are less accessible than the deriving type.
    pub check_accessibility: bool,
    /// Namespace holding the core library types.
    pub core_namespace: String,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            include_core_library: true,
            check_accessibility: true,
            core_namespace: "System".to_string(),
        }
    }
}

impl CompilationOptions {
    pub fn with_core_library(mut self, include: bool) -> Self {
        self.include_core_library = include;
        self
    }

    pub fn with_accessibility_checks(mut self, check: bool) -> Self {
        self.check_accessibility = check;
        self
    }

    pub fn with_core_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.core_namespace = namespace.into();
        self
    }
}

// ============================================================================
// COMPILATION
// ============================================================================

pub struct Compilation {
    pub(crate) table: Arc<SymbolTable>,
    pub(crate) options: CompilationOptions,
    slots: Vec<TypeSlots>,
    claims: Claims,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("types", &self.table.type_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Compilation {
    /// Build a compilation over every unit of `decls`.
    pub fn new(decls: &DeclarationTable, options: CompilationOptions) -> Self {
        let table = SymbolTable::build(decls, &options);
        Self::from_table(Arc::new(table), options)
    }

    /// Build a compilation over an existing table.
    pub fn from_table(table: Arc<SymbolTable>, options: CompilationOptions) -> Self {
        let slots = (0..table.type_count()).map(|_| TypeSlots::default()).collect();
        Self {
            table,
            options,
            slots,
            claims: Claims::new(),
            sink: None,
        }
    }

    /// Attach a sink. Declaration diagnostics are reported to it immediately;
    /// resolution diagnostics as their slots are published.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        for diagnostic in self.table.declaration_diagnostics() {
            sink.report(diagnostic.clone());
        }
        self.sink = Some(sink);
        self
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn find_type(&self, dotted: &str, arity: usize) -> Option<TypeId> {
        self.table.find_type(dotted, arity)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// The cycle-checked base type. `None` for interfaces and the root object type.
    pub fn base_type(&self, ty: TypeId) -> Option<&TypeRef> {
        self.base_slot(ty, &mut ResolutionChain::new())
            .and_then(|e| e.value.as_ref())
    }

    /// The cycle-checked, de-duplicated interfaces listed on `ty`.
    pub fn interfaces(&self, ty: TypeId) -> &[TypeRef] {
        self.interfaces_slot(ty, &mut ResolutionChain::new())
            .map_or(&[], |e| e.value.as_slice())
    }

    /// Every interface `ty` implements, directly, through other interfaces or through its base.
    pub fn all_interfaces(&self, ty: TypeId) -> &[TypeRef] {
        self.all_interfaces_slot(ty, &mut ResolutionChain::new())
            .map_or(&[], |e| e.value.as_slice())
    }

    /// The bound base class before cycle checks.
    pub fn declared_base_type(&self, ty: TypeId) -> Option<&TypeRef> {
        self.declared_slot(ty, &mut ResolutionChain::new())
            .and_then(|e| e.value.base.as_ref())
    }

    /// The bound interface list before cycle checks.
    pub fn declared_interfaces(&self, ty: TypeId) -> &[TypeRef] {
        self.declared_slot(ty, &mut ResolutionChain::new())
            .map_or(&[], |e| e.value.interfaces.as_slice())
    }

    /// True when `ty` names no real type.
    pub fn is_error_type(&self, ty: &TypeRef) -> bool {
        ty.is_error()
    }

    /// Bind a type expression as if it were written in the base list of `context`.
    ///
    /// Unlike a base clause, the members of `context` itself are in scope.
    /// Binding failures surface only as error types; use
    /// [`resolve_type_expression_with_diagnostics`](Self::resolve_type_expression_with_diagnostics)
    /// to see why.
    pub fn resolve_type_expression(&self, expr: &TypeExpr, context: TypeId) -> TypeRef {
        self.resolve_type_expression_with_diagnostics(expr, context).0
    }

    /// Like [`resolve_type_expression`](Self::resolve_type_expression), also returning
    /// the binding diagnostics. They are not reported to the sink.
    pub fn resolve_type_expression_with_diagnostics(
        &self,
        expr: &TypeExpr,
        context: TypeId,
    ) -> (TypeRef, Vec<Diagnostic>) {
        let mut chain = ResolutionChain::new();
        let mut diagnostics = Vec::new();
        let ty = self.bind_in_type(expr, context, &mut chain, &mut diagnostics);
        (ty, diagnostics)
    }

    /// Human-readable rendering, e.g. `N.List<N.C>` or `?Missing`.
    pub fn display(&self, ty: &TypeRef) -> String {
        super::types::display(&self.table, ty)
    }

    /// Qualified name of a type definition.
    pub fn type_name(&self, ty: TypeId) -> String {
        self.table.qualified_name(ty)
    }

    pub fn display_symbol(&self, symbol: SymbolRef) -> String {
        self.table.display_symbol(symbol)
    }

    // ========================================================================
    // FORCING
    // ========================================================================

    /// Evaluate every slot of every type, one type at a time.
    pub fn resolve_all(&self) {
        for ty in self.table.type_ids() {
            self.resolve_type(ty);
        }
    }

    /// Evaluate every slot of every type on the rayon pool.
    pub fn resolve_all_parallel(&self) {
        let ids: Vec<TypeId> = self.table.type_ids().collect();
        ids.par_iter().for_each(|ty| self.resolve_type(*ty));
    }

    fn resolve_type(&self, ty: TypeId) {
        let mut chain = ResolutionChain::new();
        self.declared_slot(ty, &mut chain);
        self.base_slot(ty, &mut chain);
        self.interfaces_slot(ty, &mut chain);
        self.all_interfaces_slot(ty, &mut chain);
    }

    /// Every diagnostic of the compilation, forcing resolution of all types.
    ///
    /// Declaration diagnostics come first, then per type in declaration order:
    /// binding and base-list checks, base cycle, interface cycle.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.resolve_all();
        let mut out: Vec<Diagnostic> = self.table.declaration_diagnostics().to_vec();
        for slots in &self.slots {
            if let Some(e) = slots.declared.get() {
                out.extend(e.diagnostics.iter().cloned());
            }
            if let Some(e) = slots.base.get() {
                out.extend(e.diagnostics.iter().cloned());
            }
            if let Some(e) = slots.interfaces.get() {
                out.extend(e.diagnostics.iter().cloned());
            }
        }
        out
    }

    // ========================================================================
    // SLOT DRIVER
    // ========================================================================

    pub(crate) fn declared_slot(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Option<&Evaluated<super::bases::DeclaredBases>> {
        self.force(SlotKey::new(ty, SlotKind::Declared), chain)
            .then(|| self.slots[ty.index()].declared.get())
            .flatten()
    }

    pub(crate) fn base_slot(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Option<&Evaluated<Option<TypeRef>>> {
        self.force(SlotKey::new(ty, SlotKind::Base), chain)
            .then(|| self.slots[ty.index()].base.get())
            .flatten()
    }

    pub(crate) fn interfaces_slot(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Option<&Evaluated<Vec<TypeRef>>> {
        self.force(SlotKey::new(ty, SlotKind::Interfaces), chain)
            .then(|| self.slots[ty.index()].interfaces.get())
            .flatten()
    }

    pub(crate) fn all_interfaces_slot(
        &self,
        ty: TypeId,
        chain: &mut ResolutionChain,
    ) -> Option<&Evaluated<Vec<TypeRef>>> {
        self.force(SlotKey::new(ty, SlotKind::AllInterfaces), chain)
            .then(|| self.slots[ty.index()].all_interfaces.get())
            .flatten()
    }

    /// Make sure `key` is published. Returns false when the request closes a
    /// cycle on `chain`; the slot is then left to its owner.
    fn force(&self, key: SlotKey, chain: &mut ResolutionChain) -> bool {
        let slots = &self.slots[key.ty.index()];
        match self
            .claims
            .claim(key, chain.id(), || slots.is_ready(key.kind))
        {
            ClaimOutcome::Ready => true,
            ClaimOutcome::Reentrant => {
                chain.mark_cycle(key, key.ty);
                false
            }
            ClaimOutcome::Deadlock { own_entry } => {
                chain.mark_cycle(own_entry, key.ty);
                false
            }
            ClaimOutcome::Acquired => {
                tracing::trace!("[CLAIM] computing {:?} at depth {}", key, chain.depth());
                chain.push(key);
                let value = match key.kind {
                    SlotKind::Declared => SlotValue::Declared(self.compute_declared(key.ty, chain)),
                    SlotKind::Base => SlotValue::Base(self.compute_base(key.ty, chain)),
                    SlotKind::Interfaces => {
                        SlotValue::Interfaces(self.compute_interfaces(key.ty, chain))
                    }
                    SlotKind::AllInterfaces => {
                        SlotValue::AllInterfaces(self.compute_all_interfaces(key.ty, chain))
                    }
                };
                let complete = chain.pop(value);
                if complete.is_empty() {
                    // part of a cycle that publishes from a lower frame
                    return false;
                }
                let mut keys = Vec::with_capacity(complete.len());
                for (done, value) in complete {
                    let diagnostics = self.slots[done.ty.index()].publish(value);
                    if let Some(sink) = &self.sink {
                        for diagnostic in diagnostics {
                            sink.report(diagnostic);
                        }
                    }
                    keys.push(done);
                }
                self.claims.release(keys);
                true
            }
        }
    }
}
