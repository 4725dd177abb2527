//! Name binding for base-list type expressions.
//!
//! A simple name is looked up from the inside out:
//!
//! ```text
//! type parameters of the declaring type
//!     │
//!     ▼
//! each enclosing type: its type parameters, then its nested types
//! (own first, then inherited through declared bases)
//!     │
//!     ▼
//! each namespace declaration level: namespace members, then `using` imports
//! ```
//!
//! Dotted names continue from the previous segment: namespaces expose child
//! namespaces and types, types expose nested types including inherited ones.
//! Several distinct candidates at one level make the reference ambiguous.
//!
//! Inherited lookups need other types' declared bases and run on the
//! caller's [`ResolutionChain`]; that is where binding re-enters the base
//! resolution engine and where cycles are detected.

use std::sync::Arc;

use super::compilation::Compilation;
use super::diagnostics::{Diagnostic, DiagnosticKind, Location};
use super::ids::{NamespaceId, ScopeId, SymbolRef, TypeId, TypeParamId};
use super::lookup::{LookupHit, LookupOptions};
use super::slot::ResolutionChain;
use super::types::{ErrorReason, NamedType, TypeRef, instance_type};
use crate::base::{FileId, Name, TextRange};
use crate::syntax::{TypeExpr, TypeSegment};

/// Where a type expression is bound.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BindContext {
    /// The type whose declaration contains the expression.
    pub ty: TypeId,
    /// Namespace-declaration level of the declaration piece.
    pub scope: ScopeId,
    pub file: Option<FileId>,
    /// Whether the members of `ty` itself are in scope. Base clauses see only
    /// its type parameters.
    pub include_self: bool,
}

impl BindContext {
    pub fn location(&self, range: TextRange) -> Option<Location> {
        self.file.map(|file| Location { file, range })
    }
}

/// Outcome of looking a name up at one scope level.
#[derive(Debug)]
enum ResolveResult {
    Found(Binding),
    Ambiguous(Vec<SymbolRef>),
    NotFound,
}

/// What a (partial) dotted name denotes.
#[derive(Debug)]
enum Binding {
    Namespace(NamespaceId),
    Type(TypeRef),
}

/// A type found by lookup, before its type arguments are bound.
#[derive(Debug)]
struct TypeCandidate {
    def: TypeId,
    containing: Option<Arc<NamedType>>,
}

impl TypeCandidate {
    fn top_level(def: TypeId) -> Self {
        Self {
            def,
            containing: None,
        }
    }

    fn from_hit(hit: LookupHit) -> Option<Self> {
        let def = hit.symbol.as_type()?;
        let containing = hit
            .owner
            .is_generic_context()
            .then(|| Arc::new(hit.owner));
        Some(Self { def, containing })
    }
}

impl Compilation {
    /// Bind `expr` in the scope of `context`'s first declaration, with `context`'s members visible.
    pub(crate) fn bind_in_type(
        &self,
        expr: &TypeExpr,
        context: TypeId,
        chain: &mut ResolutionChain,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> TypeRef {
        let symbol = self.table.type_symbol(context);
        let Some(piece) = symbol.declarations.first() else {
            return error_for(expr, ErrorReason::NotFound);
        };
        let ctx = BindContext {
            ty: context,
            scope: piece.scope,
            file: piece.file,
            include_self: true,
        };
        self.bind_type_expr(expr, &ctx, chain, diagnostics)
    }

    /// Bind a possibly dotted, possibly generic type expression.
    pub(crate) fn bind_type_expr(
        &self,
        expr: &TypeExpr,
        ctx: &BindContext,
        chain: &mut ResolutionChain,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> TypeRef {
        let Some((first, rest)) = expr.segments.split_first() else {
            return error_for(expr, ErrorReason::NotFound);
        };
        let mut binding = self.bind_simple_name(first, ctx, chain, diagnostics);
        for segment in rest {
            binding = self.bind_qualified(binding, segment, ctx, chain, diagnostics);
        }

        match binding {
            Binding::Type(ty) => ty,
            Binding::Namespace(_) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::NotAType {
                        name: Name::new(expr.to_string()),
                    },
                    ctx.location(expr.range),
                ));
                error_for(expr, ErrorReason::NotFound)
            }
        }
    }

    fn bind_simple_name(
        &self,
        segment: &TypeSegment,
        ctx: &BindContext,
        chain: &mut ResolutionChain,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Binding {
        let binding = match self.lookup_simple_name(segment, ctx, chain) {
            ResolveResult::Found(binding) => binding,
            ResolveResult::Ambiguous(candidates) => {
                self.ambiguous(segment, candidates, ctx, diagnostics)
            }
            ResolveResult::NotFound => {
                tracing::debug!("[RESOLVE] '{}' not found", segment);
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::TypeNotFound {
                        name: segment.name.clone(),
                        arity: segment.arity(),
                    },
                    ctx.location(segment.range),
                ));
                Binding::Type(TypeRef::error(
                    segment.name.clone(),
                    segment.arity(),
                    ErrorReason::NotFound,
                ))
            }
        };
        binding.with_args(self, segment, ctx, chain, diagnostics)
    }

    fn lookup_simple_name(
        &self,
        segment: &TypeSegment,
        ctx: &BindContext,
        chain: &mut ResolutionChain,
    ) -> ResolveResult {
        let name = segment.name.as_str();
        let arity = segment.arity();

        if let Some(param) = self.own_type_parameter(ctx.ty, name, arity) {
            return ResolveResult::Found(Binding::Type(TypeRef::TypeParameter(param)));
        }
        if ctx.include_self {
            let found = self.nested_types(&instance_type(&self.table, ctx.ty), name, arity, chain);
            if let Some(result) = self.pick(found) {
                return result;
            }
        }
        for outer in self.table.enclosing_types(ctx.ty) {
            if let Some(param) = self.own_type_parameter(outer, name, arity) {
                return ResolveResult::Found(Binding::Type(TypeRef::TypeParameter(param)));
            }
            let found = self.nested_types(&instance_type(&self.table, outer), name, arity, chain);
            if let Some(result) = self.pick(found) {
                return result;
            }
        }

        let mut scope = Some(ctx.scope);
        while let Some(id) = scope {
            let level = self.table.scope(id);
            let found: Vec<TypeCandidate> = self
                .table
                .namespace_types(level.namespace, name, arity)
                .into_iter()
                .map(TypeCandidate::top_level)
                .collect();
            let namespace = (arity == 0)
                .then(|| self.table.child_namespace(level.namespace, name))
                .flatten();
            match (found.len(), namespace) {
                (0, Some(ns)) => return ResolveResult::Found(Binding::Namespace(ns)),
                (0, None) => {}
                (_, Some(ns)) => {
                    let mut candidates: Vec<SymbolRef> =
                        found.iter().map(|c| SymbolRef::Type(c.def)).collect();
                    candidates.push(SymbolRef::Namespace(ns));
                    return ResolveResult::Ambiguous(candidates);
                }
                (_, None) => {
                    if let Some(result) = self.pick(found) {
                        return result;
                    }
                }
            }

            let mut imported: Vec<TypeId> = Vec::new();
            for ns in &level.imports {
                for ty in self.table.namespace_types(*ns, name, arity) {
                    if !imported.contains(&ty) {
                        imported.push(ty);
                    }
                }
            }
            let imported = imported.into_iter().map(TypeCandidate::top_level).collect();
            if let Some(result) = self.pick(imported) {
                return result;
            }
            scope = level.parent;
        }
        ResolveResult::NotFound
    }

    /// Continue a dotted name from `binding` with `segment`.
    fn bind_qualified(
        &self,
        binding: Binding,
        segment: &TypeSegment,
        ctx: &BindContext,
        chain: &mut ResolutionChain,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Binding {
        let name = segment.name.as_str();
        let arity = segment.arity();
        let (container, result) = match binding {
            Binding::Namespace(ns) => {
                let found: Vec<TypeCandidate> = self
                    .table
                    .namespace_types(ns, name, arity)
                    .into_iter()
                    .map(TypeCandidate::top_level)
                    .collect();
                let result = match self.pick(found) {
                    Some(result) => result,
                    None => match (arity == 0)
                        .then(|| self.table.child_namespace(ns, name))
                        .flatten()
                    {
                        Some(child) => ResolveResult::Found(Binding::Namespace(child)),
                        None => ResolveResult::NotFound,
                    },
                };
                (SymbolRef::Namespace(ns), result)
            }
            Binding::Type(TypeRef::Named(named)) => {
                let found = self.nested_types(&named, name, arity, chain);
                let result = self.pick(found).unwrap_or(ResolveResult::NotFound);
                (SymbolRef::Type(named.def), result)
            }
            Binding::Type(TypeRef::TypeParameter(param)) => {
                (SymbolRef::TypeParameter(param), ResolveResult::NotFound)
            }
            Binding::Type(TypeRef::Error(err)) => {
                return Binding::Type(TypeRef::error(
                    segment.name.clone(),
                    arity,
                    err.reason.clone(),
                ));
            }
        };

        let binding = match result {
            ResolveResult::Found(found) => found,
            ResolveResult::Ambiguous(candidates) => {
                self.ambiguous(segment, candidates, ctx, diagnostics)
            }
            ResolveResult::NotFound => {
                tracing::debug!(
                    "[RESOLVE] '{}' not found in {}",
                    segment,
                    self.table.display_symbol(container)
                );
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::DottedNameNotFound {
                        container,
                        name: segment.name.clone(),
                        arity,
                    },
                    ctx.location(segment.range),
                ));
                Binding::Type(TypeRef::error(
                    segment.name.clone(),
                    arity,
                    ErrorReason::NotFound,
                ))
            }
        };
        binding.with_args(self, segment, ctx, chain, diagnostics)
    }

    /// Nested types of `owner` named `name`, including inherited ones, at the nearest level.
    fn nested_types(
        &self,
        owner: &NamedType,
        name: &str,
        arity: usize,
        chain: &mut ResolutionChain,
    ) -> Vec<TypeCandidate> {
        self.walk_hierarchy(owner, name, LookupOptions::default(), chain, |symbol| {
            symbol
                .as_type()
                .is_some_and(|ty| self.table.type_symbol(ty).arity() == arity)
        })
        .into_iter()
        .filter_map(TypeCandidate::from_hit)
        .collect()
    }

    fn own_type_parameter(&self, ty: TypeId, name: &str, arity: usize) -> Option<TypeParamId> {
        if arity != 0 {
            return None;
        }
        let ordinal = self
            .table
            .type_symbol(ty)
            .type_params
            .iter()
            .position(|p| p == name)?;
        Some(TypeParamId {
            owner: ty,
            ordinal: ordinal as u32,
        })
    }

    /// One candidate binds; several distinct ones are ambiguous; none keeps looking.
    fn pick(&self, mut found: Vec<TypeCandidate>) -> Option<ResolveResult> {
        found.dedup_by(|a, b| a.def == b.def && a.containing == b.containing);
        match found.len() {
            0 => None,
            1 => {
                let candidate = found.pop()?;
                Some(ResolveResult::Found(Binding::Type(TypeRef::Named(
                    NamedType {
                        def: candidate.def,
                        args: Arc::from([]),
                        containing: candidate.containing,
                    },
                ))))
            }
            _ => Some(ResolveResult::Ambiguous(
                found.iter().map(|c| SymbolRef::Type(c.def)).collect(),
            )),
        }
    }

    fn ambiguous(
        &self,
        segment: &TypeSegment,
        candidates: Vec<SymbolRef>,
        ctx: &BindContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Binding {
        tracing::debug!("[RESOLVE] '{}' is ambiguous ({} candidates)", segment, candidates.len());
        diagnostics.push(Diagnostic::error(
            DiagnosticKind::AmbiguousReference {
                name: segment.name.clone(),
                candidates,
            },
            ctx.location(segment.range),
        ));
        Binding::Type(TypeRef::error(
            segment.name.clone(),
            segment.arity(),
            ErrorReason::Ambiguous,
        ))
    }
}

impl Binding {
    /// Bind `segment`'s type arguments onto a found type definition.
    fn with_args(
        self,
        compilation: &Compilation,
        segment: &TypeSegment,
        ctx: &BindContext,
        chain: &mut ResolutionChain,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Binding {
        let named = match self {
            Binding::Type(TypeRef::Named(named)) => named,
            other => return other,
        };
        if segment.args.is_empty() {
            return Binding::Type(TypeRef::Named(named));
        }
        let args: Arc<[TypeRef]> = segment
            .args
            .iter()
            .map(|arg| compilation.bind_type_expr(arg, ctx, chain, diagnostics))
            .collect();
        Binding::Type(TypeRef::Named(NamedType { args, ..named }))
    }
}

fn error_for(expr: &TypeExpr, reason: ErrorReason) -> TypeRef {
    match expr.last() {
        Some(last) => TypeRef::error(last.name.clone(), last.arity(), reason),
        None => TypeRef::error(Name::default(), 0, reason),
    }
}
