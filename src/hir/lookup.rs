//! Member lookup through the declared base hierarchy.
//!
//! Lookup walks *declared* bases (bound, not cycle-checked) level by level:
//! the base class for classes and structs, base interfaces breadth-first for
//! interfaces. A visited set of definitions bounds the walk, so lookup
//! terminates on cyclic and half-resolved hierarchies and finds members
//! inherited from the other types of a cycle.

use rustc_hash::FxHashSet;

use super::compilation::Compilation;
use super::ids::{Container, SymbolRef, TypeId};
use super::slot::ResolutionChain;
use super::types::{NamedType, instance_type};

/// How far lookup goes once a level declares the name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupOptions {
    /// Keep walking past the first level that declares the name, collecting hidden members too.
    pub all_levels: bool,
}

impl LookupOptions {
    pub fn all_levels() -> Self {
        Self { all_levels: true }
    }
}

/// A member found by lookup and the (constructed) type that declares it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupHit {
    pub symbol: SymbolRef,
    pub owner: NamedType,
}

impl Compilation {
    /// Members named `name` declared on `ty` or inherited through its declared bases.
    ///
    /// Stops at the first level of the hierarchy that declares the name.
    pub fn lookup_member(&self, ty: TypeId, name: &str) -> Vec<SymbolRef> {
        self.lookup_member_with(ty, name, LookupOptions::default())
    }

    pub fn lookup_member_with(&self, ty: TypeId, name: &str, options: LookupOptions) -> Vec<SymbolRef> {
        let start = instance_type(&self.table, ty);
        self.lookup_member_in(&start, name, options)
            .into_iter()
            .map(|hit| hit.symbol)
            .collect()
    }

    /// Lookup on a constructed type; inherited owners carry the substituted type arguments.
    pub fn lookup_member_in(&self, ty: &NamedType, name: &str, options: LookupOptions) -> Vec<LookupHit> {
        let mut chain = ResolutionChain::new();
        self.walk_hierarchy(ty, name, options, &mut chain, |_| true)
    }

    /// Level-by-level walk from `start`, keeping members `accept` admits.
    pub(crate) fn walk_hierarchy(
        &self,
        start: &NamedType,
        name: &str,
        options: LookupOptions,
        chain: &mut ResolutionChain,
        accept: impl Fn(SymbolRef) -> bool,
    ) -> Vec<LookupHit> {
        let mut visited = FxHashSet::default();
        visited.insert(start.def);
        let mut level = vec![start.clone()];
        let mut hits = Vec::new();

        while !level.is_empty() {
            for owner in &level {
                for symbol in self.table.own_members(Container::Type(owner.def), name) {
                    if accept(*symbol) {
                        hits.push(LookupHit {
                            symbol: *symbol,
                            owner: owner.clone(),
                        });
                    }
                }
            }
            if !hits.is_empty() && !options.all_levels {
                break;
            }

            let mut next = Vec::new();
            for owner in &level {
                let hits_before = chain.top_hits();
                let supertypes = self.declared_supertypes(owner, chain);
                if chain.top_hits() != hits_before && owner.def != start.def {
                    // the cycle runs through the type this walk started from
                    chain.set_top_neighbor(start.def);
                }
                for supertype in supertypes {
                    if visited.insert(supertype.def) {
                        next.push(supertype);
                    }
                }
            }
            tracing::trace!(
                "[LOOKUP] '{}': {} hits, {} types on next level",
                name,
                hits.len(),
                next.len()
            );
            level = next;
        }
        hits
    }

    /// The declared base class (or, for interfaces, base interfaces) of `ty`, substituted.
    ///
    /// Empty while `ty`'s declared bases are being computed on `chain`.
    pub(crate) fn declared_supertypes(
        &self,
        ty: &NamedType,
        chain: &mut ResolutionChain,
    ) -> Vec<NamedType> {
        let Some(declared) = self.declared_slot(ty.def, chain) else {
            return Vec::new();
        };
        let subst = ty.substitution();
        let supers = if self.table.type_symbol(ty.def).is_interface() {
            declared.value.interfaces.as_slice()
        } else {
            declared.value.base.as_slice()
        };
        supers
            .iter()
            .filter_map(|t| t.as_named())
            .map(|named| subst.apply_named(named))
            .collect()
    }
}
