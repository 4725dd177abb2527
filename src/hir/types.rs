//! Type references produced by binding base-list expressions.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::ids::{TypeId, TypeParamId};
use super::table::SymbolTable;
use crate::base::Name;

/// A bound type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A type definition, possibly constructed with type arguments.
    Named(NamedType),
    TypeParameter(TypeParamId),
    Error(ErrorTypeRef),
}

/// A definition plus the type arguments it is constructed with.
///
/// `containing` is set when the definition is nested inside a generic
/// context (e.g. `Outer<int>.Inner`), so that the outer type's arguments
/// take part in substitution and identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamedType {
    pub def: TypeId,
    pub args: Arc<[TypeRef]>,
    pub containing: Option<Arc<NamedType>>,
}

impl NamedType {
    /// A non-generic type outside any generic context.
    pub fn plain(def: TypeId) -> Self {
        Self {
            def,
            args: Arc::from([]),
            containing: None,
        }
    }

    /// True when this type or an enclosing one carries type arguments.
    pub fn is_generic_context(&self) -> bool {
        !self.args.is_empty() || self.containing.is_some()
    }

    /// Map from every type parameter in scope (own and containing) to its argument.
    pub fn substitution(&self) -> Substitution {
        let mut map = FxHashMap::default();
        let mut current = Some(self);
        while let Some(ty) = current {
            for (ordinal, arg) in ty.args.iter().enumerate() {
                map.insert(
                    TypeParamId {
                        owner: ty.def,
                        ordinal: ordinal as u32,
                    },
                    arg.clone(),
                );
            }
            current = ty.containing.as_deref();
        }
        Substitution { map }
    }
}

/// Why a type reference failed to bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorReason {
    NotFound,
    Ambiguous,
    /// A type parameter was used where a base type is required.
    TypeParameterBase,
    /// Binding depended on the declaring type's own base list; `neighbor` is
    /// the next type on the dependency cycle.
    CircularBase { neighbor: TypeId },
    CycleInInterfaceInheritance { neighbor: TypeId },
    /// The base chain of an imported type loops.
    ImportedCircularBase,
}

/// Sentinel for a reference that could not be bound.
#[derive(Debug)]
pub struct ErrorType {
    /// The name as written (last segment).
    pub name: Name,
    pub arity: usize,
    pub reason: ErrorReason,
}

/// Shared handle to an [`ErrorType`].
///
/// Equality and hashing are by identity: an error type is never equal to
/// anything but itself, not even another error with the same name.
#[derive(Clone, Debug)]
pub struct ErrorTypeRef(Arc<ErrorType>);

impl ErrorTypeRef {
    pub fn new(name: Name, arity: usize, reason: ErrorReason) -> Self {
        Self(Arc::new(ErrorType {
            name,
            arity,
            reason,
        }))
    }
}

impl std::ops::Deref for ErrorTypeRef {
    type Target = ErrorType;

    fn deref(&self) -> &ErrorType {
        &self.0
    }
}

impl PartialEq for ErrorTypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ErrorTypeRef {}

impl Hash for ErrorTypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl TypeRef {
    pub fn named(def: TypeId) -> Self {
        TypeRef::Named(NamedType::plain(def))
    }

    pub fn error(name: impl Into<Name>, arity: usize, reason: ErrorReason) -> Self {
        TypeRef::Error(ErrorTypeRef::new(name.into(), arity, reason))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeRef::Error(_))
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            TypeRef::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorType> {
        match self {
            TypeRef::Error(err) => Some(err),
            _ => None,
        }
    }

    /// The definition this reference names, if it names one.
    pub fn def(&self) -> Option<TypeId> {
        self.as_named().map(|n| n.def)
    }

    pub fn substitute(&self, subst: &Substitution) -> TypeRef {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Named(named) => TypeRef::Named(subst.apply_named(named)),
            TypeRef::TypeParameter(param) => subst
                .map
                .get(param)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Error(_) => self.clone(),
        }
    }
}

/// Type-parameter → argument map of one constructed type.
#[derive(Clone, Debug, Default)]
pub struct Substitution {
    map: FxHashMap<TypeParamId, TypeRef>,
}

impl Substitution {
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, param: TypeParamId) -> Option<&TypeRef> {
        self.map.get(&param)
    }

    pub fn apply_named(&self, named: &NamedType) -> NamedType {
        if self.is_empty() {
            return named.clone();
        }
        NamedType {
            def: named.def,
            args: named.args.iter().map(|a| a.substitute(self)).collect(),
            containing: named
                .containing
                .as_ref()
                .map(|c| Arc::new(self.apply_named(c))),
        }
    }
}

/// `def` as seen from inside its own declaration: every type parameter stands for itself.
pub fn instance_type(table: &SymbolTable, def: TypeId) -> NamedType {
    let symbol = table.type_symbol(def);
    let args: Arc<[TypeRef]> = (0..symbol.arity())
        .map(|ordinal| {
            TypeRef::TypeParameter(TypeParamId {
                owner: def,
                ordinal: ordinal as u32,
            })
        })
        .collect();
    let containing = symbol
        .containing_type()
        .map(|outer| instance_type(table, outer))
        .filter(NamedType::is_generic_context)
        .map(Arc::new);
    NamedType {
        def,
        args,
        containing,
    }
}

/// Render a type for messages and tests: `N.Outer<int>.Inner`, `T`, `?Missing`.
pub fn display(table: &SymbolTable, ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named(named) => display_named(table, named),
        TypeRef::TypeParameter(param) => table.type_param_name(*param).to_string(),
        TypeRef::Error(err) => format!("?{}", err.name),
    }
}

fn display_named(table: &SymbolTable, named: &NamedType) -> String {
    let mut out = match &named.containing {
        Some(outer) => format!(
            "{}.{}",
            display_named(table, outer),
            table.type_symbol(named.def).name
        ),
        None => table.qualified_name(named.def),
    };
    if !named.args.is_empty() {
        let args: Vec<String> = named.args.iter().map(|a| display(table, a)).collect();
        out.push('<');
        out.push_str(&args.join(", "));
        out.push('>');
    }
    out
}
