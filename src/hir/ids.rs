//! Arena indices for every symbol in a [`SymbolTable`](super::SymbolTable).
//!
//! Identity is by index: two ids are the same symbol iff they are equal.
//! Ids are only meaningful for the table that created them.

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// A type definition (the unconstructed symbol for generic types).
    TypeId
);
arena_id!(NamespaceId);
arena_id!(
    /// A field, method, property or enum member.
    MemberId
);
arena_id!(
    /// One namespace-declaration level with its `using` directives.
    ScopeId
);

/// The `ordinal`-th type parameter declared by `owner`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TypeParamId {
    pub owner: TypeId,
    pub ordinal: u32,
}

/// Any symbol that can be the result of a lookup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum SymbolRef {
    Namespace(NamespaceId),
    Type(TypeId),
    Member(MemberId),
    TypeParameter(TypeParamId),
}

impl SymbolRef {
    pub fn as_type(self) -> Option<TypeId> {
        match self {
            SymbolRef::Type(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_namespace(self) -> Option<NamespaceId> {
        match self {
            SymbolRef::Namespace(id) => Some(id),
            _ => None,
        }
    }
}

/// What a type symbol is declared inside of.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Container {
    Namespace(NamespaceId),
    Type(TypeId),
}

impl From<Container> for SymbolRef {
    fn from(container: Container) -> Self {
        match container {
            Container::Namespace(ns) => SymbolRef::Namespace(ns),
            Container::Type(ty) => SymbolRef::Type(ty),
        }
    }
}
