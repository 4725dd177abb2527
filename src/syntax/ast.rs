//! Declaration skeleton AST.
//!
//! Only what matters to the symbol graph is kept: namespaces, `using`
//! directives, type declarations with their modifiers, type parameters and
//! base lists, and the names of ordinary members. Method bodies, parameter
//! lists and initializers are skipped by the parser.

use std::fmt;

use crate::base::{Name, TextRange};

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceUnit {
    pub usings: Vec<UsingDirective>,
    pub items: Vec<NamespaceItem>,
}

/// Something that can appear directly inside a namespace body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceItem {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
}

/// `namespace A.B { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Dotted name segments, outermost first.
    pub path: Vec<Name>,
    pub range: TextRange,
    pub usings: Vec<UsingDirective>,
    pub items: Vec<NamespaceItem>,
}

/// `using A.B;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub path: Vec<Name>,
    pub range: TextRange,
}

impl UsingDirective {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        }
    }
}

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Public,
    ProtectedInternal,
    Internal,
    Protected,
    PrivateProtected,
    Private,
}

impl Accessibility {
    /// Coarse ordering used for consistency checks: larger is more visible.
    ///
    /// `Protected` and `Internal` are incomparable domains and share a rank.
    pub fn rank(self) -> u8 {
        match self {
            Accessibility::Private => 0,
            Accessibility::PrivateProtected => 1,
            Accessibility::Protected | Accessibility::Internal => 2,
            Accessibility::ProtectedInternal => 3,
            Accessibility::Public => 4,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }
}

/// Modifier keywords in front of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub accessibility: Option<Accessibility>,
    pub is_static: bool,
    pub is_sealed: bool,
    pub is_abstract: bool,
    pub is_partial: bool,
    /// The type is imported from compiled metadata rather than declared in source.
    pub is_extern: bool,
    pub is_new: bool,
}

/// A class, struct, interface, enum or delegate declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub modifiers: Modifiers,
    pub kind: TypeKind,
    pub name: Name,
    pub name_range: TextRange,
    pub type_params: Vec<Name>,
    /// Base list entries in source order.
    pub bases: Vec<TypeExpr>,
    pub members: Vec<MemberDecl>,
    pub range: TextRange,
}

impl TypeDecl {
    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    /// Nested type declarations, in source order.
    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Type(t) => Some(t),
            _ => None,
        })
    }
}

/// A declaration inside a type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDecl {
    Type(TypeDecl),
    Field(NamedMember),
    Method(NamedMember),
    Property(NamedMember),
    EnumMember(NamedMember),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedMember {
    pub name: Name,
    pub range: TextRange,
}

/// A possibly dotted, possibly generic type name: `A.B<C, D.E>.F`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    pub segments: Vec<TypeSegment>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSegment {
    pub name: Name,
    pub args: Vec<TypeExpr>,
    pub range: TextRange,
}

impl TypeSegment {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

impl TypeExpr {
    /// A single unqualified, non-generic name with an empty range.
    pub fn simple(name: impl Into<Name>) -> Self {
        let range = TextRange::default();
        Self {
            segments: vec![TypeSegment {
                name: name.into(),
                args: Vec::new(),
                range,
            }],
            range,
        }
    }

    /// The last segment: the name the expression finally refers to.
    pub fn last(&self) -> Option<&TypeSegment> {
        self.segments.last()
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}
