//! Syntax: declaration AST, the declaration table and syntax errors.

pub mod ast;
mod declarations;
mod error;

pub use ast::{
    Accessibility, MemberDecl, Modifiers, NamedMember, NamespaceDecl, NamespaceItem, SourceUnit,
    TypeDecl, TypeExpr, TypeKind, TypeSegment, UsingDirective,
};
pub use declarations::{DeclarationTable, DeclaredType};
pub use error::SyntaxError;
