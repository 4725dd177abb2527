//! Declaration parser.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind (trivia dropped)
//!     ↓
//! Parser → SourceUnit (declaration skeleton AST)
//!     ↓
//! DeclarationTable → Symbol table → base resolution
//! ```

#[allow(clippy::module_inception)]
mod parser;

mod lexer;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{parse, parse_type_expr};
