//! Logos-based lexer for declaration sources.

use logos::Logos;
use text_size::{TextRange, TextSize};

use crate::syntax::SyntaxError;

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );

        Some(match result {
            Ok(kind) => Ok(Token { kind, text, range }),
            Err(()) => Err(SyntaxError::InvalidToken {
                text: text.to_string(),
                range,
            }),
        })
    }
}

/// Tokenize an entire string, dropping whitespace and comments.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, SyntaxError> {
    let mut tokens = Vec::new();
    for token in Lexer::new(input) {
        let token = token?;
        if !token.kind.is_trivia() {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

/// Consume a block comment up to and including its `*/`. Unterminated comments are errors.
fn block_comment(lex: &mut logos::Lexer<'_, TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // =========================================================================
    // DECLARATION KEYWORDS
    // =========================================================================
    #[token("using")]
    UsingKw,

    #[token("namespace")]
    NamespaceKw,

    #[token("class")]
    ClassKw,

    #[token("struct")]
    StructKw,

    #[token("interface")]
    InterfaceKw,

    #[token("enum")]
    EnumKw,

    #[token("delegate")]
    DelegateKw,

    // =========================================================================
    // MODIFIERS
    // =========================================================================
    #[token("public")]
    PublicKw,

    #[token("internal")]
    InternalKw,

    #[token("protected")]
    ProtectedKw,

    #[token("private")]
    PrivateKw,

    #[token("static")]
    StaticKw,

    #[token("sealed")]
    SealedKw,

    #[token("abstract")]
    AbstractKw,

    #[token("partial")]
    PartialKw,

    #[token("extern")]
    ExternKw,

    #[token("new")]
    NewKw,

    /// Modifiers that only matter to member bodies and are otherwise ignored.
    #[token("virtual")]
    #[token("override")]
    #[token("readonly")]
    #[token("const")]
    #[token("async")]
    #[token("volatile")]
    #[token("unsafe")]
    MemberModifierKw,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(".")]
    Dot,

    #[token("=")]
    Eq,

    #[token("?")]
    Question,

    #[regex(r"[+\-*/%&|^!~]")]
    Operator,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::UsingKw => "`using`",
            TokenKind::NamespaceKw => "`namespace`",
            TokenKind::ClassKw => "`class`",
            TokenKind::StructKw => "`struct`",
            TokenKind::InterfaceKw => "`interface`",
            TokenKind::EnumKw => "`enum`",
            TokenKind::DelegateKw => "`delegate`",
            TokenKind::PublicKw => "`public`",
            TokenKind::InternalKw => "`internal`",
            TokenKind::ProtectedKw => "`protected`",
            TokenKind::PrivateKw => "`private`",
            TokenKind::StaticKw => "`static`",
            TokenKind::SealedKw => "`sealed`",
            TokenKind::AbstractKw => "`abstract`",
            TokenKind::PartialKw => "`partial`",
            TokenKind::ExternKw => "`extern`",
            TokenKind::NewKw => "`new`",
            TokenKind::MemberModifierKw => "modifier",
            TokenKind::Ident => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::String => "string",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::Eq => "`=`",
            TokenKind::Question => "`?`",
            TokenKind::Operator => "operator",
        }
    }
}
