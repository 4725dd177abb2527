//! Recursive descent parser for declaration skeletons.
//!
//! Produces a [`SourceUnit`] directly; there is no concrete syntax tree.
//! Parsing is fail-fast: the first error aborts the file.

use text_size::{TextRange, TextSize};

use super::lexer::{Token, TokenKind, tokenize};
use crate::base::Name;
use crate::syntax::{
    Accessibility, MemberDecl, Modifiers, NamedMember, NamespaceDecl, NamespaceItem, SourceUnit,
    SyntaxError, TypeDecl, TypeExpr, TypeKind, TypeSegment, UsingDirective,
};

type PResult<T> = Result<T, SyntaxError>;

/// Parse a whole source file.
pub fn parse(input: &str) -> PResult<SourceUnit> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(&tokens);
    let unit = parser.parse_source_unit()?;
    tracing::trace!(
        "[PARSE] {} tokens, {} top-level items",
        tokens.len(),
        unit.items.len()
    );
    Ok(unit)
}

/// Parse a standalone type expression such as `A.B<C>`.
pub fn parse_type_expr(input: &str) -> PResult<TypeExpr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_type_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// The parser state
struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self { tokens, pos: 0 }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Start offset of the current token, or the end of the last one.
    fn offset(&self) -> TextSize {
        match self.current() {
            Some(t) => t.range.start(),
            None => self.prev_end(),
        }
    }

    fn prev_end(&self) -> TextSize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.range.end())
            .unwrap_or_default()
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.current().copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token<'a>> {
        if self.at(kind) {
            if let Some(token) = self.bump() {
                return Ok(token);
            }
        }
        Err(self.unexpected(kind.describe()))
    }

    fn expect_ident(&mut self) -> PResult<(Name, TextRange)> {
        let token = self.expect(TokenKind::Ident)?;
        Ok((Name::new(token.text), token.range))
    }

    fn expect_eof(&self) -> PResult<()> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        match self.current() {
            Some(token) => SyntaxError::Unexpected {
                expected,
                found: token.text.to_string(),
                range: token.range,
            },
            None => SyntaxError::UnexpectedEof { expected },
        }
    }

    /// Skip a balanced `open ... close` group, starting at `open`.
    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) -> PResult<()> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump() {
                Some(t) if t.kind == open => depth += 1,
                Some(t) if t.kind == close => depth -= 1,
                Some(_) => {}
                None => return Err(SyntaxError::UnexpectedEof { expected: close.describe() }),
            }
        }
        Ok(())
    }

    /// Skip tokens up to (not including) one of `stops` at nesting depth zero.
    fn skip_until(&mut self, stops: &[TokenKind]) -> PResult<()> {
        loop {
            match self.current_kind() {
                None => return Err(SyntaxError::UnexpectedEof { expected: "`;`" }),
                Some(k) if stops.contains(&k) => return Ok(()),
                Some(TokenKind::LParen) => self.skip_balanced(TokenKind::LParen, TokenKind::RParen)?,
                Some(TokenKind::LBrace) => self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace)?,
                Some(TokenKind::LBracket) => {
                    self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket)?
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    // =========================================================================
    // Source units and namespaces
    // =========================================================================

    fn parse_source_unit(&mut self) -> PResult<SourceUnit> {
        let usings = self.parse_usings()?;
        let mut items = Vec::new();
        while !self.at_eof() {
            items.push(self.parse_namespace_item()?);
        }
        Ok(SourceUnit { usings, items })
    }

    fn parse_usings(&mut self) -> PResult<Vec<UsingDirective>> {
        let mut usings = Vec::new();
        while self.at(TokenKind::UsingKw) {
            let start = self.offset();
            self.bump();
            let path = self.parse_dotted_name()?;
            self.expect(TokenKind::Semicolon)?;
            usings.push(UsingDirective {
                path,
                range: TextRange::new(start, self.prev_end()),
            });
        }
        Ok(usings)
    }

    fn parse_dotted_name(&mut self) -> PResult<Vec<Name>> {
        let mut path = vec![self.expect_ident()?.0];
        while self.eat(TokenKind::Dot) {
            path.push(self.expect_ident()?.0);
        }
        Ok(path)
    }

    fn parse_namespace_item(&mut self) -> PResult<NamespaceItem> {
        if self.at(TokenKind::NamespaceKw) {
            return self.parse_namespace().map(NamespaceItem::Namespace);
        }
        let start = self.offset();
        let modifiers = self.parse_modifiers()?;
        match self.parse_type_decl(start, modifiers)? {
            Some(decl) => Ok(NamespaceItem::Type(decl)),
            None => Err(self.unexpected("type declaration")),
        }
    }

    fn parse_namespace(&mut self) -> PResult<NamespaceDecl> {
        let start = self.offset();
        self.expect(TokenKind::NamespaceKw)?;
        let path = self.parse_dotted_name()?;
        self.expect(TokenKind::LBrace)?;
        let usings = self.parse_usings()?;
        let mut items = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            items.push(self.parse_namespace_item()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(TokenKind::Semicolon);
        Ok(NamespaceDecl {
            path,
            range: TextRange::new(start, self.prev_end()),
            usings,
            items,
        })
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    fn parse_modifiers(&mut self) -> PResult<Modifiers> {
        let mut mods = Modifiers::default();
        let mut access_words: Vec<TokenKind> = Vec::new();
        let mut access_start = None;

        loop {
            let Some(token) = self.current().copied() else {
                break;
            };
            let flag = match token.kind {
                TokenKind::PublicKw
                | TokenKind::InternalKw
                | TokenKind::ProtectedKw
                | TokenKind::PrivateKw => {
                    if access_words.contains(&token.kind) {
                        return Err(SyntaxError::DuplicateModifier {
                            modifier: token.kind.describe(),
                            range: token.range,
                        });
                    }
                    if access_start.is_none() {
                        access_start = Some(token.range.start());
                    }
                    access_words.push(token.kind);
                    self.pos += 1;
                    continue;
                }
                TokenKind::MemberModifierKw => {
                    self.pos += 1;
                    continue;
                }
                TokenKind::StaticKw => &mut mods.is_static,
                TokenKind::SealedKw => &mut mods.is_sealed,
                TokenKind::AbstractKw => &mut mods.is_abstract,
                TokenKind::PartialKw => &mut mods.is_partial,
                TokenKind::ExternKw => &mut mods.is_extern,
                TokenKind::NewKw => &mut mods.is_new,
                _ => break,
            };
            if *flag {
                return Err(SyntaxError::DuplicateModifier {
                    modifier: token.kind.describe(),
                    range: token.range,
                });
            }
            *flag = true;
            self.pos += 1;
        }

        if let Some(start) = access_start {
            let range = TextRange::new(start, self.prev_end());
            mods.accessibility = Some(combine_accessibility(&access_words, range)?);
        }
        Ok(mods)
    }

    // =========================================================================
    // Type declarations
    // =========================================================================

    /// Parse the declaration following `modifiers`, or return `None` when the
    /// next token does not start a type declaration.
    fn parse_type_decl(&mut self, start: TextSize, modifiers: Modifiers) -> PResult<Option<TypeDecl>> {
        let kind = match self.current_kind() {
            Some(TokenKind::ClassKw) => TypeKind::Class,
            Some(TokenKind::StructKw) => TypeKind::Struct,
            Some(TokenKind::InterfaceKw) => TypeKind::Interface,
            Some(TokenKind::EnumKw) => TypeKind::Enum,
            Some(TokenKind::DelegateKw) => TypeKind::Delegate,
            _ => return Ok(None),
        };
        self.bump();

        let decl = match kind {
            TypeKind::Delegate => self.parse_delegate_rest(start, modifiers)?,
            TypeKind::Enum => self.parse_enum_rest(start, modifiers)?,
            _ => self.parse_class_like_rest(start, modifiers, kind)?,
        };
        tracing::trace!("[PARSE] {} {}", kind.keyword(), decl.name);
        Ok(Some(decl))
    }

    fn parse_class_like_rest(
        &mut self,
        start: TextSize,
        modifiers: Modifiers,
        kind: TypeKind,
    ) -> PResult<TypeDecl> {
        let (name, name_range) = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        let mut bases = Vec::new();
        if self.eat(TokenKind::Colon) {
            bases.push(self.parse_type_expr()?);
            while self.eat(TokenKind::Comma) {
                bases.push(self.parse_type_expr()?);
            }
        }
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            self.parse_member(&mut members)?;
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(TokenKind::Semicolon);

        Ok(TypeDecl {
            modifiers,
            kind,
            name,
            name_range,
            type_params,
            bases,
            members,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn parse_enum_rest(&mut self, start: TextSize, modifiers: Modifiers) -> PResult<TypeDecl> {
        let (name, name_range) = self.expect_ident()?;
        if let Some(colon) = self.current().filter(|t| t.kind == TokenKind::Colon) {
            return Err(SyntaxError::UnexpectedBaseList {
                kind: "enum",
                range: colon.range,
            });
        }
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            let (member, range) = self.expect_ident()?;
            if self.eat(TokenKind::Eq) {
                self.skip_until(&[TokenKind::Comma, TokenKind::RBrace])?;
            }
            members.push(MemberDecl::EnumMember(NamedMember { name: member, range }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.eat(TokenKind::Semicolon);

        Ok(TypeDecl {
            modifiers,
            kind: TypeKind::Enum,
            name,
            name_range,
            type_params: Vec::new(),
            bases: Vec::new(),
            members,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    /// `delegate R Name<T>(params);`
    fn parse_delegate_rest(&mut self, start: TextSize, modifiers: Modifiers) -> PResult<TypeDecl> {
        self.parse_member_type()?;
        let (name, name_range) = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        if !self.at(TokenKind::LParen) {
            return Err(self.unexpected("`(`"));
        }
        self.skip_balanced(TokenKind::LParen, TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(TypeDecl {
            modifiers,
            kind: TypeKind::Delegate,
            name,
            name_range,
            type_params,
            bases: Vec::new(),
            members: Vec::new(),
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn parse_type_params(&mut self) -> PResult<Vec<Name>> {
        let mut params = Vec::new();
        if self.eat(TokenKind::Lt) {
            params.push(self.expect_ident()?.0);
            while self.eat(TokenKind::Comma) {
                params.push(self.expect_ident()?.0);
            }
            self.expect(TokenKind::Gt)?;
        }
        Ok(params)
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn parse_member(&mut self, members: &mut Vec<MemberDecl>) -> PResult<()> {
        let start = self.offset();
        let modifiers = self.parse_modifiers()?;
        if let Some(nested) = self.parse_type_decl(start, modifiers)? {
            members.push(MemberDecl::Type(nested));
            return Ok(());
        }

        self.parse_member_type()?;

        // Constructor: the "type" we just read was the member name.
        if self.at(TokenKind::LParen) {
            self.skip_balanced(TokenKind::LParen, TokenKind::RParen)?;
            return self.parse_method_body();
        }

        let (name, range) = self.expect_ident()?;
        match self.current_kind() {
            Some(TokenKind::LParen) | Some(TokenKind::Lt) => {
                self.parse_type_params()?;
                self.skip_balanced(TokenKind::LParen, TokenKind::RParen)?;
                self.parse_method_body()?;
                members.push(MemberDecl::Method(NamedMember { name, range }));
            }
            Some(TokenKind::LBrace) => {
                self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace)?;
                members.push(MemberDecl::Property(NamedMember { name, range }));
            }
            _ => {
                members.push(MemberDecl::Field(NamedMember { name, range }));
                loop {
                    if self.eat(TokenKind::Eq) {
                        self.skip_until(&[TokenKind::Comma, TokenKind::Semicolon])?;
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    let (name, range) = self.expect_ident()?;
                    members.push(MemberDecl::Field(NamedMember { name, range }));
                }
                self.expect(TokenKind::Semicolon)?;
            }
        }
        Ok(())
    }

    fn parse_method_body(&mut self) -> PResult<()> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.at(TokenKind::LBrace) {
            return self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace);
        }
        Err(self.unexpected("method body"))
    }

    /// A member's declared type: a type expression with optional `[]` and `?` suffixes.
    fn parse_member_type(&mut self) -> PResult<TypeExpr> {
        let expr = self.parse_type_expr()?;
        loop {
            if self.at(TokenKind::LBracket) {
                self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket)?;
            } else if !self.eat(TokenKind::Question) {
                break;
            }
        }
        Ok(expr)
    }

    // =========================================================================
    // Type expressions
    // =========================================================================

    fn parse_type_expr(&mut self) -> PResult<TypeExpr> {
        let start = self.offset();
        let mut segments = vec![self.parse_type_segment()?];
        while self.at(TokenKind::Dot) && self.nth(1) == Some(TokenKind::Ident) {
            self.bump();
            segments.push(self.parse_type_segment()?);
        }
        Ok(TypeExpr {
            segments,
            range: TextRange::new(start, self.prev_end()),
        })
    }

    fn parse_type_segment(&mut self) -> PResult<TypeSegment> {
        let (name, name_range) = self.expect_ident()?;
        let mut args = Vec::new();
        if self.eat(TokenKind::Lt) {
            args.push(self.parse_type_expr()?);
            while self.eat(TokenKind::Comma) {
                args.push(self.parse_type_expr()?);
            }
            self.expect(TokenKind::Gt)?;
        }
        Ok(TypeSegment {
            name,
            args,
            range: TextRange::new(name_range.start(), self.prev_end()),
        })
    }
}

fn combine_accessibility(words: &[TokenKind], range: TextRange) -> PResult<Accessibility> {
    use TokenKind::{InternalKw, PrivateKw, ProtectedKw, PublicKw};
    let access = match words {
        [PublicKw] => Accessibility::Public,
        [InternalKw] => Accessibility::Internal,
        [ProtectedKw] => Accessibility::Protected,
        [PrivateKw] => Accessibility::Private,
        [ProtectedKw, InternalKw] | [InternalKw, ProtectedKw] => Accessibility::ProtectedInternal,
        [PrivateKw, ProtectedKw] | [ProtectedKw, PrivateKw] => Accessibility::PrivateProtected,
        _ => return Err(SyntaxError::ConflictingAccessibility { range }),
    };
    Ok(access)
}
