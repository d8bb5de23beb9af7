//! Recursive-descent parser with a precedence-climbing expression core
//! (spec §4.2). Supersedes the source project's `pest` grammar: the
//! lookahead-driven `not in` / `is not` disambiguation and the parser's
//! hint diagnostics are easiest to express by hand over the token stream.

mod expr;

use crate::ast::{Block, ExceptClause, Param, Program, Stmt};
use crate::diagnostics::VlError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::{FileId, Span};
use std::rc::Rc;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = Result<T, VlError>;

/// Lex and parse a complete source file in one step, the entry point the
/// loader uses for the top-level script, `import`, `run`, and `run_async`
/// alike.
pub fn parse_source(source: &str, file: FileId) -> PResult<Vec<Stmt>> {
    let tokens = Lexer::new(file, source).lex()?;
    Parser::new(tokens).parse_program().map(|program| program.stmts)
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_program(mut self) -> PResult<Program> {
        let mut stmts = Vec::new();
        self.skip_separators();
        while !self.at_eof() {
            stmts.push(self.parse_stmt()?);
            self.skip_separators();
        }
        Ok(Program { stmts })
    }

    // --- token stream helpers -------------------------------------------------

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(VlError::syntax(
                format!("expected {what}, found {:?}", self.peek()),
                self.span(),
            ))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<(String, Span)> {
        let span = self.span();
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name, span))
            }
            other => Err(VlError::syntax(format!("expected {what}, found {other:?}"), span)),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    // --- statements ------------------------------------------------------------

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek().clone() {
            TokenKind::Var => {
                let span = self.span();
                self.advance();
                self.parse_assign(span)
            }
            TokenKind::Ident(_) if matches!(self.peek_at(1), TokenKind::Eq) => {
                let span = self.span();
                self.parse_assign(span)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Async | TokenKind::Def => self.parse_func_def(),
            TokenKind::Return => {
                let span = self.span();
                self.advance();
                let value = if self.at_stmt_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Ok(Stmt::Return { value, span })
            }
            TokenKind::Raise => {
                let span = self.span();
                self.advance();
                let value = self.parse_expr()?;
                Ok(Stmt::Raise { value, span })
            }
            TokenKind::Try => self.parse_try(),
            TokenKind::Import => {
                let span = self.span();
                self.advance();
                let path = match self.peek().clone() {
                    TokenKind::Ident(name) => {
                        self.advance();
                        name
                    }
                    TokenKind::Str(s) => {
                        self.advance();
                        s
                    }
                    other => {
                        return Err(VlError::syntax(
                            format!("expected module name, found {other:?}"),
                            span,
                        ))
                    }
                };
                Ok(Stmt::Import { path, span })
            }
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            // Historic statement form: `run "path.vlang"` (spec §4.2).
            TokenKind::Run if matches!(self.peek_at(1), TokenKind::Str(_)) => {
                let span = self.span();
                self.advance();
                let TokenKind::Str(path) = self.advance().kind else {
                    unreachable!()
                };
                Ok(Stmt::Expr(crate::ast::Expr::Run {
                    path: Box::new(crate::ast::Expr::Str(path.into(), span)),
                    span,
                }))
            }
            _ => {
                let expr = self.parse_expr()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn at_stmt_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    fn parse_assign(&mut self, span: Span) -> PResult<Stmt> {
        let (name, _) = self.expect_ident("assignment target")?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign { name, value, span })
    }

    fn parse_parenthesized_expr(&mut self) -> PResult<crate::ast::Expr> {
        self.expect(TokenKind::LParen, "'('")?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(expr)
    }

    fn parse_block(&mut self) -> PResult<Block> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_separators();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_eof() {
                return Err(VlError::syntax("unexpected end of file inside block", self.span()));
            }
            stmts.push(self.parse_stmt()?);
            self.skip_separators();
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let span = self.span();
        self.expect(TokenKind::If, "'if'")?;
        let cond = self.parse_parenthesized_expr()?;
        let body = self.parse_block()?;
        let mut branches = vec![(cond, body)];

        let mut else_branch = None;
        loop {
            self.skip_newlines_if_followed_by_elif_or_else();
            if self.eat(&TokenKind::Elif) {
                let cond = self.parse_parenthesized_expr()?;
                let body = self.parse_block()?;
                branches.push((cond, body));
            } else if self.eat(&TokenKind::Else) {
                else_branch = Some(self.parse_block()?);
                break;
            } else {
                break;
            }
        }

        Ok(Stmt::If { branches, else_branch, span })
    }

    /// `elif`/`else` may appear on the following line; peek past newlines
    /// without consuming them if neither keyword follows.
    fn skip_newlines_if_followed_by_elif_or_else(&mut self) {
        let start = self.pos;
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
        if !matches!(self.peek(), TokenKind::Elif | TokenKind::Else) {
            self.pos = start;
        }
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let span = self.span();
        self.expect(TokenKind::While, "'while'")?;
        let cond = self.parse_parenthesized_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, span })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let span = self.span();
        self.expect(TokenKind::For, "'for'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let (var, _) = self.expect_ident("loop variable")?;
        self.expect(TokenKind::In, "'in'")?;
        let iter = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block()?;
        Ok(Stmt::For { var, iter, body, span })
    }

    fn parse_func_def(&mut self) -> PResult<Stmt> {
        let span = self.span();
        let is_async = self.eat(&TokenKind::Async);
        self.expect(TokenKind::Def, "'def'")?;
        let (name, _) = self.expect_ident("function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (pname, _) = self.expect_ident("parameter name")?;
                params.push(Param { name: pname });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        let body = Rc::new(self.parse_block()?);
        Ok(Stmt::FuncDef { name, params, body, is_async, span })
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let span = self.span();
        self.expect(TokenKind::Try, "'try'")?;
        let body = self.parse_block()?;

        let mut handlers = Vec::new();
        self.skip_newlines_if_followed_by(&TokenKind::Except);
        while self.check(&TokenKind::Except) {
            let clause_span = self.span();
            self.advance();
            let (name, _) = self.expect_ident("exception name")?;
            let binding = if self.eat(&TokenKind::As) {
                Some(self.expect_ident("binding name")?.0)
            } else {
                None
            };
            let handler_body = self.parse_block()?;
            handlers.push(ExceptClause {
                name,
                binding,
                body: handler_body,
                span: clause_span,
            });
            self.skip_newlines_if_followed_by(&TokenKind::Except);
        }

        if handlers.is_empty() {
            return Err(VlError::syntax("'try' requires at least one 'except' clause", span));
        }

        self.skip_newlines_if_followed_by(&TokenKind::Finally);
        let finally = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::Try { body, handlers, finally, span })
    }

    fn skip_newlines_if_followed_by(&mut self, kind: &TokenKind) {
        let start = self.pos;
        while matches!(self.peek(), TokenKind::Newline) {
            self.advance();
        }
        if !self.check(kind) {
            self.pos = start;
        }
    }
}
