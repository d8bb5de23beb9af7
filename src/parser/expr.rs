//! Expression precedence tiers, lowest to highest:
//! `or` < `and` < unary `not` < comparison/membership/identity < `+ -` <
//! `* / %` < unary `-` < call/index/attribute postfix < primary.
//!
//! `not in` and `is not` are infix operators recognized only inside the
//! comparison tier, by looking one token past `not`/`is`; a lone `not`
//! that isn't followed by `in` at that position is a syntax error with a
//! hint, since a bare `not` there can only be a typo for one of the two
//! two-word operators.

use super::{PResult, Parser};
use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::diagnostics::VlError;
use crate::lexer::TokenKind;

impl Parser {
    pub(super) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let rhs = self.parse_and()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary { op: BinaryOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_not_unary()?;
        while self.eat(&TokenKind::And) {
            let rhs = self.parse_not_unary()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary { op: BinaryOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    /// Prefix `not` (boolean negation). Recurses so `not not x` parses, and
    /// bottoms out at the comparison tier when no leading `not` is present.
    fn parse_not_unary(&mut self) -> PResult<Expr> {
        if matches!(self.peek(), TokenKind::Not) {
            let span = self.span();
            self.advance();
            let operand = self.parse_not_unary()?;
            let span = span.to(operand.span());
            Ok(Expr::Unary { op: UnaryOp::Not, operand: Box::new(operand), span })
        } else {
            self.parse_comparison()
        }
    }

    /// Non-associative: at most one comparison/membership/identity operator
    /// per expression, matching the grammar's flat `comparison` production.
    fn parse_comparison(&mut self) -> PResult<Expr> {
        let lhs = self.parse_additive()?;

        let op = match self.peek() {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::In => BinaryOp::In,
            TokenKind::Not => {
                if matches!(self.peek_at(1), TokenKind::In) {
                    self.advance();
                    self.advance();
                    let rhs = self.parse_operand_after_two_word_op()?;
                    let span = lhs.span().to(rhs.span());
                    return Ok(Expr::Binary { op: BinaryOp::NotIn, lhs: Box::new(lhs), rhs: Box::new(rhs), span });
                }
                return Err(VlError::syntax("dangling 'not' after expression", self.span())
                    .with_hint("did you mean 'not in' or 'is not'?"));
            }
            TokenKind::Is => {
                if matches!(self.peek_at(1), TokenKind::Not) {
                    self.advance();
                    self.advance();
                    let rhs = self.parse_operand_after_two_word_op()?;
                    let span = lhs.span().to(rhs.span());
                    return Ok(Expr::Binary { op: BinaryOp::IsNot, lhs: Box::new(lhs), rhs: Box::new(rhs), span });
                }
                self.advance();
                let rhs = self.parse_additive()?;
                let span = lhs.span().to(rhs.span());
                return Ok(Expr::Binary { op: BinaryOp::Is, lhs: Box::new(lhs), rhs: Box::new(rhs), span });
            }
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_additive()?;
        let span = lhs.span().to(rhs.span());
        Ok(Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span })
    }

    /// The right-hand operand of `not in`/`is not`. A missing operand here
    /// (e.g. `5 is not)`) is the same typo as a dangling `not`, so it gets
    /// the same hint rather than the generic "expected an expression".
    fn parse_operand_after_two_word_op(&mut self) -> PResult<Expr> {
        self.parse_additive().map_err(|e| match e.hint {
            Some(_) => e,
            None => e.with_hint("did you mean 'not in' or 'is not'?"),
        })
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary_minus()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary_minus()?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn parse_unary_minus(&mut self) -> PResult<Expr> {
        if matches!(self.peek(), TokenKind::Minus) {
            let span = self.span();
            self.advance();
            let operand = self.parse_unary_minus()?;
            let span = span.to(operand.span());
            Ok(Expr::Unary { op: UnaryOp::Neg, operand: Box::new(operand), span })
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    let end = self.expect(TokenKind::RParen, "')'")?;
                    let span = expr.span().to(end.span);
                    expr = Expr::Call { callee: Box::new(expr), args, span };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let end = self.expect(TokenKind::RBracket, "']'")?;
                    let span = expr.span().to(end.span);
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index), span };
                }
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_ident("attribute name")?;
                    let span = expr.span().to(name_span);
                    expr = Expr::Attribute { target: Box::new(expr), name, span };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let span = self.span();
        match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Int(n, span))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Float(f, span))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Str(s.into(), span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true, span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false, span))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null(span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if matches!(self.peek(), TokenKind::Eq) {
                    self.advance();
                    let value = self.parse_expr()?;
                    let full = span.to(value.span());
                    Ok(Expr::Assign { name, value: Box::new(value), span: full })
                } else {
                    Ok(Expr::Ident(name, span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !matches!(self.peek(), TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expr::List(items, span.to(end.span)))
            }
            TokenKind::Await => {
                self.advance();
                let value = self.parse_unary_minus()?;
                let full = span.to(value.span());
                Ok(Expr::Await { value: Box::new(value), span: full })
            }
            TokenKind::Run => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let path = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Run { path: Box::new(path), span: span.to(end.span) })
            }
            TokenKind::RunAsync => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let path = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::RunAsync { path: Box::new(path), span: span.to(end.span) })
            }
            // `lambda (params) { body }` — the optional lambda form (spec
            // §3.2): an anonymous function literal, parsed the same way a
            // `def` body is, minus the name.
            TokenKind::Lambda => {
                self.advance();
                self.expect(TokenKind::LParen, "'('")?;
                let mut params = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        params.push(self.expect_ident("parameter name")?.0);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                let body = self.parse_block()?;
                let end_span = body.last().map(|s| s.span()).unwrap_or(span);
                Ok(Expr::Lambda { params, body: std::rc::Rc::new(body), span: span.to(end_span) })
            }
            other => Err(VlError::syntax(format!("expected an expression, found {other:?}"), span)),
        }
    }
}
