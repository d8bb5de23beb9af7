use std::rc::Rc;

use crate::ast::Expr;
use crate::span::Span;

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone)]
pub struct ExceptClause {
    pub name: String,
    pub binding: Option<String>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
}

/// A statement node (spec §3.2). `var` is parsed but carries no semantic
/// difference from a bare assignment (spec §9 open question, resolved:
/// accept both).
#[derive(Debug, Clone)]
pub enum Stmt {
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    Expr(Expr),
    If {
        branches: Vec<(Expr, Block)>,
        else_branch: Option<Block>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Block,
        span: Span,
    },
    For {
        var: String,
        iter: Expr,
        body: Block,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    Raise {
        value: Expr,
        span: Span,
    },
    Try {
        body: Block,
        handlers: Vec<ExceptClause>,
        finally: Option<Block>,
        span: Span,
    },
    Import {
        path: String,
        span: Span,
    },
    FuncDef {
        name: String,
        params: Vec<Param>,
        body: Rc<Block>,
        is_async: bool,
        span: Span,
    },
    Block(Block),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Raise { span, .. }
            | Stmt::Try { span, .. }
            | Stmt::Import { span, .. }
            | Stmt::FuncDef { span, .. } => *span,
            Stmt::Expr(e) => e.span(),
            Stmt::Block(stmts) => stmts.first().map(Stmt::span).unwrap_or_else(Span::synthetic),
        }
    }
}
