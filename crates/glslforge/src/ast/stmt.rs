//! Statement nodes.

use crate::ast::decl::Declaration;
use crate::ast::expr::Expr;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A lone `;`.
    Empty,
    Compound(Vec<Stmt>),
    Expr(Expr),
    Declaration(Declaration),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// Case labels appear inline in the body list, like in the source.
    Switch {
        condition: Expr,
        body: Vec<Stmt>,
    },
    /// `case expr:` or, with `None`, `default:`.
    CaseLabel(Option<Expr>),
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        /// Declaration, expression, or empty statement.
        init: Box<Stmt>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Discard,
    Return(Option<Expr>),
}
