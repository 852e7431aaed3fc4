//! Statement AST nodes

use super::{Expr, Span, Spanned, TypeRef};
use serde::{Deserialize, Serialize};

/// A braced sequence of statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
    pub span: Span,
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// Local declaration: `let name[: Type] = value;`
    Let {
        name: Spanned<String>,
        ty: Option<Spanned<TypeRef>>,
        value: Spanned<Expr>,
    },

    /// Conditional: `if cond { .. } [else ..]`
    ///
    /// The else branch is either a nested `If` or a `Block` statement.
    If {
        cond: Spanned<Expr>,
        then_block: Block,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },

    /// `return [expr];`
    Return(Option<Spanned<Expr>>),

    /// Bare nested block
    Block(Block),

    /// Expression statement: `expr;`
    Expr(Spanned<Expr>),
}
