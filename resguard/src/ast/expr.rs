//! Expression and pattern AST nodes

use super::{Spanned, TypeRef};
use serde::{Deserialize, Serialize};

/// Expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// String literal
    StrLit(String),
    /// Boolean literal
    BoolLit(bool),

    /// Identifier reference
    Var(String),

    /// Free function call: `f(a, b)`
    Call {
        callee: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },

    /// Method call: `recv.m(a, b)`
    MethodCall {
        recv: Box<Spanned<Expr>>,
        method: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },

    /// Member access: `recv.field` (also spells constant paths like `Result.Ok`)
    Field {
        recv: Box<Spanned<Expr>>,
        field: Spanned<String>,
    },

    /// Unary operation
    Unary {
        op: UnOp,
        expr: Box<Spanned<Expr>>,
    },

    /// Binary operation
    Binary {
        left: Box<Spanned<Expr>>,
        op: BinOp,
        right: Box<Spanned<Expr>>,
    },

    /// Type test: `expr is pattern`
    Is {
        expr: Box<Spanned<Expr>>,
        pattern: Spanned<Pattern>,
    },

    /// Match expression
    Match {
        scrutinee: Box<Spanned<Expr>>,
        arms: Vec<MatchArm>,
    },
}

/// A single arm in a match expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Spanned<Pattern>,
    pub body: Spanned<Expr>,
}

/// Pattern forms accepted by `is` tests and match arms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pattern {
    /// Discard pattern: `_`
    Discard,
    /// Type pattern: `Ok`, `Error<string>`
    Type(Spanned<TypeRef>),
    /// Declaration pattern: `Error e` (tests the type and binds the value)
    Declaration {
        ty: Spanned<TypeRef>,
        name: Spanned<String>,
    },
    /// Constant pattern: `Result.Ok`
    Constant(Box<Spanned<Expr>>),
    /// Destructuring pattern: `{ message }` or `Ok { value }`.
    ///
    /// The type is optional; when absent the tested expression's static
    /// type decides what the pattern matches.
    Destructure {
        ty: Option<Spanned<TypeRef>>,
        fields: Vec<Spanned<String>>,
    },
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Eq,
    Ne,
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::And => write!(f, "&&"),
            BinOp::Or => write!(f, "||"),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Logical not
    Not,
}
