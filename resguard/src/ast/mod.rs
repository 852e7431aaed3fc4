//! Abstract Syntax Tree definitions

mod expr;
mod span;
mod stmt;
mod types;

pub use expr::*;
pub use span::*;
pub use stmt::*;
pub use types::*;

use serde::{Deserialize, Serialize};

/// A source file is a sequence of top-level items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    Use(UseDecl),
    StructDef(StructDef),
    FnDef(FnDef),
}

/// Module import: `use results;`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseDecl {
    pub module: Spanned<String>,
    pub span: Span,
}

/// Opaque local type declaration: `struct Widget;`
///
/// Carries no fields; it exists so files can declare types whose names
/// collide with imported ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructDef {
    pub name: Spanned<String>,
    pub span: Span,
}

/// Function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnDef {
    pub name: Spanned<String>,
    pub params: Vec<Param>,
    pub ret_ty: Option<Spanned<TypeRef>>,
    pub body: Block,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeRef>,
}
