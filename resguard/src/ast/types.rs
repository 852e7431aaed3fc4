//! Syntactic type references

use super::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// A type as written in source: a name plus optional type arguments.
///
/// `Result`, `Result<string>`, `Ok<int>`, `Widget` all parse to this.
/// Whether a reference denotes the outcome family is decided later by the
/// sema layer; the AST records only what was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: Spanned<String>,
    pub args: Vec<Spanned<TypeRef>>,
}

impl TypeRef {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn span(&self) -> Span {
        let mut span = self.name.span;
        if let Some(last) = self.args.last() {
            span = span.merge(last.span);
        }
        span
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.node)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg.node)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}
