//! resguard analysis library
//!
//! Static analysis toolkit enforcing exhaustive handling of the two-variant
//! `Result` outcome family in `.res` sources.

pub mod analysis;
pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod exhaust;
pub mod lexer;
pub mod parser;
pub mod sema;

pub use ast::Span;
pub use error::{CompileError, Result};
