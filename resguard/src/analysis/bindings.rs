//! Binding locator
//!
//! Finds every local declaration whose resolved type is one of the outcome
//! forms. Each declaration site is one `Binding`, analyzed in isolation;
//! declarations whose type cannot be resolved are skipped.

use super::outcome::{outcome_kind, OutcomeKind};
use crate::ast::{Block, FnDef, Span, Stmt};
use crate::sema::{SemanticModel, SymbolId};

/// One outcome-typed local declaration.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub name: &'a str,
    /// Span of the declared identifier; this is the diagnostic location.
    pub name_span: Span,
    pub symbol: SymbolId,
    pub kind: OutcomeKind,
    /// The nearest block containing the declaration; analysis never looks
    /// outside it.
    pub block: &'a Block,
}

/// Locate all outcome bindings in one function body.
pub fn locate<'a>(def: &'a FnDef, model: &SemanticModel) -> Vec<Binding<'a>> {
    let mut bindings = Vec::new();
    visit_block(&def.body, model, &mut bindings);
    bindings
}

fn visit_block<'a>(block: &'a Block, model: &SemanticModel, out: &mut Vec<Binding<'a>>) {
    for stmt in &block.stmts {
        visit_stmt(stmt, block, model, out);
    }
}

fn visit_stmt<'a>(
    stmt: &'a crate::ast::Spanned<Stmt>,
    enclosing: &'a Block,
    model: &SemanticModel,
    out: &mut Vec<Binding<'a>>,
) {
    match &stmt.node {
        Stmt::Let { name, .. } => {
            let Some(symbol) = model.symbol_at_decl(name.span) else {
                return;
            };
            let Some(ty) = model.type_of_symbol(symbol) else {
                return;
            };
            if let Some(kind) = outcome_kind(ty) {
                out.push(Binding {
                    name: &name.node,
                    name_span: name.span,
                    symbol,
                    kind,
                    block: enclosing,
                });
            }
        }
        Stmt::If {
            then_block,
            else_branch,
            ..
        } => {
            visit_block(then_block, model, out);
            if let Some(branch) = else_branch {
                visit_stmt(branch, enclosing, model, out);
            }
        }
        Stmt::Block(inner) => visit_block(inner, model, out),
        Stmt::Return(_) | Stmt::Expr(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Item, Program};
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn bindings_of(source: &str) -> usize {
        let tokens = tokenize(source).unwrap();
        let program: Program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        program
            .items
            .iter()
            .filter_map(|item| match item {
                Item::FnDef(def) => Some(locate(def, &model).len()),
                _ => None,
            })
            .sum()
    }

    #[test]
    fn test_locates_annotated_outcome_binding() {
        let n = bindings_of(
            "use results;\n\
             fn main() { let r: Result = f(); }",
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn test_locates_binding_in_nested_block() {
        let n = bindings_of(
            "use results;\n\
             fn main() { if x { let r: Result<string> = f(); } }",
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn test_skips_unresolved_and_foreign_types() {
        let n = bindings_of(
            "use results;\n\
             struct Widget;\n\
             fn main() { let w: Widget = f(); let u: Mystery = g(); }",
        );
        assert_eq!(n, 0);
    }

    #[test]
    fn test_local_result_struct_is_not_an_outcome() {
        let n = bindings_of(
            "use results;\n\
             struct Result;\n\
             fn main() { let r: Result = f(); }",
        );
        assert_eq!(n, 0);
    }

    #[test]
    fn test_shadowed_declarations_are_independent_bindings() {
        let n = bindings_of(
            "use results;\n\
             fn main() { let r: Result = f(); let r: Result = g(); }",
        );
        assert_eq!(n, 2);
    }
}
