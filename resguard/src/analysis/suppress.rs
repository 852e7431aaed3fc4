//! Exhaustiveness-warning suppressor
//!
//! Consumes the host's non-exhaustive-switch diagnostics and retracts any
//! instance whose scrutinized expression has the outcome family's static
//! type: the family is closed and the handling analyzer already enforces
//! variant coverage, so the generic warning is a false positive there.

use crate::ast::{Block, Expr, Item, Program, Span, Spanned, Stmt};
use crate::diagnostics::{rules, Diagnostic, Suppression};
use crate::sema::SemanticModel;

/// Qualified-name prefix matching both outcome forms.
const OUTCOME_PREFIX: &str = "results.Result";

/// Produce suppressions for the host diagnostics that fire against
/// outcome-typed match expressions.
pub fn suppress(
    program: &Program,
    model: &SemanticModel,
    host_diagnostics: &[Diagnostic],
) -> Vec<Suppression> {
    let mut suppressions = Vec::new();

    for diagnostic in host_diagnostics {
        if diagnostic.rule_id != rules::HOST_NON_EXHAUSTIVE_SWITCH {
            continue;
        }
        let Some(scrutinee) = match_scrutinee_at(program, diagnostic.span) else {
            continue;
        };
        let is_outcome = model
            .type_of_expr(scrutinee)
            .is_some_and(|ty| ty.qualified_name().starts_with(OUTCOME_PREFIX));
        if is_outcome {
            suppressions.push(Suppression {
                id: rules::SWITCH_SUPPRESSOR,
                justification: rules::SWITCH_SUPPRESSOR_JUSTIFICATION,
                suppressed: diagnostic.clone(),
            });
        }
    }

    suppressions
}

/// Find the innermost match expression whose span covers `span` and
/// return its scrutinee.
fn match_scrutinee_at(program: &Program, span: Span) -> Option<&Spanned<Expr>> {
    let mut found: Option<&Spanned<Expr>> = None;
    for item in &program.items {
        if let Item::FnDef(def) = item {
            find_in_block(&def.body, span, &mut found);
        }
    }
    found
}

fn find_in_block<'a>(block: &'a Block, span: Span, found: &mut Option<&'a Spanned<Expr>>) {
    for stmt in &block.stmts {
        find_in_stmt(stmt, span, found);
    }
}

fn find_in_stmt<'a>(stmt: &'a Spanned<Stmt>, span: Span, found: &mut Option<&'a Spanned<Expr>>) {
    match &stmt.node {
        Stmt::Let { value, .. } => find_in_expr(value, span, found),
        Stmt::If {
            cond,
            then_block,
            else_branch,
        } => {
            find_in_expr(cond, span, found);
            find_in_block(then_block, span, found);
            if let Some(branch) = else_branch {
                find_in_stmt(branch, span, found);
            }
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                find_in_expr(value, span, found);
            }
        }
        Stmt::Block(block) => find_in_block(block, span, found),
        Stmt::Expr(expr) => find_in_expr(expr, span, found),
    }
}

fn find_in_expr<'a>(expr: &'a Spanned<Expr>, span: Span, found: &mut Option<&'a Spanned<Expr>>) {
    match &expr.node {
        Expr::IntLit(_) | Expr::StrLit(_) | Expr::BoolLit(_) | Expr::Var(_) => {}
        Expr::Call { args, .. } => {
            for arg in args {
                find_in_expr(arg, span, found);
            }
        }
        Expr::MethodCall { recv, args, .. } => {
            find_in_expr(recv, span, found);
            for arg in args {
                find_in_expr(arg, span, found);
            }
        }
        Expr::Field { recv, .. } => find_in_expr(recv, span, found),
        Expr::Unary { expr, .. } => find_in_expr(expr, span, found),
        Expr::Binary { left, right, .. } => {
            find_in_expr(left, span, found);
            find_in_expr(right, span, found);
        }
        Expr::Is { expr, .. } => find_in_expr(expr, span, found),
        Expr::Match { scrutinee, arms } => {
            if expr.span.contains(span) {
                // Inner matches are visited afterwards and overwrite, so
                // the innermost covering match wins.
                *found = Some(scrutinee);
            }
            find_in_expr(scrutinee, span, found);
            for arm in arms {
                find_in_expr(&arm.body, span, found);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exhaust;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn analyze(source: &str) -> (Vec<Diagnostic>, Vec<Suppression>) {
        let tokens = tokenize(source).unwrap();
        let program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let host = exhaust::check(&program);
        let suppressions = suppress(&program, &model, &host);
        (host, suppressions)
    }

    #[test]
    fn test_outcome_match_warning_is_suppressed() {
        let (host, suppressions) = analyze(
            "use results;\n\
             fn main() {\n\
                 let r: Result = f();\n\
                 match r { Ok => 0, Error => 1, };\n\
             }",
        );
        assert_eq!(host.len(), 1);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].id, rules::SWITCH_SUPPRESSOR);
        assert_eq!(suppressions[0].suppressed, host[0]);
    }

    #[test]
    fn test_non_outcome_match_warning_is_kept() {
        let (host, suppressions) = analyze(
            "use results;\n\
             fn main() { match f() { Ok => 0, }; }",
        );
        assert_eq!(host.len(), 1);
        assert!(suppressions.is_empty());
    }

    #[test]
    fn test_generic_outcome_match_is_also_suppressed() {
        let (host, suppressions) = analyze(
            "use results;\n\
             fn f() -> Result<string> { return g(); }\n\
             fn main() {\n\
                 let r: Result<string> = f();\n\
                 match r { Ok<string> o => 0, Error<string> e => 1, };\n\
             }",
        );
        assert_eq!(host.len(), 1);
        assert_eq!(suppressions.len(), 1);
    }

    #[test]
    fn test_other_host_ids_are_ignored() {
        let source = "use results;\n\
                      fn main() { let r: Result = f(); match r { _ => 0, }; }";
        let tokens = tokenize(source).unwrap();
        let program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let foreign = vec![Diagnostic::new(
            rules::RESULT_HANDLING_PLAIN,
            Span::new(0, 1),
            "unrelated",
        )];
        assert!(suppress(&program, &model, &foreign).is_empty());
    }
}
