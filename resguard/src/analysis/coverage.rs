//! Coverage classifier
//!
//! Determines which variants a single occurrence proves handled. All
//! classification is a pure bottom-up fold producing `Coverage` values;
//! anything unrecognized or unresolvable contributes `Coverage::EMPTY`
//! rather than failing.

use super::outcome::{variant_of, Coverage};
use super::refs::Occurrence;
use crate::ast::{BinOp, Expr, MatchArm, Pattern, Spanned, UnOp};
use crate::sema::SemanticModel;

/// Variants proven handled by one occurrence in its syntactic context.
pub fn classify(occurrence: &Occurrence<'_>, model: &SemanticModel) -> Coverage {
    // A forced extraction is full handling on its own: the failure path is
    // the raise inside the extraction, not a visible branch here.
    if occurrence.extraction {
        return Coverage::FULL;
    }

    let mut coverage = Coverage::EMPTY;
    if let Some(arms) = occurrence.enclosing_match {
        coverage = coverage.union(match_coverage(arms, model));
    }
    if let Some(cond) = occurrence.enclosing_if {
        coverage = coverage.union(condition_coverage(cond, model));
    }
    coverage
}

/// Union of what every arm of a match expression handles.
pub fn match_coverage(arms: &[MatchArm], model: &SemanticModel) -> Coverage {
    arms.iter().fold(Coverage::EMPTY, |acc, arm| {
        acc.union(arm_coverage(&arm.pattern, model))
    })
}

fn arm_coverage(pattern: &Spanned<Pattern>, model: &SemanticModel) -> Coverage {
    match &pattern.node {
        // A wildcard arm closes the match regardless of what precedes it.
        Pattern::Discard => Coverage::FULL,
        Pattern::Type(ty) | Pattern::Declaration { ty, .. } => type_ref_coverage(ty, model),
        Pattern::Constant(expr) => model
            .constant_type(expr)
            .and_then(|ty| variant_of(&ty))
            .map_or(Coverage::EMPTY, Coverage::of),
        Pattern::Destructure { ty: Some(ty), .. } => type_ref_coverage(ty, model),
        // With no declared type and a scrutinee typed as the whole outcome
        // family, the arm proves no particular variant.
        Pattern::Destructure { ty: None, .. } => Coverage::EMPTY,
    }
}

/// What an `if` condition proves, folded recursively over the expression
/// tree: compound `&&`/`||` conditions decompose into both sides, `!` is
/// traversed, and a bare identifier whose narrowed static type is a
/// variant type counts as a re-test of that variant.
pub fn condition_coverage(cond: &Spanned<Expr>, model: &SemanticModel) -> Coverage {
    match &cond.node {
        Expr::Is { expr, pattern } => is_test_coverage(expr, pattern, model),
        Expr::Binary {
            left,
            op: BinOp::And | BinOp::Or,
            right,
        } => condition_coverage(left, model).union(condition_coverage(right, model)),
        Expr::Unary {
            op: UnOp::Not,
            expr,
        } => condition_coverage(expr, model),
        Expr::Var(_) => model
            .type_of_expr(cond)
            .and_then(|ty| variant_of(&ty))
            .map_or(Coverage::EMPTY, Coverage::of),
        _ => Coverage::EMPTY,
    }
}

fn is_test_coverage(
    tested: &Spanned<Expr>,
    pattern: &Spanned<Pattern>,
    model: &SemanticModel,
) -> Coverage {
    match &pattern.node {
        Pattern::Type(ty) | Pattern::Declaration { ty, .. } => type_ref_coverage(ty, model),
        Pattern::Constant(expr) => model
            .constant_type(expr)
            .and_then(|ty| variant_of(&ty))
            .map_or(Coverage::EMPTY, Coverage::of),
        Pattern::Destructure { ty: Some(ty), .. } => type_ref_coverage(ty, model),
        // Typeless destructuring: the tested expression's static type
        // decides what the pattern matches; if it cannot be determined the
        // test proves nothing.
        Pattern::Destructure { ty: None, .. } => model
            .type_of_expr(tested)
            .and_then(|ty| variant_of(&ty))
            .map_or(Coverage::EMPTY, Coverage::of),
        // `is _` is always true and proves nothing.
        Pattern::Discard => Coverage::EMPTY,
    }
}

fn type_ref_coverage(ty: &Spanned<crate::ast::TypeRef>, model: &SemanticModel) -> Coverage {
    model
        .resolve_type_ref(&ty.node)
        .and_then(|resolved| variant_of(&resolved))
        .map_or(Coverage::EMPTY, Coverage::of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::outcome::Variant;
    use crate::ast::{Item, Program, Stmt};
    use crate::lexer::tokenize;
    use crate::parser::parse;

    /// Parse a program whose `main` contains a single `if` statement and
    /// classify its condition.
    fn condition_coverage_of(source: &str) -> Coverage {
        let tokens = tokenize(source).unwrap();
        let program: Program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        for item in &program.items {
            let Item::FnDef(def) = item else { continue };
            for stmt in &def.body.stmts {
                if let Stmt::If { cond, .. } = &stmt.node {
                    return condition_coverage(cond, &model);
                }
            }
        }
        panic!("no if statement in program");
    }

    fn prelude(body: &str) -> String {
        format!(
            "use results;\n\
             fn main() {{ let r: Result = f(); {body} }}"
        )
    }

    #[test]
    fn test_direct_type_test() {
        let cov = condition_coverage_of(&prelude("if r is Ok { g(); }"));
        assert_eq!(cov, Coverage::of(Variant::Ok));
    }

    #[test]
    fn test_declaration_test_binds_and_covers() {
        let cov = condition_coverage_of(&prelude("if r is Error e { g(); }"));
        assert_eq!(cov, Coverage::of(Variant::Error));
    }

    #[test]
    fn test_compound_condition_decomposes_both_sides() {
        let cov = condition_coverage_of(&prelude("if r is Ok o && o is { value } { g(); }"));
        assert_eq!(cov, Coverage::of(Variant::Ok));
    }

    #[test]
    fn test_or_condition_unions_both_sides() {
        let cov = condition_coverage_of(&prelude("if r is Ok || r is Error { g(); }"));
        assert_eq!(cov, Coverage::FULL);
    }

    #[test]
    fn test_negated_test_still_counts_as_examined() {
        let cov = condition_coverage_of(&prelude("if !(r is Ok) { g(); }"));
        assert_eq!(cov, Coverage::of(Variant::Ok));
    }

    #[test]
    fn test_narrowed_identifier_counts_as_re_test() {
        // `e` was bound by a declaration pattern, so a later bare
        // reference in a condition carries the Error type.
        let source = "use results;\n\
                      fn main() {\n\
                          let r: Result = f();\n\
                          if r is Error e && e == other { g(); }\n\
                      }";
        // The `&&` decomposes; the left side contributes Error via the
        // type test, the right side is an equality leaf.
        let cov = condition_coverage_of(source);
        assert_eq!(cov, Coverage::of(Variant::Error));
    }

    #[test]
    fn test_unrelated_condition_contributes_nothing() {
        let cov = condition_coverage_of(&prelude("if ready() { g(); }"));
        assert_eq!(cov, Coverage::EMPTY);
    }

    #[test]
    fn test_typeless_destructure_reads_tested_expression_type() {
        let source = "use results;\n\
                      fn main() {\n\
                          let r: Result = f();\n\
                          if r is Ok o { g(); }\n\
                          if o is { } { g(); }\n\
                      }";
        let tokens = tokenize(source).unwrap();
        let program: Program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let Stmt::If { cond, .. } = &def.body.stmts[2].node else {
            panic!("expected second if");
        };
        assert_eq!(
            condition_coverage(cond, &model),
            Coverage::of(Variant::Ok)
        );
    }

    #[test]
    fn test_wildcard_arm_closes_the_match() {
        let source = prelude("match r { _ => 0, };");
        let tokens = tokenize(&source).unwrap();
        let program: Program = parse("test.res", &source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let Stmt::Expr(expr) = &def.body.stmts[1].node else {
            panic!("expected match statement");
        };
        let crate::ast::Expr::Match { arms, .. } = &expr.node else {
            panic!("expected match");
        };
        assert_eq!(match_coverage(arms, &model), Coverage::FULL);
    }

    #[test]
    fn test_constant_arm_covers_the_singleton_variant() {
        let source = prelude("match r { Result.Ok => 0, Error e => 1, };");
        let tokens = tokenize(&source).unwrap();
        let program: Program = parse("test.res", &source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let Stmt::Expr(expr) = &def.body.stmts[1].node else {
            panic!("expected match statement");
        };
        let crate::ast::Expr::Match { arms, .. } = &expr.node else {
            panic!("expected match");
        };
        assert_eq!(match_coverage(arms, &model), Coverage::FULL);
    }
}
