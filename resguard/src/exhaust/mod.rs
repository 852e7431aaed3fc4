//! Host-style generic match-exhaustiveness check
//!
//! Stand-in for the host compiler's own non-exhaustive-switch warning:
//! every match expression without a discard arm is flagged, regardless of
//! the scrutinee's type, because this generic check cannot know that any
//! particular type family is closed. The suppressor consumes this stream
//! and retracts the instances that fire against the outcome family.

use crate::ast::{Block, Expr, Item, Pattern, Program, Spanned, Stmt};
use crate::diagnostics::{rules, Diagnostic};

const MESSAGE: &str = "switch expression does not handle all possible inputs";

/// Check every match expression in the file.
pub fn check(program: &Program) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for item in &program.items {
        if let Item::FnDef(def) = item {
            check_block(&def.body, &mut diagnostics);
        }
    }
    diagnostics
}

fn check_block(block: &Block, out: &mut Vec<Diagnostic>) {
    for stmt in &block.stmts {
        check_stmt(stmt, out);
    }
}

fn check_stmt(stmt: &Spanned<Stmt>, out: &mut Vec<Diagnostic>) {
    match &stmt.node {
        Stmt::Let { value, .. } => check_expr(value, out),
        Stmt::If {
            cond,
            then_block,
            else_branch,
        } => {
            check_expr(cond, out);
            check_block(then_block, out);
            if let Some(branch) = else_branch {
                check_stmt(branch, out);
            }
        }
        Stmt::Return(value) => {
            if let Some(value) = value {
                check_expr(value, out);
            }
        }
        Stmt::Block(block) => check_block(block, out),
        Stmt::Expr(expr) => check_expr(expr, out),
    }
}

fn check_expr(expr: &Spanned<Expr>, out: &mut Vec<Diagnostic>) {
    match &expr.node {
        Expr::IntLit(_) | Expr::StrLit(_) | Expr::BoolLit(_) | Expr::Var(_) => {}
        Expr::Call { args, .. } => {
            for arg in args {
                check_expr(arg, out);
            }
        }
        Expr::MethodCall { recv, args, .. } => {
            check_expr(recv, out);
            for arg in args {
                check_expr(arg, out);
            }
        }
        Expr::Field { recv, .. } => check_expr(recv, out),
        Expr::Unary { expr, .. } => check_expr(expr, out),
        Expr::Binary { left, right, .. } => {
            check_expr(left, out);
            check_expr(right, out);
        }
        Expr::Is { expr, .. } => check_expr(expr, out),
        Expr::Match { scrutinee, arms } => {
            check_expr(scrutinee, out);
            let has_discard = arms
                .iter()
                .any(|arm| matches!(arm.pattern.node, Pattern::Discard));
            if !has_discard {
                out.push(Diagnostic::new(
                    rules::HOST_NON_EXHAUSTIVE_SWITCH,
                    expr.span,
                    MESSAGE,
                ));
            }
            for arm in arms {
                check_expr(&arm.body, out);
            }
        }
    }
}
