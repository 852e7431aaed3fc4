//! Reference collector
//!
//! For one binding, walks its enclosing block and yields every retained
//! occurrence of the bound identifier, tagged with the syntactic context
//! the classifier needs. Exact symbol identity is used throughout, so a
//! shadowing redeclaration of the same name never contributes.
//!
//! Two occurrence shapes are discarded as "forwarded" rather than
//! retained: an identifier that is the entire expression of a `return`
//! statement, and an identifier passed bare as an argument to a call. In
//! both cases responsibility for handling the value moves elsewhere.

use super::bindings::Binding;
use crate::ast::{Block, Expr, MatchArm, Span, Spanned, Stmt};
use crate::sema::SemanticModel;

/// Syntactic role of a retained occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    MatchArm,
    ConditionalTest,
    ExtractionCall,
    Other,
}

/// One retained occurrence of the binding.
#[derive(Debug, Clone, Copy)]
pub struct Occurrence<'a> {
    pub span: Span,
    /// Arms of the nearest enclosing match expression, if any.
    pub enclosing_match: Option<&'a [MatchArm]>,
    /// Condition of the nearest enclosing `if`, if any.
    pub enclosing_if: Option<&'a Spanned<Expr>>,
    /// The occurrence is the receiver of an extraction (`unwrap`-family)
    /// call.
    pub extraction: bool,
}

impl Occurrence<'_> {
    pub fn role(&self) -> Role {
        if self.extraction {
            Role::ExtractionCall
        } else if self.enclosing_match.is_some() {
            Role::MatchArm
        } else if self.enclosing_if.is_some() {
            Role::ConditionalTest
        } else {
            Role::Other
        }
    }
}

/// Collect the retained occurrences of `binding` inside its enclosing
/// block, in source order.
pub fn collect<'a>(binding: &Binding<'a>, model: &SemanticModel) -> Vec<Occurrence<'a>> {
    let mut walker = Walker {
        binding_symbol: binding.symbol,
        model,
        out: Vec::new(),
    };
    walker.walk_block(binding.block, Context::default());
    walker.out
}

#[derive(Clone, Copy, Default)]
struct Context<'a> {
    enclosing_match: Option<&'a [MatchArm]>,
    enclosing_if: Option<&'a Spanned<Expr>>,
}

struct Walker<'a, 'm> {
    binding_symbol: crate::sema::SymbolId,
    model: &'m SemanticModel,
    out: Vec<Occurrence<'a>>,
}

impl<'a> Walker<'a, '_> {
    fn is_binding_ref(&self, expr: &Spanned<Expr>) -> bool {
        matches!(expr.node, Expr::Var(_))
            && self.model.symbol_at_use(expr.span) == Some(self.binding_symbol)
    }

    fn walk_block(&mut self, block: &'a Block, ctx: Context<'a>) {
        for stmt in &block.stmts {
            self.walk_stmt(stmt, ctx);
        }
    }

    fn walk_stmt(&mut self, stmt: &'a Spanned<Stmt>, ctx: Context<'a>) {
        match &stmt.node {
            Stmt::Let { value, .. } => self.walk_expr(value, ctx, false),
            Stmt::If {
                cond,
                then_block,
                else_branch,
            } => {
                let inner = Context {
                    enclosing_if: Some(cond),
                    ..ctx
                };
                self.walk_expr(cond, inner, false);
                self.walk_block(then_block, inner);
                if let Some(branch) = else_branch {
                    // The else branch is still inside this if statement.
                    self.walk_stmt(branch, inner);
                }
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    // Directly returning the whole value passes the
                    // responsibility upward; only that exact shape is
                    // skipped.
                    if self.is_binding_ref(value) {
                        return;
                    }
                    self.walk_expr(value, ctx, false);
                }
            }
            Stmt::Block(block) => self.walk_block(block, ctx),
            Stmt::Expr(expr) => self.walk_expr(expr, ctx, false),
        }
    }

    /// `in_arg_position` is true only when `expr` itself is an argument
    /// expression of a call; it never propagates into subexpressions.
    fn walk_expr(&mut self, expr: &'a Spanned<Expr>, ctx: Context<'a>, in_arg_position: bool) {
        match &expr.node {
            Expr::IntLit(_) | Expr::StrLit(_) | Expr::BoolLit(_) => {}
            Expr::Var(_) => {
                if !self.is_binding_ref(expr) {
                    return;
                }
                if in_arg_position {
                    // Forwarded unexamined to the callee.
                    return;
                }
                self.out.push(Occurrence {
                    span: expr.span,
                    enclosing_match: ctx.enclosing_match,
                    enclosing_if: ctx.enclosing_if,
                    extraction: false,
                });
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.walk_expr(arg, ctx, true);
                }
            }
            Expr::MethodCall { recv, method, args } => {
                let extraction = self.is_binding_ref(recv)
                    && self
                        .model
                        .type_of_expr(recv)
                        .is_some_and(|ty| self.model.is_extraction_method(&ty, &method.node));
                if extraction {
                    self.out.push(Occurrence {
                        span: recv.span,
                        enclosing_match: ctx.enclosing_match,
                        enclosing_if: ctx.enclosing_if,
                        extraction: true,
                    });
                } else {
                    self.walk_expr(recv, ctx, false);
                }
                for arg in args {
                    self.walk_expr(arg, ctx, true);
                }
            }
            Expr::Field { recv, .. } => self.walk_expr(recv, ctx, false),
            Expr::Unary { expr, .. } => self.walk_expr(expr, ctx, false),
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left, ctx, false);
                self.walk_expr(right, ctx, false);
            }
            Expr::Is { expr, .. } => self.walk_expr(expr, ctx, false),
            Expr::Match { scrutinee, arms } => {
                let inner = Context {
                    enclosing_match: Some(arms),
                    ..ctx
                };
                self.walk_expr(scrutinee, inner, false);
                for arm in arms {
                    self.walk_expr(&arm.body, inner, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::bindings::locate;
    use crate::ast::{Item, Program};
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn roles_of(source: &str) -> Vec<Role> {
        let tokens = tokenize(source).unwrap();
        let program: Program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let mut roles = Vec::new();
        for item in &program.items {
            if let Item::FnDef(def) = item {
                for binding in locate(def, &model) {
                    roles.extend(collect(&binding, &model).iter().map(Occurrence::role));
                }
            }
        }
        roles
    }

    #[test]
    fn test_unused_binding_has_no_occurrences() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result = f(); }",
        );
        assert!(roles.is_empty());
    }

    #[test]
    fn test_whole_return_expression_is_discarded() {
        let roles = roles_of(
            "use results;\n\
             fn main() -> Result { let r: Result = f(); return r; }",
        );
        assert!(roles.is_empty());
    }

    #[test]
    fn test_bare_call_argument_is_discarded() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result = f(); log(r); }",
        );
        assert!(roles.is_empty());
    }

    #[test]
    fn test_conditional_test_occurrence() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result = f(); if r is Ok { g(); } }",
        );
        assert_eq!(roles, vec![Role::ConditionalTest]);
    }

    #[test]
    fn test_match_scrutinee_occurrence() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result = f(); match r { _ => 0, }; }",
        );
        assert_eq!(roles, vec![Role::MatchArm]);
    }

    #[test]
    fn test_unwrap_receiver_is_an_extraction() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result<string> = f(); let v = r.unwrap(); }",
        );
        assert_eq!(roles, vec![Role::ExtractionCall]);
    }

    #[test]
    fn test_unwrap_inside_call_argument_is_retained() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result<string> = f(); log(r.unwrap()); }",
        );
        assert_eq!(roles, vec![Role::ExtractionCall]);
    }

    #[test]
    fn test_foreign_method_receiver_is_other() {
        let roles = roles_of(
            "use results;\n\
             fn main() { let r: Result = f(); r.describe(); }",
        );
        assert_eq!(roles, vec![Role::Other]);
    }

    #[test]
    fn test_shadowing_refs_do_not_leak_into_original_binding() {
        // After the redeclaration, `r` is a different symbol; the first
        // binding keeps only its own single occurrence.
        let source = "use results;\n\
                      fn main() {\n\
                          let r: Result = f();\n\
                          if r is Ok { g(); }\n\
                          let r: Result = h();\n\
                          if r is Error e { g(); }\n\
                      }";
        let tokens = tokenize(source).unwrap();
        let program: Program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        let Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let bindings = locate(def, &model);
        assert_eq!(bindings.len(), 2);
        assert_eq!(collect(&bindings[0], &model).len(), 1);
        assert_eq!(collect(&bindings[1], &model).len(), 1);
    }
}
