//! Semantic model
//!
//! A per-file resolution pass that gives the analysis passes the static
//! information a host compiler would normally provide: which declaration
//! every identifier refers to (exact symbol identity, shadowing-correct),
//! the static type of every local, and the identity of types coming from
//! the built-in `results` module.
//!
//! Resolution is deliberately permissive: unknown names, unknown callees
//! and unresolvable types are simply absent from the tables. The analysis
//! passes treat absence as "no contribution", never as an error.

use crate::ast::{Block, Expr, Pattern, Program, Span, Spanned, Stmt, TypeRef};
use std::collections::{HashMap, HashSet};

/// Name of the built-in module that provides the outcome family.
pub const RESULTS_MODULE: &str = "results";

/// Identifier for one declaration site.
///
/// Two declarations of the same name are distinct symbols; every use
/// resolves to exactly one of them.
pub type SymbolId = u32;

/// Declaring origin of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The built-in `results` module.
    Results,
    /// A `struct` declared in the analyzed file.
    Local,
}

/// A resolved static type: name, generic arity and declaring origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub name: String,
    pub arity: usize,
    pub origin: Origin,
}

impl ResolvedType {
    pub fn results(name: &str, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            arity,
            origin: Origin::Results,
        }
    }

    /// Fully qualified display name, e.g. `results.Result<T>`.
    pub fn qualified_name(&self) -> String {
        let module = match self.origin {
            Origin::Results => RESULTS_MODULE,
            Origin::Local => "<file>",
        };
        if self.arity > 0 {
            format!("{module}.{}<T>", self.name)
        } else {
            format!("{module}.{}", self.name)
        }
    }
}

/// Types exported by the `results` module, with their arities.
const RESULTS_EXPORTS: &[(&str, &[usize])] = &[
    ("Result", &[0, 1]),
    ("Ok", &[0, 1]),
    ("Error", &[0, 1]),
];

/// Per-file semantic model.
pub struct SemanticModel {
    imports_results: bool,
    local_structs: HashSet<String>,
    fn_return_types: HashMap<String, TypeRef>,

    /// Identifier-use resolution: span of a `Var` expression -> symbol.
    uses: HashMap<Span, SymbolId>,
    /// Declaration resolution: span of a declared name -> its symbol.
    decls: HashMap<Span, SymbolId>,
    /// Static type per symbol, where one could be determined.
    symbol_types: HashMap<SymbolId, ResolvedType>,
}

impl SemanticModel {
    /// Build the semantic model for a parsed file.
    pub fn build(program: &Program) -> Self {
        let mut model = Self {
            imports_results: false,
            local_structs: HashSet::new(),
            fn_return_types: HashMap::new(),
            uses: HashMap::new(),
            decls: HashMap::new(),
            symbol_types: HashMap::new(),
        };

        // Item signatures first, so forward calls resolve.
        for item in &program.items {
            match item {
                crate::ast::Item::Use(decl) => {
                    if decl.module.node == RESULTS_MODULE {
                        model.imports_results = true;
                    }
                }
                crate::ast::Item::StructDef(def) => {
                    model.local_structs.insert(def.name.node.clone());
                }
                crate::ast::Item::FnDef(def) => {
                    if let Some(ret) = &def.ret_ty {
                        model
                            .fn_return_types
                            .insert(def.name.node.clone(), ret.node.clone());
                    }
                }
            }
        }

        let mut resolver = Resolver {
            model: &mut model,
            scopes: Vec::new(),
            next_symbol: 0,
        };
        for item in &program.items {
            if let crate::ast::Item::FnDef(def) = item {
                resolver.resolve_fn(def);
            }
        }

        model
    }

    /// Resolve a syntactic type reference to its static identity.
    ///
    /// File-local declarations shadow the `results` module; a user type
    /// named `Result` never matches the outcome family.
    pub fn resolve_type_ref(&self, ty: &TypeRef) -> Option<ResolvedType> {
        let name = ty.name.node.as_str();
        if self.local_structs.contains(name) {
            return Some(ResolvedType {
                name: name.to_string(),
                arity: ty.arity(),
                origin: Origin::Local,
            });
        }
        if self.imports_results {
            for (export, arities) in RESULTS_EXPORTS {
                if *export == name && arities.contains(&ty.arity()) {
                    return Some(ResolvedType::results(name, ty.arity()));
                }
            }
        }
        None
    }

    /// Symbol declared by the `let`/pattern/param name at `span`.
    pub fn symbol_at_decl(&self, span: Span) -> Option<SymbolId> {
        self.decls.get(&span).copied()
    }

    /// Symbol an identifier use at `span` resolves to.
    pub fn symbol_at_use(&self, span: Span) -> Option<SymbolId> {
        self.uses.get(&span).copied()
    }

    /// Static type of a symbol, if one was determined.
    pub fn type_of_symbol(&self, symbol: SymbolId) -> Option<&ResolvedType> {
        self.symbol_types.get(&symbol)
    }

    /// Shallow static type of an expression.
    pub fn type_of_expr(&self, expr: &Spanned<Expr>) -> Option<ResolvedType> {
        match &expr.node {
            Expr::Var(_) => self
                .symbol_at_use(expr.span)
                .and_then(|sym| self.type_of_symbol(sym).cloned()),
            Expr::Call { callee, .. } => self
                .fn_return_types
                .get(&callee.node)
                .and_then(|ret| self.resolve_type_ref(ret)),
            Expr::Field { .. } => self.constant_type(expr),
            _ => None,
        }
    }

    /// Type of a constant path expression, currently only the non-generic
    /// success singleton `Result.Ok`.
    pub fn constant_type(&self, expr: &Spanned<Expr>) -> Option<ResolvedType> {
        if let Expr::Field { recv, field } = &expr.node {
            if let Expr::Var(base) = &recv.node {
                if base == "Result"
                    && field.node == "Ok"
                    && self.imports_results
                    && !self.local_structs.contains("Result")
                {
                    return Some(ResolvedType::results("Ok", 0));
                }
            }
        }
        None
    }

    /// Whether `method` invoked on a receiver of type `recv_ty` is one of
    /// the forced-extraction operations of the outcome library.
    pub fn is_extraction_method(&self, recv_ty: &ResolvedType, method: &str) -> bool {
        recv_ty.origin == Origin::Results
            && recv_ty.name == "Result"
            && method.starts_with("unwrap")
    }
}

/// Scope-stack walker assigning symbols and recording resolutions.
struct Resolver<'m> {
    model: &'m mut SemanticModel,
    scopes: Vec<HashMap<String, SymbolId>>,
    next_symbol: SymbolId,
}

impl Resolver<'_> {
    fn declare(&mut self, name: &Spanned<String>, ty: Option<ResolvedType>) {
        let symbol = self.next_symbol;
        self.next_symbol += 1;
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.node.clone(), symbol);
        }
        self.model.decls.insert(name.span, symbol);
        if let Some(ty) = ty {
            self.model.symbol_types.insert(symbol, ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn resolve_fn(&mut self, def: &crate::ast::FnDef) {
        self.scopes.push(HashMap::new());
        for param in &def.params {
            let ty = self.model.resolve_type_ref(&param.ty.node);
            self.declare(&param.name, ty);
        }
        self.resolve_block(&def.body);
        self.scopes.pop();
    }

    fn resolve_block(&mut self, block: &Block) {
        self.scopes.push(HashMap::new());
        for stmt in &block.stmts {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn resolve_stmt(&mut self, stmt: &Spanned<Stmt>) {
        match &stmt.node {
            Stmt::Let { name, ty, value } => {
                // The initializer sees the outer binding, not the new one.
                self.resolve_expr(value);
                let resolved = match ty {
                    Some(annotation) => self.model.resolve_type_ref(&annotation.node),
                    // Inference only needs the initializer, which was just
                    // resolved above.
                    None => self.model.type_of_expr(value),
                };
                self.declare(name, resolved);
            }
            Stmt::If {
                cond,
                then_block,
                else_branch,
            } => {
                // Pattern bindings introduced by `is` tests in the condition
                // stay visible for the rest of the enclosing block, so they
                // are declared into the current scope as the condition is
                // walked.
                self.resolve_expr(cond);
                self.resolve_block(then_block);
                if let Some(branch) = else_branch {
                    self.resolve_stmt(branch);
                }
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            Stmt::Block(block) => self.resolve_block(block),
            Stmt::Expr(expr) => self.resolve_expr(expr),
        }
    }

    fn resolve_expr(&mut self, expr: &Spanned<Expr>) {
        match &expr.node {
            Expr::IntLit(_) | Expr::StrLit(_) | Expr::BoolLit(_) => {}
            Expr::Var(name) => {
                if let Some(symbol) = self.lookup(name) {
                    self.model.uses.insert(expr.span, symbol);
                }
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::MethodCall { recv, args, .. } => {
                self.resolve_expr(recv);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Field { recv, .. } => {
                // Constant paths like `Result.Ok` name a module type, not a
                // local; a plain base identifier is still resolved when it
                // is one.
                self.resolve_expr(recv);
            }
            Expr::Unary { expr, .. } => self.resolve_expr(expr),
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Is { expr, pattern } => {
                self.resolve_expr(expr);
                self.resolve_pattern(pattern);
            }
            Expr::Match { scrutinee, arms } => {
                self.resolve_expr(scrutinee);
                for arm in arms {
                    // Arm bindings are scoped to the arm body.
                    self.scopes.push(HashMap::new());
                    self.resolve_pattern(&arm.pattern);
                    self.resolve_expr(&arm.body);
                    self.scopes.pop();
                }
            }
        }
    }

    fn resolve_pattern(&mut self, pattern: &Spanned<Pattern>) {
        match &pattern.node {
            Pattern::Discard | Pattern::Type(_) => {}
            Pattern::Declaration { ty, name } => {
                let resolved = self.model.resolve_type_ref(&ty.node);
                self.declare(name, resolved);
            }
            Pattern::Constant(expr) => {
                // Only resolved as a constant path; never a local use.
                let _ = expr;
            }
            Pattern::Destructure { fields, .. } => {
                for field in fields {
                    self.declare(field, None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn model_for(source: &str) -> (Program, SemanticModel) {
        let tokens = tokenize(source).unwrap();
        let program = parse("test.res", source, tokens).unwrap();
        let model = SemanticModel::build(&program);
        (program, model)
    }

    fn first_let_decl_span(program: &Program) -> Span {
        for item in &program.items {
            if let crate::ast::Item::FnDef(def) = item {
                for stmt in &def.body.stmts {
                    if let Stmt::Let { name, .. } = &stmt.node {
                        return name.span;
                    }
                }
            }
        }
        panic!("no let statement in program");
    }

    #[test]
    fn test_annotated_let_resolves_to_results_module() {
        let (program, model) = model_for(
            "use results;\n\
             fn main() { let r: Result = f(); }",
        );
        let symbol = model.symbol_at_decl(first_let_decl_span(&program)).unwrap();
        let ty = model.type_of_symbol(symbol).unwrap();
        assert_eq!(ty, &ResolvedType::results("Result", 0));
    }

    #[test]
    fn test_inferred_let_uses_callee_return_type() {
        let (program, model) = model_for(
            "use results;\n\
             fn f() -> Result<string> { return g(); }\n\
             fn main() { let r = f(); }",
        );
        let symbol = model.symbol_at_decl(first_let_decl_span(&program)).unwrap();
        let ty = model.type_of_symbol(symbol).unwrap();
        assert_eq!(ty, &ResolvedType::results("Result", 1));
    }

    #[test]
    fn test_local_struct_shadows_results_import() {
        let (program, model) = model_for(
            "use results;\n\
             struct Result;\n\
             fn main() { let r: Result = f(); }",
        );
        let symbol = model.symbol_at_decl(first_let_decl_span(&program)).unwrap();
        let ty = model.type_of_symbol(symbol).unwrap();
        assert_eq!(ty.origin, Origin::Local);
    }

    #[test]
    fn test_unimported_result_does_not_resolve() {
        let (program, model) = model_for("fn main() { let r: Result = f(); }");
        let symbol = model.symbol_at_decl(first_let_decl_span(&program)).unwrap();
        assert!(model.type_of_symbol(symbol).is_none());
    }

    #[test]
    fn test_shadowing_produces_distinct_symbols() {
        let source = "use results;\n\
                      fn main() { let r: Result = f(); let r: Result = g(); }";
        let (program, model) = model_for(source);
        let crate::ast::Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let spans: Vec<Span> = def
            .body
            .stmts
            .iter()
            .map(|stmt| match &stmt.node {
                Stmt::Let { name, .. } => name.span,
                _ => panic!("expected let"),
            })
            .collect();
        let first = model.symbol_at_decl(spans[0]).unwrap();
        let second = model.symbol_at_decl(spans[1]).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_is_binding_visible_after_the_if() {
        let source = "use results;\n\
                      fn main() {\n\
                          let r: Result = f();\n\
                          if r is Ok o { g(); }\n\
                          if o is Ok { g(); }\n\
                      }";
        let (program, model) = model_for(source);
        let crate::ast::Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let Stmt::If { cond, .. } = &def.body.stmts[2].node else {
            panic!("expected second if");
        };
        let crate::ast::Expr::Is { expr, .. } = &cond.node else {
            panic!("expected is test");
        };
        let symbol = model.symbol_at_use(expr.span).unwrap();
        assert_eq!(
            model.type_of_symbol(symbol).unwrap(),
            &ResolvedType::results("Ok", 0)
        );
    }

    #[test]
    fn test_constant_type_of_result_ok_path() {
        let (program, model) = model_for(
            "use results;\n\
             fn main() { let r: Result = f(); g(Result.Ok); }",
        );
        let crate::ast::Item::FnDef(def) = &program.items[1] else {
            panic!("expected fn");
        };
        let Stmt::Expr(call) = &def.body.stmts[1].node else {
            panic!("expected expression statement");
        };
        let crate::ast::Expr::Call { args, .. } = &call.node else {
            panic!("expected call");
        };
        let ty = model.constant_type(&args[0]).unwrap();
        assert_eq!(ty, ResolvedType::results("Ok", 0));
    }

    #[test]
    fn test_extraction_method_requires_results_receiver() {
        let (_, model) = model_for("use results;\nfn main() { }");
        let result_ty = ResolvedType::results("Result", 1);
        assert!(model.is_extraction_method(&result_ty, "unwrap"));
        assert!(model.is_extraction_method(&result_ty, "unwrap_or"));
        assert!(!model.is_extraction_method(&result_ty, "map"));

        let local = ResolvedType {
            name: "Result".to_string(),
            arity: 0,
            origin: Origin::Local,
        };
        assert!(!model.is_extraction_method(&local, "unwrap"));
    }
}
