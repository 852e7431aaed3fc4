//! Parser implementation
//!
//! Hand-written recursive descent over the token stream produced by the
//! lexer. The grammar is statement-oriented; expressions use precedence
//! climbing with `||` loosest, then `&&`, then equality, then `is` tests.

use crate::ast::{
    Block, Expr, FnDef, Item, MatchArm, Param, Pattern, Program, Span, Spanned, Stmt, StructDef,
    TypeRef, UseDecl,
};
use crate::error::{CompileError, Result};
use crate::lexer::Token;


/// Parse tokens into AST
pub fn parse(_filename: &str, source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    let eof = Span::new(source.len(), source.len().max(1));
    let mut parser = Parser {
        tokens,
        pos: 0,
        eof,
        no_brace_pattern: false,
    };
    parser.program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    eof: Span,
    /// Inside an unparenthesized `if` condition or match scrutinee a `{`
    /// after a pattern's type starts the following block, not a
    /// destructuring pattern.
    no_brace_pattern: bool,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek2(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    fn cur_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| *s)
            .unwrap_or(self.eof)
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<Span> {
        if self.at(token) {
            let span = self.cur_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&format!("expected `{token}`")))
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>> {
        match self.tokens.get(self.pos) {
            Some((Token::Ident(name), span)) => {
                let result = Spanned::new(name.clone(), *span);
                self.pos += 1;
                Ok(result)
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn unexpected(&self, what: &str) -> CompileError {
        let found = match self.peek() {
            Some(tok) => format!("found `{tok}`"),
            None => "found end of input".to_string(),
        };
        CompileError::parser(format!("{what}, {found}"), self.cur_span())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    fn program(&mut self) -> Result<Program> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            items.push(self.item()?);
        }
        Ok(Program { items })
    }

    fn item(&mut self) -> Result<Item> {
        match self.peek() {
            Some(Token::Use) => self.use_decl().map(Item::Use),
            Some(Token::Struct) => self.struct_def().map(Item::StructDef),
            Some(Token::Fn) => self.fn_def().map(Item::FnDef),
            _ => Err(self.unexpected("expected `use`, `struct` or `fn`")),
        }
    }

    fn use_decl(&mut self) -> Result<UseDecl> {
        let start = self.expect(&Token::Use)?;
        let module = self.expect_ident()?;
        let end = self.expect(&Token::Semi)?;
        Ok(UseDecl {
            module,
            span: start.merge(end),
        })
    }

    fn struct_def(&mut self) -> Result<StructDef> {
        let start = self.expect(&Token::Struct)?;
        let name = self.expect_ident()?;
        let end = self.expect(&Token::Semi)?;
        Ok(StructDef {
            name,
            span: start.merge(end),
        })
    }

    fn fn_def(&mut self) -> Result<FnDef> {
        let start = self.expect(&Token::Fn)?;
        let name = self.expect_ident()?;

        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.at(&Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            let pname = self.expect_ident()?;
            self.expect(&Token::Colon)?;
            let ty = self.type_ref()?;
            params.push(Param { name: pname, ty });
        }
        self.expect(&Token::RParen)?;

        let ret_ty = if self.eat(&Token::Arrow) {
            Some(self.type_ref()?)
        } else {
            None
        };

        let body = self.block()?;
        let span = start.merge(body.span);

        Ok(FnDef {
            name,
            params,
            ret_ty,
            body,
            span,
        })
    }

    fn type_ref(&mut self) -> Result<Spanned<TypeRef>> {
        let name = self.expect_ident()?;
        let mut span = name.span;
        let mut args = Vec::new();

        if self.eat(&Token::Lt) {
            loop {
                args.push(self.type_ref()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            span = span.merge(self.expect(&Token::Gt)?);
        }

        Ok(Spanned::new(TypeRef { name, args }, span))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> Result<Block> {
        let start = self.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(&Token::RBrace) {
            stmts.push(self.stmt()?);
        }
        let end = self.expect(&Token::RBrace)?;
        Ok(Block {
            stmts,
            span: start.merge(end),
        })
    }

    fn stmt(&mut self) -> Result<Spanned<Stmt>> {
        match self.peek() {
            Some(Token::Let) => self.let_stmt(),
            Some(Token::If) => self.if_stmt(),
            Some(Token::Return) => self.return_stmt(),
            Some(Token::LBrace) => {
                let block = self.block()?;
                let span = block.span;
                Ok(Spanned::new(Stmt::Block(block), span))
            }
            _ => {
                let expr = self.expr()?;
                let end = self.expect(&Token::Semi)?;
                let span = expr.span.merge(end);
                Ok(Spanned::new(Stmt::Expr(expr), span))
            }
        }
    }

    fn let_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::Let)?;
        let name = self.expect_ident()?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.type_ref()?)
        } else {
            None
        };
        self.expect(&Token::Eq)?;
        let value = self.expr()?;
        let end = self.expect(&Token::Semi)?;
        Ok(Spanned::new(
            Stmt::Let { name, ty, value },
            start.merge(end),
        ))
    }

    fn if_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::If)?;
        let prev = std::mem::replace(&mut self.no_brace_pattern, true);
        let cond = self.expr()?;
        self.no_brace_pattern = prev;
        let then_block = self.block()?;
        let mut span = start.merge(then_block.span);

        let else_branch = if self.eat(&Token::Else) {
            let branch = if self.at(&Token::If) {
                self.if_stmt()?
            } else {
                let block = self.block()?;
                let bspan = block.span;
                Spanned::new(Stmt::Block(block), bspan)
            };
            span = span.merge(branch.span);
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(Spanned::new(
            Stmt::If {
                cond,
                then_block,
                else_branch,
            },
            span,
        ))
    }

    fn return_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.expect(&Token::Return)?;
        let value = if self.at(&Token::Semi) {
            None
        } else {
            Some(self.expr()?)
        };
        let end = self.expect(&Token::Semi)?;
        Ok(Spanned::new(Stmt::Return(value), start.merge(end)))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self) -> Result<Spanned<Expr>> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let right = self.and_expr()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Expr::Binary {
                    left: Box::new(left),
                    op: crate::ast::BinOp::Or,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.equality_expr()?;
        while self.eat(&Token::AndAnd) {
            let right = self.equality_expr()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Expr::Binary {
                    left: Box::new(left),
                    op: crate::ast::BinOp::And,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn equality_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.is_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => crate::ast::BinOp::Eq,
                Some(Token::NotEq) => crate::ast::BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let right = self.is_expr()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(
                Expr::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn is_expr(&mut self) -> Result<Spanned<Expr>> {
        let expr = self.unary_expr()?;
        if self.eat(&Token::Is) {
            let pattern = self.pattern()?;
            let span = expr.span.merge(pattern.span);
            return Ok(Spanned::new(
                Expr::Is {
                    expr: Box::new(expr),
                    pattern,
                },
                span,
            ));
        }
        Ok(expr)
    }

    fn unary_expr(&mut self) -> Result<Spanned<Expr>> {
        if self.at(&Token::Bang) {
            let start = self.cur_span();
            self.pos += 1;
            let expr = self.unary_expr()?;
            let span = start.merge(expr.span);
            return Ok(Spanned::new(
                Expr::Unary {
                    op: crate::ast::UnOp::Not,
                    expr: Box::new(expr),
                },
                span,
            ));
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut expr = self.primary_expr()?;

        while self.eat(&Token::Dot) {
            let member = self.expect_ident()?;
            if self.at(&Token::LParen) {
                let (args, end) = self.call_args()?;
                let span = expr.span.merge(end);
                expr = Spanned::new(
                    Expr::MethodCall {
                        recv: Box::new(expr),
                        method: member,
                        args,
                    },
                    span,
                );
            } else {
                let span = expr.span.merge(member.span);
                expr = Spanned::new(
                    Expr::Field {
                        recv: Box::new(expr),
                        field: member,
                    },
                    span,
                );
            }
        }

        Ok(expr)
    }

    fn primary_expr(&mut self) -> Result<Spanned<Expr>> {
        match self.peek() {
            Some(Token::IntLit(_)) => {
                let (tok, span) = self.bump().unwrap();
                let Token::IntLit(n) = tok else { unreachable!() };
                Ok(Spanned::new(Expr::IntLit(n), span))
            }
            Some(Token::StrLit(_)) => {
                let (tok, span) = self.bump().unwrap();
                let Token::StrLit(s) = tok else { unreachable!() };
                Ok(Spanned::new(Expr::StrLit(s), span))
            }
            Some(Token::True) => {
                let (_, span) = self.bump().unwrap();
                Ok(Spanned::new(Expr::BoolLit(true), span))
            }
            Some(Token::False) => {
                let (_, span) = self.bump().unwrap();
                Ok(Spanned::new(Expr::BoolLit(false), span))
            }
            Some(Token::Ident(_)) => {
                let name = self.expect_ident()?;
                if self.at(&Token::LParen) {
                    let (args, end) = self.call_args()?;
                    let span = name.span.merge(end);
                    Ok(Spanned::new(Expr::Call { callee: name, args }, span))
                } else {
                    let span = name.span;
                    Ok(Spanned::new(Expr::Var(name.node), span))
                }
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let prev = std::mem::replace(&mut self.no_brace_pattern, false);
                let expr = self.expr()?;
                self.no_brace_pattern = prev;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Match) => self.match_expr(),
            _ => Err(self.unexpected("expected expression")),
        }
    }

    fn call_args(&mut self) -> Result<(Vec<Spanned<Expr>>, Span)> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        while !self.at(&Token::RParen) {
            if !args.is_empty() {
                self.expect(&Token::Comma)?;
            }
            args.push(self.expr()?);
        }
        let end = self.expect(&Token::RParen)?;
        Ok((args, end))
    }

    fn match_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.expect(&Token::Match)?;
        let prev = std::mem::replace(&mut self.no_brace_pattern, true);
        let scrutinee = self.expr()?;
        self.no_brace_pattern = prev;
        self.expect(&Token::LBrace)?;

        let mut arms = Vec::new();
        while !self.at(&Token::RBrace) {
            if !arms.is_empty() {
                self.expect(&Token::Comma)?;
                // trailing comma before the closing brace
                if self.at(&Token::RBrace) {
                    break;
                }
            }
            let pattern = self.pattern()?;
            self.expect(&Token::FatArrow)?;
            let body = self.expr()?;
            arms.push(MatchArm { pattern, body });
        }
        let end = self.expect(&Token::RBrace)?;

        Ok(Spanned::new(
            Expr::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
            start.merge(end),
        ))
    }

    // ------------------------------------------------------------------
    // Patterns
    // ------------------------------------------------------------------

    fn pattern(&mut self) -> Result<Spanned<Pattern>> {
        match self.peek() {
            Some(Token::Underscore) => {
                let (_, span) = self.bump().unwrap();
                Ok(Spanned::new(Pattern::Discard, span))
            }
            Some(Token::LBrace) => {
                let (fields, span) = self.destructure_fields()?;
                Ok(Spanned::new(
                    Pattern::Destructure { ty: None, fields },
                    span,
                ))
            }
            Some(Token::Ident(_)) => {
                // `Name.Member` is a constant pattern; anything else starts
                // with a type reference.
                if self.peek2() == Some(&Token::Dot) {
                    return self.constant_pattern();
                }

                let ty = self.type_ref()?;
                match self.peek() {
                    Some(Token::Ident(_)) => {
                        let name = self.expect_ident()?;
                        let span = ty.span.merge(name.span);
                        Ok(Spanned::new(Pattern::Declaration { ty, name }, span))
                    }
                    Some(Token::LBrace) if !self.no_brace_pattern => {
                        let (fields, fspan) = self.destructure_fields()?;
                        let span = ty.span.merge(fspan);
                        Ok(Spanned::new(
                            Pattern::Destructure {
                                ty: Some(ty),
                                fields,
                            },
                            span,
                        ))
                    }
                    _ => {
                        let span = ty.span;
                        Ok(Spanned::new(Pattern::Type(ty), span))
                    }
                }
            }
            _ => Err(self.unexpected("expected pattern")),
        }
    }

    fn constant_pattern(&mut self) -> Result<Spanned<Pattern>> {
        let base = self.expect_ident()?;
        let mut expr = Spanned::new(Expr::Var(base.node), base.span);
        while self.eat(&Token::Dot) {
            let field = self.expect_ident()?;
            let span = expr.span.merge(field.span);
            expr = Spanned::new(
                Expr::Field {
                    recv: Box::new(expr),
                    field,
                },
                span,
            );
        }
        let span = expr.span;
        Ok(Spanned::new(Pattern::Constant(Box::new(expr)), span))
    }

    fn destructure_fields(&mut self) -> Result<(Vec<Spanned<String>>, Span)> {
        let start = self.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(&Token::RBrace) {
            if !fields.is_empty() {
                self.expect(&Token::Comma)?;
            }
            fields.push(self.expect_ident()?);
        }
        let end = self.expect(&Token::RBrace)?;
        Ok((fields, start.merge(end)))
    }
}
