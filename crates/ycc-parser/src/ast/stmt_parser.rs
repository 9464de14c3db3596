//! Statement parsing.

use bumpalo::collections::Vec as BVec;
use ycc_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::expr::Expr;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

impl<'ast, 'env> Parser<'ast, 'env> {
    pub(super) fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = *self.peek();
        match token.kind {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                self.advance();
                let end = self.expect(TokenKind::Semicolon)?.span;
                Ok(Stmt::Break(token.span.to(end)))
            }
            TokenKind::Continue => {
                self.advance();
                let end = self.expect(TokenKind::Semicolon)?.span;
                Ok(Stmt::Continue(token.span.to(end)))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(token.span))
            }
            TokenKind::Class => Err(ParseError::new(
                ParseErrorKind::ExpectedStatement,
                token.span,
                "local classes are not supported",
            )),
            _ if self.is_var_decl() => self.parse_local_var_decl(),
            _ => self.parse_expr_stmt(),
        }
    }

    /// `{ statement* }`
    pub(super) fn parse_block(&mut self) -> Result<&'ast Block<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let stmts = self.parse_statement_list(Self::parse_statement, &[TokenKind::RightBrace]);
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(self.arena.alloc(Block {
            stmts,
            span: open.span.to(close.span),
        }))
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let expr = self.parse_expr(0)?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Expr(self.arena.alloc(ExprStmt {
            expr,
            span: expr.span().to(end),
        })))
    }

    fn parse_condition(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let cond = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;
        Ok(cond)
    }

    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.advance().span;
        let cond = self.parse_condition()?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_statement()?)
        } else {
            None
        };
        let end = else_branch.unwrap_or(then_branch).span();
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            cond,
            then_branch,
            else_branch,
            span: start.to(end),
        })))
    }

    /// `for (init?; cond?; update?) body` where `init` is a declaration or
    /// a comma-separated expression list.
    fn parse_for(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.advance().span;
        self.expect(TokenKind::LeftParen)?;

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else if self.is_var_decl() {
            Some(ForInit::VarDecl(self.parse_var_decl()?))
        } else {
            Some(ForInit::Exprs(self.parse_expr_list(TokenKind::Semicolon)?))
        };
        self.expect(TokenKind::Semicolon)?;

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = self.parse_expr_list(TokenKind::RightParen)?;
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_statement()?;
        Ok(Stmt::For(self.arena.alloc(ForStmt {
            init,
            cond,
            update,
            body,
            span: start.to(body.span()),
        })))
    }

    /// Comma-separated expressions, possibly empty when `end` follows.
    fn parse_expr_list(&mut self, end: TokenKind) -> Result<&'ast [&'ast Expr<'ast>], ParseError> {
        let mut exprs = BVec::new_in(self.arena);
        if !self.check(end) {
            loop {
                exprs.push(self.parse_expr(0)?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        Ok(exprs.into_bump_slice())
    }

    fn parse_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.advance().span;
        let cond = self.parse_condition()?;
        let body = self.parse_statement()?;
        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            cond,
            body,
            span: start.to(body.span()),
        })))
    }

    fn parse_do_while(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.advance().span;
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        let cond = self.parse_condition()?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            cond,
            span: start.to(end),
        })))
    }

    /// `switch (selector) { (case label: | default:) statement* }`
    fn parse_switch(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.advance().span;
        let selector = self.parse_condition()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut cases = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let case_start = self.peek().span;
            let label = if self.eat(TokenKind::Default).is_some() {
                None
            } else {
                self.expect(TokenKind::Case)?;
                Some(self.parse_expr(0)?)
            };
            let colon = self.expect(TokenKind::Colon)?;
            let stmts = self.parse_statement_list(
                Self::parse_statement,
                &[TokenKind::Case, TokenKind::Default, TokenKind::RightBrace],
            );
            let end = stmts.last().map_or(colon.span, |s| s.span());
            cases.push(SwitchCase {
                label,
                stmts,
                span: case_start.to(end),
            });
        }
        let end = self.expect(TokenKind::RightBrace)?.span;

        Ok(Stmt::Switch(self.arena.alloc(SwitchStmt {
            selector,
            cases: cases.into_bump_slice(),
            span: start.to(end),
        })))
    }

    fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.advance().span;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Return(self.arena.alloc(ReturnStmt {
            value,
            span: start.to(end),
        })))
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use ycc_registry::ScopeEnvironment;

    use crate::Parser;
    use crate::ast::*;

    /// Parse `body` as the body of `void m()` in class `T` and return its
    /// statements.
    fn body<'a>(source: &str, arena: &'a Bump) -> &'a [Stmt<'a>] {
        let mut env = ScopeEnvironment::new();
        let text = format!("class T {{ void m() {{ {source} }} }}");
        let program = Parser::parse(&text, arena, &mut env).unwrap();
        let Stmt::Class(class) = program.items[0] else {
            panic!("expected class");
        };
        let Stmt::Method(method) = class.body[0] else {
            panic!("expected method");
        };
        method.body.unwrap().stmts
    }

    #[test]
    fn if_else_chains() {
        let arena = Bump::new();
        let stmts = body("if (a) x = 1; else if (b) x = 2; else x = 3;", &arena);
        let Stmt::If(outer) = stmts[0] else {
            panic!("expected if");
        };
        assert!(matches!(outer.else_branch, Some(Stmt::If(_))));
    }

    #[test]
    fn for_with_declaration_init() {
        let arena = Bump::new();
        let stmts = body("for (int i = 0; i < 10; i++) { }", &arena);
        let Stmt::For(stmt) = stmts[0] else {
            panic!("expected for");
        };
        assert!(matches!(stmt.init, Some(ForInit::VarDecl(_))));
        assert!(stmt.cond.is_some());
        assert_eq!(stmt.update.len(), 1);
    }

    #[test]
    fn for_with_empty_clauses() {
        let arena = Bump::new();
        let stmts = body("for (;;) break;", &arena);
        let Stmt::For(stmt) = stmts[0] else {
            panic!("expected for");
        };
        assert!(stmt.init.is_none());
        assert!(stmt.cond.is_none());
        assert!(stmt.update.is_empty());
        assert!(matches!(stmt.body, Stmt::Break(_)));
    }

    #[test]
    fn switch_cases_collect_their_statements() {
        let arena = Bump::new();
        let stmts = body(
            "switch (k) { case 1: a = 1; break; case 2: default: a = 0; }",
            &arena,
        );
        let Stmt::Switch(stmt) = stmts[0] else {
            panic!("expected switch");
        };
        assert_eq!(stmt.cases.len(), 3);
        assert_eq!(stmt.cases[0].stmts.len(), 2);
        assert!(stmt.cases[1].stmts.is_empty());
        assert!(stmt.cases[2].label.is_none());
    }

    #[test]
    fn local_declarations_and_expressions_are_told_apart() {
        let arena = Bump::new();
        let stmts = body("Foo f; Foo[] g; h[0] = 1; int a, b = 2;", &arena);
        assert!(matches!(stmts[0], Stmt::VarDecl(_)));
        assert!(matches!(stmts[1], Stmt::VarDecl(_)));
        assert!(matches!(stmts[2], Stmt::Expr(_)));
        let Stmt::VarDecl(decl) = stmts[3] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.declarators.len(), 2);
        assert!(decl.declarators[1].init.is_some());
    }

    #[test]
    fn do_while_needs_trailing_semicolon() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let errors = Parser::parse("class T { void m() { do { } while (x) } }", &arena, &mut env)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.iter().next().unwrap().message,
            "expected ';', found '}'"
        );
    }
}
