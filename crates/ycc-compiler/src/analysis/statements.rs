//! Statement checking.

use ycc_core::{SemanticError, TypeId};
use ycc_parser::ast::{
    Block, DoWhileStmt, Expr, ForInit, ForStmt, IfStmt, ReturnStmt, Stmt, SwitchStmt, WhileStmt,
};

use super::promotion::{assignable, is_integral};
use super::{ExprContext, SemanticAnalyzer};

impl<'a> SemanticAnalyzer<'a> {
    pub(super) fn analyze_block(&mut self, block: &Block<'_>) {
        self.env.enter_block();
        self.analyze_stmts(block.stmts);
        self.env.leave_block();
    }

    /// Check a statement list. The first statement after one that never
    /// completes normally is reported once; the rest are still checked.
    fn analyze_stmts(&mut self, stmts: &[Stmt<'_>]) {
        let mut reachable = true;
        for stmt in stmts {
            if !reachable && !matches!(stmt, Stmt::Empty(_)) {
                self.report(SemanticError::Unreachable { span: stmt.span() });
                reachable = true;
            }
            self.analyze_stmt(*stmt);
            if ends_abruptly(*stmt) {
                reachable = false;
            }
        }
    }

    pub(super) fn analyze_stmt(&mut self, stmt: Stmt<'_>) {
        match stmt {
            Stmt::VarDecl(decl) => self.analyze_var_decl(decl, false),
            Stmt::Block(block) => self.analyze_block(block),
            Stmt::Expr(expr_stmt) => {
                self.analyze_expr(expr_stmt.expr, ExprContext::default());
            }
            Stmt::If(if_stmt) => self.analyze_if(if_stmt),
            Stmt::For(for_stmt) => self.analyze_for(for_stmt),
            Stmt::While(while_stmt) => self.analyze_while(while_stmt),
            Stmt::DoWhile(do_stmt) => self.analyze_do_while(do_stmt),
            Stmt::Switch(switch) => self.analyze_switch(switch),
            Stmt::Break(span) => {
                if self.loop_depth == 0 && self.switch_depth == 0 {
                    self.report(SemanticError::OutsideLoop {
                        keyword: "break",
                        span,
                    });
                }
            }
            Stmt::Continue(span) => {
                if self.loop_depth == 0 {
                    self.report(SemanticError::OutsideLoop {
                        keyword: "continue",
                        span,
                    });
                }
            }
            Stmt::Return(ret) => self.analyze_return(ret),
            // Declarations only appear at class level.
            Stmt::Class(_) | Stmt::Method(_) | Stmt::Empty(_) => {}
        }
    }

    /// A condition must be a boolean.
    fn check_condition(&mut self, cond: &Expr<'_>) {
        let info = self.analyze_expr(cond, ExprContext::default());
        if info.is_valid() && info.ty != TypeId::BOOLEAN {
            self.report(SemanticError::NotBoolean {
                found: self.describe(info),
                span: cond.span(),
            });
        }
    }

    fn analyze_if(&mut self, if_stmt: &IfStmt<'_>) {
        self.check_condition(if_stmt.cond);
        self.analyze_stmt(if_stmt.then_branch);
        if let Some(else_branch) = if_stmt.else_branch {
            self.analyze_stmt(else_branch);
        }
    }

    fn analyze_loop_body(&mut self, body: Stmt<'_>) {
        self.loop_depth += 1;
        self.analyze_stmt(body);
        self.loop_depth -= 1;
    }

    fn analyze_for(&mut self, for_stmt: &ForStmt<'_>) {
        // Variables declared in the header are scoped to the loop.
        self.env.enter_block();
        match for_stmt.init {
            Some(ForInit::VarDecl(decl)) => self.analyze_var_decl(decl, false),
            Some(ForInit::Exprs(exprs)) => {
                for expr in exprs {
                    self.analyze_expr(expr, ExprContext::default());
                }
            }
            None => {}
        }
        if let Some(cond) = for_stmt.cond {
            self.check_condition(cond);
        }
        for update in for_stmt.update {
            self.analyze_expr(update, ExprContext::default());
        }
        self.analyze_loop_body(for_stmt.body);
        self.env.leave_block();
    }

    fn analyze_while(&mut self, while_stmt: &WhileStmt<'_>) {
        self.check_condition(while_stmt.cond);
        self.analyze_loop_body(while_stmt.body);
    }

    fn analyze_do_while(&mut self, do_stmt: &DoWhileStmt<'_>) {
        self.analyze_loop_body(do_stmt.body);
        self.check_condition(do_stmt.cond);
    }

    fn analyze_switch(&mut self, switch: &SwitchStmt<'_>) {
        let selector = self.analyze_expr(switch.selector, ExprContext::default());
        if selector.is_valid() && !is_integral(selector.ty) {
            self.report(SemanticError::NotNumeric {
                found: self.describe(selector),
                span: switch.selector.span(),
            });
        }

        // All case groups share one scope.
        self.env.enter_block();
        self.switch_depth += 1;
        for case in switch.cases {
            if let Some(label) = case.label {
                let info = self.analyze_expr(label, ExprContext::default());
                if info.is_valid() && !is_integral(info.ty) {
                    self.report(SemanticError::NotNumeric {
                        found: self.describe(info),
                        span: label.span(),
                    });
                }
            }
            self.analyze_stmts(case.stmts);
        }
        self.switch_depth -= 1;
        self.env.leave_block();
    }

    fn analyze_return(&mut self, ret: &ReturnStmt<'_>) {
        let expected = self.return_type;
        match ret.value {
            Some(value) => {
                let info = self.analyze_expr(value, ExprContext::default());
                if expected == TypeId::VOID {
                    self.report(SemanticError::UnexpectedReturnValue { span: value.span() });
                } else if !assignable(self.env.types(), expected, info) {
                    self.report(SemanticError::TypeMismatch {
                        expected: self.type_name(expected),
                        found: self.describe(info),
                        span: value.span(),
                    });
                }
            }
            None if expected != TypeId::VOID => {
                self.report(SemanticError::MissingReturnValue {
                    expected: self.type_name(expected),
                    span: ret.span,
                });
            }
            None => {}
        }
    }
}

/// Whether control can never reach the statement that follows `stmt`.
fn ends_abruptly(stmt: Stmt<'_>) -> bool {
    match stmt {
        Stmt::Break(_) | Stmt::Continue(_) | Stmt::Return(_) => true,
        Stmt::Block(block) => block.stmts.iter().any(|s| ends_abruptly(*s)),
        Stmt::If(if_stmt) => if_stmt
            .else_branch
            .is_some_and(|else_branch| ends_abruptly(if_stmt.then_branch) && ends_abruptly(else_branch)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::test_support::errors_of;

    #[test]
    fn conditions_must_be_boolean() {
        let errors = errors_of("class A { void f(int n) { if (n) { } while (n + 1) { } } }");
        assert_eq!(
            errors,
            vec![
                "1:31: incompatible types: int cannot be converted to boolean",
                "1:45: incompatible types: int cannot be converted to boolean",
            ]
        );
    }

    #[test]
    fn break_and_continue_need_an_enclosing_loop() {
        let errors = errors_of("class A { void f() { break; } void g() { continue; } }");
        assert_eq!(
            errors,
            vec![
                "1:22: break outside switch or loop",
                "1:42: continue outside switch or loop",
            ]
        );
    }

    #[test]
    fn break_is_allowed_in_a_switch() {
        let source = "class A { void f(int n) { switch (n) { case 1: break; default: n = 2; } } }";
        assert!(errors_of(source).is_empty());
    }

    #[test]
    fn loops_accept_break_and_continue() {
        let source = "class A { void f() { for (int i = 0; i < 3; i++) { if (i == 1) continue; break; } \
                      int j = 0; do { j++; } while (j < 5); } }";
        assert!(errors_of(source).is_empty());
    }

    #[test]
    fn for_header_variables_leave_scope_with_the_loop() {
        let errors = errors_of("class A { void f() { for (int i = 0; i < 3; i++) { } i = 1; } }");
        assert_eq!(errors, vec!["1:54: cannot find variable 'i'"]);
    }

    #[test]
    fn return_values_are_checked_against_the_signature() {
        let errors = errors_of(
            "class A { void f() { return 1; } int g() { return; } int h() { return 2.0; } double k() { return 1; } }",
        );
        assert_eq!(
            errors,
            vec![
                "1:29: cannot return a value from a method whose result type is void",
                "1:44: missing return value in method returning int",
                "1:71: type mismatch: cannot convert from double to int",
            ]
        );
    }

    #[test]
    fn statements_after_a_jump_are_unreachable() {
        let errors = errors_of(
            "class A { int f(int n) { while (n > 0) { break; n = 1; } \
             if (n > 1) { return 1; } else { return 2; } return 3; } }",
        );
        assert_eq!(
            errors,
            vec!["1:49: unreachable statement", "1:102: unreachable statement"]
        );
    }

    #[test]
    fn case_groups_start_reachable() {
        let source = "class A { int f(int n) { switch (n) { case 1: return 1; case 2: n = 3; break; default: break; } return n; } }";
        assert!(errors_of(source).is_empty());
    }

    #[test]
    fn a_jump_inside_a_nested_block_ends_the_outer_sequence() {
        let errors = errors_of("class A { void f() { { return; } int x = 1; } }");
        assert_eq!(errors, vec!["1:34: unreachable statement"]);
    }
}
