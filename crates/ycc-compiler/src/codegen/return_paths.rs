//! Whether every path through a method body ends in `return`.
//!
//! The check is structural and conservative: loops only count when their
//! condition is absent or the literal `true` and no `break` leaves them,
//! and a `switch` only counts when it has a `default` group, no `break`
//! and its last group returns.

use ycc_parser::ast::{Block, Expr, LiteralKind, Stmt};

#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnPaths;

impl ReturnPaths {
    pub fn new() -> Self {
        Self
    }

    pub fn all_paths_return(&self, body: &Block<'_>) -> bool {
        self.sequence_returns(body.stmts)
    }

    fn sequence_returns(&self, stmts: &[Stmt<'_>]) -> bool {
        stmts.iter().any(|stmt| self.stmt_returns(*stmt))
    }

    fn stmt_returns(&self, stmt: Stmt<'_>) -> bool {
        match stmt {
            Stmt::Return(_) => true,
            Stmt::Block(block) => self.sequence_returns(block.stmts),
            Stmt::If(if_stmt) => if_stmt
                .else_branch
                .is_some_and(|else_branch| {
                    self.stmt_returns(if_stmt.then_branch) && self.stmt_returns(else_branch)
                }),
            Stmt::While(while_stmt) => {
                is_true(while_stmt.cond) && !breaks_out(while_stmt.body)
            }
            Stmt::For(for_stmt) => {
                for_stmt.cond.is_none_or(is_true) && !breaks_out(for_stmt.body)
            }
            Stmt::DoWhile(do_stmt) => {
                !breaks_out(do_stmt.body)
                    && (self.stmt_returns(do_stmt.body) || is_true(do_stmt.cond))
            }
            Stmt::Switch(switch) => {
                let has_default = switch.cases.iter().any(|case| case.label.is_none());
                let breaks = switch
                    .cases
                    .iter()
                    .any(|case| case.stmts.iter().any(|stmt| breaks_out(*stmt)));
                has_default
                    && !breaks
                    && switch
                        .cases
                        .last()
                        .is_some_and(|case| self.sequence_returns(case.stmts))
            }
            _ => false,
        }
    }
}

fn is_true(expr: &Expr<'_>) -> bool {
    matches!(expr, Expr::Literal(lit) if lit.kind == LiteralKind::Bool(true))
}

/// A `break` in `stmt` that targets the statement enclosing it. Breaks
/// inside nested loops and switches target those instead.
fn breaks_out(stmt: Stmt<'_>) -> bool {
    match stmt {
        Stmt::Break(_) => true,
        Stmt::Block(block) => block.stmts.iter().any(|s| breaks_out(*s)),
        Stmt::If(if_stmt) => {
            breaks_out(if_stmt.then_branch) || if_stmt.else_branch.is_some_and(breaks_out)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use ycc_parser::Parser;
    use ycc_parser::ast::Stmt;
    use ycc_registry::ScopeEnvironment;

    use super::ReturnPaths;

    fn body_returns(body: &str) -> bool {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let source = format!("class A {{ int f(int n) {{ {body} }} }}");
        let program = Parser::parse(&source, &arena, &mut env).expect("parses");
        let Stmt::Class(class) = program.items[0] else {
            panic!("expected a class");
        };
        let Stmt::Method(method) = class.body[0] else {
            panic!("expected a method");
        };
        ReturnPaths::new().all_paths_return(method.body.expect("body"))
    }

    #[test]
    fn straight_line_return() {
        assert!(body_returns("n = n + 1; return n;"));
        assert!(!body_returns("n = n + 1;"));
    }

    #[test]
    fn if_needs_both_branches() {
        assert!(body_returns("if (n > 0) return 1; else { return 2; }"));
        assert!(!body_returns("if (n > 0) return 1;"));
    }

    #[test]
    fn infinite_loops_without_break_never_fall_through() {
        assert!(body_returns("while (true) { n++; }"));
        assert!(body_returns("for (;;) { }"));
        assert!(!body_returns("while (true) { if (n > 3) break; }"));
        assert!(!body_returns("while (n > 0) { return 1; }"));
    }

    #[test]
    fn nested_loop_breaks_do_not_escape() {
        assert!(body_returns("for (;;) { while (n > 0) { break; } }"));
    }

    #[test]
    fn switch_with_default_and_no_break() {
        assert!(body_returns("switch (n) { case 1: n++; default: return n; }"));
        assert!(!body_returns("switch (n) { case 1: return 1; }"));
        assert!(!body_returns("switch (n) { case 1: break; default: return n; }"));
    }
}
