//! Statement emission and control-flow lowering.
//!
//! Every construct takes all of its labels from the counter before any of
//! its parts are emitted:
//!
//! ```text
//! if/else   then, else, end
//! for       cond, body, update, end     continue -> update
//! while     cond, body, end             continue -> cond
//! do/while  body, cond, end             continue -> cond
//! switch    one per case body, one per extra test, end
//! ```

use ycc_core::GenerationError;
use ycc_parser::ast::{
    Block, DoWhileStmt, Expr, ForInit, ForStmt, IfStmt, ReturnStmt, Stmt, SwitchStmt, VarDecl,
    WhileStmt,
};

use super::function::FunctionEmitter;
use super::operand::{Operand, Place};

type Result<T> = std::result::Result<T, GenerationError>;

impl<'e> FunctionEmitter<'e> {
    pub(super) fn emit_block(&mut self, block: &Block<'_>) -> Result<()> {
        self.frame.push_scope();
        for stmt in block.stmts {
            self.emit_stmt(*stmt)?;
        }
        self.frame.pop_scope();
        Ok(())
    }

    pub(super) fn emit_stmt(&mut self, stmt: Stmt<'_>) -> Result<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.emit_local_decl(decl),
            Stmt::Block(block) => self.emit_block(block),
            Stmt::Expr(expr_stmt) => self.emit_expr_stmt(expr_stmt.expr),
            Stmt::If(if_stmt) => self.emit_if(if_stmt),
            Stmt::For(for_stmt) => self.emit_for(for_stmt),
            Stmt::While(while_stmt) => self.emit_while(while_stmt),
            Stmt::DoWhile(do_stmt) => self.emit_do_while(do_stmt),
            Stmt::Switch(switch) => self.emit_switch(switch),
            Stmt::Break(span) => {
                let target = self.jumps.break_target(span)?;
                self.writer.br(target);
                Ok(())
            }
            Stmt::Continue(span) => {
                let target = self.jumps.continue_target(span)?;
                self.writer.br(target);
                Ok(())
            }
            Stmt::Return(ret) => self.emit_return(ret),
            Stmt::Class(_) | Stmt::Method(_) | Stmt::Empty(_) => Ok(()),
        }
    }

    fn emit_local_decl(&mut self, decl: &VarDecl<'_>) -> Result<()> {
        for declarator in decl.declarators {
            let slot = self
                .frame
                .bind(declarator.name.name, declarator.name.span, declarator.ty)?;
            let place = Place::new(format!("%{slot}"), declarator.ty);

            if let Some(init) = declarator.init {
                let value = self.emit_expr(init)?;
                let value = self.convert(value, self.type_of(init)?, declarator.ty);
                self.store(&value, &place);
            } else if let Some(length) = declarator.array_size {
                let array = self.allocate_array(declarator.ty, Operand::constant(length.to_string()))?;
                self.store(&array, &place);
            }
        }
        Ok(())
    }

    /// An expression whose value is dropped. Calls are emitted without a
    /// result register.
    fn emit_expr_stmt(&mut self, expr: &Expr<'_>) -> Result<()> {
        match *expr {
            Expr::Call(call) => {
                self.emit_call(call, None, true)?;
            }
            Expr::Qualified(qualified) if matches!(qualified.right, Expr::Call(_)) => {
                if let Expr::Call(call) = *qualified.right {
                    let class = self.type_of(qualified.left)?;
                    self.emit_call(call, Some(class), true)?;
                }
            }
            _ => {
                self.emit_expr(expr)?;
            }
        }
        Ok(())
    }

    fn emit_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        let cond = self.emit_expr(if_stmt.cond)?;

        match if_stmt.else_branch {
            Some(else_branch) => {
                let then_label = self.writer.fresh();
                let else_label = self.writer.fresh();
                let end = self.writer.fresh();
                self.writer.cond_br(&cond, then_label, else_label);

                self.writer.label(then_label);
                self.emit_stmt(if_stmt.then_branch)?;
                self.writer.br(end);

                self.writer.label(else_label);
                self.emit_stmt(else_branch)?;
                self.writer.br(end);

                self.writer.label(end);
            }
            None => {
                let then_label = self.writer.fresh();
                let end = self.writer.fresh();
                self.writer.cond_br(&cond, then_label, end);

                self.writer.label(then_label);
                self.emit_stmt(if_stmt.then_branch)?;
                self.writer.br(end);

                self.writer.label(end);
            }
        }
        Ok(())
    }

    fn emit_for(&mut self, for_stmt: &ForStmt<'_>) -> Result<()> {
        let cond_label = self.writer.fresh();
        let body_label = self.writer.fresh();
        let update_label = self.writer.fresh();
        let end = self.writer.fresh();

        self.frame.push_scope();
        match for_stmt.init {
            Some(ForInit::VarDecl(decl)) => self.emit_local_decl(decl)?,
            Some(ForInit::Exprs(exprs)) => {
                for expr in exprs {
                    self.emit_expr_stmt(expr)?;
                }
            }
            None => {}
        }
        self.writer.br(cond_label);

        self.writer.label(cond_label);
        match for_stmt.cond {
            Some(cond) => {
                let cond = self.emit_expr(cond)?;
                self.writer.cond_br(&cond, body_label, end);
            }
            None => self.writer.br(body_label),
        }

        self.writer.label(body_label);
        self.jumps.enter_loop(end, update_label);
        self.emit_stmt(for_stmt.body)?;
        self.jumps.exit_loop();
        self.writer.br(update_label);

        self.writer.label(update_label);
        for update in for_stmt.update {
            self.emit_expr_stmt(update)?;
        }
        self.writer.br(cond_label);

        self.writer.label(end);
        self.frame.pop_scope();
        Ok(())
    }

    fn emit_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<()> {
        let cond_label = self.writer.fresh();
        let body_label = self.writer.fresh();
        let end = self.writer.fresh();

        self.writer.br(cond_label);
        self.writer.label(cond_label);
        let cond = self.emit_expr(while_stmt.cond)?;
        self.writer.cond_br(&cond, body_label, end);

        self.writer.label(body_label);
        self.jumps.enter_loop(end, cond_label);
        self.emit_stmt(while_stmt.body)?;
        self.jumps.exit_loop();
        self.writer.br(cond_label);

        self.writer.label(end);
        Ok(())
    }

    fn emit_do_while(&mut self, do_stmt: &DoWhileStmt<'_>) -> Result<()> {
        let body_label = self.writer.fresh();
        let cond_label = self.writer.fresh();
        let end = self.writer.fresh();

        self.writer.br(body_label);
        self.writer.label(body_label);
        self.jumps.enter_loop(end, cond_label);
        self.emit_stmt(do_stmt.body)?;
        self.jumps.exit_loop();
        self.writer.br(cond_label);

        self.writer.label(cond_label);
        let cond = self.emit_expr(do_stmt.cond)?;
        self.writer.cond_br(&cond, body_label, end);

        self.writer.label(end);
        Ok(())
    }

    /// Lower a switch to a chain of equality tests. Case bodies are laid
    /// out in source order and fall through into the next one.
    fn emit_switch(&mut self, switch: &SwitchStmt<'_>) -> Result<()> {
        let selector_ty = self.type_of(switch.selector)?;
        let selector = self.emit_expr(switch.selector)?;
        let ty = self.ir(selector_ty);

        let bodies: Vec<u32> = switch.cases.iter().map(|_| self.writer.fresh()).collect();
        let tested: Vec<(usize, &Expr<'_>)> = switch
            .cases
            .iter()
            .enumerate()
            .filter_map(|(i, case)| case.label.map(|label| (i, label)))
            .collect();
        let tests: Vec<u32> = tested.iter().skip(1).map(|_| self.writer.fresh()).collect();
        let end = self.writer.fresh();
        let fallback = switch
            .cases
            .iter()
            .position(|case| case.label.is_none())
            .map_or(end, |i| bodies[i]);

        if tested.is_empty() {
            self.writer.br(fallback);
        }
        for (k, (case_index, label)) in tested.iter().enumerate() {
            if k > 0 {
                self.writer.label(tests[k - 1]);
            }
            let value = self.emit_expr(label)?;
            let value = self.convert(value, self.type_of(label)?, selector_ty);
            let hit = self
                .writer
                .value(format_args!("icmp eq {ty} {selector}, {value}"));
            let miss = tests.get(k).copied().unwrap_or(fallback);
            self.writer.cond_br(&hit, bodies[*case_index], miss);
        }

        self.jumps.enter_switch(end);
        self.frame.push_scope();
        for (i, case) in switch.cases.iter().enumerate() {
            self.writer.label(bodies[i]);
            for stmt in case.stmts {
                self.emit_stmt(*stmt)?;
            }
            self.writer.br(bodies.get(i + 1).copied().unwrap_or(end));
        }
        self.frame.pop_scope();
        self.jumps.exit_switch();

        self.writer.label(end);
        Ok(())
    }

    fn emit_return(&mut self, ret: &ReturnStmt<'_>) -> Result<()> {
        match ret.value {
            Some(value) => {
                let operand = self.emit_expr(value)?;
                let operand = self.convert(operand, self.type_of(value)?, self.return_type);
                let ty = self.ir(self.return_type);
                self.writer.ret(&ty, &operand);
            }
            None => self.writer.ret_void(),
        }
        Ok(())
    }
}
