//! Slot allocation pass.
//!
//! Before a body is emitted, every local it declares gets an `alloca` at
//! the top of the function. Slots are reserved in the [`LocalFrame`] by
//! declaration, so names declared on different paths never share one.
//!
//! [`LocalFrame`]: super::frame::LocalFrame

use ycc_parser::ast::{Block, ForInit, Stmt, VarDecl};

use super::function::FunctionEmitter;

impl<'e> FunctionEmitter<'e> {
    pub(super) fn allocate_locals(&mut self, body: &Block<'_>) {
        self.allocate_block(body);
    }

    fn allocate_block(&mut self, block: &Block<'_>) {
        for stmt in block.stmts {
            self.allocate_stmt(*stmt);
        }
    }

    fn allocate_stmt(&mut self, stmt: Stmt<'_>) {
        match stmt {
            Stmt::VarDecl(decl) => self.allocate_decl(decl),
            Stmt::Block(block) => self.allocate_block(block),
            Stmt::If(if_stmt) => {
                self.allocate_stmt(if_stmt.then_branch);
                if let Some(else_branch) = if_stmt.else_branch {
                    self.allocate_stmt(else_branch);
                }
            }
            Stmt::For(for_stmt) => {
                if let Some(ForInit::VarDecl(decl)) = for_stmt.init {
                    self.allocate_decl(decl);
                }
                self.allocate_stmt(for_stmt.body);
            }
            Stmt::While(while_stmt) => self.allocate_stmt(while_stmt.body),
            Stmt::DoWhile(do_stmt) => self.allocate_stmt(do_stmt.body),
            Stmt::Switch(switch) => {
                for case in switch.cases {
                    for stmt in case.stmts {
                        self.allocate_stmt(*stmt);
                    }
                }
            }
            _ => {}
        }
    }

    fn allocate_decl(&mut self, decl: &VarDecl<'_>) {
        for declarator in decl.declarators {
            let slot = self.frame.reserve(declarator.name.name, declarator.name.span);
            let ir = self.ir(declarator.ty);
            let align = self.env.types().align(declarator.ty);
            self.writer.emit(format_args!("%{slot} = alloca {ir}, align {align}"));
        }
    }
}
