//! Semantic analysis.
//!
//! Walks the tree produced by the parser, declares fields, parameters and
//! locals into the [`ScopeEnvironment`], checks every expression and
//! records its type on the node. Errors go to the shared [`Diagnostics`];
//! the walk never stops early.
//!
//! The walk has two passes over the classes:
//!
//! 1. every field of every class (nested ones included) is declared, so
//!    method bodies can refer to fields declared after them;
//! 2. every method body is checked.

mod declarations;
mod expr_info;
mod expressions;
pub mod promotion;
mod statements;

pub use expr_info::{ExprContext, ExprInfo, ValueKind};

use tracing::debug;
use ycc_core::{Diagnostics, SemanticError, TypeId};
use ycc_parser::Program;
use ycc_parser::ast::{ClassDecl, Stmt};
use ycc_registry::ScopeEnvironment;

/// Checks one compilation unit against the environment the parser built.
pub struct SemanticAnalyzer<'a> {
    env: &'a mut ScopeEnvironment,
    diags: &'a mut Diagnostics,
    /// Enclosing loops of the statement being checked.
    loop_depth: u32,
    /// Enclosing switch statements of the statement being checked.
    switch_depth: u32,
    /// Declared result type of the method being checked.
    return_type: TypeId,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(env: &'a mut ScopeEnvironment, diags: &'a mut Diagnostics) -> Self {
        Self {
            env,
            diags,
            loop_depth: 0,
            switch_depth: 0,
            return_type: TypeId::VOID,
        }
    }

    /// Check the whole program. Returns `true` when no new error was
    /// reported.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(&mut self, program: &Program<'_>) -> bool {
        let errors_before = self.diags.error_count();

        for class in program.classes() {
            self.declare_fields(class);
        }
        for class in program.classes() {
            self.analyze_methods(class);
        }

        let found = self.diags.error_count() - errors_before;
        debug!(
            classes = program.classes().count(),
            errors = found,
            "semantic analysis finished"
        );
        found == 0
    }

    fn declare_fields(&mut self, class: &ClassDecl<'_>) {
        if self.env.enter_class(class.name.name).is_err() {
            return;
        }
        for item in class.body {
            match item {
                Stmt::VarDecl(decl) => self.analyze_var_decl(decl, true),
                Stmt::Class(inner) => self.declare_fields(inner),
                _ => {}
            }
        }
        self.env.leave_class();
    }

    fn analyze_methods(&mut self, class: &ClassDecl<'_>) {
        if self.env.enter_class(class.name.name).is_err() {
            return;
        }
        for item in class.body {
            match item {
                Stmt::Method(method) => self.analyze_method(method),
                Stmt::Class(inner) => self.analyze_methods(inner),
                _ => {}
            }
        }
        self.env.leave_class();
    }

    fn report(&mut self, error: SemanticError) {
        self.diags.report(&error);
    }

    /// Name of a type for messages.
    fn type_name(&self, ty: TypeId) -> String {
        self.env.type_name(ty).to_string()
    }

    /// Name of an expression's type for messages; `null` has no type.
    fn describe(&self, info: ExprInfo) -> String {
        if info.is_null() {
            "null".to_string()
        } else {
            self.type_name(info.ty)
        }
    }
}

/// Check a program with a fresh analyzer. Returns `true` when no error was
/// reported.
pub fn analyze(program: &Program<'_>, env: &mut ScopeEnvironment, diags: &mut Diagnostics) -> bool {
    SemanticAnalyzer::new(env, diags).analyze(program)
}

#[cfg(test)]
pub(crate) mod test_support {
    use bumpalo::Bump;
    use ycc_core::Diagnostics;
    use ycc_parser::{Parser, Program};
    use ycc_registry::ScopeEnvironment;

    /// Parse and analyze `source`, returning the rendered error messages
    /// without their file prefix.
    pub fn errors_of(source: &str) -> Vec<String> {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let mut diags = Diagnostics::new("T.java");
        let program = parse(source, &arena, &mut env);
        super::analyze(&program, &mut env, &mut diags);
        diags
            .iter()
            .map(|d| format!("{}: {}", d.span, d.message))
            .collect()
    }

    pub fn parse<'ast>(source: &str, arena: &'ast Bump, env: &mut ScopeEnvironment) -> Program<'ast> {
        match Parser::parse(source, arena, env) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected parse errors:\n{errors}"),
        }
    }
}
