//! Syntax tree and parser.
//!
//! All nodes are allocated in a [`bumpalo::Bump`] arena and borrow from it
//! for `'ast`. Expressions carry a type slot that the semantic analyzer
//! fills in; the tree is otherwise immutable once built.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use ycc_parser::Parser;
//! use ycc_registry::ScopeEnvironment;
//!
//! let arena = Bump::new();
//! let mut env = ScopeEnvironment::new();
//! let program = Parser::parse("class A { int f() { return 1; } }", &arena, &mut env).unwrap();
//! assert_eq!(program.items.len(), 1);
//! assert!(env.has_type("A"));
//! ```

pub mod expr;
pub mod ops;
pub mod stmt;

mod decl_parser;
mod expr_parser;
mod parser;
mod printer;
mod stmt_parser;

pub use expr::*;
pub use ops::*;
pub use parser::Parser;
pub use stmt::*;

use ycc_core::Span;

/// A parsed compilation unit: its top-level class declarations.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    pub items: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl<'ast> Program<'ast> {
    pub(crate) fn new(items: &'ast [Stmt<'ast>], span: Span) -> Self {
        Self { items, span }
    }

    /// Top-level classes in source order.
    pub fn classes(&self) -> impl Iterator<Item = &'ast ClassDecl<'ast>> + '_ {
        self.items.iter().filter_map(|item| match item {
            Stmt::Class(class) => Some(*class),
            _ => None,
        })
    }
}
