//! Scanner and parser for the ycc language.
//!
//! [`Parser::parse`] turns source text into an arena-allocated [`Program`],
//! declaring classes and methods into the shared
//! [`ScopeEnvironment`](ycc_registry::ScopeEnvironment) on the way.

pub mod ast;
pub mod lexer;

pub use ast::{Parser, Program};
pub use ycc_core::{ParseError, ParseErrorKind, ParseErrors};
