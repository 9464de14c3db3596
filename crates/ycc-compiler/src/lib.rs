//! ycc compiler passes.
//!
//! Two passes run over the tree the parser produced, sharing the
//! [`ScopeEnvironment`](ycc_registry::ScopeEnvironment) it populated:
//!
//! - [`analysis`]: declares variables, checks static semantics and writes a
//!   type onto every expression node;
//! - [`codegen`]: lowers the annotated tree to textual IR, one `define` per
//!   method.
//!
//! Code generation assumes a clean analysis. The driver decides whether to
//! run it.

pub mod analysis;
pub mod codegen;

pub use analysis::{SemanticAnalyzer, analyze};
pub use codegen::{IrGenerator, generate};
