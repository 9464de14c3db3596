//! Type registry and scope environment for ycc.
//!
//! The [`ScopeEnvironment`] is the one piece of state every compiler phase
//! shares: the parser declares classes and methods into it, the analyzer
//! declares variables and interns literals, and the IR generator reads it
//! back to name storage and emit the module prologue.

pub mod environment;
pub mod literals;
pub mod scope_tree;
pub mod symbol;
pub mod types;

pub use environment::ScopeEnvironment;
pub use literals::{LiteralId, LiteralPool, StringLiteral};
pub use scope_tree::{ScopeData, ScopeEdge, ScopeId, ScopeTree};
pub use symbol::{MethodInfo, Parameter, SymbolInfo};
pub use types::{POINTER_WIDTH, TypeEntry, TypeKind, TypeRegistry};
