//! Shared vocabulary of the ycc compiler: source spans, type ids, symbol
//! flags, error types and the diagnostics sink.

pub mod diagnostics;
pub mod error;
pub mod flags;
pub mod ids;
pub mod span;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{
    GenerationError, LexError, ParseError, ParseErrorKind, ParseErrors, ScopeError, SemanticError,
};
pub use flags::SymbolFlags;
pub use ids::TypeId;
pub use span::Span;
