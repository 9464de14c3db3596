//! Error types for every phase of the compiler.
//!
//! ```text
//! LexError         - scanner errors, recovered as Unreserved tokens
//! ParseError       - syntax errors (with ParseErrorKind)
//! ScopeError       - scope environment lookups and declarations
//! SemanticError    - static semantic violations, reported as diagnostics
//! GenerationError  - internal-consistency faults during IR generation
//! ```
//!
//! Messages never embed the location: diagnostics prefix it themselves.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors raised while scanning characters into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("unterminated character literal")]
    UnterminatedChar { span: Span },

    #[error("unterminated comment")]
    UnterminatedComment { span: Span },

    #[error("illegal escape character '\\{ch}'")]
    InvalidEscape { ch: char, span: Span },

    #[error("invalid number: {detail}")]
    InvalidNumber { detail: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedChar { span }
            | LexError::UnterminatedComment { span }
            | LexError::InvalidEscape { span, .. }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    ExpectedToken,
    UnexpectedToken,
    ExpectedExpression,
    ExpectedType,
    ExpectedIdentifier,
    ExpectedStatement,
    ExpectedClassMember,
    InvalidDeclaration,
    UnknownType,
    DuplicateDeclaration,
    InvalidLiteral,
    Lexical,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedStatement => "expected statement",
            ParseErrorKind::ExpectedClassMember => "expected class member",
            ParseErrorKind::InvalidDeclaration => "invalid declaration",
            ParseErrorKind::UnknownType => "unknown type",
            ParseErrorKind::DuplicateDeclaration => "duplicate declaration",
            ParseErrorKind::InvalidLiteral => "invalid literal",
            ParseErrorKind::Lexical => "lexical error",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A syntax error with its location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn expected_expression(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedExpression,
            span,
            format!("illegal start of expression: {found}"),
        )
    }

    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("<identifier> expected, found {found}"),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, err.span(), err.to_string())
    }
}

/// Every syntax error of one compilation unit, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", error.span, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Scope Errors
// ============================================================================

/// Failures signalled by the scope environment.
///
/// `UnresolvedSymbol` and `DuplicateSymbol` are ordinary user errors that the
/// analyzer turns into diagnostics. `UnknownScope` means a pass tried to enter
/// a class scope the parser never declared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("cannot find symbol '{name}'")]
    UnresolvedSymbol { name: String },

    #[error("'{name}' is already defined in this scope")]
    DuplicateSymbol { name: String },

    #[error("no scope named '{name}' below the current scope")]
    UnknownScope { name: String },
}

// ============================================================================
// Semantic Errors
// ============================================================================

/// Static semantic violations found by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("cannot find {kind} '{name}'")]
    UnresolvedSymbol {
        kind: &'static str,
        name: String,
        span: Span,
    },

    #[error("{kind} '{name}' is already defined in this scope")]
    DuplicateSymbol {
        kind: &'static str,
        name: String,
        span: Span,
    },

    #[error("type mismatch: cannot convert from {found} to {expected}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("left-hand side must be a variable")]
    NotAVariable { span: Span },

    #[error("method '{method}' expects {expected} argument(s) but {found} were given")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("argument type mismatch in call to '{method}': expected {expected}, found {found}")]
    ArgTypeMismatch {
        method: String,
        expected: String,
        found: String,
        span: Span,
    },

    #[error("incompatible operand types {left} and {right} for operator '{op}'")]
    IncompatibleOperands {
        op: &'static str,
        left: String,
        right: String,
        span: Span,
    },

    #[error("cannot convert {found} to int")]
    NotNumeric { found: String, span: Span },

    #[error("incompatible types: {found} cannot be converted to boolean")]
    NotBoolean { found: String, span: Span },

    #[error("array required, but {found} found")]
    NotAnArray { found: String, span: Span },

    #[error("'{name}' is not a class")]
    NotAClass { name: String, span: Span },

    #[error("missing return value in method returning {expected}")]
    MissingReturnValue { expected: String, span: Span },

    #[error("cannot return a value from a method whose result type is void")]
    UnexpectedReturnValue { span: Span },

    #[error("{keyword} outside switch or loop")]
    OutsideLoop { keyword: &'static str, span: Span },

    #[error("modifier '{modifier}' not allowed here")]
    IllegalModifier { modifier: &'static str, span: Span },

    #[error("illegal type '{name}' for a variable")]
    IllegalVariableType { name: String, span: Span },

    #[error("variable '{name}' might not have been initialized")]
    Uninitialized { name: String, span: Span },

    #[error("unreachable statement")]
    Unreachable { span: Span },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UnresolvedSymbol { span, .. }
            | SemanticError::DuplicateSymbol { span, .. }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::NotAVariable { span }
            | SemanticError::ArityMismatch { span, .. }
            | SemanticError::ArgTypeMismatch { span, .. }
            | SemanticError::IncompatibleOperands { span, .. }
            | SemanticError::NotNumeric { span, .. }
            | SemanticError::NotBoolean { span, .. }
            | SemanticError::NotAnArray { span, .. }
            | SemanticError::NotAClass { span, .. }
            | SemanticError::MissingReturnValue { span, .. }
            | SemanticError::UnexpectedReturnValue { span }
            | SemanticError::OutsideLoop { span, .. }
            | SemanticError::IllegalModifier { span, .. }
            | SemanticError::IllegalVariableType { span, .. }
            | SemanticError::Uninitialized { span, .. }
            | SemanticError::Unreachable { span } => *span,
        }
    }
}

// ============================================================================
// Generation Errors
// ============================================================================

/// Faults in IR generation. These only happen when the generator is handed
/// an AST the analyzer did not fully annotate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("internal error: expression has no type annotation")]
    MissingType { span: Span },

    #[error("internal error: no storage for '{name}'")]
    UnknownStorage { name: String, span: Span },

    #[error("internal error: {message}")]
    Internal { message: String, span: Span },
}

impl GenerationError {
    pub fn span(&self) -> Span {
        match self {
            GenerationError::MissingType { span }
            | GenerationError::UnknownStorage { span, .. }
            | GenerationError::Internal { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_errors_become_lexical_parse_errors() {
        let lex = LexError::UnterminatedString {
            span: Span::new(2, 9, 4),
        };
        let parse: ParseError = lex.into();
        assert_eq!(parse.kind, ParseErrorKind::Lexical);
        assert_eq!(parse.span, Span::new(2, 9, 4));
        assert_eq!(parse.message, "unterminated string literal");
    }

    #[test]
    fn parse_errors_display_one_per_line() {
        let mut errors = ParseErrors::new();
        errors.push(ParseError::expected_token(Span::point(1, 3), "';'", "'}'"));
        errors.push(ParseError::expected_identifier(Span::point(4, 1), "'('"));
        assert_eq!(
            errors.to_string(),
            "1:3: expected ';', found '}'\n4:1: <identifier> expected, found '('"
        );
    }

    #[test]
    fn semantic_messages_name_both_types() {
        let err = SemanticError::ArgTypeMismatch {
            method: "f".into(),
            expected: "double".into(),
            found: "int".into(),
            span: Span::point(3, 5),
        };
        assert_eq!(
            err.to_string(),
            "argument type mismatch in call to 'f': expected double, found int"
        );
        assert_eq!(err.span(), Span::point(3, 5));
    }
}
