//! Located compiler messages, collected over a whole compilation.
//!
//! Every phase appends to one [`Diagnostics`] value owned by the driver.
//! Nothing is printed while compiling; the driver renders the collected
//! messages once, in discovery order, after the last pass.

use std::fmt;

use crate::Span;
use crate::error::{GenerationError, ParseError, SemanticError};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Suspicious code that still compiles.
    Warning,
    /// Code that is rejected. Any error fails the compilation.
    Error,
    /// Extra context attached to a preceding message.
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Note => "note",
        })
    }
}

/// One compiler message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            span,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic::new(Severity::Error, err.span, err.message.clone())
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(err: &SemanticError) -> Self {
        Diagnostic::new(Severity::Error, err.span(), err.to_string())
    }
}

impl From<&GenerationError> for Diagnostic {
    fn from(err: &GenerationError) -> Self {
        Diagnostic::new(Severity::Error, err.span(), err.to_string())
    }
}

/// Append-only sink of diagnostics for one compilation unit.
///
/// # Example
///
/// ```
/// use ycc_core::{Diagnostics, Span};
///
/// let mut diags = Diagnostics::new("Main.java");
/// diags.error(Span::point(3, 9), "cannot find variable 'y'");
/// assert!(diags.has_errors());
/// assert_eq!(diags.to_string(), "Main.java:3:9: error: cannot find variable 'y'\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    file: String,
    entries: Vec<Diagnostic>,
    error_count: usize,
}

impl Diagnostics {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            entries: Vec::new(),
            error_count: 0,
        }
    }

    /// The compilation unit name printed in front of every location.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.error_count += 1;
        }
        self.entries.push(diagnostic);
    }

    /// Record anything convertible into a diagnostic, such as a
    /// [`SemanticError`] or a [`ParseError`].
    pub fn report<'e, E>(&mut self, err: &'e E)
    where
        Diagnostic: From<&'e E>,
    {
        self.push(Diagnostic::from(err));
    }

    pub fn error(&mut self, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Error, span, message));
    }

    pub fn warning(&mut self, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, span, message));
    }

    pub fn note(&mut self, span: Span, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Note, span, message));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Take every message in insertion order, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        std::mem::take(&mut self.entries)
    }

    /// Render one message as `file:line:col: severity: message`.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        format!(
            "{}:{}: {}: {}",
            self.file, diagnostic.span, diagnostic.severity, diagnostic.message
        )
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "{}", self.render(diagnostic))?;
        }
        Ok(())
    }
}
