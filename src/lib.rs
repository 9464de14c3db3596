//! # ycc
//!
//! Compiler front end for a small Java-like language. One compilation unit
//! goes in, one LLVM-style textual IR module comes out.
//!
//! The pipeline is strictly sequential and shares one
//! [`ScopeEnvironment`] and one [`Diagnostics`] sink:
//!
//! 1. the parser scans the source, declares classes and methods and builds
//!    the syntax tree;
//! 2. semantic analysis declares variables and annotates every expression
//!    with its type;
//! 3. if no error was reported so far, IR generation lowers the tree.
//!
//! ```
//! use ycc::{CompileOptions, compile};
//!
//! let output = compile(
//!     "class A { int add(int a, int b) { return a + b; } }",
//!     &CompileOptions::new("A.java"),
//! );
//! assert!(output.diagnostics.is_empty());
//! assert!(output.ir.unwrap().contains("define i32 @A.add(i32 %a, i32 %b)"));
//! ```

pub mod cli;

use bumpalo::Bump;
use thiserror::Error;
use tracing::{debug, trace};

pub use ycc_core::{Diagnostic, Diagnostics, Severity, Span, TypeId};
pub use ycc_registry::ScopeEnvironment;

/// Settings of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name used in diagnostics and as the IR module id.
    pub file_name: String,
}

impl CompileOptions {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::new("<input>")
    }
}

/// What a compilation produced.
#[derive(Debug)]
pub struct CompileOutput {
    /// The IR module; `None` when any error was reported.
    pub ir: Option<String>,
    /// Every message, in the order the passes found them.
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn succeeded(&self) -> bool {
        self.ir.is_some() && !self.diagnostics.has_errors()
    }

    /// The IR, or an error carrying the rendered diagnostics.
    pub fn into_result(self) -> Result<String, CompileError> {
        match self.ir {
            Some(ir) if !self.diagnostics.has_errors() => Ok(ir),
            _ => Err(CompileError::Failed {
                errors: self.diagnostics.error_count(),
                rendered: self.diagnostics.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("compilation failed with {errors} error(s)\n{rendered}")]
    Failed { errors: usize, rendered: String },
}

/// Compile one source text.
///
/// Generation only runs when parsing and analysis reported no error.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile(source: &str, options: &CompileOptions) -> CompileOutput {
    let arena = Bump::new();
    let mut env = ScopeEnvironment::new();
    let mut diagnostics = Diagnostics::new(options.file_name.clone());

    let program = match ycc_parser::Parser::parse(source, &arena, &mut env) {
        Ok(program) => program,
        Err(errors) => {
            for error in errors.iter() {
                diagnostics.report(error);
            }
            debug!(errors = diagnostics.error_count(), "parsing failed");
            return CompileOutput {
                ir: None,
                diagnostics,
            };
        }
    };

    trace!("syntax tree:\n{program}");

    ycc_compiler::analyze(&program, &mut env, &mut diagnostics);
    trace!("environment after analysis:\n{env}");
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "skipping IR generation");
        return CompileOutput {
            ir: None,
            diagnostics,
        };
    }

    let ir = match ycc_compiler::generate(&program, &mut env, &options.file_name) {
        Ok(ir) => Some(ir),
        Err(error) => {
            diagnostics.report(&error);
            None
        }
    };
    CompileOutput { ir, diagnostics }
}
