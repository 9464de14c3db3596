//! IR generation.
//!
//! Lowers an analyzed program to LLVM-style textual IR. Every method with a
//! body becomes one `define`; the module prologue carries the opaque class
//! types, the string literal constants and one zero-initialized global per
//! class member (members have no receiver object, so each one is a module
//! global named by its qualified name).
//!
//! Generation relies on the annotations written by the analyzer and must
//! only run on a program that analyzed without errors.

mod allocate;
mod expressions;
mod frame;
mod function;
mod labels;
mod operand;
mod return_paths;
mod statements;
mod writer;

pub use frame::{LocalFrame, LocalSlot};
pub use function::EmittedFunction;
pub use labels::JumpTargets;
pub use operand::{Operand, Place, real_constant};
pub use return_paths::ReturnPaths;
pub use writer::IrWriter;

use rustc_hash::FxHashSet;
use tracing::debug;
use ycc_core::GenerationError;
use ycc_parser::Program;
use ycc_parser::ast::{ClassDecl, Stmt};
use ycc_registry::{ScopeEnvironment, TypeKind};

use function::{FunctionEmitter, internal};

/// Builds one IR module from an analyzed program.
pub struct IrGenerator<'a> {
    env: &'a mut ScopeEnvironment,
    module_name: String,
    functions: Vec<String>,
    uses_malloc: bool,
}

impl<'a> IrGenerator<'a> {
    pub fn new(env: &'a mut ScopeEnvironment, module_name: impl Into<String>) -> Self {
        Self {
            env,
            module_name: module_name.into(),
            functions: Vec::new(),
            uses_malloc: false,
        }
    }

    /// Emit every method and assemble the module text.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program<'_>) -> Result<String, GenerationError> {
        for class in program.classes() {
            self.generate_class(class)?;
        }
        debug!(
            module = %self.module_name,
            functions = self.functions.len(),
            "IR generation finished"
        );
        Ok(self.assemble())
    }

    fn generate_class(&mut self, class: &ClassDecl<'_>) -> Result<(), GenerationError> {
        self.env
            .enter_class(class.name.name)
            .map_err(|_| internal("class scope not found", class.name.span))?;
        let result = self.generate_members(class);
        self.env.leave_class();
        result
    }

    fn generate_members(&mut self, class: &ClassDecl<'_>) -> Result<(), GenerationError> {
        for item in class.body {
            match item {
                Stmt::Method(method) if method.body.is_some() => {
                    let emitted = FunctionEmitter::new(self.env).emit_method(method)?;
                    self.uses_malloc |= emitted.uses_malloc;
                    self.functions.push(emitted.text);
                }
                Stmt::Class(inner) => self.generate_class(inner)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn assemble(&self) -> String {
        let name = &self.module_name;
        let mut sections = vec![format!(
            "; ModuleID = '{name}'\nsource_filename = \"{name}\"\n"
        )];
        sections.push(self.class_types());
        sections.push(self.literal_constants());
        sections.push(self.globals());
        if self.uses_malloc {
            sections.push("declare i8* @malloc(i64)\n".to_string());
        }
        sections.extend(self.functions.iter().cloned());

        sections
            .into_iter()
            .filter(|section| !section.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn class_types(&self) -> String {
        self.env
            .types()
            .iter()
            .filter(|(id, entry)| entry.kind == TypeKind::Class && self.env.class_scope(*id).is_some())
            .map(|(_, entry)| format!("%{} = type opaque\n", entry.name))
            .collect()
    }

    fn literal_constants(&self) -> String {
        self.env
            .literals()
            .iter()
            .map(|lit| {
                format!(
                    "@{} = private unnamed_addr constant [{} x i8] c\"{}\", align 1\n",
                    lit.id, lit.length, lit.encoded
                )
            })
            .collect()
    }

    /// Member and static storage, first declaration wins.
    fn globals(&self) -> String {
        let types = self.env.types();
        let mut seen = FxHashSet::default();
        let mut out = String::new();
        for symbol in self.env.member_globals().iter().chain(self.env.statics()) {
            if !seen.insert(symbol.qualified_name.as_str()) {
                continue;
            }
            out.push_str(&format!(
                "@{} = internal global {} {}, align {}\n",
                symbol.qualified_name,
                types.ir_type(symbol.ty),
                types.zero_value(symbol.ty),
                types.align(symbol.ty)
            ));
        }
        out
    }
}

/// Generate the module for an analyzed program.
pub fn generate(
    program: &Program<'_>,
    env: &mut ScopeEnvironment,
    module_name: &str,
) -> Result<String, GenerationError> {
    IrGenerator::new(env, module_name).generate(program)
}
