//! Emission of one method into a `define` block.

use tracing::trace;
use ycc_core::{GenerationError, Span, TypeId};
use ycc_parser::ast::{Block, Expr, MethodDecl};
use ycc_registry::{MethodInfo, ScopeEnvironment};

use super::frame::LocalFrame;
use super::labels::JumpTargets;
use super::operand::{Operand, Place};
use super::return_paths::ReturnPaths;
use super::writer::IrWriter;

/// Text of one emitted function plus what the module prologue needs to
/// know about it.
#[derive(Debug)]
pub struct EmittedFunction {
    pub text: String,
    pub uses_malloc: bool,
}

/// Per-method emission state. A fresh emitter is built for every method so
/// the counter, slots and jump targets never leak between functions.
pub(super) struct FunctionEmitter<'e> {
    pub(super) env: &'e mut ScopeEnvironment,
    pub(super) writer: IrWriter,
    pub(super) frame: LocalFrame,
    pub(super) jumps: JumpTargets,
    pub(super) return_type: TypeId,
    pub(super) uses_malloc: bool,
}

impl<'e> FunctionEmitter<'e> {
    pub(super) fn new(env: &'e mut ScopeEnvironment) -> Self {
        Self {
            env,
            writer: IrWriter::new(),
            frame: LocalFrame::new(),
            jumps: JumpTargets::new(),
            return_type: TypeId::VOID,
            uses_malloc: false,
        }
    }

    pub(super) fn emit_method(mut self, method: &MethodDecl<'_>) -> Result<EmittedFunction, GenerationError> {
        let name = method.name.name;
        let Some(body) = method.body else {
            return Err(internal("method without a body", method.span));
        };
        let info = self
            .env
            .resolve_method(name)
            .map_err(|_| GenerationError::UnknownStorage {
                name: name.to_string(),
                span: method.name.span,
            })?;
        let symbol = function_symbol(info);
        let params: Vec<(String, TypeId)> = info.params.iter().map(|p| (p.name.clone(), p.ty)).collect();
        self.return_type = info.return_type();

        let is_entry = name == "main";
        let signature = if is_entry {
            String::new()
        } else {
            params
                .iter()
                .map(|(param, ty)| format!("{} %{param}", self.ir(*ty)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        trace!(function = %symbol, params = params.len(), "emit function");

        self.env
            .enter_method(name)
            .map_err(|_| internal("method scope not found", method.span))?;
        self.frame.push_scope();

        for (param, ty) in &params {
            let slot = self.frame.bind_param(param, *ty);
            let ir = self.ir(*ty);
            let align = self.env.types().align(*ty);
            self.writer.emit(format_args!("%{slot} = alloca {ir}, align {align}"));
        }
        self.allocate_locals(body);
        if !is_entry {
            for (param, ty) in &params {
                let place = Place::new(format!("%{}", LocalFrame::param_slot(param)), *ty);
                self.store(&Operand::constant(format!("%{param}")), &place);
            }
        }

        self.emit_block(body)?;
        self.finish_body(body);

        self.frame.pop_scope();
        self.env.leave_method();

        let ret = self.ir(self.return_type);
        let text = format!(
            "define {ret} @{symbol}({signature}) {{\n{}}}\n",
            self.writer.finish()
        );
        Ok(EmittedFunction {
            text,
            uses_malloc: self.uses_malloc,
        })
    }

    /// Close the body when control can fall off its end.
    fn finish_body(&mut self, body: &Block<'_>) {
        if self.writer.is_terminated() {
            return;
        }
        if self.return_type == TypeId::VOID {
            self.writer.ret_void();
        } else if ReturnPaths::new().all_paths_return(body) {
            self.writer.unreachable();
        } else {
            let ty = self.ir(self.return_type);
            let zero = Operand::constant(self.env.types().zero_value(self.return_type));
            self.writer.ret(&ty, &zero);
        }
    }

    // ========================================================================
    // Helpers shared by statement and expression emission
    // ========================================================================

    pub(super) fn ir(&self, ty: TypeId) -> String {
        self.env.types().ir_type(ty)
    }

    pub(super) fn type_of(&self, expr: &Expr<'_>) -> Result<TypeId, GenerationError> {
        expr.ty()
            .ok_or(GenerationError::MissingType { span: expr.span() })
    }

    pub(super) fn load(&mut self, place: &Place) -> Operand {
        let ty = self.ir(place.ty);
        let align = self.env.types().align(place.ty);
        self.writer
            .value(format_args!("load {ty}, {ty}* {}, align {align}", place.ptr))
    }

    pub(super) fn store(&mut self, value: &Operand, place: &Place) {
        let ty = self.ir(place.ty);
        let align = self.env.types().align(place.ty);
        self.writer
            .emit(format_args!("store {ty} {value}, {ty}* {}, align {align}", place.ptr));
    }

    /// Storage of a name: the innermost local binding, otherwise the
    /// module global of a member or static.
    pub(super) fn place_of_name(&self, name: &str, span: Span) -> Result<Place, GenerationError> {
        if let Some(local) = self.frame.lookup(name) {
            return Ok(Place::new(format!("%{}", local.slot), local.ty));
        }
        let symbol = self
            .env
            .resolve_variable(name, true)
            .map_err(|_| GenerationError::UnknownStorage {
                name: name.to_string(),
                span,
            })?;
        Ok(Place::new(format!("@{}", symbol.qualified_name), symbol.ty))
    }
}

/// Symbol a method is defined and called under. `main` keeps its plain name
/// so the module has a conventional entry point.
pub(super) fn function_symbol(method: &MethodInfo) -> String {
    let qualified = method.qualified_name();
    if qualified == "main" || qualified.ends_with(".main") {
        "main".to_string()
    } else {
        qualified.to_string()
    }
}

pub(super) fn internal(message: &str, span: Span) -> GenerationError {
    GenerationError::Internal {
        message: message.to_string(),
        span,
    }
}
