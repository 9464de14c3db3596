//! Expression emission.
//!
//! Values are produced left to right. Operands of a binary operator are
//! converted to the operator's working type before the instruction, and
//! values flowing into a slot, a parameter or a return are converted to
//! the destination type.

use ycc_core::{GenerationError, Span, SymbolFlags, TypeId};
use ycc_parser::ast::{
    ArrayExpr, AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, IndexExpr, LiteralExpr,
    LiteralKind, NewExpr, OpCategory, PostfixExpr, PostfixOp, QualifiedExpr, TernaryExpr,
    UnaryExpr, UnaryOp,
};

use super::function::{FunctionEmitter, function_symbol, internal};
use super::operand::{Operand, Place, real_constant};
use crate::analysis::promotion::promote;

type Result<T> = std::result::Result<T, GenerationError>;

impl<'e> FunctionEmitter<'e> {
    pub(super) fn emit_expr(&mut self, expr: &Expr<'_>) -> Result<Operand> {
        match *expr {
            Expr::Ident(ident) => {
                let place = self.place_of_name(ident.ident.name, ident.ident.span)?;
                Ok(self.load(&place))
            }
            Expr::Literal(lit) => self.emit_literal(lit),
            Expr::New(new) => self.emit_new(new, expr),
            Expr::Index(index) => {
                let place = self.index_place(index)?;
                Ok(self.load(&place))
            }
            Expr::Call(call) => Ok(self
                .emit_call(call, None, false)?
                .unwrap_or_else(|| Operand::constant("undef"))),
            Expr::Qualified(qualified) => self.emit_qualified(qualified),
            Expr::Array(array) => self.emit_array_literal(array, expr),
            Expr::Unary(unary) => self.emit_unary(unary),
            Expr::Postfix(postfix) => self.emit_postfix(postfix),
            Expr::Binary(binary) => self.emit_binary(binary, expr),
            Expr::Assign(assign) => self.emit_assign(assign),
            Expr::Ternary(ternary) => self.emit_ternary(ternary, expr),
        }
    }

    fn emit_literal(&mut self, lit: &LiteralExpr<'_>) -> Result<Operand> {
        let text = match lit.kind {
            LiteralKind::Int { value, .. } => value.to_string(),
            LiteralKind::Real(value) => real_constant(value),
            LiteralKind::Bool(value) => value.to_string(),
            LiteralKind::Null => "null".to_string(),
            LiteralKind::Str(_) => {
                let entry = lit
                    .interned
                    .get()
                    .and_then(|id| self.env.literals().get(id))
                    .ok_or_else(|| internal("string literal was not interned", lit.span))?;
                let array = format!("[{} x i8]", entry.length);
                format!("getelementptr inbounds ({array}, {array}* @{}, i64 0, i64 0)", entry.id)
            }
        };
        Ok(Operand::constant(text))
    }

    // ========================================================================
    // Storage
    // ========================================================================

    /// Address of an assignable expression.
    pub(super) fn place_of(&mut self, expr: &Expr<'_>) -> Result<Place> {
        match *expr {
            Expr::Ident(ident) => self.place_of_name(ident.ident.name, ident.ident.span),
            Expr::Index(index) => self.index_place(index),
            Expr::Qualified(qualified) => match *qualified.right {
                Expr::Ident(member) => self.member_place(qualified, member.ident.name, member.ident.span),
                _ => Err(internal("expression is not assignable", expr.span())),
            },
            _ => Err(internal("expression is not assignable", expr.span())),
        }
    }

    fn index_place(&mut self, index: &IndexExpr<'_>) -> Result<Place> {
        let base_ty = self.type_of(index.base)?;
        let element = self
            .env
            .types()
            .element(base_ty)
            .ok_or_else(|| internal("indexed value is not an array", index.span))?;
        let index_ty = self.type_of(index.index)?;

        let base = self.emit_expr(index.base)?;
        let position = self.emit_expr(index.index)?;
        let elem = self.ir(element);
        let idx = self.ir(index_ty);
        let address = self.writer.value(format_args!(
            "getelementptr inbounds {elem}, {elem}* {base}, {idx} {position}"
        ));
        Ok(Place::new(address.to_string(), element))
    }

    /// Module global backing a class member.
    fn member_place(&self, qualified: &QualifiedExpr<'_>, name: &str, span: Span) -> Result<Place> {
        let class = self.type_of(qualified.left)?;
        let symbol = self
            .env
            .resolve_member(class, name)
            .map_err(|_| GenerationError::UnknownStorage {
                name: name.to_string(),
                span,
            })?;
        Ok(Place::new(format!("@{}", symbol.qualified_name), symbol.ty))
    }

    fn emit_qualified(&mut self, qualified: &QualifiedExpr<'_>) -> Result<Operand> {
        match *qualified.right {
            Expr::Ident(member) => {
                let place = self.member_place(qualified, member.ident.name, member.ident.span)?;
                Ok(self.load(&place))
            }
            Expr::Call(call) => {
                let class = self.type_of(qualified.left)?;
                Ok(self
                    .emit_call(call, Some(class), false)?
                    .unwrap_or_else(|| Operand::constant("undef")))
            }
            _ => Err(internal("unsupported member access", qualified.span)),
        }
    }

    // ========================================================================
    // Calls and allocation
    // ========================================================================

    /// Emit a call. Returns `None` when the method is `void` or the result
    /// is discarded, in which case no register is assigned.
    pub(super) fn emit_call(
        &mut self,
        call: &CallExpr<'_>,
        class: Option<TypeId>,
        discard: bool,
    ) -> Result<Option<Operand>> {
        let name = call.callee.name;
        let resolved = match class {
            Some(class) => self.env.resolve_method_in(class, name),
            None => self.env.resolve_method(name),
        };
        let method = resolved.map_err(|_| GenerationError::UnknownStorage {
            name: name.to_string(),
            span: call.callee.span,
        })?;
        let symbol = function_symbol(method);
        let return_type = method.return_type();
        let params: Vec<TypeId> = method.params.iter().map(|p| p.ty).collect();

        let args = self.emit_arguments(&params, call.args)?;
        let ret = self.ir(return_type);
        if return_type == TypeId::VOID || discard {
            self.writer.emit(format_args!("call {ret} @{symbol}({args})"));
            Ok(None)
        } else {
            Ok(Some(self.writer.value(format_args!("call {ret} @{symbol}({args})"))))
        }
    }

    fn emit_arguments(&mut self, params: &[TypeId], args: &[&Expr<'_>]) -> Result<String> {
        let mut rendered = Vec::with_capacity(args.len());
        for (arg, &param) in args.iter().zip(params) {
            let value = self.emit_expr(arg)?;
            let value = self.convert(value, self.type_of(arg)?, param);
            rendered.push(format!("{} {value}", self.ir(param)));
        }
        Ok(rendered.join(", "))
    }

    fn emit_new(&mut self, new: &NewExpr<'_>, expr: &Expr<'_>) -> Result<Operand> {
        if let Some(length) = new.length {
            let array_ty = self.type_of(expr)?;
            let len = self.emit_expr(length)?;
            let len = self.convert(len, self.type_of(length)?, TypeId::LONG);
            return self.allocate_array(array_ty, len);
        }

        self.uses_malloc = true;
        let size = self.env.instance_size(new.base);
        let class = self.ir(new.base);
        let raw = self.writer.value(format_args!("call i8* @malloc(i64 {size})"));
        let object = self.writer.value(format_args!("bitcast i8* {raw} to {class}"));

        let constructor = self
            .env
            .resolve_method_in(new.base, new.type_name.name)
            .ok()
            .filter(|m| m.symbol.flags.contains(SymbolFlags::CONSTRUCTOR))
            .map(|m| (function_symbol(m), m.params.iter().map(|p| p.ty).collect::<Vec<_>>()));
        if let Some((symbol, params)) = constructor {
            let args = self.emit_arguments(&params, new.args)?;
            self.writer.emit(format_args!("call void @{symbol}({args})"));
        }
        Ok(object)
    }

    /// Heap storage for `length` elements of an array type. `length` is an
    /// `i64` operand.
    pub(super) fn allocate_array(&mut self, array_ty: TypeId, length: Operand) -> Result<Operand> {
        let element = self
            .env
            .types()
            .element(array_ty)
            .ok_or_else(|| internal("allocation of a non-array type", Span::default()))?;
        let size = self.env.types().store_size(element);
        self.uses_malloc = true;

        let bytes = match &length {
            Operand::Const(text) => match text.parse::<u64>() {
                Ok(n) => Operand::constant((n * u64::from(size)).to_string()),
                Err(_) => self.writer.value(format_args!("mul nsw i64 {length}, {size}")),
            },
            Operand::Reg(_) => self.writer.value(format_args!("mul nsw i64 {length}, {size}")),
        };
        let raw = self.writer.value(format_args!("call i8* @malloc(i64 {bytes})"));
        let ty = self.ir(array_ty);
        Ok(self.writer.value(format_args!("bitcast i8* {raw} to {ty}")))
    }

    fn emit_array_literal(&mut self, array: &ArrayExpr<'_>, expr: &Expr<'_>) -> Result<Operand> {
        let array_ty = self.type_of(expr)?;
        let element = self
            .env
            .types()
            .element(array_ty)
            .ok_or_else(|| internal("array initializer without an array type", array.span))?;
        let storage = self.allocate_array(array_ty, Operand::constant(array.elements.len().to_string()))?;

        let elem = self.ir(element);
        for (i, item) in array.elements.iter().enumerate() {
            let value = self.emit_expr(item)?;
            let value = self.convert(value, self.type_of(item)?, element);
            let address = self
                .writer
                .value(format_args!("getelementptr inbounds {elem}, {elem}* {storage}, i64 {i}"));
            self.store(&value, &Place::new(address.to_string(), element));
        }
        Ok(storage)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn emit_unary(&mut self, unary: &UnaryExpr<'_>) -> Result<Operand> {
        let ty = self.type_of(unary.operand)?;
        match unary.op {
            UnaryOp::PreInc | UnaryOp::PreDec => {
                let place = self.place_of(unary.operand)?;
                let old = self.load(&place);
                let new = self.step(place.ty, &old, unary.op == UnaryOp::PreInc);
                self.store(&new, &place);
                Ok(new)
            }
            UnaryOp::Plus => self.emit_expr(unary.operand),
            UnaryOp::Neg => {
                let value = self.emit_expr(unary.operand)?;
                if let Operand::Const(text) = &value {
                    let negated = match text.strip_prefix('-') {
                        Some(rest) => rest.to_string(),
                        None => format!("-{text}"),
                    };
                    return Ok(Operand::constant(negated));
                }
                let ir = self.ir(ty);
                if ty.is_floating() {
                    Ok(self.writer.value(format_args!("fneg {ir} {value}")))
                } else {
                    Ok(self.writer.value(format_args!("sub nsw {ir} 0, {value}")))
                }
            }
            UnaryOp::BitNot => {
                let value = self.emit_expr(unary.operand)?;
                let ir = self.ir(ty);
                Ok(self.writer.value(format_args!("xor {ir} {value}, -1")))
            }
            UnaryOp::Not => {
                let value = self.emit_expr(unary.operand)?;
                Ok(self.writer.value(format_args!("xor i1 {value}, true")))
            }
        }
    }

    /// `x++` and `x--` yield the value before the update.
    fn emit_postfix(&mut self, postfix: &PostfixExpr<'_>) -> Result<Operand> {
        let place = self.place_of(postfix.operand)?;
        let old = self.load(&place);
        let new = self.step(place.ty, &old, postfix.op == PostfixOp::PostInc);
        self.store(&new, &place);
        Ok(old)
    }

    fn step(&mut self, ty: TypeId, value: &Operand, increment: bool) -> Operand {
        let ir = self.ir(ty);
        match (ty.is_floating(), increment) {
            (true, true) => self.writer.value(format_args!("fadd {ir} {value}, 1.0")),
            (true, false) => self.writer.value(format_args!("fsub {ir} {value}, 1.0")),
            (false, true) => self.writer.value(format_args!("add nsw {ir} {value}, 1")),
            (false, false) => self.writer.value(format_args!("sub nsw {ir} {value}, 1")),
        }
    }

    fn emit_binary(&mut self, binary: &BinaryExpr<'_>, expr: &Expr<'_>) -> Result<Operand> {
        let left_ty = self.type_of(binary.left)?;
        let right_ty = self.type_of(binary.right)?;
        let left = self.emit_expr(binary.left)?;
        let right = self.emit_expr(binary.right)?;
        let op = binary.op;

        match op.category() {
            OpCategory::Logical => {
                let opcode = if op == BinaryOp::LogicalAnd { "and" } else { "or" };
                Ok(self.writer.value(format_args!("{opcode} i1 {left}, {right}")))
            }
            OpCategory::Comparison => {
                let operand_ty = if left_ty.is_numeric() && right_ty.is_numeric() {
                    promote(left_ty, right_ty)
                } else if left_ty == TypeId::VOID {
                    right_ty
                } else {
                    left_ty
                };
                let left = self.convert(left, left_ty, operand_ty);
                let right = self.convert(right, right_ty, operand_ty);
                let ir = self.value_ir(operand_ty);
                let (instr, predicate) = comparison(op, operand_ty.is_floating());
                Ok(self
                    .writer
                    .value(format_args!("{instr} {predicate} {ir} {left}, {right}")))
            }
            OpCategory::Arithmetic | OpCategory::Bitwise => {
                let result_ty = self.type_of(expr)?;
                let left = self.convert(left, left_ty, result_ty);
                let right = self.convert(right, right_ty, result_ty);
                let ir = self.ir(result_ty);
                let opcode = arithmetic(op, result_ty.is_floating());
                Ok(self.writer.value(format_args!("{opcode} {ir} {left}, {right}")))
            }
        }
    }

    fn emit_assign(&mut self, assign: &AssignExpr<'_>) -> Result<Operand> {
        let value_ty = self.type_of(assign.value)?;
        let value = self.emit_expr(assign.value)?;
        let place = self.place_of(assign.target)?;
        let value = self.convert(value, value_ty, place.ty);

        let stored = match assign.op.binary_op() {
            None => value,
            Some(op) => {
                let current = self.load(&place);
                let ir = self.ir(place.ty);
                let opcode = arithmetic(op, place.ty.is_floating());
                self.writer.value(format_args!("{opcode} {ir} {current}, {value}"))
            }
        };
        self.store(&stored, &place);
        Ok(stored)
    }

    /// Both arms are evaluated; the condition picks one with `select`.
    fn emit_ternary(&mut self, ternary: &TernaryExpr<'_>, expr: &Expr<'_>) -> Result<Operand> {
        let ty = self.type_of(expr)?;
        let cond = self.emit_expr(ternary.cond)?;
        let then_value = self.emit_expr(ternary.then_expr)?;
        let then_value = self.convert(then_value, self.type_of(ternary.then_expr)?, ty);
        let else_value = self.emit_expr(ternary.else_expr)?;
        let else_value = self.convert(else_value, self.type_of(ternary.else_expr)?, ty);
        let ir = self.value_ir(ty);
        Ok(self.writer.value(format_args!(
            "select i1 {cond}, {ir} {then_value}, {ir} {else_value}"
        )))
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Convert a numeric value between IR types. Anything else passes
    /// through unchanged.
    pub(super) fn convert(&mut self, value: Operand, from: TypeId, to: TypeId) -> Operand {
        if from == to || !from.is_numeric() || !to.is_numeric() {
            return value;
        }
        let (from_ir, to_ir) = (self.ir(from), self.ir(to));

        if to.is_floating() {
            if from.is_floating() {
                return value;
            }
            if let Operand::Const(text) = &value {
                if let Ok(n) = text.parse::<i64>() {
                    return Operand::constant(real_constant(n as f64));
                }
            }
            let op = if from == TypeId::CHAR { "uitofp" } else { "sitofp" };
            return self.writer.value(format_args!("{op} {from_ir} {value} to {to_ir}"));
        }
        if from.is_floating() {
            return self.writer.value(format_args!("fptosi {from_ir} {value} to {to_ir}"));
        }
        if from_ir == to_ir || value.is_const() {
            return value;
        }

        let types = self.env.types();
        let op = if types.store_size(from) > types.store_size(to) {
            "trunc"
        } else if from == TypeId::CHAR {
            "zext"
        } else {
            "sext"
        };
        self.writer.value(format_args!("{op} {from_ir} {value} to {to_ir}"))
    }

    /// IR type of a value, treating a bare `null` as an untyped pointer.
    fn value_ir(&self, ty: TypeId) -> String {
        if ty == TypeId::VOID {
            "i8*".to_string()
        } else {
            self.ir(ty)
        }
    }
}

fn comparison(op: BinaryOp, floating: bool) -> (&'static str, &'static str) {
    let (int, float) = match op {
        BinaryOp::Equal => ("eq", "oeq"),
        BinaryOp::NotEqual => ("ne", "une"),
        BinaryOp::Less => ("slt", "olt"),
        BinaryOp::LessEqual => ("sle", "ole"),
        BinaryOp::Greater => ("sgt", "ogt"),
        _ => ("sge", "oge"),
    };
    if floating { ("fcmp", float) } else { ("icmp", int) }
}

fn arithmetic(op: BinaryOp, floating: bool) -> &'static str {
    match (op, floating) {
        (BinaryOp::Add, false) => "add nsw",
        (BinaryOp::Add, true) => "fadd",
        (BinaryOp::Sub, false) => "sub nsw",
        (BinaryOp::Sub, true) => "fsub",
        (BinaryOp::Mul, false) => "mul nsw",
        (BinaryOp::Mul, true) => "fmul",
        (BinaryOp::Div, false) => "sdiv",
        (BinaryOp::Div, true) => "fdiv",
        (BinaryOp::Rem, false) => "srem",
        (BinaryOp::Rem, true) => "frem",
        (BinaryOp::BitAnd | BinaryOp::LogicalAnd, _) => "and",
        (BinaryOp::BitOr | BinaryOp::LogicalOr, _) => "or",
        (BinaryOp::BitXor, _) => "xor",
        (BinaryOp::ShiftLeft, _) => "shl",
        (BinaryOp::ShiftRight, _) => "ashr",
        (BinaryOp::ShiftRightUnsigned, _) => "lshr",
        _ => "add",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparisons_pick_signed_or_ordered_predicates() {
        assert_eq!(comparison(BinaryOp::Less, false), ("icmp", "slt"));
        assert_eq!(comparison(BinaryOp::Less, true), ("fcmp", "olt"));
        assert_eq!(comparison(BinaryOp::NotEqual, true), ("fcmp", "une"));
        assert_eq!(comparison(BinaryOp::GreaterEqual, false), ("icmp", "sge"));
    }

    #[test]
    fn arithmetic_opcodes_follow_the_operand_kind() {
        assert_eq!(arithmetic(BinaryOp::Add, false), "add nsw");
        assert_eq!(arithmetic(BinaryOp::Div, true), "fdiv");
        assert_eq!(arithmetic(BinaryOp::Rem, false), "srem");
        assert_eq!(arithmetic(BinaryOp::ShiftRightUnsigned, false), "lshr");
        assert_eq!(arithmetic(BinaryOp::BitXor, false), "xor");
    }
}
