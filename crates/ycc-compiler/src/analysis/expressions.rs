//! Expression checking.
//!
//! [`analyze_expr`](SemanticAnalyzer::analyze_expr) computes an
//! [`ExprInfo`] for a node and stores its type in the node's annotation
//! slot. Poisoned operands make the enclosing expression poisoned without
//! a second message.

use ycc_core::{SemanticError, Span, SymbolFlags, TypeId};
use ycc_parser::ast::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, IdentExpr, IndexExpr, LiteralExpr,
    LiteralKind, NewExpr, OpCategory, PostfixExpr, QualifiedExpr, TernaryExpr, UnaryExpr,
    UnaryOp,
};

use super::promotion::{assignable, is_integral, promote, widens};
use super::{ExprContext, ExprInfo, SemanticAnalyzer};

impl<'a> SemanticAnalyzer<'a> {
    pub(super) fn analyze_expr(&mut self, expr: &Expr<'_>, ctx: ExprContext) -> ExprInfo {
        let info = match *expr {
            Expr::Ident(ident) => self.analyze_ident(ident, ctx),
            Expr::Literal(lit) => self.analyze_literal(lit),
            Expr::New(new) => self.analyze_new(new, ctx),
            Expr::Index(index) => self.analyze_index(index, ctx),
            Expr::Call(call) => self.analyze_call(call, None, ctx),
            Expr::Qualified(qualified) => self.analyze_qualified(qualified, ctx),
            Expr::Array(array) => {
                for element in array.elements {
                    self.analyze_expr(element, ctx);
                }
                self.report(SemanticError::TypeMismatch {
                    expected: "array".to_string(),
                    found: "array initializer".to_string(),
                    span: array.span,
                });
                ExprInfo::invalid()
            }
            Expr::Unary(unary) => self.analyze_unary(unary, ctx),
            Expr::Postfix(postfix) => self.analyze_postfix(postfix, ctx),
            Expr::Binary(binary) => self.analyze_binary(binary, ctx),
            Expr::Assign(assign) => self.analyze_assign(assign, ctx),
            Expr::Ternary(ternary) => self.analyze_ternary(ternary, ctx),
        };
        expr.set_type(info.ty);
        info
    }

    fn analyze_ident(&mut self, expr: &IdentExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let name = expr.ident.name;
        let Ok(symbol) = self.env.resolve_variable(name, true) else {
            self.report(SemanticError::UnresolvedSymbol {
                kind: "variable",
                name: name.to_string(),
                span: expr.ident.span,
            });
            return ExprInfo::invalid();
        };
        let (ty, flags) = (symbol.ty, symbol.flags);

        if ty == TypeId::VOID {
            // The declaration was already rejected.
            return ExprInfo::invalid();
        }
        if ctx.initializing && flags.is_undefined() && !flags.contains(SymbolFlags::MEMBER) {
            self.report(SemanticError::Uninitialized {
                name: name.to_string(),
                span: expr.ident.span,
            });
            return ExprInfo::invalid();
        }
        ExprInfo::variable(ty)
    }

    fn analyze_literal(&mut self, lit: &LiteralExpr<'_>) -> ExprInfo {
        match lit.kind {
            LiteralKind::Int { is_char: true, .. } => ExprInfo::literal(TypeId::CHAR),
            LiteralKind::Int { is_long: true, .. } => ExprInfo::literal(TypeId::LONG),
            LiteralKind::Int { .. } => ExprInfo::literal(TypeId::INT),
            LiteralKind::Real(_) => ExprInfo::literal(TypeId::DOUBLE),
            LiteralKind::Bool(_) => ExprInfo::literal(TypeId::BOOLEAN),
            LiteralKind::Null => ExprInfo::null(),
            LiteralKind::Str(text) => {
                if lit.interned.get().is_none() {
                    lit.interned.set(Some(self.env.intern_string_literal(text)));
                }
                ExprInfo::literal(TypeId::STRING)
            }
        }
    }

    fn analyze_new(&mut self, new: &NewExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let name = new.type_name.name;

        if let Some(length) = new.length {
            let known = self.check_type_exists(new.base, new.type_name.span);
            if new.base == TypeId::VOID {
                self.report(SemanticError::IllegalVariableType {
                    name: "void".to_string(),
                    span: new.type_name.span,
                });
            }
            let len = self.analyze_expr(length, ctx);
            if len.is_valid() && !is_integral(len.ty) {
                self.report(SemanticError::NotNumeric {
                    found: self.describe(len),
                    span: length.span(),
                });
            }
            if !known || new.base == TypeId::VOID {
                return ExprInfo::invalid();
            }
            return ExprInfo::temporary(self.env.array_of(new.base));
        }

        if !self.env.types().is_class(new.base) {
            self.report(SemanticError::NotAClass {
                name: name.to_string(),
                span: new.type_name.span,
            });
            return ExprInfo::invalid();
        }
        if !self.check_type_exists(new.base, new.type_name.span) {
            return ExprInfo::invalid();
        }

        let constructor = self
            .env
            .resolve_method_in(new.base, name)
            .ok()
            .filter(|m| m.symbol.flags.contains(SymbolFlags::CONSTRUCTOR))
            .map(|m| m.params.iter().map(|p| p.ty).collect::<Vec<_>>());
        let params = constructor.unwrap_or_default();
        self.check_arguments(name, &params, new.args, new.span, ctx);
        ExprInfo::temporary(new.base)
    }

    fn analyze_index(&mut self, index: &IndexExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let base = self.analyze_expr(index.base, ctx);
        let position = self.analyze_expr(index.index, ctx);
        if position.is_valid() && !is_integral(position.ty) {
            self.report(SemanticError::NotNumeric {
                found: self.describe(position),
                span: index.index.span(),
            });
        }
        if !base.is_valid() {
            return ExprInfo::invalid();
        }

        let types = self.env.types();
        let element = types.element(base.ty).filter(|_| types.is_array(base.ty));
        let Some(element) = element else {
            self.report(SemanticError::NotAnArray {
                found: self.describe(base),
                span: index.base.span(),
            });
            return ExprInfo::invalid();
        };
        if base.is_variable() {
            ExprInfo::variable(element)
        } else {
            ExprInfo::temporary(element)
        }
    }

    /// A call by simple name, or on `class` when reached through a
    /// qualified expression.
    fn analyze_call(&mut self, call: &CallExpr<'_>, class: Option<TypeId>, ctx: ExprContext) -> ExprInfo {
        let name = call.callee.name;
        let resolved = match class {
            Some(class) => self.env.resolve_method_in(class, name),
            None => self.env.resolve_method(name),
        };
        let Ok(method) = resolved else {
            for arg in call.args {
                self.analyze_expr(arg, ctx);
            }
            self.report(SemanticError::UnresolvedSymbol {
                kind: "method",
                name: name.to_string(),
                span: call.callee.span,
            });
            return ExprInfo::invalid();
        };
        let return_type = method.return_type();
        let params: Vec<TypeId> = method.params.iter().map(|p| p.ty).collect();

        self.check_arguments(name, &params, call.args, call.span, ctx);
        ExprInfo::temporary(return_type)
    }

    /// Check call arguments against parameter types.
    ///
    /// Literal arguments must have exactly the parameter's type; other
    /// arguments only need to be assignable to it.
    fn check_arguments(
        &mut self,
        method: &str,
        params: &[TypeId],
        args: &[&Expr<'_>],
        span: Span,
        ctx: ExprContext,
    ) {
        let infos: Vec<ExprInfo> = args.iter().map(|arg| self.analyze_expr(arg, ctx)).collect();
        if infos.len() != params.len() {
            self.report(SemanticError::ArityMismatch {
                method: method.to_string(),
                expected: params.len(),
                found: infos.len(),
                span,
            });
            return;
        }

        for ((arg, info), &param) in args.iter().zip(&infos).zip(params) {
            if !info.is_valid() {
                continue;
            }
            let accepted = if info.is_null() {
                self.env.types().is_reference(param)
            } else if info.is_literal() {
                info.ty == param
            } else {
                assignable(self.env.types(), param, *info)
            };
            if !accepted {
                self.report(SemanticError::ArgTypeMismatch {
                    method: method.to_string(),
                    expected: self.type_name(param),
                    found: self.describe(*info),
                    span: arg.span(),
                });
            }
        }
    }

    /// `left.right`, where `left` is a class name (static access) or an
    /// expression of class type.
    fn analyze_qualified(&mut self, qualified: &QualifiedExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let Some(class) = self.qualifier_class(qualified.left, ctx) else {
            return ExprInfo::invalid();
        };

        let info = match *qualified.right {
            Expr::Ident(member) => {
                let name = member.ident.name;
                match self.env.resolve_member(class, name) {
                    Ok(symbol) => ExprInfo::variable(symbol.ty),
                    Err(_) => {
                        self.report(SemanticError::UnresolvedSymbol {
                            kind: "variable",
                            name: name.to_string(),
                            span: member.ident.span,
                        });
                        ExprInfo::invalid()
                    }
                }
            }
            Expr::Call(call) => self.analyze_call(call, Some(class), ctx),
            _ => {
                self.report(SemanticError::UnresolvedSymbol {
                    kind: "member",
                    name: self.type_name(class),
                    span: qualified.right.span(),
                });
                ExprInfo::invalid()
            }
        };
        qualified.right.set_type(info.ty);
        info
    }

    /// The class a qualified expression selects from.
    fn qualifier_class(&mut self, left: &Expr<'_>, ctx: ExprContext) -> Option<TypeId> {
        if let Expr::Ident(ident) = *left {
            let name = ident.ident.name;
            if self.env.resolve_variable(name, true).is_err() {
                let class = self.env.resolve_class(name);
                left.set_type(class.unwrap_or(TypeId::VOID));
                if class.is_none() {
                    self.report(SemanticError::UnresolvedSymbol {
                        kind: "symbol",
                        name: name.to_string(),
                        span: ident.ident.span,
                    });
                }
                return class;
            }
        }

        let info = self.analyze_expr(left, ctx);
        if !info.is_valid() {
            return None;
        }
        let is_class = self.env.types().is_class(info.ty) && self.env.class_scope(info.ty).is_some();
        if !is_class {
            self.report(SemanticError::NotAClass {
                name: self.describe(info),
                span: left.span(),
            });
            return None;
        }
        Some(info.ty)
    }

    fn analyze_unary(&mut self, unary: &UnaryExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let operand = self.analyze_expr(unary.operand, ctx);
        if !operand.is_valid() {
            return ExprInfo::invalid();
        }
        let span = unary.operand.span();

        match unary.op {
            UnaryOp::Not => {
                if operand.ty != TypeId::BOOLEAN {
                    self.report(SemanticError::NotBoolean {
                        found: self.describe(operand),
                        span,
                    });
                }
                ExprInfo::temporary(TypeId::BOOLEAN)
            }
            UnaryOp::Neg | UnaryOp::Plus => self.numeric_operand(operand, span),
            UnaryOp::BitNot => {
                if !is_integral(operand.ty) {
                    self.report(SemanticError::NotNumeric {
                        found: self.describe(operand),
                        span,
                    });
                    return ExprInfo::invalid();
                }
                ExprInfo::temporary(operand.ty)
            }
            UnaryOp::PreInc | UnaryOp::PreDec => self.increment_operand(operand, span),
        }
    }

    fn analyze_postfix(&mut self, postfix: &PostfixExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let operand = self.analyze_expr(postfix.operand, ctx);
        if !operand.is_valid() {
            return ExprInfo::invalid();
        }
        self.increment_operand(operand, postfix.operand.span())
    }

    fn numeric_operand(&mut self, operand: ExprInfo, span: Span) -> ExprInfo {
        if !operand.ty.is_numeric() {
            self.report(SemanticError::NotNumeric {
                found: self.describe(operand),
                span,
            });
            return ExprInfo::invalid();
        }
        ExprInfo::temporary(operand.ty)
    }

    /// `++` and `--` need a numeric variable.
    fn increment_operand(&mut self, operand: ExprInfo, span: Span) -> ExprInfo {
        let result = self.numeric_operand(operand, span);
        if result.is_valid() && !operand.is_variable() {
            self.report(SemanticError::NotAVariable { span });
            return ExprInfo::invalid();
        }
        result
    }

    fn analyze_binary(&mut self, binary: &BinaryExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let left = self.analyze_expr(binary.left, ctx);
        let right = self.analyze_expr(binary.right, ctx);
        if !left.is_valid() || !right.is_valid() {
            return ExprInfo::invalid();
        }

        let op = binary.op;
        let (accepted, result) = match op.category() {
            OpCategory::Logical => (
                left.ty == TypeId::BOOLEAN && right.ty == TypeId::BOOLEAN,
                TypeId::BOOLEAN,
            ),
            // Equality included: only numbers compare.
            OpCategory::Comparison => (
                left.ty.is_numeric() && right.ty.is_numeric(),
                TypeId::BOOLEAN,
            ),
            OpCategory::Arithmetic => (
                left.ty.is_numeric() && right.ty.is_numeric(),
                promote(left.ty, right.ty),
            ),
            OpCategory::Bitwise => {
                let logical = matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
                    && left.ty == TypeId::BOOLEAN
                    && right.ty == TypeId::BOOLEAN;
                if logical {
                    (true, TypeId::BOOLEAN)
                } else {
                    (
                        is_integral(left.ty) && is_integral(right.ty),
                        promote(left.ty, right.ty),
                    )
                }
            }
        };

        if !accepted {
            self.report(SemanticError::IncompatibleOperands {
                op: op.as_str(),
                left: self.describe(left),
                right: self.describe(right),
                span: binary.span,
            });
            return ExprInfo::invalid();
        }
        ExprInfo::temporary(result)
    }

    /// Assignment checks the value first, then the target.
    fn analyze_assign(&mut self, assign: &AssignExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let value = self.analyze_expr(assign.value, ctx);
        let target = self.analyze_expr(assign.target, ExprContext::default());
        if !target.is_valid() {
            return ExprInfo::invalid();
        }
        if !target.is_variable() {
            self.report(SemanticError::NotAVariable {
                span: assign.target.span(),
            });
            return ExprInfo::invalid();
        }
        if !value.is_valid() {
            return ExprInfo::temporary(target.ty);
        }

        match assign.op.binary_op() {
            None => {
                if !assignable(self.env.types(), target.ty, value) {
                    self.report(SemanticError::TypeMismatch {
                        expected: self.type_name(target.ty),
                        found: self.describe(value),
                        span: assign.value.span(),
                    });
                    return ExprInfo::temporary(target.ty);
                }
            }
            Some(op) => {
                let operands_ok = match op.category() {
                    OpCategory::Bitwise => is_integral(target.ty) && is_integral(value.ty),
                    _ => target.ty.is_numeric() && value.ty.is_numeric(),
                };
                if !operands_ok {
                    self.report(SemanticError::IncompatibleOperands {
                        op: assign.op.as_str(),
                        left: self.describe(target),
                        right: self.describe(value),
                        span: assign.span,
                    });
                    return ExprInfo::temporary(target.ty);
                }
                if !widens(value.ty, target.ty) {
                    self.report(SemanticError::TypeMismatch {
                        expected: self.type_name(target.ty),
                        found: self.describe(value),
                        span: assign.value.span(),
                    });
                    return ExprInfo::temporary(target.ty);
                }
            }
        }

        // Only a successful assignment initializes its target.
        if let Expr::Ident(ident) = *assign.target {
            let _ = self.env.mark_initialized(ident.ident.name);
        }
        ExprInfo::temporary(target.ty)
    }

    fn analyze_ternary(&mut self, ternary: &TernaryExpr<'_>, ctx: ExprContext) -> ExprInfo {
        let cond = self.analyze_expr(ternary.cond, ctx);
        if cond.is_valid() && cond.ty != TypeId::BOOLEAN {
            self.report(SemanticError::NotBoolean {
                found: self.describe(cond),
                span: ternary.cond.span(),
            });
        }
        let then_info = self.analyze_expr(ternary.then_expr, ctx);
        let else_info = self.analyze_expr(ternary.else_expr, ctx);
        if !then_info.is_valid() || !else_info.is_valid() {
            return ExprInfo::invalid();
        }

        let types = self.env.types();
        if then_info.ty == else_info.ty && then_info.is_null() == else_info.is_null() {
            return if then_info.is_null() {
                ExprInfo::null()
            } else {
                ExprInfo::temporary(then_info.ty)
            };
        }
        if then_info.is_null() && types.is_reference(else_info.ty) {
            return ExprInfo::temporary(else_info.ty);
        }
        if else_info.is_null() && types.is_reference(then_info.ty) {
            return ExprInfo::temporary(then_info.ty);
        }
        self.report(SemanticError::TypeMismatch {
            expected: self.describe(then_info),
            found: self.describe(else_info),
            span: ternary.else_expr.span(),
        });
        ExprInfo::invalid()
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use ycc_core::{Diagnostics, TypeId};
    use ycc_parser::ast::{Expr, Stmt};
    use ycc_registry::ScopeEnvironment;

    use crate::analysis::test_support::{errors_of, parse};

    #[test]
    fn undeclared_names_are_reported_where_used() {
        let errors = errors_of("class A {\n  void f() {\n    int x = 1;\n    x = y;\n  }\n}");
        assert_eq!(errors, vec!["4:9: cannot find variable 'y'"]);
    }

    #[test]
    fn widening_assignment_is_accepted() {
        assert!(errors_of("class A { void f() { double d; d = 1; long l = 'a'; } }").is_empty());
    }

    #[test]
    fn narrowing_assignment_is_rejected() {
        let errors = errors_of("class A { void f() { int i = 0; i = 2.5; } }");
        assert_eq!(
            errors,
            vec!["1:37: type mismatch: cannot convert from double to int"]
        );
    }

    #[test]
    fn literal_arguments_must_match_exactly() {
        let errors = errors_of("class A { void f(double d) { } void g() { f(3); f(3.0); } }");
        assert_eq!(
            errors,
            vec!["1:45: argument type mismatch in call to 'f': expected double, found int"]
        );
    }

    #[test]
    fn variable_arguments_may_widen() {
        let source = "class A { void f(double d) { } void g() { int i = 3; f(i); } }";
        assert!(errors_of(source).is_empty());
    }

    #[test]
    fn arity_is_checked() {
        let errors = errors_of("class A { int f(int a, int b) { return a; } void g() { f(1); } }");
        assert_eq!(
            errors,
            vec!["1:56: method 'f' expects 2 argument(s) but 1 were given"]
        );
    }

    #[test]
    fn operators_check_their_operand_kinds() {
        let errors = errors_of(
            "class A { void f(boolean b, int i) { i = i + b; b = !i; b = i && b; i = i & 1.5; } }",
        );
        assert_eq!(
            errors,
            vec![
                "1:42: incompatible operand types int and boolean for operator '+'",
                "1:54: incompatible types: int cannot be converted to boolean",
                "1:61: incompatible operand types int and boolean for operator '&&'",
                "1:73: incompatible operand types int and double for operator '&'",
            ]
        );
    }

    #[test]
    fn increment_needs_a_variable() {
        let errors = errors_of("class A { void f() { int i = 0; i++; (i + 1)++; 5 = i; } }");
        assert_eq!(
            errors,
            vec![
                "1:39: left-hand side must be a variable",
                "1:49: left-hand side must be a variable",
            ]
        );
    }

    #[test]
    fn indexing_requires_an_array() {
        let errors = errors_of("class A { void f(int[] a, int n) { a[0] = 1; n[0] = 2; a[1.5] = 3; } }");
        assert_eq!(
            errors,
            vec!["1:46: array required, but int found", "1:58: cannot convert double to int"]
        );
    }

    #[test]
    fn static_members_resolve_through_the_class_name() {
        let source = "class A { static int count; static int next() { return 1; } }\n\
                      class B { void f() { A.count = A.next(); A.missing = 1; } }";
        assert_eq!(errors_of(source), vec!["2:44: cannot find variable 'missing'"]);
    }

    #[test]
    fn constructors_check_their_arguments() {
        let source = "class P { P(int x) { } }\nclass Q { void f() { P p = new P(1); P q = new P(); } }";
        assert_eq!(
            errors_of(source),
            vec!["2:44: method 'P' expects 1 argument(s) but 0 were given"]
        );
    }

    #[test]
    fn null_fits_references_only() {
        let errors = errors_of("class P { void f() { P p = null; String s = null; int i = null; } }");
        assert_eq!(
            errors,
            vec!["1:59: type mismatch: cannot convert from null to int"]
        );
    }

    #[test]
    fn every_expression_gets_a_type() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let mut diags = Diagnostics::new("T.java");
        let program = parse(
            "class A { void f() { double d = 1 + 2.0 * 3; boolean b = d > 1 && true; } }",
            &arena,
            &mut env,
        );
        assert!(crate::analysis::analyze(&program, &mut env, &mut diags));

        let Some(Stmt::Class(class)) = program.items.first() else {
            panic!("expected a class");
        };
        let Stmt::Method(method) = class.body[0] else {
            panic!("expected a method");
        };
        let body = method.body.expect("method body");
        let types: Vec<_> = body
            .stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::VarDecl(decl) => decl.declarators[0].init,
                _ => None,
            })
            .map(|init: &Expr<'_>| init.ty())
            .collect();
        assert_eq!(types, vec![Some(TypeId::DOUBLE), Some(TypeId::BOOLEAN)]);
    }

    #[test]
    fn string_literals_are_interned_once_per_occurrence() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let mut diags = Diagnostics::new("T.java");
        let program = parse(
            "class A { void f() { String a = \"hi\"; String b = \"hi\"; } }",
            &arena,
            &mut env,
        );
        assert!(crate::analysis::analyze(&program, &mut env, &mut diags));
        assert_eq!(env.literals().len(), 2);
    }

    #[test]
    fn only_numbers_compare_for_equality() {
        let errors = errors_of(
            "class A { void f(boolean b, String s) { boolean c = b == true; boolean d = s != null; boolean e = 1 == 2.0; } }",
        );
        assert_eq!(
            errors,
            vec![
                "1:53: incompatible operand types boolean and boolean for operator '=='",
                "1:76: incompatible operand types String and null for operator '!='",
            ]
        );
    }

    #[test]
    fn a_rejected_assignment_leaves_the_target_uninitialized() {
        let errors = errors_of("class A { void f() { int y; y = true; int z = y; } }");
        assert_eq!(
            errors,
            vec![
                "1:33: type mismatch: cannot convert from boolean to int",
                "1:47: variable 'y' might not have been initialized",
            ]
        );
    }

    #[test]
    fn nested_classes_with_one_simple_name_keep_their_own_members() {
        let source = "class A { class In { int x; } void f() { In i = new In(); i.x = 1; } } \
                      class B { class In { double y; } void g() { In j = new In(); j.y = 2.0; } }";
        assert!(errors_of(source).is_empty());
    }
}
