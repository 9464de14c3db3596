//! Fields, locals and method signatures.

use ycc_core::{SemanticError, Span, SymbolFlags, TypeId};
use ycc_parser::ast::{Expr, MethodDecl, VarDecl};
use ycc_registry::SymbolInfo;

use super::promotion::assignable;
use super::{ExprContext, SemanticAnalyzer};

impl<'a> SemanticAnalyzer<'a> {
    /// Check a method signature and body.
    pub(super) fn analyze_method(&mut self, method: &MethodDecl<'_>) {
        self.check_type_exists(method.return_type.ty, method.return_type.span);
        for (i, param) in method.params.iter().enumerate() {
            self.check_type_exists(param.ty.ty, param.ty.span);
            if param.ty.ty == TypeId::VOID {
                self.report(SemanticError::IllegalVariableType {
                    name: "void".to_string(),
                    span: param.ty.span,
                });
            }
            if method.params[..i].iter().any(|p| p.name.name == param.name.name) {
                self.report(SemanticError::DuplicateSymbol {
                    kind: "variable",
                    name: param.name.name.to_string(),
                    span: param.name.span,
                });
            }
        }

        let Some(body) = method.body else {
            return;
        };
        if self.env.enter_method(method.name.name).is_err() {
            return;
        }
        self.return_type = method.return_type.ty;
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.analyze_block(body);
        self.env.leave_method();
        self.return_type = TypeId::VOID;
    }

    /// Declare the variables of a field or local declaration and check
    /// their initializers.
    pub(super) fn analyze_var_decl(&mut self, decl: &VarDecl<'_>, is_field: bool) {
        if !is_field {
            for modifier in (decl.modifiers - SymbolFlags::FINAL).modifier_names() {
                self.report(SemanticError::IllegalModifier {
                    modifier,
                    span: decl.span,
                });
            }
        }

        let mut usable = self.check_type_exists(decl.ty.ty, decl.ty.span);
        if decl.ty.ty == TypeId::VOID {
            self.report(SemanticError::IllegalVariableType {
                name: "void".to_string(),
                span: decl.ty.span,
            });
            usable = false;
        }

        for declarator in decl.declarators {
            let ty = if usable { declarator.ty } else { TypeId::VOID };
            let mut flags = decl.modifiers & SymbolFlags::MODIFIERS;
            if declarator.init.is_none() && declarator.array_size.is_none() {
                flags |= SymbolFlags::UNDEFINED;
            }
            let symbol = SymbolInfo::new(ty, flags).with_array_size(declarator.array_size);
            let name = declarator.name.name;
            let declared = self.env.declare_variable(name, symbol).is_ok();
            if !declared {
                self.report(SemanticError::DuplicateSymbol {
                    kind: "variable",
                    name: name.to_string(),
                    span: declarator.name.span,
                });
            }

            if let Some(init) = declarator.init {
                self.check_initializer(init, ty, ExprContext::initializer());
                if declared {
                    let _ = self.env.mark_initialized(name);
                }
            }
        }
    }

    /// Check an initializer against the declared type. Brace initializers
    /// are matched element by element against the array's element type.
    pub(super) fn check_initializer(&mut self, init: &Expr<'_>, target: TypeId, ctx: ExprContext) {
        if let Expr::Array(array) = init {
            init.set_type(target);
            let element = if self.env.types().is_array(target) {
                self.env.types().element(target)
            } else {
                None
            };
            if element.is_none() && target != TypeId::VOID {
                self.report(SemanticError::TypeMismatch {
                    expected: self.type_name(target),
                    found: "array initializer".to_string(),
                    span: init.span(),
                });
            }
            for item in array.elements {
                self.check_initializer(item, element.unwrap_or(TypeId::VOID), ctx);
            }
            return;
        }

        let info = self.analyze_expr(init, ctx);
        if target != TypeId::VOID && !assignable(self.env.types(), target, info) {
            self.report(SemanticError::TypeMismatch {
                expected: self.type_name(target),
                found: self.describe(info),
                span: init.span(),
            });
        }
    }

    /// Report a class type that was named but never declared. Array types
    /// are checked through their element type.
    pub(super) fn check_type_exists(&mut self, ty: TypeId, span: Span) -> bool {
        let types = self.env.types();
        let mut base = ty;
        while let Some(element) = types.element(base).filter(|_| types.is_array(base)) {
            base = element;
        }
        if types.is_class(base) && self.env.class_scope(base).is_none() {
            self.report(SemanticError::UnresolvedSymbol {
                kind: "class",
                name: self.type_name(base),
                span,
            });
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::test_support::errors_of;

    #[test]
    fn undeclared_class_types_are_reported() {
        let errors = errors_of("class A { Missing m; void f(Other[] o) { } }");
        assert_eq!(
            errors,
            vec![
                "1:11: cannot find class 'Missing'",
                "1:29: cannot find class 'Other'",
            ]
        );
    }

    #[test]
    fn duplicate_locals_in_one_block_are_reported() {
        let errors = errors_of("class A { void f() { int x = 1; int x = 2; } }");
        assert_eq!(errors, vec!["1:37: variable 'x' is already defined in this scope"]);
    }

    #[test]
    fn shadowing_in_a_nested_block_is_allowed() {
        let errors = errors_of("class A { void f() { int x = 1; { int x = 2; } } }");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn locals_only_accept_final() {
        let errors = errors_of("class A { void f() { final int a = 1; static int b = 2; } }");
        assert_eq!(errors, vec!["1:39: modifier 'static' not allowed here"]);
    }

    #[test]
    fn reading_a_local_in_its_own_initializer_is_an_error() {
        let errors = errors_of("class A { void f() { int x = x + 1; } }");
        assert_eq!(
            errors,
            vec!["1:30: variable 'x' might not have been initialized"]
        );
    }

    #[test]
    fn array_initializers_check_each_element() {
        let errors = errors_of("class A { void f() { int a[] = {1, 2.5}; int b = {1}; } }");
        assert_eq!(
            errors,
            vec![
                "1:36: type mismatch: cannot convert from double to int",
                "1:50: type mismatch: cannot convert from array initializer to int",
            ]
        );
    }

    #[test]
    fn void_variables_are_rejected_once() {
        let errors = errors_of("class A { void f() { void v; v = 1; } }");
        assert_eq!(errors, vec!["1:22: illegal type 'void' for a variable"]);
    }
}
