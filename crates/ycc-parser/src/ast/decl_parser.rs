//! Declarations: classes, members, methods, variables and types.

use bumpalo::collections::Vec as BVec;
use tracing::trace;
use ycc_core::{ParseError, ParseErrorKind, Span, SymbolFlags, TypeId};
use ycc_registry::MethodInfo;

use super::parser::Parser;
use crate::ast::expr::{Ident, TypeRef};
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

impl<'ast, 'env> Parser<'ast, 'env> {
    /// Parse `modifier* class Name { member* }`.
    ///
    /// The class is declared in the environment before its body is parsed,
    /// so members and nested classes land in its scope.
    pub(super) fn parse_class(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start = self.peek().span;
        let modifiers = self.parse_modifiers();
        self.expect(TokenKind::Class)?;
        let name_token = self.expect_ident()?;
        let name = Ident::new(name_token.lexeme, name_token.span);
        self.expect(TokenKind::LeftBrace)?;

        let ty = match self.env.declare_class(name.name, modifiers) {
            Ok(ty) => ty,
            Err(_) => {
                self.report(ParseError::new(
                    ParseErrorKind::DuplicateDeclaration,
                    name.span,
                    format!("duplicate class: {}", name.name),
                ));
                // Keep parsing into the existing scope.
                let _ = self.env.enter_class(name.name);
                self.env.current_class().unwrap_or(TypeId::VOID)
            }
        };
        trace!(class = name.name, %ty, "parsing class body");

        self.classes.push(name.name);
        let body = self.parse_statement_list(Self::parse_member, &[TokenKind::RightBrace]);
        self.classes.pop();
        self.env.leave_class();

        let end = match self.expect(TokenKind::RightBrace) {
            Ok(token) => token.span,
            Err(error) => {
                self.report(error);
                self.peek().span
            }
        };

        Ok(Stmt::Class(self.arena.alloc(ClassDecl {
            modifiers,
            name,
            ty,
            body,
            span: start.to(end),
        })))
    }

    pub(super) fn parse_modifiers(&mut self) -> SymbolFlags {
        let mut flags = SymbolFlags::empty();
        while self.peek().kind.is_modifier() {
            let token = self.advance();
            if let Some(flag) = SymbolFlags::from_modifier(token.lexeme) {
                flags |= flag;
            }
        }
        flags
    }

    /// One member of a class body: a field, method, constructor or nested
    /// class.
    fn parse_member(&mut self) -> Result<Stmt<'ast>, ParseError> {
        if let Some(token) = self.eat(TokenKind::Semicolon) {
            return Ok(Stmt::Empty(token.span));
        }
        if self.is_class_start() {
            return self.parse_class();
        }

        let start = self.peek().span;
        let modifiers = self.parse_modifiers();

        let current_class = self.classes.last().copied();
        if self.check(TokenKind::Identifier)
            && Some(self.peek().lexeme) == current_class
            && self.peek_nth(1).kind == TokenKind::LeftParen
        {
            let name_token = self.advance();
            let return_type = TypeRef {
                name: "void",
                ty: TypeId::VOID,
                span: name_token.span,
            };
            let name = Ident::new(name_token.lexeme, name_token.span);
            return self.parse_method(start, modifiers, return_type, name, true);
        }

        if !self.peek().kind.is_primitive_type() && !self.check(TokenKind::Identifier) {
            let token = *self.peek();
            return Err(ParseError::new(
                ParseErrorKind::ExpectedClassMember,
                token.span,
                format!("expected field or method declaration, found {}", token.kind),
            ));
        }

        let ty = self.parse_type()?;
        if self.check(TokenKind::Identifier) && self.peek_nth(1).kind == TokenKind::LeftParen {
            let name_token = self.advance();
            let name = Ident::new(name_token.lexeme, name_token.span);
            return self.parse_method(start, modifiers, ty, name, false);
        }

        let decl = self.parse_var_decl_rest(start, modifiers, ty)?;
        Ok(Stmt::VarDecl(decl))
    }

    /// Parse the parameter list and body of a method whose header has been
    /// consumed up to its name, and declare it in the current class.
    fn parse_method(
        &mut self,
        start: Span,
        modifiers: SymbolFlags,
        return_type: TypeRef<'ast>,
        name: Ident<'ast>,
        is_constructor: bool,
    ) -> Result<Stmt<'ast>, ParseError> {
        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                self.parse_modifiers();
                let ty = self.parse_type()?;
                let name_token = self.expect_ident()?;
                params.push(Param {
                    ty,
                    name: Ident::new(name_token.lexeme, name_token.span),
                });
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        let mut info = MethodInfo::new(return_type.ty, modifiers);
        if is_constructor {
            info.symbol.flags |= SymbolFlags::CONSTRUCTOR;
        }
        for param in &params {
            info.push_param(param.ty.ty, param.name.name);
        }
        if self.env.declare_method(name.name, info).is_err() {
            self.report(ParseError::new(
                ParseErrorKind::DuplicateDeclaration,
                name.span,
                format!(
                    "method {} is already defined in class {}",
                    name.name,
                    self.classes.last().copied().unwrap_or_default()
                ),
            ));
        }

        let (body, end) = if let Some(semi) = self.eat(TokenKind::Semicolon) {
            (None, semi.span)
        } else {
            let block = self.parse_block()?;
            (Some(block), block.span)
        };

        Ok(Stmt::Method(self.arena.alloc(MethodDecl {
            modifiers,
            return_type,
            name,
            params: params.into_bump_slice(),
            body,
            is_constructor,
            span: start.to(end),
        })))
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Whether the upcoming tokens start a variable declaration rather than
    /// an expression.
    pub(super) fn is_var_decl(&self) -> bool {
        let first = self.peek().kind;
        if first.is_primitive_type() || first.is_modifier() {
            return true;
        }
        if first != TokenKind::Identifier {
            return false;
        }
        match self.peek_nth(1).kind {
            TokenKind::Identifier => true,
            TokenKind::LeftBracket => self.peek_nth(2).kind == TokenKind::RightBracket,
            _ => false,
        }
    }

    /// Parse `modifier* Type declarator (, declarator)*` without the
    /// trailing semicolon.
    pub(super) fn parse_var_decl(&mut self) -> Result<&'ast VarDecl<'ast>, ParseError> {
        let start = self.peek().span;
        let modifiers = self.parse_modifiers();
        let ty = self.parse_type()?;
        self.parse_declarators(start, modifiers, ty)
    }

    fn parse_var_decl_rest(
        &mut self,
        start: Span,
        modifiers: SymbolFlags,
        ty: TypeRef<'ast>,
    ) -> Result<&'ast VarDecl<'ast>, ParseError> {
        let decl = self.parse_declarators(start, modifiers, ty)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(decl)
    }

    /// A local declaration statement, semicolon included.
    pub(super) fn parse_local_var_decl(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let decl = self.parse_var_decl()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::VarDecl(decl))
    }

    fn parse_declarators(
        &mut self,
        start: Span,
        modifiers: SymbolFlags,
        ty: TypeRef<'ast>,
    ) -> Result<&'ast VarDecl<'ast>, ParseError> {
        let mut declarators = BVec::new_in(self.arena);
        loop {
            declarators.push(self.parse_declarator(ty.ty)?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let end = declarators.last().map_or(ty.span, |d: &Declarator<'ast>| d.span);
        Ok(self.arena.alloc(VarDecl {
            modifiers,
            ty,
            declarators: declarators.into_bump_slice(),
            span: start.to(end),
        }))
    }

    /// `name ([size?])* (= initializer)?`
    fn parse_declarator(&mut self, base: TypeId) -> Result<Declarator<'ast>, ParseError> {
        let name_token = self.expect_ident()?;
        let name = Ident::new(name_token.lexeme, name_token.span);
        let mut ty = base;
        let mut array_size = None;
        let mut end = name.span;

        while self.eat(TokenKind::LeftBracket).is_some() {
            if let Some(size) = self.eat(TokenKind::IntLiteral) {
                let value = size.lexeme.parse::<u32>().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::InvalidLiteral,
                        size.span,
                        format!("invalid array size {}", size.lexeme),
                    )
                })?;
                array_size = Some(value);
            }
            end = self.expect(TokenKind::RightBracket)?.span;
            ty = self.env.array_of(ty);
        }

        let init = if self.eat(TokenKind::Assign).is_some() {
            let init = self.parse_initializer()?;
            end = init.span();
            Some(init)
        } else {
            None
        };

        Ok(Declarator {
            name,
            ty,
            array_size,
            init,
            span: name.span.to(end),
        })
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// Parse a type name with optional `[]` suffixes.
    ///
    /// Names the registry does not know yet are registered as class types;
    /// whether such a class exists is decided by the analyzer once the whole
    /// unit has been parsed.
    pub(super) fn parse_type(&mut self) -> Result<TypeRef<'ast>, ParseError> {
        let token = *self.peek();
        let base = if token.kind.is_primitive_type() {
            self.advance();
            self.env.type_id(token.lexeme).unwrap_or(TypeId::VOID)
        } else if token.kind == TokenKind::Identifier {
            self.advance();
            self.resolve_type_name(token.lexeme)
        } else if token.kind == TokenKind::Unreserved {
            return Err(Self::already_reported(token.span));
        } else {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                token.span,
                format!("expected type, found {}", token.kind),
            ));
        };

        let mut ty = base;
        let mut name = token.lexeme;
        let mut span = token.span;
        while self.check(TokenKind::LeftBracket) && self.peek_nth(1).kind == TokenKind::RightBracket {
            self.advance();
            span = span.to(self.advance().span);
            ty = self.env.array_of(ty);
            name = self.alloc_str(self.env.type_name(ty));
        }
        Ok(TypeRef { name, ty, span })
    }

    /// Classes visible from the current scope win over top-level names, so
    /// a nested class shadows an outer one of the same simple name.
    pub(super) fn resolve_type_name(&mut self, name: &str) -> TypeId {
        if let Some(ty) = self.env.resolve_class(name) {
            return ty;
        }
        match self.env.type_id(name) {
            Some(ty) => ty,
            None => self.env.add_type(name, 0, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use ycc_registry::ScopeEnvironment;

    use crate::ast::{Program, Stmt};
    use crate::Parser;
    use ycc_core::{SymbolFlags, TypeId};

    fn parse<'a>(source: &str, arena: &'a Bump, env: &mut ScopeEnvironment) -> Program<'a> {
        Parser::parse(source, arena, env).unwrap()
    }

    #[test]
    fn declares_classes_and_methods_while_parsing() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        parse(
            "public class Foo { static int count; int f(int a, double b) { return a; } }",
            &arena,
            &mut env,
        );
        let foo = env.type_id("Foo").unwrap();
        assert!(env.class_scope(foo).is_some());
        env.enter_class("Foo").unwrap();
        let f = env.resolve_method("f").unwrap();
        assert_eq!(f.qualified_name(), "Foo.f");
        assert_eq!(f.arity(), 2);
        assert_eq!(f.param_type(1), Some(TypeId::DOUBLE));
        assert_eq!(f.return_type(), TypeId::INT);
    }

    #[test]
    fn constructors_are_flagged() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let program = parse("class P { P(int x) { } void P2() { } }", &arena, &mut env);
        let Stmt::Class(class) = program.items[0] else {
            panic!("expected class");
        };
        let Stmt::Method(ctor) = class.body[0] else {
            panic!("expected constructor");
        };
        assert!(ctor.is_constructor);
        env.enter_class("P").unwrap();
        let info = env.resolve_method("P").unwrap();
        assert!(info.symbol.flags.contains(SymbolFlags::CONSTRUCTOR));
        assert_eq!(info.return_type(), TypeId::VOID);
    }

    #[test]
    fn array_declarators_register_array_types() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let program = parse("class A { int a[5]; int[] b; String s; }", &arena, &mut env);
        let Stmt::Class(class) = program.items[0] else {
            panic!("expected class");
        };
        let fields: Vec<_> = class.fields().collect();
        let int_array = env.type_id("int[]").unwrap();
        assert_eq!(fields[0].declarators[0].ty, int_array);
        assert_eq!(fields[0].declarators[0].array_size, Some(5));
        assert_eq!(fields[1].ty.ty, int_array);
        assert_eq!(fields[1].ty.name, "int[]");
        assert_eq!(fields[2].ty.ty, TypeId::STRING);
    }

    #[test]
    fn unknown_type_names_are_registered_not_rejected() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        parse("class A { Missing m; }", &arena, &mut env);
        let missing = env.type_id("Missing").unwrap();
        assert!(env.class_scope(missing).is_none());
    }

    #[test]
    fn duplicate_methods_are_reported() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        let errors = Parser::parse("class A { void f() {} void f() {} }", &arena, &mut env)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.iter().next().unwrap().message,
            "method f is already defined in class A"
        );
    }

    #[test]
    fn nested_classes_get_nested_scopes() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        parse("class Outer { static class Inner { void g() {} } }", &arena, &mut env);
        env.enter_class("Outer").unwrap();
        env.enter_class("Inner").unwrap();
        assert_eq!(env.qualifier(), "Outer.Inner");
        assert_eq!(env.resolve_method("g").unwrap().qualified_name(), "Outer.Inner.g");
        assert!(env.type_id("Outer.Inner").is_some());
        assert!(env.type_id("Inner").is_none());
    }

    #[test]
    fn same_named_nested_classes_get_distinct_types() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        parse(
            "class A { class In { int x; } In make() { return null; } } class B { class In { double y; } }",
            &arena,
            &mut env,
        );
        let a_in = env.type_id("A.In").unwrap();
        let b_in = env.type_id("B.In").unwrap();
        assert_ne!(a_in, b_in);
        assert!(env.resolve_member(a_in, "x").is_ok());
        assert!(env.resolve_member(b_in, "y").is_ok());
        env.enter_class("A").unwrap();
        assert_eq!(env.resolve_method("make").unwrap().return_type(), a_in);
    }

    #[test]
    fn forward_references_to_nested_classes_resolve() {
        let arena = Bump::new();
        let mut env = ScopeEnvironment::new();
        parse("class A { In make() { return null; } class In { } }", &arena, &mut env);
        let a_in = env.type_id("A.In").unwrap();
        assert!(env.class_scope(a_in).is_some());
        env.enter_class("A").unwrap();
        assert_eq!(env.resolve_method("make").unwrap().return_type(), a_in);
    }
}
