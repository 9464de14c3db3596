//! Statement and declaration nodes.

use ycc_core::{Span, SymbolFlags, TypeId};

use crate::ast::expr::{Expr, Ident, TypeRef};

/// A statement. Class and method declarations are statements too, so a
/// class body is just a statement list.
#[derive(Debug, Clone, Copy)]
pub enum Stmt<'ast> {
    Class(&'ast ClassDecl<'ast>),
    Method(&'ast MethodDecl<'ast>),
    VarDecl(&'ast VarDecl<'ast>),
    Block(&'ast Block<'ast>),
    Expr(&'ast ExprStmt<'ast>),
    If(&'ast IfStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
    Break(Span),
    Continue(Span),
    Return(&'ast ReturnStmt<'ast>),
    Empty(Span),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Class(s) => s.span,
            Stmt::Method(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::Expr(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) | Stmt::Empty(span) => *span,
        }
    }
}

/// `modifiers class Name { body }`
#[derive(Debug)]
pub struct ClassDecl<'ast> {
    pub modifiers: SymbolFlags,
    pub name: Ident<'ast>,
    pub ty: TypeId,
    pub body: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl<'ast> ClassDecl<'ast> {
    /// Field declarations of the body, in source order.
    pub fn fields(&self) -> impl Iterator<Item = &'ast VarDecl<'ast>> + '_ {
        self.body.iter().filter_map(|stmt| match stmt {
            Stmt::VarDecl(decl) => Some(*decl),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param<'ast> {
    pub ty: TypeRef<'ast>,
    pub name: Ident<'ast>,
}

/// A method or constructor. Constructors return `void` and are named after
/// their class.
#[derive(Debug)]
pub struct MethodDecl<'ast> {
    pub modifiers: SymbolFlags,
    pub return_type: TypeRef<'ast>,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    /// `None` for `abstract` and `native` methods.
    pub body: Option<&'ast Block<'ast>>,
    pub is_constructor: bool,
    pub span: Span,
}

/// One name in a declaration list.
#[derive(Debug, Clone, Copy)]
pub struct Declarator<'ast> {
    pub name: Ident<'ast>,
    /// Declared type; `int a[]` makes this differ from the statement type.
    pub ty: TypeId,
    /// Fixed length of `int a[5]`.
    pub array_size: Option<u32>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// `modifiers Type a = 1, b;` in a class body or a method body.
#[derive(Debug)]
pub struct VarDecl<'ast> {
    pub modifiers: SymbolFlags,
    pub ty: TypeRef<'ast>,
    pub declarators: &'ast [Declarator<'ast>],
    pub span: Span,
}

#[derive(Debug)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub then_branch: Stmt<'ast>,
    pub else_branch: Option<Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy)]
pub enum ForInit<'ast> {
    VarDecl(&'ast VarDecl<'ast>),
    Exprs(&'ast [&'ast Expr<'ast>]),
}

#[derive(Debug)]
pub struct ForStmt<'ast> {
    pub init: Option<ForInit<'ast>>,
    pub cond: Option<&'ast Expr<'ast>>,
    pub update: &'ast [&'ast Expr<'ast>],
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug)]
pub struct WhileStmt<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub body: Stmt<'ast>,
    pub span: Span,
}

#[derive(Debug)]
pub struct DoWhileStmt<'ast> {
    pub body: Stmt<'ast>,
    pub cond: &'ast Expr<'ast>,
    pub span: Span,
}

/// A `case` arm; `label` is `None` for `default`.
#[derive(Debug, Clone, Copy)]
pub struct SwitchCase<'ast> {
    pub label: Option<&'ast Expr<'ast>>,
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug)]
pub struct SwitchStmt<'ast> {
    pub selector: &'ast Expr<'ast>,
    pub cases: &'ast [SwitchCase<'ast>],
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}
