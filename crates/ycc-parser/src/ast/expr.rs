//! Expression nodes.
//!
//! Every expression carries a type slot the semantic analyzer fills in. The
//! IR generator reads it back, so a node is never shared between two places
//! in the tree.

use std::cell::Cell;

use ycc_core::{Span, TypeId};
use ycc_registry::LiteralId;

use crate::ast::ops::{AssignOp, BinaryOp, PostfixOp, UnaryOp};

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A type written in source, already resolved against the type registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeRef<'ast> {
    /// Spelling as written, including `[]` suffixes.
    pub name: &'ast str,
    pub ty: TypeId,
    pub span: Span,
}

/// An expression.
#[derive(Debug, Clone, Copy)]
pub enum Expr<'ast> {
    Ident(&'ast IdentExpr<'ast>),
    Literal(&'ast LiteralExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    Index(&'ast IndexExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    Qualified(&'ast QualifiedExpr<'ast>),
    Array(&'ast ArrayExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Postfix(&'ast PostfixExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Ternary(&'ast TernaryExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.ident.span,
            Expr::Literal(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Qualified(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Postfix(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Ternary(e) => e.span,
        }
    }

    /// The node's type slot.
    pub fn annotation(&self) -> &'ast Cell<Option<TypeId>> {
        match *self {
            Expr::Ident(e) => &e.ty,
            Expr::Literal(e) => &e.ty,
            Expr::New(e) => &e.ty,
            Expr::Index(e) => &e.ty,
            Expr::Call(e) => &e.ty,
            Expr::Qualified(e) => &e.ty,
            Expr::Array(e) => &e.ty,
            Expr::Unary(e) => &e.ty,
            Expr::Postfix(e) => &e.ty,
            Expr::Binary(e) => &e.ty,
            Expr::Assign(e) => &e.ty,
            Expr::Ternary(e) => &e.ty,
        }
    }

    /// Type attached by the analyzer, `None` before analysis.
    pub fn ty(&self) -> Option<TypeId> {
        self.annotation().get()
    }

    pub fn set_type(&self, ty: TypeId) {
        self.annotation().set(Some(ty));
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }
}

/// A bare name: a local, parameter or field.
#[derive(Debug)]
pub struct IdentExpr<'ast> {
    pub ident: Ident<'ast>,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer or character literal. Characters keep their code point.
    Int { value: i64, is_char: bool, is_long: bool },
    Real(f64),
    Bool(bool),
    Null,
    /// String contents between the quotes, escapes still in source form.
    Str(&'ast str),
}

#[derive(Debug)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
    /// Pool entry of a string literal, set during analysis.
    pub interned: Cell<Option<LiteralId>>,
}

/// `new T(args)` or `new T[len]`.
#[derive(Debug)]
pub struct NewExpr<'ast> {
    pub type_name: Ident<'ast>,
    /// Element type for arrays, class type otherwise.
    pub base: TypeId,
    /// Array length, present for `new T[n]`.
    pub length: Option<&'ast Expr<'ast>>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub struct IndexExpr<'ast> {
    pub base: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

/// Call of a method by simple name.
#[derive(Debug)]
pub struct CallExpr<'ast> {
    pub callee: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

/// `left.right` where `right` is a field name or a call.
#[derive(Debug)]
pub struct QualifiedExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

/// `{a, b, c}` in an initializer.
#[derive(Debug)]
pub struct ArrayExpr<'ast> {
    pub elements: &'ast [&'ast Expr<'ast>],
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub struct PostfixExpr<'ast> {
    pub op: PostfixOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub struct AssignExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub op: AssignOp,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub struct TernaryExpr<'ast> {
    pub cond: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
    pub ty: Cell<Option<TypeId>>,
}
