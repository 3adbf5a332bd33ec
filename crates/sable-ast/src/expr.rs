//! Expression nodes.
//!
//! Children are arena references, so every node is `Copy` and the whole tree
//! lives as long as the arena it was built in.

use sable_core::Span;

use crate::{BinaryOp, TypeExpr, UnaryOp};

/// An identifier and where it appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    LiteralInt(LiteralInt),
    LiteralBool(LiteralBool),
    /// `[3]u8{1, 2, 3}`
    LiteralArray(&'ast LiteralArrayExpr<'ast>),
    Identifier(Ident<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    /// Parenthesized expression.
    Group(&'ast GroupExpr<'ast>),
    Assignment(&'ast AssignmentExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    /// `expr as T`
    As(&'ast AsExpr<'ast>),
    /// `expr is T`
    Is(&'ast IsExpr<'ast>),
    /// `expr.member`
    Get(&'ast GetExpr<'ast>),
    /// `expr[index]`
    Subscript(&'ast SubscriptExpr<'ast>),
    /// `Foo { bar: 1 }`
    StructInitializer(&'ast StructInitializerExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::LiteralInt(e) => e.span,
            Self::LiteralBool(e) => e.span,
            Self::LiteralArray(e) => e.span,
            Self::Identifier(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Group(e) => e.span,
            Self::Assignment(e) => e.span,
            Self::Call(e) => e.span,
            Self::As(e) => e.span,
            Self::Is(e) => e.span,
            Self::Get(e) => e.span,
            Self::Subscript(e) => e.span,
            Self::StructInitializer(e) => e.span,
        }
    }

    /// The identifier, if this expression is a bare name.
    pub fn as_identifier(&self) -> Option<Ident<'ast>> {
        match self {
            Self::Identifier(ident) => Some(*ident),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralInt {
    pub value: i64,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralBool {
    pub value: bool,
    pub span: Span,
}

/// An array literal.
///
/// `count: None` is `[_]`, inferred from the element count. With no element
/// type the type is inferred from the elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralArrayExpr<'ast> {
    pub count: Option<&'ast Expr<'ast>>,
    pub element_type: Option<&'ast TypeExpr<'ast>>,
    pub elements: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// Whether an assignment is an ordinary store or a declaration's
/// initializer. Initializers may write to constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentKind {
    Plain,
    Initial,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentExpr<'ast> {
    pub target: &'ast Expr<'ast>,
    pub value: &'ast Expr<'ast>,
    pub kind: AssignmentKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub arguments: &'ast [Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub target: &'ast TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsExpr<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub test: &'ast TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GetExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub member: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriptExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

/// One `name: value` pair of a struct initializer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInit<'ast> {
    pub name: Ident<'ast>,
    pub value: &'ast Expr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructInitializerExpr<'ast> {
    pub name: Ident<'ast>,
    pub fields: &'ast [FieldInit<'ast>],
    pub span: Span,
}
