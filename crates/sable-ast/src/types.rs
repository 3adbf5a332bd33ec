//! Type expressions, as written in declarations and casts.

use sable_core::Span;

use crate::{Expr, Ident};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Bool,
    U8,
    U16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    Primitive(PrimitiveType, Span),
    /// A struct or other declared type name.
    Named(Ident<'ast>),
    /// `*T`
    Pointer(&'ast TypeExpr<'ast>, Span),
    /// `const T`
    Const(&'ast TypeExpr<'ast>, Span),
    /// `[n]T`, or `[_]T` when `count` is `None`.
    Array(&'ast ArrayTypeExpr<'ast>),
    /// `[]T`
    DynamicArray(&'ast TypeExpr<'ast>, Span),
    /// `A | B`
    Union(&'ast [TypeExpr<'ast>], Span),
    /// `func(A, B) -> R`
    Function(&'ast FunctionTypeExpr<'ast>),
}

impl<'ast> TypeExpr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Primitive(_, span)
            | Self::Pointer(_, span)
            | Self::Const(_, span)
            | Self::DynamicArray(_, span)
            | Self::Union(_, span) => *span,
            Self::Named(ident) => ident.span,
            Self::Array(array) => array.span,
            Self::Function(function) => function.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayTypeExpr<'ast> {
    pub count: Option<&'ast Expr<'ast>>,
    pub element: TypeExpr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionTypeExpr<'ast> {
    pub return_type: TypeExpr<'ast>,
    pub arguments: &'ast [TypeExpr<'ast>],
    pub span: Span,
}
