//! Statement and declaration nodes.

use sable_core::{Span, Visibility};

use crate::{Expr, Ident, TypeExpr};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// An expression evaluated for its effects.
    Expr(ExprStmt<'ast>),
    VarDecl(&'ast VarDeclStmt<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    ForIn(&'ast ForInStmt<'ast>),
    Match(&'ast MatchStmt<'ast>),
    Block(Block<'ast>),
    Function(&'ast FunctionDecl<'ast>),
    Return(ReturnStmt<'ast>),
    Struct(&'ast StructDecl<'ast>),
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::For(s) => s.span,
            Self::ForIn(s) => s.span,
            Self::Match(s) => s.span,
            Self::Block(s) => s.span,
            Self::Function(s) => s.span,
            Self::Return(s) => s.span,
            Self::Struct(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// Where a variable lives. `Automatic` is static at program level and on
/// the stack inside functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageQualifier {
    #[default]
    Automatic,
    Static,
}

/// `var name: T = init` or `let name = init`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    pub name: Ident<'ast>,
    pub explicit_type: Option<TypeExpr<'ast>>,
    pub init: Option<&'ast Expr<'ast>>,
    /// `var` is mutable, `let` is not.
    pub is_mutable: bool,
    pub storage: StorageQualifier,
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_branch: &'ast Stmt<'ast>,
    pub else_branch: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// `for init; condition; increment { body }`. A missing condition loops
/// forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    pub init: Option<&'ast Stmt<'ast>>,
    pub condition: Option<&'ast Expr<'ast>>,
    pub increment: Option<&'ast Expr<'ast>>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// `for name in sequence { body }` over a `Range`, an array or a slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForInStmt<'ast> {
    pub name: Ident<'ast>,
    pub sequence: &'ast Expr<'ast>,
    pub body: Block<'ast>,
    pub span: Span,
}

/// One `(name: T) { block }` arm of a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchClause<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub block: Block<'ast>,
}

/// `match expr { (a: T) { ... }, (b: U) { ... }, else { ... } }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub clauses: &'ast [MatchClause<'ast>],
    pub else_clause: Option<Block<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub return_type: TypeExpr<'ast>,
    pub body: Block<'ast>,
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructMember<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructDecl<'ast> {
    pub name: Ident<'ast>,
    pub members: &'ast [StructMember<'ast>],
    pub visibility: Visibility,
    pub span: Span,
}
