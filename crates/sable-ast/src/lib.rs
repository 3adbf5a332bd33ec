//! Syntax tree consumed by the sable compiler.
//!
//! The tree is a closed set of sum types ([`Expr`], [`Stmt`], [`TypeExpr`])
//! allocated in a `bumpalo` arena. The compiler only reads it; a front end, or
//! a test, builds it with [`AstBuilder`].

mod builder;
mod expr;
mod ops;
mod stmt;
mod types;

pub use builder::AstBuilder;
pub use expr::{
    AsExpr, AssignmentExpr, AssignmentKind, BinaryExpr, CallExpr, Expr, FieldInit, GetExpr,
    GroupExpr, Ident, IsExpr, LiteralArrayExpr, LiteralBool, LiteralInt, StructInitializerExpr,
    SubscriptExpr, UnaryExpr,
};
pub use ops::{BinaryOp, UnaryOp};
pub use stmt::{
    Block, ExprStmt, ForInStmt, ForStmt, FunctionDecl, IfStmt, MatchClause, MatchStmt, Param,
    ReturnStmt, Stmt, StorageQualifier, StructDecl, StructMember, VarDeclStmt, WhileStmt,
};
pub use types::{ArrayTypeExpr, FunctionTypeExpr, PrimitiveType, TypeExpr};
