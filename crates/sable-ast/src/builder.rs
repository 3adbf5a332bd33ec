//! Arena-backed construction of syntax trees.
//!
//! Front ends and tests build trees through [`AstBuilder`] instead of wiring
//! `arena.alloc` calls by hand. Every node gets the builder's current span,
//! which [`AstBuilder::at`] moves.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use sable_ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let sum = ast.binary(BinaryOp::Add, ast.int(1000), ast.int(1));
//! let stmt = ast.expr_stmt(sum);
//! assert!(matches!(stmt, sable_ast::Stmt::Expr(_)));
//! ```

use std::cell::Cell;

use bumpalo::Bump;
use sable_core::{Span, Visibility};

use crate::{
    ArrayTypeExpr, AsExpr, AssignmentExpr, AssignmentKind, BinaryExpr, BinaryOp, Block, CallExpr,
    Expr, ExprStmt, FieldInit, ForInStmt, ForStmt, FunctionDecl, FunctionTypeExpr, GetExpr,
    GroupExpr, Ident, IfStmt, IsExpr, LiteralArrayExpr, LiteralBool, LiteralInt, MatchClause,
    MatchStmt, Param, PrimitiveType,
    ReturnStmt, Stmt, StorageQualifier, StructDecl, StructInitializerExpr, StructMember,
    SubscriptExpr, TypeExpr, UnaryExpr, UnaryOp, VarDeclStmt, WhileStmt,
};

pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Cell<Span>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Cell::new(Span::default()),
        }
    }

    /// Attach `line:col` to the nodes built from now on.
    pub fn at(&self, line: u32, col: u32) -> &Self {
        self.span.set(Span::point(line, col));
        self
    }

    pub fn span(&self) -> Span {
        self.span.get()
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn alloc<T>(&self, value: T) -> &'ast T {
        self.arena.alloc(value)
    }

    pub fn name(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn int(&self, value: i64) -> Expr<'ast> {
        Expr::LiteralInt(LiteralInt {
            value,
            span: self.span(),
        })
    }

    pub fn boolean(&self, value: bool) -> Expr<'ast> {
        Expr::LiteralBool(LiteralBool {
            value,
            span: self.span(),
        })
    }

    pub fn ident(&self, name: &str) -> Expr<'ast> {
        Expr::Identifier(self.name(name))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.alloc(UnaryExpr {
            op,
            operand: self.alloc(operand),
            span: self.span(),
        }))
    }

    pub fn neg(&self, operand: Expr<'ast>) -> Expr<'ast> {
        self.unary(UnaryOp::Neg, operand)
    }

    pub fn address_of(&self, operand: Expr<'ast>) -> Expr<'ast> {
        self.unary(UnaryOp::AddressOf, operand)
    }

    pub fn binary(&self, op: BinaryOp, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.alloc(BinaryExpr {
            left: self.alloc(left),
            op,
            right: self.alloc(right),
            span: self.span(),
        }))
    }

    pub fn group(&self, expr: Expr<'ast>) -> Expr<'ast> {
        Expr::Group(self.alloc(GroupExpr {
            expr: self.alloc(expr),
            span: self.span(),
        }))
    }

    fn assignment(&self, target: Expr<'ast>, value: Expr<'ast>, kind: AssignmentKind) -> Expr<'ast> {
        Expr::Assignment(self.alloc(AssignmentExpr {
            target: self.alloc(target),
            value: self.alloc(value),
            kind,
            span: self.span(),
        }))
    }

    pub fn assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Expr<'ast> {
        self.assignment(target, value, AssignmentKind::Plain)
    }

    pub fn initial_assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Expr<'ast> {
        self.assignment(target, value, AssignmentKind::Initial)
    }

    pub fn call(&self, callee: Expr<'ast>, arguments: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Call(self.alloc(CallExpr {
            callee: self.alloc(callee),
            arguments: self.arena.alloc_slice_copy(arguments),
            span: self.span(),
        }))
    }

    /// Call of a function by name.
    pub fn call_named(&self, name: &str, arguments: &[Expr<'ast>]) -> Expr<'ast> {
        self.call(self.ident(name), arguments)
    }

    pub fn cast(&self, expr: Expr<'ast>, target: TypeExpr<'ast>) -> Expr<'ast> {
        Expr::As(self.alloc(AsExpr {
            expr: self.alloc(expr),
            target: self.alloc(target),
            span: self.span(),
        }))
    }

    pub fn is_type(&self, expr: Expr<'ast>, test: TypeExpr<'ast>) -> Expr<'ast> {
        Expr::Is(self.alloc(IsExpr {
            expr: self.alloc(expr),
            test: self.alloc(test),
            span: self.span(),
        }))
    }

    pub fn get(&self, object: Expr<'ast>, member: &str) -> Expr<'ast> {
        Expr::Get(self.alloc(GetExpr {
            object: self.alloc(object),
            member: self.name(member),
            span: self.span(),
        }))
    }

    pub fn subscript(&self, object: Expr<'ast>, index: Expr<'ast>) -> Expr<'ast> {
        Expr::Subscript(self.alloc(SubscriptExpr {
            object: self.alloc(object),
            index: self.alloc(index),
            span: self.span(),
        }))
    }

    pub fn struct_init(&self, name: &str, fields: &[(&str, Expr<'ast>)]) -> Expr<'ast> {
        let fields = self
            .arena
            .alloc_slice_fill_iter(fields.iter().map(|(field, value)| FieldInit {
                name: self.name(field),
                value: self.alloc(*value),
            }));
        Expr::StructInitializer(self.alloc(StructInitializerExpr {
            name: self.name(name),
            fields,
            span: self.span(),
        }))
    }

    /// `begin..limit`, which is sugar for `Range { begin, limit }`.
    pub fn range(&self, begin: Expr<'ast>, limit: Expr<'ast>) -> Expr<'ast> {
        self.struct_init(
            sable_core::RANGE_TYPE_NAME,
            &[("begin", begin), ("limit", limit)],
        )
    }

    pub fn array_literal(
        &self,
        count: Option<Expr<'ast>>,
        element_type: Option<TypeExpr<'ast>>,
        elements: &[Expr<'ast>],
    ) -> Expr<'ast> {
        Expr::LiteralArray(self.alloc(LiteralArrayExpr {
            count: count.map(|count| self.alloc(count)),
            element_type: element_type.map(|ty| self.alloc(ty)),
            elements: self.arena.alloc_slice_copy(elements),
            span: self.span(),
        }))
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn primitive(&self, kind: PrimitiveType) -> TypeExpr<'ast> {
        TypeExpr::Primitive(kind, self.span())
    }

    pub fn u8_type(&self) -> TypeExpr<'ast> {
        self.primitive(PrimitiveType::U8)
    }

    pub fn u16_type(&self) -> TypeExpr<'ast> {
        self.primitive(PrimitiveType::U16)
    }

    pub fn bool_type(&self) -> TypeExpr<'ast> {
        self.primitive(PrimitiveType::Bool)
    }

    pub fn void_type(&self) -> TypeExpr<'ast> {
        self.primitive(PrimitiveType::Void)
    }

    pub fn named_type(&self, name: &str) -> TypeExpr<'ast> {
        TypeExpr::Named(self.name(name))
    }

    pub fn pointer_type(&self, pointee: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Pointer(self.alloc(pointee), self.span())
    }

    pub fn const_type(&self, inner: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Const(self.alloc(inner), self.span())
    }

    pub fn array_type(&self, count: Option<Expr<'ast>>, element: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Array(self.alloc(ArrayTypeExpr {
            count: count.map(|count| self.alloc(count)),
            element,
            span: self.span(),
        }))
    }

    pub fn dynamic_array_type(&self, element: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::DynamicArray(self.alloc(element), self.span())
    }

    pub fn union_type(&self, members: &[TypeExpr<'ast>]) -> TypeExpr<'ast> {
        TypeExpr::Union(self.arena.alloc_slice_copy(members), self.span())
    }

    pub fn function_type(
        &self,
        return_type: TypeExpr<'ast>,
        arguments: &[TypeExpr<'ast>],
    ) -> TypeExpr<'ast> {
        TypeExpr::Function(self.alloc(FunctionTypeExpr {
            return_type,
            arguments: self.arena.alloc_slice_copy(arguments),
            span: self.span(),
        }))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn expr_stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr: self.alloc(expr),
            span: self.span(),
        })
    }

    /// A declaration with every field spelled out.
    pub fn declaration(
        &self,
        name: &str,
        explicit_type: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
        is_mutable: bool,
        storage: StorageQualifier,
    ) -> Stmt<'ast> {
        Stmt::VarDecl(self.alloc(VarDeclStmt {
            name: self.name(name),
            explicit_type,
            init: init.map(|init| self.alloc(init)),
            is_mutable,
            storage,
            visibility: Visibility::Private,
            span: self.span(),
        }))
    }

    /// `var name: T = init`
    pub fn var_decl(
        &self,
        name: &str,
        explicit_type: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        self.declaration(name, explicit_type, init, true, StorageQualifier::Automatic)
    }

    /// `let name: T = init`
    pub fn let_decl(
        &self,
        name: &str,
        explicit_type: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        self.declaration(name, explicit_type, init, false, StorageQualifier::Automatic)
    }

    /// `static var name: T = init`
    pub fn static_var_decl(
        &self,
        name: &str,
        explicit_type: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        self.declaration(name, explicit_type, init, true, StorageQualifier::Static)
    }

    pub fn if_stmt(
        &self,
        condition: Expr<'ast>,
        then_branch: Stmt<'ast>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::If(self.alloc(IfStmt {
            condition: self.alloc(condition),
            then_branch: self.alloc(then_branch),
            else_branch: else_branch.map(|stmt| self.alloc(stmt)),
            span: self.span(),
        }))
    }

    pub fn while_stmt(&self, condition: Expr<'ast>, body: Stmt<'ast>) -> Stmt<'ast> {
        Stmt::While(self.alloc(WhileStmt {
            condition: self.alloc(condition),
            body: self.alloc(body),
            span: self.span(),
        }))
    }

    pub fn for_stmt(
        &self,
        init: Option<Stmt<'ast>>,
        condition: Option<Expr<'ast>>,
        increment: Option<Expr<'ast>>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        Stmt::For(self.alloc(ForStmt {
            init: init.map(|stmt| self.alloc(stmt)),
            condition: condition.map(|expr| self.alloc(expr)),
            increment: increment.map(|expr| self.alloc(expr)),
            body: self.alloc(body),
            span: self.span(),
        }))
    }

    /// `for name in sequence { body }`
    pub fn for_in(&self, name: &str, sequence: Expr<'ast>, body: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::ForIn(self.alloc(ForInStmt {
            name: self.name(name),
            sequence: self.alloc(sequence),
            body: self.block_of(body),
            span: self.span(),
        }))
    }

    /// A match with one clause per `(name, type, body)`.
    pub fn match_stmt(
        &self,
        expr: Expr<'ast>,
        clauses: &[(&str, TypeExpr<'ast>, &[Stmt<'ast>])],
        else_clause: Option<&[Stmt<'ast>]>,
    ) -> Stmt<'ast> {
        let clauses = self
            .arena
            .alloc_slice_fill_iter(clauses.iter().map(|(name, ty, body)| MatchClause {
                name: self.name(name),
                ty: *ty,
                block: self.block_of(body),
            }));
        Stmt::Match(self.alloc(MatchStmt {
            expr: self.alloc(expr),
            clauses,
            else_clause: else_clause.map(|body| self.block_of(body)),
            span: self.span(),
        }))
    }

    pub fn block_of(&self, stmts: &[Stmt<'ast>]) -> Block<'ast> {
        Block {
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        }
    }

    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(self.block_of(stmts))
    }

    pub fn function(
        &self,
        name: &str,
        params: &[(&str, TypeExpr<'ast>)],
        return_type: TypeExpr<'ast>,
        body: &[Stmt<'ast>],
    ) -> Stmt<'ast> {
        let params = self
            .arena
            .alloc_slice_fill_iter(params.iter().map(|(param, ty)| Param {
                name: self.name(param),
                ty: *ty,
            }));
        Stmt::Function(self.alloc(FunctionDecl {
            name: self.name(name),
            params,
            return_type,
            body: self.block_of(body),
            visibility: Visibility::Private,
            span: self.span(),
        }))
    }

    pub fn ret(&self, value: Option<Expr<'ast>>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value: value.map(|value| self.alloc(value)),
            span: self.span(),
        })
    }

    pub fn struct_decl(&self, name: &str, members: &[(&str, TypeExpr<'ast>)]) -> Stmt<'ast> {
        let members = self
            .arena
            .alloc_slice_fill_iter(members.iter().map(|(member, ty)| StructMember {
                name: self.name(member),
                ty: *ty,
            }));
        Stmt::Struct(self.alloc(StructDecl {
            name: self.name(name),
            members,
            visibility: Visibility::Private,
            span: self.span(),
        }))
    }

    /// Move a statement list into the arena.
    pub fn program(&self, stmts: &[Stmt<'ast>]) -> &'ast [Stmt<'ast>] {
        self.arena.alloc_slice_copy(stmts)
    }
}
