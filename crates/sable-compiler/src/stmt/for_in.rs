//! `for x in sequence` loops.
//!
//! The sequence is evaluated once into a hidden constant and the loop runs on
//! the plain `for` statement with a hidden `u16` index:
//!
//! ```text
//! Range:   let __sequence = r
//!          let __limit = __sequence.limit
//!          for var __index = __sequence.begin; __index < __limit; __index = __index + 1 {
//!              var x = __index
//!              [body]
//!          }
//!
//! [N]T, []T:
//!          let __sequence = xs
//!          let __limit = __sequence.count
//!          for var __index: u16 = 0; __index < __limit; __index = __index + 1 {
//!              var x = __sequence[__index]
//!              [body]
//!          }
//! ```

use sable_ast::{
    AssignmentExpr, AssignmentKind, BinaryExpr, BinaryOp, Block, Expr, ForInStmt, ForStmt,
    GetExpr, Ident, LiteralInt, PrimitiveType, Stmt, SubscriptExpr, TypeExpr,
};
use sable_core::CompilerError;

use super::{Result, StmtCompiler, synthesized_decl};

const SEQUENCE: &str = "__sequence";
const INDEX: &str = "__index";
const LIMIT: &str = "__limit";

impl<'a> StmtCompiler<'a> {
    pub fn compile_for_in(&mut self, stmt: &ForInStmt<'_>) -> Result<()> {
        let sequence_ty = self.type_checker().check(stmt.sequence)?;
        let is_range = sequence_ty.is_range();
        if !is_range && sequence_ty.element_type().is_none() {
            return Err(CompilerError::statement(
                "for-in loop requires iterable sequence",
                stmt.sequence.span(),
            ));
        }

        let span = stmt.span;
        let sequence = Expr::Identifier(Ident::new(SEQUENCE, span));
        let index = Expr::Identifier(Ident::new(INDEX, span));
        let limit = Expr::Identifier(Ident::new(LIMIT, span));
        let begin = GetExpr {
            object: &sequence,
            member: Ident::new("begin", span),
            span,
        };
        let bound = GetExpr {
            object: &sequence,
            member: Ident::new(if is_range { "limit" } else { "count" }, span),
            span,
        };
        let subscript = SubscriptExpr {
            object: &sequence,
            index: &index,
            span,
        };
        let start = if is_range {
            Expr::Get(&begin)
        } else {
            Expr::LiteralInt(LiteralInt { value: 0, span })
        };
        let end = Expr::Get(&bound);
        let element = if is_range {
            index
        } else {
            Expr::Subscript(&subscript)
        };

        self.session.symbols.push_scope();
        self.compile_var_decl(&synthesized_decl(
            Ident::new(SEQUENCE, span),
            None,
            stmt.sequence,
            false,
            span,
        ))?;
        self.compile_var_decl(&synthesized_decl(
            Ident::new(LIMIT, span),
            None,
            &end,
            false,
            span,
        ))?;

        let index_decl = synthesized_decl(
            Ident::new(INDEX, span),
            Some(TypeExpr::Primitive(PrimitiveType::U16, span)),
            &start,
            true,
            span,
        );
        let init = Stmt::VarDecl(&index_decl);
        let condition = BinaryExpr {
            left: &index,
            op: BinaryOp::Lt,
            right: &limit,
            span,
        };
        let condition = Expr::Binary(&condition);
        let one = Expr::LiteralInt(LiteralInt { value: 1, span });
        let next = BinaryExpr {
            left: &index,
            op: BinaryOp::Add,
            right: &one,
            span,
        };
        let next = Expr::Binary(&next);
        let increment = AssignmentExpr {
            target: &index,
            value: &next,
            kind: AssignmentKind::Plain,
            span,
        };
        let increment = Expr::Assignment(&increment);

        let element_decl = synthesized_decl(stmt.name, None, &element, true, stmt.name.span);
        let body = [Stmt::VarDecl(&element_decl), Stmt::Block(stmt.body)];
        let body = Stmt::Block(Block {
            stmts: &body,
            span: stmt.body.span,
        });
        self.compile_for(&ForStmt {
            init: Some(&init),
            condition: Some(&condition),
            increment: Some(&increment),
            body: &body,
            span,
        })?;
        self.session.symbols.pop_scope();
        Ok(())
    }
}
