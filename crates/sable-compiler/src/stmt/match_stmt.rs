//! Match statements.
//!
//! A match over a union picks the clause for the active member. The matched
//! value is stored once in a hidden local and every clause becomes an `is`
//! test on it:
//!
//! ```text
//!     var __match = expr
//!     [__match is T1]
//!     jz next1, test
//!     let a = __match as T1
//!     [clause 1]
//!     jmp tail
//! next1:
//!     ...
//!     [else]
//! tail:
//! ```
//!
//! A value that is not a union matches as a union of its own type alone.

use sable_ast::{AsExpr, Expr, Ident, IsExpr, MatchClause, MatchStmt};
use sable_core::{CompilerError, SymbolType};

use super::{Result, StmtCompiler, synthesized_decl};

const MATCH_VALUE: &str = "__match";

impl<'a> StmtCompiler<'a> {
    pub fn compile_match(&mut self, stmt: &MatchStmt<'_>) -> Result<()> {
        let matched = self.type_checker().check(stmt.expr)?;
        let expected = match matched.as_union() {
            Some(union) => union.members.clone(),
            None => vec![matched.materialized().unwrap_or(matched).into_unqualified()],
        };
        let clause_types = stmt
            .clauses
            .iter()
            .map(|clause| self.type_checker().resolve_type_expr(&clause.ty))
            .collect::<Result<Vec<_>>>()?;

        let extraneous: Vec<(&MatchClause<'_>, &SymbolType)> = stmt
            .clauses
            .iter()
            .zip(&clause_types)
            .filter(|(_, ty)| !expected.iter().any(|member| member.same_modulo_const(ty)))
            .collect();
        if let Some((clause, _)) = extraneous.first() {
            let what = type_list(extraneous.iter().map(|(_, ty)| *ty));
            return Err(CompilerError::statement(
                format!(
                    "extraneous {} in match statement: {what}",
                    clauses(extraneous.len())
                ),
                clause.name.span,
            ));
        }
        let missing: Vec<&SymbolType> = expected
            .iter()
            .filter(|member| !clause_types.iter().any(|ty| ty.same_modulo_const(member)))
            .collect();
        if !missing.is_empty() && stmt.else_clause.is_none() {
            return Err(CompilerError::statement(
                format!(
                    "match statement is not exhaustive. Missing {}: {}",
                    clauses(missing.len()),
                    type_list(missing.iter().copied())
                ),
                stmt.expr.span(),
            ));
        }

        if stmt.clauses.is_empty() {
            if let Some(else_clause) = &stmt.else_clause {
                self.compile_block(else_clause)?;
            }
            return Ok(());
        }

        self.session.symbols.push_scope();
        let span = stmt.expr.span();
        let hidden = Ident::new(MATCH_VALUE, span);
        self.compile_var_decl(&synthesized_decl(hidden, None, stmt.expr, true, span))?;
        let value = Expr::Identifier(hidden);
        let tail = self.session.next_label();
        for clause in stmt.clauses {
            let next = self.session.next_label();
            let test = IsExpr {
                expr: &value,
                test: &clause.ty,
                span: clause.name.span,
            };
            let condition = self.compile_condition(&Expr::Is(&test))?;
            self.emitter.jz(next.clone(), condition.address);
            self.session.temporaries.release(condition)?;

            self.session.symbols.push_scope();
            let cast = AsExpr {
                expr: &value,
                target: &clause.ty,
                span: clause.name.span,
            };
            let payload = Expr::As(&cast);
            self.compile_var_decl(&synthesized_decl(
                clause.name,
                None,
                &payload,
                false,
                clause.name.span,
            ))?;
            self.compile_statements(clause.block.stmts)?;
            self.session.symbols.pop_scope();

            self.emitter.jmp(tail.clone());
            self.emitter.label(next);
        }
        if let Some(else_clause) = &stmt.else_clause {
            self.compile_block(else_clause)?;
        }
        self.emitter.label(tail);
        self.session.symbols.pop_scope();
        log::trace!("lowered match with {} clauses", stmt.clauses.len());
        Ok(())
    }
}

fn clauses(count: usize) -> &'static str {
    if count == 1 { "clause" } else { "clauses" }
}

fn type_list<'t>(types: impl Iterator<Item = &'t SymbolType>) -> String {
    types.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
