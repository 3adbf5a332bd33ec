//! Return path analysis.
//!
//! [`ReturnChecker`] walks a function body and decides whether control can
//! reach its end without passing through a `return`. Non-void functions must
//! not; void functions that can get an implicit `leave; ret`.
//!
//! ```text
//! return                   never falls through
//! if c { A } else { B }    falls through if A or B does
//! if c { A }               always falls through
//! while / for / for-in     always falls through (the body may not run)
//! match                    falls through if any clause or the else does
//! { S1; S2; ... }          falls through unless some Si never does
//! ```
//!
//! A `return` followed by more statements in the same block is an error.
//!
//! # Example
//!
//! ```ignore
//! let falls_through = ReturnChecker::new().check_function(&body, &return_type, span)?;
//! ```

use sable_ast::{Block, Stmt};
use sable_core::{CompilerError, Span, SymbolType};

type Result<T> = std::result::Result<T, CompilerError>;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnChecker;

impl ReturnChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check a function body. Returns whether the body can fall off its end.
    pub fn check_function(&self, body: &Block<'_>, return_type: &SymbolType, span: Span) -> Result<bool> {
        let falls_through = self.block_falls_through(body.stmts)?;
        if falls_through && !return_type.is_void() {
            return Err(CompilerError::MissingReturn {
                expected: return_type.to_string(),
                span,
            });
        }
        Ok(falls_through)
    }

    /// Whether control can leave `stmts` at the bottom.
    pub fn block_falls_through(&self, stmts: &[Stmt<'_>]) -> Result<bool> {
        for (index, stmt) in stmts.iter().enumerate() {
            if matches!(stmt, Stmt::Return(_)) {
                if let Some(next) = stmts.get(index + 1) {
                    return Err(CompilerError::UnreachableCode { span: next.span() });
                }
                return Ok(false);
            }
            if !self.falls_through(stmt)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn falls_through(&self, stmt: &Stmt<'_>) -> Result<bool> {
        match stmt {
            Stmt::Return(_) => Ok(false),
            Stmt::Block(block) => self.block_falls_through(block.stmts),
            Stmt::If(if_stmt) => {
                let then = self.falls_through(if_stmt.then_branch)?;
                match if_stmt.else_branch {
                    Some(else_branch) => Ok(self.falls_through(else_branch)? || then),
                    None => Ok(true),
                }
            }
            Stmt::While(while_stmt) => {
                self.falls_through(while_stmt.body)?;
                Ok(true)
            }
            Stmt::For(for_stmt) => {
                self.falls_through(for_stmt.body)?;
                Ok(true)
            }
            Stmt::ForIn(for_in) => {
                self.block_falls_through(for_in.body.stmts)?;
                Ok(true)
            }
            Stmt::Match(match_stmt) => {
                let mut falls_through = match_stmt.clauses.is_empty();
                for clause in match_stmt.clauses {
                    falls_through |= self.block_falls_through(clause.block.stmts)?;
                }
                if let Some(else_clause) = &match_stmt.else_clause {
                    falls_through |= self.block_falls_through(else_clause.stmts)?;
                }
                Ok(falls_through)
            }
            Stmt::Expr(_) | Stmt::VarDecl(_) | Stmt::Function(_) | Stmt::Struct(_) => Ok(true),
        }
    }
}
