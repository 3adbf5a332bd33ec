//! If/else statements.

use sable_ast::IfStmt;

use super::{Result, StmtCompiler};

impl<'a> StmtCompiler<'a> {
    /// Compile an `if` statement.
    ///
    /// ```text
    ///     [condition]
    ///     jz else, condition
    ///     [then]
    ///     jmp tail
    /// else:
    ///     [else]
    /// tail:
    /// ```
    ///
    /// Without an else branch the condition jumps straight to `tail`.
    pub fn compile_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        let condition = self.compile_condition(if_stmt.condition)?;
        let tail = match if_stmt.else_branch {
            Some(else_branch) => {
                let else_label = self.session.next_label();
                let tail = self.session.next_label();
                self.emitter.jz(else_label.clone(), condition.address);
                self.session.temporaries.release(condition)?;
                self.compile(if_stmt.then_branch)?;
                self.emitter.jmp(tail.clone());
                self.emitter.label(else_label);
                self.compile(else_branch)?;
                tail
            }
            None => {
                let tail = self.session.next_label();
                self.emitter.jz(tail.clone(), condition.address);
                self.session.temporaries.release(condition)?;
                self.compile(if_stmt.then_branch)?;
                tail
            }
        };
        self.emitter.label(tail);
        Ok(())
    }
}
