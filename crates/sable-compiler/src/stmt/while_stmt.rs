//! While loops.

use sable_ast::WhileStmt;

use super::{Result, StmtCompiler};

impl<'a> StmtCompiler<'a> {
    /// Compile a `while` loop.
    ///
    /// ```text
    /// head:
    ///     [condition]
    ///     jz tail, condition
    ///     [body]
    ///     jmp head
    /// tail:
    /// ```
    pub fn compile_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<()> {
        let head = self.session.next_label();
        let tail = self.session.next_label();
        self.emitter.label(head.clone());
        let condition = self.compile_condition(while_stmt.condition)?;
        self.emitter.jz(tail.clone(), condition.address);
        self.session.temporaries.release(condition)?;
        self.compile(while_stmt.body)?;
        self.emitter.jmp(head);
        self.emitter.label(tail);
        Ok(())
    }
}
