//! For loops.

use sable_ast::ForStmt;

use super::{Result, StmtCompiler};

impl<'a> StmtCompiler<'a> {
    /// Compile `for init; condition; increment { body }`.
    ///
    /// `init` is scoped to the loop. A missing condition loops forever.
    ///
    /// ```text
    ///     [init]
    /// head:
    ///     [condition]
    ///     jz tail, condition
    ///     [body]
    ///     [increment]
    ///     jmp head
    /// tail:
    /// ```
    pub fn compile_for(&mut self, for_stmt: &ForStmt<'_>) -> Result<()> {
        self.session.symbols.push_scope();
        if let Some(init) = for_stmt.init {
            self.compile(init)?;
        }
        let head = self.session.next_label();
        let tail = self.session.next_label();
        self.emitter.label(head.clone());
        if let Some(condition) = for_stmt.condition {
            let condition = self.compile_condition(condition)?;
            self.emitter.jz(tail.clone(), condition.address);
            self.session.temporaries.release(condition)?;
        }
        self.compile(for_stmt.body)?;
        if let Some(increment) = for_stmt.increment {
            let mut compiler = self.expr_compiler();
            if let Some(value) = compiler.compile(increment)? {
                compiler.release(value)?;
            }
        }
        self.emitter.jmp(head);
        self.emitter.label(tail);
        self.session.symbols.pop_scope();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::IrInstruction;
    use crate::stmt::test_support;
    use bumpalo::Bump;
    use sable_ast::{AstBuilder, BinaryOp};

    #[test]
    fn loop_variable_is_scoped_to_the_loop() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.for_stmt(
            Some(ast.var_decl("i", Some(ast.u8_type()), Some(ast.int(0)))),
            Some(ast.binary(BinaryOp::Lt, ast.ident("i"), ast.int(10))),
            Some(ast.assign(
                ast.ident("i"),
                ast.binary(BinaryOp::Add, ast.ident("i"), ast.int(1)),
            )),
            ast.block(&[]),
        )];
        let (session, ir) = test_support::compile(&program);
        assert!(session.symbols.lookup("i").is_none());
        assert_eq!(ir.last(), Some(&IrInstruction::Label(".L1".to_string())));
        assert!(ir.contains(&IrInstruction::Jmp(".L0".to_string())));
    }

    #[test]
    fn missing_condition_loops_forever() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let (_, ir) = test_support::compile(&[ast.for_stmt(None, None, None, ast.block(&[]))]);
        assert_eq!(
            ir,
            vec![
                IrInstruction::Label(".L0".to_string()),
                IrInstruction::Jmp(".L0".to_string()),
                IrInstruction::Label(".L1".to_string()),
            ]
        );
    }
}
