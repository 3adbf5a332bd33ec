//! Block statements.

use sable_ast::Block;

use super::{Result, StmtCompiler};

impl<'a> StmtCompiler<'a> {
    /// Compile `{ ... }` in a scope of its own. Frame bytes the block
    /// allocates stay reserved after it closes.
    pub fn compile_block(&mut self, block: &Block<'_>) -> Result<()> {
        self.session.symbols.push_scope();
        self.compile_statements(block.stmts)?;
        self.session.symbols.pop_scope();
        Ok(())
    }
}
