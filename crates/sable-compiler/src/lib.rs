//! The sable compiler: type checking, IR generation and lowering to the
//! target machine.
//!
//! ## Pipeline
//!
//! ```text
//! AST -> StmtCompiler (+ ExprCompiler, TypeChecker) -> IR -> Backend -> machine code
//! ```
//!
//! ## Modules
//!
//! - [`type_checker`]: expression types, constant folding and conversions
//! - [`ir`]: the intermediate instruction set
//! - [`temporaries`]: LIFO allocation of the temporary window
//! - [`emit`]: the IR output list and label numbering
//! - [`expr`]: expression compiler
//! - [`stmt`]: statement compiler
//! - [`return_checker`]: return path analysis
//! - [`backend`]: IR to target instructions
//! - [`session`]: per-compilation state

pub mod backend;
pub mod emit;
pub mod expr;
pub mod ir;
pub mod options;
pub mod return_checker;
pub mod session;
pub mod stmt;
pub mod temporaries;
pub mod type_checker;

pub use backend::{Backend, PANIC_SENTINEL};
pub use emit::{IrEmitter, LabelMaker};
pub use expr::ExprCompiler;
pub use ir::{Address, ArithOp, IrInstruction, Width};
pub use options::CompilerOptions;
pub use return_checker::ReturnChecker;
pub use session::{CompilerSession, PANIC_LABEL};
pub use stmt::StmtCompiler;
pub use temporaries::{Temporary, TemporaryStack};
pub use type_checker::{ConversionContext, TypeChecker};

use sable_ast::Stmt;
use sable_core::CompilerErrors;
use sable_machine::Instruction;

/// A program lowered all the way to machine code.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    /// The IR the machine code was generated from.
    pub ir: Vec<IrInstruction>,
    pub instructions: Vec<Instruction>,
}

impl CompiledProgram {
    /// Encoded instruction words.
    pub fn words(&self) -> Vec<u32> {
        self.instructions.iter().map(Instruction::encode).collect()
    }
}

/// The compiler entry point. Every call runs in a fresh [`CompilerSession`].
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a program to IR.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_to_ir(&self, program: &[Stmt<'_>]) -> Result<Vec<IrInstruction>, CompilerErrors> {
        let mut session = CompilerSession::new(self.options.clone());
        let mut emitter = IrEmitter::new();
        StmtCompiler::new(&mut session, &mut emitter).compile_program(program)?;
        let ir = emitter.finish();
        log::debug!(
            "generated {} IR instructions using {} labels",
            ir.len(),
            session.labels.count()
        );
        Ok(ir)
    }

    /// Compile a program to machine code.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, program: &[Stmt<'_>]) -> Result<CompiledProgram, CompilerErrors> {
        let ir = self.compile_to_ir(program)?;
        let instructions = Backend::new(&self.options).lower(&ir)?;
        Ok(CompiledProgram { ir, instructions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;
    use sable_machine::Machine;

    #[test]
    fn compile_and_run() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.var_decl("x", None, Some(ast.int(1000)))];
        let compiled = Compiler::default().compile(&program).unwrap();
        assert_eq!(compiled.words().len(), compiled.instructions.len());
        let mut machine = Machine::new(compiled.instructions).unwrap();
        machine.run().unwrap();
        assert_eq!(machine.load16(0x0110), 1000);
    }

    #[test]
    fn errors_stop_before_the_backend() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.expr_stmt(ast.ident("nope"))];
        let errors = Compiler::default().compile(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn backend_errors_are_reported() {
        let mut emitter = IrEmitter::new();
        emitter.copy_label(0x0010, "missing");
        let err = Backend::new(&CompilerOptions::default())
            .lower(&emitter.finish())
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot resolve label `missing'");
    }
}
