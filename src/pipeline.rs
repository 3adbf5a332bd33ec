//! The end-to-end pipeline: AST to IR, IR to machine code, machine code to a
//! halted [`Machine`].

use sable_ast::Stmt;
use sable_compiler::{CompiledProgram, Compiler, CompilerOptions, IrInstruction};
use sable_machine::{Machine, MachineOptions};

use crate::error::SableResult;

/// Compiler and machine configuration for a whole run.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    compiler: Compiler,
    machine_options: MachineOptions,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler = Compiler::new(options);
        self
    }

    pub fn with_machine_options(mut self, options: MachineOptions) -> Self {
        self.machine_options = options;
        self
    }

    pub fn compiler_options(&self) -> &CompilerOptions {
        self.compiler.options()
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_program(&self, program: &[Stmt<'_>]) -> SableResult<Vec<IrInstruction>> {
        Ok(self.compiler.compile_to_ir(program)?)
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_to_machine_code(&self, program: &[Stmt<'_>]) -> SableResult<CompiledProgram> {
        Ok(self.compiler.compile(program)?)
    }

    /// Compile `program` and run it until it halts.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self, program: &[Stmt<'_>]) -> SableResult<Machine> {
        let compiled = self.compile_to_machine_code(program)?;
        let mut machine =
            Machine::with_options(compiled.instructions, self.machine_options)?;
        let steps = machine.run()?;
        log::debug!("program halted after {steps} steps");
        Ok(machine)
    }
}

/// Compile `program` to IR with default options.
pub fn compile_program(program: &[Stmt<'_>]) -> SableResult<Vec<IrInstruction>> {
    Pipeline::new().compile_program(program)
}

/// Compile `program` to machine code with `options`.
pub fn compile_to_machine_code(
    program: &[Stmt<'_>],
    options: &CompilerOptions,
) -> SableResult<CompiledProgram> {
    Pipeline::new()
        .with_compiler_options(options.clone())
        .compile_to_machine_code(program)
}

/// Compile `program` with default options and run it.
pub fn run(program: &[Stmt<'_>]) -> SableResult<Machine> {
    Pipeline::new().run(program)
}
