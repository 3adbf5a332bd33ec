//! # sable
//!
//! Middle and back end of a compiler for a small statically-typed language,
//! targeting an 8-bit CPU.
//!
//! ```text
//! AST ──► type checker ──► expression / statement compiler ──► IR ──► backend ──► machine code
//! ```
//!
//! The crates of the workspace, re-exported here:
//!
//! - [`core`]: spans, errors, types, symbols and scopes
//! - [`ast`]: the arena-allocated syntax tree and its builder
//! - [`compiler`]: type checking, IR generation and lowering
//! - [`machine`]: the target instruction set, assembler and simulator
//!
//! # Example
//!
//! ```ignore
//! use sable::prelude::*;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let program = [ast.var_decl("x", Some(ast.u8_type()), Some(ast.int(42)))];
//! let machine = sable::run(&program)?;
//! assert_eq!(machine.load(0x0110), 42);
//! ```

mod error;
mod pipeline;

pub use sable_ast as ast;
pub use sable_compiler as compiler;
pub use sable_core as core;
pub use sable_machine as machine;

pub use bumpalo::Bump;
pub use error::{SableError, SableResult};
pub use pipeline::{Pipeline, compile_program, compile_to_machine_code, run};

pub mod prelude {
    pub use crate::error::{SableError, SableResult};
    pub use crate::pipeline::{Pipeline, compile_program, compile_to_machine_code, run};
    pub use bumpalo::Bump;
    pub use sable_ast::{AstBuilder, BinaryOp, Expr, Stmt, TypeExpr, UnaryOp};
    pub use sable_compiler::{CompiledProgram, CompilerOptions, IrInstruction, PANIC_SENTINEL};
    pub use sable_core::{CompilerError, CompilerErrors, Span, SymbolType};
    pub use sable_machine::{Instruction, Machine, MachineOptions};
}
