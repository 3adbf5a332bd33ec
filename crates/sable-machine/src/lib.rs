//! Target CPU for the sable compiler.
//!
//! - [`isa`]: registers, opcodes and the 32-bit instruction encoding
//! - [`Assembler`]: symbolic emission with two-pass label resolution
//! - [`Machine`]: an instruction-level simulator used to run compiled programs

mod assembler;
mod error;
pub mod isa;
mod machine;

pub use assembler::{Assembler, LabelHalf};
pub use error::{AssemblerError, MachineError};
pub use isa::{Flags, Instruction, Opcode, Register};
pub use machine::{FRAME_POINTER_ADDRESS, Machine, MachineOptions, STACK_POINTER_ADDRESS};
