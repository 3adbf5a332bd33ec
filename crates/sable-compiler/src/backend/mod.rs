//! IR to machine code.
//!
//! The [`Backend`] expands each IR instruction into target instructions
//! through the [`Assembler`]. The machine has no data stack and only
//! byte-wide registers, so everything the IR treats as a primitive becomes a
//! short sequence:
//!
//! - RAM is reached through `M`, with the address loaded into `U:V`;
//! - 16-bit values are processed low byte first, the high byte with carry;
//! - the stack pointer and frame pointer are big-endian words in RAM;
//! - `mul`, `div` and `mod` are loops over backend scratch memory.
//!
//! The program is wrapped as:
//!
//! ```text
//!     nop
//!     SP = 0; FP = 0
//!     [program]
//!     hlt
//! __panic:
//!     push16 0xdead
//!     hlt
//! ```
//!
//! Labels the backend needs for its own loops are numbered `.B0`, `.B1`, ...
//!
//! # Example
//!
//! ```ignore
//! let program = Backend::new(&session.options).lower(&ir)?;
//! let mut machine = Machine::new(program)?;
//! machine.run()?;
//! ```

mod arith;
mod memory;
mod peripheral;
mod stack;

use sable_core::CompilerError;
use sable_machine::{Assembler, AssemblerError, Instruction, Opcode, Register};

use crate::emit::LabelMaker;
use crate::ir::{Address, IrInstruction};
use crate::options::CompilerOptions;
use crate::session::PANIC_LABEL;

type Result<T> = std::result::Result<T, CompilerError>;

/// Value written at the stack top by the panic routine.
pub const PANIC_SENTINEL: u16 = 0xdead;

/// Lowers IR into target instructions.
pub struct Backend {
    asm: Assembler,
    labels: LabelMaker,
    stack_pointer: Address,
    frame_pointer: Address,
    scratch: Address,
}

impl Backend {
    pub fn new(options: &CompilerOptions) -> Self {
        Self {
            asm: Assembler::new(),
            labels: LabelMaker::new(".B"),
            stack_pointer: options.stack_pointer,
            frame_pointer: options.frame_pointer,
            scratch: options.scratch_start,
        }
    }

    /// Lower a whole program, with prologue, epilogue and the panic routine.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn lower(mut self, ir: &[IrInstruction]) -> Result<Vec<Instruction>> {
        self.asm.begin();
        self.prologue();
        for instruction in ir {
            log::trace!("lowering {instruction}");
            self.lower_instruction(instruction)?;
        }
        self.epilogue()?;
        let program = self.asm.end().map_err(assembler_error)?;
        log::debug!(
            "lowered {} IR instructions to {} machine instructions",
            ir.len(),
            program.len()
        );
        Ok(program)
    }

    fn prologue(&mut self) {
        self.asm.nop();
        self.store_immediate16(self.stack_pointer, 0);
        self.store_immediate16(self.frame_pointer, 0);
    }

    fn epilogue(&mut self) -> Result<()> {
        self.asm.hlt();
        self.label(PANIC_LABEL)?;
        self.push16(PANIC_SENTINEL);
        self.asm.hlt();
        Ok(())
    }

    fn lower_instruction(&mut self, instruction: &IrInstruction) -> Result<()> {
        use IrInstruction::*;
        match instruction {
            Nop => self.asm.nop(),
            Hlt => self.asm.hlt(),
            Label(name) => self.label(name)?,
            Jmp(label) => {
                self.asm.load_label_xy(label);
                self.asm.jmp();
            }
            Jz { label, test } => self.branch_on_byte(label, *test, Opcode::Je),
            Jnz { label, test } => self.branch_on_byte(label, *test, Opcode::Jne),
            Jalr(label) => {
                self.asm.load_label_xy(label);
                self.asm.jalr();
            }
            IndirectJalr(pointer) => {
                self.load_xy_from(*pointer);
                self.asm.jalr();
            }
            Enter => self.enter(),
            Leave => self.leave(),
            PushReturnAddress => self.push_return_address(),
            Ret => self.ret(),
            Push(value) => self.push(*value),
            Push16(value) => self.push16(*value),
            Pop => self.addi16(self.stack_pointer, self.stack_pointer, 1),
            Pop16 => self.addi16(self.stack_pointer, self.stack_pointer, 2),
            StoreImmediate { dst, value } => self.store_immediate(*dst, *value),
            StoreImmediate16 { dst, value } => self.store_immediate16(*dst, *value),
            CopyLabel { dst, label } => self.copy_label(*dst, label),
            CopyWords { dst, src, count } => self.copy_words(*dst, *src, *count),
            CopyWordZeroExtend { dst, src } => self.copy_word_zero_extend(*dst, *src),
            CopyWordsIndirectSource {
                dst,
                src_ptr,
                count,
            } => self.copy_words_indirect_source(*dst, *src_ptr, *count),
            CopyWordsIndirectDestination {
                dst_ptr,
                src,
                count,
            } => self.copy_words_indirect_destination(*dst_ptr, *src, *count),
            Arith {
                op,
                width,
                dst,
                left,
                right,
            } => self.arith(*op, *width, *dst, *left, *right)?,
            Addi16 { dst, left, imm } => self.addi16(*dst, *left, *imm),
            Subi16 { dst, left, imm } => self.subi16(*dst, *left, *imm),
            Muli16 { dst, left, imm } => self.muli16(*dst, *left, *imm)?,
            PeekPeripheral { dst, address } => self.peek_peripheral(*dst, *address),
            PokePeripheral { value, address } => self.poke_peripheral(*value, *address),
        }
        Ok(())
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn label(&mut self, name: &str) -> Result<()> {
        self.asm.label(name).map_err(assembler_error)
    }

    fn next_label(&mut self) -> String {
        self.labels.next_label()
    }

    /// Jump to `label` when the byte at `test` compared with zero satisfies
    /// `jump`.
    fn branch_on_byte(&mut self, label: &str, test: Address, jump: Opcode) {
        self.load(Register::A, test);
        self.asm.li(Register::B, 0);
        self.asm.cmp();
        self.asm.load_label_xy(label);
        self.asm.emit(Instruction::bare(jump));
    }

    /// Point `X:Y` at the code address stored in the word at `pointer`.
    fn load_xy_from(&mut self, pointer: Address) {
        self.set_uv(pointer);
        self.asm.mov(Register::X, Register::M);
        self.asm.inuv();
        self.asm.mov(Register::Y, Register::M);
    }
}

fn assembler_error(error: AssemblerError) -> CompilerError {
    match error {
        AssemblerError::LabelRedefinition { name } => CompilerError::LabelRedefinition { name },
        AssemblerError::UnresolvedLabel { name } => CompilerError::UnresolvedLabel { name },
        other => CompilerError::internal(other.to_string()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use sable_machine::Machine;

    #[test]
    fn empty_program_halts_with_clean_stack() {
        let machine = test_support::run(&[]);
        assert_eq!(machine.stack_pointer(), 0);
        assert_eq!(machine.frame_pointer(), 0);
        assert_eq!(machine.program()[0], Instruction::bare(Opcode::Nop));
    }

    #[test]
    fn panic_routine_leaves_sentinel() {
        let machine = test_support::run(&[IrInstruction::Jmp(PANIC_LABEL.to_string())]);
        assert_eq!(machine.stack16(0), PANIC_SENTINEL);
        assert_eq!(machine.stack_pointer(), 0xfffe);
    }

    #[test]
    fn conditional_branches() {
        let machine = test_support::run(&[
            IrInstruction::StoreImmediate {
                dst: 0x0010,
                value: 0,
            },
            IrInstruction::Jz {
                label: "zero".to_string(),
                test: 0x0010,
            },
            IrInstruction::StoreImmediate {
                dst: 0x0200,
                value: 1,
            },
            IrInstruction::Label("zero".to_string()),
            IrInstruction::Jnz {
                label: "skip".to_string(),
                test: 0x0010,
            },
            IrInstruction::StoreImmediate {
                dst: 0x0201,
                value: 1,
            },
            IrInstruction::Label("skip".to_string()),
        ]);
        assert_eq!(machine.load(0x0200), 0);
        assert_eq!(machine.load(0x0201), 1);
    }

    #[test]
    fn duplicate_label() {
        let err = Backend::new(&CompilerOptions::default())
            .lower(&[
                IrInstruction::Label("foo".to_string()),
                IrInstruction::Label("foo".to_string()),
            ])
            .unwrap_err();
        assert_eq!(err.to_string(), "label redefines existing symbol: `foo'");
    }

    #[test]
    fn unresolved_label() {
        let err = Backend::new(&CompilerOptions::default())
            .lower(&[IrInstruction::CopyLabel {
                dst: 0x0010,
                label: "foo".to_string(),
            }])
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot resolve label `foo'");
    }

    #[test]
    fn indirect_call_and_return() {
        let machine = test_support::run(&[
            IrInstruction::CopyLabel {
                dst: 0x0010,
                label: "f".to_string(),
            },
            IrInstruction::IndirectJalr(0x0010),
            IrInstruction::Jmp("end".to_string()),
            IrInstruction::Label("f".to_string()),
            IrInstruction::PushReturnAddress,
            IrInstruction::Enter,
            IrInstruction::StoreImmediate {
                dst: 0x0200,
                value: 0x42,
            },
            IrInstruction::Leave,
            IrInstruction::Ret,
            IrInstruction::Label("end".to_string()),
        ]);
        assert_eq!(machine.load(0x0200), 0x42);
        assert_eq!(machine.stack_pointer(), 0);
        assert_eq!(machine.frame_pointer(), 0);
    }

    #[test]
    fn lowered_program_runs_from_words() {
        let program = Backend::new(&CompilerOptions::default())
            .lower(&[IrInstruction::StoreImmediate16 {
                dst: 0x0300,
                value: 0xbeef,
            }])
            .unwrap();
        let words: Vec<u32> = program.iter().map(Instruction::encode).collect();
        let mut machine = Machine::from_words(&words, Default::default()).unwrap();
        machine.run().unwrap();
        assert_eq!(machine.load16(0x0300), 0xbeef);
    }
}
