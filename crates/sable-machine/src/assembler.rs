//! Two-pass assembler.
//!
//! Instructions are appended in order. A `LI` may take the high or low byte
//! of a label's address instead of a literal; those immediates are recorded
//! as fixups and patched by [`Assembler::end`] once every label is known.
//!
//! # Example
//!
//! ```
//! use sable_machine::{Assembler, Register};
//!
//! let mut asm = Assembler::new();
//! asm.begin();
//! asm.load_label_xy("done");
//! asm.jmp();
//! asm.li(Register::A, 1);
//! asm.label("done").unwrap();
//! asm.hlt();
//! let program = asm.end().unwrap();
//! assert_eq!(program.len(), 5);
//! ```

use rustc_hash::FxHashMap;

use crate::{AssemblerError, Instruction, Opcode, Register};

type Result<T> = std::result::Result<T, AssemblerError>;

/// Which byte of a label address an immediate takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelHalf {
    High,
    Low,
}

#[derive(Debug, Clone)]
struct Fixup {
    index: usize,
    label: String,
    half: LabelHalf,
}

#[derive(Debug, Default)]
pub struct Assembler {
    instructions: Vec<Instruction>,
    labels: FxHashMap<String, u16>,
    fixups: Vec<Fixup>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh program, discarding anything emitted so far.
    pub fn begin(&mut self) {
        self.instructions.clear();
        self.labels.clear();
        self.fixups.clear();
    }

    /// Resolve every label reference and return the finished program.
    pub fn end(&mut self) -> Result<Vec<Instruction>> {
        if self.instructions.len() > usize::from(u16::MAX) + 1 {
            return Err(AssemblerError::ProgramTooLarge {
                len: self.instructions.len(),
            });
        }
        for fixup in &self.fixups {
            let address = self.labels.get(&fixup.label).copied().ok_or_else(|| {
                AssemblerError::UnresolvedLabel {
                    name: fixup.label.clone(),
                }
            })?;
            let [high, low] = address.to_be_bytes();
            self.instructions[fixup.index].imm = match fixup.half {
                LabelHalf::High => high,
                LabelHalf::Low => low,
            };
        }
        log::debug!(
            "assembled {} instructions, {} labels, {} fixups",
            self.instructions.len(),
            self.labels.len(),
            self.fixups.len()
        );
        Ok(self.instructions.clone())
    }

    /// Address of the next instruction.
    pub fn program_counter(&self) -> usize {
        self.instructions.len()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Encoded words of the program emitted so far.
    pub fn words(&self) -> Vec<u32> {
        self.instructions.iter().map(Instruction::encode).collect()
    }

    /// Address of a label defined so far.
    pub fn label_address(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    /// Define `name` at the current program counter.
    pub fn label(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.labels.contains_key(&name) {
            return Err(AssemblerError::LabelRedefinition { name });
        }
        // Out-of-range addresses are reported by `end`.
        let address = self.program_counter() as u16;
        self.labels.insert(name, address);
        Ok(())
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    // ========================================================================
    // Label references
    // ========================================================================

    /// `LI dst, hi(label)` or `LI dst, lo(label)`.
    pub fn li_label(&mut self, dst: Register, label: impl Into<String>, half: LabelHalf) {
        self.fixups.push(Fixup {
            index: self.instructions.len(),
            label: label.into(),
            half,
        });
        self.emit(Instruction::li(dst, 0));
    }

    /// Point `X:Y` at a label, ready for a jump.
    pub fn load_label_xy(&mut self, label: &str) {
        self.li_label(Register::X, label, LabelHalf::High);
        self.li_label(Register::Y, label, LabelHalf::Low);
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    pub fn nop(&mut self) {
        self.emit(Instruction::bare(Opcode::Nop));
    }

    pub fn hlt(&mut self) {
        self.emit(Instruction::bare(Opcode::Hlt));
    }

    pub fn mov(&mut self, dst: Register, src: Register) {
        self.emit(Instruction::mov(dst, src));
    }

    pub fn li(&mut self, dst: Register, imm: u8) {
        self.emit(Instruction::li(dst, imm));
    }

    pub fn add(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Add, dst));
    }

    pub fn adc(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Adc, dst));
    }

    pub fn sub(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Sub, dst));
    }

    pub fn sbc(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Sbc, dst));
    }

    pub fn and(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::And, dst));
    }

    pub fn or(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Or, dst));
    }

    pub fn xor(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Xor, dst));
    }

    pub fn not(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Not, dst));
    }

    pub fn shl(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Shl, dst));
    }

    pub fn shr(&mut self, dst: Register) {
        self.emit(Instruction::alu(Opcode::Shr, dst));
    }

    pub fn cmp(&mut self) {
        self.emit(Instruction::alu(Opcode::Cmp, Register::None));
    }

    pub fn inuv(&mut self) {
        self.emit(Instruction::bare(Opcode::Inuv));
    }

    pub fn inxy(&mut self) {
        self.emit(Instruction::bare(Opcode::Inxy));
    }

    pub fn jmp(&mut self) {
        self.emit(Instruction::bare(Opcode::Jmp));
    }

    pub fn jalr(&mut self) {
        self.emit(Instruction::bare(Opcode::Jalr));
    }

    pub fn je(&mut self) {
        self.emit(Instruction::bare(Opcode::Je));
    }

    pub fn jne(&mut self) {
        self.emit(Instruction::bare(Opcode::Jne));
    }

    pub fn jc(&mut self) {
        self.emit(Instruction::bare(Opcode::Jc));
    }

    pub fn jnc(&mut self) {
        self.emit(Instruction::bare(Opcode::Jnc));
    }
}
