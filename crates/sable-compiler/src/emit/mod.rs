//! IR emitter.
//!
//! The [`IrEmitter`] is the append-only output list the expression and
//! statement compilers write into. It offers one method per instruction so
//! call sites read like the listing they produce.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = IrEmitter::new();
//! emitter.store_immediate16(0x0010, 1000);
//! emitter.store_immediate16(0x0012, 1);
//! emitter.arith(ArithOp::Add, Width::Word, 0x0014, 0x0010, 0x0012);
//! let ir = emitter.finish();
//! ```

mod labels;

pub use labels::LabelMaker;

use crate::ir::{Address, ArithOp, IrInstruction, Width};

#[derive(Debug, Default)]
pub struct IrEmitter {
    instructions: Vec<IrInstruction>,
}

impl IrEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instruction: IrInstruction) {
        log::trace!("ir: {instruction}");
        self.instructions.push(instruction);
    }

    pub fn instructions(&self) -> &[IrInstruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Drop everything emitted after the first `len` instructions.
    pub fn truncate(&mut self, len: usize) {
        self.instructions.truncate(len);
    }

    pub fn finish(self) -> Vec<IrInstruction> {
        self.instructions
    }

    // ==========================================================================
    // Control flow
    // ==========================================================================

    pub fn label(&mut self, name: impl Into<String>) {
        self.emit(IrInstruction::Label(name.into()));
    }

    pub fn jmp(&mut self, label: impl Into<String>) {
        self.emit(IrInstruction::Jmp(label.into()));
    }

    pub fn jz(&mut self, label: impl Into<String>, test: Address) {
        self.emit(IrInstruction::Jz {
            label: label.into(),
            test,
        });
    }

    pub fn jnz(&mut self, label: impl Into<String>, test: Address) {
        self.emit(IrInstruction::Jnz {
            label: label.into(),
            test,
        });
    }

    pub fn jalr(&mut self, label: impl Into<String>) {
        self.emit(IrInstruction::Jalr(label.into()));
    }

    pub fn indirect_jalr(&mut self, pointer: Address) {
        self.emit(IrInstruction::IndirectJalr(pointer));
    }

    pub fn enter(&mut self) {
        self.emit(IrInstruction::Enter);
    }

    pub fn leave(&mut self) {
        self.emit(IrInstruction::Leave);
    }

    pub fn push_return_address(&mut self) {
        self.emit(IrInstruction::PushReturnAddress);
    }

    pub fn ret(&mut self) {
        self.emit(IrInstruction::Ret);
    }

    pub fn hlt(&mut self) {
        self.emit(IrInstruction::Hlt);
    }

    pub fn nop(&mut self) {
        self.emit(IrInstruction::Nop);
    }

    // ==========================================================================
    // Stack
    // ==========================================================================

    pub fn push(&mut self, value: u8) {
        self.emit(IrInstruction::Push(value));
    }

    pub fn push16(&mut self, value: u16) {
        self.emit(IrInstruction::Push16(value));
    }

    pub fn pop(&mut self) {
        self.emit(IrInstruction::Pop);
    }

    pub fn pop16(&mut self) {
        self.emit(IrInstruction::Pop16);
    }

    // ==========================================================================
    // Data movement
    // ==========================================================================

    pub fn store_immediate(&mut self, dst: Address, value: u8) {
        self.emit(IrInstruction::StoreImmediate { dst, value });
    }

    pub fn store_immediate16(&mut self, dst: Address, value: u16) {
        self.emit(IrInstruction::StoreImmediate16 { dst, value });
    }

    pub fn copy_label(&mut self, dst: Address, label: impl Into<String>) {
        self.emit(IrInstruction::CopyLabel {
            dst,
            label: label.into(),
        });
    }

    /// Copy `count` bytes. Empty copies and self-copies emit nothing.
    pub fn copy_words(&mut self, dst: Address, src: Address, count: usize) {
        if count == 0 || dst == src {
            return;
        }
        self.emit(IrInstruction::CopyWords { dst, src, count });
    }

    pub fn copy_word_zero_extend(&mut self, dst: Address, src: Address) {
        self.emit(IrInstruction::CopyWordZeroExtend { dst, src });
    }

    pub fn copy_words_indirect_source(&mut self, dst: Address, src_ptr: Address, count: usize) {
        if count == 0 {
            return;
        }
        self.emit(IrInstruction::CopyWordsIndirectSource {
            dst,
            src_ptr,
            count,
        });
    }

    pub fn copy_words_indirect_destination(
        &mut self,
        dst_ptr: Address,
        src: Address,
        count: usize,
    ) {
        if count == 0 {
            return;
        }
        self.emit(IrInstruction::CopyWordsIndirectDestination {
            dst_ptr,
            src,
            count,
        });
    }

    // ==========================================================================
    // Arithmetic
    // ==========================================================================

    pub fn arith(&mut self, op: ArithOp, width: Width, dst: Address, left: Address, right: Address) {
        self.emit(IrInstruction::Arith {
            op,
            width,
            dst,
            left,
            right,
        });
    }

    pub fn addi16(&mut self, dst: Address, left: Address, imm: u16) {
        self.emit(IrInstruction::Addi16 { dst, left, imm });
    }

    pub fn subi16(&mut self, dst: Address, left: Address, imm: u16) {
        self.emit(IrInstruction::Subi16 { dst, left, imm });
    }

    pub fn muli16(&mut self, dst: Address, left: Address, imm: u16) {
        self.emit(IrInstruction::Muli16 { dst, left, imm });
    }

    // ==========================================================================
    // Peripherals
    // ==========================================================================

    pub fn peek_peripheral(&mut self, dst: Address, address: Address) {
        self.emit(IrInstruction::PeekPeripheral { dst, address });
    }

    pub fn poke_peripheral(&mut self, value: Address, address: Address) {
        self.emit(IrInstruction::PokePeripheral { value, address });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_copies_are_dropped() {
        let mut emitter = IrEmitter::new();
        emitter.copy_words(0x10, 0x20, 0);
        emitter.copy_words(0x10, 0x10, 2);
        emitter.copy_words_indirect_source(0x10, 0x20, 0);
        assert!(emitter.is_empty());
    }

    #[test]
    fn emits_in_order() {
        let mut emitter = IrEmitter::new();
        emitter.label("top");
        emitter.store_immediate(0x10, 1);
        emitter.jnz("top", 0x10);
        assert_eq!(
            emitter.finish(),
            vec![
                IrInstruction::Label("top".to_string()),
                IrInstruction::StoreImmediate {
                    dst: 0x10,
                    value: 1
                },
                IrInstruction::Jnz {
                    label: "top".to_string(),
                    test: 0x10
                },
            ]
        );
    }

    #[test]
    fn truncate_discards_tail() {
        let mut emitter = IrEmitter::new();
        emitter.hlt();
        emitter.hlt();
        emitter.truncate(1);
        assert_eq!(emitter.len(), 1);
    }
}
