//! The in-memory call stack.
//!
//! The stack grows down from `0x0000`, wrapping to the top of RAM. Words on
//! the stack are big-endian like everywhere else, so a word is pushed low
//! byte first.
//!
//! ```text
//! FP + 2   return address      pushed by push_return_address
//! FP       saved frame pointer pushed by enter
//! ```

use sable_machine::Register;

use super::Backend;
use crate::ir::Address;

impl Backend {
    pub(super) fn push(&mut self, value: u8) {
        self.reserve_stack_byte();
        self.asm.li(Register::M, value);
    }

    pub(super) fn push16(&mut self, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.push(low);
        self.push(high);
    }

    /// Push a register other than `A` to `D`, `U` or `V`.
    fn push_register(&mut self, src: Register) {
        self.reserve_stack_byte();
        self.asm.mov(Register::M, src);
    }

    fn push_memory(&mut self, src: Address) {
        self.subi16(self.stack_pointer, self.stack_pointer, 1);
        self.load(Register::A, src);
        self.load_uv_from(self.stack_pointer);
        self.asm.mov(Register::M, Register::A);
    }

    /// `SP -= 1` and point `U:V` at the new top.
    fn reserve_stack_byte(&mut self) {
        self.subi16(self.stack_pointer, self.stack_pointer, 1);
        self.load_uv_from(self.stack_pointer);
    }

    pub(super) fn push_return_address(&mut self) {
        self.push_register(Register::H);
        self.push_register(Register::G);
    }

    pub(super) fn enter(&mut self) {
        self.push_memory(self.frame_pointer.wrapping_add(1));
        self.push_memory(self.frame_pointer);
        self.copy_words(self.frame_pointer, self.stack_pointer, 2);
    }

    pub(super) fn leave(&mut self) {
        self.copy_words(self.stack_pointer, self.frame_pointer, 2);
        self.load_uv_from(self.stack_pointer);
        self.asm.mov(Register::A, Register::M);
        self.asm.inuv();
        self.asm.mov(Register::B, Register::M);
        self.store(self.frame_pointer, Register::A);
        self.store(self.frame_pointer.wrapping_add(1), Register::B);
        self.addi16(self.stack_pointer, self.stack_pointer, 2);
    }

    pub(super) fn ret(&mut self) {
        self.load_uv_from(self.stack_pointer);
        self.asm.mov(Register::X, Register::M);
        self.asm.inuv();
        self.asm.mov(Register::Y, Register::M);
        self.addi16(self.stack_pointer, self.stack_pointer, 2);
        self.asm.jmp();
    }
}
