//! Loads, stores and block copies.

use sable_machine::{LabelHalf, Register};

use super::Backend;
use crate::ir::Address;

impl Backend {
    /// `U:V = address`
    pub(super) fn set_uv(&mut self, address: Address) {
        let [high, low] = address.to_be_bytes();
        self.asm.li(Register::U, high);
        self.asm.li(Register::V, low);
    }

    pub(super) fn load(&mut self, dst: Register, address: Address) {
        self.set_uv(address);
        self.asm.mov(dst, Register::M);
    }

    pub(super) fn store(&mut self, address: Address, src: Register) {
        self.set_uv(address);
        self.asm.mov(Register::M, src);
    }

    /// `U:V = word[pointer]`. Clobbers `C`.
    pub(super) fn load_uv_from(&mut self, pointer: Address) {
        self.set_uv(pointer);
        self.asm.mov(Register::C, Register::M);
        self.asm.inuv();
        self.asm.mov(Register::V, Register::M);
        self.asm.mov(Register::U, Register::C);
    }

    pub(super) fn store_immediate(&mut self, dst: Address, value: u8) {
        self.set_uv(dst);
        self.asm.li(Register::M, value);
    }

    pub(super) fn store_immediate16(&mut self, dst: Address, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.set_uv(dst);
        self.asm.li(Register::M, high);
        self.asm.inuv();
        self.asm.li(Register::M, low);
    }

    pub(super) fn copy_label(&mut self, dst: Address, label: &str) {
        self.set_uv(dst);
        self.asm.li_label(Register::M, label, LabelHalf::High);
        self.asm.inuv();
        self.asm.li_label(Register::M, label, LabelHalf::Low);
    }

    /// Byte by byte, in whichever direction reads every source byte before
    /// it is overwritten.
    pub(super) fn copy_words(&mut self, dst: Address, src: Address, count: usize) {
        let overlaps_above = dst > src && usize::from(dst - src) < count;
        let offsets: Vec<usize> = if overlaps_above {
            (0..count).rev().collect()
        } else {
            (0..count).collect()
        };
        for offset in offsets {
            let offset = offset as u16;
            self.load(Register::A, src.wrapping_add(offset));
            self.store(dst.wrapping_add(offset), Register::A);
        }
    }

    pub(super) fn copy_word_zero_extend(&mut self, dst: Address, src: Address) {
        self.load(Register::A, src);
        self.set_uv(dst);
        self.asm.li(Register::M, 0);
        self.asm.inuv();
        self.asm.mov(Register::M, Register::A);
    }

    /// The source pointer is kept in `C:D` and advanced through `U:V`.
    pub(super) fn copy_words_indirect_source(&mut self, dst: Address, src_ptr: Address, count: usize) {
        self.load_pointer_cd(src_ptr);
        for offset in 0..count {
            self.asm.mov(Register::U, Register::C);
            self.asm.mov(Register::V, Register::D);
            self.asm.mov(Register::A, Register::M);
            self.asm.inuv();
            self.asm.mov(Register::C, Register::U);
            self.asm.mov(Register::D, Register::V);
            self.store(dst.wrapping_add(offset as u16), Register::A);
        }
    }

    pub(super) fn copy_words_indirect_destination(&mut self, dst_ptr: Address, src: Address, count: usize) {
        self.load_pointer_cd(dst_ptr);
        for offset in 0..count {
            self.load(Register::A, src.wrapping_add(offset as u16));
            self.asm.mov(Register::U, Register::C);
            self.asm.mov(Register::V, Register::D);
            self.asm.mov(Register::M, Register::A);
            self.asm.inuv();
            self.asm.mov(Register::C, Register::U);
            self.asm.mov(Register::D, Register::V);
        }
    }

    /// `C:D = word[pointer]`
    fn load_pointer_cd(&mut self, pointer: Address) {
        self.set_uv(pointer);
        self.asm.mov(Register::C, Register::M);
        self.asm.inuv();
        self.asm.mov(Register::D, Register::M);
    }
}
