//! Peripheral access.
//!
//! The peripheral data bus is wired with its bits in reverse order. Bytes are
//! mirrored in software on the way out and on the way back, so programs and
//! devices both see straight values.

use sable_machine::Register;

use super::Backend;
use crate::ir::Address;

impl Backend {
    pub(super) fn peek_peripheral(&mut self, dst: Address, address: Address) {
        self.load_xy_from(address);
        self.asm.mov(Register::C, Register::P);
        self.reverse_bits();
        self.store(dst, Register::D);
    }

    pub(super) fn poke_peripheral(&mut self, value: Address, address: Address) {
        self.load(Register::C, value);
        self.reverse_bits();
        self.load_xy_from(address);
        self.asm.mov(Register::P, Register::D);
    }

    /// `D = reverse_bits(C)`. Shifts the low bit of `C` out into the carry
    /// and doubles `D` with that carry, eight times. Clobbers `A`, `B`, `C`.
    fn reverse_bits(&mut self) {
        self.asm.li(Register::D, 0);
        for _ in 0..8 {
            self.asm.mov(Register::A, Register::C);
            self.asm.shr(Register::C);
            self.asm.mov(Register::A, Register::D);
            self.asm.mov(Register::B, Register::D);
            self.asm.adc(Register::D);
        }
    }
}
