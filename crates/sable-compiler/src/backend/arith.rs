//! Arithmetic and comparisons.
//!
//! The ALU works on `A` and `B`. 16-bit operations run low byte first and
//! carry into the high byte. Multiplication is shift-and-add and division is
//! restoring long division, both over words in backend scratch memory. Byte
//! operands are zero-extended into the scratch words and the low byte of the
//! result is written back.
//!
//! ```text
//! scratch + 0   product    | quotient
//! scratch + 2   multiplicand | remainder
//! scratch + 4   multiplier | divisor
//! scratch + 6              | counter, overflow
//! ```

use sable_machine::{Instruction, Opcode, Register};

use super::{Backend, Result};
use crate::ir::{Address, ArithOp, Width};
use crate::session::PANIC_LABEL;

#[derive(Debug, Clone, Copy)]
enum Operand {
    At(Address),
    Immediate(u16),
}

impl Backend {
    pub(super) fn arith(
        &mut self,
        op: ArithOp,
        width: Width,
        dst: Address,
        left: Address,
        right: Address,
    ) -> Result<()> {
        match op {
            ArithOp::Add | ArithOp::Sub => {
                let (low, high) = if op == ArithOp::Add {
                    (Opcode::Add, Opcode::Adc)
                } else {
                    (Opcode::Sub, Opcode::Sbc)
                };
                match width {
                    Width::Byte => {
                        self.load(Register::A, left);
                        self.load(Register::B, right);
                        self.asm.emit(Instruction::alu(low, Register::C));
                        self.store(dst, Register::C);
                    }
                    Width::Word => self.alu16(low, high, dst, left, Operand::At(right)),
                }
                Ok(())
            }
            ArithOp::Mul => self.multiply(width, dst, Operand::At(left), Operand::At(right)),
            ArithOp::Div | ArithOp::Mod => self.divide(op, width, dst, left, right),
            ArithOp::Eq | ArithOp::Ne => {
                self.test_equal(width, left, right);
                let jump = if op == ArithOp::Eq { Opcode::Je } else { Opcode::Jne };
                self.set_flag_result(dst, jump)
            }
            ArithOp::Lt => {
                self.compare_ordered(width, left, right);
                self.set_flag_result(dst, Opcode::Jnc)
            }
            ArithOp::Ge => {
                self.compare_ordered(width, left, right);
                self.set_flag_result(dst, Opcode::Jc)
            }
            ArithOp::Gt => {
                self.compare_ordered(width, right, left);
                self.set_flag_result(dst, Opcode::Jnc)
            }
            ArithOp::Le => {
                self.compare_ordered(width, right, left);
                self.set_flag_result(dst, Opcode::Jc)
            }
        }
    }

    pub(super) fn addi16(&mut self, dst: Address, left: Address, imm: u16) {
        self.alu16(Opcode::Add, Opcode::Adc, dst, left, Operand::Immediate(imm));
    }

    pub(super) fn subi16(&mut self, dst: Address, left: Address, imm: u16) {
        self.alu16(Opcode::Sub, Opcode::Sbc, dst, left, Operand::Immediate(imm));
    }

    pub(super) fn muli16(&mut self, dst: Address, left: Address, imm: u16) -> Result<()> {
        self.multiply(Width::Word, dst, Operand::At(left), Operand::Immediate(imm))
    }

    // ========================================================================
    // Building blocks
    // ========================================================================

    /// `word[dst] = word[left] op right`. Both inputs are read before `dst`
    /// is written. Clobbers `A` to `D`.
    fn alu16(&mut self, low: Opcode, high: Opcode, dst: Address, left: Address, right: Operand) {
        self.load(Register::A, left.wrapping_add(1));
        self.load_operand_byte(Register::B, right, false);
        self.asm.emit(Instruction::alu(low, Register::C));
        self.load(Register::A, left);
        self.load_operand_byte(Register::B, right, true);
        self.asm.emit(Instruction::alu(high, Register::D));
        self.store(dst, Register::D);
        self.store(dst.wrapping_add(1), Register::C);
    }

    fn load_operand_byte(&mut self, dst: Register, operand: Operand, high: bool) {
        match operand {
            Operand::At(address) => {
                let address = if high { address } else { address.wrapping_add(1) };
                self.load(dst, address);
            }
            Operand::Immediate(value) => {
                let [hi, lo] = value.to_be_bytes();
                self.asm.li(dst, if high { hi } else { lo });
            }
        }
    }

    /// Zero flag set when the operands are equal.
    fn test_equal(&mut self, width: Width, left: Address, right: Address) {
        match width {
            Width::Byte => {
                self.load(Register::A, left);
                self.load(Register::B, right);
                self.asm.cmp();
            }
            Width::Word => {
                self.load(Register::A, left.wrapping_add(1));
                self.load(Register::B, right.wrapping_add(1));
                self.asm.xor(Register::C);
                self.load(Register::A, left);
                self.load(Register::B, right);
                self.asm.xor(Register::A);
                self.asm.mov(Register::B, Register::C);
                self.asm.or(Register::None);
            }
        }
    }

    /// Carry set when `left >= right`.
    fn compare_ordered(&mut self, width: Width, left: Address, right: Address) {
        match width {
            Width::Byte => {
                self.load(Register::A, left);
                self.load(Register::B, right);
                self.asm.cmp();
            }
            Width::Word => {
                self.load(Register::A, left.wrapping_add(1));
                self.load(Register::B, right.wrapping_add(1));
                self.asm.sub(Register::None);
                self.load(Register::A, left);
                self.load(Register::B, right);
                self.asm.sbc(Register::None);
            }
        }
    }

    /// `byte[dst] = 1` if the flags satisfy `jump`, else `0`.
    fn set_flag_result(&mut self, dst: Address, jump: Opcode) -> Result<()> {
        let done = self.next_label();
        self.store_immediate(dst, 1);
        self.jump_if(&done, jump);
        self.store_immediate(dst, 0);
        self.label(&done)
    }

    fn jump_if(&mut self, label: &str, jump: Opcode) {
        self.asm.load_label_xy(label);
        self.asm.emit(Instruction::bare(jump));
    }

    /// Zero-extend an operand into the scratch word at `dst`.
    fn load_word(&mut self, dst: Address, operand: Operand, width: Width) {
        match (operand, width) {
            (Operand::At(src), Width::Byte) => self.copy_word_zero_extend(dst, src),
            (Operand::At(src), Width::Word) => self.copy_words(dst, src, 2),
            (Operand::Immediate(value), _) => self.store_immediate16(dst, value),
        }
    }

    fn store_word_result(&mut self, dst: Address, src: Address, width: Width) {
        match width {
            Width::Byte => self.copy_words(dst, src.wrapping_add(1), 1),
            Width::Word => self.copy_words(dst, src, 2),
        }
    }

    /// `word[at] >>= 1`
    fn shift_right16(&mut self, at: Address) -> Result<()> {
        self.load(Register::A, at.wrapping_add(1));
        self.asm.shr(Register::C);
        self.load(Register::A, at);
        self.asm.shr(Register::D);
        self.store(at, Register::D);
        let no_carry = self.next_label();
        self.jump_if(&no_carry, Opcode::Jnc);
        self.asm.mov(Register::A, Register::C);
        self.asm.li(Register::B, 0x80);
        self.asm.or(Register::C);
        self.label(&no_carry)?;
        self.store(at.wrapping_add(1), Register::C);
        Ok(())
    }

    // ========================================================================
    // Loops
    // ========================================================================

    fn multiply(&mut self, width: Width, dst: Address, left: Operand, right: Operand) -> Result<()> {
        let product = self.scratch;
        let multiplicand = product.wrapping_add(2);
        let multiplier = product.wrapping_add(4);
        self.store_immediate16(product, 0);
        self.load_word(multiplicand, left, width);
        self.load_word(multiplier, right, width);

        let head = self.next_label();
        let skip = self.next_label();
        let done = self.next_label();
        self.label(&head)?;
        self.load(Register::A, multiplier);
        self.load(Register::B, multiplier.wrapping_add(1));
        self.asm.or(Register::None);
        self.jump_if(&done, Opcode::Je);
        self.load(Register::A, multiplier.wrapping_add(1));
        self.asm.li(Register::B, 1);
        self.asm.and(Register::None);
        self.jump_if(&skip, Opcode::Je);
        self.alu16(Opcode::Add, Opcode::Adc, product, product, Operand::At(multiplicand));
        self.label(&skip)?;
        self.alu16(
            Opcode::Add,
            Opcode::Adc,
            multiplicand,
            multiplicand,
            Operand::At(multiplicand),
        );
        self.shift_right16(multiplier)?;
        self.asm.load_label_xy(&head);
        self.asm.jmp();
        self.label(&done)?;
        self.store_word_result(dst, product, width);
        Ok(())
    }

    /// Division by zero jumps to the panic routine.
    fn divide(&mut self, op: ArithOp, width: Width, dst: Address, left: Address, right: Address) -> Result<()> {
        let quotient = self.scratch;
        let remainder = quotient.wrapping_add(2);
        let divisor = quotient.wrapping_add(4);
        let counter = quotient.wrapping_add(6);
        let overflow = quotient.wrapping_add(7);
        self.load_word(quotient, Operand::At(left), width);
        self.load_word(divisor, Operand::At(right), width);

        self.load(Register::A, divisor);
        self.load(Register::B, divisor.wrapping_add(1));
        self.asm.or(Register::None);
        self.jump_if(PANIC_LABEL, Opcode::Je);
        self.store_immediate16(remainder, 0);
        self.store_immediate(counter, 16);

        let head = self.next_label();
        let no_overflow = self.next_label();
        let take = self.next_label();
        let skip = self.next_label();
        self.label(&head)?;
        // Shift remainder:quotient left by one.
        self.alu16(Opcode::Add, Opcode::Adc, quotient, quotient, Operand::At(quotient));
        self.load(Register::A, remainder.wrapping_add(1));
        self.load(Register::B, remainder.wrapping_add(1));
        self.asm.adc(Register::C);
        self.load(Register::A, remainder);
        self.load(Register::B, remainder);
        self.asm.adc(Register::D);
        self.store(remainder, Register::D);
        self.store(remainder.wrapping_add(1), Register::C);
        self.store_immediate(overflow, 0);
        self.jump_if(&no_overflow, Opcode::Jnc);
        self.store_immediate(overflow, 1);
        self.label(&no_overflow)?;

        // Subtract the divisor when it fits.
        self.load(Register::A, remainder.wrapping_add(1));
        self.load(Register::B, divisor.wrapping_add(1));
        self.asm.sub(Register::C);
        self.load(Register::A, remainder);
        self.load(Register::B, divisor);
        self.asm.sbc(Register::D);
        self.jump_if(&take, Opcode::Jc);
        self.load(Register::A, overflow);
        self.asm.li(Register::B, 0);
        self.asm.cmp();
        self.jump_if(&skip, Opcode::Je);
        self.label(&take)?;
        self.store(remainder, Register::D);
        self.store(remainder.wrapping_add(1), Register::C);
        self.load(Register::A, quotient.wrapping_add(1));
        self.asm.li(Register::B, 1);
        self.asm.or(Register::C);
        self.store(quotient.wrapping_add(1), Register::C);
        self.label(&skip)?;

        self.load(Register::A, counter);
        self.asm.li(Register::B, 1);
        self.asm.sub(Register::C);
        self.store(counter, Register::C);
        self.jump_if(&head, Opcode::Jne);

        let result = if op == ArithOp::Div { quotient } else { remainder };
        self.store_word_result(dst, result, width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{PANIC_SENTINEL, test_support};
    use crate::ir::{ArithOp, IrInstruction, Width};
    use sable_machine::Machine;

    const LEFT: u16 = 0x0200;
    const RIGHT: u16 = 0x0202;
    const DST: u16 = 0x0204;

    fn run_word(op: ArithOp, left: u16, right: u16) -> Machine {
        test_support::run(&[
            IrInstruction::StoreImmediate16 {
                dst: LEFT,
                value: left,
            },
            IrInstruction::StoreImmediate16 {
                dst: RIGHT,
                value: right,
            },
            IrInstruction::Arith {
                op,
                width: Width::Word,
                dst: DST,
                left: LEFT,
                right: RIGHT,
            },
        ])
    }

    fn word(op: ArithOp, left: u16, right: u16) -> u16 {
        run_word(op, left, right).load16(DST)
    }

    fn byte(op: ArithOp, left: u8, right: u8) -> u8 {
        test_support::run(&[
            IrInstruction::StoreImmediate {
                dst: LEFT,
                value: left,
            },
            IrInstruction::StoreImmediate {
                dst: RIGHT,
                value: right,
            },
            IrInstruction::Arith {
                op,
                width: Width::Byte,
                dst: DST,
                left: LEFT,
                right: RIGHT,
            },
        ])
        .load(DST)
    }

    #[test]
    fn byte_subtraction_wraps() {
        assert_eq!(byte(ArithOp::Sub, 0, 42), 214);
        assert_eq!(byte(ArithOp::Add, 200, 100), 44);
    }

    #[test]
    fn word_add_carries_into_high_byte() {
        assert_eq!(word(ArithOp::Add, 0x00ff, 0x0001), 0x0100);
        assert_eq!(word(ArithOp::Add, 1000, 1), 1001);
        assert_eq!(word(ArithOp::Sub, 0x0100, 0x0001), 0x00ff);
        assert_eq!(word(ArithOp::Sub, 0, 1), 0xffff);
    }

    #[test]
    fn comparisons() {
        let cases = [
            (ArithOp::Eq, 0x1234, 0x1234, 1),
            (ArithOp::Eq, 0x1234, 0x1334, 0),
            (ArithOp::Ne, 0x1234, 0x1235, 1),
            (ArithOp::Lt, 0x00ff, 0x0100, 1),
            (ArithOp::Lt, 0x0100, 0x0100, 0),
            (ArithOp::Le, 0x0100, 0x0100, 1),
            (ArithOp::Gt, 0x0100, 0x00ff, 1),
            (ArithOp::Ge, 0x00ff, 0x0100, 0),
        ];
        for (op, left, right, expected) in cases {
            assert_eq!(
                run_word(op, left, right).load(DST),
                expected,
                "{op:?} {left:#x} {right:#x}"
            );
        }
        assert_eq!(byte(ArithOp::Gt, 3, 2), 1);
        assert_eq!(byte(ArithOp::Le, 3, 2), 0);
    }

    #[test]
    fn multiplication() {
        assert_eq!(word(ArithOp::Mul, 300, 200), 60000);
        assert_eq!(word(ArithOp::Mul, 0x1234, 0), 0);
        assert_eq!(word(ArithOp::Mul, 0x8000, 2), 0);
        assert_eq!(byte(ArithOp::Mul, 16, 17), 16);
    }

    #[test]
    fn division_and_remainder() {
        assert_eq!(word(ArithOp::Div, 60000, 7), 8571);
        assert_eq!(word(ArithOp::Mod, 60000, 7), 3);
        assert_eq!(word(ArithOp::Div, 0xffff, 0x8001), 1);
        assert_eq!(word(ArithOp::Mod, 0xffff, 0x8001), 0x7ffe);
        assert_eq!(byte(ArithOp::Div, 200, 3), 66);
        assert_eq!(byte(ArithOp::Mod, 200, 3), 2);
    }

    #[test]
    fn division_by_zero_panics() {
        let machine = run_word(ArithOp::Div, 1, 0);
        assert_eq!(machine.stack16(0), PANIC_SENTINEL);
    }

    #[test]
    fn immediate_forms() {
        let machine = test_support::run(&[
            IrInstruction::StoreImmediate16 {
                dst: LEFT,
                value: 0x0102,
            },
            IrInstruction::Addi16 {
                dst: DST,
                left: LEFT,
                imm: 0x00ff,
            },
            IrInstruction::Muli16 {
                dst: RIGHT,
                left: LEFT,
                imm: 3,
            },
        ]);
        assert_eq!(machine.load16(DST), 0x0201);
        assert_eq!(machine.load16(RIGHT), 0x0306);
    }
}
