//! Instruction set of the target CPU.
//!
//! An 8-bit accumulator machine. The ALU always reads its operands from `A`
//! and `B` and writes the result to a destination register (or nowhere, for
//! a flags-only operation). Memory is reached through two pseudo-registers:
//!
//! - `M` is data RAM at the address held in the `U:V` pair;
//! - `P` is the peripheral bus at the address held in the `X:Y` pair.
//!
//! Jumps go to the address in `X:Y`. `JALR` leaves the return address in the
//! link pair `G:H`.
//!
//! Instructions encode to one 32-bit word:
//!
//! ```text
//! 31      24 23     16 15      8 7       0
//! [ opcode ] [  dst  ] [  src  ] [  imm  ]
//! ```

use std::fmt;

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::MachineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Register {
    A = 0,
    B,
    C,
    D,
    X,
    Y,
    U,
    V,
    G,
    H,
    /// Data RAM at `U:V`.
    M,
    /// Peripheral bus at `X:Y`.
    P,
    /// Discard (ALU destination only).
    None,
}

impl Register {
    /// The general purpose registers, in storage order.
    pub const GENERAL: [Register; 10] = [
        Register::A,
        Register::B,
        Register::C,
        Register::D,
        Register::X,
        Register::Y,
        Register::U,
        Register::V,
        Register::G,
        Register::H,
    ];

    /// Index into the register file, for the general purpose registers.
    pub fn index(self) -> Option<usize> {
        let index = u8::from(self) as usize;
        (index < Self::GENERAL.len()).then_some(index)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::D => "D",
            Register::X => "X",
            Register::Y => "Y",
            Register::U => "U",
            Register::V => "V",
            Register::G => "G",
            Register::H => "H",
            Register::M => "M",
            Register::P => "P",
            Register::None => "NONE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    Hlt,
    /// `dst = src`
    Mov,
    /// `dst = imm`
    Li,
    /// `dst = A + B`
    Add,
    /// `dst = A + B + carry`
    Adc,
    /// `dst = A - B`; carry means no borrow
    Sub,
    /// `dst = A - B - !carry`
    Sbc,
    And,
    Or,
    Xor,
    /// `dst = !A`
    Not,
    /// `dst = A << 1`; carry takes bit 7
    Shl,
    /// `dst = A >> 1`; carry takes bit 0
    Shr,
    /// Flags of `A - B`, no result.
    Cmp,
    /// `U:V += 1`
    Inuv,
    /// `X:Y += 1`
    Inxy,
    /// `PC = X:Y`
    Jmp,
    /// `G:H = PC + 1; PC = X:Y`
    Jalr,
    /// Jump if zero.
    Je,
    /// Jump if not zero.
    Jne,
    /// Jump if carry.
    Jc,
    /// Jump if no carry.
    Jnc,
}

impl Opcode {
    pub fn is_alu(self) -> bool {
        matches!(
            self,
            Opcode::Add
                | Opcode::Adc
                | Opcode::Sub
                | Opcode::Sbc
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::Not
                | Opcode::Shl
                | Opcode::Shr
                | Opcode::Cmp
        )
    }

    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Opcode::Jmp | Opcode::Jalr | Opcode::Je | Opcode::Jne | Opcode::Jc | Opcode::Jnc
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::Hlt => "HLT",
            Opcode::Mov => "MOV",
            Opcode::Li => "LI",
            Opcode::Add => "ADD",
            Opcode::Adc => "ADC",
            Opcode::Sub => "SUB",
            Opcode::Sbc => "SBC",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Not => "NOT",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Cmp => "CMP",
            Opcode::Inuv => "INUV",
            Opcode::Inxy => "INXY",
            Opcode::Jmp => "JMP",
            Opcode::Jalr => "JALR",
            Opcode::Je => "JE",
            Opcode::Jne => "JNE",
            Opcode::Jc => "JC",
            Opcode::Jnc => "JNC",
        }
    }
}

bitflags! {
    /// Condition flags set by the ALU.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        /// Carry out of an addition, or no borrow out of a subtraction.
        const CARRY = 0b01;
        /// The result was zero.
        const ZERO = 0b10;
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    pub dst: Register,
    pub src: Register,
    pub imm: u8,
}

impl Instruction {
    pub fn new(opcode: Opcode, dst: Register, src: Register, imm: u8) -> Self {
        Self {
            opcode,
            dst,
            src,
            imm,
        }
    }

    /// An instruction without operands.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Register::None, Register::None, 0)
    }

    pub fn mov(dst: Register, src: Register) -> Self {
        Self::new(Opcode::Mov, dst, src, 0)
    }

    pub fn li(dst: Register, imm: u8) -> Self {
        Self::new(Opcode::Li, dst, Register::None, imm)
    }

    pub fn alu(opcode: Opcode, dst: Register) -> Self {
        Self::new(opcode, dst, Register::None, 0)
    }

    pub fn encode(&self) -> u32 {
        (u32::from(u8::from(self.opcode)) << 24)
            | (u32::from(u8::from(self.dst)) << 16)
            | (u32::from(u8::from(self.src)) << 8)
            | u32::from(self.imm)
    }

    pub fn decode(word: u32) -> Result<Self, MachineError> {
        let illegal = || MachineError::IllegalInstruction { word };
        let [opcode, dst, src, imm] = word.to_be_bytes();
        Ok(Self {
            opcode: Opcode::try_from(opcode).map_err(|_| illegal())?,
            dst: Register::try_from(dst).map_err(|_| illegal())?,
            src: Register::try_from(src).map_err(|_| illegal())?,
            imm,
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.opcode.mnemonic();
        match self.opcode {
            Opcode::Mov => write!(f, "{mnemonic} {}, {}", self.dst, self.src),
            Opcode::Li => write!(f, "{mnemonic} {}, {:#04x}", self.dst, self.imm),
            Opcode::Cmp => f.write_str(mnemonic),
            op if op.is_alu() => write!(f, "{mnemonic} {}", self.dst),
            _ => f.write_str(mnemonic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        let ins = Instruction::li(Register::U, 0xab);
        assert_eq!(ins.encode(), 0x0306_0cab);
        assert_eq!(Instruction::decode(ins.encode()).unwrap(), ins);
    }

    #[test]
    fn decode_rejects_unknown_opcode() {
        let err = Instruction::decode(0xff00_0000).unwrap_err();
        assert!(matches!(err, MachineError::IllegalInstruction { word: 0xff00_0000 }));
    }

    #[test]
    fn listing() {
        assert_eq!(Instruction::mov(Register::A, Register::M).to_string(), "MOV A, M");
        assert_eq!(Instruction::li(Register::V, 1).to_string(), "LI V, 0x01");
        assert_eq!(Instruction::alu(Opcode::Sbc, Register::M).to_string(), "SBC M");
        assert_eq!(Instruction::bare(Opcode::Cmp).to_string(), "CMP");
        assert_eq!(Instruction::bare(Opcode::Jalr).to_string(), "JALR");
    }

    #[test]
    fn register_file_indices() {
        assert_eq!(Register::A.index(), Some(0));
        assert_eq!(Register::H.index(), Some(9));
        assert_eq!(Register::M.index(), None);
    }
}
