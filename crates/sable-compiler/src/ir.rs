//! Intermediate representation.
//!
//! A flat sequence of instructions over absolute data addresses: compiler
//! temporaries, static variables and the stack pointer / frame pointer cells.
//! The call stack lives in memory and is manipulated by explicit stack
//! instructions. Control flow uses symbolic labels, resolved by the backend.
//!
//! All multi-byte values are big-endian. `Word` operations read and write two
//! bytes at each address.
//!
//! Listing form, one instruction per line:
//!
//! ```text
//! store_immediate16 0x0010, 1001
//! copy_words_indirect_source 0x0012, 0x0010, 2
//! add16 0x0014, 0x0010, 0x0012
//! jz .L3, 0x0014
//! ```

use std::fmt;

/// A byte address in data RAM.
pub type Address = u16;

/// Operand width of an arithmetic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Word,
}

impl Width {
    pub fn bytes(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
        }
    }
}

/// Arithmetic and comparison operators.
///
/// Comparisons always write a single byte, 1 for true and 0 for false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ArithOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            ArithOp::Eq | ArithOp::Ne | ArithOp::Lt | ArithOp::Gt | ArithOp::Le | ArithOp::Ge
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Mod => "mod",
            ArithOp::Eq => "eq",
            ArithOp::Ne => "ne",
            ArithOp::Lt => "lt",
            ArithOp::Gt => "gt",
            ArithOp::Le => "le",
            ArithOp::Ge => "ge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrInstruction {
    Nop,
    Hlt,
    Label(String),
    Jmp(String),
    /// Jump when the byte at `test` is zero.
    Jz {
        label: String,
        test: Address,
    },
    /// Jump when the byte at `test` is non-zero.
    Jnz {
        label: String,
        test: Address,
    },
    /// Call the code at a label, leaving the return address in the link
    /// registers.
    Jalr(String),
    /// Call through a code address stored at `pointer`.
    IndirectJalr(Address),
    /// Push the frame pointer and point it at the new stack top.
    Enter,
    /// Reset the stack pointer to the frame pointer and pop the saved one.
    Leave,
    /// Push the link registers.
    PushReturnAddress,
    /// Pop a return address and jump to it.
    Ret,
    Push(u8),
    Push16(u16),
    Pop,
    Pop16,
    StoreImmediate {
        dst: Address,
        value: u8,
    },
    StoreImmediate16 {
        dst: Address,
        value: u16,
    },
    /// Store the code address of a label.
    CopyLabel {
        dst: Address,
        label: String,
    },
    CopyWords {
        dst: Address,
        src: Address,
        count: usize,
    },
    /// Widen the byte at `src` into the word at `dst`.
    CopyWordZeroExtend {
        dst: Address,
        src: Address,
    },
    /// Copy `count` bytes from the address held in the word at `src_ptr`.
    CopyWordsIndirectSource {
        dst: Address,
        src_ptr: Address,
        count: usize,
    },
    /// Copy `count` bytes to the address held in the word at `dst_ptr`.
    CopyWordsIndirectDestination {
        dst_ptr: Address,
        src: Address,
        count: usize,
    },
    Arith {
        op: ArithOp,
        width: Width,
        dst: Address,
        left: Address,
        right: Address,
    },
    /// `word[dst] = word[left] + imm`
    Addi16 {
        dst: Address,
        left: Address,
        imm: u16,
    },
    Subi16 {
        dst: Address,
        left: Address,
        imm: u16,
    },
    Muli16 {
        dst: Address,
        left: Address,
        imm: u16,
    },
    /// Read the peripheral whose address is the word at `address`.
    PeekPeripheral {
        dst: Address,
        address: Address,
    },
    PokePeripheral {
        value: Address,
        address: Address,
    },
}

impl IrInstruction {
    pub fn is_label(&self) -> bool {
        matches!(self, IrInstruction::Label(_))
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use IrInstruction::*;
        match self {
            Nop => write!(f, "nop"),
            Hlt => write!(f, "hlt"),
            Label(name) => write!(f, "{name}:"),
            Jmp(label) => write!(f, "jmp {label}"),
            Jz { label, test } => write!(f, "jz {label}, {test:#06x}"),
            Jnz { label, test } => write!(f, "jnz {label}, {test:#06x}"),
            Jalr(label) => write!(f, "jalr {label}"),
            IndirectJalr(pointer) => write!(f, "indirect_jalr {pointer:#06x}"),
            Enter => write!(f, "enter"),
            Leave => write!(f, "leave"),
            PushReturnAddress => write!(f, "push_return_address"),
            Ret => write!(f, "ret"),
            Push(value) => write!(f, "push {value}"),
            Push16(value) => write!(f, "push16 {value}"),
            Pop => write!(f, "pop"),
            Pop16 => write!(f, "pop16"),
            StoreImmediate { dst, value } => write!(f, "store_immediate {dst:#06x}, {value}"),
            StoreImmediate16 { dst, value } => {
                write!(f, "store_immediate16 {dst:#06x}, {value}")
            }
            CopyLabel { dst, label } => write!(f, "copy_label {dst:#06x}, {label}"),
            CopyWords { dst, src, count } => {
                write!(f, "copy_words {dst:#06x}, {src:#06x}, {count}")
            }
            CopyWordZeroExtend { dst, src } => {
                write!(f, "copy_word_zero_extend {dst:#06x}, {src:#06x}")
            }
            CopyWordsIndirectSource {
                dst,
                src_ptr,
                count,
            } => write!(
                f,
                "copy_words_indirect_source {dst:#06x}, {src_ptr:#06x}, {count}"
            ),
            CopyWordsIndirectDestination {
                dst_ptr,
                src,
                count,
            } => write!(
                f,
                "copy_words_indirect_destination {dst_ptr:#06x}, {src:#06x}, {count}"
            ),
            Arith {
                op,
                width,
                dst,
                left,
                right,
            } => {
                let suffix = match width {
                    Width::Byte => "",
                    Width::Word => "16",
                };
                write!(
                    f,
                    "{}{suffix} {dst:#06x}, {left:#06x}, {right:#06x}",
                    op.mnemonic()
                )
            }
            Addi16 { dst, left, imm } => write!(f, "addi16 {dst:#06x}, {left:#06x}, {imm}"),
            Subi16 { dst, left, imm } => write!(f, "subi16 {dst:#06x}, {left:#06x}, {imm}"),
            Muli16 { dst, left, imm } => write!(f, "muli16 {dst:#06x}, {left:#06x}, {imm}"),
            PeekPeripheral { dst, address } => {
                write!(f, "peek_peripheral {dst:#06x}, {address:#06x}")
            }
            PokePeripheral { value, address } => {
                write!(f, "poke_peripheral {value:#06x}, {address:#06x}")
            }
        }
    }
}

/// Render a sequence as a listing, one instruction per line.
pub fn listing(instructions: &[IrInstruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        if !instruction.is_label() {
            out.push_str("    ");
        }
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}
