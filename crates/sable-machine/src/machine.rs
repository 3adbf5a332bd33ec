//! Instruction-level simulator.
//!
//! Models the register file, flags, 64 KiB of data RAM and 64 KiB of
//! peripheral space. The peripheral data bus is wired with its bits reversed:
//! a byte written through `P` lands in peripheral memory mirrored, and a byte
//! read through `P` is mirrored on the way in. [`Machine::peripheral`] shows
//! peripheral memory as the devices see it.
//!
//! The compiler keeps its stack pointer and frame pointer in RAM, so the
//! stack accessors here read through the word at [`STACK_POINTER_ADDRESS`].

use crate::{Flags, Instruction, MachineError, Opcode, Register};

type Result<T> = std::result::Result<T, MachineError>;

/// RAM address of the big-endian stack pointer word.
pub const STACK_POINTER_ADDRESS: u16 = 0x0000;
/// RAM address of the big-endian frame pointer word.
pub const FRAME_POINTER_ADDRESS: u16 = 0x0002;

const MEMORY_SIZE: usize = 0x1_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineOptions {
    /// Instructions executed before [`Machine::run`] gives up.
    pub step_limit: u64,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            step_limit: 10_000_000,
        }
    }
}

impl MachineOptions {
    pub fn with_step_limit(mut self, step_limit: u64) -> Self {
        self.step_limit = step_limit;
        self
    }
}

#[derive(Debug)]
pub struct Machine {
    program: Vec<Instruction>,
    registers: [u8; Register::GENERAL.len()],
    flags: Flags,
    pc: u16,
    halted: bool,
    steps: u64,
    ram: Box<[u8]>,
    peripherals: Box<[u8]>,
    options: MachineOptions,
}

impl Machine {
    pub fn new(program: Vec<Instruction>) -> Result<Self> {
        Self::with_options(program, MachineOptions::default())
    }

    pub fn with_options(program: Vec<Instruction>, options: MachineOptions) -> Result<Self> {
        if program.len() > MEMORY_SIZE {
            return Err(MachineError::ProgramTooLarge { len: program.len() });
        }
        Ok(Self {
            program,
            registers: [0; Register::GENERAL.len()],
            flags: Flags::empty(),
            pc: 0,
            halted: false,
            steps: 0,
            ram: vec![0; MEMORY_SIZE].into_boxed_slice(),
            peripherals: vec![0; MEMORY_SIZE].into_boxed_slice(),
            options,
        })
    }

    /// Decode and load a program of encoded words.
    pub fn from_words(words: &[u32], options: MachineOptions) -> Result<Self> {
        let program = words
            .iter()
            .map(|&word| Instruction::decode(word))
            .collect::<Result<Vec<_>>>()?;
        Self::with_options(program, options)
    }

    /// Execute until `HLT`. Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64> {
        while !self.halted {
            if self.steps >= self.options.step_limit {
                return Err(MachineError::StepLimitExceeded {
                    limit: self.options.step_limit,
                });
            }
            self.step()?;
        }
        log::debug!("halted after {} steps at pc {:#06x}", self.steps, self.pc);
        Ok(self.steps)
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<()> {
        let pc = self.pc;
        let ins = *self
            .program
            .get(usize::from(pc))
            .ok_or(MachineError::ProgramCounterOutOfRange { pc })?;
        log::trace!("{pc:#06x}: {ins}");
        self.steps += 1;
        let mut next = pc.wrapping_add(1);

        match ins.opcode {
            Opcode::Nop => {}
            Opcode::Hlt => {
                self.halted = true;
                next = pc;
            }
            Opcode::Mov => {
                let value = self.read(ins.src);
                self.write(ins.dst, value);
            }
            Opcode::Li => self.write(ins.dst, ins.imm),
            Opcode::Add | Opcode::Adc => {
                let carry_in = u16::from(
                    ins.opcode == Opcode::Adc && self.flags.contains(Flags::CARRY),
                );
                let sum = u16::from(self.a()) + u16::from(self.b()) + carry_in;
                self.set_flags(sum > 0xff, sum as u8);
                self.write(ins.dst, sum as u8);
            }
            Opcode::Sub | Opcode::Sbc | Opcode::Cmp => {
                let borrow_in = i16::from(
                    ins.opcode == Opcode::Sbc && !self.flags.contains(Flags::CARRY),
                );
                let difference = i16::from(self.a()) - i16::from(self.b()) - borrow_in;
                let result = difference as u8;
                self.set_flags(difference >= 0, result);
                if ins.opcode != Opcode::Cmp {
                    self.write(ins.dst, result);
                }
            }
            Opcode::And => self.logic(ins.dst, self.a() & self.b()),
            Opcode::Or => self.logic(ins.dst, self.a() | self.b()),
            Opcode::Xor => self.logic(ins.dst, self.a() ^ self.b()),
            Opcode::Not => self.logic(ins.dst, !self.a()),
            Opcode::Shl => {
                let a = self.a();
                self.set_flags(a & 0x80 != 0, a << 1);
                self.write(ins.dst, a << 1);
            }
            Opcode::Shr => {
                let a = self.a();
                self.set_flags(a & 0x01 != 0, a >> 1);
                self.write(ins.dst, a >> 1);
            }
            Opcode::Inuv => {
                let uv = self.pair(Register::U, Register::V).wrapping_add(1);
                self.set_pair(Register::U, Register::V, uv);
            }
            Opcode::Inxy => {
                let xy = self.xy().wrapping_add(1);
                self.set_pair(Register::X, Register::Y, xy);
            }
            Opcode::Jmp => next = self.xy(),
            Opcode::Jalr => {
                self.set_pair(Register::G, Register::H, next);
                next = self.xy();
            }
            Opcode::Je => next = self.branch(self.flags.contains(Flags::ZERO), next),
            Opcode::Jne => next = self.branch(!self.flags.contains(Flags::ZERO), next),
            Opcode::Jc => next = self.branch(self.flags.contains(Flags::CARRY), next),
            Opcode::Jnc => next = self.branch(!self.flags.contains(Flags::CARRY), next),
        }

        self.pc = next;
        Ok(())
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn program(&self) -> &[Instruction] {
        &self.program
    }

    /// Value of a general purpose register. `M` and `P` read memory.
    pub fn register(&self, register: Register) -> u8 {
        match register {
            Register::M => self.ram[usize::from(self.pair(Register::U, Register::V))],
            Register::P => self.peripherals[usize::from(self.xy())].reverse_bits(),
            Register::None => 0,
            general => self.registers[general.index().unwrap_or_default()],
        }
    }

    pub fn set_register(&mut self, register: Register, value: u8) {
        self.write(register, value);
    }

    pub fn load(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    pub fn store(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    /// Big-endian word at `address`. The second byte wraps around memory.
    pub fn load16(&self, address: u16) -> u16 {
        u16::from_be_bytes([self.load(address), self.load(address.wrapping_add(1))])
    }

    pub fn store16(&mut self, address: u16, value: u16) {
        let [high, low] = value.to_be_bytes();
        self.store(address, high);
        self.store(address.wrapping_add(1), low);
    }

    /// Peripheral memory as the devices see it.
    pub fn peripheral(&self, address: u16) -> u8 {
        self.peripherals[usize::from(address)]
    }

    pub fn store_peripheral(&mut self, address: u16, value: u8) {
        self.peripherals[usize::from(address)] = value;
    }

    pub fn stack_pointer(&self) -> u16 {
        self.load16(STACK_POINTER_ADDRESS)
    }

    pub fn frame_pointer(&self) -> u16 {
        self.load16(FRAME_POINTER_ADDRESS)
    }

    /// Byte `at` bytes above the top of the in-RAM stack.
    pub fn stack(&self, at: u16) -> u8 {
        self.load(self.stack_pointer().wrapping_add(at))
    }

    /// Word `at` bytes above the top of the in-RAM stack.
    pub fn stack16(&self, at: u16) -> u16 {
        self.load16(self.stack_pointer().wrapping_add(at))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn a(&self) -> u8 {
        self.register(Register::A)
    }

    fn b(&self) -> u8 {
        self.register(Register::B)
    }

    fn xy(&self) -> u16 {
        self.pair(Register::X, Register::Y)
    }

    fn pair(&self, high: Register, low: Register) -> u16 {
        u16::from_be_bytes([self.register(high), self.register(low)])
    }

    fn set_pair(&mut self, high: Register, low: Register, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.write(high, h);
        self.write(low, l);
    }

    fn read(&self, register: Register) -> u8 {
        self.register(register)
    }

    fn write(&mut self, register: Register, value: u8) {
        match register {
            Register::M => {
                let address = self.pair(Register::U, Register::V);
                self.store(address, value);
            }
            Register::P => {
                let address = self.xy();
                self.peripherals[usize::from(address)] = value.reverse_bits();
            }
            Register::None => {}
            general => {
                if let Some(index) = general.index() {
                    self.registers[index] = value;
                }
            }
        }
    }

    fn set_flags(&mut self, carry: bool, result: u8) {
        self.flags.set(Flags::CARRY, carry);
        self.flags.set(Flags::ZERO, result == 0);
    }

    fn logic(&mut self, dst: Register, result: u8) {
        self.flags.set(Flags::ZERO, result == 0);
        self.write(dst, result);
    }

    fn branch(&self, taken: bool, fallthrough: u16) -> u16 {
        if taken { self.xy() } else { fallthrough }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Assembler;

    fn run(build: impl FnOnce(&mut Assembler)) -> Machine {
        let mut asm = Assembler::new();
        asm.begin();
        build(&mut asm);
        asm.hlt();
        let mut machine = Machine::new(asm.end().unwrap()).unwrap();
        machine.run().unwrap();
        machine
    }

    #[test]
    fn add_sets_carry_on_overflow() {
        let machine = run(|asm| {
            asm.li(Register::A, 0xff);
            asm.li(Register::B, 0x02);
            asm.add(Register::C);
        });
        assert_eq!(machine.register(Register::C), 0x01);
        assert!(machine.flags().contains(Flags::CARRY));
    }

    #[test]
    fn sixteen_bit_subtraction_with_borrow() {
        // 0x0100 - 0x0001 = 0x00ff
        let machine = run(|asm| {
            asm.li(Register::A, 0x00);
            asm.li(Register::B, 0x01);
            asm.sub(Register::D);
            asm.li(Register::A, 0x01);
            asm.li(Register::B, 0x00);
            asm.sbc(Register::C);
        });
        assert_eq!(machine.register(Register::C), 0x00);
        assert_eq!(machine.register(Register::D), 0xff);
        assert!(machine.flags().contains(Flags::CARRY));
    }

    #[test]
    fn cmp_leaves_registers_alone() {
        let machine = run(|asm| {
            asm.li(Register::A, 3);
            asm.li(Register::B, 3);
            asm.cmp();
        });
        assert_eq!(machine.register(Register::A), 3);
        assert!(machine.flags().contains(Flags::ZERO | Flags::CARRY));
    }

    #[test]
    fn shr_moves_low_bit_into_carry() {
        let machine = run(|asm| {
            asm.li(Register::A, 0b0000_0011);
            asm.shr(Register::A);
        });
        assert_eq!(machine.register(Register::A), 0b0000_0001);
        assert!(machine.flags().contains(Flags::CARRY));
    }

    #[test]
    fn memory_through_uv() {
        let machine = run(|asm| {
            asm.li(Register::U, 0x12);
            asm.li(Register::V, 0xff);
            asm.li(Register::M, 0xaa);
            asm.inuv();
            asm.li(Register::M, 0xbb);
        });
        assert_eq!(machine.load16(0x12ff), 0xaabb);
    }

    #[test]
    fn peripheral_bus_is_bit_reversed() {
        let machine = run(|asm| {
            asm.li(Register::X, 0x00);
            asm.li(Register::Y, 0x10);
            asm.li(Register::P, 0b0000_0001);
            asm.mov(Register::A, Register::P);
        });
        assert_eq!(machine.peripheral(0x0010), 0b1000_0000);
        assert_eq!(machine.register(Register::A), 0b0000_0001);
    }

    #[test]
    fn jalr_links_to_next_instruction() {
        let machine = run(|asm| {
            asm.load_label_xy("callee");
            asm.jalr();
            asm.hlt();
            asm.label("callee").unwrap();
            asm.li(Register::A, 9);
        });
        assert_eq!(machine.register(Register::A), 9);
        assert_eq!(machine.register(Register::G), 0);
        assert_eq!(machine.register(Register::H), 3);
    }

    #[test]
    fn conditional_jump_not_taken() {
        let machine = run(|asm| {
            asm.li(Register::A, 1);
            asm.li(Register::B, 2);
            asm.cmp();
            asm.load_label_xy("skip");
            asm.jc();
            asm.li(Register::C, 0x55);
            asm.label("skip").unwrap();
        });
        assert_eq!(machine.register(Register::C), 0x55);
    }

    #[test]
    fn stack_accessors_follow_stack_pointer() {
        let mut machine = Machine::new(vec![Instruction::bare(Opcode::Hlt)]).unwrap();
        machine.store16(STACK_POINTER_ADDRESS, 0xfffe);
        machine.store16(0xfffe, 0xdead);
        assert_eq!(machine.stack16(0), 0xdead);
        assert_eq!(machine.stack(1), 0xad);
    }

    #[test]
    fn step_limit() {
        let mut asm = Assembler::new();
        asm.label("loop").unwrap();
        asm.load_label_xy("loop");
        asm.jmp();
        let program = asm.end().unwrap();
        let mut machine =
            Machine::with_options(program, MachineOptions::default().with_step_limit(100)).unwrap();
        assert_eq!(
            machine.run(),
            Err(MachineError::StepLimitExceeded { limit: 100 })
        );
    }

    #[test]
    fn running_off_the_end() {
        let mut machine = Machine::new(vec![Instruction::bare(Opcode::Nop)]).unwrap();
        assert_eq!(
            machine.run(),
            Err(MachineError::ProgramCounterOutOfRange { pc: 1 })
        );
    }
}
