use thiserror::Error;

/// Errors raised while resolving a program's labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("label redefines existing symbol: `{name}'")]
    LabelRedefinition { name: String },

    #[error("cannot resolve label `{name}'")]
    UnresolvedLabel { name: String },

    #[error("program of {len} instructions does not fit the 16-bit address space")]
    ProgramTooLarge { len: usize },
}

/// Errors raised while executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("illegal instruction word {word:#010x}")]
    IllegalInstruction { word: u32 },

    #[error("program counter {pc:#06x} is outside the loaded program")]
    ProgramCounterOutOfRange { pc: u16 },

    #[error("step limit of {limit} exceeded before HLT")]
    StepLimitExceeded { limit: u64 },

    #[error("program of {len} instructions does not fit the 16-bit address space")]
    ProgramTooLarge { len: usize },
}
