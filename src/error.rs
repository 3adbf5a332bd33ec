use sable_core::{CompilerError, CompilerErrors};
use sable_machine::MachineError;
use thiserror::Error;

/// Anything that can go wrong between an AST and a halted machine.
#[derive(Error, Debug, Clone)]
pub enum SableError {
    #[error("{0}")]
    Compile(#[from] CompilerErrors),

    #[error("machine error: {0}")]
    Machine(#[from] MachineError),
}

impl SableError {
    /// The compiler errors, if compilation failed.
    pub fn compiler_errors(&self) -> Option<&CompilerErrors> {
        match self {
            SableError::Compile(errors) => Some(errors),
            SableError::Machine(_) => None,
        }
    }
}

impl From<CompilerError> for SableError {
    fn from(error: CompilerError) -> Self {
        SableError::Compile(error.into())
    }
}

pub type SableResult<T> = Result<T, SableError>;
