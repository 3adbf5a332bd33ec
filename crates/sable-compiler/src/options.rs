//! Compiler configuration.
//!
//! Data RAM layout, with the defaults:
//!
//! ```text
//! 0x0000..0x0001  stack pointer
//! 0x0002..0x0003  frame pointer
//! 0x0004..0x000f  backend scratch
//! 0x0010..0x010f  temporaries
//! 0x0110..        static storage
//! ```

use sable_machine::{FRAME_POINTER_ADDRESS, STACK_POINTER_ADDRESS};

use crate::ir::Address;

/// Bytes of scratch the backend needs for its multi-instruction sequences.
pub const SCRATCH_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub stack_pointer: Address,
    pub frame_pointer: Address,
    pub scratch_start: Address,
    pub temporaries_start: Address,
    pub temporaries_len: usize,
    pub static_start: Address,
    /// Emit runtime checks on subscripts and ranges.
    pub bounds_checks: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            stack_pointer: STACK_POINTER_ADDRESS,
            frame_pointer: FRAME_POINTER_ADDRESS,
            scratch_start: 0x0004,
            temporaries_start: 0x0010,
            temporaries_len: 0x0100,
            static_start: 0x0110,
            bounds_checks: true,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temporaries(mut self, start: Address, len: usize) -> Self {
        self.temporaries_start = start;
        self.temporaries_len = len;
        self
    }

    pub fn with_static_start(mut self, start: Address) -> Self {
        self.static_start = start;
        self
    }

    pub fn with_scratch_start(mut self, start: Address) -> Self {
        self.scratch_start = start;
        self
    }

    pub fn with_bounds_checks(mut self, bounds_checks: bool) -> Self {
        self.bounds_checks = bounds_checks;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let options = CompilerOptions::default();
        assert_eq!(options.stack_pointer, 0x0000);
        assert_eq!(options.frame_pointer, 0x0002);
        assert_eq!(
            usize::from(options.scratch_start) + SCRATCH_SIZE,
            usize::from(options.temporaries_start)
        );
        assert_eq!(
            usize::from(options.temporaries_start) + options.temporaries_len,
            usize::from(options.static_start)
        );
    }

    #[test]
    fn builders() {
        let options = CompilerOptions::new()
            .with_temporaries(0x20, 0x40)
            .with_static_start(0x200)
            .with_bounds_checks(false);
        assert_eq!(options.temporaries_start, 0x20);
        assert_eq!(options.temporaries_len, 0x40);
        assert_eq!(options.static_start, 0x200);
        assert!(!options.bounds_checks);
    }
}
