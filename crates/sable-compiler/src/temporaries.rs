//! LIFO allocator for compiler temporaries.
//!
//! Temporaries are scratch slots in a fixed window of data RAM. Expression
//! compilation allocates them in strict stack order: every compile call
//! releases what it allocated, except for the single result it hands back.
//! Releasing anything but the top slot is a compiler bug.

use sable_core::{CompilerError, Span};

use crate::ir::Address;

type Result<T> = std::result::Result<T, CompilerError>;

/// A slot on the temporary stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temporary {
    pub address: Address,
    pub size: usize,
}

impl Temporary {
    /// Address `offset` bytes into the slot.
    pub fn at(&self, offset: usize) -> Address {
        self.address.wrapping_add(offset as u16)
    }
}

/// Saved height of the stack, see [`TemporaryStack::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporaryMark(usize);

#[derive(Debug, Clone)]
pub struct TemporaryStack {
    base: Address,
    capacity: usize,
    used: usize,
    live: Vec<Temporary>,
}

impl TemporaryStack {
    pub fn new(base: Address, capacity: usize) -> Self {
        Self {
            base,
            capacity,
            used: 0,
            live: Vec::new(),
        }
    }

    pub fn allocate(&mut self, size: usize, span: Span) -> Result<Temporary> {
        let available = self.capacity - self.used;
        if size > available {
            return Err(CompilerError::TemporariesExhausted {
                requested: size,
                available,
                span,
            });
        }
        let temp = Temporary {
            address: self.base.wrapping_add(self.used as u16),
            size,
        };
        self.used += size;
        self.live.push(temp);
        Ok(temp)
    }

    /// Release `temp`, which must be the most recent live allocation.
    pub fn release(&mut self, temp: Temporary) -> Result<()> {
        match self.live.last() {
            Some(top) if *top == temp => {
                self.live.pop();
                self.used -= temp.size;
                Ok(())
            }
            _ => Err(CompilerError::internal(format!(
                "temporary at {:#06x} released out of order",
                temp.address
            ))),
        }
    }

    pub fn mark(&self) -> TemporaryMark {
        TemporaryMark(self.live.len())
    }

    /// Release everything allocated since `mark`.
    pub fn release_to(&mut self, mark: TemporaryMark) {
        while self.live.len() > mark.0 {
            if let Some(temp) = self.live.pop() {
                self.used -= temp.size;
            }
        }
    }

    /// Live temporaries, oldest first.
    pub fn live(&self) -> &[Temporary] {
        &self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Bytes in use.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Statement boundaries require an empty stack.
    pub fn assert_empty(&self) -> Result<()> {
        if self.live.is_empty() {
            Ok(())
        } else {
            Err(CompilerError::internal(format!(
                "{} temporaries leaked past a statement boundary",
                self.live.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_contiguous() {
        let mut stack = TemporaryStack::new(0x10, 0x100);
        let a = stack.allocate(2, Span::default()).unwrap();
        let b = stack.allocate(1, Span::default()).unwrap();
        assert_eq!(a.address, 0x10);
        assert_eq!(b.address, 0x12);
        assert_eq!(stack.used(), 3);
    }

    #[test]
    fn release_must_be_lifo() {
        let mut stack = TemporaryStack::new(0x10, 0x100);
        let a = stack.allocate(2, Span::default()).unwrap();
        let b = stack.allocate(2, Span::default()).unwrap();
        assert!(stack.release(a).is_err());
        stack.release(b).unwrap();
        stack.release(a).unwrap();
        assert!(stack.is_empty());
        assert!(stack.assert_empty().is_ok());
    }

    #[test]
    fn release_to_mark() {
        let mut stack = TemporaryStack::new(0x10, 0x100);
        let keep = stack.allocate(1, Span::default()).unwrap();
        let mark = stack.mark();
        stack.allocate(4, Span::default()).unwrap();
        stack.allocate(4, Span::default()).unwrap();
        stack.release_to(mark);
        assert_eq!(stack.live(), &[keep]);
        assert_eq!(stack.used(), 1);
    }

    #[test]
    fn exhaustion() {
        let mut stack = TemporaryStack::new(0x10, 4);
        stack.allocate(3, Span::default()).unwrap();
        let err = stack.allocate(2, Span::default()).unwrap_err();
        assert_eq!(
            err,
            CompilerError::TemporariesExhausted {
                requested: 2,
                available: 1,
                span: Span::default(),
            }
        );
    }

    #[test]
    fn leaked_temporaries_are_reported() {
        let mut stack = TemporaryStack::new(0x10, 0x100);
        stack.allocate(1, Span::default()).unwrap();
        assert!(stack.assert_empty().is_err());
    }
}
