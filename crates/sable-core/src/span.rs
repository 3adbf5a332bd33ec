//! Source anchors for diagnostics.
//!
//! The compiler never sees source text, but the AST handed to it carries the
//! position each node was parsed from. [`Span`] is that position.

use std::fmt;

/// Where a node came from: a starting line and column plus a byte length.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// A zero-length span.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Smallest span covering both `self` and `other`.
    ///
    /// Spans on different lines keep the earlier start and add the lengths.
    pub fn to(self, other: Span) -> Span {
        let (first, second) = if (other.line, other.col) < (self.line, self.col) {
            (other, self)
        } else {
            (self, other)
        };
        if first.line != second.line {
            return Span::new(first.line, first.col, first.len + second.len);
        }
        let end = (first.col + first.len).max(second.col + second.len);
        Span::new(first.line, first.col, end - first.col)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
