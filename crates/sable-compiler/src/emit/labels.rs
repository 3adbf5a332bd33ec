//! Generated label names.

/// Hands out sequentially numbered labels, `.L0`, `.L1`, ...
///
/// One per compilation session, so labels never collide inside a program.
#[derive(Debug, Clone)]
pub struct LabelMaker {
    prefix: &'static str,
    next: usize,
}

impl Default for LabelMaker {
    fn default() -> Self {
        Self::new(".L")
    }
}

impl LabelMaker {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    pub fn next_label(&mut self) -> String {
        let label = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        label
    }

    /// Number of labels handed out so far.
    pub fn count(&self) -> usize {
        self.next
    }
}
