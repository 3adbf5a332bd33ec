//! Symbols bound in a [`SymbolTable`](crate::SymbolTable).

use crate::SymbolType;

/// Storage class of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Fixed absolute address.
    Static,
    /// Offset from the frame pointer of the declaring function.
    Stack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

/// A named storage location.
///
/// `offset` is an absolute byte address for [`Storage::Static`]. For
/// [`Storage::Stack`] the runtime address is `FP - offset`: locals have
/// positive offsets, parameters and the return slot sit above the frame
/// pointer and have negative ones. Struct members use `offset` relative to the
/// struct base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub ty: SymbolType,
    pub offset: i32,
    pub storage: Storage,
    pub is_mutable: bool,
    pub visibility: Visibility,
}

impl Symbol {
    pub fn new(ty: SymbolType, offset: i32, storage: Storage) -> Self {
        Self {
            ty,
            offset,
            storage,
            is_mutable: true,
            visibility: Visibility::Private,
        }
    }

    pub fn static_at(ty: SymbolType, address: u16) -> Self {
        Self::new(ty, i32::from(address), Storage::Static)
    }

    pub fn on_stack(ty: SymbolType, offset: i32) -> Self {
        Self::new(ty, offset, Storage::Stack)
    }

    pub fn with_mutable(mut self, is_mutable: bool) -> Self {
        self.is_mutable = is_mutable;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// The static address, if this symbol has static storage.
    pub fn static_address(&self) -> Option<u16> {
        match self.storage {
            Storage::Static => u16::try_from(self.offset).ok(),
            Storage::Stack => None,
        }
    }
}
