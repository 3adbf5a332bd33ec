//! Per-compilation state.
//!
//! A [`CompilerSession`] owns everything that lives for one program: the
//! global symbol table, the temporary stack, the label counters and the
//! static storage cursor. Sessions share nothing, so independent compilations never
//! interfere.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_core::{
    CompilerError, Intrinsic, RANGE_TYPE_NAME, Span, Symbol, SymbolTable, SymbolType, range_type,
};

use crate::emit::LabelMaker;
use crate::ir::Address;
use crate::options::CompilerOptions;
use crate::temporaries::TemporaryStack;

type Result<T> = std::result::Result<T, CompilerError>;

/// Label of the runtime panic routine emitted by the backend.
pub const PANIC_LABEL: &str = "__panic";

#[derive(Debug)]
pub struct CompilerSession {
    pub options: CompilerOptions,
    pub symbols: SymbolTable,
    pub temporaries: TemporaryStack,
    pub labels: LabelMaker,
    /// Uses of each mangled function name so far.
    function_labels: FxHashMap<String, usize>,
    static_cursor: usize,
}

impl Default for CompilerSession {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl CompilerSession {
    pub fn new(options: CompilerOptions) -> Self {
        let temporaries = TemporaryStack::new(options.temporaries_start, options.temporaries_len);
        let static_cursor = usize::from(options.static_start);
        let mut session = Self {
            options,
            symbols: SymbolTable::new(),
            temporaries,
            labels: LabelMaker::default(),
            function_labels: FxHashMap::default(),
            static_cursor,
        };
        session.bind_builtins();
        session
    }

    fn bind_builtins(&mut self) {
        self.symbols.bind_type(RANGE_TYPE_NAME, range_type());
        for intrinsic in Intrinsic::ALL {
            let ty = SymbolType::Function(Rc::new(intrinsic.function_type()));
            self.symbols
                .bind(intrinsic.name(), Symbol::static_at(ty, 0).with_mutable(false));
        }
    }

    /// Reserve `size` bytes of static storage.
    pub fn allocate_static(&mut self, size: usize, span: Span) -> Result<Address> {
        let address = self.static_cursor;
        if address + size > usize::from(u16::MAX) + 1 {
            return Err(CompilerError::statement(
                format!("static storage exhausted allocating {size} bytes"),
                span,
            ));
        }
        self.static_cursor += size;
        Ok(address as Address)
    }

    /// Next free static address.
    pub fn static_cursor(&self) -> usize {
        self.static_cursor
    }

    pub fn next_label(&mut self) -> String {
        self.labels.next_label()
    }

    /// A code label for a function whose mangled name is `mangled`, unique
    /// within the session.
    ///
    /// The first function with a given name keeps it. Later ones, and any
    /// name in the reserved `__` namespace, get a `.n` suffix, which no
    /// identifier can spell.
    pub fn function_label(&mut self, mangled: &str) -> String {
        let uses = self.function_labels.entry(mangled.to_string()).or_default();
        let n = *uses;
        *uses += 1;
        if n == 0 && !mangled.starts_with("__") {
            mangled.to_string()
        } else {
            format!("{mangled}.{n}")
        }
    }
}
