//! Lexically scoped symbol table.
//!
//! A [`SymbolTable`] is a chain of scopes, innermost last. Each scope owns its
//! own symbols and type names; lookups walk outward, so an inner declaration
//! shadows an outer one. Redefinition inside a single scope is an error.
//!
//! Scopes also carry the frame bookkeeping the statement compiler needs:
//!
//! - `stack_frame_index` counts enclosing function bodies (0 is the program
//!   level, where every variable is static);
//! - `storage_pointer` is the number of frame bytes allocated so far in the
//!   current function;
//! - function scopes remember the label of the function they open, for
//!   mangling nested function labels.
//!
//! # Example
//!
//! ```
//! use sable_core::{Symbol, SymbolTable, SymbolType};
//!
//! let mut symbols = SymbolTable::new();
//! symbols.bind("foo", Symbol::static_at(SymbolType::U8, 0x0110));
//! symbols.push_scope();
//! symbols.bind("foo", Symbol::static_at(SymbolType::U16, 0x0111));
//! assert_eq!(symbols.lookup("foo").unwrap().ty, SymbolType::U16);
//! symbols.pop_scope();
//! assert_eq!(symbols.lookup("foo").unwrap().ty, SymbolType::U8);
//! ```

use rustc_hash::FxHashMap;

use crate::{CompilerError, Span, Symbol, SymbolType};

type Result<T> = std::result::Result<T, CompilerError>;

#[derive(Debug, Clone, Default)]
struct Scope {
    symbols: FxHashMap<String, Symbol>,
    types: FxHashMap<String, SymbolType>,
    storage_pointer: usize,
    stack_frame_index: usize,
    /// Label of the function whose body this scope opens.
    function: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table with a single, outermost scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    fn current(&self) -> &Scope {
        // The outermost scope is never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Open a block scope inside the current function.
    pub fn push_scope(&mut self) {
        let parent = self.current();
        let scope = Scope {
            storage_pointer: parent.storage_pointer,
            stack_frame_index: parent.stack_frame_index,
            ..Scope::default()
        };
        self.scopes.push(scope);
    }

    /// Open the outermost scope of a function body labelled `label`.
    pub fn push_function_scope(&mut self, label: impl Into<String>) {
        let scope = Scope {
            stack_frame_index: self.current().stack_frame_index + 1,
            function: Some(label.into()),
            ..Scope::default()
        };
        self.scopes.push(scope);
    }

    /// Close the innermost scope.
    ///
    /// A block scope hands its storage pointer back to its parent so locals
    /// of one function never share frame bytes.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() <= 1 {
            return;
        }
        if let Some(scope) = self.scopes.pop() {
            let parent = self.current_mut();
            if scope.function.is_none() && scope.stack_frame_index == parent.stack_frame_index {
                parent.storage_pointer = parent.storage_pointer.max(scope.storage_pointer);
            }
        }
    }

    /// Number of open scopes, including the outermost one.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn stack_frame_index(&self) -> usize {
        self.current().stack_frame_index
    }

    /// Whether declarations here land in static storage.
    pub fn is_program_level(&self) -> bool {
        self.current().stack_frame_index == 0
    }

    pub fn storage_pointer(&self) -> usize {
        self.current().storage_pointer
    }

    /// Reserve `size` bytes and return the storage pointer before the bump.
    pub fn bump_storage_pointer(&mut self, size: usize) -> usize {
        let scope = self.current_mut();
        let previous = scope.storage_pointer;
        scope.storage_pointer += size;
        previous
    }

    /// Label of the innermost enclosing function, if any.
    pub fn enclosing_function(&self) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.function.as_deref())
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// Bind `name` in the innermost scope, replacing any binding there.
    pub fn bind(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.current_mut().symbols.insert(name.into(), symbol);
    }

    /// Bind `name`, failing if the innermost scope already has it.
    ///
    /// `kind` names the declaration in the error, e.g. `variable`.
    pub fn declare(
        &mut self,
        name: &str,
        symbol: Symbol,
        kind: &'static str,
        span: Span,
    ) -> Result<()> {
        if self.exists_and_cannot_be_shadowed(name) {
            return Err(CompilerError::Redefinition {
                kind,
                name: name.to_string(),
                span,
            });
        }
        self.bind(name, symbol);
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Whether `name` is bound in the innermost scope itself.
    pub fn exists_and_cannot_be_shadowed(&self, name: &str) -> bool {
        let scope = self.current();
        scope.symbols.contains_key(name) || scope.types.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    pub fn resolve(&self, name: &str, span: Span) -> Result<&Symbol> {
        self.lookup(name)
            .ok_or_else(|| CompilerError::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            })
    }

    /// Resolve `name` and report how many function frames lie between the
    /// use and the declaration.
    pub fn resolve_with_stack_frame_depth(&self, name: &str, span: Span) -> Result<(&Symbol, usize)> {
        let here = self.current().stack_frame_index;
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| {
                scope
                    .symbols
                    .get(name)
                    .map(|symbol| (symbol, here - scope.stack_frame_index))
            })
            .ok_or_else(|| CompilerError::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            })
    }

    /// Resolve `name` and report how many scopes outward it was found.
    pub fn resolve_with_scope_depth(&self, name: &str, span: Span) -> Result<(&Symbol, usize)> {
        self.scopes
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, scope)| scope.symbols.get(name).map(|symbol| (symbol, depth)))
            .ok_or_else(|| CompilerError::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            })
    }

    /// Symbols bound directly in the innermost scope, in no particular order.
    pub fn local_symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.current()
            .symbols
            .iter()
            .map(|(name, symbol)| (name.as_str(), symbol))
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn bind_type(&mut self, name: impl Into<String>, ty: SymbolType) {
        self.current_mut().types.insert(name.into(), ty);
    }

    pub fn exists_as_type(&self, name: &str) -> bool {
        self.lookup_type(name).is_some()
    }

    pub fn lookup_type(&self, name: &str) -> Option<&SymbolType> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name))
    }

    pub fn resolve_type(&self, name: &str, span: Span) -> Result<&SymbolType> {
        self.lookup_type(name)
            .ok_or_else(|| CompilerError::UndeclaredType {
                name: name.to_string(),
                span,
            })
    }
}
