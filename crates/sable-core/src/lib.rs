//! Core types shared by every stage of the sable compiler.
//!
//! - [`Span`]: source positions attached to AST nodes and diagnostics
//! - [`CompilerError`] / [`CompilerErrors`]: the diagnostic contract
//! - [`SymbolType`]: the type model
//! - [`Symbol`] / [`SymbolTable`]: scoped name resolution

mod error;
mod span;
mod symbol;
mod symbol_table;
mod types;

pub use error::{CompilerError, CompilerErrors};
pub use span::Span;
pub use symbol::{Storage, Symbol, Visibility};
pub use symbol_table::SymbolTable;
pub use types::{
    FunctionType, Intrinsic, RANGE_TYPE_NAME, StructType, SymbolType, U8_MAX, U16_MAX,
    UnionType, range_type,
};
