//! Expression type checker.
//!
//! The [`TypeChecker`] assigns a [`SymbolType`] to an expression against the
//! current symbol table. It folds arithmetic over compile-time constants and
//! enforces the operator and conversion rules, but never emits code. The
//! expression compiler consults it before lowering every node.
//!
//! Binary operands are checked right to left, so when both sides are
//! erroneous the error in the right operand is the one reported.
//!
//! # Example
//!
//! ```ignore
//! let checker = TypeChecker::new(&symbols);
//! let ty = checker.check(&expr)?;
//! ```

mod assignment;
mod binary;
mod call;
mod cast;
mod conversion;
mod literals;
mod member;
mod subscript;
mod types;
mod unary;

pub use conversion::{ConversionContext, select_union_member};

use sable_ast::{Expr, Ident};
use sable_core::{CompilerError, SymbolTable, SymbolType};

type Result<T> = std::result::Result<T, CompilerError>;

/// Computes the types of expressions.
///
/// Holds only a shared borrow of the symbol table: checking never binds
/// anything.
pub struct TypeChecker<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> TypeChecker<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// The type of `expr`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn check(&self, expr: &Expr<'_>) -> Result<SymbolType> {
        match expr {
            Expr::LiteralInt(literal) => Ok(SymbolType::CompTimeInt(literal.value)),
            Expr::LiteralBool(literal) => Ok(SymbolType::CompTimeBool(literal.value)),
            Expr::LiteralArray(literal) => self.check_literal_array(literal),
            Expr::Identifier(ident) => self.check_identifier(ident),
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Group(group) => self.check(group.expr),
            Expr::Assignment(assignment) => self.check_assignment(assignment),
            Expr::Call(call) => self.check_call(call),
            Expr::As(cast) => self.check_as(cast),
            Expr::Is(is) => self.check_is(is),
            Expr::Get(get) => self.check_get(get),
            Expr::Subscript(subscript) => self.check_subscript(subscript),
            Expr::StructInitializer(init) => self.check_struct_initializer(init),
        }
    }

    /// The type of the storage `expr` names, or `None` when `expr` is not an
    /// lvalue.
    pub fn check_lvalue(&self, expr: &Expr<'_>) -> Result<Option<SymbolType>> {
        match expr {
            Expr::Identifier(ident) => {
                let symbol = self.symbols.resolve(ident.name, ident.span)?;
                if symbol.ty.as_function().is_some() {
                    return Ok(None);
                }
                Ok(Some(symbol.ty.clone()))
            }
            Expr::Group(group) => self.check_lvalue(group.expr),
            Expr::Get(get) => self.check_get_lvalue(get),
            Expr::Subscript(subscript) => self.check_subscript_lvalue(subscript),
            _ => Ok(None),
        }
    }

    fn check_identifier(&self, ident: &Ident<'_>) -> Result<SymbolType> {
        Ok(self.symbols.resolve(ident.name, ident.span)?.ty.clone())
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }
}
