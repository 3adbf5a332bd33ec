//! Type expressions to [`SymbolType`]s.

use std::rc::Rc;

use sable_ast::{Expr, PrimitiveType, TypeExpr};
use sable_core::{CompilerError, FunctionType, SymbolType};

use super::{Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn resolve_type_expr(&self, ty: &TypeExpr<'_>) -> Result<SymbolType> {
        match ty {
            TypeExpr::Primitive(kind, _) => Ok(match kind {
                PrimitiveType::Void => SymbolType::Void,
                PrimitiveType::Bool => SymbolType::Bool,
                PrimitiveType::U8 => SymbolType::U8,
                PrimitiveType::U16 => SymbolType::U16,
            }),
            TypeExpr::Named(ident) => Ok(self.symbols.resolve_type(ident.name, ident.span)?.clone()),
            TypeExpr::Pointer(pointee, _) => Ok(SymbolType::pointer(self.resolve_type_expr(pointee)?)),
            TypeExpr::Const(inner, _) => Ok(self.resolve_type_expr(inner)?.const_of()),
            TypeExpr::Array(array) => {
                let count = match array.count {
                    Some(count) => Some(self.array_count(count)?),
                    None => None,
                };
                Ok(SymbolType::array(count, self.resolve_type_expr(&array.element)?))
            }
            TypeExpr::DynamicArray(element, _) => {
                Ok(SymbolType::dynamic_array(self.resolve_type_expr(element)?))
            }
            TypeExpr::Union(members, _) => {
                let members = members
                    .iter()
                    .map(|member| self.resolve_type_expr(member))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SymbolType::union_of(members))
            }
            TypeExpr::Function(function) => {
                let return_type = self.resolve_type_expr(&function.return_type)?;
                let arguments = function
                    .arguments
                    .iter()
                    .map(|argument| self.resolve_type_expr(argument))
                    .collect::<Result<Vec<_>>>()?;
                Ok(SymbolType::Function(Rc::new(FunctionType::signature(
                    return_type,
                    arguments,
                ))))
            }
        }
    }

    /// Evaluate the count of an array type or literal.
    pub fn array_count(&self, count: &Expr<'_>) -> Result<usize> {
        match self.check(count)? {
            SymbolType::CompTimeInt(value) => usize::try_from(value).map_err(|_| {
                CompilerError::type_error(
                    format!("array count must be non-negative, got `{value}'"),
                    count.span(),
                )
            }),
            other => Err(CompilerError::type_error(
                format!("array count must be a compile time constant, got `{other}' instead"),
                count.span(),
            )),
        }
    }
}
