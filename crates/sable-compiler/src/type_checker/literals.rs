//! Array literals and struct initializers.

use rustc_hash::FxHashSet;
use sable_ast::{LiteralArrayExpr, StructInitializerExpr};
use sable_core::{CompilerError, SymbolType};

use super::{ConversionContext, Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn check_literal_array(&self, literal: &LiteralArrayExpr<'_>) -> Result<SymbolType> {
        let element = match literal.element_type {
            Some(ty) => self.resolve_type_expr(ty)?,
            None => self.infer_element_type(literal)?,
        };
        let count = literal.elements.len();
        let array = SymbolType::array(Some(count), element.clone());

        if let Some(expected) = literal.count {
            let expected = self.array_count(expected)?;
            if expected != count {
                let declared = SymbolType::array(Some(expected), element);
                return Err(CompilerError::type_error(
                    format!("expected {expected} elements in `{declared}' array literal"),
                    literal.span,
                ));
            }
        }

        for item in literal.elements {
            let ty = self.check(item)?;
            self.convert(
                &element,
                &ty,
                false,
                ConversionContext::ArrayElement { array: &array },
                item.span(),
            )?;
        }
        Ok(array)
    }

    /// Element type of an untyped array literal.
    ///
    /// Integers widen to the widest class among the elements; everything else
    /// must agree exactly.
    fn infer_element_type(&self, literal: &LiteralArrayExpr<'_>) -> Result<SymbolType> {
        let heterogeneous =
            || CompilerError::type_error("cannot infer type of heterogeneous array", literal.span);
        let mut inferred: Option<SymbolType> = None;
        for item in literal.elements {
            let ty = self.check(item)?;
            let ty = if ty.is_arithmetic() {
                ty.arithmetic_class().ok_or_else(heterogeneous)?
            } else {
                ty.materialized().unwrap_or(ty).into_unqualified()
            };
            inferred = Some(match inferred {
                None => ty,
                Some(previous) if previous == ty => previous,
                Some(previous) if previous.is_arithmetic() && ty.is_arithmetic() => SymbolType::U16,
                Some(_) => return Err(heterogeneous()),
            });
        }
        inferred.ok_or_else(heterogeneous)
    }

    pub fn check_struct_initializer(&self, init: &StructInitializerExpr<'_>) -> Result<SymbolType> {
        let ty = self.symbols.resolve_type(init.name.name, init.name.span)?.clone();
        let Some(struct_type) = ty.as_struct() else {
            return Err(CompilerError::type_error(
                format!("cannot initialize value of non-struct type `{ty}'"),
                init.span,
            ));
        };

        let mut seen = FxHashSet::default();
        for field in init.fields {
            let name = field.name.name;
            let member = struct_type.member(name).ok_or_else(|| {
                CompilerError::type_error(
                    format!("value of type `{ty}' has no member `{name}'"),
                    field.name.span,
                )
            })?;
            if !seen.insert(name) {
                return Err(CompilerError::type_error(
                    format!("initialization of member `{name}' can only occur one time"),
                    field.name.span,
                ));
            }
            let value = self.check(field.value)?;
            self.convert(
                &member.ty,
                &value,
                false,
                ConversionContext::StructMember { member: name },
                field.value.span(),
            )?;
        }
        Ok(ty)
    }
}
