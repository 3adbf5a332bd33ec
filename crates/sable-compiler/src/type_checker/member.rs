//! Member access: `expr.name`.
//!
//! ```text
//! [N]T     count      u16
//! []T      count      u16
//! struct   <member>   member type, const when the struct is const
//! *T       pointee    T
//! *Struct  <member>   forwarded to the pointee
//! ```

use sable_ast::GetExpr;
use sable_core::{CompilerError, SymbolType};

use super::{Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn check_get(&self, get: &GetExpr<'_>) -> Result<SymbolType> {
        let object = self.check(get.object)?;
        self.member_type(&object, get)
    }

    pub(super) fn check_get_lvalue(&self, get: &GetExpr<'_>) -> Result<Option<SymbolType>> {
        let object = self.check(get.object)?;
        if object.pointee().is_some() {
            return self.member_type(&object, get).map(Some);
        }
        if object.as_struct().is_some() && self.check_lvalue(get.object)?.is_some() {
            return self.member_type(&object, get).map(Some);
        }
        Ok(None)
    }

    /// Type of member `get.member` of a value of type `object`.
    pub fn member_type(&self, object: &SymbolType, get: &GetExpr<'_>) -> Result<SymbolType> {
        let name = get.member.name;
        let no_member = || {
            CompilerError::type_error(
                format!("value of type `{object}' has no member `{name}'"),
                get.span,
            )
        };
        match object.unqualified() {
            SymbolType::Array { .. } | SymbolType::DynamicArray(_) if name == "count" => {
                Ok(SymbolType::U16)
            }
            SymbolType::Struct(ty) => {
                let member = ty.member(name).ok_or_else(no_member)?;
                Ok(if object.is_const() {
                    member.ty.clone().const_of()
                } else {
                    member.ty.clone()
                })
            }
            SymbolType::Pointer(pointee) => {
                if name == "pointee" {
                    return Ok(pointee.as_ref().clone());
                }
                if pointee.as_struct().is_some() {
                    return self.member_type(pointee, get).map_err(|_| no_member());
                }
                Err(no_member())
            }
            _ => Err(no_member()),
        }
    }
}
