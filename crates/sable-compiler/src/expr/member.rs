//! Member access.

use sable_ast::{Expr, GetExpr};
use sable_core::{CompilerError, SymbolType};

use super::{ExprCompiler, Result, immediate, lvalue};
use crate::temporaries::Temporary;

pub fn compile_get(
    compiler: &mut ExprCompiler<'_>,
    expr: &Expr<'_>,
    get: &GetExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    let object = compiler.check(get.object)?;
    let size = ty.size();
    match object.unqualified() {
        SymbolType::Array { count, .. } if get.member.name == "count" => {
            let result = compiler.allocate(2, get.span)?;
            compiler
                .emitter
                .store_immediate16(result.address, immediate(count.unwrap_or_default())?);
            Ok(result)
        }
        SymbolType::DynamicArray(_) if get.member.name == "count" => {
            let result = compiler.allocate(2, get.span)?;
            let slice = compiler.compile_value(get.object)?;
            compiler.emitter.copy_words(result.address, slice.at(2), 2);
            compiler.release(slice)?;
            Ok(result)
        }
        _ if compiler.check_lvalue(expr)?.is_some() => lvalue::load(compiler, expr, size),
        SymbolType::Struct(_) => {
            let offset = lvalue::member_offset(&object, get.member.name)?;
            let result = compiler.allocate(size, get.span)?;
            let value = compiler.compile_value(get.object)?;
            compiler
                .emitter
                .copy_words(result.address, value.at(usize::from(offset)), size);
            compiler.release(value)?;
            Ok(result)
        }
        other => Err(CompilerError::internal(format!(
            "cannot read member `{}' of `{other}'",
            get.member.name
        ))),
    }
}
