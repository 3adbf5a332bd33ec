//! Conversion code.
//!
//! The type checker decides whether a conversion is allowed; this module
//! emits it. Most conversions are free. The ones that move bytes:
//!
//! ```text
//! u8 -> u16          zero-extend
//! u16 -> u8          keep the low byte
//! X -> union         tag byte, then the payload converted to the member
//! union -> member    payload at byte 1
//! [N]A -> [N]B       element by element
//! [N]T -> []T        (address, N); rvalue arrays are spilled first
//! ```

use sable_ast::{Expr, IsExpr};
use sable_core::{CompilerError, Span, SymbolType, UnionType};

use super::{ExprCompiler, Result, literals, lvalue};
use crate::ir::{ArithOp, Width};
use crate::temporaries::Temporary;
use crate::type_checker::select_union_member;

pub fn compile_converted(
    compiler: &mut ExprCompiler<'_>,
    expr: &Expr<'_>,
    target: &SymbolType,
) -> Result<Temporary> {
    let source = compiler.check(expr)?;
    let span = expr.span();
    match (target.unqualified(), source.unqualified()) {
        (SymbolType::Union(union), src) if src.as_union().is_none() => {
            wrap_union(compiler, expr, &source, union, span)
        }
        (_, SymbolType::CompTimeInt(_) | SymbolType::CompTimeBool(_)) => {
            literals::store_constant(compiler, &source, target, span)
        }
        (SymbolType::DynamicArray(_), SymbolType::Array { .. }) => {
            array_to_slice(compiler, expr, &source, span)
        }
        _ => {
            let value = compiler.compile_value(expr)?;
            convert_value(compiler, value, &source, target, span)
        }
    }
}

/// `expr is T` on a union: compare the tag byte.
pub fn compile_is(compiler: &mut ExprCompiler<'_>, is: &IsExpr<'_>) -> Result<Temporary> {
    let source = compiler.check(is.expr)?;
    let test = compiler.type_checker().resolve_type_expr(is.test)?;
    let tag = source
        .as_union()
        .and_then(|union| union.tag_of(&test))
        .ok_or_else(|| {
            CompilerError::internal(format!("`{source}' has no runtime member `{test}'"))
        })?;

    let result = compiler.allocate(1, is.span)?;
    let value = compiler.compile_value(is.expr)?;
    let expected = compiler.allocate(1, is.span)?;
    compiler.emitter.store_immediate(expected.address, tag);
    compiler.emitter.arith(
        ArithOp::Eq,
        Width::Byte,
        result.address,
        value.address,
        expected.address,
    );
    compiler.release(expected)?;
    compiler.release(value)?;
    Ok(result)
}

fn wrap_union(
    compiler: &mut ExprCompiler<'_>,
    expr: &Expr<'_>,
    source: &SymbolType,
    union: &UnionType,
    span: Span,
) -> Result<Temporary> {
    let (tag, member) = union_member(union, source)?;
    let result = compiler.allocate(union.size(), span)?;
    compiler.emitter.store_immediate(result.address, tag);
    let payload = compile_converted(compiler, expr, &member)?;
    compiler
        .emitter
        .copy_words(result.at(1), payload.address, member.size());
    compiler.release(payload)?;
    Ok(result)
}

fn union_member(union: &UnionType, source: &SymbolType) -> Result<(u8, SymbolType)> {
    let index = select_union_member(union, source).ok_or_else(|| {
        CompilerError::internal(format!("`{source}' is not a member of `{union}'"))
    })?;
    let tag = u8::try_from(index)
        .map_err(|_| CompilerError::internal(format!("union `{union}' has too many members")))?;
    Ok((tag, union.members[index].clone()))
}

/// `[N]T` to `[]T`. Lvalue arrays are viewed in place.
fn array_to_slice(
    compiler: &mut ExprCompiler<'_>,
    expr: &Expr<'_>,
    source: &SymbolType,
    span: Span,
) -> Result<Temporary> {
    let count = super::immediate(source.array_count().unwrap_or_default())?;
    if compiler.check_lvalue(expr)?.is_none() {
        let value = compiler.compile_value(expr)?;
        return spill_to_slice(compiler, value, count, span);
    }
    let result = compiler.allocate(4, span)?;
    let address = lvalue::compile_address(compiler, expr)?;
    compiler.emitter.copy_words(result.address, address.address, 2);
    compiler.release(address)?;
    compiler.emitter.store_immediate16(result.at(2), count);
    Ok(result)
}

/// Move an array out of the temporary window into storage that outlives
/// the expression, and describe it with a slice.
fn spill_to_slice(
    compiler: &mut ExprCompiler<'_>,
    value: Temporary,
    count: u16,
    span: Span,
) -> Result<Temporary> {
    let result = compiler.allocate(4, span)?;
    compiler.reserve_storage(value.size, result.address, span)?;
    compiler
        .emitter
        .copy_words_indirect_destination(result.address, value.address, value.size);
    compiler.emitter.store_immediate16(result.at(2), count);
    compiler.collapse(value, result)
}

/// Convert a runtime value already on top of the temporary stack.
pub fn convert_value(
    compiler: &mut ExprCompiler<'_>,
    value: Temporary,
    source: &SymbolType,
    target: &SymbolType,
    span: Span,
) -> Result<Temporary> {
    let src = source.unqualified();
    let dst = target.unqualified();
    if src == dst {
        return Ok(value);
    }
    match (dst, src) {
        (SymbolType::U16, SymbolType::U8) => {
            let result = compiler.allocate(2, span)?;
            compiler
                .emitter
                .copy_word_zero_extend(result.address, value.address);
            compiler.collapse(value, result)
        }
        (SymbolType::U8, SymbolType::U16) => {
            let result = compiler.allocate(1, span)?;
            compiler.emitter.copy_words(result.address, value.at(1), 1);
            compiler.collapse(value, result)
        }
        (
            SymbolType::Array {
                element: dst_element,
                ..
            },
            SymbolType::Array {
                count,
                element: src_element,
            },
        ) => {
            if dst_element.same_modulo_const(src_element) {
                return Ok(value);
            }
            let count = count.unwrap_or_default();
            let (src_size, dst_size) = (src_element.size(), dst_element.size());
            let result = compiler.allocate(count * dst_size, span)?;
            for index in 0..count {
                let element = compiler.allocate(src_size, span)?;
                compiler
                    .emitter
                    .copy_words(element.address, value.at(index * src_size), src_size);
                let converted = convert_value(compiler, element, src_element, dst_element, span)?;
                compiler
                    .emitter
                    .copy_words(result.at(index * dst_size), converted.address, dst_size);
                compiler.release(converted)?;
            }
            compiler.collapse(value, result)
        }
        (SymbolType::DynamicArray(_), SymbolType::Array { count, .. }) => {
            let count = super::immediate(count.unwrap_or_default())?;
            spill_to_slice(compiler, value, count, span)
        }
        (SymbolType::DynamicArray(_), SymbolType::DynamicArray(_))
        | (SymbolType::Pointer(_), SymbolType::Pointer(_))
        | (SymbolType::Union(_), SymbolType::Union(_))
        | (SymbolType::Struct(_), SymbolType::Struct(_))
        | (SymbolType::Bool, SymbolType::Bool) => Ok(value),
        (SymbolType::Union(union), _) => {
            let (tag, member) = union_member(union, source)?;
            let result = compiler.allocate(union.size(), span)?;
            compiler.emitter.store_immediate(result.address, tag);
            let copy = compiler.allocate(value.size, span)?;
            compiler
                .emitter
                .copy_words(copy.address, value.address, value.size);
            let payload = convert_value(compiler, copy, source, &member, span)?;
            compiler
                .emitter
                .copy_words(result.at(1), payload.address, member.size());
            compiler.release(payload)?;
            compiler.collapse(value, result)
        }
        (_, SymbolType::Union(_)) => {
            let size = dst.size();
            let result = compiler.allocate(size, span)?;
            compiler.emitter.copy_words(result.address, value.at(1), size);
            compiler.collapse(value, result)
        }
        _ => Err(CompilerError::internal(format!(
            "no conversion from `{source}' to `{target}'"
        ))),
    }
}
