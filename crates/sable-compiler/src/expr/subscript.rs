//! Subscripts.
//!
//! ```text
//! arr[i]        ptr = &arr;  check i < N;      ptr += i * size;  load
//! slice[i]      ptr = base;  check i < count;  ptr += i * size;  load
//! x[a..b]       check a <= b && b <= count;  (base + a * size, b - a)
//! ```
//!
//! Out-of-range indices jump to the panic routine. The checks can be turned
//! off with [`CompilerOptions::bounds_checks`](crate::CompilerOptions).

use sable_ast::{Expr, SubscriptExpr};
use sable_core::{CompilerError, Span, SymbolType};

use super::{ExprCompiler, Result, immediate, lvalue};
use crate::ir::{Address, ArithOp, Width};
use crate::session::PANIC_LABEL;
use crate::temporaries::Temporary;

/// Where the element count of the subscripted object comes from.
#[derive(Debug, Clone, Copy)]
enum Count {
    Static(usize),
    /// The word at this address.
    At(Address),
}

pub fn compile_subscript(
    compiler: &mut ExprCompiler<'_>,
    expr: &Expr<'_>,
    subscript: &SubscriptExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    if compiler.check(subscript.index)?.is_range() {
        return compile_range(compiler, subscript, ty);
    }
    if compiler.check_lvalue(expr)?.is_some() {
        return lvalue::load(compiler, expr, ty.size());
    }

    let object = compiler.check(subscript.object)?;
    let count = object
        .array_count()
        .ok_or_else(|| CompilerError::internal(format!("cannot index `{object}' by value")))?;
    let element_size = ty.size();
    let result = compiler.allocate(element_size, subscript.span)?;
    let value = compiler.compile_value(subscript.object)?;
    let pointer = compiler.allocate(2, subscript.span)?;
    compiler
        .emitter
        .store_immediate16(pointer.address, value.address);
    element_address(
        compiler,
        pointer,
        Count::Static(count),
        subscript.index,
        element_size,
    )?;
    compiler
        .emitter
        .copy_words_indirect_source(result.address, pointer.address, element_size);
    compiler.release(pointer)?;
    compiler.release(value)?;
    Ok(result)
}

/// Address of an addressable element: any slice element, or an element of
/// an addressable array.
pub fn compile_element_address(
    compiler: &mut ExprCompiler<'_>,
    subscript: &SubscriptExpr<'_>,
) -> Result<Temporary> {
    let object = compiler.check(subscript.object)?;
    let element_size = object
        .element_type()
        .map(|element| element.size())
        .ok_or_else(|| CompilerError::internal(format!("`{object}' has no elements")))?;
    match object.unqualified() {
        SymbolType::DynamicArray(_) => {
            let pointer = compiler.allocate(2, subscript.span)?;
            let slice = compiler.compile_value(subscript.object)?;
            compiler
                .emitter
                .copy_words(pointer.address, slice.address, 2);
            element_address(
                compiler,
                pointer,
                Count::At(slice.at(2)),
                subscript.index,
                element_size,
            )?;
            compiler.release(slice)?;
            Ok(pointer)
        }
        SymbolType::Array { count, .. } => {
            let pointer = lvalue::compile_address(compiler, subscript.object)?;
            element_address(
                compiler,
                pointer,
                Count::Static(count.unwrap_or_default()),
                subscript.index,
                element_size,
            )?;
            Ok(pointer)
        }
        other => Err(CompilerError::internal(format!(
            "value of type `{other}' has no subscripts"
        ))),
    }
}

/// Advance the base address in `pointer` to element `index`.
fn element_address(
    compiler: &mut ExprCompiler<'_>,
    pointer: Temporary,
    count: Count,
    index: &Expr<'_>,
    element_size: usize,
) -> Result<()> {
    let span = index.span();
    let index = compiler.compile_converted(index, &SymbolType::U16)?;
    if compiler.session.options.bounds_checks {
        let flag = compiler.allocate(1, span)?;
        match count {
            Count::Static(count) => {
                let limit = compiler.allocate(2, span)?;
                compiler
                    .emitter
                    .store_immediate16(limit.address, immediate(count)?);
                compiler.emitter.arith(
                    ArithOp::Ge,
                    Width::Word,
                    flag.address,
                    index.address,
                    limit.address,
                );
                compiler.release(limit)?;
            }
            Count::At(limit) => {
                compiler
                    .emitter
                    .arith(ArithOp::Ge, Width::Word, flag.address, index.address, limit);
            }
        }
        compiler.emitter.jnz(PANIC_LABEL, flag.address);
        compiler.release(flag)?;
    }
    scale(compiler, index.address, element_size)?;
    compiler.emitter.arith(
        ArithOp::Add,
        Width::Word,
        pointer.address,
        pointer.address,
        index.address,
    );
    compiler.release(index)
}

fn scale(compiler: &mut ExprCompiler<'_>, word: Address, element_size: usize) -> Result<()> {
    if element_size != 1 {
        compiler
            .emitter
            .muli16(word, word, immediate(element_size)?);
    }
    Ok(())
}

/// `object[begin..limit]` as a slice of `object`.
fn compile_range(
    compiler: &mut ExprCompiler<'_>,
    subscript: &SubscriptExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    let element_size = ty
        .element_type()
        .map(|element| element.size())
        .ok_or_else(|| CompilerError::internal(format!("`{ty}' is not a slice")))?;
    let result = compiler.compile_converted(subscript.object, ty)?;
    let range = compiler.compile_value(subscript.index)?;
    let (begin, limit) = (range.at(0), range.at(2));

    if compiler.session.options.bounds_checks {
        check_greater(compiler, begin, limit, subscript.span)?;
        check_greater(compiler, limit, result.at(2), subscript.span)?;
    }

    compiler
        .emitter
        .arith(ArithOp::Sub, Width::Word, result.at(2), limit, begin);
    scale(compiler, begin, element_size)?;
    compiler.emitter.arith(
        ArithOp::Add,
        Width::Word,
        result.address,
        result.address,
        begin,
    );
    compiler.release(range)?;
    Ok(result)
}

/// Panic when the word at `left` exceeds the word at `right`.
fn check_greater(
    compiler: &mut ExprCompiler<'_>,
    left: Address,
    right: Address,
    span: Span,
) -> Result<()> {
    let flag = compiler.allocate(1, span)?;
    compiler
        .emitter
        .arith(ArithOp::Gt, Width::Word, flag.address, left, right);
    compiler.emitter.jnz(PANIC_LABEL, flag.address);
    compiler.release(flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrInstruction;
    use crate::CompilerOptions;
    use crate::expr::test_support;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;

    fn panics(ir: &[IrInstruction]) -> usize {
        ir.iter()
            .filter(|ins| matches!(ins, IrInstruction::Jnz { label, .. } if label == PANIC_LABEL))
            .count()
    }

    #[test]
    fn array_element_is_bounds_checked() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, result) =
            test_support::compile(&mut session, &ast.subscript(ast.ident("arr"), ast.ident("a")));
        assert_eq!(result.map(|t| t.size), Some(1));
        assert_eq!(panics(&ir), 1);
        assert!(ir.contains(&IrInstruction::StoreImmediate16 {
            dst: 0x0016,
            value: 3
        }));
        assert_eq!(
            ir.last(),
            Some(&IrInstruction::CopyWordsIndirectSource {
                dst: 0x0010,
                src_ptr: 0x0011,
                count: 1
            })
        );
    }

    #[test]
    fn slice_element_is_scaled() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, result) =
            test_support::compile(&mut session, &ast.subscript(ast.ident("slice"), ast.int(1)));
        assert_eq!(result.map(|t| t.size), Some(2));
        assert!(ir.contains(&IrInstruction::Muli16 {
            dst: 0x0018,
            left: 0x0018,
            imm: 2
        }));
        // the count is read straight out of the slice
        assert!(ir.contains(&IrInstruction::Arith {
            op: ArithOp::Ge,
            width: Width::Word,
            dst: 0x001a,
            left: 0x0018,
            right: 0x0016,
        }));
    }

    #[test]
    fn bounds_checks_can_be_disabled() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        session.options = CompilerOptions::default().with_bounds_checks(false);
        let (ir, _) =
            test_support::compile(&mut session, &ast.subscript(ast.ident("arr"), ast.int(2)));
        assert_eq!(panics(&ir), 0);
    }

    #[test]
    fn range_of_array_is_a_slice() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.subscript(ast.ident("arr"), ast.range(ast.int(1), ast.int(3)));
        let (ir, result) = test_support::compile(&mut session, &expr);
        assert_eq!(result.map(|t| t.size), Some(4));
        assert_eq!(panics(&ir), 2);
        assert!(ir.contains(&IrInstruction::Arith {
            op: ArithOp::Sub,
            width: Width::Word,
            dst: 0x0012,
            left: 0x0016,
            right: 0x0014,
        }));
        assert!(session.temporaries.live().len() == 1);
    }
}
