//! Identifiers as rvalues, and frame addressing.
//!
//! A stack symbol at frame offset `o` lives at `FP - o`. Symbols of an
//! enclosing function are reached by following the saved frame pointer
//! chain, one link per frame:
//!
//! ```text
//! FP + 4 + args   return slot
//! FP + 4 ..       arguments, the last one nearest FP
//! FP + 2          return address
//! FP              saved frame pointer   <- FP
//! FP - o          locals
//! ```

use sable_ast::Ident;
use sable_core::{CompilerError, Span, Storage};

use super::{ExprCompiler, Result};
use crate::temporaries::Temporary;

pub fn compile_identifier(compiler: &mut ExprCompiler<'_>, ident: &Ident<'_>) -> Result<Temporary> {
    let (symbol, depth) = compiler
        .session
        .symbols
        .resolve_with_stack_frame_depth(ident.name, ident.span)?;
    let symbol = symbol.clone();
    if symbol.ty.as_function().is_some() {
        return Err(function_value(ident.span));
    }
    let size = symbol.ty.size();
    let result = compiler.allocate(size, ident.span)?;
    match symbol.storage {
        Storage::Static => {
            let address = static_address(symbol.offset)?;
            compiler.emitter.copy_words(result.address, address, size);
        }
        Storage::Stack => {
            let pointer = frame_address(compiler, symbol.offset, depth, ident.span)?;
            compiler
                .emitter
                .copy_words_indirect_source(result.address, pointer.address, size);
            compiler.release(pointer)?;
        }
    }
    Ok(result)
}

/// Address `FP - offset` of the frame `depth` functions out.
pub fn frame_address(
    compiler: &mut ExprCompiler<'_>,
    offset: i32,
    depth: usize,
    span: Span,
) -> Result<Temporary> {
    let fp = compiler.frame_pointer();
    let pointer = compiler.allocate(2, span)?;
    compiler.emitter.copy_words(pointer.address, fp, 2);
    for _ in 0..depth {
        compiler
            .emitter
            .copy_words_indirect_source(pointer.address, pointer.address, 2);
    }
    let magnitude = u16::try_from(offset.unsigned_abs())
        .map_err(|_| CompilerError::internal(format!("frame offset {offset} out of range")))?;
    if offset > 0 {
        compiler
            .emitter
            .subi16(pointer.address, pointer.address, magnitude);
    } else if offset < 0 {
        compiler
            .emitter
            .addi16(pointer.address, pointer.address, magnitude);
    }
    Ok(pointer)
}

pub fn static_address(offset: i32) -> Result<u16> {
    u16::try_from(offset)
        .map_err(|_| CompilerError::internal(format!("static address {offset} out of range")))
}

pub fn function_value(span: Span) -> CompilerError {
    CompilerError::type_error(
        "inappropriate use of a function type (Try taking the function's address instead.)",
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::test_support;
    use crate::ir::IrInstruction;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;
    use sable_core::{Symbol, SymbolType};

    #[test]
    fn static_load() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, _) = test_support::compile(&mut session, &ast.ident("b"));
        assert_eq!(
            ir,
            vec![IrInstruction::CopyWords {
                dst: 0x0010,
                src: 0x0111,
                count: 2
            }]
        );
    }

    #[test]
    fn local_load_is_frame_relative() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        session.symbols.push_function_scope("f");
        session
            .symbols
            .bind("x", Symbol::on_stack(SymbolType::U16, 2));
        let (ir, _) = test_support::compile(&mut session, &ast.ident("x"));
        assert_eq!(
            ir,
            vec![
                IrInstruction::CopyWords {
                    dst: 0x0012,
                    src: 0x0002,
                    count: 2
                },
                IrInstruction::Subi16 {
                    dst: 0x0012,
                    left: 0x0012,
                    imm: 2
                },
                IrInstruction::CopyWordsIndirectSource {
                    dst: 0x0010,
                    src_ptr: 0x0012,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn enclosing_frame_follows_saved_frame_pointer() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        session.symbols.push_function_scope("outer");
        session
            .symbols
            .bind("arg", Symbol::on_stack(SymbolType::U8, -4));
        session.symbols.push_function_scope("outer::inner");
        let (ir, _) = test_support::compile(&mut session, &ast.ident("arg"));
        assert_eq!(
            &ir[..3],
            &[
                IrInstruction::CopyWords {
                    dst: 0x0011,
                    src: 0x0002,
                    count: 2
                },
                IrInstruction::CopyWordsIndirectSource {
                    dst: 0x0011,
                    src_ptr: 0x0011,
                    count: 2
                },
                IrInstruction::Addi16 {
                    dst: 0x0011,
                    left: 0x0011,
                    imm: 4
                },
            ]
        );
    }

    #[test]
    fn function_is_not_a_value() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let mut emitter = crate::emit::IrEmitter::new();
        let err = ExprCompiler::new(&mut session, &mut emitter)
            .compile(&ast.ident("f"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "inappropriate use of a function type (Try taking the function's address instead.)"
        );
    }
}
