//! Addresses of lvalues.
//!
//! Every addressable expression compiles to a two byte temporary holding the
//! address of its storage. Loads and stores through that address use the
//! indirect copy instructions.

use sable_ast::{Expr, GetExpr};
use sable_core::{CompilerError, Storage, SymbolType};

use super::identifiers::{frame_address, static_address};
use super::{ExprCompiler, Result, subscript};
use crate::temporaries::Temporary;

pub fn compile_address(compiler: &mut ExprCompiler<'_>, expr: &Expr<'_>) -> Result<Temporary> {
    match expr {
        Expr::Identifier(ident) => {
            let (symbol, depth) = compiler
                .session
                .symbols
                .resolve_with_stack_frame_depth(ident.name, ident.span)?;
            let (storage, offset) = (symbol.storage, symbol.offset);
            match storage {
                Storage::Static => {
                    let address = static_address(offset)?;
                    let result = compiler.allocate(2, ident.span)?;
                    compiler.emitter.store_immediate16(result.address, address);
                    Ok(result)
                }
                Storage::Stack => frame_address(compiler, offset, depth, ident.span),
            }
        }
        Expr::Group(group) => compile_address(compiler, group.expr),
        Expr::Get(get) => member_address(compiler, get),
        Expr::Subscript(subscript) => subscript::compile_element_address(compiler, subscript),
        other => Err(CompilerError::internal(format!(
            "expression at {} has no address",
            other.span()
        ))),
    }
}

/// Address of `object.member`, through a pointer or into an addressable
/// struct.
fn member_address(compiler: &mut ExprCompiler<'_>, get: &GetExpr<'_>) -> Result<Temporary> {
    let object = compiler.check(get.object)?;
    let name = get.member.name;
    if let Some(pointee) = object.pointee() {
        let pointee = pointee.clone();
        let pointer = compiler.compile_value(get.object)?;
        if name != "pointee" {
            let offset = member_offset(&pointee, name)?;
            add_offset(compiler, pointer, offset);
        }
        return Ok(pointer);
    }
    let offset = member_offset(&object, name)?;
    let address = compile_address(compiler, get.object)?;
    add_offset(compiler, address, offset);
    Ok(address)
}

fn add_offset(compiler: &mut ExprCompiler<'_>, pointer: Temporary, offset: u16) {
    if offset != 0 {
        compiler
            .emitter
            .addi16(pointer.address, pointer.address, offset);
    }
}

/// Byte offset of `name` within struct type `ty`.
pub fn member_offset(ty: &SymbolType, name: &str) -> Result<u16> {
    let member = ty
        .as_struct()
        .and_then(|st| st.member(name))
        .ok_or_else(|| CompilerError::internal(format!("`{ty}' has no member `{name}'")))?;
    u16::try_from(member.offset)
        .map_err(|_| CompilerError::internal(format!("member `{name}' has a negative offset")))
}

/// Read `size` bytes from the storage `expr` names.
pub fn load(compiler: &mut ExprCompiler<'_>, expr: &Expr<'_>, size: usize) -> Result<Temporary> {
    let result = compiler.allocate(size, expr.span())?;
    let address = compile_address(compiler, expr)?;
    compiler
        .emitter
        .copy_words_indirect_source(result.address, address.address, size);
    compiler.release(address)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::IrEmitter;
    use crate::expr::test_support;
    use crate::ir::IrInstruction;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;

    #[test]
    fn static_address_is_immediate() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let mut emitter = IrEmitter::new();
        let address = ExprCompiler::new(&mut session, &mut emitter)
            .compile_address(&ast.ident("foo"))
            .unwrap();
        assert_eq!(address.size, 2);
        assert_eq!(
            emitter.finish(),
            vec![IrInstruction::StoreImmediate16 {
                dst: 0x0010,
                value: 0x011c
            }]
        );
    }

    #[test]
    fn struct_member_adds_offset() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let mut emitter = IrEmitter::new();
        ExprCompiler::new(&mut session, &mut emitter)
            .compile_address(&ast.get(ast.ident("foo"), "baz"))
            .unwrap();
        assert_eq!(
            emitter.finish(),
            vec![
                IrInstruction::StoreImmediate16 {
                    dst: 0x0010,
                    value: 0x011c
                },
                IrInstruction::Addi16 {
                    dst: 0x0010,
                    left: 0x0010,
                    imm: 2
                },
            ]
        );
    }

    #[test]
    fn member_through_pointer_loads_pointer_first() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, result) = test_support::compile(&mut session, &ast.get(ast.ident("p"), "baz"));
        assert_eq!(result.map(|t| t.size), Some(1));
        assert_eq!(
            ir,
            vec![
                IrInstruction::CopyWords {
                    dst: 0x0011,
                    src: 0x011f,
                    count: 2
                },
                IrInstruction::Addi16 {
                    dst: 0x0011,
                    left: 0x0011,
                    imm: 2
                },
                IrInstruction::CopyWordsIndirectSource {
                    dst: 0x0010,
                    src_ptr: 0x0011,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn call_has_no_address() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let mut emitter = IrEmitter::new();
        let err = ExprCompiler::new(&mut session, &mut emitter)
            .compile_address(&ast.call_named("hlt", &[]))
            .unwrap_err();
        assert!(matches!(err, CompilerError::Internal { .. }));
    }
}
