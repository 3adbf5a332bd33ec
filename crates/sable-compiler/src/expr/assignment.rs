//! Assignment and stores.

use sable_ast::{AssignmentExpr, Expr};
use sable_core::{Storage, SymbolType};

use super::identifiers::static_address;
use super::{ExprCompiler, Result};
use crate::temporaries::Temporary;

/// The value of an assignment is the stored value.
pub fn compile_assignment(
    compiler: &mut ExprCompiler<'_>,
    assignment: &AssignmentExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    let value = compiler.compile_converted(assignment.value, ty)?;
    store(compiler, assignment.target, value)?;
    Ok(value)
}

/// Write `value` into the storage named by `target`. `value` stays live.
pub(crate) fn store(compiler: &mut ExprCompiler<'_>, target: &Expr<'_>, value: Temporary) -> Result<()> {
    if let Expr::Identifier(ident) = target {
        let symbol = compiler.session.symbols.resolve(ident.name, ident.span)?;
        if symbol.storage == Storage::Static {
            let address = static_address(symbol.offset)?;
            compiler
                .emitter
                .copy_words(address, value.address, value.size);
            return Ok(());
        }
    }
    let address = compiler.compile_address(target)?;
    compiler
        .emitter
        .copy_words_indirect_destination(address.address, value.address, value.size);
    compiler.release(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::test_support;
    use crate::ir::IrInstruction;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;
    use sable_core::Symbol;

    #[test]
    fn static_store_is_direct() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, result) = test_support::compile(&mut session, &ast.assign(ast.ident("b"), ast.ident("a")));
        assert_eq!(result.map(|t| t.size), Some(2));
        assert_eq!(
            ir.last(),
            Some(&IrInstruction::CopyWords {
                dst: 0x0111,
                src: 0x0010,
                count: 2
            })
        );
    }

    #[test]
    fn stack_store_goes_through_the_frame() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        session.symbols.push_function_scope("f");
        session
            .symbols
            .bind("x", Symbol::on_stack(SymbolType::U8, 1));
        let (ir, _) = test_support::compile(&mut session, &ast.assign(ast.ident("x"), ast.int(5)));
        assert_eq!(
            ir,
            vec![
                IrInstruction::StoreImmediate {
                    dst: 0x0010,
                    value: 5
                },
                IrInstruction::CopyWords {
                    dst: 0x0011,
                    src: 0x0002,
                    count: 2
                },
                IrInstruction::Subi16 {
                    dst: 0x0011,
                    left: 0x0011,
                    imm: 1
                },
                IrInstruction::CopyWordsIndirectDestination {
                    dst_ptr: 0x0011,
                    src: 0x0010,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn store_through_slice_element() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.assign(ast.subscript(ast.ident("slice"), ast.int(0)), ast.int(300));
        let (ir, _) = test_support::compile(&mut session, &expr);
        assert!(matches!(
            ir.last(),
            Some(IrInstruction::CopyWordsIndirectDestination { src: 0x0010, count: 2, .. })
        ));
        assert_eq!(session.temporaries.live().len(), 1);
    }
}
