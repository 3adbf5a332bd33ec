//! Negation and address-of.

use sable_ast::{Expr, UnaryExpr, UnaryOp};
use sable_core::{CompilerError, SymbolType};

use super::{ExprCompiler, Result, width_of};
use crate::ir::ArithOp;
use crate::temporaries::Temporary;

pub fn compile_unary(
    compiler: &mut ExprCompiler<'_>,
    unary: &UnaryExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    match unary.op {
        UnaryOp::Neg => {
            let width = width_of(ty)?;
            let result = compiler.allocate(width.bytes(), unary.span)?;
            let zero = compiler.allocate(width.bytes(), unary.span)?;
            match width.bytes() {
                1 => compiler.emitter.store_immediate(zero.address, 0),
                _ => compiler.emitter.store_immediate16(zero.address, 0),
            }
            let operand = compiler.compile_converted(unary.operand, ty)?;
            compiler.emitter.arith(
                ArithOp::Sub,
                width,
                result.address,
                zero.address,
                operand.address,
            );
            compiler.release(operand)?;
            compiler.release(zero)?;
            Ok(result)
        }
        UnaryOp::AddressOf => compile_address_of(compiler, unary),
        op => Err(CompilerError::internal(format!(
            "`{op}' is not a prefix unary operator"
        ))),
    }
}

fn compile_address_of(compiler: &mut ExprCompiler<'_>, unary: &UnaryExpr<'_>) -> Result<Temporary> {
    if let Expr::Identifier(ident) = unary.operand {
        let symbol = compiler.session.symbols.resolve(ident.name, ident.span)?;
        if let Some(function) = symbol.ty.as_function() {
            let label = function
                .label
                .clone()
                .unwrap_or_else(|| ident.name.to_string());
            let result = compiler.allocate(2, unary.span)?;
            compiler.emitter.copy_label(result.address, label);
            return Ok(result);
        }
    }
    compiler.compile_address(unary.operand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::test_support;
    use crate::ir::{IrInstruction, Width};
    use bumpalo::Bump;
    use sable_ast::AstBuilder;

    #[test]
    fn negation_subtracts_from_zero() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, _) = test_support::compile(&mut session, &ast.neg(ast.ident("a")));
        assert_eq!(
            ir,
            vec![
                IrInstruction::StoreImmediate {
                    dst: 0x0011,
                    value: 0
                },
                IrInstruction::CopyWords {
                    dst: 0x0012,
                    src: 0x0110,
                    count: 1
                },
                IrInstruction::Arith {
                    op: ArithOp::Sub,
                    width: Width::Byte,
                    dst: 0x0010,
                    left: 0x0011,
                    right: 0x0012,
                },
            ]
        );
    }

    #[test]
    fn address_of_function_is_its_label() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, _) = test_support::compile(&mut session, &ast.address_of(ast.ident("f")));
        assert_eq!(
            ir,
            vec![IrInstruction::CopyLabel {
                dst: 0x0010,
                label: "f".to_string()
            }]
        );
    }

    #[test]
    fn address_of_variable() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, _) = test_support::compile(&mut session, &ast.address_of(ast.ident("b")));
        assert_eq!(
            ir,
            vec![IrInstruction::StoreImmediate16 {
                dst: 0x0010,
                value: 0x0111
            }]
        );
    }
}
