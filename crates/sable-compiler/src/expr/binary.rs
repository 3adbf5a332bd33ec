//! Binary operators.
//!
//! Both operands are converted to the operation type before the operator
//! runs. `&&` and `||` short-circuit:
//!
//! ```text
//!     result = left
//!     jz/jnz end, result
//!     result = right
//! end:
//! ```

use sable_ast::{BinaryExpr, BinaryOp};
use sable_core::{CompilerError, SymbolType};

use super::{ExprCompiler, Result, width_of};
use crate::ir::ArithOp;
use crate::temporaries::Temporary;

pub fn compile_binary(
    compiler: &mut ExprCompiler<'_>,
    binary: &BinaryExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    if binary.op.is_logical() {
        return compile_logical(compiler, binary);
    }

    let left = compiler.check(binary.left)?;
    let right = compiler.check(binary.right)?;
    let operation = if left.is_boolean() && right.is_boolean() {
        SymbolType::Bool
    } else {
        compiler
            .type_checker()
            .operation_type(binary, &left, &right)?
    };
    let width = width_of(&operation)?;
    let op = arith_op(binary.op)?;
    log::trace!("binary `{}' at {operation} yielding {ty}", binary.op);

    let size = if op.is_comparison() { 1 } else { width.bytes() };
    let result = compiler.allocate(size, binary.span)?;
    let left = compiler.compile_converted(binary.left, &operation)?;
    let right = compiler.compile_converted(binary.right, &operation)?;
    compiler
        .emitter
        .arith(op, width, result.address, left.address, right.address);
    compiler.release(right)?;
    compiler.release(left)?;
    Ok(result)
}

fn compile_logical(compiler: &mut ExprCompiler<'_>, binary: &BinaryExpr<'_>) -> Result<Temporary> {
    let result = compiler.allocate(1, binary.span)?;
    let end = compiler.session.next_label();

    let left = compiler.compile_converted(binary.left, &SymbolType::Bool)?;
    compiler.emitter.copy_words(result.address, left.address, 1);
    compiler.release(left)?;
    match binary.op {
        BinaryOp::And => compiler.emitter.jz(end.clone(), result.address),
        _ => compiler.emitter.jnz(end.clone(), result.address),
    }

    let right = compiler.compile_converted(binary.right, &SymbolType::Bool)?;
    compiler.emitter.copy_words(result.address, right.address, 1);
    compiler.release(right)?;
    compiler.emitter.label(end);
    Ok(result)
}

fn arith_op(op: BinaryOp) -> Result<ArithOp> {
    Ok(match op {
        BinaryOp::Add => ArithOp::Add,
        BinaryOp::Sub => ArithOp::Sub,
        BinaryOp::Mul => ArithOp::Mul,
        BinaryOp::Div => ArithOp::Div,
        BinaryOp::Mod => ArithOp::Mod,
        BinaryOp::Eq => ArithOp::Eq,
        BinaryOp::Ne => ArithOp::Ne,
        BinaryOp::Lt => ArithOp::Lt,
        BinaryOp::Gt => ArithOp::Gt,
        BinaryOp::Le => ArithOp::Le,
        BinaryOp::Ge => ArithOp::Ge,
        BinaryOp::And | BinaryOp::Or => {
            return Err(CompilerError::internal(format!(
                "`{op}' has no arithmetic form"
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::test_support;
    use crate::ir::{IrInstruction, Width};
    use bumpalo::Bump;
    use sable_ast::AstBuilder;

    #[test]
    fn mixed_widths_run_at_u16() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.binary(BinaryOp::Add, ast.ident("a"), ast.ident("b"));
        let (ir, result) = test_support::compile(&mut session, &expr);
        assert_eq!(result.map(|t| t.size), Some(2));
        assert_eq!(
            ir.last(),
            Some(&IrInstruction::Arith {
                op: ArithOp::Add,
                width: Width::Word,
                dst: 0x0010,
                left: 0x0012,
                right: 0x0014,
            })
        );
        assert!(ir.contains(&IrInstruction::CopyWordZeroExtend {
            dst: 0x0013,
            src: 0x0012
        }));
    }

    #[test]
    fn comparison_yields_a_byte() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.binary(BinaryOp::Lt, ast.ident("b"), ast.int(1000));
        let (ir, result) = test_support::compile(&mut session, &expr);
        assert_eq!(result.map(|t| t.size), Some(1));
        assert_eq!(
            ir,
            vec![
                IrInstruction::CopyWords {
                    dst: 0x0011,
                    src: 0x0111,
                    count: 2
                },
                IrInstruction::StoreImmediate16 {
                    dst: 0x0013,
                    value: 1000
                },
                IrInstruction::Arith {
                    op: ArithOp::Lt,
                    width: Width::Word,
                    dst: 0x0010,
                    left: 0x0011,
                    right: 0x0013,
                },
            ]
        );
    }

    #[test]
    fn and_short_circuits() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.binary(BinaryOp::And, ast.ident("flag"), ast.boolean(false));
        let (ir, _) = test_support::compile(&mut session, &expr);
        assert_eq!(
            ir,
            vec![
                IrInstruction::CopyWords {
                    dst: 0x0011,
                    src: 0x0113,
                    count: 1
                },
                IrInstruction::CopyWords {
                    dst: 0x0010,
                    src: 0x0011,
                    count: 1
                },
                IrInstruction::Jz {
                    label: ".L0".to_string(),
                    test: 0x0010
                },
                IrInstruction::StoreImmediate {
                    dst: 0x0011,
                    value: 0
                },
                IrInstruction::CopyWords {
                    dst: 0x0010,
                    src: 0x0011,
                    count: 1
                },
                IrInstruction::Label(".L0".to_string()),
            ]
        );
    }
}
