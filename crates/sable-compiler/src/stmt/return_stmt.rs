//! `return`.

use sable_ast::ReturnStmt;
use sable_core::CompilerError;

use super::{Result, StmtCompiler};
use crate::type_checker::ConversionContext;

impl<'a> StmtCompiler<'a> {
    /// Store the value into the hidden return slot, then `leave; ret`.
    pub fn compile_return(&mut self, ret: &ReturnStmt<'_>) -> Result<()> {
        let function = self.function.clone().ok_or_else(|| {
            CompilerError::statement("return is invalid outside of a function", ret.span)
        })?;
        match ret.value {
            Some(_) if function.return_type.is_void() => {
                return Err(CompilerError::statement(
                    "unexpected non-void return value in void function",
                    ret.span,
                ));
            }
            None if !function.return_type.is_void() => {
                return Err(CompilerError::statement(
                    "non-void function should return a value",
                    ret.span,
                ));
            }
            None => {}
            Some(value) => {
                let ty = self.type_checker().check(value)?;
                self.type_checker().convert(
                    &function.return_type,
                    &ty,
                    false,
                    ConversionContext::Return,
                    value.span(),
                )?;
                let mut compiler = self.expr_compiler();
                let result = compiler.compile_converted(value, &function.return_type)?;
                compiler.store_to_frame(function.return_offset, result, ret.span)?;
                compiler.release(result)?;
            }
        }
        self.emitter.leave();
        self.emitter.ret();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::IrInstruction;
    use crate::stmt::test_support;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;

    #[test]
    fn value_goes_to_the_return_slot() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.function("f", &[], ast.u16_type(), &[ast.ret(Some(ast.int(1000)))])];
        let (session, ir) = test_support::compile(&program);
        assert_eq!(
            ir[4..ir.len() - 1],
            [
                IrInstruction::StoreImmediate16 {
                    dst: 0x0010,
                    value: 1000
                },
                IrInstruction::CopyWords {
                    dst: 0x0012,
                    src: 0x0002,
                    count: 2
                },
                IrInstruction::Addi16 {
                    dst: 0x0012,
                    left: 0x0012,
                    imm: 4
                },
                IrInstruction::CopyWordsIndirectDestination {
                    dst_ptr: 0x0012,
                    src: 0x0010,
                    count: 2
                },
                IrInstruction::Leave,
                IrInstruction::Ret,
            ]
        );
        assert!(session.temporaries.is_empty());
    }

    #[test]
    fn return_outside_function() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        assert_eq!(
            test_support::compile_err(&[ast.ret(None)]),
            "return is invalid outside of a function"
        );
    }

    #[test]
    fn value_in_void_function() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.function("f", &[], ast.void_type(), &[ast.ret(Some(ast.int(1)))])];
        assert_eq!(
            test_support::compile_err(&program),
            "unexpected non-void return value in void function"
        );
    }

    #[test]
    fn missing_value() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.function("f", &[], ast.u8_type(), &[ast.ret(None)])];
        assert_eq!(
            test_support::compile_err(&program),
            "non-void function should return a value"
        );
    }

    #[test]
    fn value_must_convert() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = [ast.function(
            "f",
            &[("flag", ast.bool_type())],
            ast.u8_type(),
            &[ast.ret(Some(ast.ident("flag")))],
        )];
        assert_eq!(
            test_support::compile_err(&program),
            "cannot convert return expression of type `bool' to return type `u8'"
        );
    }
}
