//! Built-in functions. They compile inline, without a frame.

use sable_ast::CallExpr;
use sable_core::{CompilerError, Intrinsic, SymbolType};

use super::{ExprCompiler, Result};
use crate::temporaries::Temporary;

pub fn compile_intrinsic(
    compiler: &mut ExprCompiler<'_>,
    intrinsic: Intrinsic,
    call: &CallExpr<'_>,
) -> Result<Option<Temporary>> {
    let argument = |index: usize| {
        call.arguments.get(index).ok_or_else(|| {
            CompilerError::internal(format!("missing argument {index} to `{}'", intrinsic.name()))
        })
    };
    match intrinsic {
        Intrinsic::PeekMemory | Intrinsic::PeekPeripheral => {
            let result = compiler.allocate(1, call.span)?;
            let address = compiler.compile_converted(argument(0)?, &SymbolType::U16)?;
            if intrinsic == Intrinsic::PeekMemory {
                compiler
                    .emitter
                    .copy_words_indirect_source(result.address, address.address, 1);
            } else {
                compiler
                    .emitter
                    .peek_peripheral(result.address, address.address);
            }
            compiler.release(address)?;
            Ok(Some(result))
        }
        Intrinsic::PokeMemory | Intrinsic::PokePeripheral => {
            let value = compiler.compile_converted(argument(0)?, &SymbolType::U8)?;
            let address = compiler.compile_converted(argument(1)?, &SymbolType::U16)?;
            if intrinsic == Intrinsic::PokeMemory {
                compiler
                    .emitter
                    .copy_words_indirect_destination(address.address, value.address, 1);
            } else {
                compiler
                    .emitter
                    .poke_peripheral(value.address, address.address);
            }
            compiler.release(address)?;
            compiler.release(value)?;
            Ok(None)
        }
        Intrinsic::Hlt => {
            compiler.emitter.hlt();
            Ok(None)
        }
    }
}
