//! Function calls.
//!
//! The caller owns everything on the program stack around the call:
//!
//! ```text
//!     [save live temporaries]     SP -= used; [SP] = temporaries
//!     SP -= sizeof(return)        return slot
//!     push each argument          first argument deepest
//!     jalr f | indirect_jalr p
//!     SP += sizeof(arguments)
//!     result = [SP]; SP += sizeof(return)
//!     [restore temporaries]       temporaries = [SP]; SP += used
//! ```
//!
//! The callee clobbers the temporary window, so anything live in it is
//! saved as one block before the call and restored after.

use sable_ast::CallExpr;
use sable_core::{CompilerError, SymbolType};

use super::{ExprCompiler, Result, immediate, intrinsics};
use crate::temporaries::Temporary;

#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_call(compiler: &mut ExprCompiler<'_>, call: &CallExpr<'_>) -> Result<Option<Temporary>> {
    let (function, name) = compiler.type_checker().callee(call)?;
    if let Some(intrinsic) = function.intrinsic {
        return intrinsics::compile_intrinsic(compiler, intrinsic, call);
    }
    log::debug!("call to `{name}' with {} arguments", call.arguments.len());

    let sp = compiler.stack_pointer();
    let saved = compiler.session.temporaries.used();
    let saved_size = immediate(saved)?;
    let window = compiler.session.options.temporaries_start;
    if saved > 0 {
        compiler.emitter.subi16(sp, sp, saved_size);
        compiler
            .emitter
            .copy_words_indirect_destination(sp, window, saved);
    }

    let return_size = function.return_type.size();
    if return_size > 0 {
        compiler.emitter.subi16(sp, sp, immediate(return_size)?);
    }

    for (argument, ty) in call.arguments.iter().zip(&function.arguments) {
        let value = compiler.compile_converted(argument, ty)?;
        compiler.push_temporary(value)?;
        compiler.release(value)?;
    }

    let callee = compiler.check(call.callee)?;
    if matches!(callee.unqualified(), SymbolType::Function(_)) {
        let label = function.label.clone().ok_or_else(|| {
            CompilerError::internal(format!("function `{name}' has no code label"))
        })?;
        compiler.emitter.jalr(label);
    } else {
        let pointer = compiler.compile_value(call.callee)?;
        compiler.emitter.indirect_jalr(pointer.address);
        compiler.release(pointer)?;
    }

    let arguments_size = function.arguments_size();
    if arguments_size > 0 {
        compiler.emitter.addi16(sp, sp, immediate(arguments_size)?);
    }

    let result = if return_size > 0 {
        let result = compiler.allocate(return_size, call.span)?;
        compiler
            .emitter
            .copy_words_indirect_source(result.address, sp, return_size);
        compiler.emitter.addi16(sp, sp, immediate(return_size)?);
        Some(result)
    } else {
        None
    };

    if saved > 0 {
        compiler
            .emitter
            .copy_words_indirect_source(window, sp, saved);
        compiler.emitter.addi16(sp, sp, saved_size);
    }
    Ok(result)
}
