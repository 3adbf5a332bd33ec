//! Function declarations.
//!
//! A function body is emitted inline where it is declared, with a jump
//! around it:
//!
//! ```text
//!     jmp tail
//! name:
//!     push_return_address
//!     enter
//!     [body]
//!     leave                   only when a void body can fall off its end
//!     ret
//! tail:
//! ```
//!
//! Nested functions are labelled `outer::inner`. A name that was already
//! used for a label in this program gets a `.n` suffix.

use std::rc::Rc;

use sable_ast::FunctionDecl;
use sable_core::{CompilerError, FunctionType, Symbol, SymbolType};

use super::{FunctionContext, Result, StmtCompiler};
use crate::return_checker::ReturnChecker;

/// Bytes between FP and the last argument: the saved FP and the return
/// address.
const FRAME_LINKAGE_SIZE: usize = 4;

impl<'a> StmtCompiler<'a> {
    /// Bind the function's symbol in the current scope.
    pub fn declare_function(&mut self, decl: &FunctionDecl<'_>) -> Result<Rc<FunctionType>> {
        let name = decl.name.name;
        let mangled = match self.session.symbols.enclosing_function() {
            Some(outer) => format!("{outer}::{name}"),
            None => name.to_string(),
        };
        let checker = self.type_checker();
        let return_type = checker.resolve_type_expr(&decl.return_type)?;
        let arguments = decl
            .params
            .iter()
            .map(|param| checker.resolve_type_expr(&param.ty))
            .collect::<Result<Vec<_>>>()?;

        let mut function = FunctionType::signature(return_type, arguments);
        function.name = Some(name.to_string());
        function.label = Some(self.session.function_label(&mangled));
        let function = Rc::new(function);
        let symbol = Symbol::static_at(SymbolType::Function(Rc::clone(&function)), 0)
            .with_mutable(false)
            .with_visibility(decl.visibility);
        self.session
            .symbols
            .declare(name, symbol, "function", decl.name.span)?;
        log::debug!("declared function `{name}' of type {function}");
        Ok(function)
    }

    /// The function type a pre-pass bound for `decl`.
    pub(super) fn declared_function(&self, decl: &FunctionDecl<'_>) -> Result<Rc<FunctionType>> {
        self.session
            .symbols
            .lookup(decl.name.name)
            .and_then(|symbol| symbol.ty.as_function())
            .cloned()
            .ok_or_else(|| {
                CompilerError::internal(format!("function `{}' was not declared", decl.name.name))
            })
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_function(&mut self, decl: &FunctionDecl<'_>, function: Rc<FunctionType>) -> Result<()> {
        let label = function.label.clone().ok_or_else(|| {
            CompilerError::internal(format!("function `{}' has no code label", decl.name.name))
        })?;
        log::debug!("compiling function `{label}'");
        let tail = self.session.next_label();
        self.emitter.jmp(tail.clone());
        self.emitter.label(label.clone());
        self.emitter.push_return_address();
        self.emitter.enter();
        self.session.symbols.push_function_scope(label);

        let mut offset = FRAME_LINKAGE_SIZE;
        for (param, ty) in decl.params.iter().zip(&function.arguments).rev() {
            let symbol = Symbol::on_stack(ty.clone(), -frame_offset(offset)?).with_mutable(false);
            self.session
                .symbols
                .declare(param.name.name, symbol, "parameter", param.name.span)?;
            offset += ty.size();
        }

        let outer = self.function.replace(FunctionContext {
            return_type: function.return_type.clone(),
            return_offset: -frame_offset(offset)?,
        });
        self.compile_statements(decl.body.stmts)?;
        let falls_through =
            ReturnChecker::new().check_function(&decl.body, &function.return_type, decl.name.span)?;
        if falls_through {
            self.emitter.leave();
            self.emitter.ret();
        }
        self.function = outer;
        self.session.symbols.pop_scope();
        self.emitter.label(tail);
        Ok(())
    }
}

fn frame_offset(offset: usize) -> Result<i32> {
    i32::try_from(offset)
        .map_err(|_| CompilerError::internal(format!("frame offset {offset} out of range")))
}
