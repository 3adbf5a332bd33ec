//! Function calls.

use std::rc::Rc;

use sable_ast::{CallExpr, Expr};
use sable_core::{CompilerError, FunctionType, SymbolType};

use super::{ConversionContext, Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn check_call(&self, call: &CallExpr<'_>) -> Result<SymbolType> {
        let (function, name) = self.callee(call)?;
        if call.arguments.len() != function.arguments.len() {
            return Err(CompilerError::type_error(
                format!("incorrect number of arguments in call to `{name}'"),
                call.span,
            ));
        }
        for (argument, expected) in call.arguments.iter().zip(&function.arguments) {
            let actual = self.check(argument)?;
            self.convert(
                expected,
                &actual,
                false,
                ConversionContext::Argument { function: &name },
                argument.span(),
            )?;
        }
        Ok(function.return_type.clone())
    }

    /// The function a call targets and the name diagnostics use for it.
    ///
    /// The callee is either a function or a pointer to one.
    pub fn callee(&self, call: &CallExpr<'_>) -> Result<(Rc<FunctionType>, String)> {
        let callee = self.check(call.callee)?;
        let function = callee
            .as_function()
            .or_else(|| callee.pointee().and_then(SymbolType::as_function))
            .cloned()
            .ok_or_else(|| {
                CompilerError::type_error(
                    format!("cannot call value of non-function type `{callee}'"),
                    call.span,
                )
            })?;
        let name = match call.callee {
            Expr::Identifier(ident) => ident.name.to_string(),
            _ => function.display_name(),
        };
        Ok((function, name))
    }
}
