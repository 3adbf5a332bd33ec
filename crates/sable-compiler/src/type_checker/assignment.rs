//! Assignment.

use sable_ast::{AssignmentExpr, AssignmentKind};
use sable_core::{CompilerError, SymbolType};

use super::{ConversionContext, Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    /// Type an assignment. The result is the (unqualified) type of the
    /// target.
    ///
    /// Initial assignments, the initializers of declarations, may write to
    /// constants.
    pub fn check_assignment(&self, assignment: &AssignmentExpr<'_>) -> Result<SymbolType> {
        let span = assignment.span;
        let target = self
            .check_lvalue(assignment.target)?
            .ok_or_else(|| CompilerError::type_error("lvalue required in assignment", span))?;

        if assignment.kind == AssignmentKind::Plain {
            let ident = assignment.target.as_identifier();
            if target.is_const() {
                let message = match ident {
                    Some(ident) => {
                        format!("cannot assign to constant `{}' of type `{target}'", ident.name)
                    }
                    None => format!("cannot assign to expression of type `{target}'"),
                };
                return Err(CompilerError::type_error(message, span));
            }
            if let Some(ident) = ident {
                let symbol = self.symbols.resolve(ident.name, ident.span)?;
                if !symbol.is_mutable {
                    return Err(CompilerError::type_error(
                        format!("cannot assign to immutable variable `{}'", ident.name),
                        span,
                    ));
                }
            }
        }

        let value = self.check(assignment.value)?;
        let target = target.into_unqualified();
        self.convert(&target, &value, false, ConversionContext::Assignment, span)?;
        Ok(target)
    }
}
