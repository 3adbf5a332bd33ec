//! `var` and `let` declarations.

use sable_ast::{Expr, StorageQualifier, VarDeclStmt};
use sable_core::{CompilerError, Span, Symbol, SymbolType};

use super::{Result, StmtCompiler};
use crate::expr;
use crate::type_checker::ConversionContext;

impl<'a> StmtCompiler<'a> {
    /// Declare a variable or constant and store its initial value.
    ///
    /// The initializer is evaluated before the name is bound, so it cannot
    /// refer to the symbol it initializes. Storing it is an initial
    /// assignment and is allowed for constants.
    pub fn compile_var_decl(&mut self, decl: &VarDeclStmt<'_>) -> Result<()> {
        let kind = if decl.is_mutable { "variable" } else { "constant" };
        let name = decl.name.name;
        if self.session.symbols.exists_and_cannot_be_shadowed(name) {
            return Err(CompilerError::Redefinition {
                kind,
                name: name.to_string(),
                span: decl.name.span,
            });
        }
        if !decl.is_mutable && decl.init.is_none() && decl.explicit_type.is_some() {
            return Err(CompilerError::statement(
                "constants must be assigned a value",
                decl.span,
            ));
        }

        let init_ty = match decl.init {
            Some(init) => Some(self.type_checker().check(init)?),
            None => None,
        };
        let explicit = match &decl.explicit_type {
            Some(ty) => Some(self.type_checker().resolve_type_expr(ty)?),
            None => None,
        };
        let ty = match (explicit, &init_ty) {
            (Some(ty), Some(init_ty)) => with_inferred_count(ty, init_ty),
            (Some(ty), None) => Some(ty),
            (None, Some(init_ty)) => inferred(init_ty),
            (None, None) => None,
        };
        let ty = match ty {
            Some(ty) if !is_unsized_array(&ty) => ty,
            _ => {
                return Err(CompilerError::statement(
                    format!("unable to deduce type of {kind} `{name}'"),
                    decl.span,
                ));
            }
        };
        let ty = if decl.is_mutable { ty } else { ty.const_of() };

        let value = match (decl.init, &init_ty) {
            (Some(init), Some(init_ty)) => {
                self.type_checker().convert(
                    &ty,
                    init_ty,
                    false,
                    ConversionContext::Assignment,
                    init.span(),
                )?;
                Some(self.expr_compiler().compile_converted(init, &ty)?)
            }
            _ => None,
        };

        let size = ty.size();
        let symbol = if self.session.symbols.is_program_level() || decl.storage == StorageQualifier::Static {
            let address = self.session.allocate_static(size, decl.span)?;
            Symbol::static_at(ty, address)
        } else {
            self.session.symbols.bump_storage_pointer(size);
            let offset = self.session.symbols.storage_pointer();
            let (sp, fp) = (self.session.options.stack_pointer, self.session.options.frame_pointer);
            self.emitter.subi16(sp, fp, frame_immediate(offset, decl.span)?);
            Symbol::on_stack(ty, offset as i32)
        };
        log::trace!("declared {kind} `{name}' at {}", symbol.offset);
        self.session.symbols.declare(
            name,
            symbol
                .with_mutable(decl.is_mutable)
                .with_visibility(decl.visibility),
            kind,
            decl.name.span,
        )?;

        if let Some(value) = value {
            let mut compiler = self.expr_compiler();
            expr::store(&mut compiler, &Expr::Identifier(decl.name), value)?;
            compiler.release(value)?;
        }
        Ok(())
    }
}

/// Type of a declaration with no explicit type.
fn inferred(init: &SymbolType) -> Option<SymbolType> {
    match init {
        SymbolType::Void => None,
        SymbolType::CompTimeInt(value) if *value > i64::from(u8::MAX) => Some(SymbolType::U16),
        SymbolType::CompTimeInt(_) => Some(SymbolType::U8),
        SymbolType::CompTimeBool(_) => Some(SymbolType::Bool),
        other => Some(other.clone().into_unqualified()),
    }
}

/// `[_]T` takes its count from an array initializer.
fn with_inferred_count(ty: SymbolType, init: &SymbolType) -> Option<SymbolType> {
    if !is_unsized_array(&ty) {
        return Some(ty);
    }
    let count = init.array_count()?;
    let element = ty.element_type()?.into_unqualified();
    let array = SymbolType::array(Some(count), element);
    Some(if ty.is_const() { array.const_of() } else { array })
}

fn is_unsized_array(ty: &SymbolType) -> bool {
    matches!(ty.unqualified(), SymbolType::Array { count: None, .. })
}

fn frame_immediate(offset: usize, span: Span) -> Result<u16> {
    u16::try_from(offset).map_err(|_| {
        CompilerError::statement(format!("stack frame of {offset} bytes is too large"), span)
    })
}
