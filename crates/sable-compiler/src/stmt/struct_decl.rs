//! Struct declarations.

use std::rc::Rc;

use sable_ast::StructDecl;
use sable_core::{CompilerError, StructType, SymbolType};

use super::{Result, StmtCompiler};

impl<'a> StmtCompiler<'a> {
    /// Bind a struct type. Members are laid out in declaration order.
    pub fn compile_struct(&mut self, decl: &StructDecl<'_>) -> Result<()> {
        let name = decl.name.name;
        if self.session.symbols.exists_and_cannot_be_shadowed(name) {
            return Err(CompilerError::Redefinition {
                kind: "struct declaration",
                name: name.to_string(),
                span: decl.name.span,
            });
        }
        let mut ty = StructType::new(name);
        for member in decl.members {
            if ty.member(member.name.name).is_some() {
                return Err(CompilerError::Redefinition {
                    kind: "member",
                    name: member.name.name.to_string(),
                    span: member.name.span,
                });
            }
            let member_ty = self.type_checker().resolve_type_expr(&member.ty)?;
            ty.push_member(member.name.name, member_ty);
        }
        log::debug!("declared struct `{name}' of {} bytes", ty.size());
        self.session
            .symbols
            .bind_type(name, SymbolType::Struct(Rc::new(ty)));
        Ok(())
    }
}
