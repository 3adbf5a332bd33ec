//! Prefix operators. Only `-` and `&` produce values.

use sable_ast::{Expr, UnaryExpr, UnaryOp};
use sable_core::{CompilerError, SymbolType};

use super::{Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn check_unary(&self, unary: &UnaryExpr<'_>) -> Result<SymbolType> {
        match unary.op {
            UnaryOp::Neg => {
                let operand = self.check(unary.operand)?;
                match operand.unqualified() {
                    SymbolType::CompTimeInt(value) => Ok(SymbolType::CompTimeInt(-value)),
                    SymbolType::U8 | SymbolType::U16 => Ok(operand.unqualified().clone()),
                    _ => Err(CompilerError::type_error(
                        format!(
                            "Unary operator `{}' cannot be applied to an operand of type `{operand}'",
                            unary.op
                        ),
                        unary.span,
                    )),
                }
            }
            UnaryOp::AddressOf => self.check_address_of(unary),
            UnaryOp::Not | UnaryOp::Deref => Err(CompilerError::type_error(
                format!("`{}' is not a prefix unary operator", unary.op),
                unary.span,
            )),
        }
    }

    fn check_address_of(&self, unary: &UnaryExpr<'_>) -> Result<SymbolType> {
        if let Expr::Identifier(ident) = unary.operand {
            let symbol = self.symbols.resolve(ident.name, ident.span)?;
            if symbol.ty.as_function().is_some() {
                return Ok(SymbolType::pointer(symbol.ty.clone()));
            }
        }
        match self.check_lvalue(unary.operand)? {
            Some(ty) => Ok(SymbolType::pointer(ty)),
            None => Err(CompilerError::type_error(
                "lvalue required as operand of unary operator `&'",
                unary.span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_checker::test_support;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;

    #[test]
    fn negation() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        assert_eq!(
            checker.check(&ast.neg(ast.int(5))).unwrap(),
            SymbolType::CompTimeInt(-5)
        );
        assert_eq!(checker.check(&ast.neg(ast.ident("k"))).unwrap(), SymbolType::U8);
        let err = checker.check(&ast.neg(ast.ident("flag"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unary operator `-' cannot be applied to an operand of type `bool'"
        );
    }

    #[test]
    fn address_of() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        assert_eq!(
            checker.check(&ast.address_of(ast.ident("a"))).unwrap(),
            SymbolType::pointer(SymbolType::U8)
        );
        assert_eq!(
            checker.check(&ast.address_of(ast.ident("f"))).unwrap().to_string(),
            "*(u8, u16) -> bool"
        );
        let err = checker.check(&ast.address_of(ast.int(1))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "lvalue required as operand of unary operator `&'"
        );
    }

    #[test]
    fn other_prefix_operators() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        let err = checker
            .check(&ast.unary(UnaryOp::Not, ast.ident("flag")))
            .unwrap_err();
        assert_eq!(err.to_string(), "`!' is not a prefix unary operator");
    }
}
