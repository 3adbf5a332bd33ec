//! `as` casts and `is` tests.

use sable_ast::{AsExpr, IsExpr};
use sable_core::SymbolType;

use super::{ConversionContext, Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn check_as(&self, cast: &AsExpr<'_>) -> Result<SymbolType> {
        let target = self.resolve_type_expr(cast.target)?;
        let source = self.check(cast.expr)?;
        self.convert(&target, &source, true, ConversionContext::Cast, cast.span)?;
        Ok(target)
    }

    /// `expr is T`.
    ///
    /// Only a union can answer at runtime, and only for its own members.
    /// Everything else is known at compile time.
    pub fn check_is(&self, is: &IsExpr<'_>) -> Result<SymbolType> {
        let test = self.resolve_type_expr(is.test)?;
        let source = self.check(is.expr)?;
        if let Some(union) = source.as_union() {
            return Ok(match union.tag_of(&test) {
                Some(_) => SymbolType::Bool,
                None => SymbolType::CompTimeBool(false),
            });
        }
        let source = source.materialized().unwrap_or(source);
        Ok(SymbolType::CompTimeBool(source.same_modulo_const(&test)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_checker::test_support;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;
    use sable_core::Symbol;

    #[test]
    fn explicit_narrowing() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        let expr = ast.cast(ast.ident("b"), ast.u8_type());
        assert_eq!(checker.check(&expr).unwrap(), SymbolType::U8);
    }

    #[test]
    fn impossible_cast() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        let err = checker
            .check(&ast.cast(ast.ident("flag"), ast.u8_type()))
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot convert value of type `bool' to type `u8'");
    }

    #[test]
    fn is_on_union() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut symbols = test_support::symbols();
        symbols.bind(
            "u",
            Symbol::static_at(
                SymbolType::union_of(vec![SymbolType::U8, SymbolType::Bool]),
                0x0200,
            ),
        );
        let checker = TypeChecker::new(&symbols);
        assert_eq!(
            checker.check(&ast.is_type(ast.ident("u"), ast.bool_type())).unwrap(),
            SymbolType::Bool
        );
        assert_eq!(
            checker.check(&ast.is_type(ast.ident("u"), ast.u16_type())).unwrap(),
            SymbolType::CompTimeBool(false)
        );
    }

    #[test]
    fn is_on_plain_value() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        assert_eq!(
            checker.check(&ast.is_type(ast.ident("a"), ast.u8_type())).unwrap(),
            SymbolType::CompTimeBool(true)
        );
        assert_eq!(
            checker.check(&ast.is_type(ast.int(1), ast.bool_type())).unwrap(),
            SymbolType::CompTimeBool(false)
        );
    }
}
