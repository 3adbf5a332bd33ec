//! Subscripts: `array[index]` and `array[begin..limit]`.

use sable_ast::SubscriptExpr;
use sable_core::{CompilerError, SymbolType};

use super::{Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    pub fn check_subscript(&self, subscript: &SubscriptExpr<'_>) -> Result<SymbolType> {
        let object = self.check(subscript.object)?;
        let element = object.element_type().ok_or_else(|| {
            CompilerError::type_error(
                format!("value of type `{object}' has no subscripts"),
                subscript.span,
            )
        })?;
        let index = self.check(subscript.index)?;
        if index.is_arithmetic() {
            Ok(element)
        } else if index.is_range() {
            Ok(SymbolType::dynamic_array(element))
        } else {
            Err(CompilerError::type_error(
                format!(
                    "cannot subscript a value of type `{object}' with an argument of type `{index}'"
                ),
                subscript.span,
            ))
        }
    }

    /// Elements of slices are always addressable; elements of fixed arrays
    /// only when the array is.
    pub(super) fn check_subscript_lvalue(
        &self,
        subscript: &SubscriptExpr<'_>,
    ) -> Result<Option<SymbolType>> {
        let ty = self.check_subscript(subscript)?;
        if self.check(subscript.index)?.is_range() {
            return Ok(None);
        }
        let object = self.check(subscript.object)?;
        match object.unqualified() {
            SymbolType::DynamicArray(_) => Ok(Some(ty)),
            _ if self.check_lvalue(subscript.object)?.is_some() => Ok(Some(ty)),
            _ => Ok(None),
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
    fn element_type() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        assert_eq!(
            checker
                .check(&ast.subscript(ast.ident("arr"), ast.ident("a")))
                .unwrap(),
            SymbolType::U8
        );
        assert_eq!(
            checker
                .check(&ast.subscript(ast.ident("slice"), ast.int(0)))
                .unwrap(),
            SymbolType::U16
        );
    }

    #[test]
    fn range_yields_slice() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        let expr = ast.subscript(ast.ident("arr"), ast.range(ast.int(0), ast.int(2)));
        assert_eq!(checker.check(&expr).unwrap().to_string(), "[]u8");
        assert_eq!(checker.check_lvalue(&expr).unwrap(), None);
    }

    #[test]
    fn bad_argument() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut symbols = test_support::symbols();
        symbols.bind(
            "bools",
            sable_core::Symbol::static_at(SymbolType::array(Some(3), SymbolType::Bool), 0x200),
        );
        let checker = TypeChecker::new(&symbols);
        let err = checker
            .check(&ast.subscript(ast.ident("bools"), ast.boolean(true)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot subscript a value of type `[3]bool' with an argument of type `boolean constant true'"
        );
    }

    #[test]
    fn not_subscriptable() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let symbols = test_support::symbols();
        let checker = TypeChecker::new(&symbols);
        let err = checker
            .check(&ast.subscript(ast.ident("a"), ast.int(0)))
            .unwrap_err();
        assert_eq!(err.to_string(), "value of type `u8' has no subscripts");
    }
}
