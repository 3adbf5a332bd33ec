//! Binary operators.

use sable_ast::{BinaryExpr, BinaryOp};
use sable_core::{CompilerError, SymbolType};

use super::{Result, TypeChecker};

impl<'a> TypeChecker<'a> {
    /// Type a binary expression.
    ///
    /// Arithmetic over two compile-time integers folds to a compile-time
    /// integer, comparisons of them to a compile-time boolean. With a runtime
    /// operand the operation runs at the wider of the two integer classes.
    pub fn check_binary(&self, binary: &BinaryExpr<'_>) -> Result<SymbolType> {
        let right = self.check(binary.right)?;
        let left = self.check(binary.left)?;
        let op = binary.op;

        if left.is_arithmetic() && right.is_arithmetic() {
            if op.is_logical() {
                return Err(self.invalid_operands(binary, &left, &right));
            }
            if let (SymbolType::CompTimeInt(l), SymbolType::CompTimeInt(r)) = (&left, &right) {
                return fold_integers(binary, *l, *r);
            }
            let operation = self.operation_type(binary, &left, &right)?;
            return Ok(if op.is_comparison() {
                SymbolType::Bool
            } else {
                operation
            });
        }

        if left.is_boolean() && right.is_boolean() {
            if !(op.is_equality() || op.is_logical()) {
                return Err(self.invalid_operands(binary, &left, &right));
            }
            if let (SymbolType::CompTimeBool(l), SymbolType::CompTimeBool(r)) = (&left, &right) {
                let value = match op {
                    BinaryOp::Eq => l == r,
                    BinaryOp::Ne => l != r,
                    BinaryOp::And => *l && *r,
                    _ => *l || *r,
                };
                return Ok(SymbolType::CompTimeBool(value));
            }
            return Ok(SymbolType::Bool);
        }

        Err(self.invalid_operands(binary, &left, &right))
    }

    /// The concrete integer type a mixed binary operation runs at.
    pub fn operation_type(
        &self,
        binary: &BinaryExpr<'_>,
        left: &SymbolType,
        right: &SymbolType,
    ) -> Result<SymbolType> {
        let class = |ty: &SymbolType| {
            ty.arithmetic_class().ok_or_else(|| match ty {
                SymbolType::CompTimeInt(value) => CompilerError::ConstantOverflow {
                    value: *value,
                    target: SymbolType::U16.to_string(),
                    span: binary.span,
                },
                other => CompilerError::internal(format!("`{other}' has no integer class")),
            })
        };
        let right = class(right)?;
        let left = class(left)?;
        Ok(if left == SymbolType::U16 || right == SymbolType::U16 {
            SymbolType::U16
        } else {
            SymbolType::U8
        })
    }

    fn invalid_operands(
        &self,
        binary: &BinaryExpr<'_>,
        left: &SymbolType,
        right: &SymbolType,
    ) -> CompilerError {
        let op = binary.op;
        let message = if left == right {
            format!("binary operator `{op}' cannot be applied to two `{left}' operands")
        } else {
            format!(
                "binary operator `{op}' cannot be applied to operands of types `{left}' and `{right}'"
            )
        };
        CompilerError::type_error(message, binary.span)
    }
}

/// Fold an arithmetic or comparison operation over two compile-time
/// integers. Logical operators are rejected before this is reached.
fn fold_integers(binary: &BinaryExpr<'_>, left: i64, right: i64) -> Result<SymbolType> {
    let value = match binary.op {
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::Div | BinaryOp::Mod if right == 0 => {
            return Err(CompilerError::type_error("division by zero", binary.span));
        }
        BinaryOp::Div => left / right,
        BinaryOp::Mod => left % right,
        BinaryOp::Eq => return Ok(SymbolType::CompTimeBool(left == right)),
        BinaryOp::Ne => return Ok(SymbolType::CompTimeBool(left != right)),
        BinaryOp::Lt => return Ok(SymbolType::CompTimeBool(left < right)),
        BinaryOp::Gt => return Ok(SymbolType::CompTimeBool(left > right)),
        BinaryOp::Le => return Ok(SymbolType::CompTimeBool(left <= right)),
        BinaryOp::Ge => return Ok(SymbolType::CompTimeBool(left >= right)),
        BinaryOp::And | BinaryOp::Or => {
            return Err(CompilerError::internal("logical operator on integers"));
        }
    };
    Ok(SymbolType::CompTimeInt(value))
}
