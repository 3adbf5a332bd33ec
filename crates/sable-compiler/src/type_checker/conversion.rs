//! Implicit and explicit conversions.
//!
//! One rule set serves assignment, arguments, initializers, returns and
//! casts. Only the wording of the failure differs between them, which is
//! what [`ConversionContext`] selects.

use sable_core::{CompilerError, Span, SymbolType, UnionType};

use super::{Result, TypeChecker};

/// Where a conversion happens. Picks the error message.
#[derive(Debug, Clone, Copy)]
pub enum ConversionContext<'c> {
    Assignment,
    Cast,
    Argument { function: &'c str },
    ArrayElement { array: &'c SymbolType },
    StructMember { member: &'c str },
    Return,
    /// The test of an `if`, `while` or `for`.
    Condition,
}

enum Failure {
    Overflow { value: i64, target: SymbolType },
    FunctionType,
    UnionNeedsExplicit { union: SymbolType, member: SymbolType },
    Incompatible,
}

impl<'a> TypeChecker<'a> {
    /// Check that a value of type `source` converts to `target`.
    pub fn convert(
        &self,
        target: &SymbolType,
        source: &SymbolType,
        explicit: bool,
        context: ConversionContext<'_>,
        span: Span,
    ) -> Result<()> {
        let failure = match conversion(target, source, explicit) {
            Ok(()) => return Ok(()),
            Err(failure) => failure,
        };
        Err(match failure {
            Failure::Overflow { value, target } => CompilerError::ConstantOverflow {
                value,
                target: target.to_string(),
                span,
            },
            Failure::FunctionType => CompilerError::type_error(
                "inappropriate use of a function type (Try taking the function's address instead.)",
                span,
            ),
            Failure::UnionNeedsExplicit { union, member } => CompilerError::type_error(
                format!(
                    "cannot implicitly convert a union type `{union}' to `{member}'; use an explicit conversion instead"
                ),
                span,
            ),
            Failure::Incompatible => {
                CompilerError::type_error(incompatible_message(target, source, context), span)
            }
        })
    }
}

fn incompatible_message(
    target: &SymbolType,
    source: &SymbolType,
    context: ConversionContext<'_>,
) -> String {
    match context {
        ConversionContext::Assignment => {
            format!("cannot assign value of type `{source}' to type `{target}'")
        }
        ConversionContext::Cast => {
            format!("cannot convert value of type `{source}' to type `{target}'")
        }
        ConversionContext::Argument { function } => format!(
            "cannot convert value of type `{source}' to expected argument type `{target}' in call to `{function}'"
        ),
        ConversionContext::ArrayElement { array } => format!(
            "cannot convert value of type `{source}' to type `{target}' in `{array}' array literal"
        ),
        ConversionContext::StructMember { member } => format!(
            "cannot convert value of type `{source}' to expected argument type `{target}' in initialization of `{member}'"
        ),
        ConversionContext::Return => {
            format!("cannot convert return expression of type `{source}' to return type `{target}'")
        }
        ConversionContext::Condition => {
            format!("condition of type `{source}' cannot be used where `{target}' is expected")
        }
    }
}

fn conversion(target: &SymbolType, source: &SymbolType, explicit: bool) -> std::result::Result<(), Failure> {
    let dst = target.unqualified();
    let src = source.unqualified();

    if matches!(dst, SymbolType::Function(_)) || matches!(src, SymbolType::Function(_)) {
        return Err(Failure::FunctionType);
    }
    if dst == src && !dst.is_void() {
        return Ok(());
    }

    match (dst, src) {
        (SymbolType::U8 | SymbolType::U16, SymbolType::CompTimeInt(value)) => {
            let max = dst.max_value().unwrap_or_default();
            if (0..=max).contains(value) {
                Ok(())
            } else {
                Err(Failure::Overflow {
                    value: *value,
                    target: dst.clone(),
                })
            }
        }
        (SymbolType::U16, SymbolType::U8) => Ok(()),
        (SymbolType::U8, SymbolType::U16) if explicit => Ok(()),
        (SymbolType::Bool, SymbolType::CompTimeBool(_)) => Ok(()),
        (
            SymbolType::Array {
                count: dst_count,
                element: dst_element,
            },
            SymbolType::Array {
                count: src_count,
                element: src_element,
            },
        ) => {
            if dst_count.is_some() && dst_count != src_count {
                return Err(Failure::Incompatible);
            }
            conversion(dst_element, src_element, explicit).map_err(|_| Failure::Incompatible)
        }
        (SymbolType::DynamicArray(dst_element), SymbolType::Array { element, .. })
        | (SymbolType::DynamicArray(dst_element), SymbolType::DynamicArray(element))
        | (SymbolType::Pointer(dst_element), SymbolType::Pointer(element)) => {
            if dst_element.same_modulo_const(element) {
                Ok(())
            } else {
                Err(Failure::Incompatible)
            }
        }
        (SymbolType::Union(dst_union), SymbolType::Union(src_union)) => {
            if dst_union.members == src_union.members {
                Ok(())
            } else {
                Err(Failure::Incompatible)
            }
        }
        (SymbolType::Union(dst_union), _) => select_union_member(dst_union, src)
            .map(|_| ())
            .ok_or(Failure::Incompatible),
        (_, SymbolType::Union(src_union)) if src_union.tag_of(dst).is_some() => {
            if explicit {
                Ok(())
            } else {
                Err(Failure::UnionNeedsExplicit {
                    union: src.clone(),
                    member: dst.clone(),
                })
            }
        }
        _ => Err(Failure::Incompatible),
    }
}

/// Index of the union member a value of type `source` is stored as.
///
/// An exact member match wins; otherwise the first member the value converts
/// to implicitly.
pub fn select_union_member(union: &UnionType, source: &SymbolType) -> Option<usize> {
    let exact = source.materialized().unwrap_or_else(|| source.clone());
    union
        .members
        .iter()
        .position(|member| member.same_modulo_const(&exact))
        .or_else(|| {
            union
                .members
                .iter()
                .position(|member| conversion(member, source, false).is_ok())
        })
}
