//! Constants, array literals and struct initializers.

use sable_ast::{LiteralArrayExpr, StructInitializerExpr};
use sable_core::{CompilerError, Span, SymbolType};

use super::{ExprCompiler, Result};
use crate::emit::IrEmitter;
use crate::ir::Address;
use crate::temporaries::Temporary;

/// Materialize a compile-time value in the narrowest type that holds it.
pub fn compile_constant(
    compiler: &mut ExprCompiler<'_>,
    value: &SymbolType,
    span: Span,
) -> Result<Temporary> {
    store_constant(compiler, value, value, span)
}

/// Materialize a compile-time value as a `target`.
///
/// `u8` and `u16` targets fix the width; anything else lets the value pick
/// its own.
pub fn store_constant(
    compiler: &mut ExprCompiler<'_>,
    value: &SymbolType,
    target: &SymbolType,
    span: Span,
) -> Result<Temporary> {
    match value {
        SymbolType::CompTimeBool(value) => {
            let result = compiler.allocate(1, span)?;
            compiler
                .emitter
                .store_immediate(result.address, u8::from(*value));
            Ok(result)
        }
        SymbolType::CompTimeInt(value) => {
            let value = *value;
            let class = match target.unqualified() {
                SymbolType::U8 => SymbolType::U8,
                SymbolType::U16 => SymbolType::U16,
                _ => SymbolType::CompTimeInt(value)
                    .arithmetic_class()
                    .unwrap_or(SymbolType::U16),
            };
            let overflow = || CompilerError::LiteralOverflow {
                value,
                target: class.to_string(),
                span,
            };
            if class == SymbolType::U8 {
                let byte = u8::try_from(value).map_err(|_| overflow())?;
                let result = compiler.allocate(1, span)?;
                compiler.emitter.store_immediate(result.address, byte);
                Ok(result)
            } else {
                let word = u16::try_from(value).map_err(|_| overflow())?;
                let result = compiler.allocate(2, span)?;
                compiler.emitter.store_immediate16(result.address, word);
                Ok(result)
            }
        }
        other => Err(CompilerError::internal(format!(
            "`{other}' is not a compile-time constant"
        ))),
    }
}

pub fn compile_literal_array(
    compiler: &mut ExprCompiler<'_>,
    literal: &LiteralArrayExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    let element = ty
        .element_type()
        .ok_or_else(|| CompilerError::internal(format!("`{ty}' is not an array")))?;
    let element_size = element.size();
    let result = compiler.allocate(ty.size(), literal.span)?;
    for (index, item) in literal.elements.iter().enumerate() {
        let value = compiler.compile_converted(item, &element)?;
        compiler
            .emitter
            .copy_words(result.at(index * element_size), value.address, element_size);
        compiler.release(value)?;
    }
    Ok(result)
}

/// Members without an initializer are zero.
pub fn compile_struct_initializer(
    compiler: &mut ExprCompiler<'_>,
    init: &StructInitializerExpr<'_>,
    ty: &SymbolType,
) -> Result<Temporary> {
    let struct_type = ty
        .as_struct()
        .cloned()
        .ok_or_else(|| CompilerError::internal(format!("`{ty}' is not a struct")))?;
    let result = compiler.allocate(ty.size(), init.span)?;

    for (name, member) in struct_type.members_in_order() {
        if !init.fields.iter().any(|field| field.name.name == name) {
            let offset = usize::try_from(member.offset).unwrap_or_default();
            zero_fill(compiler.emitter, result.at(offset), member.ty.size());
        }
    }

    for field in init.fields {
        let member = struct_type.member(field.name.name).ok_or_else(|| {
            CompilerError::internal(format!("`{ty}' has no member `{}'", field.name.name))
        })?;
        let offset = usize::try_from(member.offset).unwrap_or_default();
        let size = member.ty.size();
        let value = compiler.compile_converted(field.value, &member.ty)?;
        compiler
            .emitter
            .copy_words(result.at(offset), value.address, size);
        compiler.release(value)?;
    }
    Ok(result)
}

fn zero_fill(emitter: &mut IrEmitter, address: Address, size: usize) {
    let mut offset = 0;
    while offset + 2 <= size {
        emitter.store_immediate16(address.wrapping_add(offset as u16), 0);
        offset += 2;
    }
    if offset < size {
        emitter.store_immediate(address.wrapping_add(offset as u16), 0);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::expr::test_support;
    use crate::ir::IrInstruction;
    use bumpalo::Bump;
    use sable_ast::AstBuilder;
    use sable_core::StructType;

    #[test]
    fn literal_widths() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let (ir, _) = test_support::compile(&mut session, &ast.int(255));
        assert_eq!(
            ir,
            vec![IrInstruction::StoreImmediate {
                dst: 0x0010,
                value: 255
            }]
        );
        let mut session = test_support::session();
        let (ir, _) = test_support::compile(&mut session, &ast.boolean(true));
        assert_eq!(
            ir,
            vec![IrInstruction::StoreImmediate {
                dst: 0x0010,
                value: 1
            }]
        );
    }

    #[test]
    fn literal_overflow() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let mut emitter = IrEmitter::new();
        let err = ExprCompiler::new(&mut session, &mut emitter)
            .compile(&ast.int(70000))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "integer literal `70000' overflows when stored into `u16'"
        );
    }

    #[test]
    fn struct_members_at_their_offsets() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let mut foo = StructType::new("Triple");
        foo.push_member("bar", SymbolType::U16);
        foo.push_member("baz", SymbolType::U16);
        foo.push_member("qux", SymbolType::U16);
        session
            .symbols
            .bind_type("Triple", SymbolType::Struct(Rc::new(foo)));
        let expr = ast.struct_init(
            "Triple",
            &[
                ("bar", ast.int(0xabab)),
                ("baz", ast.int(0xcdcd)),
                ("qux", ast.int(0xefef)),
            ],
        );
        let (ir, result) = test_support::compile(&mut session, &expr);
        assert_eq!(result.map(|t| t.size), Some(6));
        let stores: Vec<_> = ir
            .iter()
            .filter(|ins| matches!(ins, IrInstruction::CopyWords { .. }))
            .cloned()
            .collect();
        assert_eq!(
            stores,
            vec![
                IrInstruction::CopyWords {
                    dst: 0x0010,
                    src: 0x0016,
                    count: 2
                },
                IrInstruction::CopyWords {
                    dst: 0x0012,
                    src: 0x0016,
                    count: 2
                },
                IrInstruction::CopyWords {
                    dst: 0x0014,
                    src: 0x0016,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn unspecified_members_are_zeroed() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.struct_init("Foo", &[("bar", ast.int(7))]);
        let (ir, _) = test_support::compile(&mut session, &expr);
        assert_eq!(
            ir[0],
            IrInstruction::StoreImmediate {
                dst: 0x0012,
                value: 0
            }
        );
    }

    #[test]
    fn array_literal_elements_are_converted() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let mut session = test_support::session();
        let expr = ast.array_literal(None, Some(ast.u16_type()), &[ast.ident("a"), ast.int(2)]);
        let (ir, result) = test_support::compile(&mut session, &expr);
        assert_eq!(result.map(|t| t.size), Some(4));
        assert!(ir.contains(&IrInstruction::CopyWordZeroExtend {
            dst: 0x0015,
            src: 0x0014
        }));
        assert!(session.temporaries.live().len() == 1);
    }
}
