//! Property tests over whole programs.


use proptest::prelude::*;
use sable::compiler::Backend;
use sable::prelude::*;
use test_harness::{STATICS, panicked, run_ok, slice_at};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn u8_arithmetic_wraps_like_native(a: u8, b: u8) {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let machine = run_ok(&[
            ast.var_decl("a", Some(ast.u8_type()), Some(ast.int(i64::from(a)))),
            ast.var_decl("b", Some(ast.u8_type()), Some(ast.int(i64::from(b)))),
            ast.var_decl("sum", None, Some(ast.binary(BinaryOp::Add, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("diff", None, Some(ast.binary(BinaryOp::Sub, ast.ident("a"), ast.ident("b")))),
        ]);
        prop_assert_eq!(machine.load(STATICS + 2), a.wrapping_add(b));
        prop_assert_eq!(machine.load(STATICS + 3), a.wrapping_sub(b));
    }

    #[test]
    fn u8_multiplicative_operators_match_native(a: u8, b: u8) {
        prop_assume!(b != 0);
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let machine = run_ok(&[
            ast.var_decl("a", Some(ast.u8_type()), Some(ast.int(i64::from(a)))),
            ast.var_decl("b", Some(ast.u8_type()), Some(ast.int(i64::from(b)))),
            ast.var_decl("p", None, Some(ast.binary(BinaryOp::Mul, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("q", None, Some(ast.binary(BinaryOp::Div, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("r", None, Some(ast.binary(BinaryOp::Mod, ast.ident("a"), ast.ident("b")))),
        ]);
        prop_assert!(!panicked(&machine));
        prop_assert_eq!(machine.load(STATICS + 2), a.wrapping_mul(b));
        prop_assert_eq!(machine.load(STATICS + 3), a / b);
        prop_assert_eq!(machine.load(STATICS + 4), a % b);
    }

    #[test]
    fn u16_multiplicative_operators_match_native(a: u16, b: u16) {
        prop_assume!(b != 0);
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let machine = run_ok(&[
            ast.var_decl("a", Some(ast.u16_type()), Some(ast.int(i64::from(a)))),
            ast.var_decl("b", Some(ast.u16_type()), Some(ast.int(i64::from(b)))),
            ast.var_decl("p", None, Some(ast.binary(BinaryOp::Mul, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("q", None, Some(ast.binary(BinaryOp::Div, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("r", None, Some(ast.binary(BinaryOp::Mod, ast.ident("a"), ast.ident("b")))),
        ]);
        prop_assert!(!panicked(&machine));
        prop_assert_eq!(machine.load16(STATICS + 4), a.wrapping_mul(b));
        prop_assert_eq!(machine.load16(STATICS + 6), a / b);
        prop_assert_eq!(machine.load16(STATICS + 8), a % b);
    }

    #[test]
    fn narrow_operand_is_zero_extended(a: u8, b: u16) {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let machine = run_ok(&[
            ast.var_decl("a", Some(ast.u8_type()), Some(ast.int(i64::from(a)))),
            ast.var_decl("b", Some(ast.u16_type()), Some(ast.int(i64::from(b)))),
            ast.var_decl("sum", None, Some(ast.binary(BinaryOp::Add, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("diff", None, Some(ast.binary(BinaryOp::Sub, ast.ident("a"), ast.ident("b")))),
        ]);
        prop_assert_eq!(machine.load16(STATICS + 3), u16::from(a).wrapping_add(b));
        prop_assert_eq!(machine.load16(STATICS + 5), u16::from(a).wrapping_sub(b));
    }

    #[test]
    fn equality_operators_are_complementary(a: u16, b: u16) {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let machine = run_ok(&[
            ast.var_decl("a", Some(ast.u16_type()), Some(ast.int(i64::from(a)))),
            ast.var_decl("b", Some(ast.u16_type()), Some(ast.int(i64::from(b)))),
            ast.var_decl("eq", None, Some(ast.binary(BinaryOp::Eq, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("ne", None, Some(ast.binary(BinaryOp::Ne, ast.ident("a"), ast.ident("b")))),
            ast.var_decl("lt", None, Some(ast.binary(BinaryOp::Lt, ast.ident("a"), ast.ident("b")))),
        ]);
        let (eq, ne, lt) = (machine.load(STATICS + 4), machine.load(STATICS + 5), machine.load(STATICS + 6));
        prop_assert_eq!(eq, u8::from(a == b));
        prop_assert_eq!(ne, u8::from(a != b));
        prop_assert_eq!(lt, u8::from(a < b));
    }

    #[test]
    fn constant_sums_fold_to_one_store(a in 0u16..=0x7fff, b in 0u16..=0x7fff) {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let ir = sable::compile_program(&[ast.expr_stmt(ast.binary(
            BinaryOp::Add,
            ast.int(i64::from(a)),
            ast.int(i64::from(b)),
        ))])
        .unwrap();
        let sum = a + b;
        let expected = match u8::try_from(sum) {
            Ok(value) => IrInstruction::StoreImmediate { dst: 0x0010, value },
            Err(_) => IrInstruction::StoreImmediate16 { dst: 0x0010, value: sum },
        };
        prop_assert_eq!(ir, vec![expected]);
    }

    #[test]
    fn range_subscripts_check_their_bounds(begin in 0u16..6, limit in 0u16..6) {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let machine = run_ok(&[
            ast.var_decl(
                "arr",
                None,
                Some(ast.array_literal(
                    Some(ast.int(4)),
                    Some(ast.u8_type()),
                    &[ast.int(1), ast.int(2), ast.int(3), ast.int(4)],
                )),
            ),
            ast.var_decl("begin", Some(ast.u16_type()), Some(ast.int(i64::from(begin)))),
            ast.var_decl("limit", Some(ast.u16_type()), Some(ast.int(i64::from(limit)))),
            ast.var_decl(
                "view",
                None,
                Some(ast.subscript(ast.ident("arr"), ast.range(ast.ident("begin"), ast.ident("limit")))),
            ),
        ]);
        if begin <= limit && limit <= 4 {
            prop_assert!(!panicked(&machine));
            prop_assert_eq!(slice_at(&machine, STATICS + 8), (STATICS + begin, limit - begin));
        } else {
            prop_assert!(panicked(&machine));
        }
    }

    #[test]
    fn pushes_stay_addressable(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        let ir: Vec<IrInstruction> = bytes.iter().copied().map(IrInstruction::Push).collect();
        let program = Backend::new(&CompilerOptions::default()).lower(&ir).unwrap();
        let mut machine = Machine::new(program).unwrap();
        machine.run().unwrap();
        let count = u16::try_from(bytes.len()).unwrap();
        prop_assert_eq!(machine.stack_pointer(), 0u16.wrapping_sub(count));
        for (index, byte) in bytes.iter().enumerate() {
            let depth = u16::try_from(index).unwrap() + 1;
            prop_assert_eq!(machine.load(0u16.wrapping_sub(depth)), *byte);
        }
    }
}
