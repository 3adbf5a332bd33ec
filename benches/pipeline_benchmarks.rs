//! Benchmarks for the compile pipeline.
//!
//! - Phases: IR generation, lowering, and a full compile-and-run
//! - Scaling: programs of growing statement counts
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sable::compiler::Backend;
use sable::prelude::*;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// `count` declarations, each reading the one before it.
fn chain<'a>(ast: &AstBuilder<'a>, count: usize) -> Vec<Stmt<'a>> {
    let names: Vec<String> = (0..count).map(|index| format!("v{index}")).collect();
    let mut program = vec![ast.var_decl(&names[0], Some(ast.u16_type()), Some(ast.int(1)))];
    for pair in names.windows(2) {
        program.push(ast.var_decl(
            &pair[1],
            None,
            Some(ast.binary(
                BinaryOp::Add,
                ast.binary(BinaryOp::Mul, ast.ident(&pair[0]), ast.int(3)),
                ast.int(7),
            )),
        ));
    }
    program
}

/// A recursive function and a loop calling it.
fn fibonacci<'a>(ast: &AstBuilder<'a>) -> Vec<Stmt<'a>> {
    let n = || ast.ident("n");
    vec![
        ast.function(
            "fib",
            &[("n", ast.u16_type())],
            ast.u16_type(),
            &[ast.if_stmt(
                ast.binary(BinaryOp::Lt, n(), ast.int(2)),
                ast.block(&[ast.ret(Some(n()))]),
                Some(ast.block(&[ast.ret(Some(ast.binary(
                    BinaryOp::Add,
                    ast.call_named("fib", &[ast.binary(BinaryOp::Sub, n(), ast.int(1))]),
                    ast.call_named("fib", &[ast.binary(BinaryOp::Sub, n(), ast.int(2))]),
                )))])),
            )],
        ),
        ast.var_decl("total", Some(ast.u16_type()), Some(ast.int(0))),
        ast.for_stmt(
            Some(ast.var_decl("i", Some(ast.u16_type()), Some(ast.int(0)))),
            Some(ast.binary(BinaryOp::Lt, ast.ident("i"), ast.int(10))),
            Some(ast.assign(ast.ident("i"), ast.binary(BinaryOp::Add, ast.ident("i"), ast.int(1)))),
            ast.block(&[ast.expr_stmt(ast.assign(
                ast.ident("total"),
                ast.binary(BinaryOp::Add, ast.ident("total"), ast.call_named("fib", &[ast.ident("i")])),
            ))]),
        ),
    ]
}

fn phase_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let program = fibonacci(&ast);
    let ir = sable::compile_program(&program).unwrap();

    let mut group = c.benchmark_group("pipeline/phases");
    group.bench_function("ir", |b| {
        b.iter(|| {
            let ir = sable::compile_program(black_box(&program)).unwrap();
            end_profiling_frame();
            black_box(ir.len())
        });
    });
    group.throughput(Throughput::Elements(ir.len() as u64));
    group.bench_function("lower", |b| {
        b.iter(|| {
            let program = Backend::new(&CompilerOptions::default())
                .lower(black_box(&ir))
                .unwrap();
            end_profiling_frame();
            black_box(program.len())
        });
    });
    group.bench_function("compile_and_run", |b| {
        b.iter(|| {
            let machine = sable::run(black_box(&program)).unwrap();
            end_profiling_frame();
            black_box(machine.steps())
        });
    });
    group.finish();
}

fn scaling_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("pipeline/scaling");
    for count in [10, 100, 500] {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let program = chain(&ast, count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("statements", count), &program, |b, program| {
            b.iter(|| {
                let compiled =
                    sable::compile_to_machine_code(black_box(program), &CompilerOptions::default())
                        .unwrap();
                end_profiling_frame();
                black_box(compiled.instructions.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, phase_benchmarks, scaling_benchmarks);
criterion_main!(benches);
