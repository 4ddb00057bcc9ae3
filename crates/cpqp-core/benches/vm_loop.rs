//! Benchmark suite for the cpqp execution paths
//!
//! A counting loop is compiled and run on the VM, and walked by the
//! tree-walking interpreter, for increasing iteration counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cpqp_core::{with_output_capture, Compiler, Interpreter, Parser, VM};

fn counting_loop(iterations: u64) -> String {
    format!(
        "VAR i = 0; VAR soma = 0;
         VOLTAINFINITA (i < {iterations}) {{ soma = soma + i * 2; ++i; }}
         ESCREVEAI soma;"
    )
}

/// Benchmark parsing plus compilation
fn bench_compile(c: &mut Criterion) {
    let source = counting_loop(10);
    c.bench_function("compile_loop", |b| {
        b.iter(|| {
            let program = Parser::parse_program(black_box(&source)).expect("parse");
            black_box(Compiler::new().compile(&program).expect("compile"))
        });
    });
}

/// Benchmark VM execution
fn bench_vm(c: &mut Criterion) {
    let mut group = c.benchmark_group("vm_loop");

    for iterations in [100u64, 1_000, 10_000] {
        let program = Parser::parse_program(&counting_loop(iterations)).expect("parse");
        let chunk = Compiler::new().compile(&program).expect("compile");
        group.throughput(Throughput::Elements(iterations));
        group.bench_with_input(BenchmarkId::from_parameter(iterations), &chunk, |b, chunk| {
            let mut vm = VM::with_input(std::io::empty());
            b.iter(|| with_output_capture(|| vm.run(black_box(chunk))));
        });
    }

    group.finish();
}

/// Benchmark the tree-walking interpreter on the same programs
fn bench_tree_walker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_walker_loop");

    for iterations in [100u64, 1_000, 10_000] {
        let program = Parser::parse_program(&counting_loop(iterations)).expect("parse");
        group.throughput(Throughput::Elements(iterations));
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &program,
            |b, program| {
                let mut interpreter = Interpreter::with_input(std::io::empty());
                b.iter(|| with_output_capture(|| interpreter.interpret(black_box(program))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_vm, bench_tree_walker);
criterion_main!(benches);
