//! Interpreter throughput benchmarks over hand-assembled chunks.

use bytecode::{Chunk, Constant, Function, Op};
use criterion::{criterion_group, criterion_main, Criterion};
use runtime::VirtualMachine;

fn emit_number(chunk: &mut Chunk, n: f64, line: u32) {
    let index = chunk.add_constant(Constant::Number(n));
    chunk.write_op(Op::Constant, line);
    chunk.write(index, line);
}

fn emit_named(chunk: &mut Chunk, op: Op, name: &str, line: u32) {
    let index = chunk.add_constant(Constant::from(name));
    chunk.write_op(op, line);
    chunk.write(index, line);
}

/// `fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
/// fib(N);`
fn fib_script(n: f64) -> Function {
    let mut fib = Function::new(Some("fib"), 1);
    {
        let chunk = fib.chunk_mut();

        chunk.write_op(Op::GetLocal, 1);
        chunk.write(1, 1);
        emit_number(chunk, 2.0, 1);
        chunk.write_op(Op::Less, 1);
        let past_base_case = chunk.emit_jump(Op::JumpIfFalse, 1);
        chunk.write_op(Op::Pop, 1);
        chunk.write_op(Op::GetLocal, 1);
        chunk.write(1, 1);
        chunk.write_op(Op::Return, 1);
        chunk.patch_jump(past_base_case);
        chunk.write_op(Op::Pop, 1);

        emit_named(chunk, Op::GetGlobal, "fib", 2);
        chunk.write_op(Op::GetLocal, 2);
        chunk.write(1, 2);
        emit_number(chunk, 1.0, 2);
        chunk.write_op(Op::Subtract, 2);
        chunk.write_op(Op::Call, 2);
        chunk.write(1, 2);

        emit_named(chunk, Op::GetGlobal, "fib", 2);
        chunk.write_op(Op::GetLocal, 2);
        chunk.write(1, 2);
        emit_number(chunk, 2.0, 2);
        chunk.write_op(Op::Subtract, 2);
        chunk.write_op(Op::Call, 2);
        chunk.write(1, 2);

        chunk.write_op(Op::Add, 2);
        chunk.write_op(Op::Return, 2);
    }

    let mut script = Function::script();
    let chunk = script.chunk_mut();
    let index = chunk.add_constant(Constant::Function(fib));
    chunk.write_op(Op::Closure, 1);
    chunk.write(index, 1);
    emit_named(chunk, Op::DefineGlobal, "fib", 1);
    emit_named(chunk, Op::GetGlobal, "fib", 2);
    emit_number(chunk, n, 2);
    chunk.write_op(Op::Call, 2);
    chunk.write(1, 2);
    chunk.write_op(Op::Pop, 2);
    chunk.write_op(Op::Nil, 3);
    chunk.write_op(Op::Return, 3);

    script
}

/// `var i = 0; var total = 0; while (i < 1000) { i = i + 1; total =
/// total + i; }`
fn loop_script() -> Function {
    let mut script = Function::script();
    let chunk = script.chunk_mut();

    emit_number(chunk, 0.0, 1); // slot 1: i
    emit_number(chunk, 0.0, 1); // slot 2: total

    let loop_start = chunk.len();
    chunk.write_op(Op::GetLocal, 2);
    chunk.write(1, 2);
    emit_number(chunk, 1000.0, 2);
    chunk.write_op(Op::Less, 2);
    let exit = chunk.emit_jump(Op::JumpIfFalse, 2);
    chunk.write_op(Op::Pop, 2);

    chunk.write_op(Op::GetLocal, 3);
    chunk.write(1, 3);
    emit_number(chunk, 1.0, 3);
    chunk.write_op(Op::Add, 3);
    chunk.write_op(Op::SetLocal, 3);
    chunk.write(1, 3);
    chunk.write_op(Op::Pop, 3);

    chunk.write_op(Op::GetLocal, 4);
    chunk.write(2, 4);
    chunk.write_op(Op::GetLocal, 4);
    chunk.write(1, 4);
    chunk.write_op(Op::Add, 4);
    chunk.write_op(Op::SetLocal, 4);
    chunk.write(2, 4);
    chunk.write_op(Op::Pop, 4);

    chunk.emit_loop(loop_start, 5);
    chunk.patch_jump(exit);
    chunk.write_op(Op::Pop, 5);

    chunk.write_op(Op::Nil, 6);
    chunk.write_op(Op::Return, 6);

    script
}

fn vm_benches(c: &mut Criterion) {
    c.bench_function("fib 15", |b| {
        b.iter(|| {
            let mut vm = VirtualMachine::new();
            vm.interpret(fib_script(15.0)).unwrap();
        })
    });

    c.bench_function("counting loop", |b| {
        b.iter(|| {
            let mut vm = VirtualMachine::new();
            vm.interpret(loop_script()).unwrap();
        })
    });
}

criterion_group!(benches, vm_benches);
criterion_main!(benches);
