//! Shared scaffolding for the interpreter tests.
//!
//! The compiler lives outside this repository, so these tests assemble
//! chunks by hand, exactly the way a compiler back end would emit them.
//! The helpers here keep that from being unbearably noisy.

#![allow(dead_code)]

use std::{cell::RefCell, io::Write, rc::Rc};

use bytecode::{Chunk, Constant, Function, Op};
use runtime::{Options, RuntimeError, VirtualMachine};

/// A `Write` the tests can hand to the machine and still read afterwards.
#[derive(Clone, Default)]
pub struct CapturedOutput(Rc<RefCell<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone())
            .expect("program output was not UTF-8")
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run a script on a fresh machine, returning the result and whatever it
/// printed.
pub fn run(script: Function) -> (Result<(), RuntimeError>, String) {
    run_with_options(script, Options::default())
}

/// Like [`run`], but collecting on every allocation. Scripts must behave
/// identically either way; anything that doesn't has a GC rooting bug.
pub fn run_stressed(script: Function) -> (Result<(), RuntimeError>, String) {
    run_with_options(
        script,
        Options { stress_gc: true, ..Options::default() },
    )
}

pub fn run_with_options(
    script: Function,
    options: Options,
) -> (Result<(), RuntimeError>, String) {
    let out = CapturedOutput::default();
    let mut vm = VirtualMachine::with_options(options)
        .with_output(Box::new(out.clone()));

    let result = vm.interpret(script);
    (result, out.contents())
}

/// Run a script and insist it succeeds, returning its output.
pub fn run_expecting_output(script: Function) -> String {
    let (result, output) = run(script);
    assert!(result.is_ok(), "script failed: {:?}", result);
    output
}

/// Run a script and insist it fails, returning the error.
pub fn run_expecting_error(script: Function) -> RuntimeError {
    let (result, _) = run(script);
    result.expect_err("script should have failed")
}

pub fn emit_number(chunk: &mut Chunk, n: f64, line: u32) {
    let index = chunk.add_constant(Constant::Number(n));
    chunk.write_op(Op::Constant, line);
    chunk.write(index, line);
}

pub fn emit_string(chunk: &mut Chunk, s: &str, line: u32) {
    let index = chunk.add_constant(Constant::from(s));
    chunk.write_op(Op::Constant, line);
    chunk.write(index, line);
}

/// Emit an op that takes a name-constant operand: the global ops, `Class`,
/// `Method`, the property ops, and `GetSuper`.
pub fn emit_named(chunk: &mut Chunk, op: Op, name: &str, line: u32) {
    let index = chunk.add_constant(Constant::from(name));
    chunk.write_op(op, line);
    chunk.write(index, line);
}

/// Emit `Invoke` or `SuperInvoke`: a name constant plus an argument count.
pub fn emit_invoke(
    chunk: &mut Chunk,
    op: Op,
    name: &str,
    argc: u8,
    line: u32,
) {
    let index = chunk.add_constant(Constant::from(name));
    chunk.write_op(op, line);
    chunk.write(index, line);
    chunk.write(argc, line);
}

/// Emit a `Closure` over a function constant, with one `(is_local, index)`
/// descriptor pair per captured variable.
pub fn emit_closure(
    chunk: &mut Chunk,
    function: Function,
    captures: &[(bool, u8)],
    line: u32,
) {
    assert_eq!(function.upvalue_count() as usize, captures.len());

    let index = chunk.add_constant(Constant::Function(function));
    chunk.write_op(Op::Closure, line);
    chunk.write(index, line);

    for (is_local, slot) in captures {
        chunk.write(u8::from(*is_local), line);
        chunk.write(*slot, line);
    }
}

pub fn emit_call(chunk: &mut Chunk, argc: u8, line: u32) {
    chunk.write_op(Op::Call, line);
    chunk.write(argc, line);
}

pub fn emit_get_local(chunk: &mut Chunk, slot: u8, line: u32) {
    chunk.write_op(Op::GetLocal, line);
    chunk.write(slot, line);
}

pub fn emit_set_local(chunk: &mut Chunk, slot: u8, line: u32) {
    chunk.write_op(Op::SetLocal, line);
    chunk.write(slot, line);
}

pub fn emit_get_upvalue(chunk: &mut Chunk, slot: u8, line: u32) {
    chunk.write_op(Op::GetUpvalue, line);
    chunk.write(slot, line);
}

pub fn emit_set_upvalue(chunk: &mut Chunk, slot: u8, line: u32) {
    chunk.write_op(Op::SetUpvalue, line);
    chunk.write(slot, line);
}

pub fn emit_list_init(chunk: &mut Chunk, count: u8, line: u32) {
    chunk.write_op(Op::ListInit, line);
    chunk.write(count, line);
}

/// The implicit `return nil` a compiler emits at the end of a body.
pub fn emit_return_nil(chunk: &mut Chunk, line: u32) {
    chunk.write_op(Op::Nil, line);
    chunk.write_op(Op::Return, line);
}
