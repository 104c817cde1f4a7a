//! Collector behavior under load: programs that churn through objects
//! must behave identically whether collection runs rarely, eagerly, or on
//! every single allocation.

mod helpers;

use bytecode::{Function, Op};
use runtime::Options;

use helpers::*;

/// `var s = ""; var i = 0; while (i < 20) { s = s + "x"; i = i + 1; }
/// println s;` exercising interning and concatenation under collection.
fn concat_loop() -> Function {
    let mut script = Function::script();
    let chunk = script.chunk_mut();

    emit_string(chunk, "", 1);
    emit_named(chunk, Op::DefineGlobal, "s", 1);
    emit_number(chunk, 0.0, 2);
    emit_named(chunk, Op::DefineGlobal, "i", 2);

    let loop_start = chunk.len();
    emit_named(chunk, Op::GetGlobal, "i", 3);
    emit_number(chunk, 20.0, 3);
    chunk.write_op(Op::Less, 3);
    let exit = chunk.emit_jump(Op::JumpIfFalse, 3);
    chunk.write_op(Op::Pop, 3);

    emit_named(chunk, Op::GetGlobal, "s", 4);
    emit_string(chunk, "x", 4);
    chunk.write_op(Op::Add, 4);
    emit_named(chunk, Op::SetGlobal, "s", 4);
    chunk.write_op(Op::Pop, 4);

    emit_named(chunk, Op::GetGlobal, "i", 5);
    emit_number(chunk, 1.0, 5);
    chunk.write_op(Op::Add, 5);
    emit_named(chunk, Op::SetGlobal, "i", 5);
    chunk.write_op(Op::Pop, 5);

    chunk.emit_loop(loop_start, 6);
    chunk.patch_jump(exit);
    chunk.write_op(Op::Pop, 6);

    emit_named(chunk, Op::GetGlobal, "s", 7);
    chunk.write_op(Op::Println, 7);
    emit_return_nil(chunk, 8);

    script
}

/// A loop that makes and drops a list every iteration.
fn list_churn() -> Function {
    let mut script = Function::script();
    let chunk = script.chunk_mut();

    emit_number(chunk, 0.0, 1); // slot 1: i
    let loop_start = chunk.len();
    emit_get_local(chunk, 1, 2);
    emit_number(chunk, 50.0, 2);
    chunk.write_op(Op::Less, 2);
    let exit = chunk.emit_jump(Op::JumpIfFalse, 2);
    chunk.write_op(Op::Pop, 2);

    // { var l = [1, 2, 3]; }
    emit_number(chunk, 1.0, 3);
    emit_number(chunk, 2.0, 3);
    emit_number(chunk, 3.0, 3);
    emit_list_init(chunk, 3, 3);
    chunk.write_op(Op::Pop, 3);

    emit_get_local(chunk, 1, 4);
    emit_number(chunk, 1.0, 4);
    chunk.write_op(Op::Add, 4);
    emit_set_local(chunk, 1, 4);
    chunk.write_op(Op::Pop, 4);

    chunk.emit_loop(loop_start, 5);
    chunk.patch_jump(exit);
    chunk.write_op(Op::Pop, 5);

    emit_string(chunk, "done", 6);
    chunk.write_op(Op::Println, 6);
    emit_return_nil(chunk, 7);

    script
}

#[test]
fn concatenation_survives_stress_collection() {
    let expected = "x".repeat(20) + "\n";

    assert_eq!(run_expecting_output(concat_loop()), expected);
    assert_eq!(run_stressed(concat_loop()).1, expected);
}

#[test]
fn list_churn_survives_stress_collection() {
    assert_eq!(run_expecting_output(list_churn()), "done\n");
    assert_eq!(run_stressed(list_churn()).1, "done\n");
}

#[test]
fn a_tiny_threshold_behaves_like_a_big_one() {
    let eager = Options {
        initial_gc_threshold: 0,
        ..Options::default()
    };

    let (result, output) = run_with_options(concat_loop(), eager);
    assert!(result.is_ok(), "eager collection broke the program");
    assert_eq!(output, "x".repeat(20) + "\n");
}
