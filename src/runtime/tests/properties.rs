//! Property-based tests driving the machine with generated programs.

mod helpers;

use bytecode::{Function, Op};
use proptest::prelude::*;

use helpers::*;

proptest! {
    /// A program that pushes any number of constants and pops them all
    /// leaves the machine in its starting state and prints nothing.
    #[test]
    fn balanced_pushes_and_pops_terminate_cleanly(
        values in proptest::collection::vec(-1000.0..1000.0f64, 0..40)
    ) {
        let mut script = Function::script();
        {
            let chunk = script.chunk_mut();
            for n in &values {
                emit_number(chunk, *n, 1);
            }
            for _ in &values {
                chunk.write_op(Op::Pop, 2);
            }
            emit_return_nil(chunk, 3);
        }

        let (result, output) = run(script);
        prop_assert!(result.is_ok());
        prop_assert_eq!(output, "");
    }

    /// Arithmetic over any two finite doubles agrees with Rust's `f64`,
    /// digit for digit in the printed output.
    #[test]
    fn binary_arithmetic_matches_ieee(
        a in -1e9..1e9f64,
        b in -1e9..1e9f64,
    ) {
        for (op, expected) in [
            (Op::Add, a + b),
            (Op::Subtract, a - b),
            (Op::Multiply, a * b),
            (Op::Divide, a / b),
        ] {
            let mut script = Function::script();
            {
                let chunk = script.chunk_mut();
                emit_number(chunk, a, 1);
                emit_number(chunk, b, 1);
                chunk.write_op(op, 1);
                chunk.write_op(Op::Println, 1);
                emit_return_nil(chunk, 2);
            }

            let (result, output) = run(script);
            prop_assert!(result.is_ok());
            prop_assert_eq!(output, format!("{}\n", expected));
        }
    }

    /// Equality in the language is reflexive for every number except NaN,
    /// matching IEEE semantics.
    #[test]
    fn self_equality_matches_ieee(n in any::<f64>()) {
        let mut script = Function::script();
        {
            let chunk = script.chunk_mut();
            emit_number(chunk, n, 1);
            emit_number(chunk, n, 1);
            chunk.write_op(Op::Equal, 1);
            chunk.write_op(Op::Println, 1);
            emit_return_nil(chunk, 2);
        }

        let (result, output) = run(script);
        prop_assert!(result.is_ok());

        let expected = if n.is_nan() { "false\n" } else { "true\n" };
        prop_assert_eq!(output, expected);
    }

    /// Deeply nested (but bounded) call chains come back with the right
    /// value and a clean stack.
    #[test]
    fn nested_calls_return_through_every_frame(depth in 1usize..40) {
        // fun id(n) { return n; } println id(id(...id(7)...));
        let mut id = Function::new(Some("id"), 1);
        {
            let chunk = id.chunk_mut();
            emit_get_local(chunk, 1, 1);
            chunk.write_op(Op::Return, 1);
        }

        let mut script = Function::script();
        {
            let chunk = script.chunk_mut();
            emit_closure(chunk, id, &[], 1);
            emit_named(chunk, Op::DefineGlobal, "id", 1);

            for _ in 0..depth {
                emit_named(chunk, Op::GetGlobal, "id", 2);
            }
            emit_number(chunk, 7.0, 2);
            for _ in 0..depth {
                emit_call(chunk, 1, 2);
            }
            chunk.write_op(Op::Println, 2);
            emit_return_nil(chunk, 3);
        }

        let (result, output) = run(script);
        prop_assert!(result.is_ok());
        prop_assert_eq!(output, "7\n");
    }
}
