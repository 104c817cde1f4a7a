//! Civet is a bytecode virtual machine for a small dynamically-typed,
//! class-based scripting language.
//!
//! This crate is the embedding facade. The pieces live in two crates that
//! are re-exported here:
//!
//! - [`bytecode`] is the compiler-facing surface: the [`Op`]code listing
//!   and the [`Chunk`]/[`Constant`]/[`Function`] types a compiler emits.
//!   The compiler itself is not part of this repository; anything
//!   implementing [`Compile`] can sit in front of the machine.
//!
//! - [`runtime`] is the machine: the value model, the garbage collected
//!   heap, closures and upvalues, classes and dispatch, lists, and the
//!   built-in natives (`clock`, `length`, `append`, `delete`).
//!
//! # Running a script
//!
//! A compiled script is just a [`Function`]; handing one to
//! [`VirtualMachine::interpret`] runs it:
//!
//! ```
//! use civet::{Constant, Function, Op, VirtualMachine};
//!
//! let mut script = Function::script();
//! {
//!     let chunk = script.chunk_mut();
//!     let hello = chunk.add_constant(Constant::from("Hello, world!"));
//!     chunk.write_op(Op::Constant, 1);
//!     chunk.write(hello, 1);
//!     chunk.write_op(Op::Println, 1);
//!     chunk.write_op(Op::Nil, 1);
//!     chunk.write_op(Op::Return, 1);
//! }
//!
//! let mut vm = VirtualMachine::new();
//! vm.interpret(script).unwrap();
//! ```
//!
//! # Driving it from source text
//!
//! With a compiler plugged in, [`VirtualMachine::interpret_source`] gives
//! the conventional driver behavior, including exit codes (0 for success,
//! 65 for compile errors, 70 for runtime errors):
//!
//! ```
//! use civet::{Compile, Function, Interpretation, VirtualMachine};
//!
//! /// A stand-in for a real compiler that rejects everything.
//! struct NoCompiler;
//!
//! impl Compile for NoCompiler {
//!     fn compile(&mut self, _source: &str) -> Option<Function> {
//!         None
//!     }
//! }
//!
//! let mut vm = VirtualMachine::new();
//! let result = vm.interpret_source(&mut NoCompiler, "print 1;");
//!
//! assert_eq!(result, Interpretation::CompileError);
//! assert_eq!(result.exit_code(), 65);
//! ```

pub use bytecode::{Chunk, Constant, Function, Op};
pub use runtime::{
    Compile, GcAny, Interpretation, NativeFn, Options, RuntimeError,
    RuntimeErrorKind, TraceFrame, Value, VirtualMachine, FRAMES_MAX,
    STACK_MAX,
};
