//! The Civet language runtime.
//!
//! The runtime takes a compiled [`bytecode::Function`] and executes it on a
//! stack-based [`VirtualMachine`]. Everything the running program touches
//! lives on a garbage-collected heap owned by the machine: strings (interned
//! so equal content means an identical object), functions and the closures
//! made from them, classes and their instances, bound methods, native
//! functions, and lists.
//!
//! The machine is strictly single threaded. One call to
//! [`VirtualMachine::interpret`] runs one script to completion, and a fatal
//! runtime error resets the machine's stacks while leaving globals and
//! interned strings in place, so a host can keep feeding it scripts the way
//! a REPL would.

mod classes;
mod error;
mod memory;
mod value;
mod vm;

pub use crate::{
    classes::NativeFn,
    error::{RuntimeError, RuntimeErrorKind, TraceFrame},
    memory::GcAny,
    value::Value,
    vm::{
        Compile, Interpretation, Options, VirtualMachine, FRAMES_MAX,
        STACK_MAX,
    },
};
