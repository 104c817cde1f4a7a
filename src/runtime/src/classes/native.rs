//! Native functions, implemented by the host.

use crate::{
    classes::Str,
    error::RuntimeErrorKind,
    memory::{managed, Gc, Trace, WorkList},
    value::Value,
    vm::VirtualMachine,
};

/// The signature of a native function.
///
/// Natives run synchronously, receive their arguments by slice (the
/// originals stay on the value stack for the duration of the call, so
/// they're rooted), and either return a value or raise a runtime error the
/// same way an opcode would.
pub type NativeFn =
    fn(&mut VirtualMachine, &[Value]) -> Result<Value, RuntimeErrorKind>;

/// A host function installed as a global.
#[derive(Debug)]
pub(crate) struct Native {
    name: Gc<Str>,
    function: NativeFn,
}

impl Native {
    pub(crate) fn new(name: Gc<Str>, function: NativeFn) -> Native {
        Native { name, function }
    }

    pub(crate) fn function(&self) -> NativeFn {
        self.function
    }
}

impl Trace for Native {
    fn trace(&self, worklist: &mut WorkList) {
        worklist.enqueue(self.name.erased());
    }
}

managed!(Native as Native);
