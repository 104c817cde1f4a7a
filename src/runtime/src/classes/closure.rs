//! Runtime closure representation.

use crate::{
    classes::{Function, Upvalue},
    memory::{managed, Gc, Trace, WorkList},
};

/// A function bound to the upvalues it captures.
///
/// A closure's upvalue vector is filled in exactly once, by the `Closure`
/// instruction that creates it, and is never rebound afterwards. Its length
/// always ends up equal to the function's `upvalue_count`.
#[derive(Debug)]
pub(crate) struct Closure {
    function: Gc<Function>,
    upvalues: Vec<Gc<Upvalue>>,
}

impl Closure {
    pub(crate) fn new(function: Gc<Function>) -> Closure {
        Closure { function, upvalues: Vec::new() }
    }

    pub(crate) fn function(&self) -> Gc<Function> {
        self.function
    }

    pub(crate) fn upvalues(&self) -> &[Gc<Upvalue>] {
        &self.upvalues
    }

    /// The upvalue in the given slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of range, which would mean the compiler
    /// emitted an upvalue operand past the function's `upvalue_count`.
    pub(crate) fn upvalue(&self, slot: u8) -> Gc<Upvalue> {
        self.upvalues[slot as usize]
    }

    /// Attach the next captured upvalue. Only the `Closure` instruction
    /// calls this, while the new closure is on top of the stack.
    pub(crate) fn push_upvalue(&mut self, cell: Gc<Upvalue>) {
        self.upvalues.push(cell);
    }
}

impl Trace for Closure {
    fn trace(&self, worklist: &mut WorkList) {
        worklist.enqueue(self.function.erased());

        for cell in &self.upvalues {
            worklist.enqueue(cell.erased());
        }
    }
}

managed!(Closure as Closure);
