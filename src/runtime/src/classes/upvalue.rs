//! Upvalues, the cells that represent variables captured by closures.

use common::Index;

use crate::{
    memory::{managed, Trace, WorkList},
    value::Value,
    vm::ValueStack,
};

/// Where an upvalue's variable currently lives.
#[derive(Debug, Clone, Copy)]
pub(crate) enum UpvalueState {
    /// The variable is still a live local; the upvalue aliases its stack
    /// slot. Reads and writes through the upvalue and through the local are
    /// the same storage.
    Open(Index<ValueStack>),

    /// The variable's frame is gone; the upvalue owns its last value.
    Closed(Value),
}

/// A captured variable.
///
/// At most one upvalue exists per stack slot (the machine's open-upvalue
/// list enforces this), so sibling closures capturing the same variable
/// share one cell and see each other's writes.
#[derive(Debug)]
pub(crate) struct Upvalue {
    state: UpvalueState,
}

impl Upvalue {
    /// A new open upvalue aliasing a stack slot.
    pub(crate) fn open(slot: Index<ValueStack>) -> Upvalue {
        Upvalue { state: UpvalueState::Open(slot) }
    }

    pub(crate) fn state(&self) -> UpvalueState {
        self.state
    }

    /// The stack slot this upvalue aliases, if it's still open.
    pub(crate) fn open_slot(&self) -> Option<Index<ValueStack>> {
        match self.state {
            UpvalueState::Open(slot) => Some(slot),
            UpvalueState::Closed(_) => None,
        }
    }

    /// Move the variable's value into the cell, leaving the stack.
    pub(crate) fn close(&mut self, value: Value) {
        self.state = UpvalueState::Closed(value);
    }

    /// Overwrite the value of a closed cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is still open; open cells are written through
    /// their stack slot instead.
    pub(crate) fn set_closed(&mut self, value: Value) {
        match &mut self.state {
            UpvalueState::Closed(slot) => *slot = value,
            UpvalueState::Open(_) => {
                panic!("wrote a closed value into an open upvalue")
            }
        }
    }
}

impl Trace for Upvalue {
    fn trace(&self, worklist: &mut WorkList) {
        match self.state {
            // An open upvalue's value is on the stack, which is a root
            // already.
            UpvalueState::Open(_) => {}
            UpvalueState::Closed(value) => value.trace(worklist),
        }
    }
}

managed!(Upvalue as Upvalue);
