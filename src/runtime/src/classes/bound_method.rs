//! Methods bound to the instance they were looked up on.

use crate::{
    classes::Closure,
    memory::{managed, Gc, Trace, WorkList},
    value::Value,
};

/// A method value paired with its receiver.
///
/// Created by property access when the name resolves to a method; calling
/// it later places the receiver back in the callee's slot so the method
/// body sees it as `this`.
#[derive(Debug)]
pub(crate) struct BoundMethod {
    receiver: Value,
    method: Gc<Closure>,
}

impl BoundMethod {
    pub(crate) fn new(receiver: Value, method: Gc<Closure>) -> BoundMethod {
        BoundMethod { receiver, method }
    }

    pub(crate) fn receiver(&self) -> Value {
        self.receiver
    }

    pub(crate) fn method(&self) -> Gc<Closure> {
        self.method
    }
}

impl Trace for BoundMethod {
    fn trace(&self, worklist: &mut WorkList) {
        self.receiver.trace(worklist);
        worklist.enqueue(self.method.erased());
    }
}

managed!(BoundMethod as BoundMethod);
