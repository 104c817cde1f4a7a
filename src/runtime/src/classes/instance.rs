//! Class instances and their fields.

use fxhash::FxHashMap;

use crate::{
    classes::{Class, Str},
    memory::{managed, Gc, Trace, WorkList},
    value::Value,
};

/// An instance of a class.
///
/// Fields are created on first assignment and can hold any value. A field
/// shadows a method of the same name in both property access and
/// invocation.
#[derive(Debug)]
pub(crate) struct Instance {
    class: Gc<Class>,
    fields: FxHashMap<Gc<Str>, Value>,
}

impl Instance {
    pub(crate) fn new(class: Gc<Class>) -> Instance {
        Instance { class, fields: FxHashMap::default() }
    }

    pub(crate) fn class(&self) -> Gc<Class> {
        self.class
    }

    pub(crate) fn field(&self, name: Gc<Str>) -> Option<Value> {
        self.fields.get(&name).copied()
    }

    pub(crate) fn set_field(&mut self, name: Gc<Str>, value: Value) {
        self.fields.insert(name, value);
    }

    pub(crate) fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl Trace for Instance {
    fn trace(&self, worklist: &mut WorkList) {
        worklist.enqueue(self.class.erased());

        for (name, value) in &self.fields {
            worklist.enqueue(name.erased());
            value.trace(worklist);
        }
    }
}

managed!(Instance as Instance);
