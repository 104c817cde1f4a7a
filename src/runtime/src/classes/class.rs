//! Classes and their method tables.

use fxhash::FxHashMap;

use crate::{
    classes::{Closure, Str},
    memory::{managed, Gc, Trace, WorkList},
};

/// A class: a name and a table of methods.
///
/// Method tables hold closures only, keyed by interned name. A class keeps
/// no pointer to its superclass; inheritance copies the superclass's
/// methods down at declaration time, and `super` dispatch resolves through
/// an upvalue the compiler arranges.
#[derive(Debug)]
pub(crate) struct Class {
    name: Gc<Str>,
    methods: FxHashMap<Gc<Str>, Gc<Closure>>,
}

impl Class {
    pub(crate) fn new(name: Gc<Str>) -> Class {
        Class { name, methods: FxHashMap::default() }
    }

    pub(crate) fn name(&self) -> Gc<Str> {
        self.name
    }

    pub(crate) fn method(&self, name: Gc<Str>) -> Option<Gc<Closure>> {
        self.methods.get(&name).copied()
    }

    pub(crate) fn add_method(&mut self, name: Gc<Str>, method: Gc<Closure>) {
        self.methods.insert(name, method);
    }

    /// A copy of the method table, for inheritance copy-down.
    pub(crate) fn methods(&self) -> FxHashMap<Gc<Str>, Gc<Closure>> {
        self.methods.clone()
    }

    /// Install every method from a superclass. Runs before any of the
    /// subclass's own methods are added, so later additions override.
    pub(crate) fn inherit(
        &mut self,
        methods: FxHashMap<Gc<Str>, Gc<Closure>>,
    ) {
        self.methods.extend(methods);
    }

    pub(crate) fn method_count(&self) -> usize {
        self.methods.len()
    }
}

impl Trace for Class {
    fn trace(&self, worklist: &mut WorkList) {
        worklist.enqueue(self.name.erased());

        for (name, method) in &self.methods {
            worklist.enqueue(name.erased());
            worklist.enqueue(method.erased());
        }
    }
}

managed!(Class as Class);
