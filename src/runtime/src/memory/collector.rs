//! Driving the collector.
//!
//! The heap can't collect on its own because only the machine knows the
//! root set: the value stack, the call frames, the open upvalues, the
//! globals table, the cached `init` string, and whatever transient roots
//! are pinned at the moment. So allocation goes through the machine, which
//! checks the threshold, marks from its roots, prunes the weak intern
//! table, and has the heap sweep.

use crate::{
    memory::{Managed, Trace, WorkList},
    vm::VirtualMachine,
};

use super::Gc;

impl VirtualMachine {
    /// Allocate a new heap object, collecting garbage first if the heap has
    /// grown past its threshold (or on every allocation under
    /// `stress_gc`).
    ///
    /// Anything reachable only from a local variable at the call site is
    /// *not* a root; callers must keep in-flight values on the value stack
    /// or pinned as transient roots across this call.
    pub(crate) fn allocate<T: Managed>(&mut self, object: T) -> Gc<T> {
        if self.options.stress_gc || self.heap.should_collect() {
            self.collect_garbage();
        }

        self.heap.alloc(object)
    }

    /// Run a full mark-sweep collection cycle.
    pub(crate) fn collect_garbage(&mut self) {
        #[cfg(feature = "gc_trace")]
        let before = (self.heap.live_objects(), self.heap.bytes_allocated());

        let mut worklist = WorkList::default();
        self.mark_roots(&mut worklist);

        // Trace until every reachable object is blackened.
        while let Some(any) = worklist.pop() {
            if !self.heap.mark(any) {
                continue;
            }

            self.heap.object(any).trace(&mut worklist);
        }

        // The intern table is weak, so it's pruned rather than traced.
        self.strings.prune(&self.heap);

        let freed = self.heap.sweep(self.options.gc_growth_factor);
        let _ = freed;

        #[cfg(feature = "gc_trace")]
        log::trace!(
            "gc: freed {} of {} objects, {} -> {} bytes",
            freed,
            before.0,
            before.1,
            self.heap.bytes_allocated(),
        );
    }

    fn mark_roots(&self, worklist: &mut WorkList) {
        for value in self.value_stack.iter() {
            value.trace(worklist);
        }

        for frame in self.call_stack.iter() {
            worklist.enqueue(frame.closure.erased());
            worklist.enqueue(frame.function.erased());
        }

        for cell in self.open_upvalues.iter() {
            worklist.enqueue(cell.erased());
        }

        for (name, value) in self.globals.iter() {
            worklist.enqueue(name.erased());
            value.trace(worklist);
        }

        worklist.enqueue(self.init_string.erased());

        for value in self.heap.transients() {
            value.trace(worklist);
        }
    }
}
