//! The machine's list of open upvalues.
//!
//! While a captured variable is still live on the stack, its upvalue is
//! "open" and recorded here. The list is kept sorted by stack slot so that
//! capture can find an existing cell for a slot (sibling closures must
//! share), and so that closing everything at or above a slot is popping
//! from the tail.

use common::Index;

use crate::{
    classes::Upvalue,
    memory::{Gc, Heap},
};

use super::value_stack::ValueStack;

/// The open upvalues, ordered by ascending stack slot. Scanning from the
/// tail visits them in descending slot order, which is where captures and
/// closes almost always land.
#[derive(Debug, Default)]
pub(crate) struct OpenUpvalues {
    cells: Vec<Gc<Upvalue>>,
}

impl OpenUpvalues {
    /// Find the cell for a stack slot. `Ok` carries an existing cell to
    /// reuse; `Err` carries the position where a new cell for this slot
    /// belongs.
    pub(crate) fn find(
        &self,
        slot: Index<ValueStack>,
        heap: &Heap,
    ) -> Result<Gc<Upvalue>, usize> {
        for (position, cell) in self.cells.iter().enumerate().rev() {
            let cell_slot = OpenUpvalues::slot_of(*cell, heap);

            if cell_slot == slot {
                return Ok(*cell);
            }

            if cell_slot < slot {
                return Err(position + 1);
            }
        }

        Err(0)
    }

    /// Splice a new open cell in at the position [`find`][Self::find]
    /// reported.
    pub(crate) fn insert(&mut self, position: usize, cell: Gc<Upvalue>) {
        self.cells.insert(position, cell);
    }

    /// Detach the topmost open cell if its slot is at or above `slot`. The
    /// caller closes the detached cell; once it's closed it has no business
    /// being in this list.
    pub(crate) fn pop_if_at_or_above(
        &mut self,
        slot: Index<ValueStack>,
        heap: &Heap,
    ) -> Option<Gc<Upvalue>> {
        let last = *self.cells.last()?;

        if OpenUpvalues::slot_of(last, heap) >= slot {
            self.cells.pop()
        } else {
            None
        }
    }

    /// Iterate over the open cells. These are GC roots.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Gc<Upvalue>> + '_ {
        self.cells.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    /// Drop every cell. Used when a fatal error resets the machine.
    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }

    fn slot_of(cell: Gc<Upvalue>, heap: &Heap) -> Index<ValueStack> {
        heap.get(cell)
            .open_slot()
            .expect("closed upvalue left on the open list")
    }

    /// Check the ordering invariant. Debug builds call this after
    /// splicing.
    pub(crate) fn is_sorted(&self, heap: &Heap) -> bool {
        self.cells
            .windows(2)
            .all(|w| {
                OpenUpvalues::slot_of(w[0], heap)
                    < OpenUpvalues::slot_of(w[1], heap)
            })
    }
}
