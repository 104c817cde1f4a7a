//! The operand stack.

use common::Index;

use crate::value::Value;

use super::call_stack::FRAMES_MAX;

/// The most values that can be on the operand stack at once.
pub const STACK_MAX: usize = FRAMES_MAX * 256;

/// The operand stack.
///
/// One note on discipline that runs through every user of this type:
/// popping a value does not keep it alive. Any operation that might
/// allocate (and so might collect) must finish reading its operands while
/// they're still on the stack, write its result, and only then pop.
#[derive(Debug, Default)]
pub struct ValueStack {
    values: Vec<Value>,
}

impl ValueStack {
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.values.iter()
    }

    pub(crate) fn push(&mut self, value: Value) {
        debug_assert!(self.values.len() < STACK_MAX, "value stack overflow");
        self.values.push(value);
    }

    pub(crate) fn pop(&mut self) {
        self.values.pop();
    }

    /// Drop values from the top of the stack down to (and including) the
    /// given index.
    pub(crate) fn truncate_to(&mut self, index: Index<ValueStack>) {
        self.values.truncate(index.as_usize());
    }

    /// Drop `count` values from the top of the stack.
    pub(crate) fn truncate_by(&mut self, count: usize) {
        let len = self.values.len().saturating_sub(count);
        self.values.truncate(len);
    }

    /// Drop everything. Used when a fatal error resets the machine.
    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }

    pub(crate) fn get(&self, index: Index<ValueStack>) -> Option<Value> {
        self.values.get(index.as_usize()).copied()
    }

    pub(crate) fn set(&mut self, index: Index<ValueStack>, value: Value) {
        self.values[index.as_usize()] = value;
    }

    /// The value `distance` slots below the top; `get_from_top(0)` is the
    /// top itself.
    ///
    /// # Panics
    ///
    /// Panics if that's below the bottom of the stack.
    pub(crate) fn get_from_top(&self, distance: usize) -> Value {
        let index = self.index_from_top(distance);
        self.values[index.as_usize()]
    }

    /// Overwrite the value `distance` slots below the top.
    pub(crate) fn set_from_top(&mut self, distance: usize, value: Value) {
        let index = self.index_from_top(distance);
        self.values[index.as_usize()] = value;
    }

    /// The absolute index of the slot `distance` below the top.
    ///
    /// # Panics
    ///
    /// Panics if that's below the bottom of the stack.
    pub(crate) fn index_from_top(
        &self,
        distance: usize,
    ) -> Index<ValueStack> {
        let index = self
            .values
            .len()
            .checked_sub(distance + 1)
            .expect("index from top would be below bottom of stack");

        Index::new(index as u32)
    }

    /// A view of the top `n` values, bottom-to-top.
    pub(crate) fn top_n(&self, n: usize) -> &[Value] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }
}
