//! Runtime functions and their inflated chunks.

use crate::{
    classes::Str,
    memory::{managed, Gc, Trace, WorkList},
    value::Value,
};

/// A chunk of code as the machine executes it.
///
/// This is the loaded form of a [`bytecode::Chunk`]: the code and line map
/// are carried over as-is, but the constants have been inflated into live
/// [`Value`]s, with strings interned and nested functions allocated on the
/// heap.
#[derive(Debug)]
pub(crate) struct Chunk {
    code: Vec<u8>,
    constants: Vec<Value>,
    lines: Vec<u32>,
}

impl Chunk {
    pub(crate) fn new(
        code: Vec<u8>,
        constants: Vec<Value>,
        lines: Vec<u32>,
    ) -> Chunk {
        debug_assert_eq!(code.len(), lines.len());
        Chunk { code, constants, lines }
    }

    pub(crate) fn code(&self) -> &[u8] {
        &self.code
    }

    pub(crate) fn constants(&self) -> &[Value] {
        &self.constants
    }

    pub(crate) fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// The source line the byte at `offset` came from.
    pub(crate) fn line_of(&self, offset: usize) -> u32 {
        self.lines.get(offset).copied().unwrap_or_default()
    }
}

/// A loaded function.
///
/// Functions are immutable once loaded. Execution always goes through a
/// [`Closure`][crate::classes::Closure] wrapper, even when nothing is
/// captured, so calls only have one shape.
#[derive(Debug)]
pub(crate) struct Function {
    name: Option<Gc<Str>>,
    arity: u8,
    upvalue_count: u8,
    chunk: Chunk,
}

impl Function {
    pub(crate) fn new(
        name: Option<Gc<Str>>,
        arity: u8,
        upvalue_count: u8,
        chunk: Chunk,
    ) -> Function {
        Function { name, arity, upvalue_count, chunk }
    }

    /// The function's name, or `None` for top-level script code.
    pub(crate) fn name(&self) -> Option<Gc<Str>> {
        self.name
    }

    pub(crate) fn arity(&self) -> u8 {
        self.arity
    }

    pub(crate) fn upvalue_count(&self) -> u8 {
        self.upvalue_count
    }

    pub(crate) fn chunk(&self) -> &Chunk {
        &self.chunk
    }
}

impl Trace for Function {
    fn trace(&self, worklist: &mut WorkList) {
        if let Some(name) = self.name {
            worklist.enqueue(name.erased());
        }

        for constant in self.chunk.constants() {
            constant.trace(worklist);
        }
    }
}

managed!(Function as Function);
