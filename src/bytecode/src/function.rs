//! Compiled functions, as a compiler hands them to the runtime.

use std::fmt::{self, Display, Formatter};

use crate::chunk::Chunk;

/// A compiled function: its arity, the number of variables it captures from
/// enclosing scopes, an optional name, and its code.
///
/// The top-level code of a script is itself a [`Function`] with no name and
/// no parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Function {
    name: Option<String>,
    arity: u8,
    upvalue_count: u8,
    chunk: Chunk,
}

impl Function {
    /// The name stack traces use for the unnamed top-level function.
    pub const SCRIPT_NAME: &'static str = "script";

    /// A new, empty function.
    pub fn new(name: Option<&str>, arity: u8) -> Function {
        Function {
            name: name.map(String::from),
            arity,
            ..Function::default()
        }
    }

    /// A new, empty top-level script function.
    pub fn script() -> Function {
        Function::default()
    }

    /// The function's name, if it has one. Only the top level goes nameless.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The number of arguments a call must pass.
    pub fn arity(&self) -> u8 {
        self.arity
    }

    /// The number of variables this function captures from enclosing
    /// scopes.
    pub fn upvalue_count(&self) -> u8 {
        self.upvalue_count
    }

    /// Record that this function captures another variable, returning the
    /// upvalue's slot.
    ///
    /// # Panics
    ///
    /// Panics if the function already captures 255 variables.
    pub fn add_upvalue(&mut self) -> u8 {
        let slot = self.upvalue_count;
        self.upvalue_count = self
            .upvalue_count
            .checked_add(1)
            .expect("too many captured variables in one function");
        slot
    }

    /// The function's code.
    pub fn chunk(&self) -> &Chunk {
        &self.chunk
    }

    /// The function's code, for a compiler to emit into.
    pub fn chunk_mut(&mut self) -> &mut Chunk {
        &mut self.chunk
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<fn {}>", name),
            None => write!(f, "<{}>", Function::SCRIPT_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_is_nameless_and_nullary() {
        let script = Function::script();
        assert_eq!(script.name(), None);
        assert_eq!(script.arity(), 0);
    }

    #[test]
    fn add_upvalue_counts_up() {
        let mut f = Function::new(Some("inner"), 0);
        assert_eq!(f.add_upvalue(), 0);
        assert_eq!(f.add_upvalue(), 1);
        assert_eq!(f.upvalue_count(), 2);
    }
}
