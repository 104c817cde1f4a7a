//! The runtime's object classes.
//!
//! Each file defines one kind of heap object, its [`Trace`][crate::memory::Trace]
//! impl so the collector can follow its references, and its `Managed` wiring
//! into the arena's tagged union.

mod bound_method;
mod class;
mod closure;
mod function;
mod instance;
mod list;
mod native;
mod string;
mod upvalue;

pub(crate) use self::{
    bound_method::BoundMethod,
    class::Class,
    closure::Closure,
    function::{Chunk, Function},
    instance::Instance,
    list::List,
    native::Native,
    string::Str,
    upvalue::{Upvalue, UpvalueState},
};

pub use self::native::NativeFn;
