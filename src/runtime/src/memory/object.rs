//! Heap objects.
//!
//! Every garbage collected value lives in an arena slot as an [`Object`],
//! a tagged union over the runtime's nine object classes. The [`Managed`]
//! trait is what lets a typed handle [`Gc<T>`][crate::memory::Gc] get back
//! out the class it was created with.

use std::mem::size_of;

use crate::{
    classes::{
        BoundMethod, Class, Closure, Function, Instance, List, Native, Str,
        Upvalue,
    },
    memory::{Trace, WorkList},
    value::Value,
};

/// Any of the runtime's heap-allocated values.
#[derive(Debug)]
pub(crate) enum Object {
    String(Str),
    Function(Function),
    Closure(Closure),
    Upvalue(Upvalue),
    Class(Class),
    Instance(Instance),
    BoundMethod(BoundMethod),
    Native(Native),
    List(List),
}

impl Object {
    /// A rough byte count for this object, used to drive collection
    /// thresholds. The estimate is taken once at allocation time; later
    /// growth (say, appending to a list) isn't tracked per object.
    pub(crate) fn heap_size(&self) -> usize {
        let base = size_of::<Object>();

        let extra = match self {
            Object::String(s) => s.as_str().len(),
            Object::Function(f) => {
                f.chunk().code().len()
                    + f.chunk().constants().len() * size_of::<Value>()
                    + f.chunk().lines().len() * size_of::<u32>()
            }
            Object::Closure(c) => c.upvalues().len() * size_of::<u32>(),
            Object::Class(c) => c.method_count() * 2 * size_of::<u32>(),
            Object::Instance(i) => i.field_count() * 2 * size_of::<u32>(),
            Object::List(l) => l.len() * size_of::<Value>(),
            Object::Upvalue(_)
            | Object::BoundMethod(_)
            | Object::Native(_) => 0,
        };

        base + extra
    }
}

impl Trace for Object {
    fn trace(&self, worklist: &mut WorkList) {
        match self {
            Object::String(_) => {}
            Object::Function(f) => f.trace(worklist),
            Object::Native(n) => n.trace(worklist),
            Object::Closure(c) => c.trace(worklist),
            Object::Upvalue(u) => u.trace(worklist),
            Object::Class(c) => c.trace(worklist),
            Object::Instance(i) => i.trace(worklist),
            Object::BoundMethod(b) => b.trace(worklist),
            Object::List(l) => l.trace(worklist),
        }
    }
}

/// Implemented by each object class so that typed handles can be resolved
/// against the [`Object`] union stored in the arena.
pub(crate) trait Managed: Sized {
    /// Wrap this value up as an [`Object`] for storage.
    fn into_object(self) -> Object;

    /// View an [`Object`] as this class, if that's what it holds.
    fn from_object(object: &Object) -> Option<&Self>;

    /// Mutably view an [`Object`] as this class, if that's what it holds.
    fn from_object_mut(object: &mut Object) -> Option<&mut Self>;
}

/// The `impl Managed` blocks are all identical shapes, so a macro keeps the
/// class files down to the interesting parts.
macro_rules! managed {
    ($class:ident as $variant:ident) => {
        impl crate::memory::Managed for $class {
            fn into_object(self) -> crate::memory::Object {
                crate::memory::Object::$variant(self)
            }

            fn from_object(
                object: &crate::memory::Object,
            ) -> Option<&$class> {
                match object {
                    crate::memory::Object::$variant(it) => Some(it),
                    _ => None,
                }
            }

            fn from_object_mut(
                object: &mut crate::memory::Object,
            ) -> Option<&mut $class> {
                match object {
                    crate::memory::Object::$variant(it) => Some(it),
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use managed;
