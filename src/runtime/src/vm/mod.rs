//! The virtual machine is the heart of how the language executes code.

use std::{
    io::{self, Write},
    rc::Rc,
    time::Instant,
};

use fxhash::FxHashMap;

use bytecode::Constant;

use crate::{
    classes::{self, Closure, NativeFn, Native, Str},
    error::{RuntimeError, RuntimeErrorKind, TraceFrame},
    memory::{Gc, Heap, StringInterner},
    value::Value,
};

mod call_stack;
mod instructions;
mod natives;
mod open_upvalues;
mod value_stack;

pub(crate) use self::{
    call_stack::{CallFrame, CallStack},
    open_upvalues::OpenUpvalues,
};

pub use self::{call_stack::FRAMES_MAX, value_stack::ValueStack};
pub use self::value_stack::STACK_MAX;

/// Knobs an embedder can turn before running anything.
///
/// The defaults collect once a megabyte of objects is live, double the
/// threshold after each collection, and don't stress.
#[derive(Debug, Clone)]
pub struct Options {
    /// How many live bytes the heap reaches before the first collection.
    pub initial_gc_threshold: usize,

    /// After a collection, the next threshold is the surviving bytes times
    /// this factor.
    pub gc_growth_factor: usize,

    /// Collect on every single allocation. Very slow, and very good at
    /// flushing out missing GC roots in tests.
    pub stress_gc: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            initial_gc_threshold: 1024 * 1024,
            gc_growth_factor: 2,
            stress_gc: false,
        }
    }
}

/// The external compiler seam.
///
/// The compiler is not part of this crate; anything that can turn source
/// text into a compiled [`bytecode::Function`] can drive
/// [`VirtualMachine::interpret_source`]. Returning `None` means the
/// compiler found errors (and reported them itself); the machine is left
/// untouched in that case.
pub trait Compile {
    fn compile(&mut self, source: &str) -> Option<bytecode::Function>;
}

/// How a trip through [`VirtualMachine::interpret_source`] ended, with the
/// conventional process exit code for drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    Ok,
    CompileError,
    RuntimeError,
}

impl Interpretation {
    /// The conventional exit code for a driver to end with.
    pub fn exit_code(self) -> i32 {
        match self {
            Interpretation::Ok => 0,
            Interpretation::CompileError => 65,
            Interpretation::RuntimeError => 70,
        }
    }
}

/// A struct that manages an instance of the language runtime.
///
/// Dropping the machine frees everything it owns: the heap, the globals,
/// and the interned strings.
pub struct VirtualMachine {
    // VM
    pub(crate) value_stack: ValueStack,
    pub(crate) call_stack: CallStack,
    pub(crate) open_upvalues: OpenUpvalues,

    // Heap
    pub(crate) heap: Heap,
    pub(crate) strings: StringInterner,
    pub(crate) globals: FxHashMap<Gc<Str>, Value>,

    /// The interned name of initializer methods, kept at hand (and kept
    /// alive) because every constructor call looks it up.
    pub(crate) init_string: Gc<Str>,

    pub(crate) options: Options,
    pub(crate) started_at: Instant,
    pub(crate) out: Box<dyn Write>,
}

impl Default for VirtualMachine {
    fn default() -> VirtualMachine {
        VirtualMachine::new()
    }
}

impl VirtualMachine {
    /// A new machine with default [`Options`], writing program output to
    /// stdout.
    pub fn new() -> VirtualMachine {
        VirtualMachine::with_options(Options::default())
    }

    /// A new machine with the given [`Options`].
    pub fn with_options(options: Options) -> VirtualMachine {
        let mut heap = Heap::new(options.initial_gc_threshold);
        let mut strings = StringInterner::default();

        let init_string =
            VirtualMachine::intern_in(&mut heap, &mut strings, "init");

        let mut vm = VirtualMachine {
            value_stack: ValueStack::default(),
            call_stack: CallStack::default(),
            open_upvalues: OpenUpvalues::default(),
            heap,
            strings,
            globals: FxHashMap::default(),
            init_string,
            options,
            started_at: Instant::now(),
            out: Box::new(io::stdout()),
        };

        natives::install(&mut vm);
        vm
    }

    /// Redirect program output (the `print` statements) somewhere other
    /// than stdout.
    pub fn with_output(mut self, out: Box<dyn Write>) -> VirtualMachine {
        self.out = out;
        self
    }

    /// Compile and run some source text, reporting any runtime error to
    /// stderr the way a command-line driver would.
    pub fn interpret_source(
        &mut self,
        compiler: &mut impl Compile,
        source: &str,
    ) -> Interpretation {
        let Some(script) = compiler.compile(source) else {
            return Interpretation::CompileError;
        };

        match self.interpret(script) {
            Ok(()) => Interpretation::Ok,
            Err(error) => {
                let _ = writeln!(io::stderr(), "{}", error);
                Interpretation::RuntimeError
            }
        }
    }

    /// Run a compiled script to completion.
    ///
    /// The machine survives errors: a failed script resets the stacks but
    /// leaves globals and interned strings alone, so interpreting again is
    /// fine (that's what a REPL does).
    pub fn interpret(
        &mut self,
        script: bytecode::Function,
    ) -> Result<(), RuntimeError> {
        let function = self.inflate_function(&script);

        // The fresh function is kept visible on the stack while the
        // closure wrapping it is allocated, then replaced by it.
        self.value_stack.push(Value::from(function));
        let closure = self.allocate(Closure::new(function));
        self.value_stack.set_from_top(0, Value::from(closure));

        if let Err(kind) = self.call_closure(closure, 0) {
            return Err(self.throw(kind));
        }

        self.run()
    }

    /// Register a native function under a global name.
    pub fn define_native(&mut self, name: &str, function: NativeFn) {
        let name = self.intern(name);

        // The name is only reachable from here until it lands in the
        // globals table, so pin it across the allocation.
        self.heap.push_transient(Value::from(name));
        let native = self.allocate(Native::new(name, function));
        self.heap.pop_transient();

        self.globals.insert(name, Value::from(native));
    }
}

impl VirtualMachine {
    /// The canonical string object for some content, allocating (and
    /// possibly collecting) only if this content has never been seen.
    pub(crate) fn intern(&mut self, content: &str) -> Gc<Str> {
        if let Some(existing) = self.strings.lookup(content) {
            return existing;
        }

        if self.options.stress_gc || self.heap.should_collect() {
            self.collect_garbage();
        }

        VirtualMachine::intern_in(&mut self.heap, &mut self.strings, content)
    }

    fn intern_in(
        heap: &mut Heap,
        strings: &mut StringInterner,
        content: &str,
    ) -> Gc<Str> {
        if let Some(existing) = strings.lookup(content) {
            return existing;
        }

        let chars: Rc<str> = Rc::from(content);
        let string = heap.alloc(Str::new(chars.clone()));
        strings.insert(chars, string);
        string
    }

    /// Turn a compiled function into a live one: intern its string
    /// constants, recursively inflate its nested functions, and allocate
    /// the result.
    ///
    /// Everything inflated along the way is pinned as a transient root, so
    /// a collection triggered partway through can't eat the constants that
    /// nothing else refers to yet.
    pub(crate) fn inflate_function(
        &mut self,
        proto: &bytecode::Function,
    ) -> Gc<classes::Function> {
        let depth = self.heap.transient_depth();

        let name = proto.name().map(|name| {
            let gc = self.intern(name);
            self.heap.push_transient(Value::from(gc));
            gc
        });

        let mut constants =
            Vec::with_capacity(proto.chunk().constants().len());

        for constant in proto.chunk().constants() {
            let value = match constant {
                Constant::Number(n) => Value::Number(*n),
                Constant::String(s) => Value::from(self.intern(s)),
                Constant::Function(f) => {
                    Value::from(self.inflate_function(f))
                }
            };

            self.heap.push_transient(value);
            constants.push(value);
        }

        let chunk = classes::Chunk::new(
            proto.chunk().code().to_vec(),
            constants,
            proto.chunk().lines().to_vec(),
        );

        let function = self.allocate(classes::Function::new(
            name,
            proto.arity(),
            proto.upvalue_count(),
            chunk,
        ));

        self.heap.truncate_transients(depth);
        function
    }

    /// Raise a fatal runtime error: capture the stack trace while the
    /// frames are still standing, then reset the machine.
    pub(crate) fn throw(&mut self, kind: RuntimeErrorKind) -> RuntimeError {
        let trace = self.capture_stack_trace();
        self.reset();
        RuntimeError::new(kind, trace)
    }

    fn capture_stack_trace(&self) -> Vec<TraceFrame> {
        self.call_stack
            .iter()
            .map(|frame| {
                let function = self.heap.get(frame.function);

                // ip has advanced past the instruction that failed; the
                // line map is per byte, so backing up one lands within it.
                let offset = frame.ip.saturating_sub(1);
                let line = function.chunk().line_of(offset);

                let name = function
                    .name()
                    .map(|gc| self.heap.get(gc).as_str().to_string());

                TraceFrame { line, function: name }
            })
            .collect()
    }

    fn reset(&mut self) {
        self.value_stack.clear();
        self.call_stack.clear();
        self.open_upvalues.clear();
    }

    /// The name behind an interned handle, as owned text for a diagnostic.
    pub(crate) fn name_text(&self, name: Gc<Str>) -> String {
        self.heap.get(name).as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use bytecode::Op;
    use common::Index;

    use super::*;

    fn empty_script() -> bytecode::Function {
        let mut script = bytecode::Function::script();
        let chunk = script.chunk_mut();
        chunk.write_op(Op::Nil, 1);
        chunk.write_op(Op::Return, 1);
        script
    }

    #[test]
    fn interpret_leaves_the_machine_idle() {
        let mut vm = VirtualMachine::new();
        vm.interpret(empty_script()).unwrap();

        assert!(vm.value_stack.is_empty());
        assert!(vm.call_stack.is_empty());
        assert_eq!(vm.open_upvalues.len(), 0);
    }

    #[test]
    fn interpret_twice_on_one_machine() {
        let mut vm = VirtualMachine::new();
        vm.interpret(empty_script()).unwrap();
        vm.interpret(empty_script()).unwrap();

        assert!(vm.value_stack.is_empty());
        assert!(vm.call_stack.is_empty());
    }

    #[test]
    fn interning_gives_identity_for_equal_content() {
        let mut vm = VirtualMachine::new();

        let a = vm.intern("hello");
        let b = vm.intern("hello");
        let c = vm.intern("other");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn capture_shares_cells_and_keeps_them_sorted() {
        let mut vm = VirtualMachine::new();
        vm.value_stack.push(Value::Number(1.0));
        vm.value_stack.push(Value::Number(2.0));

        let high = vm.capture_upvalue(Index::new(1));
        let low = vm.capture_upvalue(Index::new(0));
        let again = vm.capture_upvalue(Index::new(1));

        assert_eq!(high, again);
        assert_ne!(high, low);
        assert_eq!(vm.open_upvalues.len(), 2);
        assert!(vm.open_upvalues.is_sorted(&vm.heap));
    }

    #[test]
    fn closing_moves_values_into_cells() {
        use crate::classes::UpvalueState;

        let mut vm = VirtualMachine::new();
        vm.value_stack.push(Value::Number(1.0));
        vm.value_stack.push(Value::Number(2.0));

        let low = vm.capture_upvalue(Index::new(0));
        let high = vm.capture_upvalue(Index::new(1));

        vm.close_upvalues_from(Index::new(1));

        assert_eq!(vm.open_upvalues.len(), 1);
        assert!(vm.heap.get(low).open_slot().is_some());

        match vm.heap.get(high).state() {
            UpvalueState::Closed(value) => {
                assert_eq!(value, Value::Number(2.0));
            }
            UpvalueState::Open(_) => panic!("cell should have closed"),
        }
    }

    #[test]
    fn collection_reclaims_unreachable_objects() {
        let mut vm = VirtualMachine::new();
        let baseline = vm.heap.live_objects();

        for i in 0..100 {
            vm.intern(&format!("garbage-{}", i));
        }
        assert!(vm.heap.live_objects() > baseline);

        vm.collect_garbage();
        assert_eq!(vm.heap.live_objects(), baseline);
    }

    #[test]
    fn collection_keeps_everything_reachable() {
        let mut vm = VirtualMachine::new();

        let keep = vm.intern("keep");
        vm.value_stack.push(Value::from(keep));
        vm.collect_garbage();

        assert_eq!(vm.heap.get(keep).as_str(), "keep");
        assert_eq!(vm.strings.lookup("keep"), Some(keep));
    }

    #[test]
    fn swept_strings_can_be_interned_again() {
        let mut vm = VirtualMachine::new();

        let first = vm.intern("fleeting");
        vm.collect_garbage();

        let second = vm.intern("fleeting");
        assert_eq!(vm.heap.get(second).as_str(), "fleeting");
        let _ = first;
    }
}
