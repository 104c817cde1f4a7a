//! The virtual machine's big dispatch loop.

use std::io::Write;

use bytecode::Op;
use common::Index;

use crate::{
    classes::{
        BoundMethod, Class, Closure, Instance, List, Native, Str, Upvalue,
        UpvalueState,
    },
    error::{RuntimeError, RuntimeErrorKind},
    memory::{Gc, Managed},
    value::Value,
    vm::{CallFrame, ValueStack, VirtualMachine, FRAMES_MAX},
};

impl VirtualMachine {
    /// Run the loaded script until the outermost frame returns or something
    /// goes fatally wrong.
    pub(crate) fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            #[cfg(feature = "trace")]
            self.trace_instruction();

            let op = self.fetch();

            let result = match op {
                Op::Constant => {
                    let value = self.read_constant();
                    self.value_stack.push(value);
                    Ok(())
                }
                Op::Nil => {
                    self.value_stack.push(Value::Nil);
                    Ok(())
                }
                Op::True => {
                    self.value_stack.push(Value::Bool(true));
                    Ok(())
                }
                Op::False => {
                    self.value_stack.push(Value::Bool(false));
                    Ok(())
                }
                Op::Pop => {
                    self.value_stack.pop();
                    Ok(())
                }

                Op::GetLocal => self.op_get_local(),
                Op::SetLocal => self.op_set_local(),
                Op::GetGlobal => self.op_get_global(),
                Op::DefineGlobal => self.op_define_global(),
                Op::SetGlobal => self.op_set_global(),
                Op::GetUpvalue => self.op_get_upvalue(),
                Op::SetUpvalue => self.op_set_upvalue(),

                Op::GetProperty => self.op_get_property(),
                Op::SetProperty => self.op_set_property(),
                Op::GetSuper => self.op_get_super(),

                Op::Equal => self.op_equal(),
                Op::Greater => {
                    self.binary_number_op(|a, b| Value::Bool(a > b))
                }
                Op::Less => {
                    self.binary_number_op(|a, b| Value::Bool(a < b))
                }

                Op::Add => self.op_add(),
                Op::Subtract => {
                    self.binary_number_op(|a, b| Value::Number(a - b))
                }
                Op::Multiply => {
                    self.binary_number_op(|a, b| Value::Number(a * b))
                }
                Op::Divide => {
                    self.binary_number_op(|a, b| Value::Number(a / b))
                }

                Op::Not => self.op_not(),
                Op::Negate => self.op_negate(),

                Op::Print => self.op_print(false),
                Op::Println => self.op_print(true),

                Op::Jump => self.op_jump(),
                Op::JumpIfFalse => self.op_jump_if_false(),
                Op::Loop => self.op_loop(),

                Op::Call => self.op_call(),
                Op::Invoke => self.op_invoke(),
                Op::SuperInvoke => self.op_super_invoke(),
                Op::Closure => self.op_closure(),
                Op::CloseUpvalue => self.op_close_upvalue(),

                Op::ListInit => self.op_list_init(),
                Op::ListGetIndex => self.op_list_get_index(),
                Op::ListSetIndex => self.op_list_set_index(),

                Op::Return => {
                    if self.op_return() {
                        return Ok(());
                    }
                    Ok(())
                }

                Op::Class => self.op_class(),
                Op::Inherit => self.op_inherit(),
                Op::Method => self.op_method(),
            };

            if let Err(kind) = result {
                return Err(self.throw(kind));
            }
        }
    }

    /// Read the opcode under the cursor and advance past it.
    #[inline]
    fn fetch(&mut self) -> Op {
        let byte = self.read_byte();
        Op::from_byte(byte).expect("invalid opcode in chunk")
    }

    /// Read the byte under the cursor and advance past it.
    #[inline]
    fn read_byte(&mut self) -> u8 {
        let frame = self.call_stack.frame_mut();
        let ip = frame.ip;
        frame.ip += 1;
        let function = frame.function;

        self.heap.get(function).chunk().code()[ip]
    }

    /// Read a big-endian 2-byte operand.
    #[inline]
    fn read_short(&mut self) -> u16 {
        let hi = self.read_byte();
        let lo = self.read_byte();
        u16::from_be_bytes([hi, lo])
    }

    /// Read a 1-byte constant index and load the constant.
    #[inline]
    fn read_constant(&mut self) -> Value {
        let index = self.read_byte() as usize;
        let function = self.call_stack.frame().function;

        self.heap.get(function).chunk().constants()[index]
    }

    /// Read a constant that the compiler guarantees is a name.
    #[inline]
    fn read_string(&mut self) -> Gc<Str> {
        let constant = self.read_constant();

        self.downcast_value::<Str>(constant)
            .expect("name operand must be a string constant")
    }

    /// View a value as a handle to a `T`, if that's what it is.
    #[inline]
    pub(crate) fn downcast_value<T: Managed>(
        &self,
        value: Value,
    ) -> Option<Gc<T>> {
        value.as_obj().and_then(|any| self.heap.downcast::<T>(any))
    }

    #[cfg(feature = "trace")]
    fn trace_instruction(&self) {
        let frame = self.call_stack.frame();
        let code = self.heap.get(frame.function).chunk().code();
        let op = code.get(frame.ip).copied().and_then(Op::from_byte);

        log::trace!(
            "{:04} {:?} (frames {}, stack {})",
            frame.ip,
            op,
            self.call_stack.len(),
            self.value_stack.len(),
        );
    }
}

// Variables.
impl VirtualMachine {
    #[inline]
    fn op_get_local(&mut self) -> Result<(), RuntimeErrorKind> {
        let slot = self.read_byte();
        let index = self.call_stack.frame().base.offset(slot as usize);

        let value = self
            .value_stack
            .get(index)
            .expect("local slot past end of stack");

        self.value_stack.push(value);
        Ok(())
    }

    #[inline]
    fn op_set_local(&mut self) -> Result<(), RuntimeErrorKind> {
        let slot = self.read_byte();
        let index = self.call_stack.frame().base.offset(slot as usize);
        let value = self.value_stack.get_from_top(0);

        self.value_stack.set(index, value);
        Ok(())
    }

    #[inline]
    fn op_get_global(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();

        let Some(value) = self.globals.get(&name).copied() else {
            return Err(RuntimeErrorKind::UndefinedSymbol(
                self.name_text(name),
            ));
        };

        self.value_stack.push(value);
        Ok(())
    }

    #[inline]
    fn op_define_global(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let value = self.value_stack.get_from_top(0);

        self.globals.insert(name, value);
        self.value_stack.pop();
        Ok(())
    }

    #[inline]
    fn op_set_global(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let value = self.value_stack.get_from_top(0);

        // Assignment requires a prior definition. Insert-then-remove keeps
        // this a single table lookup on the happy path.
        if self.globals.insert(name, value).is_none() {
            self.globals.remove(&name);
            return Err(RuntimeErrorKind::UndefinedVariable(
                self.name_text(name),
            ));
        }

        Ok(())
    }

    #[inline]
    fn op_get_upvalue(&mut self) -> Result<(), RuntimeErrorKind> {
        let slot = self.read_byte();
        let closure = self.call_stack.frame().closure;
        let cell = self.heap.get(closure).upvalue(slot);

        let value = match self.heap.get(cell).state() {
            UpvalueState::Open(index) => self
                .value_stack
                .get(index)
                .expect("open upvalue aliases a dead slot"),
            UpvalueState::Closed(value) => value,
        };

        self.value_stack.push(value);
        Ok(())
    }

    #[inline]
    fn op_set_upvalue(&mut self) -> Result<(), RuntimeErrorKind> {
        let slot = self.read_byte();
        let value = self.value_stack.get_from_top(0);
        let closure = self.call_stack.frame().closure;
        let cell = self.heap.get(closure).upvalue(slot);

        match self.heap.get(cell).state() {
            UpvalueState::Open(index) => self.value_stack.set(index, value),
            UpvalueState::Closed(_) => {
                self.heap.get_mut(cell).set_closed(value)
            }
        }

        Ok(())
    }
}

// Properties.
impl VirtualMachine {
    #[inline]
    fn op_get_property(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let receiver = self.value_stack.get_from_top(0);

        let Some(instance) = self.downcast_value::<Instance>(receiver)
        else {
            return Err(RuntimeErrorKind::OnlyInstancesHaveProperties);
        };

        // A field shadows any method of the same name.
        if let Some(value) = self.heap.get(instance).field(name) {
            self.value_stack.set_from_top(0, value);
            return Ok(());
        }

        let class = self.heap.get(instance).class();
        self.bind_method(class, name)
    }

    #[inline]
    fn op_set_property(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let target = self.value_stack.get_from_top(1);

        let Some(instance) = self.downcast_value::<Instance>(target) else {
            return Err(RuntimeErrorKind::OnlyInstancesHaveFields);
        };

        let value = self.value_stack.get_from_top(0);
        self.heap.get_mut(instance).set_field(name, value);

        // The assigned value is the expression's result; the instance
        // under it goes away.
        self.value_stack.set_from_top(1, value);
        self.value_stack.pop();
        Ok(())
    }

    #[inline]
    fn op_get_super(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();

        let superclass = self
            .downcast_value::<Class>(self.value_stack.get_from_top(0))
            .expect("super lookup target must be a class");
        self.value_stack.pop();

        self.bind_method(superclass, name)
    }

    /// Replace the receiver on top of the stack with the named method of
    /// `class` bound to it.
    fn bind_method(
        &mut self,
        class: Gc<Class>,
        name: Gc<Str>,
    ) -> Result<(), RuntimeErrorKind> {
        let Some(method) = self.heap.get(class).method(name) else {
            return Err(RuntimeErrorKind::UndefinedProperty(
                self.name_text(name),
            ));
        };

        let receiver = self.value_stack.get_from_top(0);
        let bound = self.allocate(BoundMethod::new(receiver, method));

        self.value_stack.set_from_top(0, Value::from(bound));
        Ok(())
    }
}

// Arithmetic and logic.
impl VirtualMachine {
    /// Perform a binary operation over the two numbers on top of the
    /// stack, replacing them with the result the constructor builds.
    #[inline]
    fn binary_number_op<F>(&mut self, op: F) -> Result<(), RuntimeErrorKind>
    where
        F: FnOnce(f64, f64) -> Value,
    {
        let rhs = self.value_stack.get_from_top(0).as_number();
        let lhs = self.value_stack.get_from_top(1).as_number();

        match (lhs, rhs) {
            (Some(a), Some(b)) => {
                self.value_stack.set_from_top(1, op(a, b));
                self.value_stack.pop();
                Ok(())
            }
            _ => Err(RuntimeErrorKind::OperandsMustBeNumbers),
        }
    }

    #[inline]
    fn op_equal(&mut self) -> Result<(), RuntimeErrorKind> {
        let b = self.value_stack.get_from_top(0);
        let a = self.value_stack.get_from_top(1);

        self.value_stack.set_from_top(1, Value::Bool(a == b));
        self.value_stack.pop();
        Ok(())
    }

    /// Addition is overloaded: numbers add, strings concatenate (and the
    /// result is interned like every other string).
    #[inline]
    fn op_add(&mut self) -> Result<(), RuntimeErrorKind> {
        let rhs = self.value_stack.get_from_top(0);
        let lhs = self.value_stack.get_from_top(1);

        let strings = (
            self.downcast_value::<Str>(lhs),
            self.downcast_value::<Str>(rhs),
        );

        if let (Some(a), Some(b)) = strings {
            let text = format!(
                "{}{}",
                self.heap.get(a).as_str(),
                self.heap.get(b).as_str()
            );

            // The operands stay on the stack until the result replaces
            // them, so a collection here can't reclaim them.
            let result = self.intern(&text);
            self.value_stack.set_from_top(1, Value::from(result));
            self.value_stack.pop();
            return Ok(());
        }

        if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
            self.value_stack.set_from_top(1, Value::Number(a + b));
            self.value_stack.pop();
            return Ok(());
        }

        Err(RuntimeErrorKind::AddOperandsMismatched)
    }

    #[inline]
    fn op_not(&mut self) -> Result<(), RuntimeErrorKind> {
        let value = self.value_stack.get_from_top(0);
        self.value_stack.set_from_top(0, Value::Bool(value.is_falsy()));
        Ok(())
    }

    #[inline]
    fn op_negate(&mut self) -> Result<(), RuntimeErrorKind> {
        let Some(n) = self.value_stack.get_from_top(0).as_number() else {
            return Err(RuntimeErrorKind::OperandMustBeNumber);
        };

        self.value_stack.set_from_top(0, Value::Number(-n));
        Ok(())
    }

    fn op_print(&mut self, newline: bool) -> Result<(), RuntimeErrorKind> {
        let value = self.value_stack.get_from_top(0);
        let text = self.heap.show(value);
        self.value_stack.pop();

        let result = if newline {
            writeln!(self.out, "{}", text)
        } else {
            write!(self.out, "{}", text)
        };

        // A failed write to the output sink is not a language-level
        // error.
        let _ = result;
        Ok(())
    }
}

// Branching.
impl VirtualMachine {
    #[inline]
    fn op_jump(&mut self) -> Result<(), RuntimeErrorKind> {
        let offset = self.read_short() as usize;
        self.call_stack.frame_mut().ip += offset;
        Ok(())
    }

    #[inline]
    fn op_jump_if_false(&mut self) -> Result<(), RuntimeErrorKind> {
        let offset = self.read_short() as usize;

        // The condition is inspected, not popped; the compiler emits the
        // pops on both sides of the branch.
        if self.value_stack.get_from_top(0).is_falsy() {
            self.call_stack.frame_mut().ip += offset;
        }

        Ok(())
    }

    #[inline]
    fn op_loop(&mut self) -> Result<(), RuntimeErrorKind> {
        let offset = self.read_short() as usize;
        self.call_stack.frame_mut().ip -= offset;
        Ok(())
    }
}

// Calls and dispatch.
impl VirtualMachine {
    #[inline]
    fn op_call(&mut self) -> Result<(), RuntimeErrorKind> {
        let argc = self.read_byte();
        let callee = self.value_stack.get_from_top(argc as usize);
        self.call_value(callee, argc)
    }

    #[inline]
    fn op_invoke(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let argc = self.read_byte();
        self.invoke(name, argc)
    }

    #[inline]
    fn op_super_invoke(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let argc = self.read_byte();

        let superclass = self
            .downcast_value::<Class>(self.value_stack.get_from_top(0))
            .expect("super invoke target must be a class");
        self.value_stack.pop();

        self.invoke_from_class(superclass, name, argc)
    }

    /// Call any value, dispatching on what it is. `argc` arguments are on
    /// the stack above it.
    pub(crate) fn call_value(
        &mut self,
        callee: Value,
        argc: u8,
    ) -> Result<(), RuntimeErrorKind> {
        let Some(any) = callee.as_obj() else {
            return Err(RuntimeErrorKind::NotCallable);
        };

        if let Some(closure) = self.heap.downcast::<Closure>(any) {
            return self.call_closure(closure, argc);
        }

        if let Some(bound) = self.heap.downcast::<BoundMethod>(any) {
            let (receiver, method) = {
                let bound = self.heap.get(bound);
                (bound.receiver(), bound.method())
            };

            // The receiver takes the callee slot, where the method body
            // expects to find `this`.
            self.value_stack.set_from_top(argc as usize, receiver);
            return self.call_closure(method, argc);
        }

        if let Some(class) = self.heap.downcast::<Class>(any) {
            return self.call_class(class, argc);
        }

        if let Some(native) = self.heap.downcast::<Native>(any) {
            return self.call_native(native, argc);
        }

        Err(RuntimeErrorKind::NotCallable)
    }

    /// Enter a closure: check arity and frame depth, then push the frame.
    pub(crate) fn call_closure(
        &mut self,
        closure: Gc<Closure>,
        argc: u8,
    ) -> Result<(), RuntimeErrorKind> {
        let function = self.heap.get(closure).function();
        let arity = self.heap.get(function).arity();

        if argc != arity {
            return Err(RuntimeErrorKind::ArityMismatch {
                expected: arity,
                found: argc,
            });
        }

        if self.call_stack.len() == FRAMES_MAX {
            return Err(RuntimeErrorKind::StackOverflow);
        }

        let base = self.value_stack.index_from_top(argc as usize);
        self.call_stack.push(CallFrame::new(closure, function, base));
        Ok(())
    }

    /// A class used as a function is a constructor call.
    fn call_class(
        &mut self,
        class: Gc<Class>,
        argc: u8,
    ) -> Result<(), RuntimeErrorKind> {
        // The class is still in the callee slot while the instance is
        // allocated, so it stays rooted; then the instance replaces it.
        let instance = self.allocate(Instance::new(class));
        self.value_stack
            .set_from_top(argc as usize, Value::from(instance));

        if let Some(initializer) =
            self.heap.get(class).method(self.init_string)
        {
            return self.call_closure(initializer, argc);
        }

        if argc != 0 {
            return Err(RuntimeErrorKind::ArityMismatch {
                expected: 0,
                found: argc,
            });
        }

        Ok(())
    }

    fn call_native(
        &mut self,
        native: Gc<Native>,
        argc: u8,
    ) -> Result<(), RuntimeErrorKind> {
        let function = self.heap.get(native).function();

        // The arguments are copied out but stay on the stack (and so stay
        // rooted) until the native returns.
        let args = self.value_stack.top_n(argc as usize).to_vec();
        let result = function(self, &args)?;

        self.value_stack.truncate_by(argc as usize + 1);
        self.value_stack.push(result);
        Ok(())
    }

    /// Property-lookup-and-call without materializing a bound method.
    fn invoke(
        &mut self,
        name: Gc<Str>,
        argc: u8,
    ) -> Result<(), RuntimeErrorKind> {
        let receiver = self.value_stack.get_from_top(argc as usize);

        let Some(instance) = self.downcast_value::<Instance>(receiver)
        else {
            return Err(RuntimeErrorKind::OnlyInstancesHaveMethods);
        };

        // A field shadows any method of the same name, and might hold
        // anything callable.
        if let Some(field) = self.heap.get(instance).field(name) {
            self.value_stack.set_from_top(argc as usize, field);
            return self.call_value(field, argc);
        }

        let class = self.heap.get(instance).class();
        self.invoke_from_class(class, name, argc)
    }

    /// Method dispatch against a known class, with no field shadowing.
    /// This is what `super` calls use.
    fn invoke_from_class(
        &mut self,
        class: Gc<Class>,
        name: Gc<Str>,
        argc: u8,
    ) -> Result<(), RuntimeErrorKind> {
        let Some(method) = self.heap.get(class).method(name) else {
            return Err(RuntimeErrorKind::UndefinedProperty(
                self.name_text(name),
            ));
        };

        self.call_closure(method, argc)
    }

    /// Return from the current frame. The result is `true` when the
    /// outermost frame returned and the program is over.
    fn op_return(&mut self) -> bool {
        let base = self.call_stack.frame().base;
        let result = self.value_stack.get_from_top(0);

        // Any local this frame still has captured moves into its cell.
        self.close_upvalues_from(base);
        self.call_stack.pop();

        self.value_stack.truncate_to(base);

        if self.call_stack.is_empty() {
            true
        } else {
            self.value_stack.push(result);
            false
        }
    }
}

// Closures and upvalues.
impl VirtualMachine {
    fn op_closure(&mut self) -> Result<(), RuntimeErrorKind> {
        let constant = self.read_constant();

        let function = self
            .downcast_value::<crate::classes::Function>(constant)
            .expect("closure operand must be a function constant");

        let closure = self.allocate(Closure::new(function));
        self.value_stack.push(Value::from(closure));

        // With the closure visible on the stack, wire up its captures: a
        // 2-byte descriptor per upvalue, either a local slot of this frame
        // or one of this frame's own upvalues to share.
        let count = self.heap.get(function).upvalue_count();

        for _ in 0..count {
            let is_local = self.read_byte() != 0;
            let index = self.read_byte();

            let cell = if is_local {
                let slot =
                    self.call_stack.frame().base.offset(index as usize);
                self.capture_upvalue(slot)
            } else {
                let enclosing = self.call_stack.frame().closure;
                self.heap.get(enclosing).upvalue(index)
            };

            self.heap.get_mut(closure).push_upvalue(cell);
        }

        Ok(())
    }

    #[inline]
    fn op_close_upvalue(&mut self) -> Result<(), RuntimeErrorKind> {
        let top = self.value_stack.index_from_top(0);
        self.close_upvalues_from(top);
        self.value_stack.pop();
        Ok(())
    }

    /// The upvalue cell for a stack slot, reusing an existing open cell so
    /// that every closure capturing a variable shares one.
    pub(crate) fn capture_upvalue(
        &mut self,
        slot: Index<ValueStack>,
    ) -> Gc<Upvalue> {
        match self.open_upvalues.find(slot, &self.heap) {
            Ok(existing) => existing,
            Err(position) => {
                let cell = self.allocate(Upvalue::open(slot));
                self.open_upvalues.insert(position, cell);

                debug_assert!(self.open_upvalues.is_sorted(&self.heap));
                cell
            }
        }
    }

    /// Close every open upvalue aliasing a slot at or above `slot`,
    /// copying the captured variables off the stack and into their cells.
    pub(crate) fn close_upvalues_from(&mut self, slot: Index<ValueStack>) {
        while let Some(cell) =
            self.open_upvalues.pop_if_at_or_above(slot, &self.heap)
        {
            let stack_slot = self
                .heap
                .get(cell)
                .open_slot()
                .expect("cell from the open list must be open");

            let value = self
                .value_stack
                .get(stack_slot)
                .expect("open upvalue aliases a dead slot");

            self.heap.get_mut(cell).close(value);
        }
    }
}

// Lists.
impl VirtualMachine {
    fn op_list_init(&mut self) -> Result<(), RuntimeErrorKind> {
        let count = self.read_byte() as usize;

        // The elements stay on the stack through the allocation, then the
        // new list replaces them.
        let elements = self.value_stack.top_n(count).to_vec();
        let list = self.allocate(List::new(elements));
        let value = Value::from(list);

        if count > 0 {
            self.value_stack.set_from_top(count - 1, value);
            self.value_stack.truncate_by(count - 1);
        } else {
            self.value_stack.push(value);
        }

        Ok(())
    }

    #[inline]
    fn op_list_get_index(&mut self) -> Result<(), RuntimeErrorKind> {
        let index_value = self.value_stack.get_from_top(0);
        let list_value = self.value_stack.get_from_top(1);

        let Some(list) = self.downcast_value::<List>(list_value) else {
            return Err(RuntimeErrorKind::NotIndexable);
        };

        let Some(index) = index_value.as_number() else {
            return Err(RuntimeErrorKind::ListIndexNotNumber);
        };

        let Some(slot) = self.heap.get(list).slot(index) else {
            return Err(RuntimeErrorKind::ListIndexOutOfRange);
        };

        let element = self.heap.get(list).get(slot);
        self.value_stack.set_from_top(1, element);
        self.value_stack.pop();
        Ok(())
    }

    #[inline]
    fn op_list_set_index(&mut self) -> Result<(), RuntimeErrorKind> {
        let value = self.value_stack.get_from_top(0);
        let index_value = self.value_stack.get_from_top(1);
        let list_value = self.value_stack.get_from_top(2);

        let Some(list) = self.downcast_value::<List>(list_value) else {
            return Err(RuntimeErrorKind::NotIndexable);
        };

        let Some(index) = index_value.as_number() else {
            return Err(RuntimeErrorKind::ListIndexNotNumber);
        };

        let Some(slot) = self.heap.get(list).slot(index) else {
            return Err(RuntimeErrorKind::ListIndexOutOfRange);
        };

        self.heap.get_mut(list).set(slot, value);

        // The assigned value is the expression's result.
        self.value_stack.set_from_top(2, value);
        self.value_stack.pop();
        self.value_stack.pop();
        Ok(())
    }
}

// Classes.
impl VirtualMachine {
    #[inline]
    fn op_class(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();
        let class = self.allocate(Class::new(name));
        self.value_stack.push(Value::from(class));
        Ok(())
    }

    #[inline]
    fn op_inherit(&mut self) -> Result<(), RuntimeErrorKind> {
        let superclass_value = self.value_stack.get_from_top(1);

        let Some(superclass) =
            self.downcast_value::<Class>(superclass_value)
        else {
            return Err(RuntimeErrorKind::SuperclassMustBeClass);
        };

        let subclass = self
            .downcast_value::<Class>(self.value_stack.get_from_top(0))
            .expect("inherit target must be a class");

        // Copy-down inheritance: methods defined on the subclass after
        // this override the copies.
        let methods = self.heap.get(superclass).methods();
        self.heap.get_mut(subclass).inherit(methods);

        self.value_stack.pop();
        Ok(())
    }

    #[inline]
    fn op_method(&mut self) -> Result<(), RuntimeErrorKind> {
        let name = self.read_string();

        let method = self
            .downcast_value::<Closure>(self.value_stack.get_from_top(0))
            .expect("method must be a closure");

        let class = self
            .downcast_value::<Class>(self.value_stack.get_from_top(1))
            .expect("method target must be a class");

        self.heap.get_mut(class).add_method(name, method);
        self.value_stack.pop();
        Ok(())
    }
}
