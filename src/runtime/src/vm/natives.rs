//! The built-in native functions.
//!
//! These are registered as globals when a machine is constructed: `clock`
//! for timing, and `length` / `append` / `delete` for working with lists.
//! Each checks its own arguments and raises runtime errors through the
//! same machinery as the opcodes.

use crate::{
    classes::List,
    error::RuntimeErrorKind,
    value::Value,
    vm::VirtualMachine,
};

/// Register every built-in native on a fresh machine.
pub(crate) fn install(vm: &mut VirtualMachine) {
    vm.define_native("clock", clock);
    vm.define_native("length", length);
    vm.define_native("append", append);
    vm.define_native("delete", delete);
}

/// `clock() -> Number`, seconds since the machine started, as a double.
fn clock(
    vm: &mut VirtualMachine,
    _args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    Ok(Value::Number(vm.started_at.elapsed().as_secs_f64()))
}

/// `length(list) -> Number`, the element count.
fn length(
    vm: &mut VirtualMachine,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    if args.len() != 1 {
        return Err(RuntimeErrorKind::InsufficientArguments {
            need: 1,
            got: args.len(),
        });
    }

    let Some(list) = vm.downcast_value::<List>(args[0]) else {
        return Err(RuntimeErrorKind::LengthOfNonList);
    };

    Ok(Value::Number(vm.heap.get(list).len() as f64))
}

/// `append(list, value) -> Nil`, appends in place.
fn append(
    vm: &mut VirtualMachine,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    if args.len() != 2 {
        return Err(RuntimeErrorKind::InsufficientArguments {
            need: 2,
            got: args.len(),
        });
    }

    let Some(list) = vm.downcast_value::<List>(args[0]) else {
        return Err(RuntimeErrorKind::AppendToNonList);
    };

    vm.heap.get_mut(list).push(args[1]);
    Ok(Value::Nil)
}

/// `delete(list, index) -> Nil`, removes the element at `index` and shifts
/// its successors down.
fn delete(
    vm: &mut VirtualMachine,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    if args.len() != 2 {
        return Err(RuntimeErrorKind::InsufficientArguments {
            need: 2,
            got: args.len(),
        });
    }

    let Some(list) = vm.downcast_value::<List>(args[0]) else {
        return Err(RuntimeErrorKind::DeleteFromNonList);
    };

    let Some(index) = args[1].as_number() else {
        return Err(RuntimeErrorKind::IndexNotANumber);
    };

    let Some(slot) = vm.heap.get(list).slot(index) else {
        return Err(RuntimeErrorKind::IndexOutOfRange);
    };

    vm.heap.get_mut(list).remove(slot);
    Ok(Value::Nil)
}
