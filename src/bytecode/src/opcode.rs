//! A listing of opcodes.
//!
//! Each opcode occupies a single byte in a [`Chunk`][crate::Chunk]'s code
//! stream. Operands follow inline: 1-byte reads for stack slots, constant
//! indices and argument counts, and big-endian 2-byte reads for jump
//! offsets.

/// These are the individual instructions that the VM interprets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    // ## Constants and literals

    /// Push the constant at the 1-byte index that follows.
    Constant = 0,

    /// Push `nil`.
    Nil,

    /// Push the boolean `true`.
    True,

    /// Push the boolean `false`.
    False,

    // ## Stack manipulation

    /// Discard the value on the top of the stack.
    Pop,

    // ## Variables

    /// Push a copy of the local in the 1-byte slot that follows. Slots are
    /// relative to the current frame's base; slot 0 holds the callee.
    GetLocal,

    /// Store the top of the stack (without popping it) into a local slot.
    SetLocal,

    /// Look a name up in the globals table and push its value. The 1-byte
    /// operand indexes a string constant.
    GetGlobal,

    /// Define a global under the named constant, then pop the value.
    /// Redefinition is allowed.
    DefineGlobal,

    /// Assign the top of the stack (without popping it) to an
    /// already-defined global.
    SetGlobal,

    /// Push the value of the upvalue in the 1-byte slot that follows.
    GetUpvalue,

    /// Store the top of the stack (without popping it) through an upvalue.
    SetUpvalue,

    // ## Properties

    /// Read a field or bind a method from the instance on top of the stack.
    GetProperty,

    /// Stack is `[instance, value]`; store the field and leave `value`.
    SetProperty,

    /// Pop a superclass and push the named method bound to the receiver
    /// below it.
    GetSuper,

    // ## Comparison

    /// Pop two values, push whether they're equal.
    Equal,

    /// Pop two numbers, push whether the lower is greater.
    Greater,

    /// Pop two numbers, push whether the lower is lesser.
    Less,

    // ## Arithmetic

    /// Add two numbers, or concatenate two strings.
    Add,

    /// Binary subtraction.
    Subtract,

    /// Binary multiplication.
    Multiply,

    /// Binary division.
    Divide,

    // ## Logic

    /// Replace the top of the stack with its logical negation.
    Not,

    /// Negate the number on top of the stack.
    Negate,

    // ## Output

    /// Pop and print the top of the stack, without a newline.
    Print,

    /// Pop and print the top of the stack, with a newline.
    Println,

    // ## Branching

    /// Jump forward by the big-endian 2-byte offset that follows.
    Jump,

    /// Jump forward if the top of the stack is falsy. The condition is
    /// inspected, not popped.
    JumpIfFalse,

    /// Jump backward by the big-endian 2-byte offset that follows.
    Loop,

    // ## Calls

    /// Call the value below the 1-byte count of arguments that follows.
    Call,

    /// Combined property-lookup-and-call. Operands are a string constant
    /// index and a 1-byte argument count.
    Invoke,

    /// Like [`Op::Invoke`], but the method is resolved on a popped
    /// superclass rather than the receiver's own class.
    SuperInvoke,

    /// Instantiate the function constant whose index follows as a closure.
    /// For each upvalue, two descriptor bytes follow: `(is_local, index)`.
    Closure,

    /// Close the top stack slot's upvalue and pop the slot.
    CloseUpvalue,

    // ## Lists

    /// Replace the top `n` stack values (1-byte operand) with a new list of
    /// them, in order.
    ListInit,

    /// Stack is `[list, index]`; replace both with the element.
    ListGetIndex,

    /// Stack is `[list, index, value]`; store and leave `value`.
    ListSetIndex,

    // ## Functions and classes

    /// Return from the current function, leaving its result for the caller.
    Return,

    /// Push a new class named by the string constant that follows.
    Class,

    /// Stack is `[superclass, subclass]`; copy the superclass's methods down
    /// into the subclass, then pop the subclass.
    Inherit,

    /// Stack is `[class, closure]`; install the closure as a method under
    /// the named constant, then pop it.
    Method,
}

impl Op {
    /// Decode a byte back into an [`Op`], if it is one.
    pub fn from_byte(byte: u8) -> Option<Op> {
        use Op::*;

        Some(match byte {
            0 => Constant,
            1 => Nil,
            2 => True,
            3 => False,
            4 => Pop,
            5 => GetLocal,
            6 => SetLocal,
            7 => GetGlobal,
            8 => DefineGlobal,
            9 => SetGlobal,
            10 => GetUpvalue,
            11 => SetUpvalue,
            12 => GetProperty,
            13 => SetProperty,
            14 => GetSuper,
            15 => Equal,
            16 => Greater,
            17 => Less,
            18 => Add,
            19 => Subtract,
            20 => Multiply,
            21 => Divide,
            22 => Not,
            23 => Negate,
            24 => Print,
            25 => Println,
            26 => Jump,
            27 => JumpIfFalse,
            28 => Loop,
            29 => Call,
            30 => Invoke,
            31 => SuperInvoke,
            32 => Closure,
            33 => CloseUpvalue,
            34 => ListInit,
            35 => ListGetIndex,
            36 => ListSetIndex,
            37 => Return,
            38 => Class,
            39 => Inherit,
            40 => Method,
            _ => return None,
        })
    }
}

impl From<Op> for u8 {
    fn from(op: Op) -> u8 {
        op as u8
    }
}
