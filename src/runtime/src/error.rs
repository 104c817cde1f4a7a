//! Runtime errors.
//!
//! Every way a running program can fail fatally gets a variant here, with
//! the exact diagnostic text the user sees. When the machine raises one it
//! captures a stack trace from the live call frames, resets itself, and
//! hands the pair back as a [`RuntimeError`]. Nothing unwinds; the host
//! sees a plain `Err`.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// The kinds of fatal runtime errors, each carrying its diagnostic message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("Expected {expected} arguments but got {found}.")]
    ArityMismatch { expected: u8, found: u8 },

    #[error("Stack overflow.")]
    StackOverflow,

    #[error("Can only call functions and classes.")]
    NotCallable,

    #[error("Only instances have methods.")]
    OnlyInstancesHaveMethods,

    #[error("Only instances have properties.")]
    OnlyInstancesHaveProperties,

    #[error("Only instances have fields.")]
    OnlyInstancesHaveFields,

    #[error("Undefined property '{0}'.")]
    UndefinedProperty(String),

    #[error("Undefined symbol '{0}'.")]
    UndefinedSymbol(String),

    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    #[error("Superclass must be a class.")]
    SuperclassMustBeClass,

    #[error("Operand must be a number.")]
    OperandMustBeNumber,

    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,

    #[error("Operands must be two numbers or two strings.")]
    AddOperandsMismatched,

    #[error("Invalid type to index into.")]
    NotIndexable,

    #[error("List index is not a number.")]
    ListIndexNotNumber,

    #[error("List index out of range.")]
    ListIndexOutOfRange,

    // Raised by the built-in native functions.
    #[error("insufficient arguments, need {need} got={got}")]
    InsufficientArguments { need: usize, got: usize },

    #[error("cannot get length of a non-list variable.")]
    LengthOfNonList,

    #[error("cannot append item to non-list variable.")]
    AppendToNonList,

    #[error("cannot delete item from non-list variable.")]
    DeleteFromNonList,

    #[error("index cannot be a non-number value.")]
    IndexNotANumber,

    #[error("index out of range.")]
    IndexOutOfRange,
}

/// One entry in a stack trace: the source line being executed and the name
/// of the function executing it (`None` for top-level script code).
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub line: u32,
    pub function: Option<String>,
}

impl Display for TraceFrame {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.function {
            Some(name) => write!(f, "[line {}] in {}()", self.line, name),
            None => {
                write!(
                    f,
                    "[line {}] in {}",
                    self.line,
                    bytecode::Function::SCRIPT_NAME
                )
            }
        }
    }
}

/// A fatal runtime error, with the stack trace captured where it was
/// raised. Frames run innermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    kind: RuntimeErrorKind,
    trace: Vec<TraceFrame>,
}

impl RuntimeError {
    pub(crate) fn new(
        kind: RuntimeErrorKind,
        trace: Vec<TraceFrame>,
    ) -> RuntimeError {
        RuntimeError { kind, trace }
    }

    pub fn kind(&self) -> &RuntimeErrorKind {
        &self.kind
    }

    pub fn trace(&self) -> &[TraceFrame] {
        &self.trace
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        for frame in &self.trace {
            write!(f, "\n{}", frame)?;
        }

        Ok(())
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
