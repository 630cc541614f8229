//! Error types for the QOR interpreter

use thiserror::Error;

/// QOR interpreter errors
///
/// Lexing, parsing and evaluation share one error type. None of them are
/// recoverable inside the pipeline: the first error aborts the run and is
/// handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Lex errors
    /// No token pattern matches at the current position
    ///
    /// **Triggered by:** A character outside the language's alphabet
    /// **Example:** `x = 10 @ 5`
    #[error("Unrecognized character '{character}' at line {line}, column {column}")]
    LexError {
        /// The offending character
        character: char,
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
    },

    /// A dedent that does not return to any enclosing indentation level
    #[error("Inconsistent indentation at line {line}: dedent to width {width} matches no outer block")]
    InconsistentIndent {
        /// Line number (1-indexed)
        line: usize,
        /// Width the line was dedented to
        width: usize,
    },

    // Parse errors
    /// Current token does not match what the grammar rule expects
    ///
    /// **Triggered by:** Malformed statements or expressions
    /// **Example:** `print(1` (missing closing parenthesis)
    #[error("Syntax error at line {line}, column {column}: expected {expected}, got {got}")]
    UnexpectedToken {
        /// Expected token description
        expected: String,
        /// Actual token received
        got: String,
        /// Line number of the offending token
        line: usize,
        /// Column number of the offending token
        column: usize,
    },

    /// Input ended while a grammar rule still expected tokens
    #[error("Syntax error: expected {expected}, got end of input")]
    UnexpectedEof {
        /// Expected token description
        expected: String,
    },

    /// A literal that cannot be represented
    #[error("Invalid literal at line {line}: {literal}")]
    InvalidLiteral {
        /// Source text of the literal
        literal: String,
        /// Line number of the literal
        line: usize,
    },

    // Runtime errors
    /// Reference to undefined variable
    ///
    /// **Triggered by:** Using a variable before assignment
    /// **Example:** `print(y)` (when y was never assigned)
    #[error("Undefined variable: '{name}'")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Call to a name that is neither a builtin nor a user function
    #[error("Undefined function: '{name}'")]
    UndefinedFunction {
        /// Function name
        name: String,
    },

    /// Wrong number of arguments supplied to a function
    #[error("Function '{name}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        /// Function name
        name: String,
        /// Expected argument count (human readable, e.g. "2" or "1 to 3")
        expected: String,
        /// Supplied argument count
        got: usize,
    },

    /// Division by zero error
    ///
    /// **Triggered by:** Dividing by zero or taking modulo of zero
    /// **Example:** `x = 10 / 0`, `y = 5 % 0`
    #[error("Division by zero")]
    DivisionByZero,

    /// Operator that has no meaning in the current position
    #[error("Unknown operator: {op}")]
    UnknownOperator {
        /// Operator text
        op: String,
    },

    /// Type mismatch error
    ///
    /// **Triggered by:** Operation expecting one type but receiving another
    /// **Example:** `"a" - 1`, `len(5)`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Invalid operation for given types
    #[error("Invalid operation: {op} on types {left_type} and {right_type}")]
    InvalidOperation {
        /// Operation name
        op: String,
        /// Left operand type
        left_type: String,
        /// Right operand type
        right_type: String,
    },

    /// Sequence index out of bounds
    ///
    /// **Triggered by:** Accessing an element beyond the valid range
    /// **Example:** `a = [1, 2, 3]` then `a[5]`
    #[error("Index out of bounds: {index} for sequence of length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Sequence length
        length: usize,
    },

    /// Dictionary lookup with a missing key
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// Display form of the key
        key: String,
    },

    /// Method not part of the value's native method set
    #[error("'{type_name}' has no method '{method}'")]
    UnknownMethod {
        /// Receiver type
        type_name: String,
        /// Method name
        method: String,
    },

    /// A builtin function rejected its argument
    ///
    /// **Triggered by:** Host-level failure inside a builtin
    /// **Example:** `sqrt(-1)`, `int("abc")`
    #[error("Builtin '{name}' failed: {reason}")]
    BuiltinError {
        /// Builtin name
        name: String,
        /// Failure reason
        reason: String,
    },

    /// Attempt to define a user function under a builtin name
    #[error("Cannot redefine builtin function '{name}'")]
    BuiltinRedefinition {
        /// Builtin name
        name: String,
    },

    /// `return` executed with no enclosing function call
    #[error("'return' outside function")]
    ReturnOutsideFunction,

    /// Call depth exceeded the configured maximum
    #[error("Maximum call depth exceeded (limit: {limit})")]
    RecursionLimit {
        /// Configured limit
        limit: usize,
    },

    /// Integer arithmetic overflowed
    #[error("Integer overflow in {op}")]
    Overflow {
        /// Operation that overflowed
        op: String,
    },

    /// Range with invalid arguments (e.g. zero step)
    #[error("Invalid range: {reason}")]
    InvalidRange {
        /// Reason for invalidity
        reason: String,
    },
}

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Tokenization failed; nothing was parsed
    Lex,
    /// Parsing failed; nothing was executed
    Parse,
    /// Evaluation aborted part-way through the program
    Runtime,
}

impl Error {
    /// Create a builtin failure with a message
    pub fn builtin(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BuiltinError {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a type error from expected and actual type names
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Classify the stage this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::LexError { .. } | Error::InconsistentIndent { .. } => ErrorCategory::Lex,

            Error::UnexpectedToken { .. }
            | Error::UnexpectedEof { .. }
            | Error::InvalidLiteral { .. } => ErrorCategory::Parse,

            _ => ErrorCategory::Runtime,
        }
    }

    /// Short label used by the shell when reporting errors
    pub fn label(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Lex | ErrorCategory::Parse => "Syntax Error",
            ErrorCategory::Runtime => "Runtime Error",
        }
    }
}

/// Result type for QOR operations
pub type Result<T> = std::result::Result<T, Error>;
