//! Error types for the Brook interpreter

use thiserror::Error;

/// Brook interpreter errors
///
/// One variant set covers the whole pipeline. The first group is raised by
/// the tokenizer, the second by the parser, the rest by the evaluator. Any
/// error aborts the current run; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Syntax errors (tokenizer)
    /// Character the tokenizer cannot classify
    #[error("Syntax error: unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter {
        /// The offending character
        ch: char,
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
    },

    /// String literal with no closing quote before end of input
    #[error("Syntax error: unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString {
        /// Line where the literal opened
        line: usize,
        /// Column where the literal opened
        column: usize,
    },

    // Parse errors
    /// A required token kind/value was absent
    #[error("Parse error: expected {expected}, but got {got} at line {line}, column {column}")]
    UnexpectedToken {
        /// What the grammar required here
        expected: String,
        /// Text of the offending token
        got: String,
        /// Line of the offending token
        line: usize,
        /// Column of the offending token
        column: usize,
    },

    // Runtime errors
    /// Reference to a variable no visible scope binds
    #[error("Runtime error: undefined variable '{name}'")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Division where the right operand is the number zero
    #[error("Runtime error: division by zero")]
    DivisionByZero,

    /// Property/index assignment into a value that is not an array or record
    #[error("Runtime error: cannot assign to property '{property}' of {type_name} value")]
    InvalidAssignmentTarget {
        /// Property or index text
        property: String,
        /// Type of the non-container value
        type_name: String,
    },

    /// Property/index read from a value that is not an array or record
    #[error("Runtime error: cannot access property '{property}' of {type_name} value")]
    InvalidPropertyAccess {
        /// Property or index text
        property: String,
        /// Type of the non-container value
        type_name: String,
    },

    /// Call with the wrong number of arguments
    #[error("Runtime error: function '{name}' called with {got} arguments, but expects {expected}")]
    ArityMismatch {
        /// Function name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Call target that is not a function
    #[error("Runtime error: cannot call non-function value of type {type_name}")]
    NotCallable {
        /// Type of the non-callable value
        type_name: String,
    },

    /// Operator text the evaluator does not recognize
    ///
    /// Only reachable when the AST was built or edited outside the parser.
    #[error("Runtime error: unknown operator '{operator}'")]
    UnknownOperator {
        /// The unrecognized operator text
        operator: String,
    },

    /// The caller-supplied output sink failed
    #[error("Output error: {0}")]
    Output(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Output(err.to_string())
    }
}

/// Result type for Brook operations
pub type Result<T> = std::result::Result<T, Error>;
