// ABOUTME: Error types for lexing, parsing, and evaluating Shark source

use thiserror::Error;

/// Errors raised while turning source text into a token stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("LexError: unterminated string (line {0})")]
    UnterminatedString(usize),

    #[error("LexError: unexpected character '{0}' (line {1})")]
    UnexpectedChar(char, usize),
}

/// Errors raised while turning a token stream into an AST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("ParseError: expected {expected}, found {found} (line {line})")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("ParseError: missing {expected} (line {line})")]
    MissingTerminator { line: usize, expected: String },

    #[error("ParseError: malformed function declaration: {detail} (line {line})")]
    MalformedFunctionDecl { line: usize, detail: String },
}

/// Errors raised while evaluating a parsed program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("NameError: unbound identifier '{name}' (line {line})")]
    NameError { name: String, line: usize },

    #[error("NameError: cannot assign to unbound identifier '{name}' (line {line})")]
    AssignToUnbound { name: String, line: usize },

    #[error("TypeError: {message} (line {line})")]
    TypeError { message: String, line: usize },

    #[error("ArityError: {function} expected {expected} argument(s), got {actual} (line {line})")]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
        line: usize,
    },

    #[error("ShapeMismatch: arrays of length {lhs} and {rhs} (line {line})")]
    ShapeMismatch { lhs: usize, rhs: usize, line: usize },

    #[error("DivisionByZero: (line {line})")]
    DivisionByZero { line: usize },

    #[error("EmptyReduction: {function} requires at least {required} element(s) (line {line})")]
    EmptyReduction {
        function: String,
        required: usize,
        line: usize,
    },

    #[error("IndexError: index {index} out of range for length {len} (line {line})")]
    IndexError {
        index: i64,
        len: usize,
        line: usize,
    },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
            line,
        }
    }

    pub fn arity_error(
        function: &str,
        expected: impl Into<String>,
        actual: usize,
        line: usize,
    ) -> Self {
        RuntimeError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
            line,
        }
    }
}

/// Top-level error type surfaced by the session facade.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SharkError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
