//! Error types for jackc-core.

use thiserror::Error;

use crate::compiler::bytecode::Segment;

/// Result type for compilation operations.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that can abort the compilation of one unit.
///
/// All of these are fatal at the point of detection: the engine does not
/// resynchronize, and any output already written for the failing unit must
/// be discarded by the caller.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Malformed or unterminated token, or a read past end of input
    #[error("lexical error at offset {at}: {message}")]
    Lex { message: String, at: usize },

    /// Token stream does not match the expected production
    #[error("syntax error at offset {at}: expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: String,
        at: usize,
    },

    /// Identifier used as a variable but absent from both symbol tiers
    #[error("undefined variable `{0}`")]
    Lookup(String),

    /// Current token accessed through the wrong tag
    #[error("current token accessed as {expected}, but it is {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    /// Segment with no legal write form used as a pop target
    #[error("the {0} segment cannot be a pop target")]
    IllegalPop(Segment),

    /// IO error on the output stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
