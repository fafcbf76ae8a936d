use thiserror::Error;

/// Errors surfaced by the reader and evaluator.
///
/// The original design mixed process termination (unbound symbols, tag
/// mismatches) with silent absorption (applying a non-function). Here every
/// fault is a typed error carried back to the caller; nothing aborts the
/// host.
#[derive(Debug, Error)]
pub enum LispError {
    /// Unexpected delimiter while reading. Input has already been
    /// discarded through the next newline, so the caller may read again.
    #[error("syntax error: unexpected '{0}'")]
    Syntax(char),

    /// End of input where a value was required (inside a list, after a
    /// quote mark). End of input at top level is not an error.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A string literal ran off the end of the input.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A symbol had no binding in the environment chain.
    #[error("unbound symbol '{0}'")]
    Unbound(String),

    /// A typed accessor was applied to a value of the wrong tag.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Parameter/argument count mismatch in a function application.
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    Arity { expected: usize, got: usize },

    /// The head of an application evaluated to something inapplicable.
    #[error("cannot apply non-function value of type {0}")]
    NotCallable(&'static str),

    /// Cons-cell arena capacity exceeded.
    #[error("cons heap capacity exceeded")]
    HeapOverflow,

    /// I/O failure from a file port.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LispResult<T> = Result<T, LispError>;
