//! Runtime errors. Unlike [`mp_par::error::ParseError`] these carry a
//! line number when one is available (the statement currently
//! executing) but, like semantic errors, are otherwise plain
//! descriptions — there is no further structure to a failed socket
//! read or an out-of-range index.

use mp_util::Line;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("line {line}: undeclared variable '{name}'")]
    UndeclaredVariable { name: String, line: Line },

    #[error("line {line}: index {index} out of range for '{name}'")]
    IndexOutOfRange {
        name: String,
        index: i64,
        line: Line,
    },

    #[error("line {line}: division by zero")]
    DivisionByZero { line: Line },

    #[error("line {line}: '{value}' cannot be converted to a number")]
    BadNumberCoercion { value: String, line: Line },

    #[error("line {line}: channel '{name}' I/O error: {source}")]
    ChannelIo {
        name: String,
        line: Line,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: unknown channel '{name}'")]
    UnknownChannel { name: String, line: Line },

    #[error("line {line}: call to undeclared function '{name}'")]
    UndeclaredFunction { name: String, line: Line },

    #[error("line {line}: {message}")]
    Other { message: String, line: Line },
}

pub type RunResult<T> = std::result::Result<T, RuntimeError>;
