//! Parser error type.

use mp_util::Line;
use thiserror::Error;

/// A syntax error, always anchored to the line the parser was looking
/// at when the expectation failed, carrying a message describing the
/// expected token.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: Line,
    pub message: String,
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
