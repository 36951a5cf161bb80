//! Semantic errors carry no line number: a typing, scoping, or shape
//! violation is reported by description alone — line-accurate
//! reporting is a syntax-error-only feature of this pipeline.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SemanticError(pub String);

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        SemanticError(message.into())
    }
}

pub type SemResult<T> = std::result::Result<T, SemanticError>;
