//! Error handling for the `mpi` CLI.
//!
//! Aggregates every pipeline stage's error type behind one enum via
//! `#[from]`. Each variant maps to a distinct process exit code: 1 for
//! a syntax error, 2 for a semantic error, 3 for a runtime error, and a
//! generic `Config` variant for CLI-level failures (bad path, bad
//! config file).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiniparCliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Syntax(#[from] mp_par::error::ParseError),

    #[error(transparent)]
    Semantic(#[from] mp_sem::error::SemanticError),

    #[error(transparent)]
    Runtime(#[from] mp_runtime::RuntimeError),
}

impl MiniparCliError {
    /// The process exit code for this error: 0 success, 1 syntax, 2
    /// semantic, 3 runtime; CLI-level failures use 1, same as any
    /// other malformed-input condition.
    pub fn exit_code(&self) -> i32 {
        match self {
            MiniparCliError::Config(_) | MiniparCliError::Io(_) => 1,
            MiniparCliError::Syntax(_) => 1,
            MiniparCliError::Semantic(_) => 2,
            MiniparCliError::Runtime(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, MiniparCliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_exits_one() {
        let err: MiniparCliError = std::io::Error::new(std::io::ErrorKind::NotFound, "x").into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_error_exits_one() {
        let err = MiniparCliError::Config("bad".to_string());
        assert_eq!(err.exit_code(), 1);
    }
}
