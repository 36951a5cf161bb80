//! Shared helpers for `mpi`'s subcommands.

use std::path::Path;

use crate::error::{MiniparCliError, Result};

/// Reads a minipar source file as UTF-8. A missing path is reported as
/// a `Config` error rather than a bare `io::Error`, since "file not
/// found" here is a CLI-usage mistake, not an interpreter failure.
pub fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(MiniparCliError::Config(format!(
            "source file not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}
