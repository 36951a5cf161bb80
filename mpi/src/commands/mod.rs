//! Command modules for the `mpi` CLI — one file per subcommand.

pub mod common;

pub mod check;
pub mod run;
pub mod tokens;

pub use check::{run_check, CheckArgs};
pub use run::{run_run, RunArgs};
pub use tokens::{run_tokens, TokensArgs};
