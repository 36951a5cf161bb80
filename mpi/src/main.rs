//! `mpi` — the minipar interpreter CLI.
//!
//! Entry point: parses arguments, loads configuration, initializes
//! logging from the merged CLI/config verbosity and color settings,
//! and dispatches to one of three subcommands (`run`, `check`,
//! `tokens`).

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    check::{run_check, CheckArgs},
    run::{run_run, RunArgs},
    tokens::{run_tokens, TokensArgs},
};
use config::Config;
use error::{MiniparCliError, Result};

/// mpi - the minipar interpreter
#[derive(Parser, Debug)]
#[command(name = "mpi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lex, parse, check, and run minipar programs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true, env = "MPI_VERBOSE")]
    verbose: bool,

    /// Path to a configuration file (default: search mpi.toml, then the
    /// user config directory)
    #[arg(short, long, global = true, env = "MPI_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "MPI_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a minipar program
    Run {
        /// Path to the .minipar source file
        path: PathBuf,
    },
    /// Lex, parse, and semantically analyze a program without running it
    Check {
        /// Path to the .minipar source file
        path: PathBuf,
    },
    /// Dump the raw token stream for a program
    Tokens {
        /// Path to the .minipar source file
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    let verbose = cli.verbose || config.verbose;
    let no_color = cli.no_color || config.no_color;

    if let Err(err) = init_logging(verbose, no_color) {
        eprintln!("error: {err}");
        return ExitCode::from(1);
    }

    match execute_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// An env-filter driven subscriber toggled by `--verbose`, with color
/// controlled separately.
fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| MiniparCliError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(())
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run { path } => run_run(RunArgs { path }),
        Commands::Check { path } => run_check(CheckArgs { path }),
        Commands::Tokens { path } => run_tokens(TokensArgs { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::parse_from(["mpi", "run", "prog.minipar"]);
        assert!(matches!(cli.command, Commands::Run { .. }));
    }

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::parse_from(["mpi", "check", "prog.minipar"]);
        assert!(matches!(cli.command, Commands::Check { .. }));
    }

    #[test]
    fn parses_tokens_subcommand() {
        let cli = Cli::parse_from(["mpi", "tokens", "prog.minipar"]);
        assert!(matches!(cli.command, Commands::Tokens { .. }));
    }

    #[test]
    fn parses_global_verbose_flag() {
        let cli = Cli::parse_from(["mpi", "--verbose", "run", "prog.minipar"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parses_global_no_color_flag() {
        let cli = Cli::parse_from(["mpi", "--no-color", "run", "prog.minipar"]);
        assert!(cli.no_color);
    }
}
