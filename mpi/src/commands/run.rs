//! `mpi run <file>` — lex, parse, semantically check, then evaluate.
//! Parses the source exactly once and runs it exactly once.

use std::path::PathBuf;

use tracing::debug;

use mp_par::parse;
use mp_runtime::Evaluator;

use crate::commands::common::read_source;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct RunArgs {
    pub path: PathBuf,
}

pub fn run_run(args: RunArgs) -> Result<()> {
    let source = read_source(&args.path)?;

    debug!(path = %args.path.display(), "parsing source");
    let ast = parse(&source)?;

    debug!("running semantic analysis");
    mp_sem::analyze(&ast)?;

    debug!("evaluating program");
    let mut evaluator = Evaluator::new();
    evaluator.run(&ast)?;

    Ok(())
}
