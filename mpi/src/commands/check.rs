//! `mpi check <file>` — lex, parse, and semantically analyze a source
//! file without running it. Useful for editor tooling that wants fast
//! feedback without opening sockets or blocking on `input`.

use std::path::PathBuf;

use tracing::debug;

use mp_par::parse;

use crate::commands::common::read_source;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub path: PathBuf,
}

pub fn run_check(args: CheckArgs) -> Result<()> {
    let source = read_source(&args.path)?;

    debug!(path = %args.path.display(), "parsing source");
    let ast = parse(&source)?;

    debug!("running semantic analysis");
    mp_sem::analyze(&ast)?;

    println!("{}: ok", args.path.display());
    Ok(())
}
