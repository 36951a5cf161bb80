//! `mpi tokens <file>` — dumps the raw token stream as `kind lexeme
//! line` triples, one per line. A debugging aid for inspecting how the
//! lexer segmented a source file.

use std::path::PathBuf;

use mp_lex::{Lexer, TokenKind};

use crate::commands::common::read_source;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct TokensArgs {
    pub path: PathBuf,
}

pub fn run_tokens(args: TokensArgs) -> Result<()> {
    let source = read_source(&args.path)?;
    let mut lexer = Lexer::new(&source);

    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        println!("{:<10} {:<20} line {}", format!("{:?}", token.kind), token.lexeme, token.line);
        if is_eof {
            break;
        }
    }

    Ok(())
}
