//! String literal lexing.
//!
//! minipar strings are double-quoted with no escape sequences; the
//! content is whatever lies between the quotes, verbatim. An
//! unterminated string simply runs to end of input — there's no
//! dedicated lexer error channel, so the parser reports it as a syntax
//! error when it finds no closing quote token.

use mp_util::Symbol;

use crate::{Lexer, Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(super) fn scan_string(&mut self) -> Token {
        let quote_line = self.line();
        self.advance(); // opening '"'
        let start = self.position;

        while !self.is_at_end() && self.current_char() != '"' {
            if self.current_char() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        let content = &self.source[start..self.position];
        let lexeme = content.to_string();

        if !self.is_at_end() {
            self.advance(); // closing '"'
        }

        Token {
            kind: TokenKind::String(Symbol::intern(content)),
            lexeme,
            line: quote_line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_simple_string() {
        let mut lx = Lexer::new("\"hello\"");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::String(Symbol::intern("hello")));
        assert_eq!(tok.lexeme, "hello");
    }

    #[test]
    fn lexes_empty_string() {
        let mut lx = Lexer::new("\"\"");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::String(Symbol::intern("")));
    }

    #[test]
    fn unterminated_string_runs_to_end_of_input() {
        let mut lx = Lexer::new("\"abc");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::String(Symbol::intern("abc")));
        assert_eq!(lx.next_token().kind, TokenKind::Eof);
    }
}
