//! Number literal lexing.
//!
//! minipar has a single `Number` token kind; whether the lexeme denotes
//! an integer or a float is decided later by whoever consumes the
//! lexeme (it's "int" iff the text contains no `.`). The lexer's only
//! job is to capture the full run of digits and an optional fractional
//! part.

use crate::{Lexer, Token, TokenKind};

impl<'a> Lexer<'a> {
    /// Lexes a number literal: `\d+(\.\d+)?` or `\.\d+`.
    pub(super) fn scan_number(&mut self) -> Token {
        let start = self.position;

        while self.current_char().is_ascii_digit() {
            self.advance();
        }

        if self.current_char() == '.' && self.peek_char(1).is_ascii_digit() {
            self.advance(); // '.'
            while self.current_char().is_ascii_digit() {
                self.advance();
            }
        }

        let text = &self.source[start..self.position];
        self.make(TokenKind::Number, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_integer() {
        let mut lx = Lexer::new("42");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.lexeme, "42");
    }

    #[test]
    fn lexes_float() {
        let mut lx = Lexer::new("3.14");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.lexeme, "3.14");
    }

    #[test]
    fn lexes_leading_dot_float() {
        let mut lx = Lexer::new(".5");
        let tok = lx.next_token();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.lexeme, ".5");
    }

    #[test]
    fn trailing_dot_without_digits_is_not_consumed() {
        let mut lx = Lexer::new("1.");
        let tok = lx.next_token();
        assert_eq!(tok.lexeme, "1");
        assert_eq!(lx.next_token().kind, TokenKind::Dot);
    }
}
