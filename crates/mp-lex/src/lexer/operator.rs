//! Operator and remaining punctuation lexing.
//!
//! Handles every token that doesn't fall into the identifier/number/
//! string/single-char-punctuation cases `core::next_token` dispatches
//! directly: the two-character operators, their single-character
//! fallbacks, and the `Other` catch-all for anything that isn't part
//! of the language.

use crate::{Lexer, Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(super) fn scan_operator(&mut self) -> Token {
        let c = self.current_char();

        match c {
            '-' if self.peek_char(1) == '>' => self.two(TokenKind::RArrow),
            '|' if self.peek_char(1) == '|' => self.two(TokenKind::Or),
            '&' if self.peek_char(1) == '&' => self.two(TokenKind::And),
            '=' if self.peek_char(1) == '=' => self.two(TokenKind::EqEq),
            '!' if self.peek_char(1) == '=' => self.two(TokenKind::NotEq),
            '<' if self.peek_char(1) == '=' => self.two(TokenKind::Lte),
            '>' if self.peek_char(1) == '=' => self.two(TokenKind::Gte),

            '+' => self.one(TokenKind::Plus),
            '-' => self.one(TokenKind::Minus),
            '*' => self.one(TokenKind::Star),
            '/' => self.one(TokenKind::Slash),
            '%' => self.one(TokenKind::Percent),
            '<' => self.one(TokenKind::Lt),
            '>' => self.one(TokenKind::Gt),
            '=' => self.one(TokenKind::Assign),
            ':' => self.one(TokenKind::Colon),
            '.' => self.one(TokenKind::Dot),
            '!' => self.one(TokenKind::Bang),

            other => {
                self.advance();
                self.make(TokenKind::Other(other), other.to_string())
            }
        }
    }

    fn one(&mut self, kind: TokenKind) -> Token {
        let c = self.advance();
        self.make(kind, c.to_string())
    }

    fn two(&mut self, kind: TokenKind) -> Token {
        let start = self.position;
        self.advance();
        self.advance();
        let text = self.source[start..self.position].to_string();
        self.make(kind, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lx = Lexer::new(src);
        std::iter::from_fn(|| {
            let t = lx.next_token();
            if t.kind == TokenKind::Eof {
                None
            } else {
                Some(t.kind)
            }
        })
        .collect()
    }

    #[test]
    fn two_char_operators_take_priority_over_one_char() {
        assert_eq!(kinds("->"), vec![TokenKind::RArrow]);
        assert_eq!(kinds("||"), vec![TokenKind::Or]);
        assert_eq!(kinds("&&"), vec![TokenKind::And]);
        assert_eq!(kinds("=="), vec![TokenKind::EqEq]);
        assert_eq!(kinds("!="), vec![TokenKind::NotEq]);
        assert_eq!(kinds("<="), vec![TokenKind::Lte]);
        assert_eq!(kinds(">="), vec![TokenKind::Gte]);
    }

    #[test]
    fn lone_operators_fall_back_to_single_char_tokens() {
        assert_eq!(
            kinds("- > = !"),
            vec![
                TokenKind::Minus,
                TokenKind::Gt,
                TokenKind::Assign,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn unknown_punctuation_becomes_other() {
        assert_eq!(kinds("$"), vec![TokenKind::Other('$')]);
    }
}
