//! Core lexer implementation: cursor state and token dispatch.

use mp_util::Line;

use crate::{Token, TokenKind};

/// Lexer for minipar source text.
///
/// The lexer owns a byte cursor into the source and produces tokens one
/// at a time via [`Lexer::next_token`]. It is not an [`Iterator`] because
/// the parser needs to synthesize an `Eof` token past the end of the
/// stream rather than receive `None`; see `mp-par`.
pub struct Lexer<'a> {
    pub(super) source: &'a str,
    pub(super) position: usize,
    pub(super) line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
        }
    }

    pub fn line(&self) -> Line {
        Line(self.line)
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    pub(super) fn current_char(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    pub(super) fn peek_char(&self, ahead: usize) -> char {
        self.source[self.position..]
            .chars()
            .nth(ahead)
            .unwrap_or('\0')
    }

    pub(super) fn advance(&mut self) -> char {
        let c = self.current_char();
        self.position += c.len_utf8();
        c
    }

    pub(super) fn make(&self, kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token {
            kind,
            lexeme: lexeme.into(),
            line: Line(self.line),
        }
    }

    /// Skips whitespace, `#` line comments, and `/* ... */` block
    /// comments, tracking the line counter through all three.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current_char() {
                '\n' => {
                    self.line += 1;
                    self.advance();
                }
                c if c.is_whitespace() => {
                    self.advance();
                }
                '#' => self.skip_line_comment(),
                '/' if self.peek_char(1) == '*' => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    /// Returns the next token from the source, or `TokenKind::Eof` once
    /// the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        if self.is_at_end() {
            return Token::eof(self.line());
        }

        match self.current_char() {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ',' => self.single(TokenKind::Comma),
            '"' => self.scan_string(),
            c if c.is_ascii_digit() || (c == '.' && self.peek_char(1).is_ascii_digit()) => {
                self.scan_number()
            }
            c if is_ident_start(c) => self.scan_identifier(),
            _ => self.scan_operator(),
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let c = self.advance();
        self.make(kind, c.to_string())
    }
}

pub(super) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(super) fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
