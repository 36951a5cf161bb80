//! Comment skipping.
//!
//! minipar has two comment forms: `#` runs to end of line, `/* ... */`
//! runs until the matching close (not nested — an embedded `/*` has no
//! special meaning inside a block comment).

use crate::Lexer;

impl<'a> Lexer<'a> {
    pub(super) fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.current_char() != '\n' {
            self.advance();
        }
    }

    pub(super) fn skip_block_comment(&mut self) {
        self.advance(); // '/'
        self.advance(); // '*'
        while !self.is_at_end() {
            if self.current_char() == '*' && self.peek_char(1) == '/' {
                self.advance();
                self.advance();
                return;
            }
            if self.current_char() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Lexer, TokenKind};

    #[test]
    fn line_comment_runs_to_end_of_line() {
        let mut lx = Lexer::new("x # trailing comment\ny");
        assert!(matches!(lx.next_token().kind, TokenKind::Id(_)));
        let second = lx.next_token();
        assert!(matches!(second.kind, TokenKind::Id(_)));
    }

    #[test]
    fn block_comment_does_not_nest() {
        let mut lx = Lexer::new("/* outer /* inner */ x */");
        // The first `*/` closes the comment; the trailing `*/` is then
        // scanned as ordinary source text.
        let tok = lx.next_token();
        assert!(matches!(tok.kind, TokenKind::Id(_)));
    }
}
