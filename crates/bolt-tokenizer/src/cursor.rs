use std::str::Chars;

use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

/// Character cursor with one and two character lookahead.
///
/// `EOF_CHAR` is only a lookahead placeholder; use [`Cursor::is_eof`] to tell
/// the end of input from a literal NUL in the text.
pub struct Cursor<'text> {
    chars: Chars<'text>,
    len: TextSize,
}

impl<'text> Cursor<'text> {
    pub fn new(text: &'text str) -> Self {
        Self { chars: text.chars(), len: text.text_len() }
    }

    /// Bytes left to consume.
    pub(crate) fn len(&self) -> TextSize {
        TextSize::new(self.chars.as_str().len() as u32)
    }

    pub fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Bytes consumed since the last [`Cursor::reset_pos_within_token`].
    pub fn pos_within_token(&self) -> TextSize {
        self.len - self.len()
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.len = self.len();
    }

    pub fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub fn advance(&mut self) -> char {
        self.chars.next().unwrap_or(EOF_CHAR)
    }

    /// Consumes the next character if it is `c`.
    pub fn eat(&mut self, c: char) -> bool {
        let matches = !self.is_eof() && self.peek() == c;
        if matches {
            self.advance();
        }
        matches
    }

    pub fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }
}
