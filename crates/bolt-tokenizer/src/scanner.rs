//! Hand-written scanner for block comment bodies.
//!
//! A block comment body cannot be described by a regular token rule: the
//! terminator must be found with two characters of lookahead and, in nested
//! style, matched against every `/*` opened inside the body.

use crate::cursor::Cursor;

/// How `/*` inside a block comment body is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockCommentStyle {
    /// The first `*/` closes the comment.
    #[default]
    Flat,
    /// Every `/*` in the body must be closed by its own `*/`.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCommentScan {
    /// `false` when the input ended before the closing `*/`.
    pub terminated: bool,
}

/// Advances over a block comment body, right after its opening `/*`.
///
/// Stops in front of the closing `*/`, which is left for the caller. Without
/// a terminator the rest of the input is consumed.
pub fn scan_block_comment(cursor: &mut Cursor<'_>, style: BlockCommentStyle) -> BlockCommentScan {
    let mut depth = 1usize;

    loop {
        if cursor.is_eof() {
            return BlockCommentScan { terminated: false };
        }

        match (cursor.peek(), cursor.second()) {
            ('*', '/') if depth == 1 => return BlockCommentScan { terminated: true },
            ('*', '/') => {
                depth -= 1;
                cursor.advance();
                cursor.advance();
            }
            ('/', '*') if style == BlockCommentStyle::Nested => {
                depth += 1;
                cursor.advance();
                cursor.advance();
            }
            _ => {
                cursor.advance();
            }
        }
    }
}
