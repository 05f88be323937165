//! Bolt grammar.
//!
//! ```text
//! source_file    = (block | _token)*
//! block          = "{" (block | _token)* "}"
//! array_literal  = "[" (_item ("," _item)*)? "]"
//! string_literal = '"' (escape_sequence | string_content)* '"'
//! operator       = arithmetic_operator | other_operator
//! ```
//!
//! Blocks and arrays nest arbitrarily deep, so open delimiters are kept on an
//! explicit stack of frames instead of the call stack.

use bolt_syntax::SyntaxKind::*;
use bolt_syntax::SyntaxSet;
use text_size::TextRange;

use crate::parser::{Marker, Parser};

const OPERATORS: SyntaxSet = SyntaxSet::new([ARITHMETIC_OPERATOR, OTHER_OPERATOR]);

/// A node whose closing delimiter has not been seen yet.
struct Open {
    marker: Marker,
    /// The opening delimiter, reported when the node is never closed.
    range: TextRange,
}

enum ArrayState {
    /// Right after `[` or a misplaced comma.
    ItemExpected,
    SeparatorExpected,
    /// After a separating comma; the marker wraps that comma in case it
    /// turns out to be trailing.
    AfterComma(Marker, TextRange),
}

enum Frame {
    Block(Open),
    Array(Open, ArrayState),
    /// Completed as `ERROR` once the item parsed under it is closed.
    Error(Marker),
}

pub(crate) fn source_file(p: &mut Parser<'_>) {
    let m = p.start();
    // Leading comments belong to the root.
    p.skip_extras();
    let mut frames = Vec::new();

    while !p.at(EOF) {
        match frames.pop() {
            None => match p.peek_kind() {
                RIGHT_BRACE => p.error_and_bump("unmatched `}`"),
                RIGHT_BRACKET => p.error_and_bump("unmatched `]`"),
                _ => item(p, &mut frames),
            },
            Some(Frame::Error(marker)) => marker.complete(p, ERROR),
            Some(Frame::Block(open)) => block(p, open, &mut frames),
            Some(Frame::Array(open, state)) => array(p, open, state, &mut frames),
        }
    }

    p.flush_extras();
    while let Some(frame) = frames.pop() {
        close_at_eof(p, frame);
    }

    p.finish_eof();
    m.complete(p, SOURCE_FILE);
}

/// One step inside an open block.
fn block(p: &mut Parser<'_>, open: Open, frames: &mut Vec<Frame>) {
    match p.peek_kind() {
        RIGHT_BRACE => {
            p.advance();
            open.marker.complete(p, BLOCK);
        }
        RIGHT_BRACKET => {
            frames.push(Frame::Block(open));
            p.error_and_bump("unmatched `]`");
        }
        _ => {
            frames.push(Frame::Block(open));
            item(p, frames);
        }
    }
}

/// One step inside an open array literal.
fn array(p: &mut Parser<'_>, open: Open, state: ArrayState, frames: &mut Vec<Frame>) {
    let state = match (p.peek_kind(), state) {
        (RIGHT_BRACKET, state) => {
            if let ArrayState::AfterComma(comma, range) = state {
                p.error("trailing comma in array", range);
                comma.complete(p, ERROR);
            }
            p.advance();
            open.marker.complete(p, ARRAY_LITERAL);
            return;
        }
        (RIGHT_BRACE, state) => {
            p.error_and_bump("unmatched `}`");
            state
        }
        (COMMA, ArrayState::SeparatorExpected) => {
            let comma = p.start();
            let range = p.peek_range();
            p.advance();
            ArrayState::AfterComma(comma, range)
        }
        (COMMA, state) => {
            if let ArrayState::AfterComma(comma, _) = state {
                comma.abandon(p);
            }
            p.error_and_bump("expected array item, found `,`");
            ArrayState::ItemExpected
        }
        (_, ArrayState::SeparatorExpected) => {
            p.error("expected `,` between array items", p.peek_range());
            let error = p.start();
            frames.push(Frame::Array(open, ArrayState::SeparatorExpected));
            frames.push(Frame::Error(error));
            item(p, frames);
            return;
        }
        (_, state) => {
            if let ArrayState::AfterComma(comma, _) = state {
                comma.abandon(p);
            }
            frames.push(Frame::Array(open, ArrayState::SeparatorExpected));
            item(p, frames);
            return;
        }
    };

    frames.push(Frame::Array(open, state));
}

/// Parses one `block | _token`. Blocks and arrays are only opened here;
/// their contents are parsed by later steps of the frame loop.
fn item(p: &mut Parser<'_>, frames: &mut Vec<Frame>) {
    match p.peek_kind() {
        LEFT_BRACE => {
            let open = open(p);
            frames.push(Frame::Block(open));
        }
        LEFT_BRACKET => {
            let open = open(p);
            frames.push(Frame::Array(open, ArrayState::ItemExpected));
        }
        QUOTE => string_literal(p),
        kind if OPERATORS.contains(kind) => {
            let m = p.start();
            p.advance();
            m.complete(p, OPERATOR);
        }
        COMMA => p.advance_as(PUNCTUATION),
        UNKNOWN => p.error_and_bump("unexpected character"),
        _ => p.advance(),
    }

    if let Some(Frame::Error(_)) = frames.last() {
        close_error_wrapper(p, frames);
    }
}

/// An item parsed under an `ERROR` wrapper that did not open a frame of its
/// own is complete already.
fn close_error_wrapper(p: &mut Parser<'_>, frames: &mut Vec<Frame>) {
    if let Some(Frame::Error(marker)) = frames.pop() {
        marker.complete(p, ERROR);
    }
}

fn open(p: &mut Parser<'_>) -> Open {
    let marker = p.start();
    let range = p.peek_range();
    p.advance();
    Open { marker, range }
}

fn string_literal(p: &mut Parser<'_>) {
    let m = p.start();
    let range = p.peek_range();
    p.advance();

    while matches!(p.peek_kind(), STRING_CONTENT | ESCAPE_SEQUENCE) {
        p.advance();
    }

    if p.eat(QUOTE) {
        m.complete(p, STRING_LITERAL);
    } else {
        p.error("unterminated string literal", range);
        m.complete_error(p, STRING_LITERAL);
    }
}

fn close_at_eof(p: &mut Parser<'_>, frame: Frame) {
    match frame {
        Frame::Error(marker) => marker.complete(p, ERROR),
        Frame::Block(open) => {
            p.error("unclosed block, expected `}`", open.range);
            open.marker.complete_error(p, BLOCK);
        }
        Frame::Array(open, state) => {
            if let ArrayState::AfterComma(comma, _) = state {
                comma.abandon(p);
            }
            p.error("unclosed array, expected `]`", open.range);
            open.marker.complete_error(p, ARRAY_LITERAL);
        }
    }
}
