use bolt_errors::Diagnostic;
use bolt_syntax::{Builder, GreenNode, SyntaxKind};
use bolt_tokenizer::{Token, Tokenizer, TokenizerConfig};
use drop_bomb::DropBomb;
use text_size::TextRange;

/// Event-recording parser over the significant tokens of a text.
///
/// Comments never reach the grammar: they are pulled out of the token stream
/// as soon as they become the next token and kept aside until the grammar
/// starts a node or consumes a token, at which point they land in whatever
/// node is open.
pub(crate) struct Parser<'text> {
    tokenizer: Tokenizer<'text>,
    events: Vec<Event>,
    extras: Vec<Event>,
    errors: Vec<Diagnostic>,
}

impl<'text> Parser<'text> {
    pub(crate) fn new(text: &'text str, config: TokenizerConfig) -> Self {
        Self {
            tokenizer: Tokenizer::with_config(text, config),
            events: Vec::new(),
            extras: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.tokenizer.peek().kind
    }

    /// Range of the next significant token, without trivia.
    pub(crate) fn peek_range(&self) -> TextRange {
        self.tokenizer.peek().kind_range
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn advance(&mut self) {
        let kind = self.peek_kind();
        self.advance_as(kind);
    }

    /// Consumes the next token, recording it under `kind`.
    pub(crate) fn advance_as(&mut self, kind: SyntaxKind) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        self.flush_extras();
        let token = self.tokenizer.next_token();
        self.events.push(Event::Token { kind, token });
        self.skip_extras();
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        let at = self.at(kind);
        if at {
            self.advance();
        }
        at
    }

    pub(crate) fn start(&mut self) -> Marker {
        self.flush_extras();
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(Diagnostic::error(message, range));
    }

    /// Wraps the next token in an `ERROR` node.
    pub(crate) fn error_and_bump(&mut self, message: impl Into<String>) {
        let m = self.start();
        self.error(message, self.peek_range());
        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Records the `EOF` token, which carries any trivia left at the end.
    pub(crate) fn finish_eof(&mut self) {
        debug_assert!(self.at(SyntaxKind::EOF));
        self.flush_extras();
        let token = self.tokenizer.next_token();
        self.events.push(Event::Token { kind: SyntaxKind::EOF, token });
    }

    /// Moves buffered comments into the currently open node.
    pub(crate) fn flush_extras(&mut self) {
        self.events.append(&mut self.extras);
    }

    /// Sets comments in front of the next significant token aside.
    pub(crate) fn skip_extras(&mut self) {
        loop {
            match self.peek_kind() {
                SyntaxKind::LINE_COMMENT => {
                    let token = self.tokenizer.next_token();
                    self.extras.push(Event::Token { kind: SyntaxKind::LINE_COMMENT, token });
                }
                SyntaxKind::BLOCK_COMMENT_START => self.block_comment(),
                _ => return,
            }
        }
    }

    fn block_comment(&mut self) {
        let start = self.extras.len();
        self.extras.push(Event::TOMBSTONE);

        let open = self.tokenizer.next_token();
        let open_range = open.kind_range;
        self.extras.push(Event::Token { kind: SyntaxKind::BLOCK_COMMENT_START, token: open });

        for kind in [SyntaxKind::BLOCK_COMMENT_CONTENT, SyntaxKind::BLOCK_COMMENT_END] {
            if self.peek_kind() == kind {
                let token = self.tokenizer.next_token();
                self.extras.push(Event::Token { kind, token });
            }
        }

        let terminated = matches!(
            self.extras.last(),
            Some(Event::Token { kind: SyntaxKind::BLOCK_COMMENT_END, .. })
        );
        if !terminated {
            self.error("unterminated block comment", open_range);
        }

        self.extras[start] = Event::Start { kind: SyntaxKind::BLOCK_COMMENT, is_error: !terminated };
        self.extras.push(Event::Finish);
    }

    /// Folds the recorded events into a green tree.
    ///
    /// Diagnostics are returned ordered by where they start in the text.
    pub(crate) fn finish(self) -> (GreenNode, Vec<Diagnostic>) {
        let Parser { tokenizer: _, events, extras, mut errors } = self;
        debug_assert!(extras.is_empty(), "comments left outside of the tree");

        let mut builder = Builder::new();
        for event in events {
            match event {
                Event::Start { kind: SyntaxKind::TOMBSTONE, .. } => {}
                Event::Start { kind, is_error } => builder.start_node(kind, is_error),
                Event::Finish => builder.finish_node(),
                Event::Token { kind, token: Token { leading, kind_range, trailing, .. } } => {
                    builder.token(leading, kind, kind_range.len(), trailing);
                }
            }
        }

        errors.sort_by_key(|error| error.range().start());
        (builder.finish(), errors)
    }
}

enum Event {
    Start { kind: SyntaxKind, is_error: bool },
    Token { kind: SyntaxKind, token: Token },
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Event::Start { kind: SyntaxKind::TOMBSTONE, is_error: false };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Marker {
        Marker {
            position: pos,
            bomb: DropBomb::new("Marker must be either completed or abandoned"),
        }
    }

    pub(crate) fn complete(self, p: &mut Parser<'_>, kind: SyntaxKind) {
        self.close(p, kind, false);
    }

    /// Completes the node with its own kind, flagged as the result of
    /// malformed input.
    pub(crate) fn complete_error(self, p: &mut Parser<'_>, kind: SyntaxKind) {
        self.close(p, kind, true);
    }

    /// Drops the node, leaving whatever was parsed after it to the parent.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();
        let position = self.position as usize;
        if position == p.events.len() - 1 {
            p.events.pop();
        }
    }

    fn close(mut self, p: &mut Parser<'_>, kind: SyntaxKind, is_error: bool) {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, is_error: flag } => {
                *slot = kind;
                *flag = is_error;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
    }
}
