//! Tokenizer for Bolt source text.
//!
//! Whitespace never becomes a token of its own: it is attached to the
//! neighbouring token as trivia. Comments are regular tokens; the parser
//! treats them as extras.

mod cursor;
mod keywords;
pub mod scanner;

pub use bolt_syntax::SyntaxKind;
use bolt_syntax::SyntaxKind::*;
use bolt_syntax::{GreenTrivia, TriviaPiece, TriviaPieceKind};
pub use cursor::Cursor;
pub use scanner::BlockCommentStyle;
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TokenizerConfig {
    pub block_comments: BlockCommentStyle,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub leading: GreenTrivia,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    pub trailing: GreenTrivia,
}

impl Token {
    const EOF: Self = Self {
        kind: EOF,
        kind_range: TextRange::empty(TextSize::new(0)),
        leading: GreenTrivia::empty(),
        trailing: GreenTrivia::empty(),
    };

    /// Range of the token together with its trivia.
    pub fn text_range(&self) -> TextRange {
        TextRange::new(
            self.kind_range.start() - self.leading.len(),
            self.kind_range.end() + self.trailing.len(),
        )
    }
}

/// What the next call to `next_token` is lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    String,
    BlockComment,
    BlockCommentEnd { terminated: bool },
}

pub struct Tokenizer<'text> {
    text: &'text str,
    cursor: Cursor<'text>,
    config: TokenizerConfig,
    mode: Mode,
    current: Token,
    trivia_pieces: Vec<TriviaPiece>,
}

impl<'text> Tokenizer<'text> {
    pub fn new(text: &'text str) -> Self {
        Self::with_config(text, TokenizerConfig::default())
    }

    pub fn with_config(text: &'text str, config: TokenizerConfig) -> Self {
        let mut tokenizer = Self {
            text,
            cursor: Cursor::new(text),
            config,
            mode: Mode::Normal,
            current: Token::EOF,
            trivia_pieces: Vec::with_capacity(4),
        };
        tokenizer.next_token();
        tokenizer
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    pub fn is_eof(&self) -> bool {
        self.current.kind == EOF
    }

    pub fn config(&self) -> TokenizerConfig {
        self.config
    }

    fn offset(&self) -> TextSize {
        TextSize::new(self.text.len() as u32) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.pos_within_token(), end)
    }

    fn text(&self) -> &'text str {
        &self.text[self.range()]
    }

    /// Returns the current token and lexes the next one.
    ///
    /// Keeps returning `EOF` once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        if self.mode == Mode::Normal {
            self.trivia();
        }
        let trailing_start = self.trivia_pieces.len();
        let (kind, kind_range) = self.syntax_kind();
        // Strings and comments own their whitespace.
        if self.mode == Mode::Normal {
            self.trivia();
        }

        let (leading, trailing) = self.trivia_pieces.split_at(trailing_start);
        let leading = GreenTrivia::new(leading);
        let trailing = GreenTrivia::new(trailing);

        self.trivia_pieces.clear();
        std::mem::replace(&mut self.current, Token { leading, kind, kind_range, trailing })
    }

    fn trivia(&mut self) {
        if !self.cursor.is_eof() && self.cursor.peek().is_whitespace() {
            self.cursor.advance_while(char::is_whitespace);
            self.trivia_pieces
                .push(TriviaPiece::new(TriviaPieceKind::Whitespace, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        let kind = match self.mode {
            Mode::Normal => self.normal(),
            Mode::String => self.string_piece(),
            Mode::BlockComment => self.block_comment_content(),
            Mode::BlockCommentEnd { terminated } => self.block_comment_end(terminated),
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }

    fn normal(&mut self) -> SyntaxKind {
        if self.cursor.is_eof() {
            return EOF;
        }

        match self.cursor.advance() {
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            ',' => COMMA,
            '"' => {
                self.mode = Mode::String;
                QUOTE
            }
            '0'..='9' => self.number(),
            '/' if self.cursor.eat('/') => {
                self.cursor.advance_while(|c| c != '\n');
                LINE_COMMENT
            }
            '/' if self.cursor.eat('*') => {
                self.mode = Mode::BlockComment;
                BLOCK_COMMENT_START
            }
            '+' | '-' | '*' | '/' => ARITHMETIC_OPERATOR,
            '>' | '<' => {
                self.cursor.eat('=');
                OTHER_OPERATOR
            }
            '=' => {
                if !self.cursor.eat('=') {
                    self.cursor.eat('>');
                }
                OTHER_OPERATOR
            }
            '!' if self.cursor.eat('=') => OTHER_OPERATOR,
            '?' if self.cursor.eat('?') => OTHER_OPERATOR,
            '?' => {
                self.cursor.eat('.');
                PUNCTUATION
            }
            '!' | '.' | ':' => PUNCTUATION,
            c if keywords::is_word_start(c) => {
                self.cursor.advance_while(keywords::is_word_continue);
                keywords::word(self.text())
            }
            _ => UNKNOWN,
        }
    }

    /// `\d[\d_]*(\.[\d_]+)?`
    fn number(&mut self) -> SyntaxKind {
        self.digits();

        if self.cursor.peek() == '.' && is_digit_or_underscore(self.cursor.second()) {
            self.cursor.advance();
            self.digits();
        }

        NUMBER_LITERAL
    }

    fn digits(&mut self) {
        self.cursor.advance_while(is_digit_or_underscore);
    }

    fn string_piece(&mut self) -> SyntaxKind {
        if self.cursor.is_eof() {
            self.mode = Mode::Normal;
            return EOF;
        }

        match self.cursor.advance() {
            '"' => {
                self.mode = Mode::Normal;
                QUOTE
            }
            '\\' => {
                // A lone backslash at the end of input is still an escape.
                if !self.cursor.is_eof() {
                    self.cursor.advance();
                }
                ESCAPE_SEQUENCE
            }
            _ => {
                self.cursor.advance_while(|c| c != '"' && c != '\\');
                STRING_CONTENT
            }
        }
    }

    fn block_comment_content(&mut self) -> SyntaxKind {
        let scan = scanner::scan_block_comment(&mut self.cursor, self.config.block_comments);
        if self.cursor.pos_within_token() == TextSize::new(0) {
            return self.block_comment_end(scan.terminated);
        }

        self.mode = Mode::BlockCommentEnd { terminated: scan.terminated };
        BLOCK_COMMENT_CONTENT
    }

    fn block_comment_end(&mut self, terminated: bool) -> SyntaxKind {
        self.mode = Mode::Normal;
        if !terminated {
            return self.normal();
        }

        self.cursor.advance();
        self.cursor.advance();
        BLOCK_COMMENT_END
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    /// Yields every token before `EOF`.
    fn next(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        Some(self.next_token())
    }
}

fn is_digit_or_underscore(c: char) -> bool {
    c.is_ascii_digit() || c == '_'
}

/// Tokenizes the whole text, excluding the final `EOF` token.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_config(text, TokenizerConfig::default())
}

pub fn tokenize_with_config(text: &str, config: TokenizerConfig) -> Vec<Token> {
    Tokenizer::with_config(text, config).collect()
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use expect_test::{Expect, expect};

    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.kind_range]
    }

    fn check_with(text: &str, config: TokenizerConfig, expect: Expect) {
        let mut actual = String::new();
        let mut covered = 0;
        for token in tokenize_with_config(text, config) {
            assert_eq!(u32::from(token.text_range().start()), covered, "gap before {token:?}");
            covered = token.text_range().end().into();

            write!(actual, "{:?}@{:?} {:?}", token.kind, token.kind_range, token_text(&token, text))
                .unwrap();
            if !token.leading.is_empty() {
                write!(actual, " leading={:?}", u32::from(token.leading.len())).unwrap();
            }
            if !token.trailing.is_empty() {
                write!(actual, " trailing={:?}", u32::from(token.trailing.len())).unwrap();
            }
            actual.push('\n');
        }
        assert_eq!(covered as usize, text.len(), "tokens must cover the input");
        expect.assert_eq(&actual);
    }

    fn check(text: &str, expect: Expect) {
        check_with(text, TokenizerConfig::default(), expect);
    }

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_words() {
        let inputs = [
            ("fn", KEYWORD),
            ("fnord", IDENTIFIER),
            ("foo", IDENTIFIER),
            ("_bar9", IDENTIFIER),
            ("@attr", IDENTIFIER),
            ("naïve", IDENTIFIER),
            ("let", KEYWORD),
            ("string", TYPE_KEYWORD),
            ("true", BOOLEAN_LITERAL),
            ("null", NULL_LITERAL),
            ("this", THIS),
        ];

        for (input, expected_kind) in inputs {
            let mut tokenizer = Tokenizer::new(input);
            let token = tokenizer.next_token();
            assert_eq!(token.kind, expected_kind, "Input: '{input}'");
            assert_eq!(token_text(&token, input), input);
            assert!(tokenizer.is_eof(), "Tokenizer did not consume all input for '{input}'");
        }
    }

    #[test]
    fn test_number_literals() {
        for input in ["0", "123", "1_000", "3.14", "1._5", "1.2_3"] {
            assert_eq!(kinds(input), [NUMBER_LITERAL], "Input: '{input}'");
        }
        assert_eq!(kinds("1."), [NUMBER_LITERAL, PUNCTUATION]);
        assert_eq!(kinds("1.x"), [NUMBER_LITERAL, PUNCTUATION, IDENTIFIER]);
        assert_eq!(kinds("1.2.3"), [NUMBER_LITERAL, PUNCTUATION, NUMBER_LITERAL]);
        assert_eq!(kinds("12abc"), [NUMBER_LITERAL, IDENTIFIER]);
    }

    #[test]
    fn test_operators_longest_match() {
        check(
            "a>=b ?? c?.d => e != !f",
            expect![[r#"
                IDENTIFIER@0..1 "a"
                OTHER_OPERATOR@1..3 ">="
                IDENTIFIER@3..4 "b" trailing=1
                OTHER_OPERATOR@5..7 "??" trailing=1
                IDENTIFIER@8..9 "c"
                PUNCTUATION@9..11 "?."
                IDENTIFIER@11..12 "d" trailing=1
                OTHER_OPERATOR@13..15 "=>" trailing=1
                IDENTIFIER@16..17 "e" trailing=1
                OTHER_OPERATOR@18..20 "!=" trailing=1
                PUNCTUATION@21..22 "!"
                IDENTIFIER@22..23 "f"
            "#]],
        );
    }

    #[test]
    fn test_arithmetic_and_punctuation() {
        assert_eq!(
            kinds("+-*/ = == < <= > . : ? ,"),
            [
                ARITHMETIC_OPERATOR,
                ARITHMETIC_OPERATOR,
                ARITHMETIC_OPERATOR,
                ARITHMETIC_OPERATOR,
                OTHER_OPERATOR,
                OTHER_OPERATOR,
                OTHER_OPERATOR,
                OTHER_OPERATOR,
                OTHER_OPERATOR,
                PUNCTUATION,
                PUNCTUATION,
                PUNCTUATION,
                COMMA,
            ]
        );
    }

    #[test]
    fn test_delimiters_and_whitespace() {
        check(
            "  { [a, b] }\n",
            expect![[r#"
                LEFT_BRACE@2..3 "{" leading=2 trailing=1
                LEFT_BRACKET@4..5 "["
                IDENTIFIER@5..6 "a"
                COMMA@6..7 "," trailing=1
                IDENTIFIER@8..9 "b"
                RIGHT_BRACKET@9..10 "]" trailing=1
                RIGHT_BRACE@11..12 "}" trailing=1
            "#]],
        );
    }

    #[test]
    fn test_string_literal() {
        check(
            r#""a b\"c" x"#,
            expect![[r#"
                QUOTE@0..1 "\""
                STRING_CONTENT@1..4 "a b"
                ESCAPE_SEQUENCE@4..6 "\\\""
                STRING_CONTENT@6..7 "c"
                QUOTE@7..8 "\"" trailing=1
                IDENTIFIER@9..10 "x"
            "#]],
        );
    }

    #[test]
    fn test_string_whitespace_is_content() {
        check(
            "\" \"",
            expect![[r#"
                QUOTE@0..1 "\""
                STRING_CONTENT@1..2 " "
                QUOTE@2..3 "\""
            "#]],
        );
    }

    #[test]
    fn test_unterminated_string() {
        check(
            "\"abc\\",
            expect![[r#"
                QUOTE@0..1 "\""
                STRING_CONTENT@1..4 "abc"
                ESCAPE_SEQUENCE@4..5 "\\"
            "#]],
        );
        let mut tokenizer = Tokenizer::new("\"");
        assert_eq!(tokenizer.next_token().kind, QUOTE);
        assert_eq!(tokenizer.next_token().kind, EOF);
        assert_eq!(tokenizer.next_token().kind, EOF);
    }

    #[test]
    fn test_line_comment() {
        check(
            "a // note { \nb",
            expect![[r#"
                IDENTIFIER@0..1 "a" trailing=1
                LINE_COMMENT@2..12 "// note { " trailing=1
                IDENTIFIER@13..14 "b"
            "#]],
        );
    }

    #[test]
    fn test_block_comment() {
        check(
            "/* a * b */ c",
            expect![[r#"
                BLOCK_COMMENT_START@0..2 "/*"
                BLOCK_COMMENT_CONTENT@2..9 " a * b "
                BLOCK_COMMENT_END@9..11 "*/" trailing=1
                IDENTIFIER@12..13 "c"
            "#]],
        );
        assert_eq!(kinds("/**/"), [BLOCK_COMMENT_START, BLOCK_COMMENT_END]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        check(
            "x /* open",
            expect![[r#"
                IDENTIFIER@0..1 "x" trailing=1
                BLOCK_COMMENT_START@2..4 "/*"
                BLOCK_COMMENT_CONTENT@4..9 " open"
            "#]],
        );
        assert_eq!(kinds("/*"), [BLOCK_COMMENT_START]);
    }

    #[test]
    fn test_nested_block_comments() {
        let text = "/* /* */ */";
        assert_eq!(
            kinds(text),
            [
                BLOCK_COMMENT_START,
                BLOCK_COMMENT_CONTENT,
                BLOCK_COMMENT_END,
                ARITHMETIC_OPERATOR,
                ARITHMETIC_OPERATOR
            ]
        );

        let config = TokenizerConfig { block_comments: BlockCommentStyle::Nested };
        check_with(
            text,
            config,
            expect![[r#"
                BLOCK_COMMENT_START@0..2 "/*"
                BLOCK_COMMENT_CONTENT@2..9 " /* */ "
                BLOCK_COMMENT_END@9..11 "*/"
            "#]],
        );
    }

    #[test]
    fn test_unknown_characters() {
        check(
            "a # ✓\0",
            expect![[r##"
                IDENTIFIER@0..1 "a" trailing=1
                UNKNOWN@2..3 "#" trailing=1
                UNKNOWN@4..7 "✓"
                UNKNOWN@7..8 "\0"
            "##]],
        );
    }

    #[test]
    fn test_unicode_whitespace_is_trivia() {
        check(
            "a\u{a0}\u{2003}b",
            expect![[r#"
                IDENTIFIER@0..1 "a" trailing=5
                IDENTIFIER@6..7 "b"
            "#]],
        );
    }

    #[test]
    fn test_eof_carries_trailing_whitespace_only_once() {
        let text = "a  ";
        let mut tokenizer = Tokenizer::new(text);
        let a = tokenizer.next_token();
        assert_eq!(a.trailing.len(), TextSize::new(2));
        let eof = tokenizer.next_token();
        assert_eq!(eof.kind, EOF);
        assert_eq!(eof.kind_range, TextRange::empty(TextSize::new(3)));
        assert!(eof.leading.is_empty());
        assert!(tokenizer.is_eof());
    }

    #[test]
    fn test_empty_input() {
        let mut tokenizer = Tokenizer::new("");
        assert!(tokenizer.is_eof());
        assert_eq!(tokenizer.next_token().kind, EOF);
        assert!(tokenize("   ").is_empty());
    }
}
