#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_BRACE,
    RIGHT_BRACE,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    COMMA,
    QUOTE,

    KEYWORD,
    TYPE_KEYWORD,
    IDENTIFIER,
    NUMBER_LITERAL,
    BOOLEAN_LITERAL,
    NULL_LITERAL,
    THIS,

    ARITHMETIC_OPERATOR,
    OTHER_OPERATOR,
    PUNCTUATION,

    STRING_CONTENT,
    ESCAPE_SEQUENCE,

    LINE_COMMENT,
    BLOCK_COMMENT_START,
    BLOCK_COMMENT_CONTENT,
    BLOCK_COMMENT_END,

    WHITESPACE,
    UNKNOWN,
    EOF,

    SOURCE_FILE,
    BLOCK,
    ARRAY_LITERAL,
    STRING_LITERAL,
    OPERATOR,
    BLOCK_COMMENT,
    ERROR,
    TOMBSTONE,
}

impl SyntaxKind {
    /// Whitespace attached to tokens as trivia pieces.
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE)
    }

    /// Named kinds show up in s-expressions; anonymous ones are delimiters.
    pub const fn is_named(self) -> bool {
        !matches!(
            self,
            Self::LEFT_BRACE
                | Self::RIGHT_BRACE
                | Self::LEFT_BRACKET
                | Self::RIGHT_BRACKET
                | Self::COMMA
                | Self::QUOTE
                | Self::STRING_CONTENT
                | Self::BLOCK_COMMENT_START
                | Self::BLOCK_COMMENT_CONTENT
                | Self::BLOCK_COMMENT_END
                | Self::WHITESPACE
                | Self::EOF
                | Self::TOMBSTONE
        )
    }

    /// The grammar rule name, or the literal text for anonymous delimiters.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LEFT_BRACE => "{",
            Self::RIGHT_BRACE => "}",
            Self::LEFT_BRACKET => "[",
            Self::RIGHT_BRACKET => "]",
            Self::COMMA => ",",
            Self::QUOTE => "\"",
            Self::KEYWORD => "keyword",
            Self::TYPE_KEYWORD => "type_keyword",
            Self::IDENTIFIER => "identifier",
            Self::NUMBER_LITERAL => "number_literal",
            Self::BOOLEAN_LITERAL => "boolean_literal",
            Self::NULL_LITERAL => "null_literal",
            Self::THIS => "this",
            Self::ARITHMETIC_OPERATOR => "arithmetic_operator",
            Self::OTHER_OPERATOR => "other_operator",
            Self::PUNCTUATION => "punctuation",
            Self::STRING_CONTENT => "string_content",
            Self::ESCAPE_SEQUENCE => "escape_sequence",
            Self::LINE_COMMENT => "line_comment",
            Self::BLOCK_COMMENT_START => "/*",
            Self::BLOCK_COMMENT_CONTENT => "block_comment_content",
            Self::BLOCK_COMMENT_END => "*/",
            Self::WHITESPACE => "whitespace",
            Self::UNKNOWN => "unknown",
            Self::EOF => "end",
            Self::SOURCE_FILE => "source_file",
            Self::BLOCK => "block",
            Self::ARRAY_LITERAL => "array_literal",
            Self::STRING_LITERAL => "string_literal",
            Self::OPERATOR => "operator",
            Self::BLOCK_COMMENT => "block_comment",
            Self::ERROR => "ERROR",
            Self::TOMBSTONE => "tombstone",
        }
    }
}
