use bolt_syntax::SyntaxKind::{self, *};

/// Classifies a maximal identifier-shaped span.
pub(crate) fn word(text: &str) -> SyntaxKind {
    match text {
        "true" | "false" => BOOLEAN_LITERAL,
        "null" => NULL_LITERAL,
        "this" => THIS,
        "if" | "else" | "for" | "return" | "break" | "continue" | "do" | "then" | "fn"
        | "import" | "from" | "as" | "export" | "type" | "typeof" | "let" | "const" | "final"
        | "unsealed" | "enum" | "in" | "by" | "to" | "and" | "or" | "not" | "is" | "match" => {
            KEYWORD
        }
        "any" | "number" | "string" | "bool" | "array" | "table" | "module" | "Type" => {
            TYPE_KEYWORD
        }
        _ => IDENTIFIER,
    }
}

pub(crate) fn is_word_start(c: char) -> bool {
    c == '@' || c == '_' || (c.is_alphanumeric() && !c.is_ascii_digit())
}

pub(crate) fn is_word_continue(c: char) -> bool {
    c == '@' || c == '_' || c.is_alphanumeric()
}
