//! Parser for Bolt source text.
//!
//! Parsing is total: every input produces a complete, lossless tree.
//! Malformed input is represented by error nodes and reported as
//! [`Diagnostic`]s.

mod grammar;
mod parser;
mod reparse;

use bolt_errors::Diagnostic;
use bolt_syntax::{GreenNode, SyntaxTree};
use bolt_tokenizer::TokenizerConfig;

pub use crate::reparse::Edit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParseConfig {
    pub tokenizer: TokenizerConfig,
}

/// The result of parsing a text: the tree and what went wrong on the way.
#[derive(Debug)]
pub struct Parse {
    tree: SyntaxTree,
    errors: Vec<Diagnostic>,
    config: ParseConfig,
}

pub fn parse(text: &str) -> Parse {
    parse_with_config(text, ParseConfig::default())
}

pub fn parse_with_config(text: &str, config: ParseConfig) -> Parse {
    let (green, errors) = parse_green(text, config);
    Parse { tree: SyntaxTree::new(text, green), errors, config }
}

pub(crate) fn parse_green(text: &str, config: ParseConfig) -> (GreenNode, Vec<Diagnostic>) {
    let mut parser = parser::Parser::new(text, config.tokenizer);
    grammar::source_file(&mut parser);
    parser.finish()
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn config(&self) -> ParseConfig {
        self.config
    }

    pub fn debug_tree(&self) -> String {
        self.tree.debug_dump()
    }

    pub fn to_sexp(&self) -> String {
        self.tree.to_sexp()
    }
}
