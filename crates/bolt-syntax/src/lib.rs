//! Lossless, immutable syntax tree for Bolt source text.
//!
//! Parsing produces a position independent green tree that can be shared
//! between parses. The green tree is then laid out into arenas with absolute
//! offsets and parent links and navigated through lifetime-bound handles.

mod builder;
mod green;
mod nodes;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Incremental builder for constructing a `GreenNode`.
pub use builder::Builder;
/// Shareable tree layer used for subtree reuse.
pub use green::{GreenChildren, GreenElement, GreenNode, GreenToken};
/// Primary syntax tree API types and adapters.
pub use syntax::{
    Children, ChildrenWithTokens, NodeOrToken, Preorder, PreorderWithTokens, SyntaxElement,
    SyntaxNode, SyntaxToken, SyntaxTree, TokenAtOffset, TriviaIter, WalkEvent,
    WalkEventWithTokens,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{GreenTrivia, TriviaPiece, TriviaPieceKind};
