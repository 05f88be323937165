//! Incremental reparsing.
//!
//! An edit that stays between the delimiters of a well-formed block or array
//! only needs that node re-tokenized and re-parsed: nothing inside a balanced
//! pair of delimiters changes how the text around it is parsed. The new node
//! is spliced into the old green tree, sharing every untouched subtree.

use bolt_errors::Diagnostic;
use bolt_syntax::{GreenElement, NodeOrToken, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::{TextRange, TextSize};

use crate::{Parse, parse_green, parse_with_config};

/// A single text replacement, in offsets of the text before the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start: TextSize,
    pub removed_len: TextSize,
    pub inserted_len: TextSize,
}

impl Edit {
    pub fn new(start: TextSize, removed_len: TextSize, inserted_len: TextSize) -> Self {
        Self { start, removed_len, inserted_len }
    }

    /// Replacing `range` with `inserted`.
    pub fn replace(range: TextRange, inserted: &str) -> Self {
        Self::new(range.start(), range.len(), TextSize::of(inserted))
    }

    /// Applies the edit to `text`.
    ///
    /// # Panics
    ///
    /// When `inserted` does not have the length of the edit or the removed
    /// range is outside of `text`.
    pub fn apply(&self, text: &str, inserted: &str) -> String {
        assert_eq!(TextSize::of(inserted), self.inserted_len, "inserted text has the wrong length");
        let mut text = text.to_owned();
        text.replace_range(std::ops::Range::<usize>::from(self.removed()), inserted);
        text
    }

    pub fn removed(&self) -> TextRange {
        TextRange::at(self.start, self.removed_len)
    }

    fn delta(&self) -> i64 {
        i64::from(u32::from(self.inserted_len)) - i64::from(u32::from(self.removed_len))
    }
}

fn shift(offset: TextSize, delta: i64) -> TextSize {
    TextSize::new((i64::from(u32::from(offset)) + delta) as u32)
}

impl Parse {
    /// Parses `new_text`, the result of applying `edit` to this parse's text.
    ///
    /// The result is the same as a fresh parse of `new_text`. When the edit
    /// lies inside a well-formed block or array, only that node is parsed
    /// again and the rest of the green tree is shared with `self`.
    pub fn reparse(&self, new_text: &str, edit: Edit) -> Parse {
        self.try_reparse(new_text, edit)
            .unwrap_or_else(|| parse_with_config(new_text, self.config))
    }

    fn try_reparse(&self, new_text: &str, edit: Edit) -> Option<Parse> {
        let old_len = u32::from(TextSize::of(self.tree.text()));
        let start = u32::from(edit.start);
        let removed_end = start.checked_add(edit.removed_len.into())?;
        let inserted_end = start.checked_add(edit.inserted_len.into())?;
        let new_len = old_len.checked_sub(edit.removed_len.into())?.checked_add(edit.inserted_len.into())?;

        if removed_end > old_len
            || new_len as usize != new_text.len()
            || !new_text.is_char_boundary(start as usize)
            || !new_text.is_char_boundary(inserted_end as usize)
        {
            return None;
        }
        let removed = TextRange::new(edit.start, removed_end.into());

        let innermost = match self.tree.root().covering_element(removed) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => token.parent(),
        };

        innermost
            .ancestors()
            .filter(|node| encloses(*node, removed))
            .find_map(|node| self.reparse_node(node, new_text, edit))
    }

    fn reparse_node(&self, node: SyntaxNode<'_>, new_text: &str, edit: Edit) -> Option<Parse> {
        let delta = edit.delta();
        let old_range = node.text_range();
        let new_range = TextRange::new(old_range.start(), shift(old_range.end(), delta));
        let slice = new_text.get(std::ops::Range::<usize>::from(new_range))?;

        let (green, errors) = parse_green(slice, self.config);
        if green.child_count() != 2 {
            return None;
        }
        let (Some((_, NodeOrToken::Node(new_node))), Some((_, NodeOrToken::Token(eof)))) =
            (green.child(0), green.child(1))
        else {
            return None;
        };
        if new_node.kind() != node.kind()
            || new_node.is_error()
            || eof.kind() != SyntaxKind::EOF
            || eof.text_len() != TextSize::new(0)
        {
            return None;
        }

        let mut replacement = new_node.clone();
        let mut current = node;
        while let Some(parent) = current.parent() {
            replacement = parent.green().replace_child(current.index(), GreenElement::Node(replacement));
            current = parent;
        }

        // Diagnostics on the opening delimiter come from the surrounding
        // context, never from the contents.
        let contents_start = node.first_token()?.trimmed_range().end();
        let mut before = Vec::new();
        let mut after = Vec::new();
        for error in &self.errors {
            let start = error.range().start();
            if start >= old_range.end() {
                after.push(error.shifted(delta));
            } else if start < contents_start {
                before.push(error.clone());
            }
        }

        let offset = i64::from(u32::from(new_range.start()));
        let errors = before
            .into_iter()
            .chain(errors.iter().map(|error| error.shifted(offset)))
            .chain(after)
            .collect::<Vec<Diagnostic>>();

        Some(Parse { tree: SyntaxTree::new(new_text, replacement), errors, config: self.config })
    }
}

/// Whether `node` is a well-formed block or array whose delimiters strictly
/// contain `range`.
fn encloses(node: SyntaxNode<'_>, range: TextRange) -> bool {
    let (open, close) = match node.kind() {
        SyntaxKind::BLOCK => (SyntaxKind::LEFT_BRACE, SyntaxKind::RIGHT_BRACE),
        SyntaxKind::ARRAY_LITERAL => (SyntaxKind::LEFT_BRACKET, SyntaxKind::RIGHT_BRACKET),
        _ => return false,
    };
    if node.is_error() {
        return false;
    }

    let mut children = node.children_with_tokens();
    let (Some(NodeOrToken::Token(first)), Some(NodeOrToken::Token(last))) =
        (children.next(), children.next_back())
    else {
        return false;
    };

    first.kind() == open
        && last.kind() == close
        && first.trimmed_range().end() <= range.start()
        && range.end() <= last.trimmed_range().start()
}
