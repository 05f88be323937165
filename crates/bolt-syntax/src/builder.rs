//! Incremental builder for the green tree.

use text_size::TextSize;

use crate::{GreenElement, GreenNode, GreenToken, GreenTrivia, NodeOrToken, SyntaxKind};

struct Opened {
    kind: SyntaxKind,
    is_error: bool,
    first_child: usize,
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_TREE_SIZE: usize = 1024;

/// Builds a `GreenNode` from parser events.
///
/// Children of all open nodes share one buffer; finishing a node drains its
/// slice of that buffer, so building never recurses.
pub struct Builder {
    opened: Vec<Opened>,
    children: Vec<GreenElement>,
    root: Option<GreenNode>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            children: Vec::with_capacity(DEFAULT_TREE_SIZE),
            root: None,
        }
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind, is_error: bool) {
        assert!(self.root.is_none(), "the root node is already finished");
        self.opened.push(Opened { kind, is_error, first_child: self.children.len() });
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let Opened { kind, is_error, first_child } =
            self.opened.pop().expect("no opened nodes?");
        let children = self.children.drain(first_child..).collect();
        let node = GreenNode::new(kind, is_error, children);

        if self.opened.is_empty() {
            self.root = Some(node);
        } else {
            self.children.push(NodeOrToken::Node(node));
        }
    }

    /// Adds a token with its leading and trailing trivia.
    pub fn token(
        &mut self,
        leading: GreenTrivia,
        kind: SyntaxKind,
        len: TextSize,
        trailing: GreenTrivia,
    ) {
        assert!(!self.opened.is_empty(), "tokens must be inside a node");
        self.children.push(NodeOrToken::Token(GreenToken::new(leading, kind, len, trailing)));
    }

    /// Finishes building and returns the root.
    pub fn finish(mut self) -> GreenNode {
        assert!(self.opened.is_empty(), "unfinished nodes");
        self.root.take().expect("no root node")
    }
}
