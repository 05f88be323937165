//! Node storage and child links.

use la_arena::Idx;
use text_size::{TextRange, TextSize};

use super::token::TokenId;
use crate::GreenNode;

pub(crate) type NodeId = Idx<NodeData>;

/// Node stored in the tree arena once navigation first reaches it.
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    /// Position among the parent's children.
    pub(crate) index: u32,
    pub(crate) offset: TextSize,
    pub(crate) green: GreenNode,
}

impl NodeData {
    #[inline]
    pub(crate) fn range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len())
    }
}

/// Index of a child, in source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Child {
    Node(NodeId),
    Token(TokenId),
}
