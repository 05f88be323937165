use std::sync::{Mutex, MutexGuard, PoisonError};

use la_arena::Arena;
use rustc_hash::FxHashMap;
use text_size::TextSize;

use super::node::{Child, NodeData, NodeId};
use super::token::{TokenData, TokenId};
use crate::{GreenNode, NodeOrToken};

/// Arena holding the nodes and tokens of one tree.
///
/// Only the root exists up front. A child gets its slot and absolute offset
/// the first time it is visited, and keeps it for the life of the tree.
pub(crate) struct TreeInner {
    pub(crate) text: Box<str>,
    pub(crate) green: GreenNode,
    pub(crate) root: NodeId,
    store: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    nodes: Arena<NodeData>,
    tokens: Arena<TokenData>,
    children: FxHashMap<(NodeId, u32), Child>,
}

impl Store {
    fn child(&mut self, parent: NodeId, index: usize) -> Option<Child> {
        let key = (parent, u32::try_from(index).ok()?);
        if let Some(&child) = self.children.get(&key) {
            return Some(child);
        }

        let (offset, element) = {
            let data = &self.nodes[parent];
            let (relative, element) = data.green.child(index)?;
            (data.offset + relative, element.clone())
        };

        let child = match element {
            NodeOrToken::Node(green) => Child::Node(self.nodes.alloc(NodeData {
                parent: Some(parent),
                index: key.1,
                offset,
                green,
            })),
            NodeOrToken::Token(green) => {
                Child::Token(self.tokens.alloc(TokenData { parent, index: key.1, offset, green }))
            }
        };
        self.children.insert(key, child);
        Some(child)
    }
}

impl TreeInner {
    pub(crate) fn new(text: Box<str>, green: GreenNode) -> Self {
        assert_eq!(
            green.text_len(),
            TextSize::of(&*text),
            "green tree does not match the source text"
        );

        let mut store = Store::default();
        let root = store.nodes.alloc(NodeData {
            parent: None,
            index: 0,
            offset: TextSize::new(0),
            green: green.clone(),
        });

        Self { text, green, root, store: Mutex::new(store) }
    }

    // Callbacks passed to `node` and `token` must not reenter the tree.
    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn node<R>(&self, id: NodeId, f: impl FnOnce(&NodeData) -> R) -> R {
        f(&self.store().nodes[id])
    }

    #[inline]
    pub(crate) fn token<R>(&self, id: TokenId, f: impl FnOnce(&TokenData) -> R) -> R {
        f(&self.store().tokens[id])
    }

    pub(crate) fn child(&self, parent: NodeId, index: usize) -> Option<Child> {
        self.store().child(parent, index)
    }

    /// The child of `parent` whose range contains the absolute `offset`.
    pub(crate) fn child_at_offset(&self, parent: NodeId, offset: TextSize) -> Option<Child> {
        let mut store = self.store();
        let index = {
            let data = &store.nodes[parent];
            let relative = offset.checked_sub(data.offset)?;
            data.green.child_at_offset(relative)?.0
        };
        store.child(parent, index)
    }

    /// Nodes and tokens allocated so far.
    #[cfg(test)]
    pub(crate) fn allocated(&self) -> (usize, usize) {
        let store = self.store();
        (store.nodes.len(), store.tokens.len())
    }
}
