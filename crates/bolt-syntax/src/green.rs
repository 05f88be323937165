//! Immutable, position independent tree layer shared between parses.
//!
//! Green nodes only know their kind and length, so a subtree whose text did
//! not change can be moved into a new tree as-is, whatever its new offset.

use std::fmt;

use text_size::TextSize;
use triomphe::Arc;

use crate::{GreenTrivia, NodeOrToken, SyntaxKind};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_len(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.text_len(),
            NodeOrToken::Token(token) => token.text_len(),
        }
    }
}

/// Interior node: kind, error flag and children.
///
/// Children are kept in a persistent chunked sequence, so replacing one child
/// of a wide node copies a path of small chunks instead of the whole list.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

struct GreenNodeData {
    kind: SyntaxKind,
    is_error: bool,
    text_len: TextSize,
    children: Children,
}

/// Children per leaf, and chunks per branch.
const CHUNK_LEN: usize = 32;

enum Children {
    Leaf(Box<[GreenElement]>),
    Branch(Box<[Chunk]>),
}

#[derive(Clone)]
struct Chunk {
    data: Arc<ChunkData>,
}

struct ChunkData {
    len: usize,
    text_len: TextSize,
    children: Children,
}

impl Chunk {
    fn new(children: Children) -> Self {
        Self { data: Arc::new(ChunkData { len: children.len(), text_len: children.text_len(), children }) }
    }
}

impl Children {
    fn build(elements: Vec<GreenElement>) -> Self {
        if elements.len() <= CHUNK_LEN {
            return Self::Leaf(elements.into_boxed_slice());
        }

        let mut level = elements
            .chunks(CHUNK_LEN)
            .map(|leaf| Chunk::new(Self::Leaf(leaf.into())))
            .collect::<Vec<_>>();
        while level.len() > CHUNK_LEN {
            level = level.chunks(CHUNK_LEN).map(|branch| Chunk::new(Self::Branch(branch.into()))).collect();
        }

        Self::Branch(level.into_boxed_slice())
    }

    fn len(&self) -> usize {
        match self {
            Self::Leaf(elements) => elements.len(),
            Self::Branch(chunks) => chunks.iter().map(|chunk| chunk.data.len).sum(),
        }
    }

    fn text_len(&self) -> TextSize {
        match self {
            Self::Leaf(elements) => elements.iter().map(GreenElement::text_len).sum(),
            Self::Branch(chunks) => chunks.iter().map(|chunk| chunk.data.text_len).sum(),
        }
    }

    /// The element at `index` with its offset from the start of the node.
    fn get(&self, mut index: usize) -> Option<(TextSize, &GreenElement)> {
        let mut children = self;
        let mut offset = TextSize::new(0);

        loop {
            match children {
                Self::Leaf(elements) => {
                    let element = elements.get(index)?;
                    offset += elements[..index].iter().map(GreenElement::text_len).sum::<TextSize>();
                    return Some((offset, element));
                }
                Self::Branch(chunks) => {
                    let mut found = None;
                    for chunk in chunks.iter() {
                        if index < chunk.data.len {
                            found = Some(chunk);
                            break;
                        }
                        index -= chunk.data.len;
                        offset += chunk.data.text_len;
                    }
                    children = &found?.data.children;
                }
            }
        }
    }

    /// The element whose range contains `offset`, with its index and start.
    fn at_offset(&self, mut offset: TextSize) -> Option<(usize, TextSize, &GreenElement)> {
        let mut children = self;
        let mut index = 0;
        let mut start = TextSize::new(0);

        loop {
            match children {
                Self::Leaf(elements) => {
                    for (i, element) in elements.iter().enumerate() {
                        if offset < element.text_len() {
                            return Some((index + i, start, element));
                        }
                        offset -= element.text_len();
                        start += element.text_len();
                    }
                    return None;
                }
                Self::Branch(chunks) => {
                    let mut found = None;
                    for chunk in chunks.iter() {
                        if offset < chunk.data.text_len {
                            found = Some(chunk);
                            break;
                        }
                        offset -= chunk.data.text_len;
                        start += chunk.data.text_len;
                        index += chunk.data.len;
                    }
                    children = &found?.data.children;
                }
            }
        }
    }

    /// Copies the path down to `index`; every other chunk is shared.
    fn replace(&self, index: usize, element: GreenElement) -> Self {
        match self {
            Self::Leaf(elements) => {
                let mut elements = elements.to_vec();
                elements[index] = element;
                Self::Leaf(elements.into_boxed_slice())
            }
            Self::Branch(chunks) => {
                let mut local = index;
                let position = chunks
                    .iter()
                    .position(|chunk| {
                        if local < chunk.data.len {
                            return true;
                        }
                        local -= chunk.data.len;
                        false
                    })
                    .expect("child index out of bounds");

                let mut chunks = chunks.to_vec();
                chunks[position] = Chunk::new(chunks[position].data.children.replace(local, element));
                Self::Branch(chunks.into_boxed_slice())
            }
        }
    }
}

enum Garbage {
    Element(GreenElement),
    Chunk(Chunk),
}

impl Garbage {
    fn collect(children: Children, stack: &mut Vec<Self>) {
        match children {
            Children::Leaf(elements) => stack.extend(elements.into_vec().into_iter().map(Self::Element)),
            Children::Branch(chunks) => stack.extend(chunks.into_vec().into_iter().map(Self::Chunk)),
        }
    }
}

impl Drop for GreenNodeData {
    // Unlinks uniquely owned descendants one level at a time so dropping a
    // deeply nested tree does not recurse once per level.
    fn drop(&mut self) {
        let mut stack = Vec::new();
        Garbage::collect(std::mem::replace(&mut self.children, Children::Leaf(Box::default())), &mut stack);

        while let Some(garbage) = stack.pop() {
            match garbage {
                Garbage::Element(NodeOrToken::Node(node)) => {
                    if let Ok(mut data) = Arc::try_unwrap(node.data) {
                        let children = std::mem::replace(&mut data.children, Children::Leaf(Box::default()));
                        Garbage::collect(children, &mut stack);
                    }
                }
                Garbage::Element(NodeOrToken::Token(_)) => {}
                Garbage::Chunk(chunk) => {
                    if let Ok(data) = Arc::try_unwrap(chunk.data) {
                        Garbage::collect(data.children, &mut stack);
                    }
                }
            }
        }
    }
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, is_error: bool, children: Vec<GreenElement>) -> Self {
        let children = Children::build(children);
        let text_len = children.text_len();
        Self { data: Arc::new(GreenNodeData { kind, is_error, text_len, children }) }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    pub fn is_error(&self) -> bool {
        self.data.is_error
    }

    pub fn text_len(&self) -> TextSize {
        self.data.text_len
    }

    pub fn child_count(&self) -> usize {
        self.data.children.len()
    }

    /// The child at `index` together with its offset relative to this node.
    pub fn child(&self, index: usize) -> Option<(TextSize, &GreenElement)> {
        self.data.children.get(index)
    }

    /// The child whose range contains `offset`, relative to this node.
    /// Empty children never match.
    pub fn child_at_offset(&self, offset: TextSize) -> Option<(usize, TextSize, &GreenElement)> {
        self.data.children.at_offset(offset)
    }

    pub fn children(&self) -> GreenChildren<'_> {
        GreenChildren { chunks: Vec::new(), leaf: [].iter() }.start(&self.data.children)
    }

    /// Identity, not structural equality.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Returns a copy of this node with the child at `index` swapped out.
    /// Every other child is shared with `self`.
    ///
    /// # Panics
    ///
    /// When `index` is out of bounds.
    pub fn replace_child(&self, index: usize, child: GreenElement) -> Self {
        let children = self.data.children.replace(index, child);
        let text_len = children.text_len();
        Self {
            data: Arc::new(GreenNodeData {
                kind: self.kind(),
                is_error: self.is_error(),
                text_len,
                children,
            }),
        }
    }
}

/// Children of a green node in order.
pub struct GreenChildren<'a> {
    chunks: Vec<std::slice::Iter<'a, Chunk>>,
    leaf: std::slice::Iter<'a, GreenElement>,
}

impl<'a> GreenChildren<'a> {
    fn start(mut self, children: &'a Children) -> Self {
        match children {
            Children::Leaf(elements) => self.leaf = elements.iter(),
            Children::Branch(chunks) => self.chunks.push(chunks.iter()),
        }
        self
    }
}

impl<'a> Iterator for GreenChildren<'a> {
    type Item = &'a GreenElement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.leaf.next() {
                return Some(element);
            }

            let chunks = self.chunks.last_mut()?;
            match chunks.next() {
                Some(chunk) => match &chunk.data.children {
                    Children::Leaf(elements) => self.leaf = elements.iter(),
                    Children::Branch(chunks) => self.chunks.push(chunks.iter()),
                },
                None => {
                    self.chunks.pop();
                }
            }
        }
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("is_error", &self.is_error())
            .field("text_len", &self.text_len())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Leaf token with its attached trivia. Stores lengths, never text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

#[derive(PartialEq, Eq, Hash)]
struct GreenTokenData {
    leading: GreenTrivia,
    kind: SyntaxKind,
    len: TextSize,
    trailing: GreenTrivia,
}

impl GreenToken {
    pub fn new(leading: GreenTrivia, kind: SyntaxKind, len: TextSize, trailing: GreenTrivia) -> Self {
        Self { data: Arc::new(GreenTokenData { leading, kind, len, trailing }) }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    pub fn leading(&self) -> &GreenTrivia {
        &self.data.leading
    }

    pub fn trailing(&self) -> &GreenTrivia {
        &self.data.trailing
    }

    /// Length of the token text without trivia.
    pub fn text_trimmed_len(&self) -> TextSize {
        self.data.len
    }

    /// Length including leading and trailing trivia.
    pub fn text_len(&self) -> TextSize {
        self.data.leading.len() + self.data.len + self.data.trailing.len()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken")
            .field("kind", &self.kind())
            .field("leading", self.leading())
            .field("len", &self.text_trimmed_len())
            .field("trailing", self.trailing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TriviaPiece, TriviaPieceKind};

    fn whitespace(len: u32) -> GreenTrivia {
        GreenTrivia::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())])
    }

    fn token(kind: SyntaxKind, len: u32) -> GreenElement {
        NodeOrToken::Token(GreenToken::new(GreenTrivia::empty(), kind, len.into(), whitespace(1)))
    }

    #[test]
    fn token_len_includes_trivia() {
        let token = GreenToken::new(whitespace(3), SyntaxKind::KEYWORD, 2.into(), whitespace(1));

        assert_eq!(token.text_trimmed_len(), TextSize::new(2));
        assert_eq!(token.text_len(), TextSize::new(6));
    }

    #[test]
    fn node_len_sums_children() {
        let node = GreenNode::new(
            SyntaxKind::BLOCK,
            false,
            vec![token(SyntaxKind::LEFT_BRACE, 1), token(SyntaxKind::RIGHT_BRACE, 1)],
        );

        assert_eq!(node.text_len(), TextSize::new(4));
        assert_eq!(node.child_count(), 2);
        assert_eq!(node.children().count(), 2);
        assert!(!node.is_error());
    }

    #[test]
    fn replace_child_shares_siblings() {
        let inner = GreenNode::new(SyntaxKind::BLOCK, false, vec![token(SyntaxKind::LEFT_BRACE, 1)]);
        let node = GreenNode::new(
            SyntaxKind::SOURCE_FILE,
            false,
            vec![NodeOrToken::Node(inner.clone()), token(SyntaxKind::IDENTIFIER, 3)],
        );

        let replaced = node.replace_child(1, token(SyntaxKind::IDENTIFIER, 5));

        assert!(!replaced.ptr_eq(&node));
        assert!(replaced.child(0).and_then(|(_, it)| it.as_node()).is_some_and(|it| it.ptr_eq(&inner)));
        assert_eq!(replaced.text_len(), TextSize::new(8));
    }

    #[test]
    fn wide_node_replace_copies_one_path() {
        let children = (0..100_000).map(|_| token(SyntaxKind::IDENTIFIER, 1)).collect();
        let node = GreenNode::new(SyntaxKind::SOURCE_FILE, false, children);

        let replaced = node.replace_child(70_000, token(SyntaxKind::IDENTIFIER, 4));

        assert_eq!(replaced.child_count(), 100_000);
        assert_eq!(replaced.text_len(), TextSize::new(200_003));
        assert_eq!(replaced.child(70_000).map(|(offset, _)| offset), Some(TextSize::new(140_000)));
        assert_eq!(replaced.child(70_001).map(|(offset, _)| offset), Some(TextSize::new(140_005)));

        let (Children::Branch(old), Children::Branch(new)) = (&node.data.children, &replaced.data.children) else {
            panic!("wide node should be chunked");
        };
        let shared = old.iter().zip(new.iter()).filter(|(a, b)| Arc::ptr_eq(&a.data, &b.data)).count();
        assert_eq!(shared, old.len() - 1);

        for index in [0, 31, 32, 69_999, 70_001, 99_999] {
            let (Some((_, a)), Some((_, b))) = (node.child(index), replaced.child(index)) else {
                panic!("missing child {index}");
            };
            assert!(a.as_token().zip(b.as_token()).is_some_and(|(a, b)| a.ptr_eq(b)));
        }
    }

    #[test]
    fn child_lookup_by_offset() {
        let children = (0..1_000)
            .map(|i| if i % 2 == 0 { token(SyntaxKind::IDENTIFIER, 1) } else { token(SyntaxKind::NUMBER_LITERAL, 3) })
            .collect();
        let node = GreenNode::new(SyntaxKind::SOURCE_FILE, false, children);

        // Each pair spans 2 + 4 bytes.
        let (index, start, element) = node.child_at_offset(TextSize::new(605)).unwrap();
        assert_eq!((index, start, element.kind()), (201, TextSize::new(602), SyntaxKind::NUMBER_LITERAL));
        assert!(node.child_at_offset(node.text_len()).is_none());
        assert_eq!(node.children().count(), 1_000);
    }

    #[test]
    fn deep_tree_drops_without_overflow() {
        let mut node = GreenNode::new(SyntaxKind::BLOCK, false, vec![token(SyntaxKind::LEFT_BRACE, 1)]);
        for _ in 0..200_000 {
            node = GreenNode::new(SyntaxKind::BLOCK, false, vec![NodeOrToken::Node(node)]);
        }
        drop(node);
    }
}
