//! Public syntax tree API built on immutable, parent-linked arena nodes.

use std::fmt::{self, Write as _};

use text_size::{TextRange, TextSize};

use crate::nodes::{Child, NodeId, TokenId, TreeInner};
use crate::{GreenNode, SyntaxKind};

/// Owned syntax tree for a single source text.
pub struct SyntaxTree {
    pub(crate) tree: TreeInner,
}

impl SyntaxTree {
    /// Wraps `green` over `text`. Nodes below the root get their absolute
    /// positions on first visit, so this does not walk the tree.
    ///
    /// # Panics
    ///
    /// When the green tree's length differs from the text length.
    pub fn new(text: impl Into<Box<str>>, green: GreenNode) -> Self {
        Self { tree: TreeInner::new(text.into(), green) }
    }

    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: &self.tree, id: self.tree.root }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.tree.text
    }

    /// Returns the green root this tree was laid out from.
    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.tree.green
    }

    /// Every token in source order, trivia included.
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken<'_>> {
        self.root()
            .preorder_with_tokens()
            .filter_map(|event| match event {
                WalkEventWithTokens::Token(token) => Some(token),
                _ => None,
            })
            .flat_map(|token| token.leading_trivia().chain(Some(token)).chain(token.trailing_trivia()))
    }

    /// Indented listing of every node and token, trivia included.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut indent = 0usize;

        for event in self.root().preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    let error = if node.has_error_flag() { " (error)" } else { "" };
                    _ = writeln!(out, "{:indent$}{node:?}{error}", "", indent = indent * 2);
                    indent += 1;
                }
                WalkEventWithTokens::LeaveNode(_) => indent -= 1,
                WalkEventWithTokens::Token(token) => {
                    let pieces =
                        token.leading_trivia().chain(Some(token)).chain(token.trailing_trivia());
                    for token in pieces {
                        _ = writeln!(
                            out,
                            "{:indent$}{token:?} {:?}",
                            "",
                            token.text_trimmed(),
                            indent = indent * 2
                        );
                    }
                }
            }
        }

        out
    }

    /// Tree-sitter style s-expression over named nodes and tokens.
    ///
    /// Error-flagged nodes list the delimiter they are missing, like
    /// `(block (identifier) (MISSING "}"))`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();

        for event in self.root().preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push('(');
                    out.push_str(node.kind().name());
                }
                WalkEventWithTokens::LeaveNode(node) => {
                    if node.has_error_flag()
                        && let Some(missing) = closing_delimiter(node.kind())
                    {
                        _ = write!(out, " (MISSING {:?})", missing.name());
                    }
                    out.push(')');
                }
                WalkEventWithTokens::Token(token) if token.kind().is_named() => {
                    _ = write!(out, " ({})", token.kind().name());
                }
                WalkEventWithTokens::Token(_) => {}
            }
        }

        out
    }
}

fn closing_delimiter(kind: SyntaxKind) -> Option<SyntaxKind> {
    match kind {
        SyntaxKind::BLOCK => Some(SyntaxKind::RIGHT_BRACE),
        SyntaxKind::ARRAY_LITERAL => Some(SyntaxKind::RIGHT_BRACKET),
        SyntaxKind::STRING_LITERAL => Some(SyntaxKind::QUOTE),
        SyntaxKind::BLOCK_COMMENT => Some(SyntaxKind::BLOCK_COMMENT_END),
        _ => None,
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree").field("text_len", &self.text().len()).finish_non_exhaustive()
    }
}

/// Which part of a green token a handle points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Piece {
    Token,
    Leading(u32),
    Trailing(u32),
}

/// Token handle tied to the lifetime of the tree.
///
/// Trivia pieces are tokens too; they share the arena slot of the token they
/// are attached to.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a TreeInner,
    id: TokenId,
    piece: Piece,
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    fn owner(self) -> Self {
        Self { piece: Piece::Token, ..self }
    }

    /// Returns this token's kind.
    pub fn kind(self) -> SyntaxKind {
        self.tree.token(self.id, |data| match self.piece {
            Piece::Token => data.green.kind(),
            Piece::Leading(index) => data.green.leading().pieces()[index as usize].kind.syntax_kind(),
            Piece::Trailing(index) => data.green.trailing().pieces()[index as usize].kind.syntax_kind(),
        })
    }

    /// Returns `true` if this token is trivia.
    #[inline]
    pub fn is_trivia(self) -> bool {
        self.kind().is_trivia()
    }

    /// Returns the token text range including attached trivia.
    pub fn text_range(self) -> TextRange {
        match self.piece {
            Piece::Token => {
                self.tree.token(self.id, |data| TextRange::at(data.offset, data.green.text_len()))
            }
            Piece::Leading(_) | Piece::Trailing(_) => self.trimmed_range(),
        }
    }

    /// Returns the range including attached trivia.
    #[inline]
    pub fn range(self) -> TextRange {
        self.text_range()
    }

    /// Returns the token text range excluding trivia.
    pub fn trimmed_range(self) -> TextRange {
        self.tree.token(self.id, |data| {
            let (start, pieces, index) = match self.piece {
                Piece::Token => return data.trimmed_range(),
                Piece::Leading(index) => (data.offset, data.green.leading().pieces(), index),
                Piece::Trailing(index) => {
                    (data.trimmed_range().end(), data.green.trailing().pieces(), index)
                }
            };
            let (before, rest) = pieces.split_at(index as usize);
            let start = start + before.iter().map(|piece| piece.len).sum::<TextSize>();
            TextRange::at(start, rest[0].len)
        })
    }

    /// Returns the token text including trivia.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the token text excluding trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    fn position(self) -> (SyntaxNode<'a>, usize) {
        let (id, index) = self.tree.token(self.id, |data| (data.parent, data.index as usize));
        (SyntaxNode { tree: self.tree, id }, index)
    }

    /// Returns the previous significant token if any.
    pub fn prev_token(self) -> Option<Self> {
        let (mut parent, mut index) = self.position();
        loop {
            let mut siblings = parent.children_with_tokens();
            siblings.back = index;
            let found = siblings.rev().find_map(|sibling| match sibling {
                NodeOrToken::Token(token) => Some(token),
                NodeOrToken::Node(node) => node.last_token(),
            });
            if found.is_some() {
                return found;
            }
            index = parent.index();
            parent = parent.parent()?;
        }
    }

    /// Returns the next significant token if any.
    pub fn next_token(self) -> Option<Self> {
        let (mut parent, mut index) = self.position();
        loop {
            let mut siblings = parent.children_with_tokens();
            siblings.front = index + 1;
            let found = siblings.find_map(|sibling| match sibling {
                NodeOrToken::Token(token) => Some(token),
                NodeOrToken::Node(node) => node.first_token(),
            });
            if found.is_some() {
                return found;
            }
            index = parent.index();
            parent = parent.parent()?;
        }
    }

    fn trivia(self, leading: bool) -> TriviaIter<'a> {
        let len = match self.piece {
            Piece::Token => self.tree.token(self.id, |data| {
                let trivia = if leading { data.green.leading() } else { data.green.trailing() };
                trivia.pieces().len() as u32
            }),
            Piece::Leading(_) | Piece::Trailing(_) => 0,
        };
        TriviaIter { token: self.owner(), leading, range: 0..len }
    }

    /// Iterates over leading trivia tokens.
    #[inline]
    pub fn leading_trivia(self) -> TriviaIter<'a> {
        self.trivia(true)
    }

    /// Iterates over trailing trivia tokens.
    #[inline]
    pub fn trailing_trivia(self) -> TriviaIter<'a> {
        self.trivia(false)
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        self.position().0
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    #[inline]
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.parent().ancestors()
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id && self.piece == other.piece
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.trimmed_range())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Iterator over trivia tokens.
#[derive(Clone)]
pub struct TriviaIter<'a> {
    token: SyntaxToken<'a>,
    leading: bool,
    range: std::ops::Range<u32>,
}

impl<'a> TriviaIter<'a> {
    #[inline]
    fn piece(&self, index: u32) -> SyntaxToken<'a> {
        let piece = if self.leading { Piece::Leading(index) } else { Piece::Trailing(index) };
        SyntaxToken { piece, ..self.token }
    }
}

impl<'a> Iterator for TriviaIter<'a> {
    type Item = SyntaxToken<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(self.piece(index))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for TriviaIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        Some(self.piece(index))
    }
}

impl ExactSizeIterator for TriviaIter<'_> {}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a TreeInner,
    id: NodeId,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn has_error_flag(self) -> bool {
        self.tree.node(self.id, |data| data.green.is_error())
    }

    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.tree.node(self.id, |data| data.green.kind())
    }

    /// Returns `true` for nodes produced by error recovery.
    #[inline]
    pub fn is_error(self) -> bool {
        self.has_error_flag() || self.kind() == SyntaxKind::ERROR
    }

    /// Returns the green node backing this node.
    ///
    /// Trees produced by incremental reparsing share green nodes with the
    /// tree they were derived from; see [`GreenNode::ptr_eq`].
    #[inline]
    pub fn green(self) -> GreenNode {
        self.tree.node(self.id, |data| data.green.clone())
    }

    /// Position among the parent's children, tokens included. Zero for the
    /// root.
    #[inline]
    pub fn index(self) -> usize {
        self.tree.node(self.id, |data| data.index as usize)
    }

    /// Returns the text range covered by this node, trivia included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.tree.node(self.id, |data| data.range())
    }

    /// Returns the range covered by this node.
    #[inline]
    pub fn range(self) -> TextRange {
        self.text_range()
    }

    /// Returns the range with leading/trailing trivia trimmed away.
    pub fn trimmed_range(self) -> TextRange {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
            }
            _ => TextRange::empty(self.text_range().start()),
        }
    }

    /// Returns the text slice covered by this node.
    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the text slice excluding leading/trailing trivia.
    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    /// Returns the first significant token spanned by this node.
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let mut stack = vec![self.children_with_tokens()];
        while let Some(children) = stack.last_mut() {
            match children.next() {
                Some(NodeOrToken::Token(token)) => return Some(token),
                Some(NodeOrToken::Node(node)) => stack.push(node.children_with_tokens()),
                None => {
                    stack.pop();
                }
            }
        }
        None
    }

    /// Returns the last significant token spanned by this node.
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let mut stack = vec![self.children_with_tokens()];
        while let Some(children) = stack.last_mut() {
            match children.next_back() {
                Some(NodeOrToken::Token(token)) => return Some(token),
                Some(NodeOrToken::Node(node)) => stack.push(node.children_with_tokens()),
                None => {
                    stack.pop();
                }
            }
        }
        None
    }

    /// Returns the parent node if any.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        Some(Self { tree: self.tree, id: self.tree.node(self.id, |data| data.parent)? })
    }

    /// Returns an iterator of ancestors starting from this node.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |it| it.parent())
    }

    /// Iterates children including tokens.
    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        let back = self.tree.node(self.id, |data| data.green.child_count());
        ChildrenWithTokens { node: self, front: 0, back }
    }

    /// Iterates child nodes, skipping tokens.
    #[inline]
    pub fn children(self) -> Children<'a> {
        Children { inner: self.children_with_tokens() }
    }

    /// Returns a preorder iterator over nodes.
    #[inline]
    pub fn preorder(self) -> Preorder<'a> {
        Preorder::new(self)
    }

    /// Returns a preorder iterator over nodes and tokens.
    #[inline]
    pub fn preorder_with_tokens(self) -> PreorderWithTokens<'a> {
        PreorderWithTokens::new(self)
    }

    /// This node and all nodes below it, in preorder.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    fn element(self, child: Child) -> SyntaxElement<'a> {
        let tree = self.tree;
        match child {
            Child::Node(id) => NodeOrToken::Node(SyntaxNode { tree, id }),
            Child::Token(id) => NodeOrToken::Token(SyntaxToken { tree, id, piece: Piece::Token }),
        }
    }

    /// Returns the significant token(s) whose range, trivia included, touches
    /// `offset`.
    ///
    /// Descends through the children containing `offset`, so only that path
    /// of the tree is visited.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        let range = self.text_range();
        if offset < range.start() || offset > range.end() {
            return TokenAtOffset::None;
        }

        let mut node = self;
        let right = loop {
            match self.tree.child_at_offset(node.id, offset).map(|child| node.element(child)) {
                Some(NodeOrToken::Node(child)) => node = child,
                Some(NodeOrToken::Token(token)) => break token,
                None => return self.last_token().map_or(TokenAtOffset::None, TokenAtOffset::Single),
            }
        };

        if right.text_range().start() == offset
            && offset > range.start()
            && let Some(left) = right.prev_token()
        {
            return TokenAtOffset::Between(left, right);
        }
        TokenAtOffset::Single(right)
    }

    /// Returns the smallest element that fully covers `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let Some(token) = self.token_at_offset(range.start()).right_biased() else {
            return NodeOrToken::Node(self);
        };
        if token.text_range().contains_range(range) {
            return NodeOrToken::Token(token);
        }

        let node = token
            .parent_ancestors()
            .find(|ancestor| ancestor.text_range().contains_range(range))
            .unwrap_or(self);
        NodeOrToken::Node(node)
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Node or token element inside the tree.
pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<'a> SyntaxElement<'a> {
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    pub fn parent(self) -> Option<SyntaxNode<'a>> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }
}

/// Iterator over children including tokens.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    node: SyntaxNode<'a>,
    front: usize,
    back: usize,
}

impl<'a> ChildrenWithTokens<'a> {
    #[inline]
    fn get(&self, index: usize) -> Option<SyntaxElement<'a>> {
        let child = self.node.tree.child(self.node.id, index)?;
        Some(self.node.element(child))
    }
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.front += 1;
        self.get(self.front - 1)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back.saturating_sub(self.front);
        (len, Some(len))
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.get(self.back)
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {}

/// Iterator over child nodes only.
#[derive(Clone)]
pub struct Children<'a> {
    inner: ChildrenWithTokens<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = SyntaxNode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(NodeOrToken::into_node)
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(NodeOrToken::into_node)
    }
}

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder<'a> {
    inner: PreorderWithTokens<'a>,
}

impl<'a> Preorder<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> Preorder<'a> {
        Preorder { inner: PreorderWithTokens::new(start) }
    }

    /// Skips the current subtree during traversal.
    #[inline]
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = WalkEvent<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|item| match item {
            WalkEventWithTokens::EnterNode(it) => Some(WalkEvent::Enter(it)),
            WalkEventWithTokens::LeaveNode(it) => Some(WalkEvent::Leave(it)),
            WalkEventWithTokens::Token(_) => None,
        })
    }
}

/// Preorder walk event for nodes.
#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    Enter(SyntaxNode<'a>),
    Leave(SyntaxNode<'a>),
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens<'a> {
    stack: Vec<(SyntaxNode<'a>, ChildrenWithTokens<'a>)>,
    root: Option<SyntaxNode<'a>>,
}

impl<'a> PreorderWithTokens<'a> {
    #[inline]
    fn new(start: SyntaxNode<'a>) -> PreorderWithTokens<'a> {
        PreorderWithTokens { stack: Vec::with_capacity(128), root: Some(start) }
    }

    /// Skips the current subtree during traversal.
    ///
    /// The next event is the `LeaveNode` of the most recently entered node.
    #[inline]
    pub fn skip_subtree(&mut self) {
        let (_, children) = self.stack.last_mut().expect("must have a subtree to skip");
        children.front = children.back;
    }
}

impl<'a> Iterator for PreorderWithTokens<'a> {
    type Item = WalkEventWithTokens<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root, root.children_with_tokens()));
            return Some(WalkEventWithTokens::EnterNode(root));
        };
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child, child.children_with_tokens()));
                Some(WalkEventWithTokens::EnterNode(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEventWithTokens::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop().expect("should have an exited-from node");
                Some(WalkEventWithTokens::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Copy, Debug)]
pub enum WalkEventWithTokens<'a> {
    EnterNode(SyntaxNode<'a>),
    LeaveNode(SyntaxNode<'a>),
    Token(SyntaxToken<'a>),
}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(node) => fmt::Display::fmt(node, f),
            NodeOrToken::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Maps tokens to a different type.
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            TokenAtOffset::None => TokenAtOffset::None,
            TokenAtOffset::Single(it) => TokenAtOffset::Single(f(it)),
            TokenAtOffset::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use text_size::{TextRange, TextSize};

    use super::*;
    use crate::{Builder, GreenTrivia, TriviaPiece, TriviaPieceKind};

    fn ws(len: u32) -> GreenTrivia {
        if len == 0 {
            return GreenTrivia::empty();
        }
        GreenTrivia::new(&[TriviaPiece::new(TriviaPieceKind::Whitespace, len.into())])
    }

    /// `{ foo }` then an unclosed `[` at end of input.
    fn sample() -> SyntaxTree {
        let text = "{ foo } [";
        let mut builder = Builder::new();
        builder.start_node(SyntaxKind::SOURCE_FILE, false);
        builder.start_node(SyntaxKind::BLOCK, false);
        builder.token(ws(0), SyntaxKind::LEFT_BRACE, 1.into(), ws(1));
        builder.token(ws(0), SyntaxKind::IDENTIFIER, 3.into(), ws(1));
        builder.token(ws(0), SyntaxKind::RIGHT_BRACE, 1.into(), ws(1));
        builder.finish_node();
        builder.start_node(SyntaxKind::ARRAY_LITERAL, true);
        builder.token(ws(0), SyntaxKind::LEFT_BRACKET, 1.into(), ws(0));
        builder.finish_node();
        builder.token(ws(0), SyntaxKind::EOF, 0.into(), ws(0));
        builder.finish_node();
        SyntaxTree::new(text, builder.finish())
    }

    #[test]
    fn debug_dump_lists_trivia() {
        let tree = sample();
        expect![[r#"
            SOURCE_FILE@0..9
              BLOCK@0..8
                LEFT_BRACE@0..1 "{"
                WHITESPACE@1..2 " "
                IDENTIFIER@2..5 "foo"
                WHITESPACE@5..6 " "
                RIGHT_BRACE@6..7 "}"
                WHITESPACE@7..8 " "
              ARRAY_LITERAL@8..9 (error)
                LEFT_BRACKET@8..9 "["
              EOF@9..9 ""
        "#]]
        .assert_eq(&tree.debug_dump());
    }

    #[test]
    fn sexp_marks_missing_delimiters() {
        let tree = sample();
        expect![[r#"(source_file (block (identifier)) (array_literal (MISSING "]")))"#]]
            .assert_eq(&tree.to_sexp());
    }

    #[test]
    fn node_ranges_and_text() {
        let tree = sample();
        let root = tree.root();
        assert_eq!(root.kind(), SyntaxKind::SOURCE_FILE);
        assert_eq!(root.text(), "{ foo } [");

        let block = root.children().next().unwrap();
        assert_eq!(block.text(), "{ foo } ");
        assert_eq!(block.text_trimmed(), "{ foo }");
        assert_eq!(block.trimmed_range(), TextRange::new(0.into(), 7.into()));
        assert_eq!(block.parent(), Some(root));
        assert!(!block.is_error());

        let array = root.children().nth(1).unwrap();
        assert!(array.is_error());
        assert_eq!(array.ancestors().count(), 2);
        assert_eq!(root.descendants().count(), 3);
    }

    #[test]
    fn token_navigation() {
        let tree = sample();
        let ident = tree.tokens().find(|it| it.kind() == SyntaxKind::IDENTIFIER).unwrap();

        assert_eq!(ident.text_trimmed(), "foo");
        assert_eq!(ident.text(), "foo ");
        assert_eq!(ident.trailing_trivia().count(), 1);
        assert_eq!(ident.leading_trivia().count(), 0);
        assert_eq!(ident.prev_token().map(SyntaxToken::kind), Some(SyntaxKind::LEFT_BRACE));
        assert_eq!(ident.next_token().map(SyntaxToken::kind), Some(SyntaxKind::RIGHT_BRACE));
        assert_eq!(ident.parent().kind(), SyntaxKind::BLOCK);
        assert_eq!(ident.parent_ancestors().count(), 2);
        assert_eq!(ident.to_string(), "foo ");
    }

    #[test]
    fn tokens_concatenate_to_source() {
        let tree = sample();
        let text: String = tree.tokens().map(SyntaxToken::text_trimmed).collect();
        assert_eq!(text, tree.text());
        assert_eq!(tree.tokens().count(), 8);
        assert_eq!(tree.tokens().filter(|it| it.is_trivia()).count(), 3);
    }

    #[test]
    fn token_at_offset_reports_boundaries() {
        let tree = sample();
        let root = tree.root();

        let kinds = |offset: u32| root.token_at_offset(TextSize::new(offset)).map(SyntaxToken::kind);
        assert!(matches!(kinds(3), TokenAtOffset::Single(SyntaxKind::IDENTIFIER)));
        assert!(matches!(
            kinds(1),
            TokenAtOffset::Single(SyntaxKind::LEFT_BRACE)
        ));
        assert!(matches!(
            kinds(6),
            TokenAtOffset::Between(SyntaxKind::IDENTIFIER, SyntaxKind::RIGHT_BRACE)
        ));
        assert!(matches!(kinds(10), TokenAtOffset::None));
    }

    #[test]
    fn covering_element_climbs_to_node() {
        let tree = sample();
        let root = tree.root();

        let token = root.covering_element(TextRange::new(2.into(), 4.into()));
        assert_eq!(token.kind(), SyntaxKind::IDENTIFIER);

        let node = root.covering_element(TextRange::new(2.into(), 7.into()));
        assert_eq!(node.kind(), SyntaxKind::BLOCK);

        let node = root.covering_element(TextRange::new(2.into(), 9.into()));
        assert_eq!(node.kind(), SyntaxKind::SOURCE_FILE);
    }

    #[test]
    fn preorder_can_skip_subtrees() {
        let tree = sample();
        let mut preorder = tree.root().preorder();
        let mut entered = Vec::new();

        while let Some(event) = preorder.next() {
            if let WalkEvent::Enter(node) = event {
                entered.push(node.kind());
                if node.kind() == SyntaxKind::BLOCK {
                    preorder.skip_subtree();
                }
            }
        }

        assert_eq!(
            entered,
            [SyntaxKind::SOURCE_FILE, SyntaxKind::BLOCK, SyntaxKind::ARRAY_LITERAL]
        );
    }

    #[test]
    fn deep_nesting_is_walkable() {
        let depth = 100_000;
        let mut builder = Builder::new();
        builder.start_node(SyntaxKind::SOURCE_FILE, false);
        for _ in 0..depth {
            builder.start_node(SyntaxKind::BLOCK, true);
            builder.token(ws(0), SyntaxKind::LEFT_BRACE, 1.into(), ws(0));
        }
        for _ in 0..depth {
            builder.finish_node();
        }
        builder.token(ws(0), SyntaxKind::EOF, 0.into(), ws(0));
        builder.finish_node();

        let tree = SyntaxTree::new("{".repeat(depth), builder.finish());
        let last = tree.root().descendants().last().unwrap();
        assert_eq!(last.ancestors().count(), depth + 1);
        assert_eq!(last.text_range(), TextRange::new((depth as u32 - 1).into(), (depth as u32).into()));
    }

    #[test]
    fn navigation_allocates_only_visited_path() {
        let items = 10_000;
        let mut builder = Builder::new();
        builder.start_node(SyntaxKind::SOURCE_FILE, false);
        for _ in 0..items {
            builder.start_node(SyntaxKind::BLOCK, false);
            builder.token(ws(0), SyntaxKind::LEFT_BRACE, 1.into(), ws(0));
            builder.token(ws(0), SyntaxKind::RIGHT_BRACE, 1.into(), ws(1));
            builder.finish_node();
        }
        builder.token(ws(0), SyntaxKind::EOF, 0.into(), ws(0));
        builder.finish_node();

        let tree = SyntaxTree::new("{} ".repeat(items), builder.finish());
        assert_eq!(tree.tree.allocated(), (1, 0));

        let offset = TextSize::new(3 * 7_000 + 1);
        let token = tree.root().token_at_offset(offset).right_biased().unwrap();
        assert_eq!(token.kind(), SyntaxKind::RIGHT_BRACE);
        assert_eq!(token.trimmed_range(), TextRange::at(offset, 1.into()));

        let block = token.parent();
        assert_eq!(block.index(), 7_000);
        assert_eq!(block.text_range(), TextRange::at((3 * 7_000).into(), 3.into()));
        assert_eq!(token.next_token().map(|it| it.trimmed_range().start()), Some(offset + TextSize::new(2)));

        let (nodes, tokens) = tree.tree.allocated();
        assert!(nodes <= 4 && tokens <= 4, "allocated {nodes} nodes and {tokens} tokens");
    }

    #[test]
    fn tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyntaxTree>();
        assert_send_sync::<GreenNode>();
    }
}
