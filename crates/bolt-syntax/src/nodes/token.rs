//! Token storage.

use la_arena::Idx;
use text_size::{TextRange, TextSize};

use super::node::NodeId;
use crate::GreenToken;

pub(crate) type TokenId = Idx<TokenData>;

/// Significant token stored in the tree arena. Its trivia pieces are not
/// stored; handles address them by position inside the green token.
pub(crate) struct TokenData {
    pub(crate) parent: NodeId,
    pub(crate) index: u32,
    /// Start of the leading trivia.
    pub(crate) offset: TextSize,
    pub(crate) green: GreenToken,
}

impl TokenData {
    /// Token text without attached trivia.
    #[inline]
    pub(crate) fn trimmed_range(&self) -> TextRange {
        TextRange::at(self.offset + self.green.leading().len(), self.green.text_trimmed_len())
    }
}
