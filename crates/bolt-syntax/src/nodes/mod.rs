mod node;
mod token;
mod tree;

pub(crate) use node::{Child, NodeId};
pub(crate) use token::TokenId;
pub(crate) use tree::TreeInner;
