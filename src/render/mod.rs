//! Render tree construction, node identity keys, and options.

mod key;
mod options;
mod tree;

pub use key::KeyGen;
pub use options::RenderOptions;
pub use tree::{
    BlockNode, InlineNode, ListItemNode, RenderTree, TableCellNode, TableRowNode,
    TableSectionNode,
};

pub(crate) use key::content_hash;
pub(crate) use tree::TreeBuilder;
