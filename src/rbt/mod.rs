//! Module implement red-black tree, with parent-linked nodes held in a
//! pluggable node-store.

mod cmp;
mod depth;
mod fixup;
mod index;
mod iter;
mod link;
mod node;
mod stats;
mod store;

pub use cmp::{Compare, LessFn, Natural, Reverse};
pub use depth::Depth;
pub use index::{Index, Position};
pub use iter::{Cursor, CursorMut, Iter};
pub use node::Node;
pub use stats::Stats;
pub use store::{Arena, NodeId, Store};

#[cfg(test)]
pub(crate) use index::load_index;
