//! Package implement an ordered container of keys, backed by a
//! [red-black][rbtree] tree.
//!
//! Nodes carry a link to their parent, which allows the tree to compute
//! in-order successor and predecessor without any auxiliary stack, and to
//! hand out [Position] values that stay valid across unrelated mutations.
//! Structural changes are done with rotations and transplants, after which
//! insert-fixup or erase-fixup restores the red-black invariants:
//!
//! * Root is black.
//! * No red node has a red child.
//! * Every path from a node to a missing child passes through the same
//!   number of black nodes.
//!
//! Key ordering is supplied via the [Compare] capability and node memory
//! via the [Store] capability. Default index uses [Natural] ordering over
//! `Ord` keys and an [Arena] store.
//!
//! Duplicate keys are allowed, equal keys are kept in insertion order.
//!
//! [rbtree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

/// Short form to compose Error values.
///
/// Here are few possible ways:
///
/// ```ignore
/// use crate::Error;
/// err_at!(InvalidPosition, msg: "bad argument");
/// ```
///
/// ```ignore
/// use crate::Error;
/// err_at!(InvalidInput, text.parse::<toml::Value>());
/// ```
///
/// ```ignore
/// use crate::Error;
/// err_at!(FailConvert, usize::try_from(n), "node_capacity");
/// ```
#[macro_export]
macro_rules! err_at {
    ($v:ident, msg: $($arg:expr),+) => {{
        let prefix = format!("{}:{}", file!(), line!());
        Err(Error::$v(prefix, format!($($arg),+)))
    }};
    ($v:ident, $e:expr) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                Err(Error::$v(prefix, format!("{}", err)))
            }
        }
    }};
    ($v:ident, $e:expr, $($arg:expr),+) => {{
        match $e {
            Ok(val) => Ok(val),
            Err(err) => {
                let prefix = format!("{}:{}", file!(), line!());
                let msg = format!($($arg),+);
                Err(Error::$v(prefix, format!("{} {}", err, msg)))
            }
        }
    }};
}

mod config;
mod error;
pub mod rbt;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::rbt::{Arena, Compare, LessFn, Natural, Reverse};
pub use crate::rbt::{Cursor, CursorMut, Index, Iter, Position};
pub use crate::rbt::{Depth, Node, NodeId, Stats, Store};
