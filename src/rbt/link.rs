// Structural primitives over parent-linked nodes. Nothing in this module
// looks at node colors, except base_erase which hands over the color that
// was structurally removed from the tree.

use std::marker;

use crate::rbt::{Compare, Node, NodeId, Store};

/// Anchor of the tree, holds the root, the node count and cursors to the
/// minimum and maximum node. A `None` cursor refers to the anchor itself,
/// which is also the end-of-sequence marker.
#[derive(Clone, Copy, Default, Debug)]
pub(crate) struct Anchor {
    pub root: Option<NodeId>,
    pub n_count: usize,
    pub min: Option<NodeId>,
    pub max: Option<NodeId>,
}

/// Return value of `base_erase`, enough context for erase-fixup.
///
/// `child` occupies the vacated structural slot and can be absent, in which
/// case `parent` is the only way back into the tree. `black` is the color
/// that was removed from the tree.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Removed {
    pub child: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub black: bool,
}

pub(crate) struct Inner<K, S> {
    pub anchor: Anchor,
    pub store: S,
    _key: marker::PhantomData<K>,
}

impl<K, S> Inner<K, S> {
    pub fn new(store: S) -> Inner<K, S> {
        Inner {
            anchor: Anchor::default(),
            store,
            _key: marker::PhantomData,
        }
    }
}

impl<K, S> Inner<K, S>
where
    S: Store<K>,
{
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<K> {
        self.store.as_node(id)
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.store.as_mut_node(id)
    }

    #[inline]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn left_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    #[inline]
    pub fn right_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    /// Missing nodes are black.
    #[inline]
    pub fn is_black(&self, id: Option<NodeId>) -> bool {
        id.map_or(true, |id| self.node(id).is_black())
    }

    #[inline]
    pub fn is_red(&self, id: Option<NodeId>) -> bool {
        !self.is_black(id)
    }

    #[inline]
    pub fn set_black(&mut self, id: NodeId) {
        self.node_mut(id).set_black()
    }

    #[inline]
    pub fn set_red(&mut self, id: NodeId) {
        self.node_mut(id).set_red()
    }

    pub fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left_of(id) {
            id = left;
        }
        id
    }

    pub fn maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right_of(id) {
            id = right;
        }
        id
    }

    /// Return the next node in sort order, `None` if `id` is the last node.
    pub fn successor(&self, mut id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.right_of(id) {
            return Some(self.minimum(right));
        }
        let mut parent = self.parent_of(id);
        while let Some(p) = parent {
            if self.right_of(p) != Some(id) {
                break;
            }
            id = p;
            parent = self.parent_of(p);
        }
        parent
    }

    /// Return the previous node in sort order, `None` if `id` is the first
    /// node.
    pub fn predecessor(&self, mut id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.left_of(id) {
            return Some(self.maximum(left));
        }
        let mut parent = self.parent_of(id);
        while let Some(p) = parent {
            if self.left_of(p) != Some(id) {
                break;
            }
            id = p;
            parent = self.parent_of(p);
        }
        parent
    }

    /// Search the subtree under `node` for `key`, return the first matching
    /// node along the search path.
    pub fn search<C>(&self, mut node: Option<NodeId>, key: &K, cmp: &C) -> Option<NodeId>
    where
        C: Compare<K>,
    {
        while let Some(id) = node {
            let nkey = self.node(id).as_key();
            node = if cmp.less(key, nkey) {
                self.left_of(id)
            } else if cmp.less(nkey, key) {
                self.right_of(id)
            } else {
                break;
            };
        }
        node
    }

    /// Return the number of edges on the longest path from `id` to a leaf.
    pub fn height(&self, id: Option<NodeId>) -> usize {
        let mut level = match id {
            Some(id) => vec![id],
            None => return 0,
        };
        let mut height = 0;
        loop {
            let next: Vec<NodeId> = level
                .iter()
                .flat_map(|id| {
                    let node = self.node(*id);
                    node.left.into_iter().chain(node.right.into_iter())
                })
                .collect();
            if next.is_empty() {
                break height;
            }
            height += 1;
            level = next;
        }
    }

    //              (p)                       (p)
    //               |                         |
    //              node                     right
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left     right           node     r-r
    //                    / \            /  \
    //                 r-l  r-r       left  r-l
    //
    pub fn rotate_left(&mut self, node: NodeId) {
        let right = match self.right_of(node) {
            Some(right) => right,
            None => panic!("rotate_left(): missing right child, call the programmer"),
        };

        let right_left = self.left_of(right);
        self.node_mut(node).right = right_left;
        if let Some(rl) = right_left {
            self.node_mut(rl).parent = Some(node);
        }

        self.replace_child(node, Some(right));

        self.node_mut(right).left = Some(node);
        self.node_mut(node).parent = Some(right);
    }

    //              (p)                       (p)
    //               |                         |
    //              node                      left
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //         left     right             l-l     node
    //         / \                                / \
    //      l-l  l-r                            l-r  right
    //
    pub fn rotate_right(&mut self, node: NodeId) {
        let left = match self.left_of(node) {
            Some(left) => left,
            None => panic!("rotate_right(): missing left child, call the programmer"),
        };

        let left_right = self.right_of(left);
        self.node_mut(node).left = left_right;
        if let Some(lr) = left_right {
            self.node_mut(lr).parent = Some(node);
        }

        self.replace_child(node, Some(left));

        self.node_mut(left).right = Some(node);
        self.node_mut(node).parent = Some(left);
    }

    /// Wire `v` into the position held by `u` under its parent, or as
    /// root. Children of `u` and `v` are left as is.
    pub fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        self.replace_child(u, v)
    }

    // point u's parent, or the anchor, at v and set v's back-link.
    fn replace_child(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.parent_of(u);
        match parent {
            None => self.anchor.root = v,
            Some(p) if self.left_of(p) == Some(u) => self.node_mut(p).left = v,
            Some(p) => self.node_mut(p).right = v,
        }
        if let Some(v) = v {
            self.node_mut(v).parent = parent;
        }
    }

    /// Attach a new, unlinked node as a leaf. Equal keys are placed to the
    /// right of existing keys, so that they iterate in insertion order.
    pub fn base_insert<C>(&mut self, id: NodeId, cmp: &C)
    where
        C: Compare<K>,
    {
        let mut parent = None;
        let mut cursor = self.anchor.root;
        let mut go_left = false;
        while let Some(c) = cursor {
            parent = Some(c);
            go_left = cmp.less(self.node(id).as_key(), self.node(c).as_key());
            cursor = if go_left {
                self.left_of(c)
            } else {
                self.right_of(c)
            };
        }

        self.node_mut(id).parent = parent;
        match parent {
            None => {
                self.anchor.root = Some(id);
                self.anchor.min = Some(id);
                self.anchor.max = Some(id);
            }
            Some(p) if go_left => {
                self.node_mut(p).left = Some(id);
                if self.anchor.min == Some(p) {
                    self.anchor.min = Some(id);
                }
            }
            Some(p) => {
                self.node_mut(p).right = Some(id);
                if self.anchor.max == Some(p) {
                    self.anchor.max = Some(id);
                }
            }
        }
    }

    /// Unlink `id` from the tree, without rebalancing. Caller shall take
    /// care of min/max cursors and the removed node's own links.
    pub fn base_erase(&mut self, id: NodeId) -> Removed {
        let (left, right) = (self.left_of(id), self.right_of(id));
        match (left, right) {
            (None, _) => {
                let parent = self.parent_of(id);
                self.transplant(id, right);
                Removed {
                    child: right,
                    parent,
                    black: self.node(id).is_black(),
                }
            }
            (Some(_), None) => {
                let parent = self.parent_of(id);
                self.transplant(id, left);
                Removed {
                    child: left,
                    parent,
                    black: self.node(id).is_black(),
                }
            }
            (Some(left), Some(right)) => {
                let succ = self.minimum(right);
                let black = self.node(succ).is_black();
                let child = self.right_of(succ);

                let parent = if self.parent_of(succ) == Some(id) {
                    Some(succ)
                } else {
                    let parent = self.parent_of(succ);
                    self.transplant(succ, child);
                    self.node_mut(succ).right = Some(right);
                    self.node_mut(right).parent = Some(succ);
                    parent
                };

                self.transplant(id, Some(succ));
                self.node_mut(succ).left = Some(left);
                self.node_mut(left).parent = Some(succ);
                // successor inherits the color of the removed position.
                let id_black = self.node(id).is_black();
                self.node_mut(succ).black = id_black;

                Removed {
                    child,
                    parent,
                    black,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "link_test.rs"]
mod link_test;
