// Red-black balancing over the primitives in link.rs. This is the only
// place that reasons about node colors.

use crate::rbt::{
    link::{Inner, Removed},
    Compare, NodeId, Store,
};

impl<K, S> Inner<K, S>
where
    S: Store<K>,
{
    /// Place an unlinked node into the tree and rebalance.
    pub fn attach<C>(&mut self, id: NodeId, cmp: &C)
    where
        C: Compare<K>,
    {
        self.set_red(id);
        self.base_insert(id, cmp);
        self.insert_fixup(id);
    }

    /// Unlink a node from the tree and rebalance. Node is left with its
    /// links reset, and is still owned by the store.
    pub fn detach(&mut self, id: NodeId) {
        let Removed {
            child,
            parent,
            black,
        } = self.base_erase(id);
        // removing a red cannot disturb the black-height.
        if black {
            self.erase_fixup(child, parent);
        }
        self.node_mut(id).reset();
    }

    pub fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some(parent) = self.parent_of(node) {
            if self.is_black(Some(parent)) {
                break;
            }
            // red parent is never the root.
            let grand = match self.parent_of(parent) {
                Some(grand) => grand,
                None => {
                    debug_assert!(false, "insert_fixup(): red root {:?}", parent);
                    break;
                }
            };

            if self.left_of(grand) == Some(parent) {
                let uncle = self.right_of(grand);
                match uncle {
                    Some(uncle) if self.is_red(Some(uncle)) => {
                        self.set_black(parent);
                        self.set_black(uncle);
                        self.set_red(grand);
                        node = grand;
                    }
                    _ => {
                        let mut parent = parent;
                        if self.right_of(parent) == Some(node) {
                            // zig-zag into zig-zig
                            node = parent;
                            self.rotate_left(node);
                            parent = self.parent_of(node).unwrap_or(grand);
                        }
                        self.set_black(parent);
                        self.set_red(grand);
                        self.rotate_right(grand);
                    }
                }
            } else {
                let uncle = self.left_of(grand);
                match uncle {
                    Some(uncle) if self.is_red(Some(uncle)) => {
                        self.set_black(parent);
                        self.set_black(uncle);
                        self.set_red(grand);
                        node = grand;
                    }
                    _ => {
                        let mut parent = parent;
                        if self.left_of(parent) == Some(node) {
                            node = parent;
                            self.rotate_right(node);
                            parent = self.parent_of(node).unwrap_or(grand);
                        }
                        self.set_black(parent);
                        self.set_red(grand);
                        self.rotate_left(grand);
                    }
                }
            }
        }

        if let Some(root) = self.anchor.root {
            self.set_black(root)
        }
    }

    /// `node` carries an extra black. It can be absent, when a black leaf
    /// was removed, in which case `parent` locates the vacated slot.
    pub fn erase_fixup(&mut self, mut node: Option<NodeId>, mut parent: Option<NodeId>) {
        while node != self.anchor.root && self.is_black(node) {
            let p = match parent {
                Some(p) => p,
                None => break,
            };

            if self.left_of(p) == node {
                // doubly black node has a sibling with black-height >= 1.
                let mut sibling = match self.right_of(p) {
                    Some(sibling) => sibling,
                    None => {
                        debug_assert!(false, "erase_fixup(): no sibling under {:?}", p);
                        break;
                    }
                };

                if self.is_red(Some(sibling)) {
                    self.set_black(sibling);
                    self.set_red(p);
                    self.rotate_left(p);
                    sibling = match self.right_of(p) {
                        Some(sibling) => sibling,
                        None => {
                            debug_assert!(false, "erase_fixup(): lost sibling {:?}", p);
                            break;
                        }
                    };
                }

                let (sl, sr) = (self.left_of(sibling), self.right_of(sibling));
                if self.is_black(sl) && self.is_black(sr) {
                    self.set_red(sibling);
                    node = Some(p);
                    parent = self.parent_of(p);
                } else {
                    if self.is_black(sr) {
                        if let Some(sl) = sl {
                            self.set_black(sl);
                        }
                        self.set_red(sibling);
                        self.rotate_right(sibling);
                        sibling = self.right_of(p).unwrap_or(sibling);
                    }
                    let p_black = self.node(p).is_black();
                    self.node_mut(sibling).black = p_black;
                    self.set_black(p);
                    if let Some(sr) = self.right_of(sibling) {
                        self.set_black(sr);
                    }
                    self.rotate_left(p);
                    node = self.anchor.root;
                    parent = None;
                }
            } else {
                let mut sibling = match self.left_of(p) {
                    Some(sibling) => sibling,
                    None => {
                        debug_assert!(false, "erase_fixup(): no sibling under {:?}", p);
                        break;
                    }
                };

                if self.is_red(Some(sibling)) {
                    self.set_black(sibling);
                    self.set_red(p);
                    self.rotate_right(p);
                    sibling = match self.left_of(p) {
                        Some(sibling) => sibling,
                        None => {
                            debug_assert!(false, "erase_fixup(): lost sibling {:?}", p);
                            break;
                        }
                    };
                }

                let (sl, sr) = (self.left_of(sibling), self.right_of(sibling));
                if self.is_black(sl) && self.is_black(sr) {
                    self.set_red(sibling);
                    node = Some(p);
                    parent = self.parent_of(p);
                } else {
                    if self.is_black(sl) {
                        if let Some(sr) = sr {
                            self.set_black(sr);
                        }
                        self.set_red(sibling);
                        self.rotate_left(sibling);
                        sibling = self.left_of(p).unwrap_or(sibling);
                    }
                    let p_black = self.node(p).is_black();
                    self.node_mut(sibling).black = p_black;
                    self.set_black(p);
                    if let Some(sl) = self.left_of(sibling) {
                        self.set_black(sl);
                    }
                    self.rotate_right(p);
                    node = self.anchor.root;
                    parent = None;
                }
            }
        }

        if let Some(node) = node {
            self.set_black(node)
        }
    }
}

#[cfg(test)]
#[path = "fixup_test.rs"]
mod fixup_test;
