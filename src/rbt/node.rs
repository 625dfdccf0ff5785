use crate::rbt::NodeId;

/// Node corresponds to a single key in [Index] instance.
///
/// Child links, `left` and `right`, are the structural links of the tree.
/// `parent` is a back-link used for traversal and rotation wiring, node
/// without a parent is the tree's root.
///
/// [Index]: crate::rbt::Index
#[derive(Clone, Debug)]
pub struct Node<K> {
    pub key: K,
    pub black: bool,              // store: black or red
    pub parent: Option<NodeId>,   // back-link: parent
    pub left: Option<NodeId>,     // store: left child
    pub right: Option<NodeId>,    // store: right child
}

impl<K> Node<K> {
    /// New nodes are always red, and unlinked.
    pub fn new(key: K) -> Node<K> {
        Node {
            key,
            black: false,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    pub fn set_black(&mut self) {
        self.black = true
    }

    /// Unlink this node from the tree, links of its neighbours are not
    /// touched.
    #[inline]
    pub fn reset(&mut self) {
        self.parent = None;
        self.left = None;
        self.right = None;
    }
}

impl<K> Node<K> {
    #[inline]
    pub fn is_black(&self) -> bool {
        self.black
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    #[inline]
    pub fn as_key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K> From<K> for Node<K> {
    fn from(key: K) -> Node<K> {
        Node::new(key)
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
