// Module ``index`` implement the ordered container on top of the red-black
// core.
//
// [Index] holds an anchor, with root, node count, and cursors to the
// minimum and maximum node. Entries are addressed using [Position] values,
// a position is either a data node or the end-of-sequence marker. The end
// marker behaves like the anchor of a ring: moving forward from it lands on
// the first entry and moving backward lands on the last entry.
//
// Position invalidation: a position to an erased entry becomes stale and is
// rejected with Error::InvalidPosition, positions to all other entries stay
// valid across inserts, erases and modifies. Clearing the index invalidates
// all positions except the end marker.

use log::{debug, error, warn};

use std::{
    fmt,
    iter::FromIterator,
    mem,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    config::Config,
    rbt::{
        link::Inner, Arena, Compare, Cursor, CursorMut, Depth, Iter, Natural, Node,
        NodeId, Stats, Store,
    },
    Error, Result,
};

/// Validation gives up on trees deeper than this.
pub const MAX_TREE_DEPTH: usize = 100;

static INDEX_IDS: AtomicU64 = AtomicU64::new(1);

fn next_index_id() -> u64 {
    INDEX_IDS.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Link {
    Anchor,
    Data(NodeId),
}

/// Position of an entry within [Index], or the end-of-sequence marker.
///
/// Positions are plain values, they don't borrow the index. Every
/// operation taking a position checks that it belongs to the index and
/// that its entry is not erased.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    index: u64,
    link: Link,
}

impl Position {
    /// Return whether this position is the end-of-sequence marker.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.link == Link::Anchor
    }

    #[inline]
    pub(crate) fn to_node_id(&self) -> Option<NodeId> {
        match self.link {
            Link::Anchor => None,
            Link::Data(id) => Some(id),
        }
    }
}

/// Index type, ordered container of keys using red-black tree.
///
/// * `C` supplies the key ordering, refer to [Compare].
/// * `S` supplies node memory, refer to [Store].
///
/// Single threaded, every operation is a bounded walk down or up the tree
/// plus O(1) restructuring per level.
pub struct Index<K, C = Natural, S = Arena<K>> {
    name: String,
    id: u64,
    cmp: C,
    inner: Inner<K, S>,
}

impl<K> Index<K> {
    /// Create an empty index identified by `name`, keys are ordered by
    /// their `Ord` implementation.
    pub fn new(name: &str) -> Index<K> {
        Index::with_store(name, Natural, Arena::new())
    }

    /// Create an empty index from `config`.
    pub fn from_config(config: &Config) -> Index<K> {
        let arena = match config.node_capacity {
            Some(capacity) => Arena::with_capacity(capacity),
            None => Arena::new(),
        };
        Index::with_store(&config.name, Natural, arena)
    }
}

impl<K, C> Index<K, C> {
    /// Create an empty index identified by `name`, keys are ordered by
    /// `cmp`.
    pub fn with_compare(name: &str, cmp: C) -> Index<K, C> {
        Index::with_store(name, cmp, Arena::new())
    }
}

impl<K, C, S> Index<K, C, S> {
    /// Create an empty index identified by `name`, keys are ordered by
    /// `cmp` and nodes are allocated from `store`.
    pub fn with_store(name: &str, cmp: C, store: S) -> Index<K, C, S> {
        let id = next_index_id();
        debug!(target: "rbtree", "{:?}, new index #{}", name, id);

        Index {
            name: name.to_string(),
            id,
            cmp,
            inner: Inner::new(store),
        }
    }
}

impl<K, C, S> Index<K, C, S>
where
    S: Store<K>,
{
    /// Return name of this index instance.
    #[inline]
    pub fn to_name(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.anchor.n_count
    }

    /// Return whether index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the number of edges on the longest path from root to a leaf.
    pub fn height(&self) -> usize {
        self.inner.height(self.inner.anchor.root)
    }

    /// Return the smallest key.
    pub fn first(&self) -> Option<&K> {
        let id = self.inner.anchor.min?;
        Some(self.inner.node(id).as_key())
    }

    /// Return the largest key.
    pub fn last(&self) -> Option<&K> {
        let id = self.inner.anchor.max?;
        Some(self.inner.node(id).as_key())
    }

    /// Return position of the smallest entry, end marker if index is empty.
    #[inline]
    pub fn begin(&self) -> Position {
        self.to_position(self.inner.anchor.min)
    }

    /// Return the end-of-sequence marker.
    #[inline]
    pub fn end(&self) -> Position {
        self.to_position(None)
    }

    /// Return position of the tree's root, end marker if index is empty.
    #[inline]
    pub fn to_root(&self) -> Position {
        self.to_position(self.inner.anchor.root)
    }

    /// Return position next to `pos` in sort order. Next to the last
    /// entry is the end marker, and next to end marker is the first entry.
    pub fn next_pos(&self, pos: Position) -> Result<Position> {
        let next = match self.to_link(pos)? {
            Some(id) => self.inner.successor(id),
            None => self.inner.anchor.min,
        };
        Ok(self.to_position(next))
    }

    /// Return position previous to `pos` in sort order. Previous to the
    /// first entry is the end marker, and previous to end marker is the
    /// last entry.
    pub fn prev_pos(&self, pos: Position) -> Result<Position> {
        let prev = match self.to_link(pos)? {
            Some(id) => self.inner.predecessor(id),
            None => self.inner.anchor.max,
        };
        Ok(self.to_position(prev))
    }

    /// Return key at `pos`, `None` for end marker and invalid positions.
    pub fn get(&self, pos: Position) -> Option<&K> {
        match self.to_link(pos) {
            Ok(Some(id)) => Some(self.inner.node(id).as_key()),
            Ok(None) | Err(_) => None,
        }
    }

    /// Return a full table iterator, in sort order.
    pub fn iter(&self) -> Iter<'_, K, S> {
        Iter::new(&self.inner)
    }

    /// Return a read-only cursor at `pos`.
    pub fn cursor(&self, pos: Position) -> Result<Cursor<'_, K, C, S>> {
        let link = self.to_link(pos)?;
        Ok(Cursor::new(self, link))
    }

    /// Return a mutable cursor at `pos`, refer to [CursorMut].
    pub fn cursor_mut(&mut self, pos: Position) -> Result<CursorMut<'_, K, C, S>> {
        let link = self.to_link(pos)?;
        Ok(CursorMut::new(self, link))
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        let n = self.len();
        self.inner.store.clear();
        self.inner.anchor = Default::default();
        debug!(target: "rbtree", "{:?}, cleared {} entries", self.name, n);
    }

    /// Erase entry at `pos` and return the position next to it.
    ///
    /// Fails with [Error::InvalidPosition] if `pos` is the end marker or
    /// not a live position of this index.
    pub fn erase(&mut self, pos: Position) -> Result<Position> {
        let (_, next) = self.take(pos)?;
        Ok(next)
    }

    /// Same as [Index::erase], additionally return the erased key.
    ///
    /// Store failing to release a detached node is reported as
    /// [Error::Fatal], the entry is gone from the index nevertheless.
    pub fn take(&mut self, pos: Position) -> Result<(K, Position)> {
        let id = self.to_live_node(pos, "erase")?;
        let next = self.unlink(id);
        self.inner.anchor.n_count -= 1;

        match self.inner.store.release(id) {
            Ok(node) => Ok((node.into_key(), self.to_position(next))),
            Err(err) => {
                error!(target: "rbtree", "{:?}, release {}", self.name, err);
                err_at!(Fatal, msg: "{:?}, leaked node {:?}: {}", self.name, id, err)
            }
        }
    }

    /// Visit keys of the subtree rooted at `pos`, in pre-order.
    pub fn preorder_from<F>(&self, pos: Position, mut visit: F) -> Result<()>
    where
        F: FnMut(&K),
    {
        let mut stack = vec![self.to_live_node(pos, "preorder")?];
        while let Some(id) = stack.pop() {
            let node = self.inner.node(id);
            visit(node.as_key());
            stack.extend(node.right);
            stack.extend(node.left);
        }
        Ok(())
    }

    /// Visit keys of the subtree rooted at `pos`, in sort order.
    pub fn inorder_from<F>(&self, pos: Position, mut visit: F) -> Result<()>
    where
        F: FnMut(&K),
    {
        let mut stack = vec![];
        let mut cursor = Some(self.to_live_node(pos, "inorder")?);
        loop {
            while let Some(id) = cursor {
                stack.push(id);
                cursor = self.inner.left_of(id);
            }
            match stack.pop() {
                Some(id) => {
                    visit(self.inner.node(id).as_key());
                    cursor = self.inner.right_of(id);
                }
                None => break Ok(()),
            }
        }
    }

    /// Visit keys of the subtree rooted at `pos`, in post-order.
    pub fn postorder_from<F>(&self, pos: Position, mut visit: F) -> Result<()>
    where
        F: FnMut(&K),
    {
        let mut stack = vec![self.to_live_node(pos, "postorder")?];
        let mut order = vec![];
        while let Some(id) = stack.pop() {
            let node = self.inner.node(id);
            order.push(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }
        for id in order.into_iter().rev() {
            visit(self.inner.node(id).as_key())
        }
        Ok(())
    }

    /// Return quick statistics, refer to [Index::validate] for full
    /// statistics.
    pub fn to_stats(&self) -> Stats {
        let mut stats = Stats::new(&self.name);
        stats.node_size = mem::size_of::<Node<K>>();
        stats.n_count = self.inner.anchor.n_count;
        stats.n_nodes = self.inner.store.len();
        stats
    }

    /// Move all entries into a new index, leaving this index empty.
    /// Positions obtained before the move shall refer to the new index.
    pub fn take_all(&mut self) -> Index<K, C, S>
    where
        C: Clone,
    {
        let inner = {
            let store = self.inner.store.to_empty();
            mem::replace(&mut self.inner, Inner::new(store))
        };
        let id = mem::replace(&mut self.id, next_index_id());
        debug!(
            target: "rbtree",
            "{:?}, moved {} entries out of #{}", self.name, inner.anchor.n_count, id
        );

        Index {
            name: self.name.clone(),
            id,
            cmp: self.cmp.clone(),
            inner,
        }
    }

    /// Deep copy this index, preserving its shape and colors. Copy is
    /// allocated from an empty store configured like this index's store.
    pub fn try_clone(&self) -> Result<Index<K, C, S>>
    where
        K: Clone,
        C: Clone,
    {
        let mut inner = Inner::new(self.inner.store.to_empty());

        let mut stack = vec![];
        stack.extend(self.inner.anchor.root.map(|root| (root, None, false)));
        while let Some((src, parent, is_left)) = stack.pop() {
            let snode = self.inner.node(src);

            let mut node = Node::new(snode.key.clone());
            node.black = snode.black;
            node.parent = parent;
            let id = inner.store.alloc(node)?;
            match parent {
                None => inner.anchor.root = Some(id),
                Some(p) if is_left => inner.node_mut(p).left = Some(id),
                Some(p) => inner.node_mut(p).right = Some(id),
            }
            if self.inner.anchor.min == Some(src) {
                inner.anchor.min = Some(id);
            }
            if self.inner.anchor.max == Some(src) {
                inner.anchor.max = Some(id);
            }

            stack.extend(snode.right.map(|right| (right, Some(id), false)));
            stack.extend(snode.left.map(|left| (left, Some(id), true)));
        }
        inner.anchor.n_count = self.inner.anchor.n_count;

        let id = next_index_id();
        debug!(
            target: "rbtree",
            "{:?}, copied {} entries into #{}", self.name, inner.anchor.n_count, id
        );

        Ok(Index {
            name: self.name.clone(),
            id,
            cmp: self.cmp.clone(),
            inner,
        })
    }

    #[inline]
    pub(crate) fn as_inner(&self) -> &Inner<K, S> {
        &self.inner
    }

    #[inline]
    pub(crate) fn to_position(&self, link: Option<NodeId>) -> Position {
        let link = match link {
            Some(id) => Link::Data(id),
            None => Link::Anchor,
        };
        Position {
            index: self.id,
            link,
        }
    }

    // resolve a position of this index, None being the end marker.
    fn to_link(&self, pos: Position) -> Result<Option<NodeId>> {
        if pos.index != self.id {
            return err_at!(InvalidPosition, msg: "{:?}, foreign position", self.name);
        }
        match pos.link {
            Link::Anchor => Ok(None),
            Link::Data(id) if self.inner.store.is_live(id) => Ok(Some(id)),
            Link::Data(id) => {
                err_at!(InvalidPosition, msg: "{:?}, stale position {:?}", self.name, id)
            }
        }
    }

    // resolve a position of this index that must refer to an entry.
    fn to_live_node(&self, pos: Position, op: &str) -> Result<NodeId> {
        let res = match self.to_link(pos) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => err_at!(InvalidPosition, msg: "{} at end-of-sequence", op),
            Err(err) => Err(err),
        };
        if let Err(err) = &res {
            warn!(target: "rbtree", "{:?}, {} {}", self.name, op, err);
        }
        res
    }

    // detach node from tree, keeping min/max cursors, and return its
    // successor. Node is still owned by the store.
    fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let next = self.inner.successor(id);
        if self.inner.anchor.min == Some(id) {
            self.inner.anchor.min = next;
        }
        if self.inner.anchor.max == Some(id) {
            self.inner.anchor.max = self.inner.predecessor(id);
        }
        self.inner.detach(id);
        next
    }
}

impl<K, C, S> Index<K, C, S>
where
    C: Compare<K>,
    S: Store<K>,
{
    /// Insert `key` into index and return its position. Keys equal to an
    /// existing key are placed after it.
    ///
    /// Fails with [Error::NoMemory] if the store refuses to allocate,
    /// index is left untouched in that case.
    pub fn insert(&mut self, key: K) -> Result<Position> {
        let id = match self.inner.store.alloc(Node::new(key)) {
            Ok(id) => id,
            Err(err) => {
                warn!(target: "rbtree", "{:?}, insert {}", self.name, err);
                return Err(err);
            }
        };
        self.inner.attach(id, &self.cmp);
        self.inner.anchor.n_count += 1;

        Ok(self.to_position(Some(id)))
    }

    /// Insert all keys from `iter`, return the number of keys inserted.
    /// Stops at the first failure.
    pub fn insert_all<I>(&mut self, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = K>,
    {
        let mut n = 0;
        for key in iter {
            self.insert(key)?;
            n += 1;
        }
        Ok(n)
    }

    /// Return position of an entry equal to `key`, end marker if missing.
    pub fn find(&self, key: &K) -> Position {
        let root = self.inner.anchor.root;
        self.to_position(self.inner.search(root, key, &self.cmp))
    }

    /// Return whether an entry equal to `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        !self.find(key).is_end()
    }

    /// Remove an entry equal to `key` and return it.
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let pos = match self.find(key) {
            pos if pos.is_end() => return None,
            pos => pos,
        };
        // position is fresh from find, only the store can fail.
        match self.take(pos) {
            Ok((key, _)) => Some(key),
            Err(err) => {
                error!(target: "rbtree", "{:?}, remove {}", self.name, err);
                None
            }
        }
    }

    /// Replace the key at `pos` with `key`, re-positioning the entry if
    /// `key` does not order equal to the current key. If it does, index is
    /// not touched. Return the position of the entry.
    pub fn modify(&mut self, pos: Position, key: K) -> Result<Position> {
        let id = self.to_live_node(pos, "modify")?;
        if self.cmp.equiv(self.inner.node(id).as_key(), &key) {
            return Ok(pos);
        }

        // node is re-owned by its new position without going through the
        // store.
        self.unlink(id);
        self.inner.node_mut(id).key = key;
        self.inner.attach(id, &self.cmp);

        Ok(self.to_position(Some(id)))
    }

    /// Validate red-black invariants, sort order, node linkage and
    /// book-keeping. Return full statistics.
    pub fn validate(&self) -> Result<Stats>
    where
        K: fmt::Debug,
    {
        match self.do_validate() {
            Ok(stats) => Ok(stats),
            Err(err) => {
                error!(target: "rbtree", "{:?}, validate {}", self.name, err);
                Err(err)
            }
        }
    }

    fn do_validate(&self) -> Result<Stats>
    where
        K: fmt::Debug,
    {
        let anchor = &self.inner.anchor;
        let root = anchor.root;

        if self.inner.is_red(root) {
            err_at!(Fatal, msg: "root node must be black")?;
        }
        if let Some(parent) = root.and_then(|root| self.inner.parent_of(root)) {
            err_at!(Fatal, msg: "root node has parent {:?}", parent)?;
        }

        let mut depths = Depth::default();
        let bounds = (None, None);
        let (blacks, n_count) =
            self.validate_tree(root, false, 0, 0, bounds, &mut depths)?;

        if n_count != anchor.n_count {
            err_at!(Fatal, msg: "n_count {} != {}", n_count, anchor.n_count)?;
        }
        if n_count != self.inner.store.len() {
            err_at!(Fatal, msg: "n_nodes {} != {}", self.inner.store.len(), n_count)?;
        }
        let (min, max) = match root {
            Some(root) => (
                Some(self.inner.minimum(root)),
                Some(self.inner.maximum(root)),
            ),
            None => (None, None),
        };
        if min != anchor.min {
            err_at!(Fatal, msg: "min cursor {:?} != {:?}", anchor.min, min)?;
        }
        if max != anchor.max {
            err_at!(Fatal, msg: "max cursor {:?} != {:?}", anchor.max, max)?;
        }
        if !depths.is_balanced(n_count) {
            err_at!(Fatal, msg: "unbalanced shape {} for {} nodes", depths, n_count)?;
        }

        let mut stats = self.to_stats();
        stats.height = Some(self.height());
        stats.blacks = Some(blacks);
        stats.depths = Some(depths);
        Ok(stats)
    }

    // return (black-height, count) of the subtree. Keys in the subtree must
    // order within the inclusive (lo, hi) bounds set by its ancestors,
    // rotations can leave equal keys on either side.
    fn validate_tree<'a>(
        &'a self,
        node: Option<NodeId>,
        fromred: bool,
        mut n_blacks: usize,
        depth: usize,
        (lo, hi): (Option<&'a K>, Option<&'a K>),
        depths: &mut Depth,
    ) -> Result<(usize, usize)>
    where
        K: fmt::Debug,
    {
        let red = self.inner.is_red(node);

        let (id, node) = match node {
            Some(_) if fromred && red => err_at!(Fatal, msg: "consecutive reds")?,
            Some(id) => (id, self.inner.node(id)),
            None => return Ok((n_blacks, 0)),
        };

        if !red {
            n_blacks += 1;
        }

        if depth > MAX_TREE_DEPTH {
            err_at!(Fatal, msg: "tree exceeds max_depth {}", depth)?;
        }
        if node.is_leaf() {
            depths.sample(depth, n_blacks);
        }

        // confirm sort order against ancestors and linkage in the tree.
        let key = node.as_key();
        match lo {
            Some(lo) if self.cmp.less(key, lo) => {
                err_at!(Fatal, msg: "key:{:?} before ancestor {:?}", key, lo)?
            }
            _ => (),
        }
        match hi {
            Some(hi) if self.cmp.less(hi, key) => {
                err_at!(Fatal, msg: "key:{:?} after ancestor {:?}", key, hi)?
            }
            _ => (),
        }
        if let Some(left) = node.left {
            let left = self.inner.node(left);
            if left.parent != Some(id) {
                err_at!(Fatal, msg: "left:{:?} lost parent {:?}", left.as_key(), id)?;
            }
        }
        if let Some(right) = node.right {
            let right = self.inner.node(right);
            if right.parent != Some(id) {
                err_at!(Fatal, msg: "right:{:?} lost parent {:?}", right.as_key(), id)?;
            }
        }

        let (lb, lc) = {
            let bounds = (lo, Some(key));
            self.validate_tree(node.left, red, n_blacks, depth + 1, bounds, depths)?
        };
        let (rb, rc) = {
            let bounds = (Some(key), hi);
            self.validate_tree(node.right, red, n_blacks, depth + 1, bounds, depths)?
        };

        if lb != rb {
            err_at!(Fatal, msg: "unbalanced blacks l:{}, r:{}", lb, rb)?;
        }

        Ok((lb, lc + rc + 1))
    }
}

impl<K, C, S> Clone for Index<K, C, S>
where
    K: Clone,
    C: Clone,
    S: Store<K>,
{
    /// Failing to allocate the copy is fatal, refer to [Index::try_clone].
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(index) => index,
            Err(err) => panic!("clone(): {}", err),
        }
    }
}

impl<K, C, S> fmt::Debug for Index<K, C, S>
where
    K: fmt::Debug,
    S: Store<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K, C, S> IntoIterator for &'a Index<K, C, S>
where
    S: Store<K>,
{
    type Item = &'a K;
    type IntoIter = Iter<'a, K, S>;

    fn into_iter(self) -> Iter<'a, K, S> {
        self.iter()
    }
}

impl<K, C, S> Extend<K> for Index<K, C, S>
where
    C: Compare<K>,
    S: Store<K>,
{
    /// Failing to allocate is fatal, refer to [Index::insert_all].
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = K>,
    {
        if let Err(err) = self.insert_all(iter) {
            panic!("extend(): {}", err)
        }
    }
}

impl<K, C, S> FromIterator<K> for Index<K, C, S>
where
    C: Compare<K> + Default,
    S: Store<K> + Default,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut index = Index::with_store("rbtree", C::default(), S::default());
        index.extend(iter);
        index
    }
}

#[cfg(test)]
use rand::{rngs::SmallRng, Rng, SeedableRng};

#[cfg(test)]
pub(crate) fn load_index(seed: u64, inserts: usize, erases: usize) -> Index<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut index = Index::new("testing");

    let key_max = (inserts as u64) + 1;
    let (mut it, mut es) = (inserts, erases);
    while (it + es) > 0 {
        let key: u64 = rng.gen::<u64>() % key_max;
        match rng.gen::<usize>() % (it + es) {
            k if k < it => {
                index.insert(key).unwrap();
                it -= 1;
            }
            _ => {
                index.remove(&key);
                es -= 1;
            }
        }
    }

    index
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
