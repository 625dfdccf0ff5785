use crate::{
    rbt::{link::Inner, Compare, Index, NodeId, Position, Store},
    Result,
};

/// Iterator type, to do full table scan in sort order. Can be consumed
/// from both ends.
///
/// Walks the tree via successor / predecessor links, without auxiliary
/// stack.
pub struct Iter<'a, K, S> {
    inner: &'a Inner<K, S>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, S> Iter<'a, K, S> {
    pub(crate) fn new(inner: &'a Inner<K, S>) -> Iter<'a, K, S> {
        Iter {
            inner,
            front: inner.anchor.min,
            back: inner.anchor.max,
            remaining: inner.anchor.n_count,
        }
    }
}

impl<'a, K, S> Iterator for Iter<'a, K, S>
where
    S: Store<K>,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.front = self.inner.successor(id);
        self.remaining -= 1;
        Some(self.inner.node(id).as_key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, S> DoubleEndedIterator for Iter<'a, K, S>
where
    S: Store<K>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.back = self.inner.predecessor(id);
        self.remaining -= 1;
        Some(self.inner.node(id).as_key())
    }
}

impl<'a, K, S> ExactSizeIterator for Iter<'a, K, S> where S: Store<K> {}

/// Read-only, bidirectional cursor over [Index].
///
/// Cursor is either at an entry or at the end marker. Moving past the last
/// entry lands on the end marker, moving forward from the end marker lands
/// on the first entry, and symmetrically backwards.
pub struct Cursor<'a, K, C, S> {
    index: &'a Index<K, C, S>,
    link: Option<NodeId>,
}

impl<'a, K, C, S> Cursor<'a, K, C, S>
where
    S: Store<K>,
{
    pub(crate) fn new(index: &'a Index<K, C, S>, link: Option<NodeId>) -> Self {
        Cursor { index, link }
    }

    /// Return the key under cursor, `None` at end marker.
    pub fn key(&self) -> Option<&'a K> {
        let index: &'a Index<K, C, S> = self.index;
        self.link.map(move |id| index.as_inner().node(id).as_key())
    }

    /// Return the cursor's position.
    pub fn position(&self) -> Position {
        self.index.to_position(self.link)
    }

    pub fn is_end(&self) -> bool {
        self.link.is_none()
    }

    pub fn move_next(&mut self) {
        let inner = self.index.as_inner();
        self.link = match self.link {
            Some(id) => inner.successor(id),
            None => inner.anchor.min,
        };
    }

    pub fn move_prev(&mut self) {
        let inner = self.index.as_inner();
        self.link = match self.link {
            Some(id) => inner.predecessor(id),
            None => inner.anchor.max,
        };
    }
}

/// Mutable cursor over [Index].
///
/// Moves like [Cursor]. Keys are never mutated in place, `set` and
/// `remove` go through the index so that sort order is preserved:
///
/// * `set` at the end marker inserts a key, elsewhere it modifies the key
///   under cursor. Either way the cursor follows the entry.
/// * `remove` erases the key under cursor and moves to the next entry.
pub struct CursorMut<'a, K, C, S> {
    index: &'a mut Index<K, C, S>,
    link: Option<NodeId>,
}

impl<'a, K, C, S> CursorMut<'a, K, C, S>
where
    S: Store<K>,
{
    pub(crate) fn new(index: &'a mut Index<K, C, S>, link: Option<NodeId>) -> Self {
        CursorMut { index, link }
    }

    /// Return the key under cursor, `None` at end marker.
    pub fn key(&self) -> Option<&K> {
        let inner = self.index.as_inner();
        self.link.map(|id| inner.node(id).as_key())
    }

    /// Return the cursor's position.
    pub fn position(&self) -> Position {
        self.index.to_position(self.link)
    }

    pub fn is_end(&self) -> bool {
        self.link.is_none()
    }

    pub fn move_next(&mut self) {
        let inner = self.index.as_inner();
        self.link = match self.link {
            Some(id) => inner.successor(id),
            None => inner.anchor.min,
        };
    }

    pub fn move_prev(&mut self) {
        let inner = self.index.as_inner();
        self.link = match self.link {
            Some(id) => inner.predecessor(id),
            None => inner.anchor.max,
        };
    }

    /// Remove the key under cursor and return it. Fails at end marker.
    pub fn remove(&mut self) -> Result<K> {
        let pos = self.position();
        let (key, next) = self.index.take(pos)?;
        self.link = next.to_node_id();
        Ok(key)
    }
}

impl<'a, K, C, S> CursorMut<'a, K, C, S>
where
    C: Compare<K>,
    S: Store<K>,
{
    /// Insert `key` when at end marker, otherwise modify the key under
    /// cursor.
    pub fn set(&mut self, key: K) -> Result<()> {
        let pos = self.position();
        let pos = match self.link {
            None => self.index.insert(key)?,
            Some(_) => self.index.modify(pos, key)?,
        };
        self.link = pos.to_node_id();
        Ok(())
    }
}

#[cfg(test)]
#[path = "iter_test.rs"]
mod iter_test;
