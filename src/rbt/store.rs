use std::fmt;

use crate::{rbt::Node, Error, Result};

/// Handle to a node held by a [Store].
///
/// A handle is made of a slot number and a generation. Stores shall bump
/// the generation of a slot when its node is released, so that stale
/// handles can be detected via [Store::is_live].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    slot: usize,
    gen: u32,
}

impl NodeId {
    pub fn new(slot: usize, gen: u32) -> NodeId {
        NodeId { slot, gen }
    }

    #[inline]
    pub fn to_slot(&self) -> usize {
        self.slot
    }

    #[inline]
    pub fn to_generation(&self) -> u32 {
        self.gen
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}.{}", self.slot, self.gen)
    }
}

/// Node allocation capability used by [Index].
///
/// Index never allocates or frees node memory by itself, every node is
/// created via `alloc` and destroyed via `release`. Allocation failure
/// shall be returned as [Error::NoMemory], in which case the index is left
/// untouched.
///
/// `as_node` and `as_mut_node` are only called with live handles, stores
/// can panic otherwise.
///
/// [Index]: crate::rbt::Index
pub trait Store<K> {
    /// Take ownership of `node` and return a handle to it.
    fn alloc(&mut self, node: Node<K>) -> Result<NodeId>;

    /// Give back ownership of node referred by `id`.
    fn release(&mut self, id: NodeId) -> Result<Node<K>>;

    /// Return whether `id` refers to a node that is not yet released.
    fn is_live(&self, id: NodeId) -> bool;

    fn as_node(&self, id: NodeId) -> &Node<K>;

    fn as_mut_node(&mut self, id: NodeId) -> &mut Node<K>;

    /// Return an empty store with same configuration as this store.
    fn to_empty(&self) -> Self
    where
        Self: Sized;

    /// Release all nodes.
    fn clear(&mut self);

    /// Return number of live nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Slot<K> {
    gen: u32,
    node: Option<Node<K>>,
}

/// Default node store, nodes are kept in a vector of slots and released
/// slots are re-used for later allocations.
///
/// Optionally an arena can be bounded to `capacity` live nodes, beyond
/// which allocations fail with [Error::NoMemory].
pub struct Arena<K> {
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
    n_live: usize,
    capacity: Option<usize>,
}

impl<K> Default for Arena<K> {
    fn default() -> Arena<K> {
        Arena::new()
    }
}

impl<K> Arena<K> {
    /// Create an unbounded arena.
    pub fn new() -> Arena<K> {
        Arena {
            slots: Vec::default(),
            free: Vec::default(),
            n_live: 0,
            capacity: None,
        }
    }

    /// Create an arena that can hold at most `capacity` live nodes.
    pub fn with_capacity(capacity: usize) -> Arena<K> {
        Arena {
            slots: Vec::with_capacity(usize::min(capacity, 1024)),
            free: Vec::default(),
            n_live: 0,
            capacity: Some(capacity),
        }
    }

    pub fn to_capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl<K> Store<K> for Arena<K> {
    fn alloc(&mut self, node: Node<K>) -> Result<NodeId> {
        match self.capacity {
            Some(capacity) if self.n_live >= capacity => {
                return err_at!(NoMemory, msg: "arena exhausted at {} nodes", capacity);
            }
            _ => (),
        }

        let id = match self.free.pop() {
            Some(slot) => {
                let item = &mut self.slots[slot];
                item.node = Some(node);
                NodeId::new(slot, item.gen)
            }
            None => {
                let (slot, gen) = (self.slots.len(), 0);
                self.slots.push(Slot {
                    gen,
                    node: Some(node),
                });
                NodeId::new(slot, gen)
            }
        };
        self.n_live += 1;

        Ok(id)
    }

    fn release(&mut self, id: NodeId) -> Result<Node<K>> {
        let item = match self.slots.get_mut(id.slot) {
            Some(item) if item.gen == id.gen => item,
            _ => return err_at!(InvalidPosition, msg: "release stale node {:?}", id),
        };
        match item.node.take() {
            Some(node) => {
                item.gen = item.gen.wrapping_add(1);
                self.free.push(id.slot);
                self.n_live -= 1;
                Ok(node)
            }
            None => err_at!(InvalidPosition, msg: "release free node {:?}", id),
        }
    }

    #[inline]
    fn is_live(&self, id: NodeId) -> bool {
        match self.slots.get(id.slot) {
            Some(item) => item.gen == id.gen && item.node.is_some(),
            None => false,
        }
    }

    #[inline]
    fn as_node(&self, id: NodeId) -> &Node<K> {
        match self.slots[id.slot].node.as_ref() {
            Some(node) => node,
            None => panic!("as_node(): {:?} is released, call the programmer", id),
        }
    }

    #[inline]
    fn as_mut_node(&mut self, id: NodeId) -> &mut Node<K> {
        match self.slots[id.slot].node.as_mut() {
            Some(node) => node,
            None => panic!("as_mut_node(): {:?} is released, call the programmer", id),
        }
    }

    fn to_empty(&self) -> Arena<K> {
        match self.capacity {
            Some(capacity) => Arena::with_capacity(capacity),
            None => Arena::new(),
        }
    }

    fn clear(&mut self) {
        // generations survive a clear, older handles must stay stale.
        self.free.clear();
        for (slot, item) in self.slots.iter_mut().enumerate() {
            if item.node.take().is_some() {
                item.gen = item.gen.wrapping_add(1);
            }
            self.free.push(slot);
        }
        self.free.reverse();
        self.n_live = 0;
    }

    #[inline]
    fn len(&self) -> usize {
        self.n_live
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
