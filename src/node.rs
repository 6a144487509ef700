//! Tree nodes and the arena that owns them.
//!
//! Nodes live in a [`DynArray`] and refer to each other by [`NodeId`].
//! Index 0 is the sentinel: every empty child link and the root's parent
//! link point at it. It is black, never holds an entry, and its `parent`
//! link caches the tree's maximum node.

use std::ops::{Index, IndexMut};

use crate::alloc::RawAlloc;
use crate::array::DynArray;
use crate::error::{Error, Result};

/// Handle to a node slot. [`NodeId::NIL`] is the sentinel, which doubles
/// as the end position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const NIL: NodeId = NodeId(0);

    #[inline]
    pub fn is_nil(self) -> bool {
        self.0 == 0
    }

    /// Slot index in the arena's backing array.
    #[inline]
    fn slot(self) -> usize {
        debug_assert!(!self.is_nil());
        self.0 as usize - 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Child side, used to write each rebalancing case once for both mirrors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    #[inline]
    pub(crate) fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    /// `None` for the sentinel and for vacant slots.
    pub(crate) entry: Option<(K, V)>,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) parent: NodeId,
    pub(crate) color: Color,
}

impl<K, V> Node<K, V> {
    const fn vacant() -> Self {
        Self {
            entry: None,
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
            color: Color::Black,
        }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> NodeId {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, id: NodeId) {
        match dir {
            Dir::Left => self.left = id,
            Dir::Right => self.right = id,
        }
    }
}

/// Node storage with a free list of vacant slots.
///
/// Vacant slots are chained through their `right` link.
pub(crate) struct NodeArena<K, V, A: RawAlloc> {
    slots: DynArray<Node<K, V>, A>,
    nil: Node<K, V>,
    free: NodeId,
}

impl<K, V, A: RawAlloc> NodeArena<K, V, A> {
    /// Largest number of slots a `u32` handle can address besides the
    /// sentinel.
    const MAX_SLOTS: usize = u32::MAX as usize - 1;

    pub(crate) fn new_in(alloc: A) -> Self {
        Self {
            slots: DynArray::new_in(alloc),
            nil: Node::vacant(),
            free: NodeId::NIL,
        }
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        self.slots.allocator()
    }

    /// Bytes reserved for node slots.
    pub(crate) fn capacity_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Node<K, V>>()
    }

    /// Creates a red, childless node holding `entry`.
    pub(crate) fn alloc(&mut self, key: K, value: V, parent: NodeId) -> Result<NodeId> {
        let node = Node {
            entry: Some((key, value)),
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent,
            color: Color::Red,
        };

        if !self.free.is_nil() {
            let id = self.free;
            self.free = self[id].right;
            self[id] = node;
            return Ok(id);
        }

        let slot = self.slots.len();
        if slot >= Self::MAX_SLOTS {
            return Err(Error::CapacityOverflow {
                requested: slot + 1,
                max: Self::MAX_SLOTS,
            });
        }
        if slot == self.slots.capacity() {
            log::trace!("node arena full at {slot} slots, growing");
        }
        self.slots.push_back(node)?;
        Ok(NodeId(slot as u32 + 1))
    }

    /// Vacates `id` and hands back its entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let free = self.free;
        let node = &mut self[id];
        let entry = node.entry.take().expect("released node must hold an entry");
        node.left = NodeId::NIL;
        node.right = free;
        node.parent = NodeId::NIL;
        node.color = Color::Black;
        self.free = id;
        entry
    }

    /// Drops every entry and forgets every slot. Keeps the buffer.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.nil = Node::vacant();
        self.free = NodeId::NIL;
    }

    pub(crate) fn try_clone(&self) -> Result<Self>
    where
        K: Clone,
        V: Clone,
        A: Clone,
    {
        Ok(Self {
            slots: self.slots.try_clone()?,
            nil: self.nil.clone(),
            free: self.free,
        })
    }

    /// Checked lookup. `None` for handles past the end of this arena.
    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        if id.is_nil() {
            Some(&self.nil)
        } else {
            self.slots.get(id.slot())
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        if id.is_nil() {
            Some(&mut self.nil)
        } else {
            self.slots.get_mut(id.slot())
        }
    }

    /// Number of vacant slots on the free list.
    #[cfg(test)]
    pub(crate) fn free_len(&self) -> usize {
        let mut n = 0;
        let mut id = self.free;
        while !id.is_nil() {
            n += 1;
            id = self[id].right;
        }
        n
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl<K, V, A: RawAlloc> Index<NodeId> for NodeArena<K, V, A> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        if id.is_nil() {
            &self.nil
        } else {
            &self.slots[id.slot()]
        }
    }
}

impl<K, V, A: RawAlloc> IndexMut<NodeId> for NodeArena<K, V, A> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        if id.is_nil() {
            &mut self.nil
        } else {
            &mut self.slots[id.slot()]
        }
    }
}
