//! Position handles and iterator categories.
//!
//! A cursor is a position inside a container that can step in both
//! directions and may sit one past the last element (the end position),
//! where [`get`](Bidirectional::get) yields `None`. The traits play the role
//! of iterator categories: [`Reverse`] and [`walk`] are written once against
//! them and work for tree and array positions alike.

use std::fmt;

use crate::alloc::RawAlloc;
use crate::node::NodeId;
use crate::tree::RbTree;

/// A position that can step forwards and backwards.
pub trait Bidirectional: Clone + PartialEq {
    type Item;

    /// The element at this position, or `None` at the end.
    fn get(&self) -> Option<Self::Item>;

    fn move_next(&mut self);

    fn move_prev(&mut self);
}

/// A position that can jump by an arbitrary distance in O(1).
pub trait RandomAccess: Bidirectional {
    fn offset(&mut self, n: isize);

    /// Number of steps from `self` forward to `other`.
    fn distance_to(&self, other: &Self) -> isize;

    fn nth(&self, n: isize) -> Option<Self::Item> {
        let mut c = self.clone();
        c.offset(n);
        c.get()
    }
}

// =============================================================================
// Tree positions
// =============================================================================

/// A position in an [`RbTree`]. Stepping follows successor / predecessor
/// links; the end position is the sentinel.
pub struct TreeCursor<'a, K, V, C, A: RawAlloc> {
    tree: &'a RbTree<K, V, C, A>,
    node: NodeId,
}

impl<'a, K, V, C, A: RawAlloc> TreeCursor<'a, K, V, C, A> {
    pub(crate) fn new(tree: &'a RbTree<K, V, C, A>, node: NodeId) -> Self {
        Self { tree, node }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.node.is_nil()
    }

    pub fn key(&self) -> Option<&'a K> {
        self.tree.key(self.node)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.tree.value(self.node)
    }
}

impl<K, V, C, A: RawAlloc> Clone for TreeCursor<'_, K, V, C, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C, A: RawAlloc> Copy for TreeCursor<'_, K, V, C, A> {}

impl<K, V, C, A: RawAlloc> PartialEq for TreeCursor<'_, K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl<K, V, C, A: RawAlloc> Eq for TreeCursor<'_, K, V, C, A> {}

impl<K, V, C, A: RawAlloc> fmt::Debug for TreeCursor<'_, K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TreeCursor").field(&self.node).finish()
    }
}

impl<'a, K, V, C, A: RawAlloc> Bidirectional for TreeCursor<'a, K, V, C, A> {
    type Item = (&'a K, &'a V);

    fn get(&self) -> Option<Self::Item> {
        self.tree.entry(self.node)
    }

    fn move_next(&mut self) {
        self.node = self.tree.successor(self.node);
    }

    fn move_prev(&mut self) {
        self.node = self.tree.predecessor(self.node);
    }
}

// =============================================================================
// Array positions
// =============================================================================

/// A position in a contiguous sequence, `0..=len`.
pub struct ArrayCursor<'a, T> {
    slice: &'a [T],
    pos: usize,
}

impl<'a, T> ArrayCursor<'a, T> {
    pub fn new(slice: &'a [T], pos: usize) -> Self {
        Self { slice, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<T> Clone for ArrayCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArrayCursor<'_, T> {}

impl<T> PartialEq for ArrayCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.slice.as_ptr(), other.slice.as_ptr()) && self.pos == other.pos
    }
}

impl<T> Eq for ArrayCursor<'_, T> {}

impl<T> fmt::Debug for ArrayCursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArrayCursor").field(&self.pos).finish()
    }
}

impl<'a, T> Bidirectional for ArrayCursor<'a, T> {
    type Item = &'a T;

    fn get(&self) -> Option<&'a T> {
        self.slice.get(self.pos)
    }

    fn move_next(&mut self) {
        self.pos = self.pos.wrapping_add(1);
    }

    // Stepping before the first element wraps to an invalid position whose
    // `get` is `None`.
    fn move_prev(&mut self) {
        self.pos = self.pos.wrapping_sub(1);
    }
}

impl<T> RandomAccess for ArrayCursor<'_, T> {
    fn offset(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add_signed(n);
    }

    fn distance_to(&self, other: &Self) -> isize {
        other.pos.wrapping_sub(self.pos) as isize
    }
}

// =============================================================================
// Adaptors
// =============================================================================

/// Walks a sequence backwards by wrapping a forward cursor.
///
/// Holds the position *after* the element it designates, so
/// `Reverse::new(end)` designates the last element and `Reverse::new(begin)`
/// is the reverse end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reverse<C> {
    base: C,
}

impl<C: Bidirectional> Reverse<C> {
    pub fn new(base: C) -> Self {
        Self { base }
    }

    /// The underlying forward position (one past the designated element).
    pub fn base(&self) -> C {
        self.base.clone()
    }
}

impl<C: Bidirectional> Bidirectional for Reverse<C> {
    type Item = C::Item;

    fn get(&self) -> Option<C::Item> {
        let mut c = self.base.clone();
        c.move_prev();
        c.get()
    }

    fn move_next(&mut self) {
        self.base.move_prev();
    }

    fn move_prev(&mut self) {
        self.base.move_next();
    }
}

impl<C: RandomAccess> RandomAccess for Reverse<C> {
    fn offset(&mut self, n: isize) {
        self.base.offset(n.wrapping_neg());
    }

    fn distance_to(&self, other: &Self) -> isize {
        other.base.distance_to(&self.base)
    }
}

/// Iterates the half-open cursor range `[first, last)`.
pub fn walk<C: Bidirectional>(first: C, last: C) -> Walk<C> {
    Walk {
        front: first,
        back: last,
    }
}

#[derive(Clone, Debug)]
pub struct Walk<C> {
    front: C,
    back: C,
}

impl<C: Bidirectional> Iterator for Walk<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<C::Item> {
        if self.front == self.back {
            return None;
        }
        let item = self.front.get()?;
        self.front.move_next();
        Some(item)
    }
}

impl<C: Bidirectional> DoubleEndedIterator for Walk<C> {
    fn next_back(&mut self) -> Option<C::Item> {
        if self.front == self.back {
            return None;
        }
        self.back.move_prev();
        self.back.get()
    }
}
