//! Red-black tree engine.
//!
//! The tree owns a [`NodeArena`] and links nodes by [`NodeId`]. All
//! rebalancing is written once per case with a [`Dir`] parameter; the
//! mirrored case is the same code with the direction flipped.
//!
//! Handles returned by the engine stay valid until the node they name is
//! removed. Slots are recycled, so a stale handle may later name an
//! unrelated node. Entry access, removal and hints check handles and
//! answer `None` (or ignore the hint) for anything that is not a live node
//! of this tree; the navigation methods expect a live handle and panic on
//! one past the end of the storage.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use compare::{Compare, Natural};

use crate::alloc::{Global, RawAlloc};
use crate::cursor::{Reverse, TreeCursor};
use crate::error::Result;
use crate::node::{Color, Dir, NodeArena, NodeId};

/// Where a key belongs: an existing node holding an equal key, or the free
/// child link it would be attached to.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Occupied(NodeId),
    Vacant(NodeId, Dir),
}

/// A red-black tree mapping `K` to `V` under the comparator `C`.
///
/// This is the engine behind [`OrderedMap`](crate::OrderedMap) and
/// [`OrderedSet`](crate::OrderedSet). It works in node handles rather than
/// references so callers can hold positions across lookups.
pub struct RbTree<K, V, C = Natural<K>, A: RawAlloc = Global> {
    nodes: NodeArena<K, V, A>,
    root: NodeId,
    len: usize,
    cmp: C,
}

impl<K: Ord, V> RbTree<K, V> {
    pub fn new() -> Self {
        Self::with_cmp(compare::natural())
    }
}

impl<K: Ord, V, A: RawAlloc> RbTree<K, V, Natural<K>, A> {
    pub fn new_in(alloc: A) -> Self {
        Self::with_cmp_in(compare::natural(), alloc)
    }
}

impl<K, V, C> RbTree<K, V, C> {
    pub fn with_cmp(cmp: C) -> Self {
        Self::with_cmp_in(cmp, Global)
    }
}

impl<K, V, C, A: RawAlloc> RbTree<K, V, C, A> {
    /// Creates an empty tree. Only the sentinel exists; nothing is
    /// allocated until the first insertion.
    pub fn with_cmp_in(cmp: C, alloc: A) -> Self {
        Self {
            nodes: NodeArena::new_in(alloc),
            root: NodeId::NIL,
            len: 0,
            cmp,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn cmp(&self) -> &C {
        &self.cmp
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        self.nodes.allocator()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Bytes reserved for node storage.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity_bytes()
    }

    // =========================================================================
    // Node access
    // =========================================================================

    #[inline]
    fn color(&self, x: NodeId) -> Color {
        self.nodes[x].color
    }

    #[inline]
    fn parent(&self, x: NodeId) -> NodeId {
        self.nodes[x].parent
    }

    #[inline]
    fn key_at(&self, x: NodeId) -> &K {
        let (key, _) = self.nodes[x]
            .entry
            .as_ref()
            .expect("linked node must hold an entry");
        key
    }

    /// The entry at `id`. `None` for the sentinel, a vacant slot, or a
    /// handle this tree never issued.
    pub fn entry(&self, id: NodeId) -> Option<(&K, &V)> {
        self.nodes.get(id)?.entry.as_ref().map(|(k, v)| (k, v))
    }

    pub fn key(&self, id: NodeId) -> Option<&K> {
        self.entry(id).map(|(k, _)| k)
    }

    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.entry(id).map(|(_, v)| v)
    }

    /// Keys are never handed out mutably: that could break the ordering.
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.nodes.get_mut(id)?.entry.as_mut().map(|(_, v)| v)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Leftmost node of the subtree at `x`.
    pub fn minimum(&self, mut x: NodeId) -> NodeId {
        if x.is_nil() {
            return x;
        }
        while !self.nodes[x].left.is_nil() {
            x = self.nodes[x].left;
        }
        x
    }

    /// Rightmost node of the subtree at `x`.
    pub fn maximum(&self, mut x: NodeId) -> NodeId {
        if x.is_nil() {
            return x;
        }
        while !self.nodes[x].right.is_nil() {
            x = self.nodes[x].right;
        }
        x
    }

    /// In-order next node. The maximum steps to the sentinel, and the
    /// sentinel steps to the minimum.
    pub fn successor(&self, x: NodeId) -> NodeId {
        if x.is_nil() {
            return self.first();
        }
        let right = self.nodes[x].right;
        if !right.is_nil() {
            return self.minimum(right);
        }
        let mut x = x;
        let mut y = self.parent(x);
        while !y.is_nil() && x == self.nodes[y].right {
            x = y;
            y = self.parent(y);
        }
        y
    }

    /// In-order previous node. The minimum steps to the sentinel, and the
    /// sentinel steps to the maximum.
    pub fn predecessor(&self, x: NodeId) -> NodeId {
        if x.is_nil() {
            return self.last();
        }
        let left = self.nodes[x].left;
        if !left.is_nil() {
            return self.maximum(left);
        }
        let mut x = x;
        let mut y = self.parent(x);
        while !y.is_nil() && x == self.nodes[y].left {
            x = y;
            y = self.parent(y);
        }
        y
    }

    /// Smallest node, or the sentinel when empty.
    pub fn first(&self) -> NodeId {
        self.minimum(self.root)
    }

    /// Largest node, or the sentinel when empty. O(1): the sentinel's
    /// parent link tracks it.
    #[inline]
    pub fn last(&self) -> NodeId {
        self.nodes[NodeId::NIL].parent
    }

    fn refresh_last(&mut self) {
        let max = self.maximum(self.root);
        self.nodes[NodeId::NIL].parent = max;
    }

    // =========================================================================
    // Structural surgery
    // =========================================================================

    /// Rotates `x` down towards `dir`. Its child on the other side takes
    /// its place. `rotate(x, Dir::Left)` is the classic left rotation.
    fn rotate(&mut self, x: NodeId, dir: Dir) {
        let y = self.nodes[x].child(dir.flip());
        debug_assert!(!y.is_nil(), "rotation pivot must exist");

        let inner = self.nodes[y].child(dir);
        self.nodes[x].set_child(dir.flip(), inner);
        if !inner.is_nil() {
            self.nodes[inner].parent = x;
        }

        let p = self.parent(x);
        self.nodes[y].parent = p;
        if p.is_nil() {
            self.root = y;
        } else if self.nodes[p].left == x {
            self.nodes[p].left = y;
        } else {
            self.nodes[p].right = y;
        }

        self.nodes[y].set_child(dir, x);
        self.nodes[x].parent = y;
    }

    /// Puts `v` where `u` hangs. `v` may be the sentinel, whose parent link
    /// is then overwritten; `remove_fixup` relies on that.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let p = self.parent(u);
        if p.is_nil() {
            self.root = v;
        } else if self.nodes[p].left == u {
            self.nodes[p].left = v;
        } else {
            self.nodes[p].right = v;
        }
        self.nodes[v].parent = p;
    }

    fn link(&mut self, parent: NodeId, dir: Dir, key: K, value: V) -> Result<NodeId> {
        let z = self.nodes.alloc(key, value, parent)?;
        let extends_max = parent.is_nil() || (dir == Dir::Right && parent == self.last());
        if parent.is_nil() {
            self.root = z;
        } else {
            self.nodes[parent].set_child(dir, z);
        }
        self.len += 1;
        self.insert_fixup(z);
        // Rotations keep in-order positions, so the maximum only changes
        // when the new node lands right of it.
        if extends_max {
            self.nodes[NodeId::NIL].parent = z;
        }
        Ok(z)
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            // A red parent is never the root, so the grandparent is real.
            let g = self.parent(p);
            let side = if self.nodes[g].left == p {
                Dir::Left
            } else {
                Dir::Right
            };
            let uncle = self.nodes[g].child(side.flip());

            if self.color(uncle) == Color::Red {
                self.nodes[p].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[g].color = Color::Red;
                z = g;
                continue;
            }

            if z == self.nodes[p].child(side.flip()) {
                z = p;
                self.rotate(z, side);
            }
            let p = self.parent(z);
            let g = self.parent(p);
            self.nodes[p].color = Color::Black;
            self.nodes[g].color = Color::Red;
            self.rotate(g, side.flip());
            break;
        }
        let root = self.root;
        self.nodes[root].color = Color::Black;
    }

    fn remove_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);
            let dir = if self.nodes[p].left == x {
                Dir::Left
            } else {
                Dir::Right
            };
            let mut w = self.nodes[p].child(dir.flip());

            if self.color(w) == Color::Red {
                self.nodes[w].color = Color::Black;
                self.nodes[p].color = Color::Red;
                self.rotate(p, dir);
                w = self.nodes[p].child(dir.flip());
            }

            let near = self.nodes[w].child(dir);
            let far = self.nodes[w].child(dir.flip());
            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                self.nodes[w].color = Color::Red;
                x = p;
                continue;
            }

            if self.color(far) == Color::Black {
                self.nodes[near].color = Color::Black;
                self.nodes[w].color = Color::Red;
                self.rotate(w, dir.flip());
                w = self.nodes[p].child(dir.flip());
            }

            self.nodes[w].color = self.nodes[p].color;
            self.nodes[p].color = Color::Black;
            let far = self.nodes[w].child(dir.flip());
            self.nodes[far].color = Color::Black;
            self.rotate(p, dir);
            x = self.root;
        }
        self.nodes[x].color = Color::Black;
    }

    /// Unlinks the node `z` and returns its entry. Returns `None` for the
    /// sentinel, a vacant slot, or a handle past the end of this tree's
    /// storage.
    pub fn remove_node(&mut self, z: NodeId) -> Option<(K, V)> {
        if z.is_nil() || self.entry(z).is_none() {
            return None;
        }

        let zl = self.nodes[z].left;
        let zr = self.nodes[z].right;
        let mut removed_color = self.nodes[z].color;
        let x;

        if zl.is_nil() {
            x = zr;
            self.transplant(z, zr);
        } else if zr.is_nil() {
            x = zl;
            self.transplant(z, zl);
        } else {
            // The successor leaves its own slot and takes over z's slot and
            // colour; its old slot is what lost a node.
            let y = self.minimum(zr);
            removed_color = self.nodes[y].color;
            x = self.nodes[y].right;
            if self.parent(y) == z {
                self.nodes[x].parent = y;
            } else {
                self.transplant(y, x);
                self.nodes[y].right = zr;
                self.nodes[zr].parent = y;
            }
            self.transplant(z, y);
            self.nodes[y].left = zl;
            self.nodes[zl].parent = y;
            self.nodes[y].color = self.nodes[z].color;
        }

        if removed_color == Color::Black {
            self.remove_fixup(x);
        }
        self.len -= 1;
        let entry = self.nodes.release(z);
        self.refresh_last();
        Some(entry)
    }

    /// Drops every entry. Node storage is kept for reuse.
    pub fn clear(&mut self) {
        log::trace!("clearing tree of {} nodes", self.len);
        self.nodes.clear();
        self.root = NodeId::NIL;
        self.len = 0;
    }

    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    pub fn try_clone(&self) -> Result<Self>
    where
        K: Clone,
        V: Clone,
        C: Clone,
        A: Clone,
    {
        Ok(Self {
            nodes: self.nodes.try_clone()?,
            root: self.root,
            len: self.len,
            cmp: self.cmp.clone(),
        })
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    pub fn iter(&self) -> Iter<'_, K, V, C, A> {
        Iter {
            tree: self,
            front: self.first(),
            back: self.last(),
            remaining: self.len,
        }
    }

    pub fn cursor(&self, id: NodeId) -> TreeCursor<'_, K, V, C, A> {
        TreeCursor::new(self, id)
    }

    pub fn begin(&self) -> TreeCursor<'_, K, V, C, A> {
        self.cursor(self.first())
    }

    pub fn end(&self) -> TreeCursor<'_, K, V, C, A> {
        self.cursor(NodeId::NIL)
    }

    pub fn rbegin(&self) -> Reverse<TreeCursor<'_, K, V, C, A>> {
        Reverse::new(self.end())
    }

    pub fn rend(&self) -> Reverse<TreeCursor<'_, K, V, C, A>> {
        Reverse::new(self.begin())
    }
}

impl<K, V, C: Compare<K>, A: RawAlloc> RbTree<K, V, C, A> {
    /// Finds a node whose key is equivalent to `key`.
    pub fn search(&self, key: &K) -> Option<NodeId> {
        let mut x = self.root;
        while !x.is_nil() {
            match self.cmp.compare(key, self.key_at(x)) {
                Ordering::Less => x = self.nodes[x].left,
                Ordering::Greater => x = self.nodes[x].right,
                Ordering::Equal => return Some(x),
            }
        }
        None
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// First node whose key is not less than `key`, or the sentinel.
    pub fn lower_bound(&self, key: &K) -> NodeId {
        let mut x = self.root;
        let mut bound = NodeId::NIL;
        while !x.is_nil() {
            if self.cmp.compares_lt(self.key_at(x), key) {
                x = self.nodes[x].right;
            } else {
                bound = x;
                x = self.nodes[x].left;
            }
        }
        bound
    }

    /// First node whose key is greater than `key`, or the sentinel.
    pub fn upper_bound(&self, key: &K) -> NodeId {
        let mut x = self.root;
        let mut bound = NodeId::NIL;
        while !x.is_nil() {
            if self.cmp.compares_lt(key, self.key_at(x)) {
                bound = x;
                x = self.nodes[x].left;
            } else {
                x = self.nodes[x].right;
            }
        }
        bound
    }

    /// Root-down walk to the attachment point for `key`. With `multi`,
    /// equal keys are passed on the right so the new node follows them.
    fn locate(&self, key: &K, multi: bool) -> Slot {
        let mut parent = NodeId::NIL;
        let mut dir = Dir::Left;
        let mut x = self.root;
        while !x.is_nil() {
            parent = x;
            dir = match self.cmp.compare(key, self.key_at(x)) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal if multi => Dir::Right,
                Ordering::Equal => return Slot::Occupied(x),
            };
            x = self.nodes[x].child(dir);
        }
        Slot::Vacant(parent, dir)
    }

    /// Attachment point right before `hint` (after the maximum when `hint`
    /// is the sentinel), if `key` really belongs there.
    fn locate_near(&self, hint: NodeId, key: &K, multi: bool) -> Option<Slot> {
        let fits_before = |a: &K, b: &K| {
            if multi {
                !self.cmp.compares_lt(b, a)
            } else {
                self.cmp.compares_lt(a, b)
            }
        };

        if hint.is_nil() {
            let max = self.last();
            if max.is_nil() {
                return None;
            }
            return fits_before(self.key_at(max), key).then_some(Slot::Vacant(max, Dir::Right));
        }
        if self.entry(hint).is_none() {
            return None;
        }

        let at_hint = self.key_at(hint);
        if !fits_before(key, at_hint) {
            if !multi && !self.cmp.compares_lt(at_hint, key) {
                return Some(Slot::Occupied(hint));
            }
            return None;
        }

        let prev = self.predecessor(hint);
        if prev.is_nil() {
            return Some(Slot::Vacant(hint, Dir::Left));
        }
        if !fits_before(self.key_at(prev), key) {
            return None;
        }
        // Exactly one of these links is free: `prev` is either the maximum
        // of hint's left subtree or the ancestor hint hangs right of.
        if self.nodes[prev].right.is_nil() {
            Some(Slot::Vacant(prev, Dir::Right))
        } else {
            Some(Slot::Vacant(hint, Dir::Left))
        }
    }

    /// Inserts `key` unless an equivalent key is present.
    ///
    /// Returns the node holding the key and whether it was created. When
    /// the key already exists the offered pair is dropped and the existing
    /// node is left untouched. A correct `hint` (the node the key belongs
    /// right before, or the sentinel for "after the maximum") skips the
    /// root-down walk; a wrong one is ignored.
    pub fn insert(&mut self, key: K, value: V, hint: Option<NodeId>) -> Result<(NodeId, bool)> {
        let slot = hint
            .and_then(|h| self.locate_near(h, &key, false))
            .unwrap_or_else(|| self.locate(&key, false));
        match slot {
            Slot::Occupied(id) => Ok((id, false)),
            Slot::Vacant(parent, dir) => Ok((self.link(parent, dir, key, value)?, true)),
        }
    }

    /// Inserts `key` even if equivalent keys exist. Without a usable hint
    /// the new node goes after its equals.
    pub fn insert_multi(&mut self, key: K, value: V, hint: Option<NodeId>) -> Result<NodeId> {
        let slot = hint
            .and_then(|h| self.locate_near(h, &key, true))
            .unwrap_or_else(|| self.locate(&key, true));
        match slot {
            Slot::Vacant(parent, dir) => self.link(parent, dir, key, value),
            Slot::Occupied(_) => unreachable!("multi insertion never stops at an equal key"),
        }
    }

    /// Removes the entry for `key` and returns it.
    pub fn take(&mut self, key: &K) -> Option<(K, V)> {
        let id = self.search(key)?;
        self.remove_node(id)
    }

    /// Removes the entry for `key`. Returns whether one was found.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Checks every red-black invariant and the cached maximum. Returns the
    /// black height of the root.
    #[cfg(test)]
    pub(crate) fn validate(&self) -> usize {
        assert_eq!(self.color(NodeId::NIL), Color::Black, "sentinel must be black");
        assert!(self.nodes[NodeId::NIL].entry.is_none(), "sentinel holds data");
        assert_eq!(self.color(self.root), Color::Black, "root must be black");
        if !self.root.is_nil() {
            assert!(self.parent(self.root).is_nil(), "root has a parent");
        }
        assert_eq!(self.last(), self.maximum(self.root), "cached maximum is stale");

        let (count, black_height) = self.validate_subtree(self.root);
        assert_eq!(count, self.len, "reachable node count must match len");

        let mut prev: Option<&K> = None;
        for (k, _) in self.iter() {
            if let Some(p) = prev {
                assert!(!self.cmp.compares_lt(k, p), "in-order walk out of order");
            }
            prev = Some(k);
        }
        black_height
    }

    #[cfg(test)]
    fn validate_subtree(&self, x: NodeId) -> (usize, usize) {
        if x.is_nil() {
            return (0, 0);
        }
        let node = &self.nodes[x];
        assert!(node.entry.is_some(), "linked node is vacant");
        for child in [node.left, node.right] {
            if !child.is_nil() {
                assert_eq!(self.parent(child), x, "broken parent link");
                if node.color == Color::Red {
                    assert_eq!(self.color(child), Color::Black, "red node has a red child");
                }
            }
        }
        let (lc, lh) = self.validate_subtree(node.left);
        let (rc, rh) = self.validate_subtree(node.right);
        assert_eq!(lh, rh, "black height differs between subtrees");
        (lc + rc + 1, lh + usize::from(node.color == Color::Black))
    }
}

impl<K: Ord, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, C: Clone, A: RawAlloc + Clone> Clone for RbTree<K, V, C, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| e.raise())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, A: RawAlloc> fmt::Debug for RbTree<K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// In-order iterator over a tree's entries.
pub struct Iter<'a, K, V, C, A: RawAlloc> {
    tree: &'a RbTree<K, V, C, A>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<K, V, C, A: RawAlloc> Clone for Iter<'_, K, V, C, A> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, C, A: RawAlloc> Iterator for Iter<'a, K, V, C, A> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front;
        self.front = self.tree.successor(id);
        self.remaining -= 1;
        self.tree.entry(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C, A: RawAlloc> DoubleEndedIterator for Iter<'_, K, V, C, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back;
        self.back = self.tree.predecessor(id);
        self.remaining -= 1;
        self.tree.entry(id)
    }
}

impl<K, V, C, A: RawAlloc> ExactSizeIterator for Iter<'_, K, V, C, A> {}

impl<K, V, C, A: RawAlloc> FusedIterator for Iter<'_, K, V, C, A> {}

impl<'a, K, V, C, A: RawAlloc> IntoIterator for &'a RbTree<K, V, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
