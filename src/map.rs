//! Ordered map facade over [`RbTree`].

use std::cmp::Ordering;
use std::fmt;

use compare::{Compare, Natural};

use crate::algo;
use crate::alloc::{Global, RawAlloc};
use crate::cursor::{Reverse, TreeCursor};
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::{Iter, RbTree};

/// A map with unique keys kept in comparator order.
pub struct OrderedMap<K, V, C = Natural<K>, A: RawAlloc = Global> {
    tree: RbTree<K, V, C, A>,
}

impl<K: Ord, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self { tree: RbTree::new() }
    }
}

impl<K: Ord, V, A: RawAlloc> OrderedMap<K, V, Natural<K>, A> {
    pub fn new_in(alloc: A) -> Self {
        Self {
            tree: RbTree::new_in(alloc),
        }
    }
}

impl<K, V, C> OrderedMap<K, V, C> {
    pub fn with_cmp(cmp: C) -> Self {
        Self {
            tree: RbTree::with_cmp(cmp),
        }
    }
}

impl<K, V, C, A: RawAlloc> OrderedMap<K, V, C, A> {
    pub fn with_cmp_in(cmp: C, alloc: A) -> Self {
        Self {
            tree: RbTree::with_cmp_in(cmp, alloc),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.entry(self.tree.first())
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.entry(self.tree.last())
    }

    pub fn iter(&self) -> Iter<'_, K, V, C, A> {
        self.tree.iter()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.tree.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.tree.iter().map(|(_, v)| v)
    }

    pub fn begin(&self) -> TreeCursor<'_, K, V, C, A> {
        self.tree.begin()
    }

    pub fn end(&self) -> TreeCursor<'_, K, V, C, A> {
        self.tree.end()
    }

    pub fn rbegin(&self) -> Reverse<TreeCursor<'_, K, V, C, A>> {
        self.tree.rbegin()
    }

    pub fn rend(&self) -> Reverse<TreeCursor<'_, K, V, C, A>> {
        self.tree.rend()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// The underlying tree engine.
    pub fn tree(&self) -> &RbTree<K, V, C, A> {
        &self.tree
    }
}

impl<K, V, C: Compare<K>, A: RawAlloc> OrderedMap<K, V, C, A> {
    /// Inserts `key` if absent. Returns `false` and leaves the existing
    /// value alone if the key is present.
    pub fn insert(&mut self, key: K, value: V) -> Result<bool> {
        let (_, created) = self.tree.insert(key, value, None)?;
        Ok(created)
    }

    /// Inserts `key`, or overwrites its value if present. Returns `true`
    /// when a new entry was created.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Result<bool> {
        if let Some(slot) = self.get_mut(&key) {
            *slot = value;
            return Ok(false);
        }
        self.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.search(key).and_then(|id| self.tree.value(id))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.tree.search(key)?;
        self.tree.value_mut(id)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Number of entries with `key`: zero or one.
    pub fn count(&self, key: &K) -> usize {
        usize::from(self.contains_key(key))
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.take(key).map(|(_, v)| v)
    }

    /// Cursor at `key`, or [`end`](Self::end) if absent.
    pub fn find(&self, key: &K) -> TreeCursor<'_, K, V, C, A> {
        self.tree.cursor(self.tree.search(key).unwrap_or(NodeId::NIL))
    }

    pub fn lower_bound(&self, key: &K) -> TreeCursor<'_, K, V, C, A> {
        self.tree.cursor(self.tree.lower_bound(key))
    }

    pub fn upper_bound(&self, key: &K) -> TreeCursor<'_, K, V, C, A> {
        self.tree.cursor(self.tree.upper_bound(key))
    }

    pub fn equal_range(&self, key: &K) -> (TreeCursor<'_, K, V, C, A>, TreeCursor<'_, K, V, C, A>) {
        (self.lower_bound(key), self.upper_bound(key))
    }
}

impl<K: Ord, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, C: Clone, A: RawAlloc + Clone> Clone for OrderedMap<K, V, C, A> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, A: RawAlloc> fmt::Debug for OrderedMap<K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<'a, K, V, C, A: RawAlloc> IntoIterator for &'a OrderedMap<K, V, C, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, C, A: RawAlloc> PartialEq for OrderedMap<K, V, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && algo::equal(self.iter(), other.iter())
    }
}

impl<K: Eq, V: Eq, C, A: RawAlloc> Eq for OrderedMap<K, V, C, A> {}

impl<K: PartialOrd, V: PartialOrd, C, A: RawAlloc> PartialOrd for OrderedMap<K, V, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        algo::lexicographical_partial_cmp(self.iter(), other.iter())
    }
}

impl<K: Ord, V: Ord, C, A: RawAlloc> Ord for OrderedMap<K, V, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        algo::lexicographical_cmp(self.iter(), other.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{walk, Bidirectional};

    fn sample() -> OrderedMap<i32, &'static str> {
        let mut m = OrderedMap::new();
        for (k, v) in [(3, "c"), (1, "a"), (2, "b")] {
            assert!(m.insert(k, v).unwrap());
        }
        m
    }

    #[test]
    fn test_insert_does_not_replace() {
        let mut m = sample();
        assert!(!m.insert(2, "x").unwrap());
        assert_eq!(m.get(&2), Some(&"b"));
        assert!(!m.insert_or_assign(2, "x").unwrap());
        assert_eq!(m.get(&2), Some(&"x"));
        assert!(m.insert_or_assign(4, "d").unwrap());
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn test_lookup() {
        let mut m = sample();
        assert!(m.contains_key(&1));
        assert_eq!(m.count(&1), 1);
        assert_eq!(m.count(&7), 0);
        assert_eq!(m.get(&7), None);
        *m.get_mut(&3).unwrap() = "C";
        assert_eq!(m.get(&3), Some(&"C"));
        assert_eq!(m.first_key_value(), Some((&1, &"a")));
        assert_eq!(m.last_key_value(), Some((&3, &"C")));
    }

    #[test]
    fn test_remove() {
        let mut m = sample();
        assert_eq!(m.remove(&2), Some("b"));
        assert_eq!(m.remove(&2), None);
        assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        m.tree().validate();
    }

    #[test]
    fn test_cursors() {
        let m = sample();
        assert_eq!(m.find(&2).get(), Some((&2, &"b")));
        assert!(m.find(&9).is_end());
        assert_eq!(m.find(&9), m.end());

        let (lo, hi) = m.equal_range(&2);
        assert_eq!(walk(lo, hi).count(), 1);
        let (lo, hi) = m.equal_range(&5);
        assert_eq!(lo, hi);
        assert_eq!(m.lower_bound(&0), m.begin());
        assert_eq!(m.upper_bound(&3), m.end());

        let backwards: Vec<&str> = walk(m.rbegin(), m.rend()).map(|(_, v)| *v).collect();
        assert_eq!(backwards, vec!["c", "b", "a"]);
        assert_eq!(m.values().rev().copied().collect::<Vec<_>>(), backwards);
    }

    #[test]
    fn test_relational() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);
        b.insert(4, "d").unwrap();
        assert_ne!(a, b);
        assert!(a < b);

        let mut c = sample();
        c.insert_or_assign(1, "z").unwrap();
        assert!(a < c);
        assert!(c > b);
    }

    #[test]
    fn test_ordering_of_unordered_values() {
        let mut a = OrderedMap::new();
        let mut b = OrderedMap::new();
        a.insert(1, f64::NAN).unwrap();
        b.insert(1, 0.5).unwrap();
        assert_eq!(a.partial_cmp(&b), None);

        // Keys decide before the unordered value is reached.
        a.insert(0, 1.0).unwrap();
        b.insert(0, 2.0).unwrap();
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));

        let x = sample();
        let mut y = sample();
        assert_eq!(x.cmp(&y), Ordering::Equal);
        y.remove(&3);
        assert_eq!(x.cmp(&y), Ordering::Greater);
        assert_eq!(y.cmp(&x), Ordering::Less);
    }

    #[test]
    fn test_clear_swap_clone_debug() {
        let mut a = sample();
        let mut b = OrderedMap::new();
        b.insert(9, "i").unwrap();
        a.swap(&mut b);
        assert_eq!(a.len(), 1);
        assert_eq!(format!("{b:?}"), r#"{1: "a", 2: "b", 3: "c"}"#);

        let c = b.clone();
        b.clear();
        assert!(b.is_empty());
        assert_eq!(c.len(), 3);
        assert_eq!((&c).into_iter().count(), 3);
    }

    #[test]
    fn test_descending_map() {
        let mut m = OrderedMap::with_cmp(compare::natural::<u8>().rev());
        for k in [1u8, 5, 3] {
            m.insert(k, ()).unwrap();
        }
        assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec![5, 3, 1]);
        assert_eq!(m.lower_bound(&4).key(), Some(&3));
    }
}
