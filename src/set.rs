//! Ordered set facade over [`RbTree`] with unit values.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Map;

use compare::{Compare, Natural};

use crate::algo;
use crate::alloc::{Global, RawAlloc};
use crate::cursor::{Reverse, TreeCursor};
use crate::error::Result;
use crate::node::NodeId;
use crate::tree::{self, RbTree};

pub type Iter<'a, T, C, A> = Map<tree::Iter<'a, T, (), C, A>, fn((&'a T, &'a ())) -> &'a T>;

fn key_of<'a, T>((key, _): (&'a T, &'a ())) -> &'a T {
    key
}

/// A set of unique values kept in comparator order.
pub struct OrderedSet<T, C = Natural<T>, A: RawAlloc = Global> {
    tree: RbTree<T, (), C, A>,
}

impl<T: Ord> OrderedSet<T> {
    pub fn new() -> Self {
        Self { tree: RbTree::new() }
    }
}

impl<T: Ord, A: RawAlloc> OrderedSet<T, Natural<T>, A> {
    pub fn new_in(alloc: A) -> Self {
        Self {
            tree: RbTree::new_in(alloc),
        }
    }
}

impl<T, C> OrderedSet<T, C> {
    pub fn with_cmp(cmp: C) -> Self {
        Self {
            tree: RbTree::with_cmp(cmp),
        }
    }
}

impl<T, C, A: RawAlloc> OrderedSet<T, C, A> {
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

    pub fn first(&self) -> Option<&T> {
        self.tree.key(self.tree.first())
    }

    pub fn last(&self) -> Option<&T> {
        self.tree.key(self.tree.last())
    }

    pub fn iter(&self) -> Iter<'_, T, C, A> {
        self.tree.iter().map(key_of as fn(_) -> _)
    }

    pub fn begin(&self) -> TreeCursor<'_, T, (), C, A> {
        self.tree.begin()
    }

    pub fn end(&self) -> TreeCursor<'_, T, (), C, A> {
        self.tree.end()
    }

    pub fn rbegin(&self) -> Reverse<TreeCursor<'_, T, (), C, A>> {
        self.tree.rbegin()
    }

    pub fn rend(&self) -> Reverse<TreeCursor<'_, T, (), C, A>> {
        self.tree.rend()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }
}

impl<T, C: Compare<T>, A: RawAlloc> OrderedSet<T, C, A> {
    /// Adds `value` if absent. Returns whether it was added.
    pub fn insert(&mut self, value: T) -> Result<bool> {
        let (_, created) = self.tree.insert(value, (), None)?;
        Ok(created)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    pub fn count(&self, value: &T) -> usize {
        usize::from(self.contains(value))
    }

    pub fn remove(&mut self, value: &T) -> bool {
        self.tree.remove(value)
    }

    /// Removes and returns the stored value equivalent to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.tree.take(value).map(|(k, ())| k)
    }

    pub fn find(&self, value: &T) -> TreeCursor<'_, T, (), C, A> {
        self.tree.cursor(self.tree.search(value).unwrap_or(NodeId::NIL))
    }

    pub fn lower_bound(&self, value: &T) -> TreeCursor<'_, T, (), C, A> {
        self.tree.cursor(self.tree.lower_bound(value))
    }

    pub fn upper_bound(&self, value: &T) -> TreeCursor<'_, T, (), C, A> {
        self.tree.cursor(self.tree.upper_bound(value))
    }

    pub fn equal_range(&self, value: &T) -> (TreeCursor<'_, T, (), C, A>, TreeCursor<'_, T, (), C, A>) {
        (self.lower_bound(value), self.upper_bound(value))
    }
}

impl<T: Ord> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clone, A: RawAlloc + Clone> Clone for OrderedSet<T, C, A> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T: fmt::Debug, C, A: RawAlloc> fmt::Debug for OrderedSet<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C, A: RawAlloc> IntoIterator for &'a OrderedSet<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value).unwrap_or_else(|e| e.raise());
        }
        set
    }
}

impl<T: PartialEq, C, A: RawAlloc> PartialEq for OrderedSet<T, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && algo::equal(self.iter(), other.iter())
    }
}

impl<T: Eq, C, A: RawAlloc> Eq for OrderedSet<T, C, A> {}

impl<T: PartialOrd, C, A: RawAlloc> PartialOrd for OrderedSet<T, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        algo::lexicographical_partial_cmp(self.iter(), other.iter())
    }
}

impl<T: Ord, C, A: RawAlloc> Ord for OrderedSet<T, C, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        algo::lexicographical_cmp(self.iter(), other.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{walk, Bidirectional};

    #[test]
    fn test_insert_and_order() {
        let mut s = OrderedSet::new();
        for v in [10, 20, 5, 15, 3] {
            assert!(s.insert(v).unwrap());
        }
        assert!(!s.insert(15).unwrap());
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![3, 5, 10, 15, 20]);
        assert_eq!(s.lower_bound(&12).key(), Some(&15));
        assert_eq!(s.first(), Some(&3));
        assert_eq!(s.last(), Some(&20));

        assert!(s.remove(&10));
        assert!(!s.remove(&10));
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![3, 5, 15, 20]);
        s.tree.validate();
    }

    #[test]
    fn test_take_and_find() {
        let mut s: OrderedSet<String> = ["b", "a", "c"].into_iter().map(String::from).collect();
        assert_eq!(s.count(&"a".to_string()), 1);
        assert!(s.find(&"z".to_string()).is_end());
        assert_eq!(s.find(&"b".to_string()).get().map(|(k, _)| k.as_str()), Some("b"));
        assert_eq!(s.take(&"a".to_string()), Some("a".to_string()));
        assert!(!s.contains(&"a".to_string()));
        assert_eq!(format!("{s:?}"), r#"{"b", "c"}"#);
    }

    #[test]
    fn test_cursors() {
        let s: OrderedSet<i32> = (1..=5).collect();
        let back: Vec<i32> = walk(s.rbegin(), s.rend()).map(|(k, _)| *k).collect();
        assert_eq!(back, vec![5, 4, 3, 2, 1]);
        let (lo, hi) = s.equal_range(&3);
        assert_eq!(walk(lo, hi).count(), 1);
        assert_eq!(walk(s.upper_bound(&3), s.end()).count(), 2);
        assert_eq!(s.begin(), s.lower_bound(&0));
    }

    #[test]
    fn test_relational() {
        let a: OrderedSet<i32> = [1, 2, 3].into_iter().collect();
        let b: OrderedSet<i32> = [1, 2, 4].into_iter().collect();
        let c = a.clone();
        assert_eq!(a, c);
        assert!(a < b);
        assert!(b > c);
        assert_eq!(a.partial_cmp(&c), Some(Ordering::Equal));
        assert_eq!(a.cmp(&b), Ordering::Less);
        assert_eq!(b.cmp(&a), Ordering::Greater);
    }

    #[test]
    fn test_clear_and_swap() {
        let mut a: OrderedSet<i32> = (0..10).collect();
        let mut b = OrderedSet::new();
        a.swap(&mut b);
        assert!(a.is_empty());
        assert_eq!(b.len(), 10);
        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.first(), None);
    }
}
