//! LIFO adaptor over [`DynArray`].

use std::cmp::Ordering;
use std::fmt;

use crate::alloc::{Global, RawAlloc};
use crate::array::DynArray;
use crate::error::Result;

/// A stack whose top is the back of the array. Compares bottom to top.
pub struct Stack<T, A: RawAlloc = Global> {
    items: DynArray<T, A>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self {
            items: DynArray::new(),
        }
    }
}

impl<T, A: RawAlloc> Stack<T, A> {
    pub fn new_in(alloc: A) -> Self {
        Self {
            items: DynArray::new_in(alloc),
        }
    }

    pub fn push(&mut self, value: T) -> Result<()> {
        self.items.push_back(value)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements from bottom to top.
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: RawAlloc + Clone> Clone for Stack<T, A> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for Stack<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq, A: RawAlloc> PartialEq for Stack<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq, A: RawAlloc> Eq for Stack<T, A> {}

impl<T: PartialOrd, A: RawAlloc> PartialOrd for Stack<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.items.partial_cmp(&other.items)
    }
}

impl<T: Ord, A: RawAlloc> Ord for Stack<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.cmp(&other.items)
    }
}
