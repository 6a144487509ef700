//! Dynamic contiguous array engine.
//!
//! `DynArray` keeps the classic three-cursor layout: a base pointer, the
//! number of live elements and the number of allocated slots. Only
//! `[0, len)` is ever reachable through references; `[len, cap)` is raw
//! storage.

use std::alloc::Layout;
use std::cmp::{self, Ordering};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut, Range};
use std::ptr::{self, NonNull};
use std::slice;

use crate::algo;
use crate::alloc::{Global, RawAlloc};
use crate::cursor::{ArrayCursor, Reverse};
use crate::error::{Error, Result};

/// A growable array with an injectable memory source.
///
/// Every operation that may allocate returns [`Result`]: requesting more
/// than [`max_size`](Self::max_size) elements fails with
/// [`Error::CapacityOverflow`], and a refusing allocator yields
/// [`Error::AllocFailed`]. A failed reallocation leaves the array exactly
/// as it was.
pub struct DynArray<T, A: RawAlloc = Global> {
    ptr: NonNull<T>,
    len: usize,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: the array owns its elements like `Vec` does.
unsafe impl<T: Send, A: RawAlloc + Send> Send for DynArray<T, A> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for DynArray<T, A> {}

impl<T> DynArray<T> {
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, A: RawAlloc> DynArray<T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty array. Does not allocate.
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            alloc,
            _marker: PhantomData,
        }
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let mut array = Self::new_in(alloc);
        array.reserve(capacity)?;
        Ok(array)
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
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Largest element count the allocator can ever provide for `T`.
    pub fn max_size(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.alloc.max_bytes() / mem::size_of::<T>()
        }
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Base pointer of the buffer. Dangling (but aligned) when nothing is
    /// allocated.
    #[inline]
    pub fn data(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) is initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: [0, len) is initialized and uniquely borrowed.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    // =========================================================================
    // Storage
    // =========================================================================

    fn allocate(&self, n: usize) -> Result<NonNull<T>> {
        let max = self.max_size();
        if n > max {
            return Err(Error::CapacityOverflow { requested: n, max });
        }
        if Self::IS_ZST || n == 0 {
            return Ok(NonNull::dangling());
        }
        let layout =
            Layout::array::<T>(n).map_err(|_| Error::CapacityOverflow { requested: n, max })?;
        Ok(self.alloc.allocate(layout)?.cast())
    }

    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate(cap)` on this array.
    unsafe fn deallocate(&self, ptr: NonNull<T>, cap: usize) {
        if Self::IS_ZST || cap == 0 {
            return;
        }
        // SAFETY: the same layout was validated by `allocate`.
        unsafe {
            let layout = Layout::from_size_align_unchecked(
                mem::size_of::<T>() * cap,
                mem::align_of::<T>(),
            );
            self.alloc.deallocate(ptr.cast(), layout);
        }
    }

    /// Moves the live elements into a fresh buffer of exactly `new_cap`
    /// slots. The old buffer is released only after the new one exists.
    fn relocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        let new_ptr = self.allocate(new_cap)?;
        log::trace!(
            "relocating {} elements: capacity {} -> {}",
            self.len,
            self.cap,
            new_cap
        );
        // SAFETY: the buffers are distinct and both hold at least `len` slots.
        // Moving is a bitwise copy, so nothing can fail past this point.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len);
            self.deallocate(self.ptr, self.cap);
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Makes room for `additional` more elements using the amortized growth
    /// policy: the new capacity is `len + max(additional, len)`.
    fn grow(&mut self, additional: usize) -> Result<()> {
        if self.cap - self.len >= additional {
            return Ok(());
        }
        let max = self.max_size();
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow {
                requested: usize::MAX,
                max,
            })?;
        if required > max {
            return Err(Error::CapacityOverflow {
                requested: required,
                max,
            });
        }
        // Only the headroom is clamped; the request itself always fits here.
        let headroom = cmp::max(additional, self.len);
        let new_cap = self.len.saturating_add(headroom).min(max).max(required);
        self.relocate(new_cap)
    }

    /// Ensures the capacity is at least `new_capacity`, allocating exactly
    /// that much if it has to grow.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.cap {
            return Ok(());
        }
        self.relocate(new_capacity)
    }

    /// Drops unused capacity. This is the only operation that lowers it.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if Self::IS_ZST || self.cap == self.len {
            return Ok(());
        }
        if self.len == 0 {
            // SAFETY: the buffer came from `allocate(cap)`.
            unsafe { self.deallocate(self.ptr, self.cap) };
            self.ptr = NonNull::dangling();
            self.cap = 0;
            return Ok(());
        }
        self.relocate(self.len)
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    /// # Safety
    ///
    /// `len < cap`.
    #[inline]
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.cap);
        // SAFETY: slot `len` is allocated and uninitialized.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.len == self.cap {
            self.grow(1)?;
        }
        // SAFETY: grown above.
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is now outside the live range.
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Inserts `value` before `pos`, shifting the tail right. Returns `pos`.
    ///
    /// # Panics
    ///
    /// If `pos > len`.
    pub fn insert(&mut self, pos: usize, value: T) -> Result<usize> {
        assert!(
            pos <= self.len,
            "insertion index (is {pos}) should be <= len (is {})",
            self.len
        );
        if self.len == self.cap {
            self.grow(1)?;
        }
        // SAFETY: there is one free slot past the tail; `copy` handles overlap.
        unsafe {
            let p = self.ptr.as_ptr().add(pos);
            ptr::copy(p, p.add(1), self.len - pos);
            p.write(value);
        }
        self.len += 1;
        Ok(pos)
    }

    /// Inserts `n` clones of `value` before `pos`. Returns `pos`.
    ///
    /// If a clone panics, the clones made so far are dropped and the array
    /// is restored to its previous contents before the panic continues.
    pub fn insert_n(&mut self, pos: usize, n: usize, value: &T) -> Result<usize>
    where
        T: Clone,
    {
        assert!(
            pos <= self.len,
            "insertion index (is {pos}) should be <= len (is {})",
            self.len
        );
        if n == 0 {
            return Ok(pos);
        }
        self.grow(n)?;
        let mut gap = Gap::open(self, pos, n);
        while gap.filled < gap.size {
            gap.write(value.clone());
        }
        gap.commit();
        Ok(pos)
    }

    /// Inserts every item of `iter` before `pos`, in order. Returns `pos`.
    ///
    /// Items are appended and then rotated into place. If the iterator
    /// panics or a growth fails, the appended items are dropped and the
    /// array keeps its previous contents.
    pub fn insert_range<I>(&mut self, pos: usize, iter: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        assert!(
            pos <= self.len,
            "insertion index (is {pos}) should be <= len (is {})",
            self.len
        );
        let iter = iter.into_iter();
        let old_len = self.len;
        let (lower, _) = iter.size_hint();
        self.grow(lower)?;

        let mut staged = Rollback {
            array: self,
            len: old_len,
            armed: true,
        };
        for value in iter {
            staged.array.push_back(value)?;
        }
        staged.armed = false;
        drop(staged);

        self.as_mut_slice()[pos..].rotate_left(old_len - pos);
        Ok(pos)
    }

    /// Removes and returns the element at `pos`, shifting the tail left.
    ///
    /// # Panics
    ///
    /// If `pos >= len`.
    pub fn remove(&mut self, pos: usize) -> T {
        assert!(
            pos < self.len,
            "removal index (is {pos}) should be < len (is {})",
            self.len
        );
        // SAFETY: `pos` is live; the tail is moved over it before `len` shrinks.
        unsafe {
            let p = self.ptr.as_ptr().add(pos);
            let value = p.read();
            ptr::copy(p.add(1), p, self.len - pos - 1);
            self.len -= 1;
            value
        }
    }

    /// Drops the element at `pos`. Returns the position of the element that
    /// now occupies that slot (`len` if it was the last one).
    pub fn erase(&mut self, pos: usize) -> usize {
        drop(self.remove(pos));
        pos
    }

    /// Drops the elements in `range` and closes the gap. Returns
    /// `range.start`.
    pub fn erase_range(&mut self, range: Range<usize>) -> usize {
        let Range { start, end } = range;
        assert!(
            start <= end && end <= self.len,
            "erase range {start}..{end} out of bounds for len {}",
            self.len
        );
        if start == end {
            return start;
        }
        let base = self.ptr.as_ptr();
        let tail = self.len - end;
        self.len = start;
        let _close = CloseOnDrop {
            base,
            from: end,
            to: start,
            tail,
            len: &mut self.len,
        };
        // SAFETY: [start, end) is live and no longer counted by `len`; the
        // guard moves the tail down even if a destructor panics.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
        }
        start
    }

    /// Keeps the first `n` elements and drops the rest.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len {
            return;
        }
        let tail = self.len - n;
        self.len = n;
        // SAFETY: the dropped slots are no longer counted by `len`.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(n),
                tail,
            ));
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Shrinks to `n` elements or grows by cloning `value` into the new
    /// trailing slots.
    pub fn resize(&mut self, n: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        if n <= self.len {
            self.truncate(n);
            return Ok(());
        }
        self.insert_n(self.len, n - self.len, &value).map(drop)
    }

    /// Replaces the contents with `n` clones of `value`.
    pub fn assign_fill(&mut self, n: usize, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.clear();
        self.insert_n(0, n, value).map(drop)
    }

    /// Replaces the contents with the items of `iter`.
    pub fn assign<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.try_extend(iter)
    }

    /// Appends every item of `iter`; on failure the array is left as it was.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_range(self.len, iter).map(drop)
    }

    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let mut out = Self::with_capacity_in(self.len, self.alloc.clone())?;
        // A panicking clone unwinds through `out`, which drops what was
        // built so far and frees its buffer. `self` is never touched.
        for item in self.iter() {
            // SAFETY: capacity is exactly `self.len`.
            unsafe { out.push_unchecked(item.clone()) };
        }
        Ok(out)
    }

    // =========================================================================
    // Cursors
    // =========================================================================

    pub fn begin(&self) -> ArrayCursor<'_, T> {
        ArrayCursor::new(self.as_slice(), 0)
    }

    pub fn end(&self) -> ArrayCursor<'_, T> {
        ArrayCursor::new(self.as_slice(), self.len)
    }

    pub fn rbegin(&self) -> Reverse<ArrayCursor<'_, T>> {
        Reverse::new(self.end())
    }

    pub fn rend(&self) -> Reverse<ArrayCursor<'_, T>> {
        Reverse::new(self.begin())
    }
}

/// A hole of `size` uninitialized slots at `pos`, with the old tail parked
/// right after it.
///
/// `commit` closes whatever part of the hole was not written. Dropping the
/// guard without committing (a panicking clone) drops the written prefix
/// and moves the tail back, which restores the original contents.
struct Gap<'a, T, A: RawAlloc> {
    array: &'a mut DynArray<T, A>,
    pos: usize,
    size: usize,
    filled: usize,
    tail: usize,
}

impl<'a, T, A: RawAlloc> Gap<'a, T, A> {
    fn open(array: &'a mut DynArray<T, A>, pos: usize, size: usize) -> Self {
        debug_assert!(array.cap - array.len >= size);
        let tail = array.len - pos;
        // SAFETY: capacity covers `len + size`; `copy` handles overlap.
        unsafe {
            let p = array.ptr.as_ptr().add(pos);
            ptr::copy(p, p.add(size), tail);
        }
        array.len = pos;
        Self {
            array,
            pos,
            size,
            filled: 0,
            tail,
        }
    }

    fn write(&mut self, value: T) {
        debug_assert!(self.filled < self.size);
        // SAFETY: the slot lies inside the hole.
        unsafe {
            self.array
                .ptr
                .as_ptr()
                .add(self.pos + self.filled)
                .write(value)
        };
        self.filled += 1;
    }

    fn close(&mut self) {
        // SAFETY: moves the parked tail right after the written prefix.
        unsafe {
            let base = self.array.ptr.as_ptr();
            ptr::copy(
                base.add(self.pos + self.size),
                base.add(self.pos + self.filled),
                self.tail,
            );
        }
        self.array.len = self.pos + self.filled + self.tail;
    }

    fn commit(mut self) {
        self.close();
        mem::forget(self);
    }
}

impl<T, A: RawAlloc> Drop for Gap<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: exactly `filled` slots were written at `pos`.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.array.ptr.as_ptr().add(self.pos),
                self.filled,
            ));
        }
        self.filled = 0;
        self.close();
    }
}

/// Truncates back to `len` unless disarmed.
struct Rollback<'a, T, A: RawAlloc> {
    array: &'a mut DynArray<T, A>,
    len: usize,
    armed: bool,
}

impl<T, A: RawAlloc> Drop for Rollback<'_, T, A> {
    fn drop(&mut self) {
        if self.armed {
            self.array.truncate(self.len);
        }
    }
}

struct CloseOnDrop<'a, T> {
    base: *mut T,
    from: usize,
    to: usize,
    tail: usize,
    len: &'a mut usize,
}

impl<T> Drop for CloseOnDrop<'_, T> {
    fn drop(&mut self) {
        // SAFETY: [from, from + tail) is the live tail; [to, from) is dead.
        unsafe { ptr::copy(self.base.add(self.from), self.base.add(self.to), self.tail) };
        *self.len = self.to + self.tail;
    }
}

impl<T, A: RawAlloc> Drop for DynArray<T, A> {
    fn drop(&mut self) {
        // SAFETY: drops the live range, then frees the buffer it lived in.
        unsafe {
            ptr::drop_in_place(self.as_mut_slice());
            self.deallocate(self.ptr, self.cap);
        }
    }
}

impl<T, A: RawAlloc> Deref for DynArray<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: RawAlloc> DerefMut for DynArray<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: RawAlloc + Clone> Clone for DynArray<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| e.raise())
    }
}

impl<T: fmt::Debug, A: RawAlloc> fmt::Debug for DynArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: RawAlloc> Extend<T> for DynArray<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(e) = self.try_extend(iter) {
            e.raise();
        }
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a DynArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, A: RawAlloc, B: RawAlloc> PartialEq<DynArray<T, B>> for DynArray<T, A> {
    fn eq(&self, other: &DynArray<T, B>) -> bool {
        self.len() == other.len() && algo::equal(self.iter(), other.iter())
    }
}

impl<T: Eq, A: RawAlloc> Eq for DynArray<T, A> {}

impl<T: PartialOrd, A: RawAlloc> PartialOrd for DynArray<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        algo::lexicographical_partial_cmp(self.iter(), other.iter())
    }
}

impl<T: Ord, A: RawAlloc> Ord for DynArray<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        algo::lexicographical_cmp(self.iter(), other.iter())
    }
}
