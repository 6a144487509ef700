//! Allocator injection point.
//!
//! Containers take a [`RawAlloc`] at construction and route every buffer
//! request through it. [`Global`] forwards to the process allocator.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::error::{Error, Result};

/// A caller-supplied memory source.
///
/// # Safety
///
/// `allocate` must return a block valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, which stays valid
/// until it is passed back to `deallocate` with the same layout.
/// Containers never request zero-sized layouts.
pub unsafe trait RawAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>>;

    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with `layout`.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Largest block, in bytes, this allocator will ever hand out.
    #[inline]
    fn max_bytes(&self) -> usize {
        isize::MAX as usize
    }
}

/// The process-wide allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        debug_assert_ne!(layout.size(), 0);
        // SAFETY: layout is non-zero-sized.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| Error::alloc_failed(layout))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }

    #[inline]
    fn max_bytes(&self) -> usize {
        (**self).max_bytes()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Budget;
    use super::*;

    #[test]
    fn test_global_roundtrip() {
        let layout = Layout::array::<u64>(4).unwrap();
        let ptr = Global.allocate(layout).unwrap();
        unsafe {
            ptr.as_ptr().cast::<u64>().write(7);
            assert_eq!(ptr.as_ptr().cast::<u64>().read(), 7);
            Global.deallocate(ptr, layout);
        }
    }

    #[test]
    fn test_budget_refuses() {
        let budget = Budget::new(1);
        let layout = Layout::new::<u32>();
        let ptr = (&budget).allocate(layout).unwrap();
        assert_eq!(budget.live(), 1);
        assert_eq!(
            budget.allocate(layout),
            Err(Error::AllocFailed { size: 4, align: 4 })
        );
        unsafe { budget.deallocate(ptr, layout) };
        assert_eq!(budget.live(), 0);
    }
}
