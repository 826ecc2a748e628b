//! System allocator implementation
//!
//! Wraps the platform's default allocator. This is what every container
//! uses when no allocator is supplied.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::Allocator;
use crate::error::{MemoryError, MemoryResult};

/// Wrapper for the system's default allocator
///
/// Zero-sized and `Copy`, so embedding it in a container costs nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new SystemAllocator
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }

}

// SAFETY: every block comes from `System` with the caller's layout and is
// returned to `System` with the same layout.
unsafe impl Allocator for SystemAllocator {
    #[inline]
    fn allocate(&self, layout: Layout) -> MemoryResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            // Zero-sized requests get a dangling pointer at the right alignment
            let ptr = NonNull::new(core::ptr::without_provenance_mut::<u8>(layout.align()))
                .ok_or_else(|| MemoryError::allocation_failed_with_layout(layout))?;
            return Ok(NonNull::slice_from_raw_parts(ptr, 0));
        }

        // SAFETY: `layout` has a non-zero size (checked above).
        let ptr = unsafe { System.alloc(layout) };

        NonNull::new(ptr)
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, layout.size()))
            .ok_or_else(|| MemoryError::allocation_failed_with_layout(layout))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        // SAFETY: `ptr` came from `System.alloc` with `layout` (caller contract).
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }

    // Platform realloc can often extend in place
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> MemoryResult<NonNull<[u8]>> {
        if old_layout.size() == 0 {
            return self.allocate(new_layout);
        }
        if new_layout.size() == 0 {
            // SAFETY: forwarded caller contract.
            unsafe { self.deallocate(ptr, old_layout) };
            return self.allocate(new_layout);
        }
        debug_assert_eq!(old_layout.align(), new_layout.align());

        // SAFETY: `ptr` came from `System` with `old_layout`, both sizes are
        // non-zero and the alignment is unchanged (caller contract).
        let new_ptr = unsafe { System.realloc(ptr.as_ptr(), old_layout, new_layout.size()) };

        NonNull::new(new_ptr)
            .map(|ptr| NonNull::slice_from_raw_parts(ptr, new_layout.size()))
            .ok_or_else(|| MemoryError::allocation_failed_with_layout(new_layout))
    }
}
