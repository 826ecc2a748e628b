//! The allocator capability
//!
//! [`Allocator`] is the single substitution point for heap memory. The
//! fallible primitives (`allocate`, `reallocate`) report failure through
//! [`MemoryResult`]; the `*_raw` wrappers that containers use treat failure
//! as unrecoverable and abort the process.
//!
//! # Safety
//!
//! Implementors promise that:
//! - returned blocks are valid for reads and writes of the requested size,
//!   aligned to the requested alignment, and not aliased by any other live
//!   block
//! - `deallocate` and `reallocate` accept exactly the blocks this allocator
//!   handed out, together with the layout they were requested with
//!
//! Callers promise never to free a block twice or free a block obtained from
//! a different allocator. Neither condition is checked.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::{MemoryError, MemoryResult};

#[cfg(feature = "logging")]
use tracing::error;

/// Raw memory capability: allocate, reallocate and free untyped blocks
pub unsafe trait Allocator {
    /// Allocates a block described by `layout`
    ///
    /// The contents are uninitialized.
    ///
    /// # Errors
    /// Returns [`MemoryError::AllocationFailed`] if the block cannot be
    /// obtained.
    fn allocate(&self, layout: Layout) -> MemoryResult<NonNull<[u8]>>;

    /// Returns a block to the allocator
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator with `layout`
    /// - `ptr` must not be used afterwards; freeing twice is undefined
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Resizes a block, preserving the first `min(old, new)` bytes
    ///
    /// The default implementation allocates a new block, copies, and frees
    /// the old block.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator with `old_layout`
    /// - `new_layout` must have the same alignment as `old_layout`
    /// - on success the old pointer is invalid; on failure it stays valid
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> MemoryResult<NonNull<[u8]>> {
        let new_ptr = self.allocate(new_layout)?;

        let copy_size = old_layout.size().min(new_layout.size());
        // SAFETY: `ptr` is valid for `old_layout.size()` bytes (caller
        // contract) and `new_ptr` for `new_layout.size()` bytes (just
        // allocated); distinct live blocks never overlap.
        unsafe {
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.cast::<u8>().as_ptr(), copy_size);
        }

        // SAFETY: `ptr` came from this allocator with `old_layout` and its
        // contents now live in `new_ptr`.
        unsafe { self.deallocate(ptr, old_layout) };
        Ok(new_ptr)
    }

    /// Allocates a block or terminates the process
    fn allocate_raw(&self, layout: Layout) -> NonNull<u8> {
        match self.allocate(layout) {
            Ok(ptr) => ptr.cast(),
            Err(err) => allocation_abort(layout, &err),
        }
    }

    /// Resizes a block or terminates the process
    ///
    /// # Safety
    /// Same contract as [`Allocator::reallocate`].
    unsafe fn reallocate_raw(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> NonNull<u8> {
        // SAFETY: forwarded caller contract.
        match unsafe { self.reallocate(ptr, old_layout, new_layout) } {
            Ok(ptr) => ptr.cast(),
            Err(err) => allocation_abort(new_layout, &err),
        }
    }

    /// Frees a block obtained from [`Allocator::allocate_raw`]
    ///
    /// # Safety
    /// Same contract as [`Allocator::deallocate`].
    unsafe fn free_raw(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { self.deallocate(ptr, layout) }
    }
}

#[cold]
fn allocation_abort(layout: Layout, err: &MemoryError) -> ! {
    #[cfg(feature = "logging")]
    error!(size = layout.size(), align = layout.align(), %err, "heap exhausted, aborting");
    #[cfg(not(feature = "logging"))]
    let _ = err;

    std::alloc::handle_alloc_error(layout)
}

// SAFETY: forwards every call to `A`, so `A`'s guarantees carry over.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> MemoryResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> MemoryResult<NonNull<[u8]>> {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).reallocate(ptr, old_layout, new_layout) }
    }
}
