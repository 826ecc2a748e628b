//! Tracked allocator implementation
//!
//! Wraps another allocator and records what passes through it. Containers
//! take the tracker by reference (`&TrackedAllocator<_>` is itself an
//! allocator), so one tracker can watch several buffers and boxes.
//!
//! ## Invariants
//!
//! - Every successful allocation is counted once
//! - Every deallocation adjusts the counters to match
//! - Failed allocations only bump the failure count
//! - A successful reallocation is one reallocation, not a free plus an alloc

use core::alloc::Layout;
use core::ptr::NonNull;

use super::stats::{AllocatorStats, StatsCell};
use super::Allocator;
use crate::error::MemoryResult;

/// A wrapper allocator that tracks memory usage statistics
///
/// Counters live in a `Cell`, so the tracker is `!Sync` like everything
/// else in this crate.
#[derive(Debug, Default)]
pub struct TrackedAllocator<A> {
    inner: A,
    stats: StatsCell,
}

impl<A> TrackedAllocator<A> {
    /// Creates a new TrackedAllocator wrapping the provided allocator
    pub const fn new(allocator: A) -> Self {
        Self {
            inner: allocator,
            stats: StatsCell::new(),
        }
    }

    /// Gets a reference to the underlying allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Consumes the tracker and returns the underlying allocator
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Returns the total bytes currently allocated
    pub fn allocated_bytes(&self) -> usize {
        self.stats.snapshot().allocated_bytes
    }

    /// Returns the total number of allocations performed
    pub fn allocation_count(&self) -> usize {
        self.stats.snapshot().allocation_count
    }

    /// Returns the total number of deallocations performed
    pub fn deallocation_count(&self) -> usize {
        self.stats.snapshot().deallocation_count
    }

    /// Returns the total number of reallocations performed
    pub fn reallocation_count(&self) -> usize {
        self.stats.snapshot().reallocation_count
    }

    /// Reset statistics while keeping current allocations
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Get detailed statistics snapshot
    pub fn stats(&self) -> AllocatorStats {
        self.stats.snapshot()
    }

    /// Check if there are any memory leaks (allocations > deallocations)
    pub fn has_leaks(&self) -> bool {
        self.potential_leaks() > 0
    }

    /// Get the number of potentially leaked allocations
    pub fn potential_leaks(&self) -> usize {
        self.stats.snapshot().live_allocations()
    }
}

// SAFETY: TrackedAllocator forwards every operation to `A` unchanged; the
// bookkeeping has no effect on the memory handed out.
unsafe impl<A: Allocator> Allocator for TrackedAllocator<A> {
    fn allocate(&self, layout: Layout) -> MemoryResult<NonNull<[u8]>> {
        match self.inner.allocate(layout) {
            Ok(ptr) => {
                self.stats.record_allocation(layout.size());
                Ok(ptr)
            }
            Err(err) => {
                self.stats.record_allocation_failure();
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract; the block came from `self.inner`.
        unsafe { self.inner.deallocate(ptr, layout) };
        self.stats.record_deallocation(layout.size());
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> MemoryResult<NonNull<[u8]>> {
        // SAFETY: forwarded caller contract; the block came from `self.inner`.
        match unsafe { self.inner.reallocate(ptr, old_layout, new_layout) } {
            Ok(new_ptr) => {
                self.stats
                    .record_reallocation(old_layout.size(), new_layout.size());
                Ok(new_ptr)
            }
            Err(err) => {
                self.stats.record_allocation_failure();
                Err(err)
            }
        }
    }
}
