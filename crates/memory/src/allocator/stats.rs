//! Allocator statistics tracking

use core::cell::Cell;

/// Statistics for memory allocators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Total bytes currently allocated
    pub allocated_bytes: usize,
    /// Peak bytes allocated
    pub peak_allocated_bytes: usize,
    /// Total number of allocations
    pub allocation_count: usize,
    /// Total number of deallocations
    pub deallocation_count: usize,
    /// Total number of reallocations
    pub reallocation_count: usize,
    /// Number of failed allocations
    pub failed_allocations: usize,
    /// Total bytes ever allocated (cumulative)
    pub total_bytes_allocated: usize,
}

impl AllocatorStats {
    /// Creates a new empty stats object
    pub const fn new() -> Self {
        Self {
            allocated_bytes: 0,
            peak_allocated_bytes: 0,
            allocation_count: 0,
            deallocation_count: 0,
            reallocation_count: 0,
            failed_allocations: 0,
            total_bytes_allocated: 0,
        }
    }

    /// Allocations not yet matched by a deallocation
    pub fn live_allocations(&self) -> usize {
        self.allocation_count.saturating_sub(self.deallocation_count)
    }
}

/// Single-threaded counters behind [`AllocatorStats`]
#[derive(Debug, Default)]
pub(crate) struct StatsCell {
    inner: Cell<AllocatorStats>,
}

impl StatsCell {
    pub(crate) const fn new() -> Self {
        Self {
            inner: Cell::new(AllocatorStats::new()),
        }
    }

    pub(crate) fn snapshot(&self) -> AllocatorStats {
        self.inner.get()
    }

    pub(crate) fn reset(&self) {
        self.inner.set(AllocatorStats::new());
    }

    fn update(&self, f: impl FnOnce(&mut AllocatorStats)) {
        let mut stats = self.inner.get();
        f(&mut stats);
        self.inner.set(stats);
    }

    pub(crate) fn record_allocation(&self, size: usize) {
        self.update(|s| {
            s.allocation_count += 1;
            s.total_bytes_allocated = s.total_bytes_allocated.saturating_add(size);
            s.allocated_bytes = s.allocated_bytes.saturating_add(size);
            s.peak_allocated_bytes = s.peak_allocated_bytes.max(s.allocated_bytes);
        });
    }

    pub(crate) fn record_deallocation(&self, size: usize) {
        self.update(|s| {
            s.deallocation_count += 1;
            s.allocated_bytes = s.allocated_bytes.saturating_sub(size);
        });
    }

    pub(crate) fn record_reallocation(&self, old_size: usize, new_size: usize) {
        self.update(|s| {
            s.reallocation_count += 1;
            s.allocated_bytes = s.allocated_bytes.saturating_sub(old_size).saturating_add(new_size);
            s.peak_allocated_bytes = s.peak_allocated_bytes.max(s.allocated_bytes);
            if new_size > old_size {
                s.total_bytes_allocated = s.total_bytes_allocated.saturating_add(new_size - old_size);
            }
        });
    }

    pub(crate) fn record_allocation_failure(&self) {
        self.update(|s| s.failed_allocations += 1);
    }
}
