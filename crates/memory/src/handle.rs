//! Bounded handle: a typed pointer that knows the window it may address
//!
//! A [`BoundedHandle`] owns one allocation of `len` element slots. It carries
//! a cursor inside that window; offsets passed to [`BoundedHandle::index`] are
//! relative to the cursor, but validity is decided by the window alone:
//! an address is valid when it lies in `[min, max]`, where `max` is one past
//! the last slot.
//!
//! The handle never knows which slots are initialized. Dropping it releases
//! the allocation without running any element destructors.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

#[cfg(feature = "logging")]
use tracing::trace;

use crate::allocator::{Allocator, SystemAllocator};
use crate::bounds::{bounds_check, capacity_overflow};
use crate::error::{MemoryError, MemoryResult};

/// Typed pointer plus the element window it may address, plus the allocator
/// that owns the backing memory
pub struct BoundedHandle<T, A: Allocator = SystemAllocator> {
    base: NonNull<T>,
    len: usize,
    cursor: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T> BoundedHandle<T> {
    /// Allocates `count` slots from the system allocator
    pub fn new(count: usize) -> Self {
        Self::allocate(SystemAllocator, count)
    }
}

impl<T, A: Allocator> BoundedHandle<T, A> {
    /// Obtains room for `count` elements; the window is exactly
    /// `[base, base + count)` and the cursor starts at `base`.
    ///
    /// Aborts the process if the allocator cannot supply the memory and
    /// panics if `count` elements do not fit in the address space.
    pub fn allocate(alloc: A, count: usize) -> Self {
        let layout = layout_or_fault::<T>(count);
        let base = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            alloc.allocate_raw(layout).cast()
        };
        Self {
            base,
            len: count,
            cursor: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Fallible form of [`BoundedHandle::allocate`]
    pub fn try_allocate(alloc: A, count: usize) -> MemoryResult<Self> {
        let layout = array_layout::<T>(count)?;
        let base = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            alloc.allocate(layout)?.cast()
        };
        Ok(Self {
            base,
            len: count,
            cursor: 0,
            alloc,
            _marker: PhantomData,
        })
    }

    /// Rebuilds a handle from parts produced by [`BoundedHandle::into_raw_parts`]
    ///
    /// # Safety
    /// `base` must have been allocated by `alloc` for exactly `len` elements
    /// of `T` (or be dangling with `len * size_of::<T>() == 0`), and must not
    /// be owned by anything else.
    pub unsafe fn from_raw_parts(base: NonNull<T>, len: usize, alloc: A) -> Self {
        Self {
            base,
            len,
            cursor: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Splits the handle into base pointer, window length and allocator
    /// without releasing the allocation
    pub fn into_raw_parts(self) -> (NonNull<T>, usize, A) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the allocator is moved out
        // exactly once.
        let alloc = unsafe { ptr::read(&this.alloc) };
        (this.base, this.len, alloc)
    }

    /// Window size in elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cursor position inside the window, `0..=len`
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// First address of the window
    #[inline]
    pub fn min(&self) -> NonNull<T> {
        self.base
    }

    /// One past the last address of the window
    #[inline]
    pub fn max(&self) -> NonNull<T> {
        // SAFETY: one past the end of the allocation is in bounds for `add`.
        unsafe { self.base.add(self.len) }
    }

    /// Base pointer of the window
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.base.as_ptr()
    }

    /// The allocator that owns the backing memory
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    fn resolve(&self, offset: isize) -> Option<usize> {
        self.cursor
            .checked_add_signed(offset)
            .filter(|&target| target <= self.len)
    }

    /// Moves the cursor to `position`; faults unless `position <= len`
    #[track_caller]
    pub fn seek(&mut self, position: usize) {
        bounds_check!(
            position <= self.len,
            "cursor {position} outside window [0, {}]",
            self.len
        );
        self.cursor = position;
    }

    /// Address `offset` slots away from the cursor
    ///
    /// Faults unless the address lies in `[min, max]`. With the
    /// `release-unsafe` build mode the check is compiled out and an
    /// out-of-window offset is undefined behavior.
    #[inline]
    #[track_caller]
    pub fn index(&self, offset: isize) -> NonNull<T> {
        bounds_check!(
            self.resolve(offset).is_some(),
            "offset {offset} from cursor {} outside window [0, {}]",
            self.cursor,
            self.len
        );
        // SAFETY: the target lies inside the allocation or one past it
        // (checked above, or asserted by the release-unsafe build mode).
        unsafe { self.base.offset((self.cursor as isize).wrapping_add(offset)) }
    }

    /// Read-only form of [`BoundedHandle::index`]
    #[inline]
    #[track_caller]
    pub fn const_index(&self, offset: isize) -> *const T {
        self.index(offset).as_ptr().cast_const()
    }

    /// Like [`BoundedHandle::index`] but reports an out-of-window offset as
    /// `None` in every build mode
    #[inline]
    pub fn get(&self, offset: isize) -> Option<NonNull<T>> {
        let target = self.resolve(offset)?;
        // SAFETY: `target <= len`, so the address is inside the allocation or
        // one past it.
        Some(unsafe { self.base.add(target) })
    }

    /// Resizes the window to `new_count` slots, preserving the first
    /// `min(len, new_count)` elements
    ///
    /// The base address may change; pointers obtained earlier are stale.
    /// The cursor is clamped to the new window. Aborts if the allocator
    /// cannot supply the memory.
    pub fn reallocate(&mut self, new_count: usize) {
        let old_layout = self.layout();
        let new_layout = layout_or_fault::<T>(new_count);

        let base = match (old_layout.size(), new_layout.size()) {
            (0, 0) => NonNull::dangling(),
            (_, 0) => {
                // SAFETY: the block was allocated by `self.alloc` with `old_layout`.
                unsafe { self.alloc.free_raw(self.base.cast(), old_layout) };
                NonNull::dangling()
            }
            (0, _) => self.alloc.allocate_raw(new_layout).cast(),
            _ => {
                // SAFETY: the block was allocated by `self.alloc` with
                // `old_layout`; both layouts share `T`'s alignment.
                unsafe { self.alloc.reallocate_raw(self.base.cast(), old_layout, new_layout) }
                    .cast()
            }
        };

        #[cfg(feature = "logging")]
        trace!(from = self.len, to = new_count, "bounded handle reallocated");

        self.base = base;
        self.len = new_count;
        self.cursor = self.cursor.min(new_count);
    }

    /// Fallible form of [`BoundedHandle::reallocate`]; on error the handle is
    /// left untouched
    pub fn try_reallocate(&mut self, new_count: usize) -> MemoryResult<()> {
        let old_layout = self.layout();
        let new_layout = array_layout::<T>(new_count)?;

        let base = match (old_layout.size(), new_layout.size()) {
            (0, 0) => NonNull::dangling(),
            (_, 0) => {
                // SAFETY: the block was allocated by `self.alloc` with `old_layout`.
                unsafe { self.alloc.deallocate(self.base.cast(), old_layout) };
                NonNull::dangling()
            }
            (0, _) => self.alloc.allocate(new_layout)?.cast(),
            _ => {
                // SAFETY: the block was allocated by `self.alloc` with
                // `old_layout`; both layouts share `T`'s alignment.
                unsafe { self.alloc.reallocate(self.base.cast(), old_layout, new_layout) }?
                    .cast()
            }
        };

        self.base = base;
        self.len = new_count;
        self.cursor = self.cursor.min(new_count);
        Ok(())
    }

    /// Releases the allocation through the owning allocator
    ///
    /// Consuming `self` makes a second free a compile error.
    pub fn free(self) {
        drop(self);
    }

    /// Layout of the whole window's allocation
    pub(crate) fn layout(&self) -> Layout {
        // SAFETY: the same size and alignment passed `Layout::array` when
        // the window was created.
        unsafe {
            Layout::from_size_align_unchecked(size_of::<T>() * self.len, align_of::<T>())
        }
    }
}

impl<T, A: Allocator> Drop for BoundedHandle<T, A> {
    fn drop(&mut self) {
        let layout = self.layout();
        if layout.size() != 0 {
            // SAFETY: the block was allocated by `self.alloc` with `layout` and
            // this is the only owner.
            unsafe { self.alloc.free_raw(self.base.cast(), layout) };
        }
    }
}

impl<T, A: Allocator + fmt::Debug> fmt::Debug for BoundedHandle<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedHandle")
            .field("base", &self.base)
            .field("len", &self.len)
            .field("cursor", &self.cursor)
            .field("alloc", &self.alloc)
            .finish()
    }
}

/// Byte count overflowing `usize` is a size overflow; a byte count that fits
/// but exceeds `isize::MAX` is an invalid layout
fn array_layout<T>(count: usize) -> MemoryResult<Layout> {
    let name = core::any::type_name::<T>();
    let Some(size) = size_of::<T>().checked_mul(count) else {
        return Err(MemoryError::size_overflow(&format!("layout of {count} x {name}")));
    };
    Layout::array::<T>(count).map_err(|_| {
        MemoryError::invalid_layout(&format!("{size} bytes for {count} x {name} exceed isize::MAX"))
    })
}

#[track_caller]
fn layout_or_fault<T>(count: usize) -> Layout {
    match array_layout::<T>(count) {
        Ok(layout) => layout,
        Err(err) => capacity_overflow(format_args!("{err}")),
    }
}
