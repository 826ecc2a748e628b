//! Reference-counted box
//!
//! [`RcBox`] shares one value behind a strong count. A box made by
//! [`RcBox::new_in`] keeps count and value in a single block obtained from
//! an [`Allocator`]. A box made by [`RcBox::wrap`] adopts the value where a
//! [`BoundedHandle`] already holds it and keeps only the count in a block of
//! its own. Cloning shares the value and bumps the count; dropping a clone
//! decrements it, and the last drop runs the value's destructor and frees
//! every block through the same allocator.
//!
//! The count lives in a `Cell`, so boxes are neither `Send` nor `Sync`.

use core::alloc::Layout;
use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ops::Deref;
use core::ptr::{self, NonNull};

#[cfg(feature = "logging")]
use tracing::{error, trace};

use crate::allocator::{Allocator, SystemAllocator};
use crate::handle::BoundedHandle;

struct RcHeader {
    strong: Cell<u64>,
    /// Handle allocation holding the value, when the value was adopted
    adopted: Option<(NonNull<u8>, Layout)>,
}

#[repr(C)]
struct RcInner<T> {
    header: RcHeader,
    value: T,
}

/// Shared ownership of a heap value with a non-atomic count
///
/// Associated functions (`RcBox::strong_count(&b)`) are used instead of
/// methods so they never shadow methods of `T` reached through `Deref`.
pub struct RcBox<T, A: Allocator = SystemAllocator> {
    header: NonNull<RcHeader>,
    value: NonNull<T>,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T> RcBox<T> {
    /// Boxes `value` with the system allocator; the count starts at 1
    pub fn new(value: T) -> Self {
        Self::new_in(value, SystemAllocator)
    }
}

impl<T, A: Allocator> RcBox<T, A> {
    /// Boxes `value` in a fresh block from `alloc`; the count starts at 1
    pub fn new_in(value: T, alloc: A) -> Self {
        let inner = alloc.allocate_raw(Layout::new::<RcInner<T>>()).cast::<RcInner<T>>();
        // SAFETY: the block is freshly allocated with `RcInner<T>`'s layout
        // and nothing else refers to it.
        let value = unsafe {
            inner.write(RcInner {
                header: RcHeader {
                    strong: Cell::new(1),
                    adopted: None,
                },
                value,
            });
            NonNull::from(&mut (*inner.as_ptr()).value)
        };
        Self {
            header: inner.cast(),
            value,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Adopts the value at the handle's cursor in place; the count starts
    /// at 1
    ///
    /// The handle's allocation becomes the box's storage and is freed with
    /// the last box. Only the count gets a new block.
    ///
    /// # Safety
    /// The slot at the handle's cursor must be inside the window and hold an
    /// initialized `T`. Ownership of that value moves into the box; no other
    /// slot of the handle is dropped.
    pub unsafe fn wrap(handle: BoundedHandle<T, A>) -> Self {
        let value = handle.index(0);
        let layout = handle.layout();
        let (base, _, alloc) = handle.into_raw_parts();

        let header = alloc.allocate_raw(Layout::new::<RcHeader>()).cast::<RcHeader>();
        // SAFETY: the block is freshly allocated with `RcHeader`'s layout.
        unsafe {
            header.write(RcHeader {
                strong: Cell::new(1),
                adopted: Some((base.cast(), layout)),
            });
        }
        Self {
            header,
            value,
            alloc,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn header(&self) -> &RcHeader {
        // SAFETY: the header stays alive while any box points at it.
        unsafe { self.header.as_ref() }
    }

    /// Number of boxes sharing this value
    #[inline]
    pub fn strong_count(this: &Self) -> u64 {
        this.header().strong.get()
    }

    /// Whether both boxes share one value
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.header == other.header
    }

    /// Mutable access, only while this is the sole box
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        if Self::strong_count(this) == 1 {
            // SAFETY: no other box exists, so this borrow is unique.
            Some(unsafe { this.value.as_mut() })
        } else {
            None
        }
    }

    /// Takes the value out if this is the sole box
    pub fn try_unwrap(this: Self) -> Result<T, Self> {
        if Self::strong_count(&this) != 1 {
            return Err(this);
        }
        let this = ManuallyDrop::new(this);
        // SAFETY: sole owner; the value and the allocator are moved out once
        // and the blocks are freed without dropping the value again.
        unsafe {
            let value = this.value.read();
            let alloc = ptr::read(&this.alloc);
            Self::free_blocks(this.header, &alloc);
            Ok(value)
        }
    }

    /// Drops this box and reports whether it was the last one, i.e. whether
    /// the value was destroyed and its storage freed
    pub fn release(this: Self) -> bool {
        let last = Self::strong_count(&this) == 1;
        drop(this);
        last
    }

    /// # Safety
    /// The count reached zero or the last box is being consumed, and the
    /// value has already been dropped or moved out.
    unsafe fn free_blocks(header: NonNull<RcHeader>, alloc: &A) {
        // SAFETY: the header is still live until freed below.
        let adopted = unsafe { header.as_ref().adopted };
        // SAFETY: each block came from `alloc` with the layout it is freed
        // with; an unadopted header is the head of an `RcInner<T>`.
        unsafe {
            match adopted {
                Some((block, layout)) => {
                    if layout.size() != 0 {
                        alloc.free_raw(block, layout);
                    }
                    alloc.free_raw(header.cast(), Layout::new::<RcHeader>());
                }
                None => alloc.free_raw(header.cast(), Layout::new::<RcInner<T>>()),
            }
        }
    }
}

impl<T, A: Allocator + Clone> Clone for RcBox<T, A> {
    fn clone(&self) -> Self {
        let strong = &self.header().strong;
        let Some(count) = strong.get().checked_add(1) else {
            #[cfg(feature = "logging")]
            error!("reference count overflow, aborting");
            std::process::abort();
        };
        strong.set(count);
        Self {
            header: self.header,
            value: self.value,
            alloc: self.alloc.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, A: Allocator> Drop for RcBox<T, A> {
    fn drop(&mut self) {
        let strong = &self.header().strong;
        let count = strong.get() - 1;
        strong.set(count);
        if count != 0 {
            return;
        }

        #[cfg(feature = "logging")]
        trace!(value = core::any::type_name::<T>(), "last reference released");

        // SAFETY: the count reached zero, so no other box can observe the
        // value; it is dropped once and then its storage is released.
        unsafe {
            ptr::drop_in_place(self.value.as_ptr());
            Self::free_blocks(self.header, &self.alloc);
        }
    }
}

impl<T, A: Allocator> Deref for RcBox<T, A> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the value lives until the last box is dropped.
        unsafe { self.value.as_ref() }
    }
}

impl<T, A: Allocator> AsRef<T> for RcBox<T, A> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: PartialEq, A: Allocator> PartialEq for RcBox<T, A> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for RcBox<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Display, A: Allocator> fmt::Display for RcBox<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::allocator::TrackedAllocator;

    #[test]
    fn clone_shares_block() {
        let first = RcBox::new(String::from("keel"));
        let second = first.clone();
        assert!(RcBox::ptr_eq(&first, &second));
        assert_eq!(RcBox::strong_count(&first), 2);
        assert_eq!(second.len(), 4);
        drop(second);
        assert_eq!(RcBox::strong_count(&first), 1);
    }

    #[test]
    fn freed_once_after_last_release() {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let witness = Rc::new(());

        let first = RcBox::new_in(Rc::clone(&witness), &tracker);
        let clones: Vec<_> = (0..3).map(|_| first.clone()).collect();
        assert_eq!(tracker.allocation_count(), 1);

        for clone in clones {
            assert!(!RcBox::release(clone));
        }
        assert_eq!(tracker.deallocation_count(), 0);
        assert_eq!(Rc::strong_count(&witness), 2);

        assert!(RcBox::release(first));
        assert_eq!(tracker.deallocation_count(), 1);
        assert_eq!(Rc::strong_count(&witness), 1);
        assert!(!tracker.has_leaks());
    }

    #[test]
    fn wrap_adopts_handle_block_in_place() {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let witness = Rc::new(());
        let handle = BoundedHandle::<Rc<()>, _>::allocate(&tracker, 1);
        let slot = handle.min();
        unsafe { slot.write(Rc::clone(&witness)) };

        let boxed = unsafe { RcBox::wrap(handle) };
        assert_eq!(RcBox::strong_count(&boxed), 1);
        assert!(core::ptr::eq(&*boxed, slot.as_ptr()));
        // the handle block plus the count, nothing moved or freed
        assert_eq!(tracker.allocation_count(), 2);
        assert_eq!(tracker.deallocation_count(), 0);

        let clone = boxed.clone();
        assert!(!RcBox::release(boxed));
        assert_eq!(Rc::strong_count(&witness), 2);
        assert!(RcBox::release(clone));
        assert_eq!(Rc::strong_count(&witness), 1);
        assert_eq!(tracker.deallocation_count(), 2);
        assert!(!tracker.has_leaks());
    }

    #[test]
    fn wrap_takes_slot_at_cursor() {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let mut handle = BoundedHandle::<u32, _>::allocate(&tracker, 4);
        handle.seek(2);
        let slot = handle.index(0);
        unsafe { slot.write(7) };

        let boxed = unsafe { RcBox::wrap(handle) };
        assert!(core::ptr::eq(&*boxed, slot.as_ptr()));
        assert_eq!(RcBox::try_unwrap(boxed), Ok(7));
        assert!(!tracker.has_leaks());
    }

    #[test]
    fn get_mut_requires_unique() {
        let mut boxed = RcBox::new(1);
        *RcBox::get_mut(&mut boxed).unwrap() += 1;
        let other = boxed.clone();
        assert!(RcBox::get_mut(&mut boxed).is_none());
        drop(other);
        assert_eq!(*boxed, 2);
    }

    #[test]
    fn try_unwrap_only_when_unique() {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let boxed = RcBox::new_in(String::from("x"), &tracker);
        let other = boxed.clone();
        let boxed = RcBox::try_unwrap(boxed).unwrap_err();
        drop(other);
        assert_eq!(RcBox::try_unwrap(boxed).unwrap(), "x");
        assert!(!tracker.has_leaks());
    }

    #[test]
    fn formats_like_value() {
        let boxed = RcBox::new(42);
        assert_eq!(format!("{boxed}"), "42");
        assert_eq!(format!("{boxed:?}"), "42");
        assert_eq!(boxed, RcBox::new(42));
    }
}
