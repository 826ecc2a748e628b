//! Growable buffer: a contiguous, owned, resizable sequence
//!
//! [`GrowableBuffer`] keeps its elements in the window of a
//! [`BoundedHandle`]. Capacity is the handle's window length; the first
//! `len()` slots are initialized, the rest are not. Growth goes through a
//! [`GrowthPolicy`], so `push` doubles the capacity and the `*_exact`
//! variants allocate precisely what was asked for.

mod iter;
pub mod rearrange;

use core::fmt;
use core::ops::{Index, IndexMut};
use core::ptr;
use core::slice;

pub use iter::Iter;

use crate::allocator::{Allocator, SystemAllocator};
use crate::bounds::{bounds_check, capacity_overflow};
use crate::config::{BufferConfig, GrowthPolicy};
use crate::error::MemoryResult;
use crate::handle::BoundedHandle;

/// Contiguous growable sequence backed by a pluggable allocator
pub struct GrowableBuffer<T, A: Allocator = SystemAllocator> {
    array: BoundedHandle<T, A>,
    length: usize,
}

impl<T> GrowableBuffer<T> {
    /// Empty buffer with the default initial capacity
    pub fn new() -> Self {
        Self::new_in(SystemAllocator)
    }

    /// Empty buffer with room for exactly `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, SystemAllocator)
    }
}

impl<T, A: Allocator> GrowableBuffer<T, A> {
    /// Empty buffer in `alloc` with the default initial capacity
    pub fn new_in(alloc: A) -> Self {
        Self::with_capacity_in(BufferConfig::DEFAULT_INITIAL_CAPACITY, alloc)
    }

    /// Empty buffer in `alloc` with room for exactly `capacity` elements
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self {
            array: BoundedHandle::allocate(alloc, capacity),
            length: 0,
        }
    }

    /// Empty buffer built from a validated [`BufferConfig`]
    ///
    /// # Errors
    /// Fails if the configured capacity does not fit in the address space or
    /// the allocator cannot supply it.
    pub fn with_config_in(config: &BufferConfig, alloc: A) -> MemoryResult<Self> {
        config.validate::<T>()?;
        Ok(Self {
            array: BoundedHandle::try_allocate(alloc, config.initial_capacity)?,
            length: 0,
        })
    }

    /// Number of initialized elements
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of elements the current allocation can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.array.len()
    }

    /// The allocator backing this buffer
    #[inline]
    pub fn allocator(&self) -> &A {
        self.array.allocator()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.array.as_ptr().cast_const()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.array.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `length` slots are initialized and the base
        // pointer is non-null and aligned even for an empty window.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.length) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` makes the borrow unique.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.length) }
    }

    fn reserve_with(&mut self, needed: usize, policy: GrowthPolicy) {
        let capacity = self.capacity();
        if needed <= capacity {
            return;
        }
        match policy.next_capacity(capacity, needed) {
            Some(new_capacity) => self.array.reallocate(new_capacity),
            None => capacity_overflow(format_args!(
                "cannot grow capacity {capacity} to hold {needed} elements"
            )),
        }
    }

    fn needed_for(&self, additional: usize) -> usize {
        match self.length.checked_add(additional) {
            Some(needed) => needed,
            None => capacity_overflow(format_args!(
                "length {} + {additional} overflows usize",
                self.length
            )),
        }
    }

    /// Ensures room for `additional` more elements, doubling the capacity
    pub fn grow(&mut self, additional: usize) {
        let needed = self.needed_for(additional);
        self.reserve_with(needed, GrowthPolicy::Doubling);
    }

    /// Ensures room for `additional` more elements, allocating exactly that
    pub fn grow_exact(&mut self, additional: usize) {
        let needed = self.needed_for(additional);
        self.reserve_with(needed, GrowthPolicy::Exact);
    }

    /// Ensures the capacity is at least `size`, doubling as needed
    pub fn resize(&mut self, size: usize) {
        self.reserve_with(size, GrowthPolicy::Doubling);
    }

    /// Sets the capacity to exactly `max(size, len())`
    ///
    /// Unlike [`GrowableBuffer::resize`] this also shrinks the allocation.
    pub fn resize_exact(&mut self, size: usize) {
        let target = size.max(self.length);
        if target != self.capacity() {
            self.array.reallocate(target);
        }
    }

    /// Drops unused capacity
    pub fn shrink_to_fit(&mut self) {
        self.resize_exact(self.length);
    }

    /// Appends `item`, doubling the capacity if it is full
    pub fn push(&mut self, item: T) {
        self.grow(1);
        // SAFETY: `length < capacity` after `grow(1)`; the slot is
        // uninitialized so nothing is overwritten.
        unsafe { self.array.as_ptr().add(self.length).write(item) };
        self.length += 1;
    }

    /// Removes and returns the last element
    pub fn pop(&mut self) -> Option<T> {
        if self.length == 0 {
            return None;
        }
        self.length -= 1;
        // SAFETY: slot `length` was initialized and is now outside the live
        // range, so it is read exactly once.
        Some(unsafe { self.array.as_ptr().add(self.length).read() })
    }

    /// Inserts `item` at `idx`, shifting later elements right
    #[track_caller]
    pub fn insert(&mut self, idx: usize, item: T) {
        bounds_check!(
            idx <= self.length,
            "insert index {idx} past length {}",
            self.length
        );
        self.grow(1);
        // SAFETY: `idx <= length < capacity`; the tail moves one slot right
        // into the spare capacity before `idx` is overwritten.
        unsafe {
            let at = self.array.as_ptr().add(idx);
            ptr::copy(at, at.add(1), self.length - idx);
            at.write(item);
        }
        self.length += 1;
    }

    /// Removes the element at `idx`, shifting later elements left
    #[track_caller]
    pub fn remove(&mut self, idx: usize) -> T {
        bounds_check!(
            idx < self.length,
            "remove index {idx} out of length {}",
            self.length
        );
        // SAFETY: `idx < length`; the value is read once and its slot is
        // overwritten by the shifted tail.
        unsafe {
            let at = self.array.as_ptr().add(idx);
            let item = at.read();
            ptr::copy(at.add(1), at, self.length - idx - 1);
            self.length -= 1;
            item
        }
    }

    /// Removes the element at `idx`, filling the hole with the last element
    #[track_caller]
    pub fn swap_remove(&mut self, idx: usize) -> T {
        bounds_check!(
            idx < self.length,
            "swap_remove index {idx} out of length {}",
            self.length
        );
        self.length -= 1;
        // SAFETY: both `idx` and the old last slot are initialized; `copy`
        // tolerates them being the same slot.
        unsafe {
            let base = self.array.as_ptr();
            let item = base.add(idx).read();
            ptr::copy(base.add(self.length), base.add(idx), 1);
            item
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.as_slice().get(idx)
    }

    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(idx)
    }

    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.length.checked_sub(1).and_then(|idx| self.get(idx))
    }

    /// Borrow of `[a, b)`; faults unless `a < len()`, `b <= len()` and `a <= b`
    #[track_caller]
    pub fn slice(&self, a: usize, b: usize) -> &[T] {
        bounds_check!(
            a < self.length && b <= self.length && a <= b,
            "slice [{a}, {b}) outside length {}",
            self.length
        );
        // SAFETY: `[a, b)` lies inside the initialized prefix.
        unsafe { slice::from_raw_parts(self.as_ptr().add(a), b - a) }
    }

    /// Rotates `[a, b)` so that the element at `m` moves to `a`
    #[track_caller]
    pub fn rotate(&mut self, a: usize, m: usize, b: usize) {
        bounds_check!(
            a <= m && m <= b && b <= self.length,
            "rotate [{a}, {m}, {b}) outside length {}",
            self.length
        );
        rearrange::rotate(self.as_mut_slice(), a, m, b);
    }

    /// Moves the element at `from` to `to`, shifting the elements between
    #[track_caller]
    pub fn move_to(&mut self, from: usize, to: usize) {
        bounds_check!(
            from < self.length && to < self.length,
            "move {from} -> {to} outside length {}",
            self.length
        );
        rearrange::shift(self.as_mut_slice(), from, to);
    }

    #[track_caller]
    pub fn swap(&mut self, a: usize, b: usize) {
        bounds_check!(
            a < self.length && b < self.length,
            "swap {a} <-> {b} outside length {}",
            self.length
        );
        self.as_mut_slice().swap(a, b);
    }

    /// Swaps the non-overlapping blocks `[a, a + n)` and `[b, b + n)`
    #[track_caller]
    pub fn swap_blocks(&mut self, a: usize, b: usize, n: usize) {
        bounds_check!(
            a.checked_add(n).is_some_and(|end| end <= self.length)
                && b.checked_add(n).is_some_and(|end| end <= self.length)
                && (a + n <= b || b + n <= a),
            "blocks {a}..+{n} and {b}..+{n} overlap or exceed length {}",
            self.length
        );
        rearrange::swap_blocks(self.as_mut_slice(), a, b, n);
    }

    /// Shortens the buffer to `len` elements, dropping the rest
    pub fn truncate(&mut self, len: usize) {
        if len >= self.length {
            return;
        }
        // SAFETY: `[len, length)` is initialized; the length is updated first
        // so a panicking destructor cannot cause a double drop.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.array.as_ptr().add(len), self.length - len);
            self.length = len;
            ptr::drop_in_place(tail);
        }
    }

    /// Drops every element, keeping the capacity
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the elements and releases the allocation
    pub fn free(self) {
        drop(self);
    }

    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(self)
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Clones every element of `items` onto the end, growing once
    pub fn append(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.grow(items.len());
        for item in items {
            // SAFETY: `grow` reserved room for all of `items`.
            unsafe { self.array.as_ptr().add(self.length).write(item.clone()) };
            self.length += 1;
        }
    }
}

impl<A: Allocator> GrowableBuffer<u8, A> {
    /// The contents as text, if they are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_slice()).ok()
    }
}

impl<T, A: Allocator> Drop for GrowableBuffer<T, A> {
    fn drop(&mut self) {
        // SAFETY: the first `length` slots are initialized and dropped once;
        // the handle releases the allocation afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
    }
}

impl<T, A: Allocator> Index<usize> for GrowableBuffer<T, A> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, idx: usize) -> &T {
        bounds_check!(
            idx < self.length,
            "index {idx} out of length {}",
            self.length
        );
        // SAFETY: `idx < length`, or the release-unsafe build mode asserts it.
        unsafe { &*self.as_ptr().add(idx) }
    }
}

impl<T, A: Allocator> IndexMut<usize> for GrowableBuffer<T, A> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, idx: usize) -> &mut T {
        bounds_check!(
            idx < self.length,
            "index {idx} out of length {}",
            self.length
        );
        // SAFETY: as in `index`, and `&mut self` makes the borrow unique.
        unsafe { &mut *self.as_mut_ptr().add(idx) }
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for GrowableBuffer<T, A> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity_in(self.length, self.allocator().clone());
        copy.append(self.as_slice());
        copy
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: Allocator, B: Allocator> PartialEq<GrowableBuffer<T, B>>
    for GrowableBuffer<T, A>
{
    fn eq(&self, other: &GrowableBuffer<T, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: Allocator> Eq for GrowableBuffer<T, A> {}

impl<T: PartialEq, A: Allocator> PartialEq<[T]> for GrowableBuffer<T, A> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, A: Allocator, const N: usize> PartialEq<[T; N]> for GrowableBuffer<T, A> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T, A: Allocator> AsRef<[T]> for GrowableBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> AsMut<[T]> for GrowableBuffer<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator> Extend<T> for GrowableBuffer<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.grow(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator> Extend<&'a T> for GrowableBuffer<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for GrowableBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a GrowableBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut GrowableBuffer<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::allocator::TrackedAllocator;

    #[test]
    fn starts_with_default_capacity() {
        let buffer = GrowableBuffer::<u64>::new();
        assert_eq!(buffer.capacity(), BufferConfig::DEFAULT_INITIAL_CAPACITY);
        assert!(buffer.is_empty());
    }

    #[test]
    fn ninth_push_doubles_once() {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let mut buffer = GrowableBuffer::new_in(&tracker);
        for i in 0..9 {
            buffer.push(i);
        }
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.len(), 9);
        assert_eq!(tracker.reallocation_count(), 1);
    }

    #[test]
    fn zero_capacity_grows_to_one() {
        let mut buffer = GrowableBuffer::with_capacity(0);
        buffer.push('x');
        assert_eq!(buffer.capacity(), 1);
        buffer.push('y');
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn pop_is_lifo_and_total() {
        let mut buffer: GrowableBuffer<_> = [1, 2, 3].into_iter().collect();
        assert_eq!(buffer.pop(), Some(3));
        assert_eq!(buffer.pop(), Some(2));
        assert_eq!(buffer.pop(), Some(1));
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn remove_keeps_order() {
        let mut buffer: GrowableBuffer<_> = [1, 2, 3, 4].into_iter().collect();
        assert_eq!(buffer.remove(1), 2);
        assert_eq!(buffer, [1, 3, 4]);
    }

    #[test]
    fn swap_remove_moves_last() {
        let mut buffer: GrowableBuffer<_> = [1, 2, 3, 4].into_iter().collect();
        assert_eq!(buffer.swap_remove(1), 2);
        assert_eq!(buffer, [1, 4, 3]);
        assert_eq!(buffer.swap_remove(2), 3);
        assert_eq!(buffer, [1, 4]);
    }

    #[test]
    fn insert_shifts_right() {
        let mut buffer: GrowableBuffer<_> = ["a", "c"].into_iter().collect();
        buffer.insert(1, "b");
        buffer.insert(3, "d");
        buffer.insert(0, "_");
        assert_eq!(buffer, ["_", "a", "b", "c", "d"]);
    }

    #[test]
    fn grow_exact_and_shrink() {
        let mut buffer = GrowableBuffer::<u32>::with_capacity(2);
        buffer.append(&[1, 2]);
        buffer.grow_exact(3);
        assert_eq!(buffer.capacity(), 5);
        buffer.grow(4);
        assert_eq!(buffer.capacity(), 10);
        buffer.shrink_to_fit();
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer, [1, 2]);
    }

    #[test]
    fn resize_never_drops_below_length() {
        let mut buffer: GrowableBuffer<_> = (0..6).collect();
        buffer.resize_exact(3);
        assert_eq!(buffer.capacity(), 6);
        buffer.resize(7);
        assert_eq!(buffer.capacity(), 12);
        buffer.resize(4);
        assert_eq!(buffer.capacity(), 12);
        buffer.resize_exact(20);
        assert_eq!(buffer.capacity(), 20);
    }

    #[test]
    fn rearrangements() {
        let mut buffer: GrowableBuffer<_> = (0..8).collect();
        buffer.rotate(1, 3, 6);
        assert_eq!(buffer, [0, 3, 4, 5, 1, 2, 6, 7]);
        buffer.move_to(7, 0);
        assert_eq!(buffer, [7, 0, 3, 4, 5, 1, 2, 6]);
        buffer.swap(0, 7);
        assert_eq!(buffer, [6, 0, 3, 4, 5, 1, 2, 7]);
        buffer.swap_blocks(0, 5, 3);
        assert_eq!(buffer, [1, 2, 7, 4, 5, 6, 0, 3]);
    }

    #[test]
    fn slice_and_lookup() {
        let mut buffer: GrowableBuffer<_> = (10..15).collect();
        assert_eq!(buffer.slice(1, 3), &[11, 12]);
        assert_eq!(buffer.slice(2, 2), &[] as &[i32]);
        assert_eq!(buffer.get(5), None);
        assert_eq!(buffer.first(), Some(&10));
        assert_eq!(buffer.last(), Some(&14));
        *buffer.get_mut(0).unwrap() += 1;
        buffer[1] += 1;
        assert_eq!(buffer[0], 11);
        assert_eq!(buffer[1], 12);
    }

    #[test]
    fn clear_drops_elements_and_keeps_capacity() {
        let witness = Rc::new(());
        let mut buffer = GrowableBuffer::new();
        for _ in 0..10 {
            buffer.push(Rc::clone(&witness));
        }
        let capacity = buffer.capacity();
        buffer.truncate(4);
        assert_eq!(Rc::strong_count(&witness), 5);
        buffer.clear();
        assert_eq!(Rc::strong_count(&witness), 1);
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn drop_releases_everything() {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let witness = Rc::new(());
        {
            let mut buffer = GrowableBuffer::new_in(&tracker);
            for _ in 0..100 {
                buffer.push(Rc::clone(&witness));
            }
            let copy = buffer.clone();
            assert_eq!(copy.len(), 100);
        }
        assert_eq!(Rc::strong_count(&witness), 1);
        assert!(!tracker.has_leaks());
        assert_eq!(tracker.allocated_bytes(), 0);
    }

    #[test]
    fn byte_buffer_as_text() {
        let mut buffer = GrowableBuffer::<u8>::new();
        buffer.extend(b"keel");
        assert_eq!(buffer.as_str(), Some("keel"));
        buffer.push(0xff);
        assert_eq!(buffer.as_str(), None);
    }

    #[test]
    fn config_validation_is_reported() {
        let config = BufferConfig::new().with_initial_capacity(usize::MAX);
        let err = GrowableBuffer::<u64>::with_config_in(&config, SystemAllocator).unwrap_err();
        assert_eq!(err.code(), "MEM:CONFIG:INVALID");

        let config = BufferConfig::new().with_initial_capacity(3);
        let buffer = GrowableBuffer::<u64>::with_config_in(&config, SystemAllocator).unwrap();
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn debug_lists_elements() {
        let buffer: GrowableBuffer<_> = [1, 2].into_iter().collect();
        assert_eq!(format!("{buffer:?}"), "[1, 2]");
    }

    #[cfg(not(feature = "release-unsafe"))]
    #[test]
    #[should_panic(expected = "bounds violation")]
    fn index_at_length_faults() {
        let buffer: GrowableBuffer<_> = [1, 2, 3].into_iter().collect();
        let _ = buffer[3];
    }

    #[cfg(not(feature = "release-unsafe"))]
    #[test]
    #[should_panic(expected = "bounds violation")]
    fn slice_starting_at_length_faults() {
        let buffer: GrowableBuffer<_> = [1, 2, 3].into_iter().collect();
        let _ = buffer.slice(3, 3);
    }

    #[cfg(not(feature = "release-unsafe"))]
    #[test]
    #[should_panic(expected = "bounds violation")]
    fn overlapping_blocks_fault() {
        let mut buffer: GrowableBuffer<_> = (0..6).collect();
        buffer.swap_blocks(0, 2, 3);
    }
}
