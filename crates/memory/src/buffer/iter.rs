use core::iter::FusedIterator;

use super::GrowableBuffer;
use crate::allocator::{Allocator, SystemAllocator};

/// Index-based iterator over a [`GrowableBuffer`]
///
/// Holds a shared borrow of the buffer, so the buffer cannot be mutated
/// while the iterator is alive. [`Iter::restart`] rewinds it.
pub struct Iter<'a, T, A: Allocator = SystemAllocator> {
    buffer: &'a GrowableBuffer<T, A>,
    front: usize,
    back: usize,
}

impl<'a, T, A: Allocator> Iter<'a, T, A> {
    pub(super) fn new(buffer: &'a GrowableBuffer<T, A>) -> Self {
        Self {
            buffer,
            front: 0,
            back: buffer.len(),
        }
    }

    /// Rewinds to the first element
    pub fn restart(&mut self) {
        self.front = 0;
        self.back = self.buffer.len();
    }

    /// Elements not yet yielded, as a slice
    pub fn as_slice(&self) -> &'a [T] {
        &self.buffer.as_slice()[self.front..self.back]
    }
}

impl<'a, T, A: Allocator> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let item = self.buffer.get(self.front);
        self.front += 1;
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T, A: Allocator> DoubleEndedIterator for Iter<'a, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.buffer.get(self.back)
    }
}

impl<T, A: Allocator> ExactSizeIterator for Iter<'_, T, A> {}

impl<T, A: Allocator> FusedIterator for Iter<'_, T, A> {}

impl<T, A: Allocator> Clone for Iter<'_, T, A> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            front: self.front,
            back: self.back,
        }
    }
}
