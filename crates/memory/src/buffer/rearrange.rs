//! In-place rearrangement of contiguous ranges
//!
//! Everything here works on a mutable slice with element swaps only; no
//! auxiliary storage is allocated. The buffer's public methods do the bounds
//! checking and then delegate here.

/// Swaps `slice[a..a + n]` with `slice[b..b + n]`
///
/// The ranges must not overlap.
pub fn swap_blocks<T>(slice: &mut [T], a: usize, b: usize, n: usize) {
    debug_assert!(a + n <= b || b + n <= a, "overlapping blocks");
    for i in 0..n {
        slice.swap(a + i, b + i);
    }
}

/// Moves the element at `from` to `to`, shifting everything in between by
/// one position through adjacent swaps
pub fn shift<T>(slice: &mut [T], from: usize, to: usize) {
    if from < to {
        for i in from..to {
            slice.swap(i, i + 1);
        }
    } else {
        for i in (to..from).rev() {
            slice.swap(i, i + 1);
        }
    }
}

/// Rotates `slice[lo..hi]` so that the element at `mid` ends up at `lo`
///
/// Block-swap rotation: while both sides are longer than one element, the
/// shorter side is swapped into its final place at the far end of the range
/// and the range shrinks around the unchanged `mid`. A remaining side of one
/// element is finished with a single shift.
pub fn rotate<T>(slice: &mut [T], lo: usize, mid: usize, hi: usize) {
    debug_assert!(lo <= mid && mid <= hi && hi <= slice.len());
    let (mut lo, mut hi) = (lo, hi);

    loop {
        let left = mid - lo;
        let right = hi - mid;
        if left <= 1 || right <= 1 {
            match (left, right) {
                (1, r) if r > 0 => shift(slice, lo, hi - 1),
                (l, 1) if l > 0 => shift(slice, hi - 1, lo),
                _ => {}
            }
            return;
        }

        if left <= right {
            swap_blocks(slice, lo, hi - left, left);
            hi -= left;
        } else {
            swap_blocks(slice, lo, mid, right);
            lo += right;
        }
    }
}
