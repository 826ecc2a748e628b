//! Property-based tests for the growable buffer and counted box

use keel_memory::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i64),
    Pop,
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![any::<i64>().prop_map(Op::Push), Just(Op::Pop)],
        0..200,
    )
}

proptest! {
    #[test]
    fn push_pop_matches_model(ops in ops()) {
        let mut buffer = GrowableBuffer::new();
        let mut model = Vec::new();

        for op in ops {
            match op {
                Op::Push(value) => {
                    buffer.push(value);
                    model.push(value);
                }
                Op::Pop => prop_assert_eq!(buffer.pop(), model.pop()),
            }
            prop_assert_eq!(buffer.len(), model.len());
        }

        prop_assert_eq!(buffer.as_slice(), model.as_slice());
    }

    #[test]
    fn doubling_keeps_power_of_two_multiple(count in 0usize..2_000) {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let mut buffer = GrowableBuffer::new_in(&tracker);
        for i in 0..count {
            buffer.push(i);
        }

        let initial = BufferConfig::DEFAULT_INITIAL_CAPACITY;
        prop_assert!(buffer.capacity() >= buffer.len());
        prop_assert_eq!(buffer.capacity() % initial, 0);
        prop_assert!((buffer.capacity() / initial).is_power_of_two());

        // one reallocation per doubling past the initial capacity
        let doublings = (buffer.capacity() / initial).trailing_zeros() as usize;
        prop_assert_eq!(tracker.reallocation_count(), doublings);
    }

    #[test]
    fn in_range_index_never_faults(items in prop::collection::vec(any::<u8>(), 1..64), idx in any::<prop::sample::Index>()) {
        let buffer: GrowableBuffer<u8> = items.iter().copied().collect();
        let idx = idx.index(items.len());
        prop_assert_eq!(buffer[idx], items[idx]);
    }

    #[test]
    fn rotate_matches_slice_rotate(
        items in prop::collection::vec(any::<u16>(), 0..64),
        a in any::<prop::sample::Index>(),
        m in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let len = items.len();
        let mut bounds = [a.index(len + 1), m.index(len + 1), b.index(len + 1)];
        bounds.sort_unstable();
        let [a, m, b] = bounds;

        let mut buffer: GrowableBuffer<u16> = items.iter().copied().collect();
        buffer.rotate(a, m, b);

        let mut expected = items;
        expected[a..b].rotate_left(m - a);
        prop_assert_eq!(buffer.as_slice(), expected.as_slice());
    }

    #[test]
    fn insert_remove_matches_model(items in prop::collection::vec(any::<i32>(), 1..64), at in any::<prop::sample::Index>(), value in any::<i32>()) {
        let mut buffer: GrowableBuffer<i32> = items.iter().copied().collect();
        let mut model = items.clone();
        let idx = at.index(items.len() + 1);

        buffer.insert(idx, value);
        model.insert(idx, value);
        prop_assert_eq!(buffer.as_slice(), model.as_slice());

        prop_assert_eq!(buffer.remove(idx), model.remove(idx));
        prop_assert_eq!(buffer.as_slice(), model.as_slice());
    }

    #[test]
    fn rc_box_freed_exactly_once(clones in 0usize..32) {
        let tracker = TrackedAllocator::new(SystemAllocator);
        let first = RcBox::new_in(String::from("shared"), &tracker);
        let copies: Vec<_> = (0..clones).map(|_| first.clone()).collect();
        prop_assert_eq!(RcBox::strong_count(&first), clones as u64 + 1);

        let mut freed = 0;
        for copy in copies {
            freed += usize::from(RcBox::release(copy));
        }
        freed += usize::from(RcBox::release(first));

        prop_assert_eq!(freed, 1);
        prop_assert_eq!(tracker.deallocation_count(), 1);
        prop_assert!(!tracker.has_leaks());
    }
}
