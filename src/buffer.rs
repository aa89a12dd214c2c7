use crate::error::{PipelineError, Result};
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// A fixed-capacity buffer that overwrites instead of rejecting when full.
///
/// Cloning yields another handle to the same storage, so the buffering
/// stage's collector and flusher each hold one. All reads and writes go
/// through a single lock; the only exposed operations are [`push`] and the
/// destructive drain [`get`].
///
/// When full, a push shifts the stored values one slot toward the head,
/// dropping the value at index 0, and writes the new value into the last
/// slot. The shift stops one slot short of the end, so the value that sat in
/// the last slot is replaced and the second-to-last value appears twice:
///
/// ```text
/// capacity 4: [1, 2, 3, 4] + push(5) -> [2, 3, 3, 5]
/// ```
///
/// [`push`]: RingBuffer::push
/// [`get`]: RingBuffer::get
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Arc<Mutex<Vec<T>>>,
    /// Mirror of `slots.len()` so an empty drain can skip the lock
    len: Arc<AtomicUsize>,
    overwritten: Arc<AtomicU64>,
    capacity: usize,
}

impl<T> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
            len: Arc::clone(&self.len),
            overwritten: Arc::clone(&self.overwritten),
            capacity: self.capacity,
        }
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Create an empty buffer holding at most `capacity` values
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or_else(|| {
                PipelineError::Config("ring buffer capacity must be at least 1".into())
            })
    }

    /// Create an empty buffer from an already-checked capacity
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            slots: Arc::new(Mutex::new(Vec::with_capacity(capacity))),
            len: Arc::new(AtomicUsize::new(0)),
            overwritten: Arc::new(AtomicU64::new(0)),
            capacity,
        }
    }

    /// Insert a value, overwriting when the buffer is full. Never blocks on
    /// anything but the buffer's own lock.
    pub fn push(&self, value: T) {
        let mut slots = self.slots.lock();
        if slots.len() < self.capacity {
            slots.push(value);
            self.len.store(slots.len(), Ordering::Release);
            return;
        }

        let last = self.capacity - 1;
        for i in 1..last {
            slots[i - 1] = slots[i].clone();
        }
        slots[last] = value;
        self.overwritten.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(capacity = self.capacity, "ring buffer full, overwrote slot");
    }

    /// Take everything currently held, in push order, leaving the buffer
    /// empty. The returned vector is owned by the caller.
    pub fn get(&self) -> Vec<T> {
        if self.len.load(Ordering::Acquire) == 0 {
            return Vec::new();
        }
        let mut slots = self.slots.lock();
        self.len.store(0, Ordering::Release);
        std::mem::replace(&mut *slots, Vec::with_capacity(self.capacity))
    }
}

impl<T> RingBuffer<T> {
    /// Maximum number of values held at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values currently held
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the next push will overwrite
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Number of pushes that landed on a full buffer
    pub fn overwritten(&self) -> u64 {
        self.overwritten.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_then_get() {
        let buffer = RingBuffer::new(10).unwrap();
        for i in 1..=4 {
            buffer.push(i);
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.get(), vec![1, 2, 3, 4]);
        assert!(buffer.is_empty());
        assert!(buffer.get().is_empty());
    }

    #[test]
    fn test_get_on_empty() {
        let buffer: RingBuffer<i64> = RingBuffer::new(3).unwrap();
        assert!(buffer.get().is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        let result: Result<RingBuffer<i64>> = RingBuffer::new(0);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_with_checked_capacity() {
        let buffer = RingBuffer::with_capacity(NonZeroUsize::new(2).unwrap());
        assert_eq!(buffer.capacity(), 2);
        buffer.push(5);
        assert_eq!(buffer.get(), vec![5]);
    }

    #[test]
    fn test_overwrite_policy() {
        let buffer = RingBuffer::new(4).unwrap();
        for i in 1..=4 {
            buffer.push(i);
        }
        assert!(buffer.is_full());
        buffer.push(5);
        assert_eq!(buffer.overwritten(), 1);
        assert_eq!(buffer.get(), vec![2, 3, 3, 5]);
    }

    #[test]
    fn test_overwrite_default_capacity() {
        let buffer = RingBuffer::new(10).unwrap();
        for i in 0..=10 {
            buffer.push(i);
        }
        assert_eq!(buffer.get(), vec![1, 2, 3, 4, 5, 6, 7, 8, 8, 10]);
    }

    #[test]
    fn test_capacity_one_keeps_newest() {
        let buffer = RingBuffer::new(1).unwrap();
        buffer.push(7);
        buffer.push(8);
        assert_eq!(buffer.get(), vec![8]);
    }

    #[test]
    fn test_capacity_two_keeps_head() {
        let buffer = RingBuffer::new(2).unwrap();
        buffer.push(1);
        buffer.push(2);
        buffer.push(3);
        assert_eq!(buffer.get(), vec![1, 3]);
    }

    #[test]
    fn test_drained_vec_survives_reuse() {
        let buffer = RingBuffer::new(3).unwrap();
        buffer.push(1);
        buffer.push(2);
        let drained = buffer.get();
        buffer.push(9);
        buffer.push(9);
        assert_eq!(drained, vec![1, 2]);
        assert_eq!(buffer.get(), vec![9, 9]);
    }

    #[test]
    fn test_concurrent_push_and_get() {
        let buffer = RingBuffer::new(10).unwrap();
        let writer = buffer.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..1000 {
                writer.push(i);
            }
        });
        let mut seen = Vec::new();
        while !handle.is_finished() {
            seen.extend(buffer.get());
        }
        handle.join().unwrap();
        seen.extend(buffer.get());
        assert!(seen.contains(&999));
        assert!(buffer.is_empty());
    }

    proptest! {
        #[test]
        fn prop_under_capacity_preserves_order(
            values in prop::collection::vec(any::<i64>(), 0..=10),
        ) {
            let buffer = RingBuffer::new(10).unwrap();
            for v in &values {
                buffer.push(*v);
            }
            prop_assert_eq!(buffer.get(), values);
            prop_assert!(buffer.get().is_empty());
        }

        #[test]
        fn prop_over_capacity_keeps_newest_last(
            capacity in 1usize..16,
            values in prop::collection::vec(any::<i64>(), 1..64),
        ) {
            let buffer = RingBuffer::new(capacity).unwrap();
            for v in &values {
                buffer.push(*v);
            }
            let drained = buffer.get();
            prop_assert!(drained.len() <= capacity);
            prop_assert_eq!(drained.last(), values.last());
        }
    }
}
