//! Fixed-capacity window buffer with eviction accounting.
//!
//! Ring semantics: on overflow the oldest entry is evicted and counted, the
//! producer never blocks. `snapshot()` is a non-destructive copy used by the
//! detector, heat-map generator and aggregator.

use ringbuf::{traits::*, HeapRb};

/// Per-sensor window buffer
///
/// Owned by a single sensor's processing unit; readers get copies via
/// `snapshot()` so a concurrent pass never observes a partially written ring.
pub struct WindowBuffer<T> {
    ring: HeapRb<T>,
    capacity: usize,
    evicted_count: u64,
}

impl<T> std::fmt::Debug for WindowBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowBuffer")
            .field("len", &self.ring.occupied_len())
            .field("capacity", &self.capacity)
            .field("evicted", &self.evicted_count)
            .finish()
    }
}

impl<T: Clone> WindowBuffer<T> {
    /// Create a buffer with the given fixed capacity
    #[inline]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: HeapRb::new(capacity),
            capacity,
            evicted_count: 0,
        }
    }

    /// Append a value
    ///
    /// If the buffer is full, evicts exactly the oldest entry and counts it.
    #[inline]
    pub fn append(&mut self, value: T) {
        if self.ring.is_full() {
            let _ = self.ring.try_pop();
            self.evicted_count += 1;
        }
        let _ = self.ring.try_push(value);
    }

    /// Non-destructive ordered copy of the current contents (oldest first)
    #[inline]
    pub fn snapshot(&self) -> Vec<T> {
        self.ring.iter().cloned().collect()
    }

    /// True when the buffer holds `capacity` entries
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Number of buffered entries
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.occupied_len()
    }

    /// True when empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Configured capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries evicted since creation
    #[inline]
    pub fn evicted_count(&self) -> u64 {
        self.evicted_count
    }

    /// Drop all buffered entries (window consumed by a pass)
    #[inline]
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = WindowBuffer::new(8);
        for i in 0..100 {
            buffer.append(i);
            assert!(buffer.len() <= 8);
        }
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.evicted_count(), 92);
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut buffer = WindowBuffer::new(3);
        for i in 0..5 {
            buffer.append(i);
        }
        // 0 and 1 were evicted, oldest first
        assert_eq!(buffer.snapshot(), vec![2, 3, 4]);
        assert_eq!(buffer.evicted_count(), 2);
    }

    #[test]
    fn test_snapshot_is_non_destructive() {
        let mut buffer = WindowBuffer::new(4);
        buffer.append(1.0);
        buffer.append(2.0);

        let first = buffer.snapshot();
        let second = buffer.snapshot();
        assert_eq!(first, second);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_is_full_and_clear() {
        let mut buffer = WindowBuffer::new(2);
        assert!(!buffer.is_full());
        buffer.append(1);
        buffer.append(2);
        assert!(buffer.is_full());

        buffer.clear();
        assert!(buffer.is_empty());
        // Eviction counter survives clears
        buffer.append(3);
        buffer.append(4);
        buffer.append(5);
        assert_eq!(buffer.evicted_count(), 1);
    }
}
