//! Bounded, bidirectionally traversable history.
//!
//! Behaves like browser history: going back and then inserting discards the
//! forward entries, and the oldest entry is evicted once capacity is exceeded.

use std::collections::VecDeque;

use crate::error::HistoryError;

/// Fixed-capacity history with a current index.
#[derive(Debug, Clone)]
pub struct HistoryQueue<T> {
    entries: VecDeque<T>,
    current: usize,
    capacity: usize,
}

impl<T> HistoryQueue<T> {
    /// An empty queue holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity < 1 {
            return Err(HistoryError::InvalidSize { size: capacity });
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            current: 0,
            capacity,
        })
    }

    /// Append `entry` after the current one and make it current.
    ///
    /// Entries after the current index are discarded first. If the queue is
    /// then over capacity the oldest entry is evicted.
    pub fn insert(&mut self, entry: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.current + 1);
        }
        self.entries.push_back(entry);
        self.current = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.current -= 1;
        }
    }

    /// Step back and return the entry there.
    pub fn back(&mut self) -> Result<&T, HistoryError> {
        if self.current == 0 || self.entries.is_empty() {
            return Err(HistoryError::NoPrevious);
        }
        self.current -= 1;
        Ok(&self.entries[self.current])
    }

    /// Step forward and return the entry there.
    pub fn forward(&mut self) -> Result<&T, HistoryError> {
        if self.current + 1 >= self.entries.len() {
            return Err(HistoryError::NoNext);
        }
        self.current += 1;
        Ok(&self.entries[self.current])
    }

    /// Entry at the current index.
    pub fn current(&self) -> Result<&T, HistoryError> {
        self.entries.get(self.current).ok_or(HistoryError::Empty)
    }

    /// Most recently inserted entry, regardless of the current index.
    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Change the capacity.
    ///
    /// Shrinking keeps the newest `size` entries and is rejected when the
    /// current entry would not be among them.
    pub fn set_capacity(&mut self, size: usize) -> Result<(), HistoryError> {
        if size < 1 {
            return Err(HistoryError::InvalidSize { size });
        }
        if size == self.capacity {
            return Ok(());
        }
        let len = self.entries.len();
        if len > size && self.current < len - size {
            return Err(HistoryError::ShrinkRejected {
                size,
                current: self.current,
                len,
            });
        }

        self.capacity = size;
        if len > size {
            let dropped = len - size;
            self.entries.drain(..dropped);
            self.current -= dropped;
        }
        Ok(())
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `back()` would succeed.
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Whether `forward()` would succeed.
    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    fn queue(capacity: usize, values: impl IntoIterator<Item = i32>) -> HistoryQueue<i32> {
        let mut q = HistoryQueue::new(capacity).unwrap();
        for v in values {
            q.insert(v);
        }
        q
    }

    fn contents(q: &HistoryQueue<i32>) -> Vec<i32> {
        q.entries().copied().collect()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn zero_capacity_rejected() {
        let err = assert_err!(HistoryQueue::<i32>::new(0));
        assert_eq!(err, HistoryError::InvalidSize { size: 0 });
    }

    #[test]
    fn empty_queue() {
        let mut q = queue(3, []);
        assert!(q.is_empty());
        assert_eq!(q.current(), Err(HistoryError::Empty));
        assert_eq!(q.peek(), None);
        assert_eq!(q.back(), Err(HistoryError::NoPrevious));
        assert_eq!(q.forward(), Err(HistoryError::NoNext));
    }

    // ── Insert ───────────────────────────────────────────────────────

    #[test]
    fn eviction() {
        let q = queue(5, 1..=6);
        assert_eq!(contents(&q), vec![2, 3, 4, 5, 6]);
        assert_eq!(q.current(), Ok(&6));
        assert_eq!(q.current_index(), 4);
    }

    #[test]
    fn truncation_after_back() {
        let mut q = queue(5, 1..=3);
        assert_eq!(q.back(), Ok(&2));
        assert_eq!(q.back(), Ok(&1));
        q.insert(9);
        assert_eq!(contents(&q), vec![1, 9]);
        assert_eq!(q.current(), Ok(&9));
        assert!(!q.can_go_forward());
    }

    #[test]
    fn truncation_keeps_prefix() {
        let mut q = queue(5, 1..=5);
        for _ in 0..3 {
            assert_ok!(q.back());
        }
        q.insert(6);
        assert_eq!(contents(&q), vec![1, 2, 6]);
    }

    // ── Back / forward ───────────────────────────────────────────────

    #[test]
    fn back_and_forward() {
        let mut q = queue(5, 1..=3);
        assert_eq!(q.forward(), Err(HistoryError::NoNext));
        assert_eq!(q.back(), Ok(&2));
        assert_eq!(q.back(), Ok(&1));
        assert_eq!(q.back(), Err(HistoryError::NoPrevious));
        assert_eq!(q.current(), Ok(&1));
        assert_eq!(q.forward(), Ok(&2));
        assert_eq!(q.forward(), Ok(&3));
        assert_eq!(q.peek(), Some(&3));
    }

    #[test]
    fn peek_ignores_current() {
        let mut q = queue(5, 1..=3);
        assert_ok!(q.back());
        assert_eq!(q.peek(), Some(&3));
        assert_eq!(q.current(), Ok(&2));
    }

    // ── Capacity ─────────────────────────────────────────────────────

    #[test]
    fn shrink_rejected_then_accepted() {
        let mut q = queue(5, 1..=6);
        assert_eq!(contents(&q), vec![2, 3, 4, 5, 6]);
        for _ in 0..3 {
            assert_ok!(q.back());
        }
        assert_eq!(q.current(), Ok(&3));

        let err = assert_err!(q.set_capacity(3));
        assert_eq!(
            err,
            HistoryError::ShrinkRejected {
                size: 3,
                current: 1,
                len: 5
            }
        );
        assert_eq!(q.capacity(), 5);

        assert_eq!(q.forward(), Ok(&4));
        assert_ok!(q.set_capacity(3));
        assert_eq!(contents(&q), vec![4, 5, 6]);
        assert_eq!(q.current(), Ok(&4));
        assert_eq!(q.current_index(), 0);
    }

    #[test]
    fn shrink_keeps_current_in_window() {
        let mut q = queue(5, 1..=5);
        assert_ok!(q.back());
        assert_ok!(q.set_capacity(2));
        assert_eq!(contents(&q), vec![4, 5]);
        assert_eq!(q.current(), Ok(&4));
    }

    #[test]
    fn grow_is_unconditional() {
        let mut q = queue(2, 1..=2);
        assert_ok!(q.back());
        assert_ok!(q.set_capacity(4));
        assert_eq!(q.capacity(), 4);
        q.insert(3);
        assert_eq!(contents(&q), vec![1, 3]);
    }

    #[test]
    fn invalid_and_same_size() {
        let mut q = queue(3, 1..=3);
        assert_eq!(q.set_capacity(0), Err(HistoryError::InvalidSize { size: 0 }));
        assert_ok!(q.set_capacity(3));
        assert_eq!(contents(&q), vec![1, 2, 3]);
    }

    #[test]
    fn shrink_shorter_than_capacity() {
        let mut q = queue(5, 1..=2);
        assert_ok!(q.set_capacity(3));
        assert_eq!(contents(&q), vec![1, 2]);
        assert_eq!(q.current(), Ok(&2));
    }
}
