//! Bounded FIFO Window

use std::collections::VecDeque;

use crate::DEFAULT_CAPACITY;

/// Fixed-capacity FIFO; pushing at capacity evicts the oldest item
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    data: VecDeque<T>,
    capacity: usize,
    total_pushed: usize,
}

impl<T> RollingWindow<T> {
    /// Create a window holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
            total_pushed: 0,
        }
    }

    /// Create a window with the default capacity (500)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Append an item, returning the evicted one if the window was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.data.len() >= self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(item);
        self.total_pushed += 1;
        evicted
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items pushed since creation, including evicted ones
    pub fn total_pushed(&self) -> usize {
        self.total_pushed
    }

    /// Oldest retained item
    pub fn front(&self) -> Option<&T> {
        self.data.front()
    }

    /// Most recent item
    pub fn back(&self) -> Option<&T> {
        self.data.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Copy out the retained items, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().cloned().collect()
    }
}

impl<T> Default for RollingWindow<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_below_capacity() {
        let mut window = RollingWindow::new(10);
        for i in 0..5 {
            assert_eq!(window.push(i), None);
        }
        assert_eq!(window.len(), 5);
        assert_eq!(window.front(), Some(&0));
        assert_eq!(window.back(), Some(&4));
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut window = RollingWindow::new(3);
        window.push(1);
        window.push(2);
        window.push(3);
        assert!(window.is_full());

        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.to_vec(), vec![2, 3, 4]);
        assert_eq!(window.total_pushed(), 4);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut window = RollingWindow::new(0);
        window.push('a');
        window.push('b');
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.to_vec(), vec!['b']);
    }

    proptest! {
        #[test]
        fn keeps_most_recent_items(capacity in 1usize..64, count in 0usize..256) {
            let mut window = RollingWindow::new(capacity);
            for i in 0..count {
                window.push(i);
                prop_assert!(window.len() <= capacity);
            }
            let expected: Vec<usize> = (count.saturating_sub(capacity)..count).collect();
            prop_assert_eq!(window.to_vec(), expected);
        }
    }
}
