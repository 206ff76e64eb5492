//! Fixed-capacity sliding window of recent latency samples
//!
//! The window is the evolving reference distribution for anomaly scoring.
//! It keeps samples in arrival order and evicts the oldest one (FIFO) once
//! a push would exceed the configured capacity.

use crate::error::DetectorError;
use std::collections::VecDeque;

/// Default window capacity (number of samples kept for training)
pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// Ordered store of the most recent scalar samples
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` samples
    pub fn new(capacity: usize) -> Result<Self, DetectorError> {
        if capacity == 0 {
            return Err(DetectorError::config("window capacity must be at least 1"));
        }

        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a sample, evicting the oldest one when over capacity
    pub fn push(&mut self, value: f64) {
        self.samples.push_back(value);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Snapshot of the current contents, oldest first
    pub fn contents(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Current occupancy
    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Iterate over samples in arrival order
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(DEFAULT_WINDOW_CAPACITY),
            capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = SlidingWindow::new(0);
        assert!(matches!(
            result,
            Err(DetectorError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut window = SlidingWindow::new(5).unwrap();
        window.push(1.0);
        window.push(2.0);
        window.push(3.0);

        assert_eq!(window.size(), 3);
        assert_eq!(window.contents(), vec![1.0, 2.0, 3.0]);
        assert!(!window.is_full());
        assert_eq!(window.latest(), Some(3.0));
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut window = SlidingWindow::new(3).unwrap();
        for value in [10.0, 20.0, 30.0, 40.0, 50.0] {
            window.push(value);
        }

        assert_eq!(window.size(), 3);
        assert!(window.is_full());
        assert_eq!(window.contents(), vec![30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut window = SlidingWindow::new(4).unwrap();
        for _ in 0..4 {
            window.push(12.0);
        }
        assert_eq!(window.contents(), vec![12.0; 4]);
    }

    #[test]
    fn test_contents_is_a_snapshot() {
        let mut window = SlidingWindow::new(2).unwrap();
        window.push(1.0);
        let snapshot = window.contents();
        window.push(2.0);
        window.push(3.0);

        assert_eq!(snapshot, vec![1.0]);
        assert_eq!(window.contents(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_clear() {
        let mut window = SlidingWindow::new(2).unwrap();
        window.push(1.0);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.latest(), None);
    }

    #[test]
    fn test_default_capacity() {
        let window = SlidingWindow::default();
        assert_eq!(window.capacity(), DEFAULT_WINDOW_CAPACITY);
        assert!(window.is_empty());
    }

    proptest! {
        #[test]
        fn prop_window_holds_last_capacity_values(
            capacity in 1usize..64,
            values in proptest::collection::vec(0.0f64..5000.0, 0..200),
        ) {
            let mut window = SlidingWindow::new(capacity).unwrap();
            for (i, value) in values.iter().enumerate() {
                window.push(*value);
                prop_assert!(window.size() <= capacity);
                prop_assert_eq!(window.size(), (i + 1).min(capacity));
            }

            let start = values.len().saturating_sub(capacity);
            prop_assert_eq!(window.contents(), values[start..].to_vec());
        }
    }
}
