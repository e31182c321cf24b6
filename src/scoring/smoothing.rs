// Smoothing buffer
// Fixed-size moving average over the most recent importance scores.

use std::collections::VecDeque;

use crate::error::{ClipforgeError, Result};

/// FIFO window of at most `window` scores. Create one per run.
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    window: usize,
    scores: VecDeque<f64>,
}

impl SmoothingBuffer {
    pub fn new(window: usize) -> Result<Self> {
        if window < 1 {
            return Err(ClipforgeError::config("smoothing window must be at least 1"));
        }
        Ok(Self {
            window,
            scores: VecDeque::with_capacity(window),
        })
    }

    /// Insert a score and return the mean of the window after insertion.
    /// Before the window fills, the mean covers only the scores seen so far.
    pub fn push(&mut self, score: f64) -> f64 {
        if self.scores.len() == self.window {
            self.scores.pop_front();
        }
        self.scores.push_back(score);
        self.mean()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn mean(&self) -> f64 {
        let Some(&first) = self.scores.front() else {
            return 0.0;
        };

        // Uniform window: return the value itself so repeated pushes are exact
        if self.scores.iter().all(|&s| s == first) {
            return first;
        }

        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            SmoothingBuffer::new(0),
            Err(ClipforgeError::Configuration(_))
        ));
    }

    #[test]
    fn test_window_of_one_passes_through() {
        let mut buffer = SmoothingBuffer::new(1).unwrap();
        assert_eq!(buffer.push(42.0), 42.0);
        assert_eq!(buffer.push(7.5), 7.5);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_growing_window_does_not_pad_with_zeros() {
        let mut buffer = SmoothingBuffer::new(5).unwrap();
        assert_eq!(buffer.push(10.0), 10.0);
        assert_eq!(buffer.push(20.0), 15.0);
        assert_eq!(buffer.push(30.0), 20.0);
    }

    #[test]
    fn test_oldest_score_evicted() {
        let mut buffer = SmoothingBuffer::new(3).unwrap();
        buffer.push(90.0);
        buffer.push(0.0);
        buffer.push(0.0);
        assert_eq!(buffer.push(30.0), 10.0);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_identical_pushes_are_exact() {
        for v in [0.1, 1.0 / 3.0, 17.7, 99.99] {
            let mut buffer = SmoothingBuffer::new(5).unwrap();
            buffer.push(63.0);
            let mut last = 0.0;
            for _ in 0..5 {
                last = buffer.push(v);
            }
            assert_eq!(last, v, "five pushes of {} should smooth to {}", v, v);
        }
    }
}
