// BPM smoothing (moving average)
use std::collections::VecDeque;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

/// Streaming mean of the most recent `capacity` readings.
pub struct MovingAverage {
    capacity: usize,
    recent: VecDeque<f64>,
    total: f64,
}

impl MovingAverage {
    /// A zero window behaves as a window of one.
    pub fn new(window: usize) -> Self {
        let capacity = window.max(1);
        Self { capacity, recent: VecDeque::with_capacity(capacity), total: 0.0 }
    }

    /// Adds a reading, evicting the oldest once full, and returns the mean.
    pub fn push(&mut self, bpm: f64) -> f64 {
        if self.is_full() {
            self.total -= self.recent.pop_front().unwrap_or_default();
        }
        self.recent.push_back(bpm);
        self.total += bpm;
        self.mean()
    }

    pub fn mean(&self) -> f64 {
        if self.recent.is_empty() {
            0.0
        } else {
            self.total / self.recent.len() as f64
        }
    }

    /// True once `window` values have been pushed.
    pub fn is_full(&self) -> bool {
        self.recent.len() == self.capacity
    }
}

/// Moving average in "valid" mode: one output per full window, so the result
/// has `values.len() - window + 1` entries and is empty when the input is
/// shorter than the window.
pub fn smooth_valid(values: &[f64], window: usize) -> Vec<f64> {
    let mut avg = MovingAverage::new(window);
    values
        .iter()
        .filter_map(|&v| {
            let m = avg.push(v);
            avg.is_full().then_some(m)
        })
        .collect()
}
