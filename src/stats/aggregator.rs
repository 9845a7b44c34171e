//! Per-interval statistics aggregation
//!
//! Samples accumulate in three parallel buffers until `flush` reduces them
//! to an [`IntervalStats`] and starts a fresh interval.

use super::types::{IntervalStats, Sample};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Default)]
pub struct StatsAggregator {
    latencies: Vec<u64>,
    left: Vec<Option<u8>>,
    right: Vec<Option<u8>>,
    frames: u32,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: Sample) {
        self.latencies.push(sample.latency_ms);
        self.left.push(sample.left_digit);
        self.right.push(sample.right_digit);
        self.frames = self.frames.saturating_add(1);
    }

    /// Samples recorded since the last flush
    pub fn pending(&self) -> u32 {
        self.frames
    }

    /// Reduce the current interval and reset all buffers
    pub fn flush(&mut self) -> IntervalStats {
        let stats = IntervalStats {
            frames: self.frames,
            avg_latency_ms: rounded_mean(&self.latencies),
            dominant_left: dominant_value(&self.left).flatten(),
            dominant_right: dominant_value(&self.right).flatten(),
        };
        self.clear();
        stats
    }

    /// Drop buffered samples without producing a summary
    pub fn clear(&mut self) {
        self.latencies.clear();
        self.left.clear();
        self.right.clear();
        self.frames = 0;
    }
}

/// Arithmetic mean rounded to the nearest integer; 0 for no values
pub fn rounded_mean(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let sum: u128 = values.iter().map(|&v| v as u128).sum();
    (sum as f64 / values.len() as f64).round() as u64
}

/// Most frequent value. Ties go to the value inserted first; `None` when empty.
pub fn dominant_value<T>(values: &[T]) -> Option<T>
where
    T: Copy + Eq + Hash,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut first_seen: Vec<T> = Vec::new();
    for &value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            first_seen.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for value in first_seen {
        let count = counts[&value];
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}
