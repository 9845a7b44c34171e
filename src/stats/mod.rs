//! Latency and classification telemetry

pub mod aggregator;
pub mod types;

pub use aggregator::{dominant_value, rounded_mean, StatsAggregator};
pub use types::{digit_label, IntervalStats, Sample, SummaryRecord, NO_DIGIT};
