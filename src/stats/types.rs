//! Telemetry sample and summary types

use crate::capture::Resolution;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Outcome of one successful round-trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub latency_ms: u64,
    /// `None` when the recognizer reported no left hand
    pub left_digit: Option<u8>,
    pub right_digit: Option<u8>,
}

/// One interval's reduction of the sample buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalStats {
    pub frames: u32,
    pub avg_latency_ms: u64,
    /// `None` when there was no data or the dominant reading was "no hand"
    pub dominant_left: Option<u8>,
    pub dominant_right: Option<u8>,
}

/// One row of the export log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub timestamp: DateTime<Local>,
    pub session_id: String,
    pub resolution: Resolution,
    pub network_label: String,
    pub frames_per_interval: u32,
    pub avg_latency_ms: u64,
    pub dominant_left_digit: Option<u8>,
    pub dominant_right_digit: Option<u8>,
}

impl SummaryRecord {
    pub fn from_interval(
        timestamp: DateTime<Local>,
        session_id: impl Into<String>,
        resolution: Resolution,
        network_label: impl Into<String>,
        stats: IntervalStats,
    ) -> Self {
        Self {
            timestamp,
            session_id: session_id.into(),
            resolution,
            network_label: network_label.into(),
            frames_per_interval: stats.frames,
            avg_latency_ms: stats.avg_latency_ms,
            dominant_left_digit: stats.dominant_left,
            dominant_right_digit: stats.dominant_right,
        }
    }
}

/// Text shown for a missing digit, on screen and in exports
pub const NO_DIGIT: &str = "-";

pub fn digit_label(digit: Option<u8>) -> String {
    match digit {
        Some(d) => d.to_string(),
        None => NO_DIGIT.to_string(),
    }
}
