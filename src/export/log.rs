//! Append-only log of summary records
//!
//! Survives session stop/start; only an explicit reset empties it.

use crate::stats::SummaryRecord;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ExportLog {
    records: Arc<Mutex<Vec<SummaryRecord>>>,
}

impl ExportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: SummaryRecord) {
        self.records.lock().push(record);
    }

    /// Copy of all records in insertion order
    pub fn snapshot(&self) -> Vec<SummaryRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Remove every record; returns how many were dropped
    pub fn reset(&self) -> usize {
        let mut records = self.records.lock();
        let dropped = records.len();
        records.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Resolution;
    use crate::stats::IntervalStats;
    use chrono::Local;

    fn record(frames: u32) -> SummaryRecord {
        SummaryRecord::from_interval(
            Local::now(),
            "s1",
            Resolution::CAPABILITY,
            "wifi",
            IntervalStats {
                frames,
                ..IntervalStats::default()
            },
        )
    }

    #[test]
    fn test_append_keeps_order_across_clones() {
        let log = ExportLog::new();
        let shared = log.clone();
        log.append(record(1));
        shared.append(record(2));

        let frames: Vec<u32> = log.snapshot().iter().map(|r| r.frames_per_interval).collect();
        assert_eq!(frames, vec![1, 2]);
    }

    #[test]
    fn test_reset_clears_in_bulk() {
        let log = ExportLog::new();
        log.append(record(1));
        log.append(record(2));
        assert_eq!(log.reset(), 2);
        assert!(log.is_empty());
        assert_eq!(log.reset(), 0);
    }
}
