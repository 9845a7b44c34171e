//! Session state management
//!
//! Defines the session state machine, the live capture settings and the
//! session error type.

use crate::capture::{CaptureError, Resolution};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Current state of the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session; the camera is not held
    #[default]
    Idle,
    /// Capturing and aggregating; the camera is held
    Running,
}

/// Settings read by the pipeline on every cycle and by the aggregation timer
/// on every flush
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSettings {
    pub session_id: String,
    pub resolution: Resolution,
    pub network_label: String,
}

/// Snapshot reported to the front-end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: SessionState,
    pub settings: CaptureSettings,
    /// Samples waiting for the next flush
    pub pending_samples: u32,
    /// Records in the export log
    pub exported_records: usize,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("a session is already running")]
    AlreadyRunning,
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::DeviceUnavailable(message) => SessionError::DeviceUnavailable(message),
            CaptureError::AlreadyAcquired => {
                SessionError::DeviceUnavailable("camera is already in use".to_string())
            }
            CaptureError::NotReady => {
                SessionError::DeviceUnavailable("camera did not become ready".to_string())
            }
        }
    }
}

/// Per-session running flag.
///
/// Anything that must not happen after stop runs inside [`RunningFlag::while_running`],
/// under the flag's lock. [`RunningFlag::clear`] takes the same lock, so once it
/// returns no such section is in progress and none will start.
#[derive(Debug, Clone)]
pub struct RunningFlag(Arc<Mutex<bool>>);

impl RunningFlag {
    /// A new flag, set
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    pub fn is_running(&self) -> bool {
        *self.0.lock()
    }

    /// Clear the flag, waiting for any `while_running` section to finish
    pub fn clear(&self) {
        *self.0.lock() = false;
    }

    /// Run `f` while holding the flag, or return `None` once cleared.
    /// `f` must not call back into `clear`.
    pub fn while_running<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let running = self.0.lock();
        if *running {
            Some(f())
        } else {
            None
        }
    }
}

impl Default for RunningFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn test_cleared_flag_skips_work() {
        let flag = RunningFlag::new();
        assert_eq!(flag.while_running(|| 7), Some(7));

        flag.clear();
        assert!(!flag.is_running());
        assert_eq!(flag.while_running(|| 7), None);
    }

    #[test]
    fn test_clear_waits_for_section_in_progress() {
        let flag = RunningFlag::new();
        let finished = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();

        let worker = {
            let flag = flag.clone();
            let finished = finished.clone();
            std::thread::spawn(move || {
                flag.while_running(|| {
                    entered_tx.send(()).unwrap();
                    std::thread::sleep(Duration::from_millis(100));
                    finished.store(true, Ordering::SeqCst);
                })
            })
        };

        entered_rx.recv().unwrap();
        flag.clear();
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(worker.join().unwrap(), Some(()));
    }
}
