//! Capture session module
//!
//! This module implements the session lifecycle and the frame pipeline:
//! - SessionController to start/stop sessions and own the camera
//! - PipelineDriver for the paced capture/recognize loop
//! - the aggregation timer feeding the export log

pub mod controller;
pub mod driver;
pub mod state;

pub use controller::{ControllerOptions, SessionController, DEFAULT_AGGREGATION_INTERVAL};
pub use driver::{CycleOutcome, PipelineContext, PipelineDriver, DEFAULT_FRAME_PERIOD};
pub use state::{CaptureSettings, RunningFlag, SessionError, SessionState, SessionStatus};
