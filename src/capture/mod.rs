//! Frame capture and encoding
//!
//! This module provides the camera-side of the pipeline: frame sources and
//! the JPEG encoder that prepares frames for the recognizer.

pub mod encoder;
pub mod synthetic;
pub mod traits;

#[cfg(feature = "webcam")]
pub mod webcam;

pub use encoder::{EncodeError, FrameEncoder};
pub use synthetic::SyntheticFrameSource;
pub use traits::{
    shared_source, CameraInfo, CaptureError, Frame, FrameSource, Resolution, ResolutionError,
    SharedFrameSource,
};

#[cfg(feature = "webcam")]
pub use webcam::WebcamFrameSource;
