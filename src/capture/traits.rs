//! Capture trait definitions
//!
//! Platform-agnostic types for frame sources.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// Resolutions offered for the outgoing frames
    pub const PRESETS: [Resolution; 6] = [
        Resolution { width: 160, height: 120 },
        Resolution { width: 320, height: 240 },
        Resolution { width: 480, height: 360 },
        Resolution { width: 640, height: 480 },
        Resolution { width: 960, height: 720 },
        Resolution { width: 1280, height: 720 },
    ];

    /// Resolution the camera is opened at, independent of the send resolution
    pub const CAPABILITY: Resolution = Resolution { width: 640, height: 480 };

    /// Create a resolution, rejecting zero dimensions
    pub fn new(width: u32, height: u32) -> Result<Self, ResolutionError> {
        if width == 0 || height == 0 {
            return Err(ResolutionError::ZeroDimension { width, height });
        }
        Ok(Self { width, height })
    }

    /// Look up one of the preset resolutions
    pub fn preset(width: u32, height: u32) -> Result<Self, ResolutionError> {
        Self::PRESETS
            .iter()
            .copied()
            .find(|r| r.width == width && r.height == height)
            .ok_or(ResolutionError::NotOffered { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::CAPABILITY
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WxH` and accepts only preset resolutions
impl FromStr for Resolution {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| ResolutionError::Malformed(s.to_string()))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| ResolutionError::Malformed(s.to_string()))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|_| ResolutionError::Malformed(s.to_string()))?;
        Self::new(width, height)?;
        Self::preset(width, height)
    }
}

impl TryFrom<String> for Resolution {
    type Error = ResolutionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("resolution must be WxH, got {0:?}")]
    Malformed(String),

    #[error("resolution {width}x{height} has a zero dimension")]
    ZeroDimension { width: u32, height: u32 },

    #[error("resolution {width}x{height} is not one of the offered presets")]
    NotOffered { width: u32, height: u32 },
}

/// A raw RGB8 frame as delivered by a frame source
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGB8 pixels, row major
    pub data: Vec<u8>,
    pub captured_at: Instant,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
            captured_at: Instant::now(),
        }
    }
}

/// Information about a camera/webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,
}

/// Errors raised by frame sources
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Permission denied, no camera, or the device refused to open
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device has not delivered its first frame yet
    #[error("frame source not ready")]
    NotReady,

    #[error("frame source already acquired")]
    AlreadyAcquired,
}

/// A camera-like source of frames.
///
/// `acquire` is the only call allowed to touch the hardware and is made at
/// most once per session. `current_frame` must not block on the device.
pub trait FrameSource: Send {
    /// Open the device at (or near) the preferred capture size
    fn acquire(&mut self, preferred_width: u32, preferred_height: u32) -> Result<(), CaptureError>;

    /// Latest frame delivered by the device
    fn current_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Free the device. Safe to call repeatedly or without a prior acquire.
    fn release(&mut self);

    fn is_acquired(&self) -> bool;
}

/// Frame source shared between the session controller and the driver
pub type SharedFrameSource = Arc<Mutex<Box<dyn FrameSource>>>;

pub fn shared_source<S: FrameSource + 'static>(source: S) -> SharedFrameSource {
    Arc::new(Mutex::new(Box::new(source)))
}
