//! JPEG frame encoder
//!
//! Rasterizes a raw frame at the active send resolution and compresses it.

use super::traits::{Frame, Resolution};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use thiserror::Error;

/// Default JPEG quality (0-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("frame is empty")]
    EmptyFrame,

    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    quality: u8,
}

impl FrameEncoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode `frame` as JPEG scaled to exactly `resolution`
    pub fn encode(&self, frame: &Frame, resolution: Resolution) -> Result<Vec<u8>, EncodeError> {
        if frame.width == 0 || frame.height == 0 || frame.data.is_empty() {
            return Err(EncodeError::EmptyFrame);
        }

        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.data.len() != expected {
            return Err(EncodeError::SizeMismatch {
                width: frame.width,
                height: frame.height,
                expected,
                actual: frame.data.len(),
            });
        }

        let source = RgbImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or(
            EncodeError::SizeMismatch {
                width: frame.width,
                height: frame.height,
                expected,
                actual: frame.data.len(),
            },
        )?;

        let raster = if source.dimensions() == (resolution.width(), resolution.height()) {
            source
        } else {
            imageops::resize(
                &source,
                resolution.width(),
                resolution.height(),
                FilterType::Triangle,
            )
        };

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality).encode_image(&raster)?;
        Ok(buf)
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}
