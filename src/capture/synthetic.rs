//! Synthetic frame source
//!
//! Produces a moving gradient so the pipeline can run without a camera.

use super::traits::{CaptureError, Frame, FrameSource};

pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    acquired: bool,
    /// Frames to report `NotReady` for after acquire, like a camera warming up
    warmup_frames: u32,
    pending_warmup: u32,
    tick: u32,
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            acquired: false,
            warmup_frames: 0,
            pending_warmup: 0,
            tick: 0,
        }
    }

    pub fn with_warmup(mut self, frames: u32) -> Self {
        self.warmup_frames = frames;
        self
    }

    fn render(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity((self.width * self.height * 3) as usize);
        let shift = self.tick.wrapping_mul(4);
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x * 255) / self.width.max(1)) as u8;
                let g = ((y * 255) / self.height.max(1)) as u8;
                let b = (x.wrapping_add(y).wrapping_add(shift) % 256) as u8;
                data.extend_from_slice(&[r, g, b]);
            }
        }
        data
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn acquire(&mut self, preferred_width: u32, preferred_height: u32) -> Result<(), CaptureError> {
        if self.acquired {
            return Err(CaptureError::AlreadyAcquired);
        }
        if preferred_width == 0 || preferred_height == 0 {
            return Err(CaptureError::DeviceUnavailable(format!(
                "cannot open a {}x{} synthetic stream",
                preferred_width, preferred_height
            )));
        }
        self.width = preferred_width;
        self.height = preferred_height;
        self.pending_warmup = self.warmup_frames;
        self.tick = 0;
        self.acquired = true;
        tracing::info!(
            "Synthetic frame source opened at {}x{}",
            self.width,
            self.height
        );
        Ok(())
    }

    fn current_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.acquired {
            return Err(CaptureError::NotReady);
        }
        if self.pending_warmup > 0 {
            self.pending_warmup -= 1;
            return Err(CaptureError::NotReady);
        }
        self.tick = self.tick.wrapping_add(1);
        Ok(Frame::new(self.width, self.height, self.render()))
    }

    fn release(&mut self) {
        if self.acquired {
            tracing::info!("Synthetic frame source released");
        }
        self.acquired = false;
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}
