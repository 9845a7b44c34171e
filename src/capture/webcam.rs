//! Webcam frame source using nokhwa
//!
//! A capture thread owns the camera and keeps the most recent decoded frame
//! in a shared slot; `current_frame` only copies out of that slot.

use super::traits::{CameraInfo, CaptureError, Frame, FrameSource};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
};
use nokhwa::Camera;
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Get list of available cameras
pub fn get_cameras() -> Vec<CameraInfo> {
    match nokhwa::query(ApiBackend::Auto) {
        Ok(cameras) => cameras
            .into_iter()
            .map(|info| {
                let id = match info.index() {
                    CameraIndex::Index(i) => i.to_string(),
                    CameraIndex::String(s) => s.to_string(),
                };
                CameraInfo {
                    id,
                    name: info.human_name().to_string(),
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to enumerate cameras: {:?}", e);
            Vec::new()
        }
    }
}

/// Webcam source backed by a dedicated capture thread
pub struct WebcamFrameSource {
    /// Device ID/index to capture from (None = default camera)
    device_id: Option<String>,

    /// Cleared to ask the capture thread to exit
    is_capturing: Arc<AtomicBool>,

    /// Most recent decoded frame
    latest: Arc<ParkingMutex<Option<Frame>>>,

    capture_thread: Option<std::thread::JoinHandle<()>>,
}

impl WebcamFrameSource {
    pub fn new(device_id: Option<String>) -> Self {
        Self {
            device_id,
            is_capturing: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(ParkingMutex::new(None)),
            capture_thread: None,
        }
    }

    fn camera_index(&self) -> CameraIndex {
        match &self.device_id {
            Some(id) => match id.parse::<u32>() {
                Ok(idx) => CameraIndex::Index(idx),
                Err(_) => CameraIndex::String(id.clone()),
            },
            None => CameraIndex::Index(0),
        }
    }
}

impl FrameSource for WebcamFrameSource {
    fn acquire(&mut self, preferred_width: u32, preferred_height: u32) -> Result<(), CaptureError> {
        if self.capture_thread.is_some() {
            return Err(CaptureError::AlreadyAcquired);
        }

        let camera_index = self.camera_index();
        let is_capturing = self.is_capturing.clone();
        let latest = self.latest.clone();
        let (opened_tx, opened_rx) = mpsc::channel::<Result<(u32, u32), String>>();

        *latest.lock() = None;
        is_capturing.store(true, Ordering::SeqCst);

        let handle = std::thread::spawn(move || {
            let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
                CameraFormat::new(
                    nokhwa::utils::Resolution::new(preferred_width, preferred_height),
                    FrameFormat::MJPEG,
                    30,
                ),
            ));

            let mut camera = match Camera::new(camera_index.clone(), format) {
                Ok(c) => c,
                Err(e) => {
                    let _ = opened_tx.send(Err(format!("failed to open camera {:?}: {}", camera_index, e)));
                    return;
                }
            };

            if let Err(e) = camera.open_stream() {
                let _ = opened_tx.send(Err(format!("failed to open camera stream: {}", e)));
                return;
            }

            let resolution = camera.camera_format().resolution();
            let _ = opened_tx.send(Ok((resolution.width(), resolution.height())));

            let mut frame_count: u64 = 0;
            while is_capturing.load(Ordering::SeqCst) {
                // Blocks until the camera delivers; the camera sets the pace
                let buffer = match camera.frame() {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::debug!("Failed to capture frame: {:?}", e);
                        continue;
                    }
                };
                match buffer.decode_image::<RgbFormat>() {
                    Ok(image) => {
                        let (width, height) = (image.width(), image.height());
                        *latest.lock() = Some(Frame::new(width, height, image.into_raw()));
                        frame_count += 1;
                    }
                    Err(e) => tracing::debug!("Failed to decode frame: {:?}", e),
                }
            }

            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Error stopping camera stream: {:?}", e);
            }
            tracing::info!("Webcam capture thread stopped after {} frames", frame_count);
        });

        match opened_rx.recv() {
            Ok(Ok((width, height))) => {
                tracing::info!(
                    "Webcam opened at {}x{} (requested {}x{})",
                    width,
                    height,
                    preferred_width,
                    preferred_height
                );
                self.capture_thread = Some(handle);
                Ok(())
            }
            Ok(Err(message)) => {
                self.is_capturing.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(CaptureError::DeviceUnavailable(message))
            }
            Err(_) => {
                self.is_capturing.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(CaptureError::DeviceUnavailable(
                    "capture thread exited before opening the camera".to_string(),
                ))
            }
        }
    }

    fn current_frame(&mut self) -> Result<Frame, CaptureError> {
        self.latest.lock().clone().ok_or(CaptureError::NotReady)
    }

    fn release(&mut self) {
        self.is_capturing.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
            tracing::info!("Webcam released");
        }
        *self.latest.lock() = None;
    }

    fn is_acquired(&self) -> bool {
        self.capture_thread.is_some()
    }
}

impl Drop for WebcamFrameSource {
    fn drop(&mut self) {
        self.release();
    }
}
