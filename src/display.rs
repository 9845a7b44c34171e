//! Display output port
//!
//! The session core never talks to a UI directly; it pushes updates into a
//! [`DisplaySink`].

use crate::recognition::AnnotatedImage;
use crate::stats::digit_label;
use std::path::PathBuf;

pub trait DisplaySink: Send + Sync {
    fn show_latency(&self, latency_ms: u64);

    fn show_digits(&self, left: Option<u8>, right: Option<u8>);

    fn show_annotated_image(&self, image: &AnnotatedImage);

    fn show_fps(&self, fps: u32);

    /// Running/idle indicator (start and stop controls)
    fn show_running(&self, running: bool);

    /// Something the user should see, like a failed camera start
    fn notify(&self, message: &str);
}

/// Display that reports through `tracing` and can save the latest annotated
/// frame to disk
pub struct ConsoleDisplay {
    annotated_path: Option<PathBuf>,
}

impl ConsoleDisplay {
    pub fn new(annotated_path: Option<PathBuf>) -> Self {
        Self { annotated_path }
    }
}

impl DisplaySink for ConsoleDisplay {
    fn show_latency(&self, latency_ms: u64) {
        tracing::debug!("latency {} ms", latency_ms);
    }

    fn show_digits(&self, left: Option<u8>, right: Option<u8>) {
        tracing::debug!("left {} right {}", digit_label(left), digit_label(right));
    }

    fn show_annotated_image(&self, image: &AnnotatedImage) {
        let Some(path) = &self.annotated_path else {
            return;
        };
        match image.decode_data_uri() {
            Some((_, bytes)) => {
                if let Err(e) = std::fs::write(path, bytes) {
                    tracing::warn!("Failed to save annotated frame to {:?}: {}", path, e);
                }
            }
            None => tracing::debug!("Annotated image is not a data URI: {}", image.as_str()),
        }
    }

    fn show_fps(&self, fps: u32) {
        tracing::info!("{} fps", fps);
    }

    fn show_running(&self, running: bool) {
        tracing::info!("{}", if running { "running" } else { "idle" });
    }

    fn notify(&self, message: &str) {
        tracing::warn!("{}", message);
        eprintln!("{}", message);
    }
}
