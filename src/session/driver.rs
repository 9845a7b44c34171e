//! Frame pipeline driver
//!
//! Runs capture → encode → recognize → apply, one cycle per frame-clock
//! tick and never more than one request in flight. A slow recognizer slows
//! capture down with it.

use super::state::{CaptureSettings, RunningFlag};
use crate::capture::{CaptureError, EncodeError, FrameEncoder, SharedFrameSource};
use crate::display::DisplaySink;
use crate::recognition::{RecognitionError, Recognizer};
use crate::stats::{Sample, StatsAggregator};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Default frame clock, one cycle per displayed frame at 60 Hz
pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_micros(16_667);

/// Handles shared by the controller, the driver and the aggregation timer
#[derive(Clone)]
pub struct PipelineContext {
    pub frame_source: SharedFrameSource,
    pub recognizer: Arc<dyn Recognizer>,
    pub display: Arc<dyn DisplaySink>,
    pub stats: Arc<Mutex<StatsAggregator>>,
    pub settings: Arc<RwLock<CaptureSettings>>,
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The session was stopped before a request was sent
    Stopped,
    /// No frame available yet
    NotReady,
    EncodeFailed,
    RecognitionFailed(RecognitionError),
    /// A result arrived after stop and was dropped
    Discarded,
    Applied(Sample),
}

#[derive(Debug)]
enum PrepareError {
    Capture(CaptureError),
    Encode(EncodeError),
    Task(String),
}

pub struct PipelineDriver {
    context: PipelineContext,
    running: RunningFlag,
    encoder: FrameEncoder,
    frame_period: Duration,
}

impl PipelineDriver {
    pub fn new(
        context: PipelineContext,
        running: RunningFlag,
        encoder: FrameEncoder,
        frame_period: Duration,
    ) -> Self {
        Self {
            context,
            running,
            encoder,
            frame_period,
        }
    }

    /// Drive cycles until the running flag is cleared
    pub async fn run(self) {
        tracing::info!("Pipeline driver started");

        let mut ticker = tokio::time::interval(self.frame_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut cycles: u64 = 0;
        loop {
            ticker.tick().await;
            if !self.running.is_running() {
                break;
            }
            if self.run_cycle().await == CycleOutcome::Stopped {
                break;
            }
            cycles += 1;
        }

        tracing::info!("Pipeline driver stopped after {} cycles", cycles);
    }

    /// Run one capture/encode/recognize/apply cycle.
    ///
    /// The sample and display updates are applied under the running flag,
    /// so nothing lands once `stop` has cleared it.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if !self.running.is_running() {
            return CycleOutcome::Stopped;
        }

        // Read once so a resolution change lands on the next cycle
        let resolution = self.context.settings.read().resolution;

        let source = self.context.frame_source.clone();
        let encoder = self.encoder;
        let prepared = tokio::task::spawn_blocking(move || {
            let frame = source.lock().current_frame().map_err(PrepareError::Capture)?;
            let age = frame.captured_at.elapsed();
            encoder
                .encode(&frame, resolution)
                .map(|image| (image, age))
                .map_err(PrepareError::Encode)
        })
        .await
        .unwrap_or_else(|e| Err(PrepareError::Task(e.to_string())));

        let (image, frame_age) = match prepared {
            Ok(prepared) => prepared,
            Err(PrepareError::Capture(CaptureError::NotReady)) => return CycleOutcome::NotReady,
            Err(PrepareError::Capture(e)) => {
                tracing::warn!("Frame capture failed: {}", e);
                return CycleOutcome::NotReady;
            }
            Err(PrepareError::Encode(e)) => {
                tracing::warn!("Skipping frame: {}", e);
                return CycleOutcome::EncodeFailed;
            }
            Err(PrepareError::Task(e)) => {
                tracing::error!("Encode task failed: {}", e);
                return CycleOutcome::EncodeFailed;
            }
        };

        // Capture can outlast a stop; don't send for a session that is gone
        if !self.running.is_running() {
            tracing::debug!("Session stopped during capture, frame not sent");
            return CycleOutcome::Stopped;
        }

        tracing::debug!(
            "Sending {} byte frame at {} ({} ms old)",
            image.len(),
            resolution,
            frame_age.as_millis()
        );
        let started = Instant::now();
        let result = self.context.recognizer.recognize(image).await;
        let latency_ms = (started.elapsed().as_secs_f64() * 1000.0).round() as u64;

        let recognition = match result {
            Ok(recognition) => recognition,
            Err(e) if self.running.is_running() => {
                tracing::error!("Recognition failed: {}", e);
                return CycleOutcome::RecognitionFailed(e);
            }
            Err(_) => return CycleOutcome::Discarded,
        };

        let sample = Sample {
            latency_ms,
            left_digit: recognition.left_digit(),
            right_digit: recognition.right_digit(),
        };
        let applied = self.running.while_running(|| {
            self.context.stats.lock().record(sample);

            let display = &self.context.display;
            display.show_latency(latency_ms);
            display.show_annotated_image(&recognition.annotated_image);
            display.show_digits(sample.left_digit, sample.right_digit);
        });

        match applied {
            Some(()) => CycleOutcome::Applied(sample),
            None => {
                tracing::debug!("Discarding result that arrived after stop");
                CycleOutcome::Discarded
            }
        }
    }
}
