//! Session controller
//!
//! Owns the session lifecycle: camera acquisition, the pipeline driver task
//! and the aggregation timer.

use super::driver::{PipelineContext, PipelineDriver, DEFAULT_FRAME_PERIOD};
use super::state::{CaptureSettings, RunningFlag, SessionError, SessionState, SessionStatus};
use crate::capture::{FrameEncoder, Resolution, SharedFrameSource};
use crate::display::DisplaySink;
use crate::export::{write_csv, ExportError, ExportLog};
use crate::recognition::Recognizer;
use crate::stats::{StatsAggregator, SummaryRecord};
use chrono::Local;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::RuntimeFlavor;
use tokio::task::JoinHandle;

/// Default aggregation interval
pub const DEFAULT_AGGREGATION_INTERVAL: Duration = Duration::from_secs(1);

/// Timing and encoding knobs for a controller
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub aggregation_interval: Duration,
    pub frame_period: Duration,
    pub encoder: FrameEncoder,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            aggregation_interval: DEFAULT_AGGREGATION_INTERVAL,
            frame_period: DEFAULT_FRAME_PERIOD,
            encoder: FrameEncoder::default(),
        }
    }
}

/// Tasks and flag belonging to the running session
struct ActiveSession {
    /// Fresh per session, so a stale round-trip can never see a later
    /// session's flag
    running: RunningFlag,
    /// Detached on stop; an in-flight round-trip finishes and is discarded
    driver: JoinHandle<()>,
    aggregation: JoinHandle<()>,
}

/// Owns one capture session at a time.
///
/// Call `stop().await` before dropping; dropping a running controller
/// releases the camera synchronously.
pub struct SessionController {
    context: PipelineContext,
    options: ControllerOptions,
    export_log: ExportLog,
    active: Option<ActiveSession>,
}

impl SessionController {
    pub fn new(
        frame_source: SharedFrameSource,
        recognizer: Arc<dyn Recognizer>,
        display: Arc<dyn DisplaySink>,
        settings: CaptureSettings,
        options: ControllerOptions,
    ) -> Self {
        Self {
            context: PipelineContext {
                frame_source,
                recognizer,
                display,
                stats: Arc::new(Mutex::new(StatsAggregator::new())),
                settings: Arc::new(RwLock::new(settings)),
            },
            options,
            export_log: ExportLog::new(),
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    pub fn settings(&self) -> CaptureSettings {
        self.context.settings.read().clone()
    }

    pub fn export_log(&self) -> &ExportLog {
        &self.export_log
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state(),
            settings: self.settings(),
            pending_samples: self.context.stats.lock().pending(),
            exported_records: self.export_log.len(),
        }
    }

    /// Start a session.
    ///
    /// On camera failure nothing is spawned and the state stays `Idle`.
    pub async fn start(
        &mut self,
        session_id: impl Into<String>,
        resolution: Resolution,
    ) -> Result<(), SessionError> {
        if self.active.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        let session_id = session_id.into();
        tracing::info!("Starting session {:?} at {}", session_id, resolution);

        let source = self.context.frame_source.clone();
        let capability = Resolution::CAPABILITY;
        let acquired = tokio::task::spawn_blocking(move || {
            let mut source = source.lock();
            source.acquire(capability.width(), capability.height())
        })
        .await
        .map_err(|e| SessionError::DeviceUnavailable(format!("camera open task failed: {}", e)))
        .and_then(|r| r.map_err(SessionError::from));

        if let Err(e) = acquired {
            tracing::error!("Failed to start session: {}", e);
            self.context
                .display
                .notify(&format!("Camera failed to start: {}", e));
            return Err(e);
        }

        {
            let mut settings = self.context.settings.write();
            settings.session_id = session_id;
            settings.resolution = resolution;
        }
        self.context.stats.lock().clear();

        let running = RunningFlag::new();

        let driver = PipelineDriver::new(
            self.context.clone(),
            running.clone(),
            self.options.encoder,
            self.options.frame_period,
        );
        let driver = tokio::spawn(driver.run());

        let aggregation = tokio::spawn(run_aggregation(
            self.context.clone(),
            self.export_log.clone(),
            running.clone(),
            self.options.aggregation_interval,
        ));

        self.active = Some(ActiveSession {
            running,
            driver,
            aggregation,
        });
        self.context.display.show_running(true);

        tracing::info!("Session started");
        Ok(())
    }

    /// Stop the session. Does nothing when already idle.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            tracing::debug!("Stop requested while idle");
            return;
        };

        tracing::info!("Stopping session");
        // Waits out a result or flush being applied right now
        active.running.clear();
        active.aggregation.abort();
        drop(active.driver);

        let source = self.context.frame_source.clone();
        let released = tokio::task::spawn_blocking(move || {
            let mut source = source.lock();
            source.release();
        })
        .await;
        if let Err(e) = released {
            tracing::error!("Camera release task failed: {}", e);
        }

        self.context.display.show_running(false);
        tracing::info!("Session stopped");
    }

    /// Change the send resolution; an in-flight cycle keeps the old one
    pub fn set_resolution(&self, resolution: Resolution) {
        self.context.settings.write().resolution = resolution;
        tracing::info!("Resolution set to {}", resolution);
    }

    pub fn set_network_label(&self, label: impl Into<String>) {
        let label = label.into();
        tracing::info!("Network label set to {:?}", label);
        self.context.settings.write().network_label = label;
    }

    /// Write the export log as CSV into `output_dir`.
    ///
    /// Returns `Ok(None)` and notifies the user when there is nothing to
    /// export.
    pub fn export(&self, output_dir: &Path) -> Result<Option<PathBuf>, ExportError> {
        let records = self.export_log.snapshot();
        if records.is_empty() {
            self.context.display.notify("No data to export");
            return Ok(None);
        }
        let session_id = self.context.settings.read().session_id.clone();
        write_csv(&records, output_dir, &session_id)
    }

    /// Clear the export log
    pub fn reset_export_log(&self) -> usize {
        let dropped = self.export_log.reset();
        tracing::info!("Export log reset ({} records dropped)", dropped);
        dropped
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.running.clear();
        active.aggregation.abort();

        let source = self.context.frame_source.clone();
        let release = move || {
            source.lock().release();
        };
        // Releasing a webcam joins its capture thread
        match tokio::runtime::Handle::try_current().map(|h| h.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(release),
            _ => release(),
        }
    }
}

/// Flush the aggregator once per interval, first flush one interval after
/// start, until the session stops
async fn run_aggregation(
    context: PipelineContext,
    export_log: ExportLog,
    running: RunningFlag,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    loop {
        ticker.tick().await;

        let flushed = running.while_running(|| {
            let stats = context.stats.lock().flush();
            let settings = context.settings.read().clone();
            let record = SummaryRecord::from_interval(
                Local::now(),
                settings.session_id,
                settings.resolution,
                settings.network_label,
                stats,
            );

            tracing::debug!(
                "Interval: {} frames, {} ms avg",
                stats.frames,
                stats.avg_latency_ms
            );
            context.display.show_fps(stats.frames);
            export_log.append(record);
        });

        if flushed.is_none() {
            break;
        }
    }
}
