//! handcount - live camera client for a remote hand-digit recognizer.
//!
//! Frames are captured, JPEG-encoded and posted to the recognizer one at a
//! time; per-second latency and digit statistics are collected for CSV
//! export.

pub mod capture;
pub mod commands;
pub mod config;
pub mod display;
pub mod export;
pub mod recognition;
pub mod session;
pub mod stats;
pub mod utils;

use capture::{shared_source, SharedFrameSource, SyntheticFrameSource};
use config::{AppConfig, CliArgs, SourceKind};
use display::ConsoleDisplay;
use recognition::RecognitionClient;
use session::SessionController;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::error::AppResult;

/// Install the tracing subscriber
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handcount=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_frame_source(config: &AppConfig) -> AppResult<SharedFrameSource> {
    match config.source {
        SourceKind::Synthetic => Ok(shared_source(SyntheticFrameSource::new())),
        #[cfg(feature = "webcam")]
        SourceKind::Webcam => Ok(shared_source(capture::WebcamFrameSource::new(
            config.camera_id.clone(),
        ))),
        #[cfg(not(feature = "webcam"))]
        SourceKind::Webcam => Err(capture::CaptureError::DeviceUnavailable(
            "this build has no webcam support (enable the `webcam` feature)".to_string(),
        )
        .into()),
    }
}

/// Build the session from `args` and serve console commands until quit
pub async fn run(args: CliArgs) -> AppResult<()> {
    tracing::info!("Starting handcount v{}", env!("CARGO_PKG_VERSION"));

    let config = args.resolve()?;
    let frame_source = build_frame_source(&config)?;
    let recognizer = RecognitionClient::new(&config.endpoint, config.client_options())?;
    tracing::info!("Recognizer endpoint: {}", recognizer.endpoint());

    let display = Arc::new(ConsoleDisplay::new(config.annotated_image_path.clone()));
    let mut controller = SessionController::new(
        frame_source,
        Arc::new(recognizer),
        display,
        config.capture_settings(),
        config.controller_options(),
    );

    if args.autostart {
        let settings = controller.settings();
        controller.start(settings.session_id, settings.resolution).await?;
    }

    println!("{}", commands::HELP);
    commands::run_console(&mut controller, &config).await
}
