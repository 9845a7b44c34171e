//! Error types and handling
//!
//! Common error types used across the application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::traits::CaptureError;
use crate::config::ConfigError;
use crate::export::types::ExportError;
use crate::recognition::RecognitionError;
use crate::session::state::SessionError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Invalid command: {0}")]
    Command(String),
}

/// Error response for the console and any other front-end
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Capture(_) => "CAPTURE_ERROR",
            AppError::Session(SessionError::DeviceUnavailable(_)) => "DEVICE_UNAVAILABLE",
            AppError::Session(_) => "SESSION_ERROR",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Recognition(_) => "RECOGNITION_ERROR",
            AppError::Command(_) => "COMMAND_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
