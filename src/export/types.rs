//! Export types
//!
//! Error type and header layout for telemetry exports.

use thiserror::Error;

/// Column header of the exported table
pub const CSV_HEADER: [&str; 8] = [
    "Time",
    "Session",
    "Resolution",
    "NetworkLabel",
    "FPS",
    "Latency(ms)",
    "Left",
    "Right",
];

/// Prefix of exported file names; the session id follows it
pub const EXPORT_FILE_PREFIX: &str = "final_data_";

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Output directory not found: {0}")]
    OutputDirNotFound(String),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(e: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        ExportError::Io(e.into_error())
    }
}
