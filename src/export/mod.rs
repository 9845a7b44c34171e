//! Telemetry export module
//!
//! This module keeps the append-only log of per-interval summaries and
//! writes it out as a CSV table.

pub mod csv_file;
pub mod log;
pub mod types;

pub use csv_file::{export_file_name, format_csv, write_csv};
pub use log::ExportLog;
pub use types::{ExportError, CSV_HEADER, EXPORT_FILE_PREFIX};
