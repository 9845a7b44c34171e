//! Remote hand-digit recognition
//!
//! The recognizer is an opaque request/response boundary: one JPEG in,
//! one annotated image plus per-hand digits out.

pub mod client;
pub mod types;

pub use client::{ClientOptions, RecognitionClient, Recognizer, PROXY_BYPASS_HEADER};
pub use types::{AnnotatedImage, HandLabel, HandReading, Recognition, RecognitionError};
