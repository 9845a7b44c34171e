//! Recognition request/response types
//!
//! The recognizer answers with an annotated image and zero or more
//! per-hand digit classifications.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Which hand a classification belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandLabel {
    Left,
    Right,
    /// Any label this client does not know about
    #[serde(other)]
    Other,
}

/// One hand classification from the recognizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandReading {
    pub label: HandLabel,
    #[serde(deserialize_with = "digit_from_number_or_text")]
    pub digit: u8,
}

/// The server sends digits as strings ("3"); accept numbers as well
fn digit_from_number_or_text<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u8),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => Ok(n),
        Repr::Text(s) => s
            .trim()
            .parse::<u8>()
            .map_err(|_| serde::de::Error::custom(format!("digit {:?} is not a number", s))),
    }
}

/// Annotated image as returned by the recognizer: a data URI or a plain URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotatedImage(pub String);

impl AnnotatedImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode a base64 `data:` URI into its MIME type and bytes.
    /// Returns `None` for plain URLs and malformed URIs.
    pub fn decode_data_uri(&self) -> Option<(String, Vec<u8>)> {
        let rest = self.0.strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime = meta.strip_suffix(";base64")?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .ok()?;
        Some((mime.to_string(), bytes))
    }
}

/// Parsed recognizer response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub annotated_image: AnnotatedImage,
    pub hands: Vec<HandReading>,
}

impl Recognition {
    /// Digit of the first reading with `label`; later duplicates are ignored
    pub fn digit_for(&self, label: HandLabel) -> Option<u8> {
        self.hands.iter().find(|h| h.label == label).map(|h| h.digit)
    }

    pub fn left_digit(&self) -> Option<u8> {
        self.digit_for(HandLabel::Left)
    }

    pub fn right_digit(&self) -> Option<u8> {
        self.digit_for(HandLabel::Right)
    }
}

/// Wire shape of the response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    image_data: Option<String>,
    hand_data: Option<Vec<HandReading>>,
    error: Option<String>,
}

/// Recognition round-trip failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// Connection, transport, or timeout failure
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx status
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// Body was not the expected JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// 2xx response carrying an `error` field instead of a result
    #[error("recognizer rejected frame: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for RecognitionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RecognitionError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            RecognitionError::Parse(err.to_string())
        } else {
            RecognitionError::Network(err.to_string())
        }
    }
}

/// Parse a 2xx response body
pub fn parse_response(body: &[u8]) -> Result<Recognition, RecognitionError> {
    let parsed: ResponseBody =
        serde_json::from_slice(body).map_err(|e| RecognitionError::Parse(e.to_string()))?;

    if let Some(message) = parsed.error {
        return Err(RecognitionError::Rejected(message));
    }

    let image_data = parsed
        .image_data
        .ok_or_else(|| RecognitionError::Parse("missing imageData".to_string()))?;

    Ok(Recognition {
        annotated_image: AnnotatedImage(image_data),
        hands: parsed.hand_data.unwrap_or_default(),
    })
}
