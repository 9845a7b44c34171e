//! HTTP recognition client
//!
//! Posts one JPEG frame per request as a multipart upload and parses the
//! recognizer's JSON answer.

use super::types::{parse_response, Recognition, RecognitionError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Header that tells ngrok-style tunnels to skip their interstitial page
pub const PROXY_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

/// A remote recognizer that classifies one encoded frame per call
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: Vec<u8>) -> Result<Recognition, RecognitionError>;
}

/// Options for building a [`RecognitionClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Attach [`PROXY_BYPASS_HEADER`] to every request
    pub proxy_bypass: bool,
    /// Overall request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy_bypass: true,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecognitionClient {
    endpoint: String,
    client: reqwest::Client,
    proxy_bypass: bool,
}

impl RecognitionClient {
    pub fn new(endpoint: &str, options: ClientOptions) -> Result<Self, RecognitionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            proxy_bypass: options.proxy_bypass,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Recognizer for RecognitionClient {
    async fn recognize(&self, image: Vec<u8>) -> Result<Recognition, RecognitionError> {
        let part = Part::bytes(image)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if self.proxy_bypass {
            request = request.header(PROXY_BYPASS_HEADER, "true");
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecognitionError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        parse_response(&body)
    }
}
