//! Application configuration
//!
//! Settings come from built-in defaults, an optional JSON file and finally
//! command-line flags, in that order of precedence.

use crate::capture::{FrameEncoder, Resolution};
use crate::recognition::ClientOptions;
use crate::session::{CaptureSettings, ControllerOptions};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where frames come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Generated test pattern
    #[default]
    Synthetic,
    /// Physical camera (requires the `webcam` feature)
    Webcam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Recognizer URL frames are posted to
    pub endpoint: String,
    /// Free-text session label; a random one is generated when absent
    pub session_id: Option<String>,
    /// Free-text network annotation (wifi, 4G, ...)
    pub network_label: String,
    pub resolution: Resolution,
    pub aggregation_interval_ms: u64,
    pub frame_rate_hz: u32,
    pub jpeg_quality: u8,
    /// Send the tunnel interstitial bypass header
    pub proxy_bypass: bool,
    /// No timeout when absent
    pub request_timeout_ms: Option<u64>,
    pub output_dir: PathBuf,
    pub source: SourceKind,
    pub camera_id: Option<String>,
    /// Where to save the latest annotated frame, if anywhere
    pub annotated_image_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/recognize".to_string(),
            session_id: None,
            network_label: "unknown".to_string(),
            resolution: Resolution::CAPABILITY,
            aggregation_interval_ms: 1000,
            frame_rate_hz: 60,
            jpeg_quality: crate::capture::encoder::DEFAULT_JPEG_QUALITY,
            proxy_bypass: true,
            request_timeout_ms: None,
            output_dir: PathBuf::from("."),
            source: SourceKind::Synthetic,
            camera_id: None,
            annotated_image_path: None,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; missing keys fall back to defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("endpoint {:?} is not a URL: {}", self.endpoint, e))
        })?;
        if self.aggregation_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "aggregationIntervalMs must be positive".to_string(),
            ));
        }
        if self.frame_rate_hz == 0 {
            return Err(ConfigError::Invalid("frameRateHz must be positive".to_string()));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "requestTimeoutMs must be positive when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured session id, or a short random one
    pub fn resolve_session_id(&self) -> String {
        match &self.session_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => uuid::Uuid::new_v4().simple().to_string()[..8].to_string(),
        }
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            session_id: self.resolve_session_id(),
            resolution: self.resolution,
            network_label: self.network_label.clone(),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            aggregation_interval: Duration::from_millis(self.aggregation_interval_ms),
            frame_period: Duration::from_secs_f64(1.0 / self.frame_rate_hz.max(1) as f64),
            encoder: FrameEncoder::new(self.jpeg_quality),
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            proxy_bypass: self.proxy_bypass,
            timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Command-line flags
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "handcount", version, about)]
pub struct CliArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Recognizer URL
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub session_id: Option<String>,

    #[arg(long)]
    pub network_label: Option<String>,

    /// Send resolution, e.g. 640x480
    #[arg(long)]
    pub resolution: Option<Resolution>,

    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    #[arg(long)]
    pub camera_id: Option<String>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long)]
    pub request_timeout_ms: Option<u64>,

    /// Do not send the tunnel interstitial bypass header
    #[arg(long)]
    pub no_proxy_bypass: bool,

    /// Save the latest annotated frame to this file
    #[arg(long)]
    pub annotated_image: Option<PathBuf>,

    /// Start a session immediately
    #[arg(long)]
    pub autostart: bool,
}

impl CliArgs {
    /// Load the config file (if any) and apply flag overrides
    pub fn resolve(&self) -> Result<AppConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        let config = self.apply(base);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(session_id) = &self.session_id {
            config.session_id = Some(session_id.clone());
        }
        if let Some(label) = &self.network_label {
            config.network_label = label.clone();
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(camera_id) = &self.camera_id {
            config.camera_id = Some(camera_id.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.request_timeout_ms = Some(timeout);
        }
        if self.no_proxy_bypass {
            config.proxy_bypass = false;
        }
        if let Some(path) = &self.annotated_image {
            config.annotated_image_path = Some(path.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.resolution.to_string(), "640x480");
        assert!(config.proxy_bypass);
        assert_eq!(config.request_timeout_ms, None);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"endpoint": "https://abc.ngrok-free.app/recognize", "resolution": "320x240"}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.endpoint, "https://abc.ngrok-free.app/recognize");
        assert_eq!(config.resolution, Resolution::preset(320, 240).unwrap());
        assert_eq!(config.aggregation_interval_ms, 1000);
    }

    #[test]
    fn test_file_with_unoffered_resolution_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"resolution": "333x222"}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"networkLabel": "wifi", "proxyBypass": true}"#).unwrap();

        let args = CliArgs::parse_from([
            "handcount",
            "--config",
            path.to_str().unwrap(),
            "--network-label",
            "5G",
            "--no-proxy-bypass",
            "--resolution",
            "1280x720",
        ]);
        let config = args.resolve().unwrap();
        assert_eq!(config.network_label, "5G");
        assert!(!config.proxy_bypass);
        assert_eq!(config.resolution.to_string(), "1280x720");
    }

    #[test]
    fn test_validation_errors() {
        let config = AppConfig {
            endpoint: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig {
            frame_rate_hz: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_session_id_generation() {
        let config = AppConfig {
            session_id: Some("  run-7 ".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_session_id(), "run-7");

        let generated = AppConfig::default().resolve_session_id();
        assert_eq!(generated.len(), 8);
    }

    #[test]
    fn test_frame_period_from_rate() {
        let config = AppConfig {
            frame_rate_hz: 50,
            ..AppConfig::default()
        };
        assert_eq!(config.controller_options().frame_period, Duration::from_millis(20));
    }
}
