//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Vision service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service region, used to build the endpoint host (supports ${ENV_VAR} syntax)
    pub region: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Explicit endpoint; overrides the region-derived URL when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Computer Vision REST API version
    pub api_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            region: "${AI_SERVICE_REGION}".to_string(),
            api_key: "${AI_SERVICE_KEY}".to_string(),
            endpoint: None,
            api_version: "v3.2".to_string(),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Folder scanned for images
    pub image_dir: PathBuf,

    /// Supported input formats (matched case-insensitively)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("./images"),
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// Caption request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Caption language
    pub language: String,

    /// Maximum number of caption candidates per image
    pub max_candidates: u32,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_candidates: 1,
        }
    }
}

/// Failure handling across a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max retry attempts for transient service failures (0 disables retry)
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,

    /// Abort the run on the first failed image instead of moving on
    pub fail_fast: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 0,
            retry_delay_ms: 1000,
            fail_fast: false,
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum image size accepted by the describe operation
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            max_file_size_mb: 4,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text" or "jsonl"
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
