//! Error types for the captioning pipeline.
//!
//! Errors are split by layer: configuration, the remote vision service, and
//! per-image pipeline failures that carry the offending file path.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for captioner operations.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-image pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required environment variable is not set
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Errors raised by a [`CaptionService`](crate::vision::CaptionService) call.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Non-success HTTP status, or a transport failure after the request
    /// reached the server
    #[error("{message}")]
    Http {
        message: String,
        status_code: Option<u16>,
    },

    /// The service could not be reached (DNS, refused connection, TLS)
    #[error("Could not connect to vision service: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The service answered with a body we could not decode
    #[error("Invalid response from vision service: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// HTTP status code, when the failure came from an HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Pipeline failures, always tagged with the offending path.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The image folder exists but its entries could not be listed
    #[error("Failed to read folder {path}: {source}")]
    FolderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image could not be opened or read
    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the service's upload limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// The vision service rejected or failed the request
    #[error("Vision service error for {path}: {source}")]
    Service {
        path: PathBuf,
        #[source]
        source: ServiceError,
    },
}

/// Convenience type alias for captioner results.
pub type Result<T> = std::result::Result<T, CaptionError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
