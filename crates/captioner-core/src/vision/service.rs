//! Caption service trait, credentials, and the client factory.
//!
//! The vision backend sits behind [`CaptionService`] so the driver can be
//! exercised against an in-memory fake. [`CaptionServiceFactory`] builds the
//! real Azure client from configuration.

use crate::config::{LimitsConfig, ServiceConfig};
use crate::error::{ConfigError, ServiceError};
use crate::types::ImageDescription;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

/// A request to describe one image.
#[derive(Clone)]
pub struct DescribeRequest {
    /// Full image file contents, shared across retry attempts
    pub image: Bytes,
    /// Caption language code (e.g., "en")
    pub language: String,
    /// Maximum number of caption candidates to return
    pub max_candidates: u32,
}

impl fmt::Debug for DescribeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescribeRequest")
            .field("image_bytes", &self.image.len())
            .field("language", &self.language)
            .field("max_candidates", &self.max_candidates)
            .finish()
    }
}

/// Trait that every vision backend implements.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn CaptionService>` for dynamic dispatch).
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Submit image bytes and return the ordered caption candidates.
    async fn describe(&self, request: &DescribeRequest) -> Result<ImageDescription, ServiceError>;
}

/// Resolved service credentials.
#[derive(Clone)]
pub struct Credentials {
    pub region: String,
    pub api_key: String,
}

impl Credentials {
    /// Resolve credentials from the process environment.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using a custom variable lookup.
    ///
    /// The region is resolved before the key, so a run with neither set
    /// reports the region first.
    pub fn resolve_with<F>(config: &ServiceConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = resolve_env_ref(&config.region, "service.region", &lookup)?;
        let api_key = resolve_env_ref(&config.api_key, "service.api_key", &lookup)?;
        Ok(Self { region, api_key })
    }

    /// The region-derived service endpoint.
    pub fn endpoint(&self) -> String {
        format!("https://{}.api.cognitive.microsoft.com/", self.region)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("region", &self.region)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Resolve a `${ENV_VAR}` reference, or pass a literal value through.
///
/// A reference to an unset (or empty) variable fails with
/// [`ConfigError::MissingEnvVar`] naming the variable.
pub fn resolve_env_ref<F>(value: &str, field: &str, lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(var_name) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        lookup(var_name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var_name.to_string()))
    } else if value.is_empty() {
        Err(ConfigError::ValidationError(format!("{field} is empty")))
    } else {
        Ok(value.to_string())
    }
}

/// Factory that builds the caption service from configuration.
pub struct CaptionServiceFactory;

impl CaptionServiceFactory {
    /// Build the Azure client with credentials taken from the environment.
    ///
    /// No network call happens here; a missing variable fails immediately.
    pub fn create(
        service: &ServiceConfig,
        limits: &LimitsConfig,
    ) -> Result<Box<dyn CaptionService>, ConfigError> {
        let credentials = Credentials::from_config(service)?;
        Ok(Self::with_credentials(service, limits, &credentials))
    }

    /// Build the Azure client from already-resolved credentials.
    pub fn with_credentials(
        service: &ServiceConfig,
        limits: &LimitsConfig,
        credentials: &Credentials,
    ) -> Box<dyn CaptionService> {
        let endpoint = service
            .endpoint
            .clone()
            .unwrap_or_else(|| credentials.endpoint());
        tracing::debug!("Vision endpoint: {endpoint}");
        Box::new(super::azure::AzureVisionClient::new(
            &endpoint,
            &credentials.api_key,
            &service.api_version,
            Duration::from_millis(limits.request_timeout_ms),
        ))
    }
}
