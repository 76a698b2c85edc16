//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::{Config, SUPPORTED_LANGUAGES};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.caption.max_candidates == 0 {
            return Err(ConfigError::ValidationError(
                "caption.max_candidates must be > 0".into(),
            ));
        }
        if !SUPPORTED_LANGUAGES.contains(&self.caption.language.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "caption.language must be one of {}, got '{}'",
                SUPPORTED_LANGUAGES.join(", "),
                self.caption.language
            )));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.service.api_version.is_empty() {
            return Err(ConfigError::ValidationError(
                "service.api_version must not be empty".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be 'text' or 'jsonl', got '{}'",
                self.output.format
            )));
        }
        Ok(())
    }
}
