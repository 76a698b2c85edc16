//! Caption requester: one image in, one description out.

use std::path::Path;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::ImageDescription;
use crate::vision::{backoff_duration, is_retryable, CaptionService, DescribeRequest};

/// Per-image request parameters.
#[derive(Debug, Clone)]
pub struct DescribeOptions {
    /// Caption language
    pub language: String,
    /// Maximum caption candidates
    pub max_candidates: u32,
    /// Retries for transient service failures (0 = single attempt)
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Reject files larger than this before uploading
    pub max_file_size_mb: u64,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_candidates: 1,
            retry_attempts: 0,
            retry_delay_ms: 1000,
            max_file_size_mb: 4,
        }
    }
}

impl DescribeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.caption.language.clone(),
            max_candidates: config.caption.max_candidates,
            retry_attempts: config.pipeline.retry_attempts,
            retry_delay_ms: config.pipeline.retry_delay_ms,
            max_file_size_mb: config.limits.max_file_size_mb,
        }
    }
}

/// Read an image and ask the service to describe it.
///
/// The file is read fully and closed before the request is sent. Local read
/// failures never reach the service. Service failures are retried only when
/// `retry_attempts > 0` and the error is transient.
pub async fn caption_image(
    service: &dyn CaptionService,
    path: &Path,
    options: &DescribeOptions,
) -> PipelineResult<ImageDescription> {
    let image = read_image(path, options.max_file_size_mb).await?;
    let request = DescribeRequest {
        image: Bytes::from(image),
        language: options.language.clone(),
        max_candidates: options.max_candidates,
    };

    let mut attempt = 0;
    loop {
        match service.describe(&request).await {
            Ok(description) => return Ok(description),
            Err(e) if attempt < options.retry_attempts && is_retryable(&e) => {
                let delay = backoff_duration(attempt, options.retry_delay_ms);
                attempt += 1;
                tracing::debug!(
                    "Retry {attempt}/{} for {:?} after {delay:?}: {e}",
                    options.retry_attempts,
                    path
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(PipelineError::Service {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
    }
}

async fn read_image(path: &Path, max_file_size_mb: u64) -> PipelineResult<Vec<u8>> {
    let read_err = |source: std::io::Error| PipelineError::ImageRead {
        path: path.to_path_buf(),
        source,
    };

    let size = tokio::fs::metadata(path).await.map_err(read_err)?.len();
    let max_bytes = max_file_size_mb.saturating_mul(1024 * 1024);
    if size > max_bytes {
        return Err(PipelineError::FileTooLarge {
            path: path.to_path_buf(),
            size_mb: size.div_ceil(1024 * 1024),
            max_mb: max_file_size_mb,
        });
    }

    tokio::fs::read(path).await.map_err(read_err)
}
