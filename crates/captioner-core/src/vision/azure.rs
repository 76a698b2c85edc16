//! Azure Computer Vision client for the describe-image operation.
//!
//! Posts raw image bytes to `vision/{version}/describe` and maps the JSON
//! description into [`ImageDescription`].

use super::service::{CaptionService, DescribeRequest};
use crate::error::ServiceError;
use crate::types::{Caption, ImageDescription};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Azure Computer Vision provider.
pub struct AzureVisionClient {
    api_key: String,
    client: reqwest::Client,
    describe_url: String,
    timeout: Duration,
}

impl AzureVisionClient {
    /// Build a client bound to `endpoint`. Performs no I/O.
    pub fn new(endpoint: &str, api_key: &str, api_version: &str, timeout: Duration) -> Self {
        let describe_url = format!(
            "{}/vision/{}/describe",
            endpoint.trim_end_matches('/'),
            api_version
        );
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            describe_url,
            timeout,
        }
    }

    pub fn describe_url(&self) -> &str {
        &self.describe_url
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeResponse {
    description: Option<DescriptionBody>,
    request_id: Option<String>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct DescriptionBody {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    captions: Vec<CaptionBody>,
}

#[derive(Deserialize)]
struct CaptionBody {
    text: String,
    confidence: f64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl From<DescribeResponse> for ImageDescription {
    fn from(resp: DescribeResponse) -> Self {
        let (tags, captions) = match resp.description {
            Some(body) => (
                body.tags,
                body.captions
                    .into_iter()
                    .map(|c| Caption::new(c.text, c.confidence))
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        ImageDescription {
            captions,
            tags,
            request_id: resp.request_id,
            model_version: resp.model_version,
        }
    }
}

/// Turn a non-success body into a readable message, preferring the
/// service's `{"error": {"code", "message"}}` envelope.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => format!("HTTP {status}: {} ({})", err.error.message, err.error.code),
        Err(_) if body.is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

#[async_trait]
impl CaptionService for AzureVisionClient {
    fn name(&self) -> &str {
        "azure"
    }

    async fn describe(&self, request: &DescribeRequest) -> Result<ImageDescription, ServiceError> {
        let start = Instant::now();

        let resp = self
            .client
            .post(&self.describe_url)
            .query(&[
                ("maxCandidates", request.max_candidates.to_string()),
                ("language", request.language.clone()),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(request.image.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout {
                        timeout_ms: self.timeout_ms(),
                    }
                } else if e.is_connect() {
                    ServiceError::Connect(e.to_string())
                } else {
                    ServiceError::Http {
                        message: format!("Vision request failed: {e}"),
                        status_code: None,
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Http {
                message: error_message(status, &text),
                status_code: Some(status.as_u16()),
            });
        }

        let body: DescribeResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        let description = ImageDescription::from(body);
        tracing::debug!(
            "Described image in {}ms ({} caption(s), request {:?})",
            start.elapsed().as_millis(),
            description.captions.len(),
            description.request_id
        );
        Ok(description)
    }
}
