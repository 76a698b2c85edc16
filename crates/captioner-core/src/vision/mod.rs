//! Vision service integration for caption generation.
//!
//! Provides the [`CaptionService`] abstraction, the Azure Computer Vision
//! client behind it, and retry helpers for transient failures.

pub(crate) mod azure;
pub(crate) mod retry;
pub(crate) mod service;

pub use azure::AzureVisionClient;
pub use retry::{backoff_duration, is_retryable};
pub use service::{
    resolve_env_ref, CaptionService, CaptionServiceFactory, Credentials, DescribeRequest,
};
