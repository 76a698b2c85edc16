//! Retry utilities for transient vision service failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use crate::error::ServiceError;
use std::time::Duration;

/// Determine whether a service error is worth retrying.
///
/// Retryable errors: connection failures, timeouts, rate limits (429),
/// server errors (5xx). Non-retryable: auth failures, bad requests, invalid
/// images.
pub fn is_retryable(error: &ServiceError) -> bool {
    match error {
        ServiceError::Connect(_) | ServiceError::Timeout { .. } => true,
        ServiceError::Http { status_code, .. } => {
            matches!(status_code, Some(code) if *code == 429 || (500..=599).contains(code))
        }
        ServiceError::InvalidResponse(_) => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}
