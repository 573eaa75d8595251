//! Retry classification for remote store calls.
//!
//! # Retryable
//! - 409 Conflict / 422 Unprocessable Entity: the SHA we sent is stale
//! - 429 Too Many Requests and any 5xx
//! - Connect errors and timeouts
//!
//! Everything else (401, 403, 404 on write, malformed requests) fails fast.

use reqwest::StatusCode;

use crate::config::schema::GithubConfig;
use crate::storage::StorageError;

/// Bounds for a retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &GithubConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

/// The write was rejected because the object changed underneath us.
pub fn is_conflict(status: StatusCode) -> bool {
    status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    is_conflict(status) || status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Transient failure of a read made on the way to a write.
pub fn is_retryable_storage_error(error: &StorageError) -> bool {
    match error {
        StorageError::Remote { status, .. } => StatusCode::from_u16(*status)
            .map(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error())
            .unwrap_or(false),
        StorageError::Http(e) => is_retryable_error(e),
        _ => false,
    }
}
