//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the chosen backend has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TrackerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{StorageBackendKind, TrackerConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("security.max_body_size must be greater than zero")]
    BodyLimit,

    #[error("storage.path is required for the {0} backend")]
    StoragePath(&'static str),

    #[error("github.{0} is required when GitHub storage is used")]
    GithubField(&'static str),

    #[error("github.api_base {0:?} is not a valid URL")]
    ApiBase(String),

    #[error("github.max_attempts must be at least 1")]
    MaxAttempts,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    let storage = &config.storage;
    match storage.backend {
        StorageBackendKind::File if storage.path.trim().is_empty() => {
            errors.push(ValidationError::StoragePath("file"));
        }
        StorageBackendKind::Tree if storage.path.trim().is_empty() => {
            errors.push(ValidationError::StoragePath("tree"));
        }
        _ => {}
    }

    let uses_github = storage.backend == StorageBackendKind::Github || storage.mirror_to_github;
    if uses_github {
        let github = &config.github;
        if github.owner.trim().is_empty() {
            errors.push(ValidationError::GithubField("owner"));
        }
        if github.repo.trim().is_empty() {
            errors.push(ValidationError::GithubField("repo"));
        }
        if github.token_env.trim().is_empty() {
            errors.push(ValidationError::GithubField("token_env"));
        }
        if url::Url::parse(&github.api_base).is_err() {
            errors.push(ValidationError::ApiBase(github.api_base.clone()));
        }
        if github.max_attempts == 0 {
            errors.push(ValidationError::MaxAttempts);
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
