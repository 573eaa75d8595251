use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record date {0:?} is not a valid YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("GitHub token missing: environment variable {0} is not set")]
    MissingToken(String),

    #[error("GitHub token is not a valid header value")]
    InvalidToken,

    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {path}")]
    Remote { status: u16, path: String },

    #[error("SHA conflict on {path} persisted after {attempts} attempts")]
    Conflict { path: String, attempts: u32 },

    #[error("content of {path} is not valid base64: {source}")]
    Decode {
        path: String,
        #[source]
        source: base64::DecodeError,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
