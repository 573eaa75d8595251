//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! RecordStore::upsert
//!     → RecordBackend::persist(all records, changed date)
//!         memory.rs  (kept in process only)
//!         file.rs    (one JSON array file)
//!         tree.rs    (root/YYYY/MM.json or root/YYYY/MM/DD.json)
//!         github.rs  (same layout in a GitHub repo via the Contents API)
//!         mirror.rs  (local backend first, then GitHub)
//!
//! RecordStore::reload
//!     → RecordBackend::load() → Vec<FitnessRecord>
//! ```
//!
//! # Design Decisions
//! - Partitioned backends rewrite only the partition holding the changed date
//! - Unreadable partitions are skipped with a warning during load
//! - Backend choice is configuration, not code

pub mod error;
pub mod file;
pub mod github;
pub mod memory;
pub mod mirror;
pub mod tree;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::schema::{StorageBackendKind, TrackerConfig};
use crate::records::date::{Partition, PartitionLayout};
use crate::records::FitnessRecord;

pub use error::{StorageError, StorageResult};

/// A place fitness records are loaded from and written to.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Short backend name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Load every stored record. Duplicates are resolved by the caller.
    async fn load(&self) -> StorageResult<Vec<FitnessRecord>>;

    /// Persist after the record for `changed` was inserted or replaced.
    /// `records` is the complete current collection.
    async fn persist(&self, records: &[FitnessRecord], changed: &str) -> StorageResult<()>;
}

/// Records belonging to the partition of `changed`, plus that partition.
pub(crate) fn partition_slice(
    records: &[FitnessRecord],
    changed: &str,
    layout: PartitionLayout,
) -> StorageResult<(Partition, Vec<FitnessRecord>)> {
    let partition = Partition::of(changed, layout)
        .ok_or_else(|| StorageError::InvalidDate(changed.to_string()))?;
    let members = records
        .iter()
        .filter(|r| partition.contains(&r.date))
        .cloned()
        .collect();
    Ok((partition, members))
}

/// Serialize records the way every backend stores them.
pub(crate) fn encode_records(records: &[FitnessRecord]) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// Build the backend described by the configuration.
pub fn build_backend(config: &TrackerConfig) -> StorageResult<Arc<dyn RecordBackend>> {
    let storage = &config.storage;

    let primary: Arc<dyn RecordBackend> = match storage.backend {
        StorageBackendKind::Memory => Arc::new(memory::MemoryBackend::default()),
        StorageBackendKind::File => Arc::new(file::JsonFileBackend::new(&storage.path)),
        StorageBackendKind::Tree => Arc::new(tree::DirectoryTreeBackend::new(
            &storage.path,
            storage.layout,
        )),
        StorageBackendKind::Github => {
            let client = github::GithubClient::from_env(&config.github)?;
            return Ok(Arc::new(github::GithubBackend::new(
                client,
                &config.github,
                storage.layout,
            )));
        }
    };

    if !storage.mirror_to_github {
        return Ok(primary);
    }

    match github::GithubClient::from_env(&config.github) {
        Ok(client) => {
            tracing::info!(
                owner = %config.github.owner,
                repo = %config.github.repo,
                "Mirroring writes to GitHub"
            );
            let remote = github::GithubBackend::new(client, &config.github, storage.layout);
            Ok(Arc::new(mirror::MirroredBackend::new(primary, Arc::new(remote))))
        }
        Err(StorageError::MissingToken(var)) => {
            tracing::warn!(token_env = %var, "GitHub token not set; mirror disabled");
            Ok(primary)
        }
        Err(e) => Err(e),
    }
}
