//! Startup orchestration.
//!
//! # Order
//! 1. Build the storage backend from configuration
//! 2. Load existing records (a failed load is logged; the store starts empty
//!    and the next request or refresh tick retries)
//! 3. Hand the store to the HTTP server and refresh task

use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::records::RecordStore;
use crate::storage::{self, StorageResult};

/// Build the record store described by `config` and load it.
pub async fn prepare_store(config: &TrackerConfig) -> StorageResult<Arc<RecordStore>> {
    let backend = storage::build_backend(config)?;
    let store = Arc::new(RecordStore::new(backend));

    if let Err(e) = store.reload().await {
        tracing::error!(
            backend = store.backend_name(),
            error = %e,
            "Initial load failed; starting with an empty store"
        );
    }

    Ok(store)
}
