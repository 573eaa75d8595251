//! In-memory record store.
//!
//! # Responsibilities
//! - Hold the current set of records as an immutable snapshot
//! - Upsert by date (replace in place, else append) and persist the change
//! - Reload everything from the storage backend on demand
//!
//! # Design Decisions
//! - Snapshot lives in an `ArcSwap`; readers clone an `Arc` and scan it
//! - Writers (upsert, reload) are serialized by a single async mutex
//! - Persistence failures are logged; the in-memory write still stands until
//!   the next reload, which replaces the snapshot with what storage holds and
//!   logs every date that disappears

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::records::date;
use crate::records::model::FitnessRecord;
use crate::storage::{RecordBackend, StorageResult};

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    /// No record existed for the date; it was appended.
    Created,
    /// An existing record for the date was replaced.
    Replaced,
}

/// Ordered collection of fitness records backed by a storage adapter.
pub struct RecordStore {
    records: ArcSwap<Vec<FitnessRecord>>,
    backend: Arc<dyn RecordBackend>,
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Create an empty store. Call [`RecordStore::reload`] to populate it.
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            records: ArcSwap::from_pointee(Vec::new()),
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Name of the storage backend, for health output and logs.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Current snapshot of all records.
    pub fn snapshot(&self) -> Arc<Vec<FitnessRecord>> {
        self.records.load_full()
    }

    pub fn len(&self) -> usize {
        self.records.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.load().is_empty()
    }

    /// All records in insertion order.
    pub fn all(&self) -> Vec<FitnessRecord> {
        self.snapshot().as_ref().clone()
    }

    /// The record for an exact date.
    pub fn by_date(&self, date: &str) -> Option<FitnessRecord> {
        self.records
            .load()
            .iter()
            .find(|r| r.date == date)
            .cloned()
    }

    /// Records whose date starts with the given year.
    pub fn by_year(&self, year: i32) -> Vec<FitnessRecord> {
        let prefix = format!("{:04}-", year);
        self.records
            .load()
            .iter()
            .filter(|r| r.date.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Records in the given year and month. Records with unparseable dates
    /// never match.
    pub fn by_month(&self, year: i32, month: u32) -> Vec<FitnessRecord> {
        self.records
            .load()
            .iter()
            .filter(|r| date::in_month(&r.date, year, month))
            .cloned()
            .collect()
    }

    /// Insert or replace the record for `record.date`, then persist.
    pub async fn upsert(&self, record: FitnessRecord) -> Upserted {
        let _guard = self.write_lock.lock().await;

        let mut next = self.records.load().as_ref().clone();
        let changed = record.date.clone();
        let outcome = match next.iter_mut().find(|r| r.date == record.date) {
            Some(existing) => {
                *existing = record;
                Upserted::Replaced
            }
            None => {
                next.push(record);
                Upserted::Created
            }
        };

        let next = Arc::new(next);
        self.records.store(next.clone());
        metrics::record_store_size(next.len());

        tracing::debug!(date = %changed, outcome = ?outcome, "Record upserted");

        match self.backend.persist(&next, &changed).await {
            Ok(()) => metrics::record_storage_write(self.backend.name(), true),
            Err(e) => {
                metrics::record_storage_write(self.backend.name(), false);
                tracing::error!(
                    backend = self.backend.name(),
                    date = %changed,
                    error = %e,
                    "Failed to persist record; keeping in-memory copy"
                );
            }
        }

        outcome
    }

    /// Replace the snapshot with the backend's contents.
    ///
    /// The previous snapshot is kept if loading fails.
    pub async fn reload(&self) -> StorageResult<usize> {
        let _guard = self.write_lock.lock().await;

        let loaded = match self.backend.load().await {
            Ok(records) => dedupe_by_date(records),
            Err(e) => {
                metrics::record_reload(false);
                return Err(e);
            }
        };

        let dropped = dropped_dates(&self.records.load(), &loaded);
        if !dropped.is_empty() {
            // Typically records whose persist failed earlier
            tracing::warn!(
                backend = self.backend.name(),
                dates = ?dropped,
                "Reload dropped records that only existed in memory"
            );
        }

        let count = loaded.len();
        self.records.store(Arc::new(loaded));
        metrics::record_reload(true);
        metrics::record_store_size(count);

        tracing::info!(backend = self.backend.name(), records = count, "Records loaded");
        Ok(count)
    }

    /// Reload if the store is empty. Errors are logged.
    pub async fn ensure_loaded(&self) {
        if !self.is_empty() {
            return;
        }
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Lazy reload failed");
        }
    }
}

/// Dates present in `current` but missing from `loaded`, in `current` order.
pub fn dropped_dates(current: &[FitnessRecord], loaded: &[FitnessRecord]) -> Vec<String> {
    let kept: HashSet<&str> = loaded.iter().map(|r| r.date.as_str()).collect();
    current
        .iter()
        .filter(|r| !kept.contains(r.date.as_str()))
        .map(|r| r.date.clone())
        .collect()
}

/// Collapse records sharing a date. The last occurrence wins and takes the
/// position of the first.
pub fn dedupe_by_date(records: Vec<FitnessRecord>) -> Vec<FitnessRecord> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<FitnessRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&record.date) {
            Some(&i) => out[i] = record,
            None => {
                index.insert(record.date.clone(), out.len());
                out.push(record);
            }
        }
    }
    out
}
