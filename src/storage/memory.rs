//! Process-local backend. Nothing survives a restart.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::records::FitnessRecord;
use crate::storage::{RecordBackend, StorageResult};

#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<FitnessRecord>>,
}

impl MemoryBackend {
    /// Start with pre-existing records (duplicates allowed).
    pub fn with_records(records: Vec<FitnessRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> StorageResult<Vec<FitnessRecord>> {
        Ok(self
            .records
            .lock()
            .expect("memory backend mutex poisoned")
            .clone())
    }

    async fn persist(&self, records: &[FitnessRecord], _changed: &str) -> StorageResult<()> {
        *self.records.lock().expect("memory backend mutex poisoned") = records.to_vec();
        Ok(())
    }
}
