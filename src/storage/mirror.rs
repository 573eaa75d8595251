//! Local backend with a GitHub mirror.
//!
//! Reads come from the primary only. Writes go to the primary first; if that
//! succeeds the same partition is pushed to the mirror. A mirror failure is
//! logged and does not fail the write.

use std::sync::Arc;

use async_trait::async_trait;

use crate::observability::metrics;
use crate::records::FitnessRecord;
use crate::storage::{RecordBackend, StorageResult};

pub struct MirroredBackend {
    primary: Arc<dyn RecordBackend>,
    mirror: Arc<dyn RecordBackend>,
}

impl MirroredBackend {
    pub fn new(primary: Arc<dyn RecordBackend>, mirror: Arc<dyn RecordBackend>) -> Self {
        Self { primary, mirror }
    }
}

#[async_trait]
impl RecordBackend for MirroredBackend {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn load(&self) -> StorageResult<Vec<FitnessRecord>> {
        self.primary.load().await
    }

    async fn persist(&self, records: &[FitnessRecord], changed: &str) -> StorageResult<()> {
        self.primary.persist(records, changed).await?;

        match self.mirror.persist(records, changed).await {
            Ok(()) => metrics::record_storage_write(self.mirror.name(), true),
            Err(e) => {
                metrics::record_storage_write(self.mirror.name(), false);
                tracing::warn!(
                    mirror = self.mirror.name(),
                    date = %changed,
                    error = %e,
                    "Mirror write failed"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryBackend;
    use crate::storage::StorageError;

    struct FailingBackend;

    #[async_trait]
    impl RecordBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn load(&self) -> StorageResult<Vec<FitnessRecord>> {
            Err(StorageError::InvalidToken)
        }

        async fn persist(&self, _: &[FitnessRecord], _: &str) -> StorageResult<()> {
            Err(StorageError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn test_mirror_failure_does_not_fail_write() {
        let primary = Arc::new(MemoryBackend::default());
        let backend = MirroredBackend::new(primary.clone(), Arc::new(FailingBackend));

        let records = vec![FitnessRecord::new("2024-03-15")];
        backend.persist(&records, "2024-03-15").await.unwrap();

        assert_eq!(primary.load().await.unwrap(), records);
        assert_eq!(backend.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_primary_failure_skips_mirror() {
        let mirror = Arc::new(MemoryBackend::default());
        let backend = MirroredBackend::new(Arc::new(FailingBackend), mirror.clone());

        let records = vec![FitnessRecord::new("2024-03-15")];
        assert!(backend.persist(&records, "2024-03-15").await.is_err());
        assert!(mirror.load().await.unwrap().is_empty());
    }
}
