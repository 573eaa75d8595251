//! Directory tree backend.
//!
//! Records are partitioned by date under a root directory:
//! `root/2024/03.json` for the month layout, `root/2024/03/15.json` for the
//! day layout. Each file is a JSON array of the records in that partition.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::records::date::PartitionLayout;
use crate::records::FitnessRecord;
use crate::storage::file::write_atomic;
use crate::storage::{encode_records, partition_slice, RecordBackend, StorageError, StorageResult};

pub struct DirectoryTreeBackend {
    root: PathBuf,
    layout: PartitionLayout,
}

impl DirectoryTreeBackend {
    pub fn new(root: impl AsRef<Path>, layout: PartitionLayout) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            layout,
        }
    }

    /// Every `.json` file below the root, sorted by path.
    async fn partition_files(&self) -> StorageResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound && dir == self.root => {
                    tracing::info!(root = %self.root.display(), "Data directory not found, starting empty");
                    return Ok(files);
                }
                Err(e) if dir == self.root => return Err(StorageError::io(&dir, e)),
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
                    continue;
                }
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::io(&dir, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::io(&path, e))?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl RecordBackend for DirectoryTreeBackend {
    fn name(&self) -> &'static str {
        "tree"
    }

    async fn load(&self) -> StorageResult<Vec<FitnessRecord>> {
        let mut records = Vec::new();

        for path in self.partition_files().await? {
            let bytes = match fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable partition");
                    continue;
                }
            };
            match serde_json::from_slice::<Vec<FitnessRecord>>(&bytes) {
                Ok(mut partition) => records.append(&mut partition),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping malformed partition");
                }
            }
        }

        Ok(records)
    }

    async fn persist(&self, records: &[FitnessRecord], changed: &str) -> StorageResult<()> {
        let (partition, members) = partition_slice(records, changed, self.layout)?;
        let path = self.root.join(partition.relative_path());

        write_atomic(&path, &encode_records(&members)?).await?;
        tracing::debug!(path = %path.display(), records = members.len(), "Partition written");
        Ok(())
    }
}
