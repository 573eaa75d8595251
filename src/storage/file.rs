//! Single JSON file backend.
//!
//! The whole collection is stored as one pretty-printed JSON array. Writes
//! land in a sibling temp file first and are renamed over the target.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::records::FitnessRecord;
use crate::storage::{encode_records, RecordBackend, StorageError, StorageResult};

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `bytes` to `path` through a temp file and rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)
        .await
        .map_err(|e| StorageError::io(&tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| StorageError::io(path, e))
}

#[async_trait]
impl RecordBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> StorageResult<Vec<FitnessRecord>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Data file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn persist(&self, records: &[FitnessRecord], _changed: &str) -> StorageResult<()> {
        let bytes = encode_records(records)?;
        write_atomic(&self.path, &bytes).await?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "Data file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("fitness.json"));
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested/fitness.json"));

        let records = vec![FitnessRecord::new("2024-03-15"), FitnessRecord::new("2024-03-16")];
        backend.persist(&records, "2024-03-16").await.unwrap();

        assert_eq!(backend.load().await.unwrap(), records);
        assert!(!dir.path().join("nested/fitness.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fitness.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileBackend::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
