//! JSON-file document store.
//!
//! Documents are kept in memory and written through to `<dir>/<name>.status_checks.json`
//! on every insert. Writes go to a temporary file that is renamed over the data file, so
//! a crash mid-write leaves the previous contents intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{newest_first, StatusCheckDocument, StatusStore, StoreError};

pub struct FileStore {
    dir: PathBuf,
    path: PathBuf,
    docs: RwLock<Vec<StatusCheckDocument>>,
}

impl FileStore {
    /// Open (or create) the store under `dir`, loading existing documents.
    pub async fn open(dir: impl Into<PathBuf>, name: &str) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("{}.status_checks.json", name));

        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = ?path, documents = docs.len(), "Loaded status checks from file");

        Ok(Self {
            dir,
            path,
            docs: RwLock::new(docs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, docs: &[StatusCheckDocument]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(docs)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore for FileStore {
    async fn insert(&self, doc: StatusCheckDocument) -> Result<(), StoreError> {
        // The write guard is held across the file write so persists never interleave.
        let mut docs = self.docs.write().await;
        docs.push(doc);
        if let Err(e) = self.persist(&docs).await {
            docs.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<StatusCheckDocument>, StoreError> {
        let docs = self.docs.read().await;
        Ok(newest_first(&docs, limit))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let meta = tokio::fs::metadata(&self.dir).await?;
        if !meta.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StatusCheck;

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path(), "status_api").await.unwrap();
        let check = StatusCheck::new("Memorial Bench 12");
        store.insert(check.to_document("tester")).await.unwrap();
        assert!(store.path().exists());

        let reopened = FileStore::open(dir.path(), "status_api").await.unwrap();
        let docs = reopened.find_recent(10).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, check.id);
        assert_eq!(docs[0].authenticated_user, "tester");
    }

    #[tokio::test]
    async fn test_ping_fails_when_directory_removed() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = FileStore::open(&data_dir, "status_api").await.unwrap();
        assert!(store.ping().await.is_ok());

        std::fs::remove_dir_all(&data_dir).unwrap();
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("status_api.status_checks.json"), b"{not json").unwrap();

        let result = FileStore::open(dir.path(), "status_api").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
