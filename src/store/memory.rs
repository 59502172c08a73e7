//! Process-local document store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{newest_first, StatusCheckDocument, StatusStore, StoreError};

/// In-memory store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<StatusCheckDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn insert(&self, doc: StatusCheckDocument) -> Result<(), StoreError> {
        self.docs.write().await.push(doc);
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<StatusCheckDocument>, StoreError> {
        let docs = self.docs.read().await;
        Ok(newest_first(&docs, limit))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StatusCheck;

    #[tokio::test]
    async fn test_insert_and_find_recent() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        for name in ["first", "second", "third"] {
            let doc = StatusCheck::new(name).to_document("tester");
            store.insert(doc).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let recent = store.find_recent(2).await.unwrap();
        assert_eq!(store.len().await, 3);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].client_name, "third");
        assert_eq!(recent[1].client_name, "second");
        assert!(store.ping().await.is_ok());
    }
}
