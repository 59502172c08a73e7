//! Document store for status checks.
//!
//! # Data Flow
//! ```text
//! handlers
//!     → StatusStore::insert / find_recent / ping
//!     → memory.rs (process-local, default)
//!     → file.rs (JSON document file, write-through)
//! ```
//!
//! # Design Decisions
//! - Handlers only see the `StatusStore` trait; the backend is picked from `database.url`
//! - Store calls run after the request pipeline has released every limiter guard
//! - Timestamps are stored as ISO-8601 strings and ordered by their parsed value

pub mod file;
pub mod memory;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use types::{StatusCheck, StatusCheckDocument};

/// Errors raised by store backends. Details are for logs, never for clients.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Operations the API needs from a document store.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Persist one document.
    async fn insert(&self, doc: StatusCheckDocument) -> Result<(), StoreError>;

    /// Up to `limit` documents, newest timestamp first.
    async fn find_recent(&self, limit: usize) -> Result<Vec<StatusCheckDocument>, StoreError>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Where documents live, parsed from `database.url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    File(PathBuf),
}

impl StoreLocation {
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        if url == "memory" || url == "memory://" {
            return Some(StoreLocation::Memory);
        }
        match url.strip_prefix("file://") {
            Some(path) if !path.is_empty() => Some(StoreLocation::File(PathBuf::from(path))),
            _ => None,
        }
    }
}

/// Open the store described by `config`.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn StatusStore>, StoreError> {
    let location = StoreLocation::parse(&config.url)
        .ok_or_else(|| StoreError::Unavailable(format!("unsupported url {:?}", config.url)))?;

    if config.tls.enabled {
        tracing::warn!(
            backend = ?location,
            "TLS options are set but the configured store is local; they are not used"
        );
    }

    let store: Arc<dyn StatusStore> = match location {
        StoreLocation::Memory => Arc::new(MemoryStore::new()),
        StoreLocation::File(dir) => Arc::new(FileStore::open(dir, &config.name).await?),
    };

    tracing::info!(
        backend = store.backend(),
        database = %config.name,
        "Document store ready"
    );
    Ok(store)
}

/// Sort newest first and keep at most `limit` documents.
pub(crate) fn newest_first(
    docs: &[StatusCheckDocument],
    limit: usize,
) -> Vec<StatusCheckDocument> {
    let mut sorted: Vec<_> = docs.iter().collect();
    sorted.sort_by(|a, b| b.parsed_timestamp().cmp(&a.parsed_timestamp()));
    sorted.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_location_parse() {
        assert_eq!(StoreLocation::parse("memory://"), Some(StoreLocation::Memory));
        assert_eq!(
            StoreLocation::parse("file:///var/lib/status"),
            Some(StoreLocation::File(PathBuf::from("/var/lib/status")))
        );
        assert_eq!(StoreLocation::parse("file://"), None);
        assert_eq!(StoreLocation::parse("mongodb://localhost:27017"), None);
    }

    #[test]
    fn test_newest_first_orders_by_parsed_time() {
        let doc = |id: &str, ts: &str| StatusCheckDocument {
            id: id.into(),
            client_name: "c".into(),
            timestamp: ts.into(),
            authenticated_user: "u".into(),
        };
        let docs = vec![
            doc("a", "2024-01-01T00:00:00.5+00:00"),
            doc("b", "2024-01-01T00:00:00.123456+00:00"),
            doc("c", "2024-01-02T00:00:00+00:00"),
        ];

        let ids: Vec<_> = newest_first(&docs, 10).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(newest_first(&docs, 1).len(), 1);
    }
}
