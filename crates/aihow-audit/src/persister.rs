//! Audit persistence abstraction

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::filter::AuditFilter;
use crate::models::AuditLogEntry;

/// Durable append-only sink for audit entries
///
/// `append` must not return `Ok` until the entry is stored. `query` returns
/// matching entries in append order.
#[async_trait]
pub trait AuditPersister: Send + Sync {
    /// Store a single entry
    async fn append(&self, entry: &AuditLogEntry) -> Result<()>;

    /// Retrieve entries matching the filter
    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>>;

    /// Remove every stored entry
    async fn clear(&self) -> Result<()>;
}

/// In-memory persister for tests and single-process deployments
#[derive(Debug, Default)]
pub struct MemoryPersister {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AuditPersister for MemoryPersister {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        Ok(filter.apply(entries.iter()))
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
