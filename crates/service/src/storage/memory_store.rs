use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::{RecordStore, StoreGuard};

/// Process-local collection addressed by a logical name.
///
/// Same contract as the file store, minus durability. Used for the `memory`
/// backend and in tests.
pub struct MemoryStore<T> {
    name: String,
    records: RwLock<Vec<T>>,
    lock: Arc<Mutex<()>>,
}

impl<T> MemoryStore<T> {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_records(name, Vec::new())
    }

    pub fn with_records(name: impl Into<String>, records: Vec<T>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            records: RwLock::new(records),
            lock: Arc::new(Mutex::new(())),
        })
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn location(&self) -> &str { &self.name }

    async fn load(&self) -> Result<Vec<T>, ServiceError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[T]) -> Result<(), ServiceError> {
        let mut current = self.records.write().await;
        *current = records.to_vec();
        debug!(location = %self.name, count = records.len(), "collection saved");
        Ok(())
    }

    async fn lock(&self) -> StoreGuard {
        Arc::clone(&self.lock).lock_owned().await
    }
}
