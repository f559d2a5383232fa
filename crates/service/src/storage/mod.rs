//! Storage abstractions for the service layer
//!
//! A `RecordStore` loads and saves one whole collection at a location.
//! Mutations go through [`modify`], which holds the location's writer lock
//! for the full load, mutate, save cycle.

pub mod json_file_store;
pub mod locks;
pub mod memory_store;

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::errors::ServiceError;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Held while a writer owns a location. Dropping it releases the location.
pub type StoreGuard = OwnedMutexGuard<()>;

/// All-or-nothing load and save of a homogeneous collection.
#[async_trait]
pub trait RecordStore<T: Send + Sync + 'static>: Send + Sync {
    /// File path or logical collection name, for logs and errors.
    fn location(&self) -> &str;

    /// Whole collection. A location that does not exist yet is empty;
    /// one that exists but cannot be decoded is `ServiceError::Corrupt`.
    async fn load(&self) -> Result<Vec<T>, ServiceError>;

    /// Replace the whole collection.
    async fn save(&self, records: &[T]) -> Result<(), ServiceError>;

    /// Acquire the single-writer scope for this location.
    async fn lock(&self) -> StoreGuard;
}

/// Load, mutate and persist under the location lock. Nothing is saved when
/// `f` fails.
pub async fn modify<T, R, F>(store: &dyn RecordStore<T>, f: F) -> Result<R, ServiceError>
where
    T: Send + Sync + 'static,
    R: Send,
    F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError> + Send,
{
    let _guard = store.lock().await;
    let mut records = store.load().await?;
    let out = f(&mut records)?;
    store.save(&records).await?;
    Ok(out)
}
