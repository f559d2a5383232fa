use std::{io, marker::PhantomData, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::{locks, RecordStore, StoreGuard};

/// Generic JSON file-backed collection store.
///
/// Persists a `Vec<T>` as a pretty-printed JSON array. Saves write a sibling
/// temp file and rename it over the target, so readers only ever see a
/// complete collection.
pub struct JsonFileStore<T> {
    file_path: PathBuf,
    location: String,
    lock: Arc<Mutex<()>>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Open a store at `path`, creating the parent directory if missing.
    /// The file itself is only created by the first save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("cannot create {}: {e}", parent.display())))?;
        }
        let lock = locks::lock_for(&file_path).await;
        let location = file_path.display().to_string();
        Ok(Arc::new(Self { file_path, location, lock, _records: PhantomData }))
    }

    pub fn path(&self) -> &Path { &self.file_path }

    /// Whether `other` resolves to the same file, i.e. holds the same writer lock.
    pub fn shares_location_with<U>(&self, other: &JsonFileStore<U>) -> bool {
        Arc::ptr_eq(&self.lock, &other.lock)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "collection".into());
        self.file_path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
    }
}

#[async_trait]
impl<T> RecordStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn location(&self) -> &str { &self.location }

    async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(location = %self.location, "collection not created yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(location = %self.location, error = %e, "collection read failed");
                return Err(ServiceError::Storage(format!("read {}: {e}", self.location)));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(location = %self.location, error = %e, "collection is not a valid record sequence");
            ServiceError::Corrupt { location: self.location.clone(), reason: e.to_string() }
        })
    }

    async fn save(&self, records: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(records).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &data).await {
            error!(location = %self.location, error = %e, "collection write failed");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Storage(format!("write {}: {e}", self.location)));
        }
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            error!(location = %self.location, error = %e, "collection replace failed");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Storage(format!("replace {}: {e}", self.location)));
        }
        debug!(location = %self.location, count = records.len(), bytes = data.len(), "collection saved");
        Ok(())
    }

    async fn lock(&self) -> StoreGuard {
        Arc::clone(&self.lock).lock_owned().await
    }
}
