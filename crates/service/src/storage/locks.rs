//! Process-wide writer locks keyed by location.
//!
//! Every store opened on the same path gets the same mutex, so independent
//! store instances cannot interleave their load/save cycles. The registry only
//! holds weak handles: once no store keeps a lock alive its entry is pruned.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::{fs, sync::Mutex};

static LOCATION_LOCKS: Lazy<DashMap<PathBuf, Weak<Mutex<()>>>> = Lazy::new(DashMap::new);

/// Lock shared by every caller asking for the same file path.
pub async fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let key = canonical_key(path).await;
    let lock = {
        let mut slot = LOCATION_LOCKS.entry(key).or_default();
        if let Some(lock) = slot.upgrade() {
            return lock;
        }
        let lock = Arc::new(Mutex::new(()));
        *slot = Arc::downgrade(&lock);
        lock
    };
    // shard guard released above; retain locks every shard
    LOCATION_LOCKS.retain(|_, slot| slot.strong_count() > 0);
    lock
}

// The file itself may not exist yet, so only the parent is canonicalized.
async fn canonical_key(path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return path.to_path_buf();
    };
    let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
    match fs::canonicalize(parent).await {
        Ok(dir) => dir.join(name),
        Err(_) => path.to_path_buf(),
    }
}
