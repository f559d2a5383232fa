//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the data directory exists, creating it when missing.
pub async fn ensure_data_dir(data_dir: impl AsRef<Path>) -> anyhow::Result<()> {
    let data_dir = data_dir.as_ref();
    match tokio::fs::metadata(data_dir).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            warn!(data_dir = %data_dir.display(), "data path exists but is not a directory");
            return Err(anyhow::anyhow!("{} is not a directory", data_dir.display()));
        }
        Err(_) => {}
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), "created data directory");
    Ok(())
}
