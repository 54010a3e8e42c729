use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{StateStore, StoreError};
use crate::models::{PriceStore, ProgressCursor};

/// Prices and cursor as two JSON files, each replaced atomically.
pub struct JsonFileStore {
    prices_path: PathBuf,
    cursor_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(prices_path: impl Into<PathBuf>, cursor_path: impl Into<PathBuf>) -> Self {
        Self {
            prices_path: prices_path.into(),
            cursor_path: cursor_path.into(),
        }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load_prices(&self) -> Result<PriceStore, StoreError> {
        read_json_or_default(&self.prices_path).await
    }

    async fn save_prices(&self, prices: &PriceStore) -> Result<(), StoreError> {
        write_json_atomic(&self.prices_path, prices).await?;
        debug!("Saved {} prices to {}", prices.len(), self.prices_path.display());
        Ok(())
    }

    async fn load_cursor(&self) -> Result<ProgressCursor, StoreError> {
        read_json_or_default(&self.cursor_path).await
    }

    async fn save_cursor(&self, cursor: &ProgressCursor) -> Result<(), StoreError> {
        write_json_atomic(&self.cursor_path, cursor).await
    }
}

async fn read_json_or_default<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&content).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a sibling temp file, fsync, then rename over the target so a
/// reader sees either the old or the new content. A failed write removes
/// its temp file and leaves the target untouched.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })?;

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(source) = replace_with(&tmp_path, path, &data).await {
        if let Err(e) = tokio::fs::remove_file(&tmp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove {}: {}", tmp_path.display(), e);
            }
        }
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    // Persist the rename itself; not every platform can open a directory
    if let Some(parent) = parent {
        if let Ok(dir) = tokio::fs::File::open(parent).await {
            if let Err(e) = dir.sync_all().await {
                debug!("Directory sync for {} failed: {}", parent.display(), e);
            }
        }
    }

    Ok(())
}

async fn replace_with(tmp_path: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(tmp_path, path).await
}
