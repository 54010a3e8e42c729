use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{PriceStore, ProgressCursor, TrackedItem};

mod items;
mod json;
pub use items::{parse_item_list, FileItemSource};
pub use json::JsonFileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data in {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered list of items to monitor, re-read at the start of every batch.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn load(&self) -> Result<Vec<TrackedItem>, StoreError>;
}

/// Durable home of the price store and the progress cursor. Each save must
/// be all-or-nothing for a reader.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_prices(&self) -> Result<PriceStore, StoreError>;
    async fn save_prices(&self, prices: &PriceStore) -> Result<(), StoreError>;
    async fn load_cursor(&self) -> Result<ProgressCursor, StoreError>;
    async fn save_cursor(&self, cursor: &ProgressCursor) -> Result<(), StoreError>;
}
