use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::warn;
use url::Url;

use super::{ItemSource, StoreError};
use crate::models::TrackedItem;

/// Newline-delimited URL list on disk.
pub struct FileItemSource {
    path: PathBuf,
}

impl FileItemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ItemSource for FileItemSource {
    async fn load(&self) -> Result<Vec<TrackedItem>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(parse_item_list(&content))
    }
}

/// Skips blank lines, `#` comments and anything that is not an http(s)
/// URL; keeps the first occurrence of duplicates.
pub fn parse_item_list(content: &str) -> Vec<TrackedItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match Url::parse(line) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                warn!("Ignoring invalid item list entry: {}", line);
                continue;
            }
        }

        if seen.insert(line.to_string()) {
            items.push(TrackedItem::new(line));
        }
    }

    items
}
