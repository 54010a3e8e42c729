use async_trait::async_trait;
use thiserror::Error;

use crate::models::TrackedItem;
use crate::parsers::ExtractError;

mod http;
pub use http::HttpFetcher;

/// Identity presented to the source for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Status(u16),
    /// The source says the page is gone for good.
    #[error("page no longer exists (HTTP {0})")]
    Gone(u16),
}

impl FetchError {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 | 410 => FetchError::Gone(status),
            _ => FetchError::Status(status),
        }
    }
}

/// Why a single fetch-and-extract attempt produced no reading.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl AttemptError {
    /// The item is unavailable; retrying cannot help.
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            AttemptError::Fetch(FetchError::Gone(_)) | AttemptError::Extract(ExtractError::Unavailable)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AttemptError::Extract(ExtractError::NotFound))
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, item: &TrackedItem, identity: &Identity) -> Result<String, FetchError>;
}
