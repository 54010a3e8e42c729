pub mod orchestrator;
pub mod pacing;
pub mod retry;
pub mod worker;

pub use orchestrator::{BatchOrchestrator, BatchSettings, Collaborators};
pub use pacing::PacingPolicy;
pub use retry::RetryPolicy;
pub use worker::run_forever;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::BatchResult;
use crate::storage::StoreError;

/// Batch-level failures. Per-item problems never surface here.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to read item list: {0}")]
    ItemList(#[source] StoreError),
    #[error("failed to persist prices: {0}")]
    PersistPrices(#[source] StoreError),
    #[error("failed to persist progress cursor: {0}")]
    PersistCursor(#[source] StoreError),
}

/// Read-only view of the worker published after every state change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackerStatus {
    pub in_flight: bool,
    pub batches_completed: u64,
    pub next_index: usize,
    pub tracked_prices: usize,
    pub last_batch: Option<BatchResult>,
    pub last_batch_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}
