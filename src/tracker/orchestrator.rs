use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::{PacingPolicy, RetryPolicy, TrackerError, TrackerStatus};
use crate::config::Config;
use crate::fetcher::PageFetcher;
use crate::models::{
    BatchResult, BatchRun, Observation, PriceDrop, PriceStore, ProgressCursor, TrackedItem,
};
use crate::notifier::Notifier;
use crate::parsers::PriceExtractor;
use crate::storage::{ItemSource, StateStore};
use crate::utils::user_agent::UserAgentRotation;

/// External pieces the orchestrator drives.
pub struct Collaborators {
    pub items: Arc<dyn ItemSource>,
    pub state: Arc<dyn StateStore>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn PriceExtractor>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub retry: RetryPolicy,
    pub pacing: PacingPolicy,
    pub user_agents: UserAgentRotation,
}

impl BatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            retry: RetryPolicy::from_config(&config.retry),
            pacing: PacingPolicy::from_config(&config.pacing),
            user_agents: UserAgentRotation::new(config.http.user_agents.clone()),
        }
    }
}

struct TrackedState {
    prices: PriceStore,
    cursor: ProgressCursor,
}

/// Clears the in-flight flag however the batch ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one slice of the item list per call and owns the in-memory price
/// store and cursor between calls.
pub struct BatchOrchestrator {
    collaborators: Collaborators,
    settings: BatchSettings,
    state: Mutex<TrackedState>,
    in_flight: AtomicBool,
    status: watch::Sender<TrackerStatus>,
}

impl BatchOrchestrator {
    /// Loads persisted state. Unreadable state degrades to empty defaults
    /// rather than failing startup.
    pub async fn restore(collaborators: Collaborators, settings: BatchSettings) -> Self {
        let prices = match collaborators.state.load_prices().await {
            Ok(prices) => prices,
            Err(e) => {
                warn!("Could not load stored prices, starting with none: {}", e);
                PriceStore::default()
            }
        };

        let cursor = match collaborators.state.load_cursor().await {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!("Could not load progress cursor, starting from the top: {}", e);
                ProgressCursor::default()
            }
        };

        info!(
            "Restored {} stored prices, resuming at item {}",
            prices.len(),
            cursor.next_index
        );

        let (status, _) = watch::channel(TrackerStatus {
            next_index: cursor.next_index,
            tracked_prices: prices.len(),
            ..TrackerStatus::default()
        });

        Self {
            collaborators,
            settings,
            state: Mutex::new(TrackedState { prices, cursor }),
            in_flight: AtomicBool::new(false),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerStatus> {
        self.status.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn cursor(&self) -> ProgressCursor {
        self.state.lock().await.cursor
    }

    pub async fn observation(&self, item: &TrackedItem) -> Option<Observation> {
        self.state.lock().await.prices.get(item).cloned()
    }

    /// Process the next slice of the item list. Returns `Skipped` at once
    /// if another call is still running.
    pub async fn run_batch(&self) -> Result<BatchRun, TrackerError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("Batch already in flight, skipping this run");
            return Ok(BatchRun::Skipped);
        }
        let _guard = InFlightGuard(&self.in_flight);
        self.status.send_modify(|status| status.in_flight = true);

        let outcome = self.process_next_slice().await;

        let (next_index, tracked_prices) = {
            let state = self.state.lock().await;
            (state.cursor.next_index, state.prices.len())
        };
        self.status.send_modify(|status| {
            status.in_flight = false;
            status.next_index = next_index;
            status.tracked_prices = tracked_prices;
            match &outcome {
                Ok(BatchRun::Completed(result)) => {
                    status.batches_completed += 1;
                    status.last_batch = Some(*result);
                    status.last_batch_at = Some(Utc::now());
                    status.last_error = None;
                }
                Ok(_) => {}
                Err(e) => status.last_error = Some(e.to_string()),
            }
        });

        outcome
    }

    async fn process_next_slice(&self) -> Result<BatchRun, TrackerError> {
        let items = self
            .collaborators
            .items
            .load()
            .await
            .map_err(TrackerError::ItemList)?;

        if items.is_empty() {
            warn!("Item list is empty, nothing to check");
            return Ok(BatchRun::Empty);
        }

        let mut state = self.state.lock().await;
        let item_count = items.len();
        let start = state.cursor.start_for(item_count);
        let end = (start + self.settings.batch_size).min(item_count);
        info!("Checking items {}..{} of {}", start, end, item_count);

        let mut result = BatchResult::default();

        for (position, item) in items[start..end].iter().enumerate() {
            let delay = self
                .settings
                .pacing
                .next_delay(item_count, position, &mut rand::rng());
            if !delay.is_zero() {
                debug!("Waiting {:?} before {}", delay, item);
                sleep(delay).await;
            }

            result.attempted += 1;

            let extraction = self
                .settings
                .retry
                .fetch_with_retry(
                    item,
                    self.collaborators.fetcher.as_ref(),
                    self.collaborators.extractor.as_ref(),
                    &self.settings.user_agents,
                )
                .await;

            let Some(extraction) = extraction else {
                result.failed += 1;
                continue;
            };
            result.succeeded += 1;

            let observation = Observation::new(item, extraction, Utc::now());
            debug!(
                "{}: {} {} ({})",
                item, observation.price, observation.currency, observation.title
            );

            match state.prices.get(item) {
                Some(previous) => {
                    if let Some(drop) = PriceDrop::detect(previous, &observation) {
                        result.drops_found += 1;
                        info!("Price drop detected: {}", drop);
                        if let Err(e) = self.collaborators.notifier.notify(&drop).await {
                            error!("Failed to send notification for {}: {:#}", item, e);
                        }
                    }
                }
                None => info!("First observation for {}", item),
            }

            state.prices.record(observation);
        }

        self.collaborators
            .state
            .save_prices(&state.prices)
            .await
            .map_err(TrackerError::PersistPrices)?;

        let next = ProgressCursor::after_batch(end, item_count);
        self.collaborators
            .state
            .save_cursor(&next)
            .await
            .map_err(TrackerError::PersistCursor)?;
        state.cursor = next;

        if next.next_index == 0 {
            info!("Completed a full pass over {} items", item_count);
        }

        Ok(BatchRun::Completed(result))
    }
}
