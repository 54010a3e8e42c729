#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use price_tracker::fetcher::{FetchError, Identity, PageFetcher};
use price_tracker::models::{Extraction, PriceDrop, PriceStore, ProgressCursor, TrackedItem};
use price_tracker::notifier::Notifier;
use price_tracker::parsers::{ExtractError, PriceExtractor};
use price_tracker::storage::{ItemSource, StateStore, StoreError};
use price_tracker::tracker::{
    BatchOrchestrator, BatchSettings, Collaborators, PacingPolicy, RetryPolicy,
};
use price_tracker::utils::user_agent::UserAgentRotation;

pub fn urls(n: usize) -> Vec<TrackedItem> {
    (0..n)
        .map(|i| TrackedItem::new(format!("https://shop.example/p/{}", i)))
        .collect()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn io_error(path: &str) -> StoreError {
    StoreError::Io {
        path: PathBuf::from(path),
        source: std::io::Error::new(std::io::ErrorKind::Other, "simulated failure"),
    }
}

/// Item list held in memory; `None` simulates an unreadable source.
pub struct ListSource {
    items: Mutex<Option<Vec<TrackedItem>>>,
    pub loads: AtomicUsize,
}

impl ListSource {
    pub fn new(items: Vec<TrackedItem>) -> Self {
        Self {
            items: Mutex::new(Some(items)),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn broken() -> Self {
        Self {
            items: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, items: Option<Vec<TrackedItem>>) {
        *self.items.lock().unwrap() = items;
    }
}

#[async_trait]
impl ItemSource for ListSource {
    async fn load(&self) -> Result<Vec<TrackedItem>, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.items
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| io_error("items.txt"))
    }
}

/// In-memory state store with switchable failures.
#[derive(Default)]
pub struct MemoryState {
    pub prices: Mutex<PriceStore>,
    pub cursor: Mutex<ProgressCursor>,
    pub fail_loads: AtomicBool,
    pub fail_price_writes: AtomicBool,
    pub fail_cursor_writes: AtomicBool,
    pub price_writes: AtomicUsize,
    pub cursor_writes: AtomicUsize,
}

impl MemoryState {
    pub fn writes(&self) -> usize {
        self.price_writes.load(Ordering::SeqCst) + self.cursor_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryState {
    async fn load_prices(&self) -> Result<PriceStore, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(io_error("prices.json"));
        }
        Ok(self.prices.lock().unwrap().clone())
    }

    async fn save_prices(&self, prices: &PriceStore) -> Result<(), StoreError> {
        if self.fail_price_writes.load(Ordering::SeqCst) {
            return Err(io_error("prices.json"));
        }
        self.price_writes.fetch_add(1, Ordering::SeqCst);
        *self.prices.lock().unwrap() = prices.clone();
        Ok(())
    }

    async fn load_cursor(&self) -> Result<ProgressCursor, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(io_error("cursor.json"));
        }
        Ok(*self.cursor.lock().unwrap())
    }

    async fn save_cursor(&self, cursor: &ProgressCursor) -> Result<(), StoreError> {
        if self.fail_cursor_writes.load(Ordering::SeqCst) {
            return Err(io_error("cursor.json"));
        }
        self.cursor_writes.fetch_add(1, Ordering::SeqCst);
        *self.cursor.lock().unwrap() = *cursor;
        Ok(())
    }
}

/// Serves "price:<amount>" for known URLs and a network error for the rest.
/// Records every call and, when gated, parks inside the first fetch until
/// released.
#[derive(Default)]
pub struct PriceBoard {
    prices: Mutex<HashMap<String, Decimal>>,
    calls: Mutex<Vec<(String, Instant)>>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl PriceBoard {
    pub fn gated(started: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            gate: Some((started, release)),
            ..Self::default()
        }
    }

    pub fn set_price(&self, item: &TrackedItem, price: &str) {
        self.prices.lock().unwrap().insert(item.url().to_string(), dec(price));
    }

    pub fn set_all(&self, items: &[TrackedItem], price: &str) {
        for item in items {
            self.set_price(item, price);
        }
    }

    pub fn remove(&self, item: &TrackedItem) {
        self.prices.lock().unwrap().remove(item.url());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn fetch_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl PageFetcher for PriceBoard {
    async fn fetch(&self, item: &TrackedItem, _identity: &Identity) -> Result<String, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((item.url().to_string(), Instant::now()));

        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }

        let price = self.prices.lock().unwrap().get(item.url()).copied();
        match price {
            Some(price) => Ok(format!("price:{}", price)),
            None => Err(FetchError::Network("connection reset".to_string())),
        }
    }
}

pub struct StubExtractor;

impl PriceExtractor for StubExtractor {
    fn extract(&self, content: &str) -> Result<Extraction, ExtractError> {
        let amount = content.strip_prefix("price:").ok_or(ExtractError::NotFound)?;
        Ok(Extraction {
            title: "Stub Product".to_string(),
            price: amount.parse().map_err(|_| ExtractError::NotFound)?,
            currency: "EUR".to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub drops: Mutex<Vec<PriceDrop>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.drops.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, drop: &PriceDrop) -> Result<()> {
        self.drops.lock().unwrap().push(drop.clone());
        if self.fail {
            bail!("webhook unreachable");
        }
        Ok(())
    }
}

pub fn settings(batch_size: usize) -> BatchSettings {
    BatchSettings {
        batch_size,
        retry: RetryPolicy {
            max_retries: 3,
            backoff_base: Duration::from_secs(5),
            retry_not_found: true,
        },
        pacing: PacingPolicy::none(),
        user_agents: UserAgentRotation::new(vec!["agent-a".into(), "agent-b".into()]),
    }
}

/// Handles to every double behind one orchestrator.
pub struct Harness {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub items: Arc<ListSource>,
    pub state: Arc<MemoryState>,
    pub board: Arc<PriceBoard>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub async fn build(
        items: ListSource,
        state: MemoryState,
        board: PriceBoard,
        notifier: RecordingNotifier,
        settings: BatchSettings,
    ) -> Self {
        let items = Arc::new(items);
        let state = Arc::new(state);
        let board = Arc::new(board);
        let notifier = Arc::new(notifier);

        let collaborators = Collaborators {
            items: items.clone(),
            state: state.clone(),
            fetcher: board.clone(),
            extractor: Arc::new(StubExtractor),
            notifier: notifier.clone(),
        };

        Self {
            orchestrator: Arc::new(BatchOrchestrator::restore(collaborators, settings).await),
            items,
            state,
            board,
            notifier,
        }
    }

    pub async fn with_items(items: &[TrackedItem], batch_size: usize) -> Self {
        Self::build(
            ListSource::new(items.to_vec()),
            MemoryState::default(),
            PriceBoard::default(),
            RecordingNotifier::default(),
            settings(batch_size),
        )
        .await
    }
}
