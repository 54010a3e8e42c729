mod common;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

use common::*;
use price_tracker::models::{BatchRun, PriceStore, ProgressCursor};
use price_tracker::storage::{JsonFileStore, StateStore, StoreError};
use price_tracker::tracker::{BatchOrchestrator, Collaborators, TrackerError};

/// Dies between the price write and the cursor write.
struct CrashBeforeCursor(JsonFileStore);

#[async_trait]
impl StateStore for CrashBeforeCursor {
    async fn load_prices(&self) -> Result<PriceStore, StoreError> {
        self.0.load_prices().await
    }

    async fn save_prices(&self, prices: &PriceStore) -> Result<(), StoreError> {
        self.0.save_prices(prices).await
    }

    async fn load_cursor(&self) -> Result<ProgressCursor, StoreError> {
        self.0.load_cursor().await
    }

    async fn save_cursor(&self, _cursor: &ProgressCursor) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: "cursor.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "process killed"),
        })
    }
}

fn file_store(dir: &Path) -> JsonFileStore {
    JsonFileStore::new(dir.join("prices.json"), dir.join("cursor.json"))
}

async fn orchestrator_on(
    state: Arc<dyn StateStore>,
    board: Arc<PriceBoard>,
    items: &[price_tracker::models::TrackedItem],
) -> BatchOrchestrator {
    let collaborators = Collaborators {
        items: Arc::new(ListSource::new(items.to_vec())),
        state,
        fetcher: board,
        extractor: Arc::new(StubExtractor),
        notifier: Arc::new(RecordingNotifier::default()),
    };
    BatchOrchestrator::restore(collaborators, settings(2)).await
}

#[tokio::test]
async fn restart_after_crash_keeps_prices_and_repeats_range() {
    let dir = tempfile::tempdir().unwrap();
    let items = urls(4);
    let board = Arc::new(PriceBoard::default());
    board.set_all(&items, "42.00");

    // Prices land on disk, the cursor write dies
    let crashing = orchestrator_on(
        Arc::new(CrashBeforeCursor(file_store(dir.path()))),
        board.clone(),
        &items,
    )
    .await;
    let err = crashing.run_batch().await.unwrap_err();
    assert!(matches!(err, TrackerError::PersistCursor(_)));

    // Restart from disk
    board.clear_calls();
    let restarted = orchestrator_on(Arc::new(file_store(dir.path())), board.clone(), &items).await;

    assert_eq!(restarted.cursor().await, ProgressCursor::at(0));
    let kept = restarted.observation(&items[0]).await.unwrap();
    assert_eq!(kept.price, dec("42.00"));
    assert!(restarted.observation(&items[1]).await.is_some());
    assert!(restarted.observation(&items[2]).await.is_none());

    let run = restarted.run_batch().await.unwrap();
    assert!(matches!(run, BatchRun::Completed(_)));
    assert_eq!(
        board.fetched(),
        vec![items[0].url().to_string(), items[1].url().to_string()]
    );

    let reloaded = file_store(dir.path()).load_cursor().await.unwrap();
    assert_eq!(reloaded, ProgressCursor::at(2));
}

#[tokio::test]
async fn corrupt_price_file_degrades_to_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("prices.json"), b"[[[").await.unwrap();
    tokio::fs::write(dir.path().join("cursor.json"), br#"{"next_index": 1}"#)
        .await
        .unwrap();

    let items = urls(3);
    let board = Arc::new(PriceBoard::default());
    let orchestrator = orchestrator_on(Arc::new(file_store(dir.path())), board, &items).await;

    assert!(orchestrator.observation(&items[0]).await.is_none());
    assert_eq!(orchestrator.cursor().await, ProgressCursor::at(1));
}
