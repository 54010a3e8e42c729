use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::BatchOrchestrator;
use crate::models::BatchRun;

/// Runs batches forever with `pause` between them. A failed batch is
/// logged and the loop carries on; only the process ending stops it.
pub async fn run_forever(orchestrator: Arc<BatchOrchestrator>, pause: Duration) {
    loop {
        match orchestrator.run_batch().await {
            Ok(BatchRun::Completed(result)) => info!("Batch complete: {}", result),
            Ok(BatchRun::Empty) => info!("Batch complete: no items to check"),
            Ok(BatchRun::Skipped) => warn!("Previous batch still running"),
            Err(e) => error!("Batch failed: {}", e),
        }

        info!("Next batch in {:?}", pause);
        sleep(pause).await;
    }
}
