use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::fetcher::{AttemptError, PageFetcher};
use crate::models::{Extraction, TrackedItem};
use crate::parsers::PriceExtractor;
use crate::utils::user_agent::UserAgentRotation;

/// Bounded exponential backoff around one item's fetch-and-extract.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub retry_not_found: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: Duration::from_secs(config.backoff_base_seconds),
            retry_not_found: config.retry_not_found,
        }
    }

    /// Wait before retry number `attempt + 1`: base * 2^attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn exhausted_backoff(&self) -> Duration {
        (0..self.max_retries).map(|attempt| self.backoff(attempt)).sum()
    }

    fn should_retry(&self, error: &AttemptError) -> bool {
        if error.is_definitive() {
            return false;
        }
        if error.is_not_found() {
            return self.retry_not_found;
        }
        true
    }

    /// Runs up to `max_retries + 1` attempts, presenting a different user
    /// agent each time. `None` means the item should be skipped this batch.
    pub async fn fetch_with_retry(
        &self,
        item: &TrackedItem,
        fetcher: &dyn PageFetcher,
        extractor: &dyn PriceExtractor,
        agents: &UserAgentRotation,
    ) -> Option<Extraction> {
        let offset = agents.random_offset();
        let mut attempt = 0;

        loop {
            let identity = agents.identity(offset, attempt);
            let result = match fetcher.fetch(item, &identity).await {
                Ok(content) => extractor.extract(&content).map_err(AttemptError::from),
                Err(e) => Err(AttemptError::from(e)),
            };

            let error = match result {
                Ok(extraction) => return Some(extraction),
                Err(error) => error,
            };

            if !self.should_retry(&error) {
                info!("Skipping {}: {}", item, error);
                return None;
            }

            if attempt >= self.max_retries {
                warn!(
                    "Giving up on {} after {} attempts: {}",
                    item,
                    attempt + 1,
                    error
                );
                return None;
            }

            let delay = self.backoff(attempt);
            warn!(
                "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                attempt + 1,
                self.max_retries + 1,
                item,
                error,
                delay
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
