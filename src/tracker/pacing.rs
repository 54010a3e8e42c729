use rand::Rng;
use std::time::Duration;

use crate::config::{PacingConfig, PacingMode};

/// Computes the wait before the next request inside a batch. Only returns
/// a duration; the caller decides whether to sleep.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    mode: PacingMode,
    base: Duration,
    jitter: Duration,
    min: Duration,
    spread_window: Duration,
    spread_jitter: f64,
    spread_min: Duration,
}

impl PacingPolicy {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            mode: config.mode,
            base: Duration::from_secs(config.base_seconds),
            jitter: Duration::from_secs(config.jitter_seconds),
            min: Duration::from_secs(config.min_seconds),
            spread_window: Duration::from_secs(config.spread_window_seconds),
            spread_jitter: config.spread_jitter,
            spread_min: Duration::from_secs(config.spread_min_seconds),
        }
    }

    /// No pacing at all; for tests and one-off probes.
    pub fn none() -> Self {
        Self {
            mode: PacingMode::Simple,
            base: Duration::ZERO,
            jitter: Duration::ZERO,
            min: Duration::ZERO,
            spread_window: Duration::ZERO,
            spread_jitter: 0.0,
            spread_min: Duration::ZERO,
        }
    }

    /// Delay before the request at `position` within a batch. The first
    /// request of a batch goes out immediately.
    pub fn next_delay<R: Rng>(&self, item_count: usize, position: usize, rng: &mut R) -> Duration {
        if position == 0 {
            return Duration::ZERO;
        }

        match self.mode {
            PacingMode::Simple => self.simple_delay(rng),
            PacingMode::EvenSpread => self.spread_delay(item_count, rng),
        }
    }

    fn simple_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let base_ms = self.base.as_millis() as i64;
        let jitter_ms = self.jitter.as_millis() as i64;
        let offset = if jitter_ms > 0 {
            rng.random_range(-jitter_ms..=jitter_ms)
        } else {
            0
        };
        let delay_ms = (base_ms + offset).max(0) as u64;
        Duration::from_millis(delay_ms).max(self.min)
    }

    fn spread_delay<R: Rng>(&self, item_count: usize, rng: &mut R) -> Duration {
        let average = self.spread_window.as_secs_f64() / item_count.max(1) as f64;
        let factor = if self.spread_jitter > 0.0 {
            rng.random_range((1.0 - self.spread_jitter)..=(1.0 + self.spread_jitter))
        } else {
            1.0
        };
        Duration::from_secs_f64(average * factor).max(self.spread_min)
    }
}
