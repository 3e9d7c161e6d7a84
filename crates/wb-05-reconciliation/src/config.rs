//! Sweep schedule and failure backoff.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Period between sweeps while the store is healthy.
    pub interval_ms: u64,
    /// Completed sessions examined per sweep.
    pub batch_size: usize,
    /// Upper bound of the failure backoff.
    pub max_backoff_ms: u64,
    /// Jitter as a fraction of the delay, 0.0..=1.0.
    pub jitter_pct: f64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self::new(5_000, 10, 60_000, 0.2)
    }
}

impl ReconciliationConfig {
    pub fn new(interval_ms: u64, batch_size: usize, max_backoff_ms: u64, jitter_pct: f64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            interval_ms,
            batch_size: batch_size.max(1),
            max_backoff_ms: max_backoff_ms.max(interval_ms),
            jitter_pct: jitter_pct.clamp(0.0, 1.0),
        }
    }

    /// Short interval, no jitter.
    pub fn for_testing() -> Self {
        Self::new(50, 10, 400, 0.0)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Delay before the next sweep after `failures` consecutive failed sweeps.
    ///
    /// Zero failures gives the plain interval. Each failure doubles it up to
    /// `max_backoff_ms`, then jitter of ±`jitter_pct` is applied.
    pub fn next_delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return self.interval();
        }
        let exp = 2_u64.saturating_pow(failures);
        let delay = self.interval_ms.saturating_mul(exp).min(self.max_backoff_ms);

        let spread = (delay as f64 * self.jitter_pct) as i64;
        let jittered = if spread > 0 {
            let delta = rand::thread_rng().gen_range(-spread..=spread);
            delay.saturating_add_signed(delta)
        } else {
            delay
        };
        Duration::from_millis(jittered.max(1))
    }
}
