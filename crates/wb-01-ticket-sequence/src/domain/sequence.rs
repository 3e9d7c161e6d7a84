//! The in-memory ticket counter.

use super::errors::SequenceError;
use shared_types::TicketNumber;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotone ticket counter holding the highest number ever issued.
///
/// `next` is a single compare-and-swap loop, so concurrent callers never
/// observe the same value.
#[derive(Debug)]
pub struct TicketSequence {
    high_water: AtomicU64,
}

impl TicketSequence {
    /// Start from a known high-water mark; the first ticket is `high_water + 1`.
    #[must_use]
    pub fn seeded(high_water: u64) -> Self {
        Self {
            high_water: AtomicU64::new(high_water),
        }
    }

    /// Allocate the next ticket number.
    pub fn next(&self) -> Result<TicketNumber, SequenceError> {
        self.high_water
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(1)
            })
            .map(|previous| TicketNumber(previous + 1))
            .map_err(|high_water| SequenceError::Exhausted { high_water })
    }

    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water.load(Ordering::Acquire)
    }
}
