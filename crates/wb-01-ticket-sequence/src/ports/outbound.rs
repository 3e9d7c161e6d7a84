//! Outbound (Driven) ports for the ticket sequence.

use crate::domain::errors::SequenceError;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Durable home of the ticket high-water mark.
#[async_trait]
pub trait TicketCounterStore: Send + Sync {
    /// Last persisted high-water mark, `None` on a fresh store.
    async fn load_high_water(&self) -> Result<Option<u64>, SequenceError>;

    /// Record that `value` has been issued. Implementations must keep the
    /// maximum of all values stored, since concurrent completions may
    /// persist out of order.
    async fn store_high_water(&self, value: u64) -> Result<(), SequenceError>;
}

/// Another store that already holds issued tickets (historical records,
/// persisted sessions). Consulted once at startup.
#[async_trait]
pub trait TicketSeedSource: Send + Sync {
    /// Short label for logs.
    fn source_name(&self) -> &str;

    /// Highest numeric ticket present, `None` if there is none.
    async fn max_issued_ticket(&self) -> Result<Option<u64>, SequenceError>;
}

/// In-memory counter store.
#[derive(Debug, Default)]
pub struct InMemoryTicketCounterStore {
    inner: Mutex<CounterState>,
}

#[derive(Debug, Default)]
struct CounterState {
    high_water: Option<u64>,
    failing: bool,
}

impl InMemoryTicketCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_water(value: u64) -> Self {
        Self {
            inner: Mutex::new(CounterState {
                high_water: Some(value),
                failing: false,
            }),
        }
    }

    /// Make every subsequent write fail, simulating an unreachable backend.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    pub fn current(&self) -> Option<u64> {
        self.inner.lock().high_water
    }
}

#[async_trait]
impl TicketCounterStore for InMemoryTicketCounterStore {
    async fn load_high_water(&self) -> Result<Option<u64>, SequenceError> {
        Ok(self.inner.lock().high_water)
    }

    async fn store_high_water(&self, value: u64) -> Result<(), SequenceError> {
        let mut state = self.inner.lock();
        if state.failing {
            return Err(SequenceError::Store("counter store unavailable".into()));
        }
        state.high_water = Some(state.high_water.map_or(value, |hw| hw.max(value)));
        Ok(())
    }
}
