//! # Sequence Allocator Service
//!
//! Seeds the in-memory counter from every place a ticket may already live,
//! then allocates and persists.

use crate::config::SequenceConfig;
use crate::domain::errors::SequenceError;
use crate::domain::sequence::TicketSequence;
use crate::ports::outbound::{TicketCounterStore, TicketSeedSource};
use shared_types::TicketNumber;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct SequenceAllocator<S: TicketCounterStore> {
    sequence: TicketSequence,
    store: Arc<S>,
}

impl<S: TicketCounterStore> SequenceAllocator<S> {
    /// Build the allocator. Fails if any seed source cannot be read, since
    /// starting below an issued ticket would hand it out again.
    pub async fn initialize(
        config: &SequenceConfig,
        store: Arc<S>,
        seeds: &[Arc<dyn TicketSeedSource>],
    ) -> Result<Self, SequenceError> {
        let mut high_water = config.floor();

        if let Some(persisted) = store.load_high_water().await? {
            debug!(persisted, "Loaded persisted ticket high-water mark");
            high_water = high_water.max(persisted);
        }

        for source in seeds {
            let max = source
                .max_issued_ticket()
                .await
                .map_err(|e| SequenceError::Seed {
                    source_name: source.source_name().to_string(),
                    reason: e.to_string(),
                })?;
            if let Some(max) = max {
                debug!(source = source.source_name(), max, "Seed source reported max ticket");
                high_water = high_water.max(max);
            }
        }

        info!(
            high_water,
            next_ticket = high_water.saturating_add(1),
            "Ticket sequence seeded"
        );

        Ok(Self {
            sequence: TicketSequence::seeded(high_water),
            store,
        })
    }

    /// Allocate the next ticket and persist the new high-water mark.
    ///
    /// If persisting fails the number is burned: the in-memory counter has
    /// already moved past it, so it will not be reissued in this process, and
    /// the caller must not use it.
    pub async fn next(&self) -> Result<TicketNumber, SequenceError> {
        let ticket = self.sequence.next()?;

        if let Err(e) = self.store.store_high_water(ticket.value()).await {
            error!(ticket = %ticket, error = %e, "Failed to persist ticket high-water mark");
            return Err(e);
        }

        debug!(ticket = %ticket, "Ticket allocated");
        Ok(ticket)
    }

    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.sequence.high_water()
    }
}
