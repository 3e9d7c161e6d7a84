//! Ticket issuer over the sequence allocator.

use async_trait::async_trait;
use facility_telemetry::metrics::{TICKETS_ISSUED, TICKET_HIGH_WATER};
use shared_types::TicketNumber;
use std::sync::Arc;
use wb_01_ticket_sequence::{SequenceAllocator, TicketCounterStore};
use wb_04_weighing_session::{PortError, TicketIssuer};

pub struct TicketIssuerAdapter<S: TicketCounterStore> {
    allocator: Arc<SequenceAllocator<S>>,
}

impl<S: TicketCounterStore> TicketIssuerAdapter<S> {
    pub fn new(allocator: Arc<SequenceAllocator<S>>) -> Self {
        TICKET_HIGH_WATER.set(i64::try_from(allocator.high_water()).unwrap_or(i64::MAX));
        Self { allocator }
    }
}

#[async_trait]
impl<S: TicketCounterStore + 'static> TicketIssuer for TicketIssuerAdapter<S> {
    async fn issue(&self) -> Result<TicketNumber, PortError> {
        let ticket = self
            .allocator
            .next()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;
        TICKETS_ISSUED.inc();
        TICKET_HIGH_WATER.set(i64::try_from(ticket.value()).unwrap_or(i64::MAX));
        Ok(ticket)
    }
}
