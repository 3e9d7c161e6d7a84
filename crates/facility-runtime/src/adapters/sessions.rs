//! Session repository as reconciliation source and ticket seed, plus the
//! historical store as ticket seed.

use async_trait::async_trait;
use shared_types::{SessionId, WeighingState};
use std::sync::Arc;
use tracing::warn;
use wb_01_ticket_sequence::{SequenceError, TicketSeedSource};
use wb_04_weighing_session::{SessionRepository, WeighingSession};
use wb_05_reconciliation::{
    CompletedSessionSource, HistoricalStore, ReconciliationError, TransferCandidate,
};

/// Read-only projection of a COMPLETED session. `None` for any other state
/// or if the ticket or weights are missing.
pub fn transfer_candidate(session: &WeighingSession) -> Option<TransferCandidate> {
    if session.state() != WeighingState::Completed {
        return None;
    }
    let derived = session.derived()?;
    Some(TransferCandidate {
        session_id: session.id(),
        ticket: session.ticket()?,
        truck_id: session.truck_id().clone(),
        client: session.client().clone(),
        product: session.product().clone(),
        tare: derived.tare,
        gross: derived.gross,
        net: derived.net,
        completed_at: session.timestamps().completed?,
    })
}

pub struct SessionRepositorySource {
    repository: Arc<dyn SessionRepository>,
}

impl SessionRepositorySource {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CompletedSessionSource for SessionRepositorySource {
    async fn pending(&self, limit: usize) -> Result<Vec<TransferCandidate>, ReconciliationError> {
        let sessions = self
            .repository
            .list_untransferred(limit)
            .await
            .map_err(|e| ReconciliationError::Source(e.to_string()))?;

        Ok(sessions
            .iter()
            .filter_map(|s| {
                let candidate = transfer_candidate(s);
                if candidate.is_none() {
                    warn!(session_id = %s.id(), "Completed session lacks transfer data");
                }
                candidate
            })
            .collect())
    }

    async fn confirm(&self, session_id: SessionId) -> Result<(), ReconciliationError> {
        self.repository
            .mark_transferred(session_id)
            .await
            .map_err(|e| ReconciliationError::Source(e.to_string()))
    }
}

/// Highest ticket in the historical store.
pub struct HistoricalSeed(pub Arc<dyn HistoricalStore>);

#[async_trait]
impl TicketSeedSource for HistoricalSeed {
    fn source_name(&self) -> &str {
        "historical-store"
    }

    async fn max_issued_ticket(&self) -> Result<Option<u64>, SequenceError> {
        self.0
            .max_ticket()
            .await
            .map_err(|e| SequenceError::Store(e.to_string()))
    }
}

/// Highest ticket on any persisted session, transferred or not.
pub struct SessionSeed(pub Arc<dyn SessionRepository>);

#[async_trait]
impl TicketSeedSource for SessionSeed {
    fn source_name(&self) -> &str {
        "session-repository"
    }

    async fn max_issued_ticket(&self) -> Result<Option<u64>, SequenceError> {
        self.0
            .max_ticket()
            .await
            .map_err(|e| SequenceError::Store(e.to_string()))
    }
}
