//! Orchestrator error types.

use shared_types::{ClientName, SessionId, TruckId};
use thiserror::Error;
use wb_04_weighing_session::{PortError, SessionError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// No PENDING planning entry for the truck today.
    #[error("Truck {0} is not planned today")]
    NotPlanned(TruckId),

    /// Client quota refuses new arrivals.
    #[error("Arrival of {truck_id} refused for client {client}: {reason}")]
    QuotaBlocked {
        truck_id: TruckId,
        client: ClientName,
        reason: String,
    },

    #[error("Unknown session {0}")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Planning lookup failed: {0}")]
    Planning(PortError),

    #[error("Session store failed: {0}")]
    Repository(PortError),
}

impl OrchestratorError {
    /// Arrival refusals that go back to the authorization collaborator.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OrchestratorError::NotPlanned(_) | OrchestratorError::QuotaBlocked { .. }
        )
    }

    /// Label for the rejection metric.
    #[must_use]
    pub fn rejection_reason(&self) -> &'static str {
        match self {
            OrchestratorError::NotPlanned(_) => "not_planned",
            OrchestratorError::QuotaBlocked { .. } => "quota_blocked",
            _ => "error",
        }
    }
}
