//! Weighing session error types.
//!
//! | Error | Kind | Caller action |
//! |-------|------|---------------|
//! | `BridgeBusy` | scheduling signal | wait for grant or retry |
//! | `StaleReading` | discarded input | none, logged |
//! | `InvalidTransition` | guard violation | fix the command; session unchanged |
//! | `InvalidWeight` | bad input | none, logged |
//! | `TicketUnavailable` / `QuotaDebitFailed` | completion aborted | retry completion |
//! | `PersistFailed` | terminal state not stored | retry once the store is back |

use shared_types::{SessionId, WeighingPhase, WeighingState, Weight};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Bridge held by another session; queued at `position`.
    #[error("Bridge busy, queued at position {position}")]
    BridgeBusy { position: usize },

    /// Reading for a session that is not on the bridge for that phase.
    #[error("Stale {phase} reading for session {session_id} in state {state}")]
    StaleReading {
        session_id: SessionId,
        phase: WeighingPhase,
        state: WeighingState,
    },

    /// Guard violation; the session is unchanged.
    #[error("Invalid transition {from} -> {to}: {reason}")]
    InvalidTransition {
        from: WeighingState,
        to: WeighingState,
        reason: &'static str,
    },

    /// Readings must exceed 0.000 t.
    #[error("Invalid weight {0}: must exceed 0.000")]
    InvalidWeight(Weight),

    /// Ticket allocation failed; the session stays in EXIT_WEIGHING.
    #[error("Ticket unavailable: {0}")]
    TicketUnavailable(String),

    /// Quota debit failed; the session stays in EXIT_WEIGHING.
    #[error("Quota debit failed: {0}")]
    QuotaDebitFailed(String),

    /// The terminal state could not be stored; the session is unchanged.
    #[error("Session not persisted: {0}")]
    PersistFailed(String),

    /// A ticket is already recorded on this session.
    #[error("Ticket already assigned to session {0}")]
    TicketAlreadyAssigned(SessionId),
}

impl SessionError {
    /// Scheduling signals and discarded inputs, as opposed to real faults.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::BridgeBusy { .. } | SessionError::StaleReading { .. }
        )
    }
}
