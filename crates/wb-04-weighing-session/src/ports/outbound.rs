//! Outbound (Driven) ports for weighing sessions.
//!
//! The session service depends on these traits only; the runtime supplies
//! adapters over the ticket sequence, quota ledger, bridge controller and
//! planning collaborator.

use crate::domain::session::WeighingSession;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    ClientName, PlanningEntry, PlanningId, PlanningStatus, SessionId, TicketNumber, TruckId,
    WeighingPhase, WeighingState, Weight,
};
use std::collections::HashMap;
use thiserror::Error;

/// Failure reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Another non-terminal session already exists for the truck.
    #[error("Truck {truck_id} already has active session {existing}")]
    ActiveSessionExists {
        truck_id: TruckId,
        existing: SessionId,
    },

    #[error("{0}")]
    Rejected(String),
}

// =============================================================================
// Bridge
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAdmission {
    Granted,
    Queued { position: usize },
}

/// The session that received the bridge when another released it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandOff {
    pub session_id: SessionId,
    pub phase: WeighingPhase,
}

/// Single-occupant bridge. Calls never block.
pub trait BridgeGate: Send + Sync {
    fn request(&self, session_id: SessionId, phase: WeighingPhase) -> GateAdmission;

    fn holds(&self, session_id: SessionId) -> bool;

    /// Idempotent; returns the next grantee if the release handed over.
    fn release(&self, session_id: SessionId) -> Option<HandOff>;

    /// Leave the wait queue, if queued.
    fn withdraw(&self, session_id: SessionId) -> bool;
}

// =============================================================================
// Quota
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuotaCheck {
    Available { remaining: Option<Weight> },
    Blocked { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuotaDebit {
    pub remaining: Option<Weight>,
    pub newly_blocked: bool,
}

#[async_trait]
pub trait QuotaGate: Send + Sync {
    fn check(&self, client: &ClientName) -> QuotaCheck;

    async fn debit(&self, client: &ClientName, amount: Weight) -> Result<QuotaDebit, PortError>;

    /// Undo `debit` for a completion that did not commit.
    async fn refund(
        &self,
        client: &ClientName,
        amount: Weight,
        debit: &QuotaDebit,
    ) -> Result<(), PortError>;
}

// =============================================================================
// Tickets
// =============================================================================

#[async_trait]
pub trait TicketIssuer: Send + Sync {
    /// Next ticket number; never one returned before.
    async fn issue(&self) -> Result<TicketNumber, PortError>;
}

// =============================================================================
// Planning
// =============================================================================

/// External scheduling collaborator.
#[async_trait]
pub trait PlanningAuthority: Send + Sync {
    /// PENDING entry for `truck_id` on today's date, if any.
    async fn authorize_arrival(&self, truck_id: &TruckId) -> Result<Option<PlanningEntry>, PortError>;

    async fn set_status(&self, id: PlanningId, status: PlanningStatus) -> Result<(), PortError>;
}

// =============================================================================
// Session persistence
// =============================================================================

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Upsert. Rejects a second non-terminal session for the same truck.
    async fn save(&self, session: &WeighingSession) -> Result<(), PortError>;

    async fn load(&self, id: SessionId) -> Result<Option<WeighingSession>, PortError>;

    /// Every non-terminal session.
    async fn list_active(&self) -> Result<Vec<WeighingSession>, PortError>;

    /// COMPLETED sessions not yet confirmed transferred, lowest ticket first.
    async fn list_untransferred(&self, limit: usize) -> Result<Vec<WeighingSession>, PortError>;

    async fn mark_transferred(&self, id: SessionId) -> Result<(), PortError>;

    /// Highest ticket recorded on any session.
    async fn max_ticket(&self) -> Result<Option<u64>, PortError>;
}

/// In-memory session table.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, WeighingSession>>,
    failing: RwLock<bool>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.write() = failing;
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn check_available(&self) -> Result<(), PortError> {
        if *self.failing.read() {
            return Err(PortError::Unavailable("session repository unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &WeighingSession) -> Result<(), PortError> {
        self.check_available()?;
        let mut sessions = self.sessions.write();
        if !session.is_terminal() {
            let clash = sessions.values().find(|s| {
                s.id() != session.id() && !s.is_terminal() && s.truck_id() == session.truck_id()
            });
            if let Some(existing) = clash {
                return Err(PortError::ActiveSessionExists {
                    truck_id: session.truck_id().clone(),
                    existing: existing.id(),
                });
            }
        }
        sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<WeighingSession>, PortError> {
        self.check_available()?;
        Ok(self.sessions.read().get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<WeighingSession>, PortError> {
        self.check_available()?;
        let mut active: Vec<_> = self
            .sessions
            .read()
            .values()
            .filter(|s| !s.is_terminal())
            .cloned()
            .collect();
        active.sort_by_key(|s| s.timestamps().arrival);
        Ok(active)
    }

    async fn list_untransferred(&self, limit: usize) -> Result<Vec<WeighingSession>, PortError> {
        self.check_available()?;
        let mut pending: Vec<_> = self
            .sessions
            .read()
            .values()
            .filter(|s| s.state() == WeighingState::Completed && !s.is_transferred())
            .cloned()
            .collect();
        pending.sort_by_key(|s| s.ticket());
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_transferred(&self, id: SessionId) -> Result<(), PortError> {
        self.check_available()?;
        match self.sessions.write().get_mut(&id) {
            Some(session) => {
                session.mark_transferred();
                Ok(())
            }
            None => Err(PortError::NotFound(format!("session {id}"))),
        }
    }

    async fn max_ticket(&self) -> Result<Option<u64>, PortError> {
        self.check_available()?;
        Ok(self
            .sessions
            .read()
            .values()
            .filter_map(|s| s.ticket().map(TicketNumber::value))
            .max())
    }
}
