//! Reconciliation error types.

use shared_types::TicketNumber;
use thiserror::Error;

/// Failure reported by the historical store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store unreachable; the transfer is deferred.
    #[error("Historical store unavailable: {0}")]
    Unavailable(String),

    /// Unique-ticket constraint hit on insert.
    #[error("Ticket {0} already recorded")]
    AlreadyExists(TicketNumber),

    /// Any other constraint violation.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    /// Completed sessions could not be listed or confirmed.
    #[error("Completed-session source failed: {0}")]
    Source(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
