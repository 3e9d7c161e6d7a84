//! Quota ledger error types.

use shared_types::{ClientName, Weight};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    /// Debits must be non-negative; refunds go through `reset`.
    #[error("Negative debit {amount} for client {client}")]
    NegativeDebit { client: ClientName, amount: Weight },

    /// Allotments must be non-negative.
    #[error("Invalid allotment {total} for client {client}")]
    InvalidAllotment { client: ClientName, total: Weight },

    /// Backing repository failed.
    #[error("Quota repository error: {0}")]
    Repository(String),
}
