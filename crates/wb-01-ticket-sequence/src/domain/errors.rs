//! Ticket sequence error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The counter reached `u64::MAX`.
    #[error("Ticket sequence exhausted at {high_water}")]
    Exhausted { high_water: u64 },

    /// The durable high-water mark could not be read or written.
    #[error("Ticket counter store failed: {0}")]
    Store(String),

    /// A seed source could not report its highest ticket.
    #[error("Ticket seed source {source_name} failed: {reason}")]
    Seed { source_name: String, reason: String },
}
