//! Bridge admission error types.

use shared_types::SessionId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The session left the queue (withdrawn or cancelled) while waiting.
    #[error("Session {0} withdrawn from the bridge queue")]
    Withdrawn(SessionId),

    /// The controller was dropped while a session was waiting.
    #[error("Bridge controller closed")]
    Closed,

    /// Restoring a holder over an existing one.
    #[error("Bridge already held by {holder}")]
    AlreadyHeld { holder: SessionId },
}
