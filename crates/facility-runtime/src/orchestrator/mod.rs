//! # Orchestrator
//!
//! Entry point for external events: truck detection, operator commands and
//! scale readings. Every command is scoped to one session.

pub mod errors;
pub mod service;

pub use errors::OrchestratorError;
pub use service::{ArrivalOutcome, Orchestrator, RestoreReport};
