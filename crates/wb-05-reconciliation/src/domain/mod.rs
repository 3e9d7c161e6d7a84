//! Domain layer for reconciliation.

pub mod errors;
pub mod record;
