//! Ports for reconciliation.

pub mod outbound;
