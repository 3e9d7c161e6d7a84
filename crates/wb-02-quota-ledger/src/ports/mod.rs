//! Ports for the quota ledger.

pub mod outbound;
