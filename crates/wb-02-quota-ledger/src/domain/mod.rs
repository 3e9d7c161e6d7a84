//! Domain layer for the quota ledger.

pub mod errors;
pub mod ledger;
pub mod record;
