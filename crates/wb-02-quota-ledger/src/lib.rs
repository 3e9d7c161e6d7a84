//! # WB-02: Quota Ledger
//!
//! Tracks each client's consumption against its allotment and refuses new
//! arrivals once the allotment is exceeded.
//!
//! ## Rules
//!
//! | Situation | `check_available` |
//! |-----------|-------------------|
//! | no record for the client | `Available { remaining: None }` (unlimited) |
//! | `blocked` flag set | `Blocked(Exceeded)` |
//! | `remaining <= 0` | `Blocked(Exhausted)` |
//! | otherwise | `Available { remaining: Some(..) }` |
//!
//! `debit` is additive and may push `consumed` past `total`. The first time
//! `consumed > total` is observed the record is flagged blocked, and stays
//! blocked until an external `reset`.
//!
//! ## Concurrency
//!
//! Each record sits behind its own mutex, so debits for one client are
//! serialized while debits for different clients proceed in parallel. The
//! outer map lock is only held to find or insert a record.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::QuotaError;
pub use domain::ledger::QuotaLedger;
pub use domain::record::{Availability, BlockReason, DebitReceipt, QuotaRecord};
pub use ports::outbound::{InMemoryQuotaRepository, QuotaRepository};
pub use service::QuotaService;
