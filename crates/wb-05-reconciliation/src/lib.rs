//! # WB-05: Reconciliation
//!
//! At-least-once transfer of COMPLETED sessions into the historical store,
//! with idempotent effect.
//!
//! ## Architecture
//!
//! - **Domain**: `TransferCandidate`, `HistoricalRecord`, `TransferOutcome`
//! - **Ports**: Outbound `HistoricalStore`, `CompletedSessionSource`,
//!   `TransferObserver`
//! - **Resolver**: natural-key get-or-create of trucks, clients and products
//! - **Service**: `ReconciliationService` (single transfer and sweep)
//! - **Scheduler**: `SweepScheduler`, periodic sweep with backoff
//!
//! The ticket number is the idempotency key. Both the sweep and the fast
//! path at completion check the store for it before inserting, so racing
//! attempts produce one row.

pub mod config;
pub mod domain;
pub mod ports;
pub mod resolver;
pub mod scheduler;
pub mod service;

pub use config::ReconciliationConfig;
pub use domain::errors::{ReconciliationError, StoreError};
pub use domain::record::{
    HistoricalRecord, NewReference, RecordId, RefId, ReferenceKind, ResolvedRefs, SweepReport,
    TransferCandidate, TransferOutcome, UNKNOWN_PRODUCT,
};
pub use ports::outbound::{
    CompletedSessionSource, HistoricalStore, InMemoryHistoricalStore, NoopObserver,
    TransferObserver,
};
pub use resolver::EntityResolver;
pub use scheduler::SweepScheduler;
pub use service::ReconciliationService;
