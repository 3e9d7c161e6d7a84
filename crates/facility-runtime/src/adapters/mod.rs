//! # Port Adapters
//!
//! Implement each subsystem's outbound ports over the other subsystems.
//!
//! | Adapter | Port | Backed by |
//! |---------|------|-----------|
//! | `BridgeGateAdapter` | `BridgeGate` | wb-03 `BridgeAdmissionController` |
//! | `QuotaGateAdapter` | `QuotaGate` | wb-02 `QuotaService` |
//! | `TicketIssuerAdapter` | `TicketIssuer` | wb-01 `SequenceAllocator` |
//! | `PlanningBook` | `PlanningAuthority` | in-memory planning table |
//! | `SessionRepositorySource` | `CompletedSessionSource` | wb-04 `SessionRepository` |
//! | `HistoricalSeed`, `SessionSeed` | `TicketSeedSource` | wb-05 store, wb-04 repository |
//! | `TelemetryObserver` | `TransferObserver` | metrics + event bus |

pub mod bridge;
pub mod observer;
pub mod planning;
pub mod quota;
pub mod sessions;
pub mod tickets;

pub use bridge::BridgeGateAdapter;
pub use observer::TelemetryObserver;
pub use planning::PlanningBook;
pub use quota::QuotaGateAdapter;
pub use sessions::{transfer_candidate, HistoricalSeed, SessionRepositorySource, SessionSeed};
pub use tickets::TicketIssuerAdapter;
