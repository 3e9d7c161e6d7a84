//! # WB-04: Weighing Session
//!
//! One truck's pass through the facility for one planned operation.
//!
//! ## State Machine
//!
//! ```text
//! ARRIVAL ──grant──→ ENTRY_WEIGHING ──entry weight──→ LOADING | UNLOADING
//!                                                          │
//!      COMPLETED ←──both weights── EXIT_WEIGHING ←──grant──┘
//!
//!      any non-terminal ──→ CANCELLED
//! ```
//!
//! The LOADING/UNLOADING branch is fixed at creation by the planning entry's
//! operation kind and decides which reading is tare and which is gross.
//!
//! ## Architecture
//!
//! - **Domain**: `WeighingSession` (pure transitions, no I/O) and `SessionError`
//! - **Ports**: Outbound `BridgeGate`, `QuotaGate`, `TicketIssuer`,
//!   `PlanningAuthority`, `SessionRepository`
//! - **Service**: `SessionService`, driving one session through the ports
//!
//! The service mutates a `&mut WeighingSession`; serializing access per
//! session is the caller's job.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::SessionError;
pub use domain::session::{SessionTimestamps, WeighingSession, WeightReading};
pub use ports::outbound::{
    BridgeGate, GateAdmission, HandOff, InMemorySessionRepository, PlanningAuthority, PortError,
    QuotaCheck, QuotaDebit, QuotaGate, SessionRepository, TicketIssuer,
};
pub use service::{CancelReport, CompletionReport, SessionPorts, SessionService, ZoneTransition};
