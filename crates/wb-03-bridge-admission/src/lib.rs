//! # WB-03: Bridge Admission
//!
//! Enforces that exactly one session occupies the weighbridge at a time and
//! serves everyone else strictly first-come, first-served.
//!
//! ```text
//!             request_occupancy()
//!  session ──────────────────────→ ┌─────────────┐
//!                                  │   holder    │──→ Granted
//!                                  ├─────────────┤
//!                                  │ queue (FIFO)│──→ Queued(position)
//!                                  └─────────────┘
//!             release()                   │
//!  holder ──────────────────────→  pop front ──→ Grant for next waiter
//! ```
//!
//! One queue serves both phases: a truck coming back for its exit weighing
//! waits behind every request issued before it, entry or exit.
//!
//! ## Notification
//!
//! A waiter learns of its grant in any of three ways:
//! - `release` returns the `Grant` to the caller, who hands it over;
//! - `acquire` suspends until the session becomes holder;
//! - `watch_holder` yields every holder change.
//!
//! The slot mutex guards pure in-memory state; no I/O happens under it.

pub mod domain;
pub mod service;

pub use domain::errors::AdmissionError;
pub use domain::slot::{Admission, BridgeRequest, BridgeSlot, BridgeStatus, Grant};
pub use service::BridgeAdmissionController;
