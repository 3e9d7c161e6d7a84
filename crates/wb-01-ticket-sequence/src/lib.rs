//! # WB-01: Ticket Sequence
//!
//! Hands out strictly increasing ticket numbers. A ticket is never returned
//! twice, including across restarts.
//!
//! ## Architecture
//!
//! - **Domain**: `TicketSequence`, a single atomic high-water mark
//! - **Ports**: Outbound `TicketCounterStore` (durable high-water mark) and
//!   `TicketSeedSource` (other stores that already hold issued tickets)
//! - **Service**: `SequenceAllocator`, seeding on startup and persisting
//!   after every allocation
//!
//! ## Seeding
//!
//! ```text
//! high_water = max( base - 1,
//!                   persisted counter,
//!                   max ticket of every seed source )
//! ```
//!
//! Allocation is one `fetch_update` on an atomic; persistence happens after
//! it, outside any exclusion. A failed persist burns the number, leaving a
//! gap but never a duplicate.

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::SequenceConfig;
pub use domain::errors::SequenceError;
pub use domain::sequence::TicketSequence;
pub use ports::outbound::{InMemoryTicketCounterStore, TicketCounterStore, TicketSeedSource};
pub use service::SequenceAllocator;
