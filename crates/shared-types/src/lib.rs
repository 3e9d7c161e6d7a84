//! # Shared Types Crate
//!
//! Domain vocabulary shared by every weighbridge subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifiers, weights and session states used
//!   across subsystem boundaries are defined here and nowhere else.
//! - **Fixed-point weights**: [`Weight`] stores milli-tons as an integer, so
//!   every comparison and difference is exact to 0.001 t.
//! - **Deterministic time**: components read the clock through
//!   [`TimeSource`] so tests can drive it by hand.

pub mod entities;
pub mod errors;
pub mod time;
pub mod weight;

pub use entities::*;
pub use errors::*;
pub use time::{date_time_of, ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
pub use weight::Weight;
