//! Domain layer for the ticket sequence.

pub mod errors;
pub mod sequence;
