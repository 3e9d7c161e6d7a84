//! Ports for the ticket sequence.

pub mod outbound;
