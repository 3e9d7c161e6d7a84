//! Ports for weighing sessions.

pub mod outbound;
