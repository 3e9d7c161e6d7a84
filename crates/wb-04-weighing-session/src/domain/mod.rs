//! Domain layer for weighing sessions.

pub mod errors;
pub mod session;
