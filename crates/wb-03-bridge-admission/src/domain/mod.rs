//! Domain layer for bridge admission.

pub mod errors;
pub mod slot;
