//! Cross-crate tests driving the facility through its orchestrator.

pub mod properties;
pub mod scenarios;
