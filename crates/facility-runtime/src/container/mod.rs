//! # Facility Container
//!
//! Configuration and the container holding every subsystem instance.

pub mod config;
pub mod subsystems;

pub use config::{FacilityConfig, OrchestratorConfig};
pub use subsystems::{
    ConcreteQuotaService, ConcreteSequenceAllocator, ContainerError, FacilityBackends,
    FacilityContainer,
};
