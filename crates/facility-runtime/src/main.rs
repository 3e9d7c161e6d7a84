//! # Weighbridge Facility
//!
//! Binary entry point.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging, metrics registry)
//! 2. Load configuration from `WB_*` environment variables
//! 3. Build the subsystem container, seeding the ticket sequence
//! 4. Restore in-flight sessions and start the reconciliation sweeper
//! 5. Run until Ctrl+C

use anyhow::{Context, Result};
use tracing::info;

use facility_runtime::{FacilityBackends, FacilityConfig, FacilityContainer, FacilityRuntime};
use facility_telemetry::{init_telemetry, TelemetryConfig};

/// Load configuration from the environment.
fn load_config() -> FacilityConfig {
    let config = FacilityConfig::from_env();
    info!(
        ticket_base = config.sequence.base,
        sweep_interval_ms = config.reconciliation.interval_ms,
        sweep_batch = config.reconciliation.batch_size,
        fast_path = config.orchestrator.fast_path_transfer,
        "Configuration loaded"
    );
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = load_config();

    let container = FacilityContainer::build(config, FacilityBackends::in_memory())
        .await
        .context("Failed to build facility container")?;
    let runtime = FacilityRuntime::new(container);
    runtime.start().await?;

    info!("Facility is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
