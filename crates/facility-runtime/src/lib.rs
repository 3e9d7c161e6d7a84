//! # Facility Runtime
//!
//! Composition root for a weighbridge facility: builds the subsystem
//! container, restores in-flight sessions and runs the reconciliation
//! sweeper until shutdown.
//!
//! ## Modules
//!
//! - `adapters/` - Port implementations connecting the subsystems
//! - `container/` - Configuration and subsystem container
//! - `orchestrator/` - External event handling per session
//!
//! ## Flow
//!
//! ```text
//! gate ──truck_detected──→ Orchestrator ──→ wb-04 SessionService
//!                              │                 │  │  │
//!                              │        wb-03 bridge  │  wb-01 tickets
//!                              │                 wb-02 quota
//!                              ↓
//!                          Event Bus ←── wb-05 reconciliation (sweeper)
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod container;
pub mod orchestrator;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub use container::{FacilityBackends, FacilityConfig, FacilityContainer};
pub use orchestrator::{ArrivalOutcome, Orchestrator, OrchestratorError};

/// Grace period for background tasks at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Running facility: container plus background tasks.
pub struct FacilityRuntime {
    container: Arc<FacilityContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FacilityRuntime {
    pub fn new(container: FacilityContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Restore in-flight sessions and start the sweeper.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Weighbridge Facility Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let report = self
            .container
            .orchestrator
            .restore()
            .await
            .context("Failed to restore sessions")?;
        if report.restored > 0 {
            info!(
                "Resumed {} session(s), {} waiting for the bridge",
                report.restored, report.queued
            );
        }

        let sweeper = self.container.sweeper();
        let mut shutdown = self.shutdown_rx.clone();
        let sweeper_shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = sweeper.run(sweeper_shutdown) => {}
                _ = shutdown.changed() => {
                    info!("[wb-05] Shutdown signal received");
                }
            }
        });
        self.tasks.lock().push(handle);

        info!("Facility running");
        Ok(())
    }

    /// Signal shutdown and wait for background tasks.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Background task ended abnormally: {}", e),
                Err(_) => warn!("Background task did not stop within the grace period"),
            }
        }

        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<FacilityContainer> {
        Arc::clone(&self.container)
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        Arc::clone(&self.container.orchestrator)
    }
}
