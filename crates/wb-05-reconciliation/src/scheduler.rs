//! Recurring sweep with jittered backoff on repeated failures.

use crate::config::ReconciliationConfig;
use crate::ports::outbound::TransferObserver;
use crate::service::ReconciliationService;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct SweepScheduler {
    service: Arc<ReconciliationService>,
    observer: Arc<dyn TransferObserver>,
    config: ReconciliationConfig,
}

impl SweepScheduler {
    pub fn new(
        service: Arc<ReconciliationService>,
        observer: Arc<dyn TransferObserver>,
        config: ReconciliationConfig,
    ) -> Self {
        Self {
            service,
            observer,
            config,
        }
    }

    /// Sweep until `shutdown` changes or its sender is dropped.
    ///
    /// A sweep with a deferred transfer or a failing source counts as a
    /// failure; a clean sweep resets the backoff.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.config.interval_ms,
            batch = self.config.batch_size,
            "Reconciliation sweeper started"
        );
        let mut failures: u32 = 0;

        loop {
            let delay = self.config.next_delay(failures);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("Reconciliation sweeper stopping");
                    return;
                }
            }

            let started = Instant::now();
            match self.service.sweep().await {
                Ok(report) => {
                    self.observer.on_sweep(&report, started.elapsed());
                    if report.is_clean() {
                        failures = 0;
                    } else {
                        failures = failures.saturating_add(1);
                        self.observer.on_sweep_failed(failures);
                    }
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    warn!(error = %e, failures, "Sweep failed");
                    self.observer.on_sweep_failed(failures);
                }
            }
        }
    }
}
