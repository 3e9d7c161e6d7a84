//! Transfer observer feeding metrics and the event bus.

use facility_telemetry::metrics::{record_transfer, SWEEP_DURATION, SWEEP_FAILURE_STREAK};
use shared_bus::{InMemoryEventBus, WeighbridgeEvent};
use std::sync::Arc;
use std::time::Duration;
use wb_05_reconciliation::{SweepReport, TransferCandidate, TransferObserver, TransferOutcome};

pub struct TelemetryObserver {
    bus: Arc<InMemoryEventBus>,
}

impl TelemetryObserver {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

impl TransferObserver for TelemetryObserver {
    fn on_transfer(&self, candidate: &TransferCandidate, outcome: &TransferOutcome) {
        let status = outcome.status();
        record_transfer(status.as_str());
        self.bus.send(WeighbridgeEvent::TransferRecorded {
            session_id: candidate.session_id,
            ticket_number: candidate.ticket,
            status,
        });
    }

    fn on_sweep(&self, report: &SweepReport, elapsed: Duration) {
        SWEEP_DURATION.observe(elapsed.as_secs_f64());
        if report.is_clean() {
            SWEEP_FAILURE_STREAK.set(0);
        }
    }

    fn on_sweep_failed(&self, failures: u32) {
        SWEEP_FAILURE_STREAK.set(i64::from(failures));
    }
}
