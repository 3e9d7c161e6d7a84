//! Bridge gate over the admission controller.

use facility_telemetry::metrics::set_bridge_state;
use shared_types::{SessionId, WeighingPhase};
use std::sync::Arc;
use wb_03_bridge_admission::{Admission, BridgeAdmissionController};
use wb_04_weighing_session::{BridgeGate, GateAdmission, HandOff};

pub struct BridgeGateAdapter {
    controller: Arc<BridgeAdmissionController>,
}

impl BridgeGateAdapter {
    pub fn new(controller: Arc<BridgeAdmissionController>) -> Self {
        Self { controller }
    }

    fn observe(&self) {
        let status = self.controller.status();
        set_bridge_state(status.holder.is_some(), status.queue.len());
    }
}

impl BridgeGate for BridgeGateAdapter {
    fn request(&self, session_id: SessionId, phase: WeighingPhase) -> GateAdmission {
        let admission = match self.controller.request_occupancy(session_id, phase) {
            Admission::Granted => GateAdmission::Granted,
            Admission::Queued { position } => GateAdmission::Queued { position },
        };
        self.observe();
        admission
    }

    fn holds(&self, session_id: SessionId) -> bool {
        self.controller.holds(session_id)
    }

    fn release(&self, session_id: SessionId) -> Option<HandOff> {
        let grant = self.controller.release(session_id);
        self.observe();
        grant.map(|g| HandOff {
            session_id: g.session_id,
            phase: g.phase,
        })
    }

    fn withdraw(&self, session_id: SessionId) -> bool {
        let removed = self.controller.withdraw(session_id);
        self.observe();
        removed
    }
}
