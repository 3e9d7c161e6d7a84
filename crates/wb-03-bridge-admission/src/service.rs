//! # Bridge Admission Controller
//!
//! Process-wide owner of the [`BridgeSlot`]. Injected into the orchestrator;
//! never a global.

use crate::domain::errors::AdmissionError;
use crate::domain::slot::{Admission, BridgeRequest, BridgeSlot, BridgeStatus, Grant};
use parking_lot::Mutex;
use shared_types::{SessionId, WeighingPhase};
use tokio::sync::watch;
use tracing::{debug, info};

pub struct BridgeAdmissionController {
    slot: Mutex<BridgeSlot>,
    holder_tx: watch::Sender<Option<BridgeRequest>>,
}

impl Default for BridgeAdmissionController {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeAdmissionController {
    pub fn new() -> Self {
        let (holder_tx, _) = watch::channel(None);
        Self {
            slot: Mutex::new(BridgeSlot::new()),
            holder_tx,
        }
    }

    /// Ask for the bridge. Never blocks.
    pub fn request_occupancy(&self, session_id: SessionId, phase: WeighingPhase) -> Admission {
        let request = BridgeRequest { session_id, phase };
        let (admission, holder) = {
            let mut slot = self.slot.lock();
            (slot.request(request), slot.holder())
        };

        match admission {
            Admission::Granted => {
                self.publish_holder(holder);
                info!(session_id = %session_id, phase = %phase, "Bridge granted");
            }
            Admission::Queued { position } => {
                debug!(session_id = %session_id, phase = %phase, position, "Bridge busy, queued");
            }
        }
        admission
    }

    /// Request and suspend until `session_id` holds the bridge.
    ///
    /// Fails with `Withdrawn` if the session leaves the queue while waiting.
    /// Dropping the future leaves the request queued.
    pub async fn acquire(
        &self,
        session_id: SessionId,
        phase: WeighingPhase,
    ) -> Result<(), AdmissionError> {
        let mut rx = self.holder_tx.subscribe();
        if self.request_occupancy(session_id, phase) == Admission::Granted {
            return Ok(());
        }

        loop {
            rx.changed().await.map_err(|_| AdmissionError::Closed)?;
            let slot = self.slot.lock();
            if slot.holds(session_id) {
                return Ok(());
            }
            if slot.position(session_id).is_none() {
                return Err(AdmissionError::Withdrawn(session_id));
            }
        }
    }

    /// Release the bridge if `session_id` holds it. Returns the grant made to
    /// the next waiter so the caller can hand it over.
    pub fn release(&self, session_id: SessionId) -> Option<Grant> {
        let (was_holder, grant) = {
            let mut slot = self.slot.lock();
            let was_holder = slot.holds(session_id);
            (was_holder, slot.release(session_id))
        };

        if !was_holder {
            debug!(session_id = %session_id, "Release by non-holder ignored");
            return None;
        }

        self.publish_holder(grant);
        match grant {
            Some(next) => info!(
                released = %session_id,
                granted = %next.session_id,
                phase = %next.phase,
                "Bridge released and handed over"
            ),
            None => info!(released = %session_id, "Bridge released, now free"),
        }
        grant
    }

    /// Leave the wait queue. Returns whether the session was queued.
    pub fn withdraw(&self, session_id: SessionId) -> bool {
        let removed = self.slot.lock().withdraw(session_id);
        if removed {
            debug!(session_id = %session_id, "Withdrawn from bridge queue");
            // Wake any `acquire` waiting for this session.
            self.holder_tx.send_modify(|_| {});
        }
        removed
    }

    /// Reinstate a holder recorded before a restart.
    pub fn restore_holder(
        &self,
        session_id: SessionId,
        phase: WeighingPhase,
    ) -> Result<(), AdmissionError> {
        let request = BridgeRequest { session_id, phase };
        self.slot
            .lock()
            .install_holder(request)
            .map_err(|holder| AdmissionError::AlreadyHeld { holder })?;
        self.publish_holder(Some(request));
        info!(session_id = %session_id, phase = %phase, "Bridge holder restored");
        Ok(())
    }

    pub fn holder(&self) -> Option<BridgeRequest> {
        self.slot.lock().holder()
    }

    pub fn holds(&self, session_id: SessionId) -> bool {
        self.slot.lock().holds(session_id)
    }

    pub fn position(&self, session_id: SessionId) -> Option<usize> {
        self.slot.lock().position(session_id)
    }

    pub fn status(&self) -> BridgeStatus {
        self.slot.lock().status()
    }

    /// Receiver yielding every holder change.
    pub fn watch_holder(&self) -> watch::Receiver<Option<BridgeRequest>> {
        self.holder_tx.subscribe()
    }

    fn publish_holder(&self, holder: Option<BridgeRequest>) {
        self.holder_tx.send_replace(holder);
    }
}
