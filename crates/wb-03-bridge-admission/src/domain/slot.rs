//! The bridge slot: one holder, one FIFO queue.

use serde::{Deserialize, Serialize};
use shared_types::{SessionId, WeighingPhase};
use std::collections::VecDeque;

/// A session asking for the bridge for one of its two weighings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub session_id: SessionId,
    pub phase: WeighingPhase,
}

/// Answer to a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    Granted,
    /// 1-based position in the wait queue.
    Queued { position: usize },
}

/// Handed to the next waiter when the holder releases.
pub type Grant = BridgeRequest;

/// Snapshot for dashboards and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub holder: Option<BridgeRequest>,
    pub queue: Vec<BridgeRequest>,
}

/// Holder plus FIFO wait list. All operations are O(queue length) at worst.
#[derive(Debug, Default)]
pub struct BridgeSlot {
    holder: Option<BridgeRequest>,
    queue: VecDeque<BridgeRequest>,
}

impl BridgeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant if free, otherwise enqueue. Idempotent for a session that is
    /// already holder or already waiting.
    pub fn request(&mut self, request: BridgeRequest) -> Admission {
        if self.holds(request.session_id) {
            return Admission::Granted;
        }
        if let Some(position) = self.position(request.session_id) {
            return Admission::Queued { position };
        }
        if self.holder.is_none() && self.queue.is_empty() {
            self.holder = Some(request);
            return Admission::Granted;
        }
        self.queue.push_back(request);
        Admission::Queued {
            position: self.queue.len(),
        }
    }

    /// Release if `session_id` is holder; returns the next holder, if any.
    ///
    /// A release by a non-holder changes nothing.
    pub fn release(&mut self, session_id: SessionId) -> Option<Grant> {
        if !self.holds(session_id) {
            return None;
        }
        self.holder = self.queue.pop_front();
        self.holder
    }

    /// Remove every queued request of `session_id`. Returns whether any was
    /// removed. Does not touch the holder.
    pub fn withdraw(&mut self, session_id: SessionId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|r| r.session_id != session_id);
        self.queue.len() != before
    }

    /// Install a holder directly (restart recovery). Only when free.
    pub fn install_holder(&mut self, request: BridgeRequest) -> Result<(), SessionId> {
        match self.holder {
            Some(current) if current.session_id != request.session_id => Err(current.session_id),
            _ => {
                self.queue.retain(|r| r.session_id != request.session_id);
                self.holder = Some(request);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn holds(&self, session_id: SessionId) -> bool {
        self.holder.is_some_and(|h| h.session_id == session_id)
    }

    #[must_use]
    pub fn holder(&self) -> Option<BridgeRequest> {
        self.holder
    }

    /// 1-based queue position of `session_id`.
    #[must_use]
    pub fn position(&self, session_id: SessionId) -> Option<usize> {
        self.queue
            .iter()
            .position(|r| r.session_id == session_id)
            .map(|i| i + 1)
    }

    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn status(&self) -> BridgeStatus {
        BridgeStatus {
            holder: self.holder,
            queue: self.queue.iter().copied().collect(),
        }
    }
}
