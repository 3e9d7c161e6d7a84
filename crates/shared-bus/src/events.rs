//! # Weighbridge Events
//!
//! Notifications published by the orchestrator and the reconciliation engine.
//!
//! | Event | Topic | Emitted when |
//! |-------|-------|--------------|
//! | `TruckArrived` | Arrival | a detected truck is matched to a session |
//! | `ArrivalRejected` | Arrival | planning or quota refuses a detected truck |
//! | `StateChanged` | Session | every state transition |
//! | `WeightUpdated` | Weight | an accepted scale reading |
//! | `BridgeGranted` | Bridge | a queued session is handed the bridge |
//! | `Completed` | Completion | ticket issued and quota debited |
//! | `Cancelled` | Session | session escaped to CANCELLED |
//! | `TransferRecorded` | Reconciliation | historical transfer attempt finished |

use serde::{Deserialize, Serialize};
use shared_types::{
    ClientName, DerivedWeights, OperationKind, ProductId, SessionId, Stability, TicketNumber,
    TransferStatus, TruckId, WeighingPhase, WeighingState, Weight,
};

/// All notifications carried by the bus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeighbridgeEvent {
    TruckArrived {
        session_id: SessionId,
        truck_id: TruckId,
        client: ClientName,
        product: ProductId,
        operation: OperationKind,
        /// True when the truck already had an open session.
        existing: bool,
    },

    ArrivalRejected {
        truck_id: TruckId,
        reason: String,
    },

    StateChanged {
        session_id: SessionId,
        truck_id: TruckId,
        old_state: WeighingState,
        new_state: WeighingState,
    },

    WeightUpdated {
        session_id: SessionId,
        weight: Weight,
        phase: WeighingPhase,
        stability: Stability,
        derived: Option<DerivedWeights>,
    },

    BridgeGranted {
        session_id: SessionId,
        phase: WeighingPhase,
    },

    Completed {
        session_id: SessionId,
        ticket_number: TicketNumber,
        net_weight: Weight,
        client: ClientName,
    },

    Cancelled {
        session_id: SessionId,
        truck_id: TruckId,
        previous_state: WeighingState,
    },

    TransferRecorded {
        session_id: SessionId,
        ticket_number: TicketNumber,
        status: TransferStatus,
    },
}

impl WeighbridgeEvent {
    /// Topic used for subscription filtering.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TruckArrived { .. } | Self::ArrivalRejected { .. } => EventTopic::Arrival,
            Self::StateChanged { .. } | Self::Cancelled { .. } => EventTopic::Session,
            Self::WeightUpdated { .. } => EventTopic::Weight,
            Self::BridgeGranted { .. } => EventTopic::Bridge,
            Self::Completed { .. } => EventTopic::Completion,
            Self::TransferRecorded { .. } => EventTopic::Reconciliation,
        }
    }

    /// Session the event concerns, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            Self::ArrivalRejected { .. } => None,
            Self::TruckArrived { session_id, .. }
            | Self::StateChanged { session_id, .. }
            | Self::WeightUpdated { session_id, .. }
            | Self::BridgeGranted { session_id, .. }
            | Self::Completed { session_id, .. }
            | Self::Cancelled { session_id, .. }
            | Self::TransferRecorded { session_id, .. } => Some(*session_id),
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Arrival,
    Session,
    Weight,
    Bridge,
    Completion,
    Reconciliation,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Sessions to include. Empty means all sessions.
    pub sessions: Vec<SessionId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            sessions: Vec::new(),
        }
    }

    /// Create a filter following a single session.
    #[must_use]
    pub fn session(session_id: SessionId) -> Self {
        Self {
            topics: Vec::new(),
            sessions: vec![session_id],
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &WeighbridgeEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let session_match = self.sessions.is_empty()
            || event
                .session_id()
                .is_some_and(|id| self.sessions.contains(&id));

        topic_match && session_match
    }
}
