//! # Weighing Session Entity
//!
//! Pure state transitions. Every method either applies its change completely
//! or returns an error and leaves the session untouched.

use super::errors::SessionError;
use serde::{Deserialize, Serialize};
use shared_types::{
    ClientName, DerivedWeights, OperationKind, PlanningEntry, PlanningId, ProductId, SessionId,
    Stability, TicketNumber, Timestamp, TruckId, WeighingPhase, WeighingState, Weight,
};
use tracing::warn;

/// One accepted scale reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightReading {
    pub weight: Weight,
    pub stability: Stability,
    pub recorded_at: Timestamp,
}

/// When each transition happened.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTimestamps {
    pub arrival: Timestamp,
    pub entry_weighing_started: Option<Timestamp>,
    pub zone_entered: Option<Timestamp>,
    pub exit_weighing_started: Option<Timestamp>,
    pub completed: Option<Timestamp>,
    pub cancelled: Option<Timestamp>,
    /// When the pending bridge request joined the queue; cleared on grant.
    #[serde(default)]
    pub bridge_queued: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeighingSession {
    id: SessionId,
    planning_id: PlanningId,
    truck_id: TruckId,
    client: ClientName,
    product: ProductId,
    operation: OperationKind,
    planned_quantity: Weight,
    state: WeighingState,
    entry: Option<WeightReading>,
    exit: Option<WeightReading>,
    derived: Option<DerivedWeights>,
    ticket: Option<TicketNumber>,
    timestamps: SessionTimestamps,
    /// Set once the historical store holds this session's record.
    transferred: bool,
}

/// Legal forward edges; CANCELLED is handled separately.
fn is_forward_edge(from: WeighingState, to: WeighingState) -> bool {
    use WeighingState::*;
    matches!(
        (from, to),
        (Arrival, EntryWeighing)
            | (EntryWeighing, Loading)
            | (EntryWeighing, Unloading)
            | (Loading, ExitWeighing)
            | (Unloading, ExitWeighing)
            | (ExitWeighing, Completed)
    )
}

impl WeighingSession {
    /// Open a session in ARRIVAL for an authorized planning entry.
    pub fn open(planning: &PlanningEntry, now: Timestamp) -> Self {
        Self::open_with_id(SessionId::new(), planning, now)
    }

    pub fn open_with_id(id: SessionId, planning: &PlanningEntry, now: Timestamp) -> Self {
        Self {
            id,
            planning_id: planning.id,
            truck_id: planning.truck_id.clone(),
            client: planning.client.clone(),
            product: planning.product.clone(),
            operation: planning.operation,
            planned_quantity: planning.planned_quantity,
            state: WeighingState::Arrival,
            entry: None,
            exit: None,
            derived: None,
            ticket: None,
            timestamps: SessionTimestamps {
                arrival: now,
                ..SessionTimestamps::default()
            },
            transferred: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn planning_id(&self) -> PlanningId {
        self.planning_id
    }

    pub fn truck_id(&self) -> &TruckId {
        &self.truck_id
    }

    pub fn client(&self) -> &ClientName {
        &self.client
    }

    pub fn product(&self) -> &ProductId {
        &self.product
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn planned_quantity(&self) -> Weight {
        self.planned_quantity
    }

    pub fn state(&self) -> WeighingState {
        self.state
    }

    pub fn entry_reading(&self) -> Option<WeightReading> {
        self.entry
    }

    pub fn exit_reading(&self) -> Option<WeightReading> {
        self.exit
    }

    pub fn entry_weight(&self) -> Option<Weight> {
        self.entry.map(|r| r.weight)
    }

    pub fn exit_weight(&self) -> Option<Weight> {
        self.exit.map(|r| r.weight)
    }

    /// Tare/gross/net; set only on completion.
    pub fn derived(&self) -> Option<DerivedWeights> {
        self.derived
    }

    pub fn ticket(&self) -> Option<TicketNumber> {
        self.ticket
    }

    pub fn timestamps(&self) -> &SessionTimestamps {
        &self.timestamps
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_transferred(&self) -> bool {
        self.transferred
    }

    /// Zone state this session branches into after entry weighing.
    pub fn zone_state(&self) -> WeighingState {
        match self.operation {
            OperationKind::Load => WeighingState::Loading,
            OperationKind::Unload => WeighingState::Unloading,
        }
    }

    /// Derived weights from the current readings, before completion.
    pub fn preview_derived(&self) -> Option<DerivedWeights> {
        match (self.entry, self.exit) {
            (Some(entry), Some(exit)) => Some(DerivedWeights::compute(
                self.operation,
                entry.weight,
                exit.weight,
            )),
            _ => None,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Check that `to` is the next legal state without changing anything.
    pub fn check_transition(&self, to: WeighingState) -> Result<(), SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
                reason: "session is terminal",
            });
        }
        if !is_forward_edge(self.state, to) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
                reason: "not the next state",
            });
        }
        Ok(())
    }

    /// ARRIVAL → ENTRY_WEIGHING. The caller has obtained the bridge.
    pub fn begin_entry_weighing(&mut self, now: Timestamp) -> Result<WeighingState, SessionError> {
        self.check_transition(WeighingState::EntryWeighing)?;
        self.timestamps.entry_weighing_started = Some(now);
        self.timestamps.bridge_queued = None;
        Ok(self.set_state(WeighingState::EntryWeighing))
    }

    /// Record a reading for `phase`. Accepted only while the session is in
    /// the matching weighing state; the caller also checks bridge occupancy.
    pub fn record_weight(
        &mut self,
        phase: WeighingPhase,
        weight: Weight,
        stability: Stability,
        now: Timestamp,
    ) -> Result<(), SessionError> {
        if self.state.weighing_phase() != Some(phase) {
            return Err(SessionError::StaleReading {
                session_id: self.id,
                phase,
                state: self.state,
            });
        }
        if !weight.is_positive() {
            return Err(SessionError::InvalidWeight(weight));
        }

        let reading = Some(WeightReading {
            weight,
            stability,
            recorded_at: now,
        });
        match phase {
            WeighingPhase::Entry => self.entry = reading,
            WeighingPhase::Exit => self.exit = reading,
        }
        Ok(())
    }

    /// ENTRY_WEIGHING → LOADING/UNLOADING. Requires the entry weight.
    pub fn enter_zone(&mut self, now: Timestamp) -> Result<WeighingState, SessionError> {
        let to = self.zone_state();
        self.check_transition(to)?;
        if self.entry.is_none() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to,
                reason: "entry weight not recorded",
            });
        }
        self.timestamps.zone_entered = Some(now);
        Ok(self.set_state(to))
    }

    /// LOADING/UNLOADING → EXIT_WEIGHING. The caller has obtained the bridge.
    pub fn begin_exit_weighing(&mut self, now: Timestamp) -> Result<WeighingState, SessionError> {
        self.check_transition(WeighingState::ExitWeighing)?;
        self.timestamps.exit_weighing_started = Some(now);
        self.timestamps.bridge_queued = None;
        Ok(self.set_state(WeighingState::ExitWeighing))
    }

    /// Note that the session waits for the bridge. The first call wins, so
    /// a retried request keeps its place. Returns whether anything changed.
    pub fn mark_queued(&mut self, now: Timestamp) -> bool {
        if self.timestamps.bridge_queued.is_some() {
            return false;
        }
        self.timestamps.bridge_queued = Some(now);
        true
    }

    /// The bridge phase this session is waiting for, if it is waiting.
    pub fn awaited_phase(&self) -> Option<WeighingPhase> {
        match self.state {
            WeighingState::Arrival => Some(WeighingPhase::Entry),
            WeighingState::Loading | WeighingState::Unloading
                if self.timestamps.bridge_queued.is_some() =>
            {
                Some(WeighingPhase::Exit)
            }
            _ => None,
        }
    }

    /// Check completion guards and compute the derived weights without
    /// changing anything.
    pub fn prepare_completion(&self) -> Result<DerivedWeights, SessionError> {
        self.check_transition(WeighingState::Completed)?;
        if self.ticket.is_some() {
            return Err(SessionError::TicketAlreadyAssigned(self.id));
        }
        let derived = self.preview_derived().ok_or(SessionError::InvalidTransition {
            from: self.state,
            to: WeighingState::Completed,
            reason: "both weights required",
        })?;
        if derived.is_inverted() {
            warn!(
                session_id = %self.id,
                truck_id = %self.truck_id,
                tare = %derived.tare,
                gross = %derived.gross,
                operation = ?self.operation,
                "Readings contradict operation kind; net taken as absolute difference"
            );
        }
        Ok(derived)
    }

    /// EXIT_WEIGHING → COMPLETED with the ticket already allocated.
    pub fn complete(
        &mut self,
        ticket: TicketNumber,
        now: Timestamp,
    ) -> Result<DerivedWeights, SessionError> {
        let derived = self.prepare_completion()?;
        self.ticket = Some(ticket);
        self.derived = Some(derived);
        self.timestamps.completed = Some(now);
        self.set_state(WeighingState::Completed);
        Ok(derived)
    }

    /// Any non-terminal state → CANCELLED. Returns the state left.
    pub fn cancel(&mut self, now: Timestamp) -> Result<WeighingState, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: WeighingState::Cancelled,
                reason: "session is terminal",
            });
        }
        self.timestamps.cancelled = Some(now);
        Ok(self.set_state(WeighingState::Cancelled))
    }

    /// Record that the historical store holds this session.
    pub fn mark_transferred(&mut self) {
        if self.state == WeighingState::Completed {
            self.transferred = true;
        }
    }

    fn set_state(&mut self, to: WeighingState) -> WeighingState {
        std::mem::replace(&mut self.state, to)
    }
}
