//! # Orchestrator
//!
//! Receives external events and drives sessions, the bridge and the quota
//! ledger together.
//!
//! ## Locking
//!
//! Each session sits behind its own async mutex; commands for different
//! trucks never wait on each other. A task holds at most one session lock at
//! a time: when a release hands the bridge to a waiter, the releasing
//! session's lock is dropped before the waiter's is taken.
//!
//! ## Hand-off
//!
//! ```text
//! T1 zone/complete/cancel ──release──→ HandOff(T2, phase)
//!                                          │
//!                        lock T2 ──→ ENTRY_WEIGHING | EXIT_WEIGHING
//!                                          │
//!                               BridgeGranted + StateChanged
//! ```
//!
//! A waiter that can no longer take the bridge (cancelled meanwhile) passes
//! it straight on to the next one.

use crate::adapters::transfer_candidate;
use crate::orchestrator::errors::OrchestratorError;
use facility_telemetry::log_session_event;
use facility_telemetry::metrics::{
    record_arrival_rejected, ACTIVE_SESSIONS, NET_WEIGHED_TONS, SESSIONS_CANCELLED,
    SESSIONS_COMPLETED, SESSIONS_STARTED,
};
use parking_lot::{Mutex, RwLock};
use shared_bus::{EventPublisher, InMemoryEventBus, WeighbridgeEvent};
use shared_types::{
    DerivedWeights, PlanningStatus, SessionId, Stability, TruckId, WeighingPhase, WeighingState,
    Weight,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as SessionLock;
use tracing::{debug, error, info, warn};
use wb_03_bridge_admission::{BridgeAdmissionController, BridgeStatus};
use wb_04_weighing_session::{
    CompletionReport, HandOff, QuotaCheck, SessionError, SessionService,
    WeighingSession,
};
use wb_05_reconciliation::ReconciliationService;

type SessionHandle = Arc<SessionLock<WeighingSession>>;

/// Answer to a truck detection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrivalOutcome {
    /// New session. `queue_position` is set when the bridge was busy.
    Created {
        session: WeighingSession,
        queue_position: Option<usize>,
    },
    /// The truck already had a non-terminal session.
    AlreadyActive { session: WeighingSession },
}

impl ArrivalOutcome {
    pub fn session(&self) -> &WeighingSession {
        match self {
            ArrivalOutcome::Created { session, .. } | ArrivalOutcome::AlreadyActive { session } => {
                session
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub holder: Option<SessionId>,
    pub queued: usize,
}

pub struct Orchestrator {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    active_by_truck: Mutex<HashMap<TruckId, SessionId>>,
    service: SessionService,
    bridge: Arc<BridgeAdmissionController>,
    bus: Arc<InMemoryEventBus>,
    /// Fast-path transfer at completion, when enabled.
    transfer: Option<Arc<ReconciliationService>>,
}

impl Orchestrator {
    pub fn new(
        service: SessionService,
        bridge: Arc<BridgeAdmissionController>,
        bus: Arc<InMemoryEventBus>,
        transfer: Option<Arc<ReconciliationService>>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            active_by_truck: Mutex::new(HashMap::new()),
            service,
            bridge,
            bus,
            transfer,
        }
    }

    // =========================================================================
    // Arrival
    // =========================================================================

    /// A truck was recognised at the gate.
    ///
    /// Authorizes against planning, checks quota, opens the session and asks
    /// for the bridge straight away.
    pub async fn truck_detected(
        &self,
        truck_id: impl Into<TruckId>,
    ) -> Result<ArrivalOutcome, OrchestratorError> {
        let truck_id = truck_id.into();
        if let Some(existing) = self.active_session_of(&truck_id) {
            return self.already_active(existing).await;
        }

        let ports = self.service.ports();
        let entry = match ports.planning.authorize_arrival(&truck_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(self.reject(OrchestratorError::NotPlanned(truck_id)).await),
            Err(e) => return Err(OrchestratorError::Planning(e)),
        };

        if let QuotaCheck::Blocked { reason } = ports.quota.check(&entry.client) {
            return Err(self
                .reject(OrchestratorError::QuotaBlocked {
                    truck_id,
                    client: entry.client,
                    reason,
                })
                .await);
        }

        let handle: SessionHandle = Arc::new(SessionLock::new(WeighingSession::open(
            &entry,
            self.service.now(),
        )));
        let mut session = handle.lock().await;

        // The truck index is the uniqueness guard for concurrent detections.
        let clash = {
            let mut index = self.active_by_truck.lock();
            match index.get(&truck_id).copied() {
                Some(existing) => Some(existing),
                None => {
                    index.insert(truck_id.clone(), session.id());
                    self.sessions.write().insert(session.id(), Arc::clone(&handle));
                    None
                }
            }
        };
        if let Some(existing) = clash {
            return self.already_active(existing).await;
        }

        if let Err(e) = ports.repository.save(&session).await {
            error!(truck_id = %truck_id, error = %e, "Session not created: store refused it");
            self.forget(&truck_id, session.id());
            return Err(OrchestratorError::Repository(e));
        }

        if let Err(e) = ports
            .planning
            .set_status(entry.id, PlanningStatus::InProgress)
            .await
        {
            warn!(planning_id = %entry.id, error = %e, "Planning entry not marked in progress");
        }

        SESSIONS_STARTED.inc();
        ACTIVE_SESSIONS.inc();
        log_session_event!(
            info,
            "Session opened",
            session.id(),
            truck_id,
            client = %entry.client,
            operation = ?entry.operation
        );
        self.publish_arrival(&session, false).await;

        let queue_position = match self.service.request_entry_weighing(&mut session).await {
            Ok(old) => {
                self.publish_state(&session, old).await;
                None
            }
            Err(SessionError::BridgeBusy { position }) => Some(position),
            Err(e) => {
                warn!(session_id = %session.id(), error = %e, "Initial bridge request failed");
                None
            }
        };

        Ok(ArrivalOutcome::Created {
            session: session.clone(),
            queue_position,
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// ARRIVAL → ENTRY_WEIGHING. Idempotent once granted.
    pub async fn request_entry_weighing(
        &self,
        session_id: SessionId,
    ) -> Result<WeighingState, OrchestratorError> {
        let handle = self.handle(session_id).await?;
        let mut session = handle.lock().await;
        if session.state() == WeighingState::EntryWeighing {
            return Ok(session.state());
        }

        let old = self
            .service
            .request_entry_weighing(&mut session)
            .await
            .map_err(|e| rejected(&session, e))?;
        self.publish_state(&session, old).await;
        Ok(session.state())
    }

    /// LOADING/UNLOADING → EXIT_WEIGHING. Idempotent once granted.
    pub async fn request_exit_weighing(
        &self,
        session_id: SessionId,
    ) -> Result<WeighingState, OrchestratorError> {
        let handle = self.handle(session_id).await?;
        let mut session = handle.lock().await;
        if session.state() == WeighingState::ExitWeighing {
            return Ok(session.state());
        }

        let old = self
            .service
            .request_exit_weighing(&mut session)
            .await
            .map_err(|e| rejected(&session, e))?;
        self.publish_state(&session, old).await;
        Ok(session.state())
    }

    /// Scale reading from the sensor collaborator.
    pub async fn report_weight(
        &self,
        session_id: SessionId,
        phase: WeighingPhase,
        weight: Weight,
        stability: Stability,
    ) -> Result<Option<DerivedWeights>, OrchestratorError> {
        let handle = self.handle(session_id).await?;
        let mut session = handle.lock().await;

        let derived = self
            .service
            .report_weight(&mut session, phase, weight, stability)
            .await
            .map_err(|e| rejected(&session, e))?;

        self.bus
            .publish(WeighbridgeEvent::WeightUpdated {
                session_id,
                weight,
                phase,
                stability,
                derived,
            })
            .await;
        Ok(derived)
    }

    /// ENTRY_WEIGHING → LOADING/UNLOADING; the bridge goes to the next waiter.
    pub async fn request_zone_transition(
        &self,
        session_id: SessionId,
    ) -> Result<WeighingState, OrchestratorError> {
        let handle = self.handle(session_id).await?;
        let (new_state, hand_off) = {
            let mut session = handle.lock().await;
            let transition = self
                .service
                .request_zone_transition(&mut session)
                .await
                .map_err(|e| rejected(&session, e))?;
            self.publish_state(&session, WeighingState::EntryWeighing)
                .await;
            (transition.new_state, transition.hand_off)
        };

        self.hand_over(hand_off).await;
        Ok(new_state)
    }

    /// EXIT_WEIGHING → COMPLETED.
    pub async fn request_completion(
        &self,
        session_id: SessionId,
    ) -> Result<CompletionReport, OrchestratorError> {
        let handle = self.handle(session_id).await?;
        let (report, candidate) = {
            let mut session = handle.lock().await;
            let report = self
                .service
                .complete(&mut session)
                .await
                .map_err(|e| rejected(&session, e))?;

            SESSIONS_COMPLETED.inc();
            ACTIVE_SESSIONS.dec();
            NET_WEIGHED_TONS.inc_by(report.derived.net.as_tons_f64());
            self.forget(session.truck_id(), session_id);

            self.publish_state(&session, WeighingState::ExitWeighing)
                .await;
            self.bus
                .publish(WeighbridgeEvent::Completed {
                    session_id,
                    ticket_number: report.ticket,
                    net_weight: report.derived.net,
                    client: session.client().clone(),
                })
                .await;
            (report, transfer_candidate(&session))
        };

        self.hand_over(report.hand_off).await;

        if let (Some(transfer), Some(candidate)) = (self.transfer.clone(), candidate) {
            tokio::spawn(async move {
                transfer.transfer(&candidate).await;
            });
        }
        Ok(report)
    }

    /// Any non-terminal state → CANCELLED. Returns the state left.
    pub async fn request_cancel(
        &self,
        session_id: SessionId,
    ) -> Result<WeighingState, OrchestratorError> {
        let handle = self.handle(session_id).await?;
        let (previous, hand_off) = {
            let mut session = handle.lock().await;
            let report = self
                .service
                .cancel(&mut session)
                .await
                .map_err(|e| rejected(&session, e))?;

            SESSIONS_CANCELLED.inc();
            ACTIVE_SESSIONS.dec();
            self.forget(session.truck_id(), session_id);

            self.publish_state(&session, report.previous_state).await;
            self.bus
                .publish(WeighbridgeEvent::Cancelled {
                    session_id,
                    truck_id: session.truck_id().clone(),
                    previous_state: report.previous_state,
                })
                .await;
            (report.previous_state, report.hand_off)
        };

        self.hand_over(hand_off).await;
        Ok(previous)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn session(&self, session_id: SessionId) -> Option<WeighingSession> {
        let handle = self.handle(session_id).await.ok()?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Non-terminal sessions, oldest arrival first.
    pub async fn active_sessions(&self) -> Vec<WeighingSession> {
        let ids: Vec<SessionId> = self.active_by_truck.lock().values().copied().collect();
        let mut active = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(session) = self.session(id).await {
                if !session.is_terminal() {
                    active.push(session);
                }
            }
        }
        active.sort_by_key(|s| s.timestamps().arrival);
        active
    }

    pub fn bridge_status(&self) -> BridgeStatus {
        self.bridge.status()
    }

    // =========================================================================
    // Restart
    // =========================================================================

    /// Reload non-terminal sessions from the repository.
    ///
    /// Sessions on the bridge get it back. Sessions that were waiting for
    /// it, for entry or for exit, queue again in the order they first joined
    /// the queue.
    pub async fn restore(&self) -> Result<RestoreReport, OrchestratorError> {
        let sessions = self
            .service
            .ports()
            .repository
            .list_active()
            .await
            .map_err(OrchestratorError::Repository)?;

        let mut report = RestoreReport::default();
        for session in &sessions {
            let Some(phase) = session.state().weighing_phase() else {
                continue;
            };
            match self.bridge.restore_holder(session.id(), phase) {
                Ok(()) => report.holder = Some(session.id()),
                Err(e) => error!(
                    session_id = %session.id(),
                    error = %e,
                    "Second session found on the bridge; it must be cancelled"
                ),
            }
        }

        let mut waiting = Vec::new();
        for session in sessions {
            if let Some(phase) = session.awaited_phase() {
                let arrival = session.timestamps().arrival;
                let joined = session.timestamps().bridge_queued.unwrap_or(arrival);
                waiting.push((joined, arrival, session.id(), phase));
            }
            self.active_by_truck
                .lock()
                .insert(session.truck_id().clone(), session.id());
            self.sessions
                .write()
                .insert(session.id(), Arc::new(SessionLock::new(session)));
            report.restored += 1;
        }
        ACTIVE_SESSIONS.set(i64::try_from(report.restored).unwrap_or(i64::MAX));

        waiting.sort_by_key(|&(joined, arrival, ..)| (joined, arrival));
        for (_, _, id, phase) in waiting {
            let requested = match phase {
                WeighingPhase::Entry => self.request_entry_weighing(id).await,
                WeighingPhase::Exit => self.request_exit_weighing(id).await,
            };
            match requested {
                Ok(_) => {}
                Err(OrchestratorError::Session(SessionError::BridgeBusy { .. })) => {
                    report.queued += 1;
                }
                Err(e) => warn!(session_id = %id, phase = %phase, error = %e, "Restored waiter not queued"),
            }
        }

        info!(
            restored = report.restored,
            queued = report.queued,
            holder = ?report.holder,
            "Sessions restored"
        );
        Ok(report)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Apply grants made by a release until one sticks or the queue is empty.
    async fn hand_over(&self, mut next: Option<HandOff>) {
        while let Some(grant) = next.take() {
            let Ok(handle) = self.handle(grant.session_id).await else {
                warn!(session_id = %grant.session_id, "Bridge granted to unknown session, releasing");
                next = self.service.ports().bridge.release(grant.session_id);
                continue;
            };

            let mut session = handle.lock().await;
            if session.state().weighing_phase() == Some(grant.phase) {
                // Already applied by an explicit request.
                continue;
            }

            match self.service.apply_grant(&mut session, grant.phase).await {
                Ok(old) => {
                    self.bus
                        .publish(WeighbridgeEvent::BridgeGranted {
                            session_id: grant.session_id,
                            phase: grant.phase,
                        })
                        .await;
                    self.publish_state(&session, old).await;
                }
                Err(e) => {
                    warn!(
                        session_id = %grant.session_id,
                        state = %session.state(),
                        error = %e,
                        "Granted session cannot take the bridge, passing it on"
                    );
                    next = self.service.ports().bridge.release(grant.session_id);
                }
            }
        }
    }

    async fn already_active(&self, session_id: SessionId) -> Result<ArrivalOutcome, OrchestratorError> {
        let session = self
            .session(session_id)
            .await
            .ok_or(OrchestratorError::UnknownSession(session_id))?;
        debug!(session_id = %session_id, truck_id = %session.truck_id(), "Truck re-detected");
        self.publish_arrival(&session, true).await;
        Ok(ArrivalOutcome::AlreadyActive { session })
    }

    async fn reject(&self, error: OrchestratorError) -> OrchestratorError {
        let truck_id = match &error {
            OrchestratorError::NotPlanned(truck_id)
            | OrchestratorError::QuotaBlocked { truck_id, .. } => truck_id.clone(),
            _ => return error,
        };
        warn!(truck_id = %truck_id, reason = %error, "Arrival rejected");
        record_arrival_rejected(error.rejection_reason());
        self.bus
            .publish(WeighbridgeEvent::ArrivalRejected {
                truck_id,
                reason: error.to_string(),
            })
            .await;
        error
    }

    async fn publish_arrival(&self, session: &WeighingSession, existing: bool) {
        self.bus
            .publish(WeighbridgeEvent::TruckArrived {
                session_id: session.id(),
                truck_id: session.truck_id().clone(),
                client: session.client().clone(),
                product: session.product().clone(),
                operation: session.operation(),
                existing,
            })
            .await;
    }

    async fn publish_state(&self, session: &WeighingSession, old: WeighingState) {
        log_session_event!(
            debug,
            "State changed",
            session.id(),
            session.truck_id(),
            old = %old,
            new = %session.state()
        );
        self.bus
            .publish(WeighbridgeEvent::StateChanged {
                session_id: session.id(),
                truck_id: session.truck_id().clone(),
                old_state: old,
                new_state: session.state(),
            })
            .await;
    }

    /// Live handle, or a detached copy of a terminal session from the store.
    ///
    /// Commands on a detached copy run into the state guards and change
    /// nothing.
    async fn handle(&self, session_id: SessionId) -> Result<SessionHandle, OrchestratorError> {
        let live = self.sessions.read().get(&session_id).cloned();
        if let Some(handle) = live {
            return Ok(handle);
        }
        match self.service.ports().repository.load(session_id).await {
            Ok(Some(session)) if session.is_terminal() => Ok(Arc::new(SessionLock::new(session))),
            Ok(_) => Err(OrchestratorError::UnknownSession(session_id)),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Session lookup in store failed");
                Err(OrchestratorError::Repository(e))
            }
        }
    }

    fn active_session_of(&self, truck_id: &TruckId) -> Option<SessionId> {
        self.active_by_truck.lock().get(truck_id).copied()
    }

    fn forget_truck(&self, truck_id: &TruckId, session_id: SessionId) {
        let mut index = self.active_by_truck.lock();
        if index.get(truck_id) == Some(&session_id) {
            index.remove(truck_id);
        }
    }

    /// Drop the session from the live maps; the store keeps it.
    fn forget(&self, truck_id: &TruckId, session_id: SessionId) {
        self.forget_truck(truck_id, session_id);
        self.sessions.write().remove(&session_id);
    }
}

/// Log a refused command at a level matching its kind.
fn rejected(session: &WeighingSession, error: SessionError) -> OrchestratorError {
    if error.is_transient() {
        debug!(session_id = %session.id(), error = %error, "Command deferred");
    } else {
        warn!(session_id = %session.id(), state = %session.state(), error = %error, "Command rejected");
    }
    OrchestratorError::Session(error)
}
