//! # Session Service
//!
//! Drives one session through the bridge, quota, ticket and planning ports.
//!
//! ## Completion order
//!
//! ```text
//! validate ──→ issue ticket ──→ debit quota ──→ save COMPLETED ──→ swap in,
//!    │              │                │                │         release bridge,
//! unchanged     unchanged        unchanged      refund debit,   planning COMPLETED
//!             (no number used) (ticket burned)  unchanged
//! ```
//!
//! The completed state is built on a copy and stored before the live
//! session changes, so the sweep sees every session that reports COMPLETED.
//! Cancellation commits the same way.

use crate::domain::errors::SessionError;
use crate::domain::session::WeighingSession;
use crate::ports::outbound::{
    BridgeGate, GateAdmission, HandOff, PlanningAuthority, QuotaDebit, QuotaGate,
    SessionRepository, TicketIssuer,
};
use shared_types::{
    DerivedWeights, PlanningStatus, Stability, TicketNumber, TimeSource, WeighingPhase,
    WeighingState, Weight,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Adapters the service drives.
#[derive(Clone)]
pub struct SessionPorts {
    pub bridge: Arc<dyn BridgeGate>,
    pub quota: Arc<dyn QuotaGate>,
    pub tickets: Arc<dyn TicketIssuer>,
    pub planning: Arc<dyn PlanningAuthority>,
    pub repository: Arc<dyn SessionRepository>,
}

/// Result of ENTRY_WEIGHING → LOADING/UNLOADING.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneTransition {
    pub new_state: WeighingState,
    /// Session granted the bridge by this release, if any.
    pub hand_off: Option<HandOff>,
}

/// Result of EXIT_WEIGHING → COMPLETED.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionReport {
    pub ticket: TicketNumber,
    pub derived: DerivedWeights,
    pub debit: Option<QuotaDebit>,
    pub hand_off: Option<HandOff>,
}

/// Result of a cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancelReport {
    pub previous_state: WeighingState,
    pub hand_off: Option<HandOff>,
}

pub struct SessionService {
    ports: SessionPorts,
    clock: Arc<dyn TimeSource>,
}

impl SessionService {
    pub fn new(ports: SessionPorts, clock: Arc<dyn TimeSource>) -> Self {
        Self { ports, clock }
    }

    pub fn ports(&self) -> &SessionPorts {
        &self.ports
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// ARRIVAL → ENTRY_WEIGHING once the bridge is granted.
    ///
    /// `BridgeBusy` leaves the session queued; retrying is idempotent.
    pub async fn request_entry_weighing(
        &self,
        session: &mut WeighingSession,
    ) -> Result<WeighingState, SessionError> {
        session.check_transition(WeighingState::EntryWeighing)?;
        self.obtain_bridge(session, WeighingPhase::Entry).await?;

        let old = session.begin_entry_weighing(self.now())?;
        info!(session_id = %session.id(), truck_id = %session.truck_id(), "Entry weighing started");
        self.persist(session).await;
        Ok(old)
    }

    /// LOADING/UNLOADING → EXIT_WEIGHING once the bridge is granted again.
    pub async fn request_exit_weighing(
        &self,
        session: &mut WeighingSession,
    ) -> Result<WeighingState, SessionError> {
        session.check_transition(WeighingState::ExitWeighing)?;
        self.obtain_bridge(session, WeighingPhase::Exit).await?;

        let old = session.begin_exit_weighing(self.now())?;
        info!(session_id = %session.id(), truck_id = %session.truck_id(), "Exit weighing started");
        self.persist(session).await;
        Ok(old)
    }

    /// Apply a grant received through a hand-off.
    pub async fn apply_grant(
        &self,
        session: &mut WeighingSession,
        phase: WeighingPhase,
    ) -> Result<WeighingState, SessionError> {
        match phase {
            WeighingPhase::Entry => self.request_entry_weighing(session).await,
            WeighingPhase::Exit => self.request_exit_weighing(session).await,
        }
    }

    /// Record a scale reading. Returns the derived weights when both
    /// readings are present.
    pub async fn report_weight(
        &self,
        session: &mut WeighingSession,
        phase: WeighingPhase,
        weight: Weight,
        stability: Stability,
    ) -> Result<Option<DerivedWeights>, SessionError> {
        let on_bridge = session.state().weighing_phase() == Some(phase)
            && self.ports.bridge.holds(session.id());
        if !on_bridge {
            debug!(
                session_id = %session.id(),
                phase = %phase,
                state = %session.state(),
                "Stale reading discarded"
            );
            return Err(SessionError::StaleReading {
                session_id: session.id(),
                phase,
                state: session.state(),
            });
        }

        session.record_weight(phase, weight, stability, self.now())?;
        debug!(session_id = %session.id(), phase = %phase, weight = %weight, stability = ?stability, "Weight recorded");
        self.persist(session).await;

        Ok(match phase {
            WeighingPhase::Exit => session.preview_derived(),
            WeighingPhase::Entry => None,
        })
    }

    /// ENTRY_WEIGHING → LOADING/UNLOADING, freeing the bridge.
    pub async fn request_zone_transition(
        &self,
        session: &mut WeighingSession,
    ) -> Result<ZoneTransition, SessionError> {
        session.enter_zone(self.now())?;
        let hand_off = self.ports.bridge.release(session.id());
        info!(
            session_id = %session.id(),
            truck_id = %session.truck_id(),
            zone = %session.state(),
            "Truck entered zone, bridge released"
        );
        self.persist(session).await;

        Ok(ZoneTransition {
            new_state: session.state(),
            hand_off,
        })
    }

    /// EXIT_WEIGHING → COMPLETED.
    pub async fn complete(
        &self,
        session: &mut WeighingSession,
    ) -> Result<CompletionReport, SessionError> {
        let derived = session.prepare_completion()?;

        let ticket = self.ports.tickets.issue().await.map_err(|e| {
            warn!(session_id = %session.id(), error = %e, "Ticket allocation failed, completion aborted");
            SessionError::TicketUnavailable(e.to_string())
        })?;

        let mut completed = session.clone();
        completed.complete(ticket, self.now())?;

        let debit = if derived.net.is_positive() {
            let debit = self
                .ports
                .quota
                .debit(session.client(), derived.net)
                .await
                .map_err(|e| {
                    error!(
                        session_id = %session.id(),
                        ticket = %ticket,
                        error = %e,
                        "Quota debit failed, completion aborted; ticket number unused"
                    );
                    SessionError::QuotaDebitFailed(e.to_string())
                })?;
            Some(debit)
        } else {
            None
        };

        if let Err(e) = self.ports.repository.save(&completed).await {
            error!(
                session_id = %session.id(),
                ticket = %ticket,
                error = %e,
                "Completed session not persisted, completion aborted; ticket number unused"
            );
            if let Some(debit) = &debit {
                if let Err(refund) = self.ports.quota.refund(session.client(), derived.net, debit).await {
                    error!(client = %session.client(), amount = %derived.net, error = %refund, "Quota refund failed");
                }
            }
            return Err(SessionError::PersistFailed(e.to_string()));
        }

        if debit.as_ref().is_some_and(|d| d.newly_blocked) {
            warn!(client = %session.client(), "Client blocked after this completion");
        }
        *session = completed;
        let hand_off = self.ports.bridge.release(session.id());

        info!(
            session_id = %session.id(),
            truck_id = %session.truck_id(),
            ticket = %ticket,
            tare = %derived.tare,
            gross = %derived.gross,
            net = %derived.net,
            "Weighing completed"
        );

        if let Err(e) = self
            .ports
            .planning
            .set_status(session.planning_id(), PlanningStatus::Completed)
            .await
        {
            warn!(planning_id = %session.planning_id(), error = %e, "Planning entry not marked completed");
        }

        Ok(CompletionReport {
            ticket,
            derived,
            debit,
            hand_off,
        })
    }

    /// Any non-terminal state → CANCELLED. The bridge is released (and the
    /// queue left) before the state flips.
    pub async fn cancel(&self, session: &mut WeighingSession) -> Result<CancelReport, SessionError> {
        if session.is_terminal() {
            return Err(SessionError::InvalidTransition {
                from: session.state(),
                to: WeighingState::Cancelled,
                reason: "session is terminal",
            });
        }

        let mut cancelled = session.clone();
        let previous_state = cancelled.cancel(self.now())?;
        if let Err(e) = self.ports.repository.save(&cancelled).await {
            error!(session_id = %session.id(), error = %e, "Cancellation not persisted, session unchanged");
            return Err(SessionError::PersistFailed(e.to_string()));
        }

        self.ports.bridge.withdraw(session.id());
        let hand_off = self.ports.bridge.release(session.id());
        *session = cancelled;

        info!(
            session_id = %session.id(),
            truck_id = %session.truck_id(),
            previous = %previous_state,
            "Session cancelled"
        );

        if let Err(e) = self
            .ports
            .planning
            .set_status(session.planning_id(), PlanningStatus::Pending)
            .await
        {
            warn!(planning_id = %session.planning_id(), error = %e, "Planning entry not reverted to pending");
        }

        Ok(CancelReport {
            previous_state,
            hand_off,
        })
    }

    /// Write a non-terminal session through to the repository.
    ///
    /// A failed write is logged and repeated by the next transition, which
    /// saves the full session again. Terminal states are saved by
    /// `complete` and `cancel` before they take effect.
    pub async fn persist(&self, session: &WeighingSession) {
        if let Err(e) = self.ports.repository.save(session).await {
            error!(session_id = %session.id(), state = %session.state(), error = %e, "Session not persisted");
        }
    }

    /// Ask for the bridge. A queued session records when it joined, so a
    /// restart can replay the queue in order.
    async fn obtain_bridge(
        &self,
        session: &mut WeighingSession,
        phase: WeighingPhase,
    ) -> Result<(), SessionError> {
        match self.ports.bridge.request(session.id(), phase) {
            GateAdmission::Granted => Ok(()),
            GateAdmission::Queued { position } => {
                debug!(session_id = %session.id(), phase = %phase, position, "Waiting for bridge");
                if session.mark_queued(self.now()) {
                    self.persist(session).await;
                }
                Err(SessionError::BridgeBusy { position })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{InMemorySessionRepository, PortError, QuotaCheck};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;
    use shared_types::{
        ClientName, ManualTimeSource, OperationKind, PlanningEntry, PlanningId, ProductId,
        SessionId, TruckId,
    };
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    #[derive(Default)]
    struct MockBridge {
        state: Mutex<(Option<(SessionId, WeighingPhase)>, VecDeque<(SessionId, WeighingPhase)>)>,
    }

    impl BridgeGate for MockBridge {
        fn request(&self, session_id: SessionId, phase: WeighingPhase) -> GateAdmission {
            let mut st = self.state.lock();
            if st.0.map(|h| h.0) == Some(session_id) {
                return GateAdmission::Granted;
            }
            if let Some(i) = st.1.iter().position(|r| r.0 == session_id) {
                return GateAdmission::Queued { position: i + 1 };
            }
            if st.0.is_none() {
                st.0 = Some((session_id, phase));
                return GateAdmission::Granted;
            }
            st.1.push_back((session_id, phase));
            GateAdmission::Queued { position: st.1.len() }
        }

        fn holds(&self, session_id: SessionId) -> bool {
            self.state.lock().0.map(|h| h.0) == Some(session_id)
        }

        fn release(&self, session_id: SessionId) -> Option<HandOff> {
            let mut st = self.state.lock();
            if st.0.map(|h| h.0) != Some(session_id) {
                return None;
            }
            st.0 = st.1.pop_front();
            st.0.map(|(session_id, phase)| HandOff { session_id, phase })
        }

        fn withdraw(&self, session_id: SessionId) -> bool {
            let mut st = self.state.lock();
            let before = st.1.len();
            st.1.retain(|r| r.0 != session_id);
            before != st.1.len()
        }
    }

    #[derive(Default)]
    struct MockQuota {
        consumed: Mutex<Weight>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl QuotaGate for MockQuota {
        fn check(&self, _client: &ClientName) -> QuotaCheck {
            QuotaCheck::Available { remaining: None }
        }

        async fn debit(&self, _client: &ClientName, amount: Weight) -> Result<QuotaDebit, PortError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PortError::Unavailable("quota".into()));
            }
            let mut consumed = self.consumed.lock();
            *consumed = *consumed + amount;
            Ok(QuotaDebit {
                remaining: None,
                newly_blocked: false,
            })
        }

        async fn refund(
            &self,
            _client: &ClientName,
            amount: Weight,
            _debit: &QuotaDebit,
        ) -> Result<(), PortError> {
            let mut consumed = self.consumed.lock();
            *consumed = *consumed - amount;
            Ok(())
        }
    }

    struct MockTickets {
        next: AtomicU64,
        fail: AtomicBool,
    }

    #[async_trait]
    impl TicketIssuer for MockTickets {
        async fn issue(&self) -> Result<TicketNumber, PortError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PortError::Unavailable("tickets".into()));
            }
            Ok(TicketNumber(self.next.fetch_add(1, Ordering::SeqCst)))
        }
    }

    #[derive(Default)]
    struct MockPlanning {
        statuses: Mutex<Vec<(PlanningId, PlanningStatus)>>,
    }

    #[async_trait]
    impl PlanningAuthority for MockPlanning {
        async fn authorize_arrival(&self, _truck_id: &TruckId) -> Result<Option<PlanningEntry>, PortError> {
            Ok(None)
        }

        async fn set_status(&self, id: PlanningId, status: PlanningStatus) -> Result<(), PortError> {
            self.statuses.lock().push((id, status));
            Ok(())
        }
    }

    struct Fixture {
        service: SessionService,
        bridge: Arc<MockBridge>,
        quota: Arc<MockQuota>,
        tickets: Arc<MockTickets>,
        planning: Arc<MockPlanning>,
        repository: Arc<InMemorySessionRepository>,
    }

    fn fixture() -> Fixture {
        let bridge = Arc::new(MockBridge::default());
        let quota = Arc::new(MockQuota::default());
        let tickets = Arc::new(MockTickets {
            next: AtomicU64::new(58_000),
            fail: AtomicBool::new(false),
        });
        let planning = Arc::new(MockPlanning::default());
        let repository = Arc::new(InMemorySessionRepository::new());
        let ports = SessionPorts {
            bridge: bridge.clone(),
            quota: quota.clone(),
            tickets: tickets.clone(),
            planning: planning.clone(),
            repository: repository.clone(),
        };
        Fixture {
            service: SessionService::new(ports, Arc::new(ManualTimeSource::new(1_000))),
            bridge,
            quota,
            tickets,
            planning,
            repository,
        }
    }

    fn session(truck: &str, operation: OperationKind) -> WeighingSession {
        let planning = PlanningEntry {
            id: PlanningId(7),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            truck_id: TruckId::new(truck),
            client: ClientName::new("C"),
            product: ProductId::new("SAND"),
            operation,
            planned_quantity: Weight::from_tons(25),
            status: PlanningStatus::Pending,
        };
        WeighingSession::open(&planning, 0)
    }

    async fn drive_to_exit(f: &Fixture, s: &mut WeighingSession, entry: i64, exit: i64) {
        f.service.request_entry_weighing(s).await.unwrap();
        f.service
            .report_weight(s, WeighingPhase::Entry, Weight::from_tons(entry), Stability::Stable)
            .await
            .unwrap();
        f.service.request_zone_transition(s).await.unwrap();
        f.service.request_exit_weighing(s).await.unwrap();
        f.service
            .report_weight(s, WeighingPhase::Exit, Weight::from_tons(exit), Stability::Stable)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_load_cycle() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        drive_to_exit(&f, &mut s, 10, 35).await;

        let report = f.service.complete(&mut s).await.unwrap();
        assert_eq!(report.ticket, TicketNumber(58_000));
        assert_eq!(report.derived.net, Weight::from_tons(25));
        assert_eq!(*f.quota.consumed.lock(), Weight::from_tons(25));
        assert!(!f.bridge.holds(s.id()));
        assert_eq!(
            f.planning.statuses.lock().last(),
            Some(&(PlanningId(7), PlanningStatus::Completed))
        );
        assert_eq!(f.repository.max_ticket().await.unwrap(), Some(58_000));
    }

    #[tokio::test]
    async fn test_entry_while_bridge_held_is_busy() {
        let f = fixture();
        let mut t1 = session("T1", OperationKind::Load);
        let mut t2 = session("T2", OperationKind::Load);
        f.service.request_entry_weighing(&mut t1).await.unwrap();

        let err = f.service.request_entry_weighing(&mut t2).await.unwrap_err();
        assert_eq!(err, SessionError::BridgeBusy { position: 1 });
        assert_eq!(t2.state(), WeighingState::Arrival);
    }

    #[tokio::test]
    async fn test_zone_transition_hands_off_bridge() {
        let f = fixture();
        let mut t1 = session("T1", OperationKind::Load);
        let mut t2 = session("T2", OperationKind::Unload);
        f.service.request_entry_weighing(&mut t1).await.unwrap();
        let _ = f.service.request_entry_weighing(&mut t2).await;

        f.service
            .report_weight(&mut t1, WeighingPhase::Entry, Weight::from_tons(10), Stability::Stable)
            .await
            .unwrap();
        let zone = f.service.request_zone_transition(&mut t1).await.unwrap();
        assert_eq!(zone.new_state, WeighingState::Loading);
        assert_eq!(
            zone.hand_off,
            Some(HandOff {
                session_id: t2.id(),
                phase: WeighingPhase::Entry
            })
        );

        f.service.apply_grant(&mut t2, WeighingPhase::Entry).await.unwrap();
        assert_eq!(t2.state(), WeighingState::EntryWeighing);
    }

    #[tokio::test]
    async fn test_reading_off_bridge_is_stale() {
        let f = fixture();
        let mut t1 = session("T1", OperationKind::Load);
        let result = f
            .service
            .report_weight(&mut t1, WeighingPhase::Entry, Weight::from_tons(10), Stability::Stable)
            .await;
        assert!(matches!(result, Err(SessionError::StaleReading { .. })));
    }

    #[tokio::test]
    async fn test_exit_reading_returns_derived() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        f.service.request_entry_weighing(&mut s).await.unwrap();
        f.service
            .report_weight(&mut s, WeighingPhase::Entry, Weight::from_tons(10), Stability::Stable)
            .await
            .unwrap();
        f.service.request_zone_transition(&mut s).await.unwrap();
        f.service.request_exit_weighing(&mut s).await.unwrap();
        let derived = f
            .service
            .report_weight(&mut s, WeighingPhase::Exit, Weight::from_tons(35), Stability::Unstable)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(derived.net, Weight::from_tons(25));
    }

    #[tokio::test]
    async fn test_ticket_failure_leaves_session_in_exit_weighing() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        drive_to_exit(&f, &mut s, 10, 35).await;

        f.tickets.fail.store(true, Ordering::SeqCst);
        let err = f.service.complete(&mut s).await.unwrap_err();
        assert!(matches!(err, SessionError::TicketUnavailable(_)));
        assert_eq!(s.state(), WeighingState::ExitWeighing);
        assert_eq!(s.ticket(), None);
        assert_eq!(*f.quota.consumed.lock(), Weight::ZERO);
        assert!(f.bridge.holds(s.id()));

        f.tickets.fail.store(false, Ordering::SeqCst);
        let report = f.service.complete(&mut s).await.unwrap();
        assert_eq!(report.ticket, TicketNumber(58_000));
    }

    #[tokio::test]
    async fn test_quota_failure_leaves_session_in_exit_weighing() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        drive_to_exit(&f, &mut s, 10, 35).await;

        f.quota.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            f.service.complete(&mut s).await,
            Err(SessionError::QuotaDebitFailed(_))
        ));
        assert_eq!(s.state(), WeighingState::ExitWeighing);
        assert_eq!(s.ticket(), None);

        f.quota.fail.store(false, Ordering::SeqCst);
        let report = f.service.complete(&mut s).await.unwrap();
        // The number allocated by the failed attempt is never reused.
        assert_eq!(report.ticket, TicketNumber(58_001));
    }

    #[tokio::test]
    async fn test_store_failure_rolls_back_completion() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        drive_to_exit(&f, &mut s, 10, 35).await;

        f.repository.set_failing(true);
        assert!(matches!(
            f.service.complete(&mut s).await,
            Err(SessionError::PersistFailed(_))
        ));
        assert_eq!(s.state(), WeighingState::ExitWeighing);
        assert_eq!(s.ticket(), None);
        assert_eq!(*f.quota.consumed.lock(), Weight::ZERO);
        assert!(f.bridge.holds(s.id()));
        assert!(f.planning.statuses.lock().is_empty());

        f.repository.set_failing(false);
        let report = f.service.complete(&mut s).await.unwrap();
        assert_eq!(report.ticket, TicketNumber(58_001));
        assert_eq!(*f.quota.consumed.lock(), Weight::from_tons(25));
        assert_eq!(
            f.repository.list_untransferred(10).await.unwrap(),
            vec![s.clone()]
        );
    }

    #[tokio::test]
    async fn test_store_failure_leaves_cancelled_session_on_bridge() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        f.service.request_entry_weighing(&mut s).await.unwrap();

        f.repository.set_failing(true);
        assert!(matches!(
            f.service.cancel(&mut s).await,
            Err(SessionError::PersistFailed(_))
        ));
        assert_eq!(s.state(), WeighingState::EntryWeighing);
        assert!(f.bridge.holds(s.id()));

        f.repository.set_failing(false);
        f.service.cancel(&mut s).await.unwrap();
        assert!(!f.bridge.holds(s.id()));
        assert_eq!(f.repository.load(s.id()).await.unwrap(), Some(s.clone()));
    }

    #[tokio::test]
    async fn test_cancel_releases_bridge_and_reverts_planning() {
        let f = fixture();
        let mut t1 = session("T1", OperationKind::Load);
        let mut t2 = session("T2", OperationKind::Load);
        f.service.request_entry_weighing(&mut t1).await.unwrap();
        let _ = f.service.request_entry_weighing(&mut t2).await;

        let report = f.service.cancel(&mut t1).await.unwrap();
        assert_eq!(report.previous_state, WeighingState::EntryWeighing);
        assert_eq!(report.hand_off.map(|h| h.session_id), Some(t2.id()));
        assert_eq!(t1.state(), WeighingState::Cancelled);
        assert_eq!(
            f.planning.statuses.lock().last(),
            Some(&(PlanningId(7), PlanningStatus::Pending))
        );
    }

    #[tokio::test]
    async fn test_cancel_while_queued_leaves_queue() {
        let f = fixture();
        let mut t1 = session("T1", OperationKind::Load);
        let mut t2 = session("T2", OperationKind::Load);
        f.service.request_entry_weighing(&mut t1).await.unwrap();
        let _ = f.service.request_entry_weighing(&mut t2).await;

        let report = f.service.cancel(&mut t2).await.unwrap();
        assert_eq!(report.hand_off, None);
        assert!(!f.bridge.withdraw(t2.id()));
        assert!(f.bridge.holds(t1.id()));
    }

    #[tokio::test]
    async fn test_cancel_terminal_is_invalid() {
        let f = fixture();
        let mut s = session("T1", OperationKind::Load);
        f.service.cancel(&mut s).await.unwrap();
        assert!(matches!(
            f.service.cancel(&mut s).await,
            Err(SessionError::InvalidTransition { .. })
        ));
    }
}
