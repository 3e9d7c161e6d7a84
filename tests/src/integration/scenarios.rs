//! # Weighing Scenarios
//!
//! End-to-end flows through the orchestrator with every subsystem wired by
//! the facility container:
//!
//! 1. **Load cycle**: arrival, entry weight, zone, exit weight, ticket
//! 2. **Bridge queue**: waiter granted on zone entry ahead of later arrivals
//! 3. **Quota overdraw**: completion blocks the client, next arrival refused
//! 4. **Deferred transfer**: store outage, recovery, racing fast path

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveTime;
    use facility_runtime::adapters::transfer_candidate;
    use facility_runtime::{ArrivalOutcome, FacilityBackends, OrchestratorError};
    use shared_bus::{EventFilter, EventTopic, WeighbridgeEvent};
    use shared_types::{
        ClientName, OperationKind, PlanningStatus, TicketNumber, TransferStatus, WeighingPhase,
        WeighingState, Weight,
    };
    use wb_02_quota_ledger::{InMemoryQuotaRepository, QuotaRecord};
    use wb_04_weighing_session::{SessionError, SessionRepository};
    use wb_05_reconciliation::{HistoricalRecord, RefId, TransferOutcome};

    use crate::fixtures::{
        arrive, config, facility, facility_day, fixed_clock, stable_reading, weigh_in, weigh_out,
    };

    // =========================================================================
    // LOAD CYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_load_cycle_issues_next_ticket_after_history() {
        let backends = FacilityBackends::with_clock(fixed_clock());
        backends.historical.seed_record(HistoricalRecord {
            date: facility_day(),
            time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            ticket: TicketNumber(58_041),
            truck_ref: RefId(1),
            client_ref: RefId(1),
            product_ref: RefId(1),
            gross: Weight::from_tons(30),
            tare: Weight::from_tons(12),
            net: Weight::from_tons(18),
        });
        let container = facility(config(false), backends).await;
        let orchestrator = &container.orchestrator;
        let mut states = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Session]));

        let id = arrive(&container, "T1", "ACME", OperationKind::Load).await;
        assert_eq!(
            orchestrator.session(id).await.unwrap().state(),
            WeighingState::EntryWeighing
        );

        weigh_in(orchestrator, id, Weight::from_tons(10)).await;
        assert!(container.bridge.holder().is_none());

        weigh_out(orchestrator, id, Weight::from_tons(35)).await;

        let session = orchestrator.session(id).await.unwrap();
        let derived = session.derived().unwrap();
        assert_eq!(session.state(), WeighingState::Completed);
        assert_eq!(derived.tare, Weight::from_tons(10));
        assert_eq!(derived.gross, Weight::from_tons(35));
        assert_eq!(derived.net, Weight::from_tons(25));
        assert_eq!(session.ticket(), Some(TicketNumber(58_042)));

        let planning = container.planning.entry(session.planning_id()).unwrap();
        assert_eq!(planning.status, PlanningStatus::Completed);

        let path: Vec<_> = states
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                WeighbridgeEvent::StateChanged { new_state, .. } => Some(new_state),
                _ => None,
            })
            .collect();
        assert_eq!(
            path,
            vec![
                WeighingState::EntryWeighing,
                WeighingState::Loading,
                WeighingState::ExitWeighing,
                WeighingState::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_unload_cycle_swaps_tare_and_gross() {
        let container = facility(config(false), FacilityBackends::with_clock(fixed_clock())).await;
        let orchestrator = &container.orchestrator;
        let id = arrive(&container, "T9", "ACME", OperationKind::Unload).await;

        weigh_in(orchestrator, id, Weight::from_milli(38_250)).await;
        assert_eq!(
            orchestrator.session(id).await.unwrap().state(),
            WeighingState::Unloading
        );
        weigh_out(orchestrator, id, Weight::from_milli(11_100)).await;

        let derived = orchestrator.session(id).await.unwrap().derived().unwrap();
        assert_eq!(derived.gross, Weight::from_milli(38_250));
        assert_eq!(derived.tare, Weight::from_milli(11_100));
        assert_eq!(derived.net, Weight::from_milli(27_150));
    }

    #[tokio::test]
    async fn test_skipping_a_step_leaves_session_unchanged() {
        let container = facility(config(false), FacilityBackends::with_clock(fixed_clock())).await;
        let orchestrator = &container.orchestrator;
        let id = arrive(&container, "T1", "ACME", OperationKind::Load).await;

        // No entry weight yet.
        assert!(matches!(
            orchestrator.request_zone_transition(id).await,
            Err(OrchestratorError::Session(SessionError::InvalidTransition { .. }))
        ));
        assert!(matches!(
            orchestrator.request_completion(id).await,
            Err(OrchestratorError::Session(SessionError::InvalidTransition { .. }))
        ));
        assert_eq!(
            orchestrator.session(id).await.unwrap().state(),
            WeighingState::EntryWeighing
        );
    }

    // =========================================================================
    // BRIDGE QUEUE
    // =========================================================================

    #[tokio::test]
    async fn test_waiter_granted_before_later_arrival() {
        let container = facility(config(false), FacilityBackends::with_clock(fixed_clock())).await;
        let orchestrator = &container.orchestrator;
        let t1 = arrive(&container, "T1", "ACME", OperationKind::Load).await;

        container
            .planning
            .schedule_today("T2", "ACME", "SAND", OperationKind::Load, Weight::from_tons(25));
        let outcome = orchestrator.truck_detected("T2").await.unwrap();
        let ArrivalOutcome::Created { session, queue_position } = outcome else {
            panic!("T2 should get a new session");
        };
        assert_eq!(queue_position, Some(1));
        let t2 = session.id();

        let t3 = arrive(&container, "T3", "ACME", OperationKind::Load).await;
        assert_eq!(container.bridge.position(t3), Some(2));

        let mut grants = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Bridge]));
        weigh_in(orchestrator, t1, Weight::from_tons(10)).await;

        assert_eq!(container.bridge.holder().map(|h| h.session_id), Some(t2));
        assert_eq!(
            orchestrator.session(t3).await.unwrap().state(),
            WeighingState::Arrival
        );
        assert_eq!(
            grants.drain(),
            vec![WeighbridgeEvent::BridgeGranted {
                session_id: t2,
                phase: WeighingPhase::Entry,
            }]
        );
    }

    #[tokio::test]
    async fn test_exit_request_waits_behind_earlier_entry_requests() {
        let container = facility(config(false), FacilityBackends::with_clock(fixed_clock())).await;
        let orchestrator = &container.orchestrator;
        let t1 = arrive(&container, "T1", "ACME", OperationKind::Load).await;
        let t2 = arrive(&container, "T2", "ACME", OperationKind::Load).await;

        weigh_in(orchestrator, t1, Weight::from_tons(10)).await;
        let t3 = arrive(&container, "T3", "ACME", OperationKind::Load).await;

        // T2 holds, T3 queued; T1's exit request goes behind T3.
        assert!(matches!(
            orchestrator.request_exit_weighing(t1).await,
            Err(OrchestratorError::Session(SessionError::BridgeBusy { position: 2 }))
        ));

        weigh_in(orchestrator, t2, Weight::from_tons(11)).await;
        assert_eq!(container.bridge.holder().map(|h| h.session_id), Some(t3));

        weigh_in(orchestrator, t3, Weight::from_tons(9)).await;
        let holder = container.bridge.holder().unwrap();
        assert_eq!(holder.session_id, t1);
        assert_eq!(holder.phase, WeighingPhase::Exit);
        assert_eq!(
            orchestrator.session(t1).await.unwrap().state(),
            WeighingState::ExitWeighing
        );
    }

    #[tokio::test]
    async fn test_cancelling_holder_unblocks_queue() {
        let container = facility(config(false), FacilityBackends::with_clock(fixed_clock())).await;
        let orchestrator = &container.orchestrator;
        let t1 = arrive(&container, "T1", "ACME", OperationKind::Load).await;
        let t2 = arrive(&container, "T2", "ACME", OperationKind::Load).await;
        let mut session_events = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Session]));

        let previous = orchestrator.request_cancel(t1).await.unwrap();

        assert_eq!(previous, WeighingState::EntryWeighing);
        assert_eq!(container.bridge.holder().map(|h| h.session_id), Some(t2));
        assert!(session_events.drain().iter().any(|event| matches!(
            event,
            WeighbridgeEvent::Cancelled { session_id, previous_state: WeighingState::EntryWeighing, .. }
                if *session_id == t1
        )));

        let planning_id = orchestrator.session(t1).await.unwrap().planning_id();
        assert_eq!(
            container.planning.entry(planning_id).unwrap().status,
            PlanningStatus::Pending
        );
    }

    // =========================================================================
    // QUOTA
    // =========================================================================

    #[tokio::test]
    async fn test_overdraw_blocks_client_for_next_arrival() {
        let backends = FacilityBackends {
            quotas: Arc::new(InMemoryQuotaRepository::with_records([QuotaRecord::new(
                ClientName::new("C"),
                Weight::from_tons(100),
                Weight::from_tons(95),
            )])),
            ..FacilityBackends::with_clock(fixed_clock())
        };
        let container = facility(config(false), backends).await;
        let orchestrator = &container.orchestrator;

        let first = arrive(&container, "T1", "C", OperationKind::Load).await;
        // A second truck admitted before the overdraw keeps going.
        let second = arrive(&container, "T2", "C", OperationKind::Load).await;

        weigh_in(orchestrator, first, Weight::from_tons(10)).await;
        weigh_in(orchestrator, second, Weight::from_tons(10)).await;
        weigh_out(orchestrator, first, Weight::from_tons(20)).await;

        let record = container.quotas.record(&ClientName::new("C")).unwrap();
        assert_eq!(record.consumed, Weight::from_tons(105));
        assert!(record.blocked);
        assert!(container.backends.quotas.get(&ClientName::new("C")).unwrap().blocked);

        container
            .planning
            .schedule_today("T3", "C", "SAND", OperationKind::Load, Weight::from_tons(25));
        let refused = orchestrator.truck_detected("T3").await.unwrap_err();
        assert!(matches!(refused, OrchestratorError::QuotaBlocked { .. }));
        assert!(refused.is_rejection());

        weigh_out(orchestrator, second, Weight::from_tons(18)).await;
        assert_eq!(
            orchestrator.session(second).await.unwrap().state(),
            WeighingState::Completed
        );
    }

    // =========================================================================
    // RECONCILIATION
    // =========================================================================

    #[tokio::test]
    async fn test_deferred_transfer_lands_once_after_recovery() {
        let backends = FacilityBackends::with_clock(fixed_clock());
        let container = facility(config(false), backends.clone()).await;
        let orchestrator = &container.orchestrator;
        let mut transfers = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Reconciliation]));

        let id = arrive(&container, "T1", "ACME", OperationKind::Load).await;
        weigh_in(orchestrator, id, Weight::from_tons(10)).await;
        weigh_out(orchestrator, id, Weight::from_tons(35)).await;

        backends.historical.set_available(false);
        let report = container.reconciliation.sweep().await.unwrap();
        assert_eq!(report.deferred, 1);
        assert!(!backends.sessions.load(id).await.unwrap().unwrap().is_transferred());

        backends.historical.set_available(true);
        let candidate = transfer_candidate(&orchestrator.session(id).await.unwrap()).unwrap();
        let (sweep, fast) = tokio::join!(
            container.reconciliation.sweep(),
            container.reconciliation.transfer(&candidate)
        );

        assert_eq!(sweep.unwrap().deferred, 0);
        assert!(fast.is_settled());
        assert_eq!(backends.historical.record_count(), 1);
        assert!(backends.sessions.load(id).await.unwrap().unwrap().is_transferred());

        let statuses: Vec<_> = transfers
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                WeighbridgeEvent::TransferRecorded { status, .. } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses.first(), Some(&TransferStatus::Deferred));
        assert_eq!(
            statuses
                .iter()
                .filter(|s| **s == TransferStatus::Confirmed)
                .count(),
            1
        );

        // Nothing left for later sweeps.
        assert_eq!(container.reconciliation.sweep().await.unwrap().examined, 0);
    }

    #[tokio::test]
    async fn test_completion_during_session_store_outage_is_retried_whole() {
        let client = ClientName::new("ACME");
        let backends = FacilityBackends {
            quotas: Arc::new(InMemoryQuotaRepository::with_records([QuotaRecord::new(
                client.clone(),
                Weight::from_tons(100),
                Weight::ZERO,
            )])),
            ..FacilityBackends::with_clock(fixed_clock())
        };
        let container = facility(config(false), backends.clone()).await;
        let orchestrator = &container.orchestrator;

        let id = arrive(&container, "T1", "ACME", OperationKind::Load).await;
        weigh_in(orchestrator, id, Weight::from_tons(10)).await;
        orchestrator.request_exit_weighing(id).await.unwrap();
        stable_reading(orchestrator, id, WeighingPhase::Exit, Weight::from_tons(35)).await;

        backends.sessions.set_failing(true);
        backends.historical.set_available(false);
        assert!(matches!(
            orchestrator.request_completion(id).await,
            Err(OrchestratorError::Session(SessionError::PersistFailed(_)))
        ));
        assert_eq!(
            orchestrator.session(id).await.unwrap().state(),
            WeighingState::ExitWeighing
        );
        assert_eq!(container.quotas.record(&client).unwrap().consumed, Weight::ZERO);
        assert_eq!(container.bridge.holder().map(|h| h.session_id), Some(id));

        backends.sessions.set_failing(false);
        backends.historical.set_available(true);
        let report = orchestrator.request_completion(id).await.unwrap();
        // The number taken by the aborted attempt is not reused.
        assert_eq!(report.ticket, TicketNumber(2));

        for _ in 0..3 {
            container.reconciliation.sweep().await.unwrap();
        }
        assert_eq!(backends.historical.record_count(), 1);
        assert_eq!(
            container.quotas.record(&client).unwrap().consumed,
            Weight::from_tons(25)
        );
        let stored = backends.sessions.load(id).await.unwrap().unwrap();
        assert_eq!(stored.ticket(), Some(TicketNumber(2)));
        assert!(stored.is_transferred());
    }

    #[tokio::test]
    async fn test_conflicting_history_is_quarantined() {
        let backends = FacilityBackends::with_clock(fixed_clock());
        // Ticket 1 already exists with other weights.
        backends.historical.seed_record(HistoricalRecord {
            date: facility_day(),
            time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            ticket: TicketNumber(1),
            truck_ref: RefId(1),
            client_ref: RefId(1),
            product_ref: RefId(1),
            gross: Weight::from_tons(50),
            tare: Weight::from_tons(20),
            net: Weight::from_tons(30),
        });
        let container = facility(config(false), backends.clone()).await;
        let orchestrator = &container.orchestrator;

        let id = arrive(&container, "T1", "ACME", OperationKind::Load).await;
        weigh_in(orchestrator, id, Weight::from_tons(10)).await;
        weigh_out(orchestrator, id, Weight::from_tons(35)).await;
        let session = orchestrator.session(id).await.unwrap();

        // The seeded sequence steps past the historical ticket.
        assert_eq!(session.ticket(), Some(TicketNumber(2)));
        let candidate = transfer_candidate(&session).unwrap();
        let forged = wb_05_reconciliation::TransferCandidate {
            ticket: TicketNumber(1),
            ..candidate
        };

        let outcome = container.reconciliation.transfer(&forged).await;
        assert!(matches!(outcome, TransferOutcome::IntegrityViolation(_)));
        assert_eq!(container.reconciliation.quarantined(), vec![id]);
        assert_eq!(backends.historical.record_count(), 1);
    }
}
