//! # Facility Properties
//!
//! Invariants checked over many trucks rather than single flows:
//!
//! - Tickets are unique and follow completion order under concurrent trucks
//! - Net weight equals |gross − tare| for every completed session
//! - Repeated sweeps and fast-path attempts leave one record per ticket
//! - A blocked client stays blocked until reset

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

    use facility_runtime::adapters::transfer_candidate;
    use facility_runtime::{FacilityBackends, FacilityContainer, OrchestratorError};
    use proptest::prelude::*;
    use shared_bus::{EventFilter, EventTopic, WeighbridgeEvent};
    use shared_types::{
        ClientName, OperationKind, SessionId, TicketNumber, WeighingPhase, WeighingState, Weight,
    };
    use wb_02_quota_ledger::{InMemoryQuotaRepository, QuotaRecord};
    use wb_04_weighing_session::SessionError;

    use crate::fixtures::{arrive, config, facility, fixed_clock, stable_reading};

    /// Poll until the session reaches `state`.
    async fn wait_for(container: &FacilityContainer, id: SessionId, state: WeighingState) {
        loop {
            let current = container.orchestrator.session(id).await.map(|s| s.state());
            if current == Some(state) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// One truck's whole pass, waiting for the bridge whenever it is busy.
    async fn drive_truck(
        container: Arc<FacilityContainer>,
        truck: String,
        entry: Weight,
        exit: Weight,
    ) -> TicketNumber {
        let orchestrator = Arc::clone(&container.orchestrator);
        let id = arrive(&container, &truck, "ACME", OperationKind::Load).await;
        wait_for(&container, id, WeighingState::EntryWeighing).await;

        stable_reading(&orchestrator, id, WeighingPhase::Entry, entry).await;
        orchestrator.request_zone_transition(id).await.unwrap();

        match orchestrator.request_exit_weighing(id).await {
            Ok(_) | Err(OrchestratorError::Session(SessionError::BridgeBusy { .. })) => {}
            Err(e) => panic!("exit request failed: {e}"),
        }
        wait_for(&container, id, WeighingState::ExitWeighing).await;

        stable_reading(&orchestrator, id, WeighingPhase::Exit, exit).await;
        orchestrator.request_completion(id).await.unwrap().ticket
    }

    // =========================================================================
    // TICKETS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_trucks_get_distinct_ordered_tickets() {
        let container = Arc::new(
            facility(config(false), FacilityBackends::with_clock(fixed_clock())).await,
        );
        let mut completions = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Completion]));

        let trucks = 8u64;
        let handles: Vec<_> = (0..trucks)
            .map(|i| {
                let container = Arc::clone(&container);
                tokio::spawn(drive_truck(
                    container,
                    format!("T{i}"),
                    Weight::from_tons(10),
                    Weight::from_milli(30_000 + i as i64),
                ))
            })
            .collect();

        let mut issued = BTreeSet::new();
        for handle in handles {
            assert!(issued.insert(handle.await.unwrap()));
        }
        let expected: BTreeSet<_> = (1..=trucks).map(TicketNumber).collect();
        assert_eq!(issued, expected);

        let published: Vec<_> = completions
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                WeighbridgeEvent::Completed { ticket_number, .. } => Some(ticket_number),
                _ => None,
            })
            .collect();
        assert_eq!(published.len(), trucks as usize);
        assert!(published.windows(2).all(|w| w[0] < w[1]));
        assert!(container.bridge.holder().is_none());
    }

    // =========================================================================
    // WEIGHTS AND RECONCILIATION
    // =========================================================================

    fn truck_weights() -> impl Strategy<Value = Vec<(bool, i64, i64)>> {
        proptest::collection::vec((any::<bool>(), 1i64..60_000, 1i64..60_000), 1..6)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_net_and_single_record_per_ticket(trucks in truck_weights(), sweeps in 1usize..4) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let backends = FacilityBackends::with_clock(fixed_clock());
                let container = facility(config(false), backends.clone()).await;
                let orchestrator = &container.orchestrator;

                let mut previous = None;
                for (i, (load, entry, exit)) in trucks.iter().enumerate() {
                    let operation = if *load { OperationKind::Load } else { OperationKind::Unload };
                    let id = arrive(&container, &format!("T{i}"), "ACME", operation).await;
                    stable_reading(orchestrator, id, WeighingPhase::Entry, Weight::from_milli(*entry)).await;
                    orchestrator.request_zone_transition(id).await.unwrap();
                    orchestrator.request_exit_weighing(id).await.unwrap();
                    stable_reading(orchestrator, id, WeighingPhase::Exit, Weight::from_milli(*exit)).await;
                    let report = orchestrator.request_completion(id).await.unwrap();

                    assert_eq!(report.derived.net.milli(), (entry - exit).abs());
                    assert!(report.derived.net >= Weight::ZERO);
                    if let Some(prev) = previous {
                        assert!(report.ticket > prev);
                    }
                    previous = Some(report.ticket);

                    // Fast-path attempt racing the sweeps below.
                    let session = orchestrator.session(id).await.unwrap();
                    let candidate = transfer_candidate(&session).unwrap();
                    assert!(container.reconciliation.transfer(&candidate).await.is_settled());
                }

                for _ in 0..sweeps {
                    let report = container.reconciliation.sweep().await.unwrap();
                    assert!(report.is_clean());
                }
                assert_eq!(backends.historical.record_count(), trucks.len());
            });
        }
    }

    // =========================================================================
    // QUOTA
    // =========================================================================

    #[tokio::test]
    async fn test_blocked_client_stays_blocked_until_reset() {
        let client = ClientName::new("C");
        let backends = FacilityBackends {
            quotas: Arc::new(InMemoryQuotaRepository::with_records([QuotaRecord::new(
                client.clone(),
                Weight::from_tons(100),
                Weight::from_tons(99),
            )])),
            ..FacilityBackends::with_clock(fixed_clock())
        };
        let container = facility(config(false), backends).await;
        let orchestrator = &container.orchestrator;

        let id = arrive(&container, "T1", "C", OperationKind::Load).await;
        stable_reading(orchestrator, id, WeighingPhase::Entry, Weight::from_tons(10)).await;
        orchestrator.request_zone_transition(id).await.unwrap();
        orchestrator.request_exit_weighing(id).await.unwrap();
        stable_reading(orchestrator, id, WeighingPhase::Exit, Weight::from_tons(15)).await;
        orchestrator.request_completion(id).await.unwrap();

        for attempt in 0..3 {
            let truck = format!("R{attempt}");
            container
                .planning
                .schedule_today(truck.as_str(), "C", "SAND", OperationKind::Load, Weight::from_tons(25));
            assert!(matches!(
                orchestrator.truck_detected(truck.as_str()).await,
                Err(OrchestratorError::QuotaBlocked { .. })
            ));
        }

        container
            .quotas
            .reset(&client, Weight::from_tons(200), Weight::from_tons(104))
            .await
            .unwrap();
        let admitted = arrive(&container, "R9", "C", OperationKind::Load).await;
        assert!(orchestrator.session(admitted).await.is_some());
    }
}
