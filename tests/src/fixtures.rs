//! Shared fixtures: a facility on a fixed day and helpers that walk a
//! session through the weighing flow.

use std::sync::Arc;

use chrono::NaiveDate;
use facility_runtime::{FacilityBackends, FacilityConfig, FacilityContainer, Orchestrator};
use shared_types::{
    ManualTimeSource, OperationKind, SessionId, Stability, TimeSource, WeighingPhase, Weight,
};

/// Day every fixture facility runs on.
pub fn facility_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
}

pub fn fixed_clock() -> Arc<dyn TimeSource> {
    Arc::new(ManualTimeSource::at_date(facility_day()))
}

/// Test configuration with the fast path switched as requested.
pub fn config(fast_path: bool) -> FacilityConfig {
    let mut config = FacilityConfig::for_testing();
    config.orchestrator.fast_path_transfer = fast_path;
    config
}

pub async fn facility(config: FacilityConfig, backends: FacilityBackends) -> FacilityContainer {
    FacilityContainer::build(config, backends).await.unwrap()
}

/// Schedule `truck` for today and detect it at the gate.
pub async fn arrive(
    container: &FacilityContainer,
    truck: &str,
    client: &str,
    operation: OperationKind,
) -> SessionId {
    container
        .planning
        .schedule_today(truck, client, "SAND", operation, Weight::from_tons(25));
    container
        .orchestrator
        .truck_detected(truck)
        .await
        .unwrap()
        .session()
        .id()
}

pub async fn stable_reading(
    orchestrator: &Orchestrator,
    id: SessionId,
    phase: WeighingPhase,
    weight: Weight,
) {
    orchestrator
        .report_weight(id, phase, weight, Stability::Stable)
        .await
        .unwrap();
}

/// Entry weight then zone transition. The session must hold the bridge.
pub async fn weigh_in(orchestrator: &Orchestrator, id: SessionId, weight: Weight) {
    stable_reading(orchestrator, id, WeighingPhase::Entry, weight).await;
    orchestrator.request_zone_transition(id).await.unwrap();
}

/// Exit request, exit weight and completion. The bridge must be free or
/// already granted to the session.
pub async fn weigh_out(orchestrator: &Orchestrator, id: SessionId, weight: Weight) {
    orchestrator.request_exit_weighing(id).await.unwrap();
    stable_reading(orchestrator, id, WeighingPhase::Exit, weight).await;
    orchestrator.request_completion(id).await.unwrap();
}
