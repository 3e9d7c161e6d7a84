//! # Facility Container
//!
//! Holds every subsystem instance and wires them together through the
//! adapters.
//!
//! ## Initialization Order
//!
//! ```text
//! Phase 1: Event bus, clock
//! Phase 2: Ticket sequence (seeded from counter, sessions, historical store)
//! Phase 3: Quota ledger, bridge admission, planning
//! Phase 4: Reconciliation
//! Phase 5: Session service and orchestrator
//! ```
//!
//! The ticket sequence must be seeded before any session can complete, so it
//! comes up before the orchestrator exists.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use shared_bus::InMemoryEventBus;
use shared_types::{SystemTimeSource, TimeSource};
use wb_01_ticket_sequence::{
    InMemoryTicketCounterStore, SequenceAllocator, SequenceError, TicketSeedSource,
};
use wb_02_quota_ledger::{InMemoryQuotaRepository, QuotaError, QuotaService};
use wb_03_bridge_admission::BridgeAdmissionController;
use wb_04_weighing_session::{InMemorySessionRepository, SessionPorts, SessionService};
use wb_05_reconciliation::{
    InMemoryHistoricalStore, ReconciliationService, SweepScheduler, TransferObserver,
};

use crate::adapters::{
    BridgeGateAdapter, HistoricalSeed, PlanningBook, QuotaGateAdapter, SessionRepositorySource,
    SessionSeed, TelemetryObserver, TicketIssuerAdapter,
};
use crate::container::config::FacilityConfig;
use crate::orchestrator::Orchestrator;

/// Ticket allocator over the in-memory counter store.
pub type ConcreteSequenceAllocator = SequenceAllocator<InMemoryTicketCounterStore>;

/// Quota service over the in-memory repository.
pub type ConcreteQuotaService = QuotaService<InMemoryQuotaRepository>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Ticket sequence could not be seeded: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Quota ledger could not be loaded: {0}")]
    Quota(#[from] QuotaError),
}

/// Persistent state the container runs on.
///
/// Tests pre-fill these to simulate a restart.
#[derive(Clone)]
pub struct FacilityBackends {
    pub clock: Arc<dyn TimeSource>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub historical: Arc<InMemoryHistoricalStore>,
    pub quotas: Arc<InMemoryQuotaRepository>,
    pub ticket_counter: Arc<InMemoryTicketCounterStore>,
}

impl FacilityBackends {
    /// Empty stores on the system clock.
    pub fn in_memory() -> Self {
        Self::with_clock(Arc::new(SystemTimeSource))
    }

    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            clock,
            sessions: Arc::new(InMemorySessionRepository::new()),
            historical: Arc::new(InMemoryHistoricalStore::new()),
            quotas: Arc::new(InMemoryQuotaRepository::new()),
            ticket_counter: Arc::new(InMemoryTicketCounterStore::new()),
        }
    }
}

/// Central container holding all subsystem instances.
pub struct FacilityContainer {
    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    pub event_bus: Arc<InMemoryEventBus>,
    pub clock: Arc<dyn TimeSource>,
    pub backends: FacilityBackends,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Ticket sequence (wb-01).
    pub tickets: Arc<ConcreteSequenceAllocator>,

    /// Quota ledger (wb-02).
    pub quotas: Arc<ConcreteQuotaService>,

    /// Bridge admission (wb-03).
    pub bridge: Arc<BridgeAdmissionController>,

    /// Planning table the arrival authorization reads.
    pub planning: Arc<PlanningBook>,

    /// Reconciliation (wb-05).
    pub reconciliation: Arc<ReconciliationService>,
    pub observer: Arc<TelemetryObserver>,

    /// Session orchestration (wb-04 driven by the orchestrator).
    pub orchestrator: Arc<Orchestrator>,

    pub config: FacilityConfig,
}

impl FacilityContainer {
    /// Build every subsystem over `backends`.
    #[instrument(name = "facility_init", skip_all)]
    pub async fn build(
        config: FacilityConfig,
        backends: FacilityBackends,
    ) -> Result<Self, ContainerError> {
        info!("Initializing weighbridge facility container");

        // =====================================================================
        // PHASE 1: Shared Infrastructure
        // =====================================================================
        info!("Phase 1: Creating shared infrastructure");
        let event_bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::clone(&backends.clock);

        // =====================================================================
        // PHASE 2: Ticket Sequence
        // =====================================================================
        info!("Phase 2: Seeding ticket sequence");
        let seeds: Vec<Arc<dyn TicketSeedSource>> = vec![
            Arc::new(SessionSeed(backends.sessions.clone())),
            Arc::new(HistoricalSeed(backends.historical.clone())),
        ];
        let tickets = Arc::new(
            SequenceAllocator::initialize(
                &config.sequence,
                Arc::clone(&backends.ticket_counter),
                &seeds,
            )
            .await?,
        );
        info!("  [wb-01] Ticket sequence ready (high water {})", tickets.high_water());

        // =====================================================================
        // PHASE 3: Quota, Bridge, Planning
        // =====================================================================
        info!("Phase 3: Initializing quota ledger, bridge and planning");
        let quotas = Arc::new(QuotaService::load(Arc::clone(&backends.quotas)).await?);
        info!("  [wb-02] Quota ledger loaded");

        let bridge = Arc::new(BridgeAdmissionController::new());
        info!("  [wb-03] Bridge admission ready");

        let planning = Arc::new(PlanningBook::new(Arc::clone(&clock)));

        // =====================================================================
        // PHASE 4: Reconciliation
        // =====================================================================
        info!("Phase 4: Initializing reconciliation");
        let observer = Arc::new(TelemetryObserver::new(Arc::clone(&event_bus)));
        let reconciliation = Arc::new(ReconciliationService::new(
            backends.historical.clone(),
            Arc::new(SessionRepositorySource::new(backends.sessions.clone())),
            observer.clone(),
            config.reconciliation.batch_size,
        ));
        info!(
            "  [wb-05] Reconciliation ready (batch {}, interval {}ms)",
            config.reconciliation.batch_size, config.reconciliation.interval_ms
        );

        // =====================================================================
        // PHASE 5: Sessions and Orchestrator
        // =====================================================================
        info!("Phase 5: Wiring session service and orchestrator");
        let ports = SessionPorts {
            bridge: Arc::new(BridgeGateAdapter::new(Arc::clone(&bridge))),
            quota: Arc::new(QuotaGateAdapter::new(Arc::clone(&quotas))),
            tickets: Arc::new(TicketIssuerAdapter::new(Arc::clone(&tickets))),
            planning: planning.clone(),
            repository: backends.sessions.clone(),
        };
        let service = SessionService::new(ports, Arc::clone(&clock));
        let fast_path = config
            .orchestrator
            .fast_path_transfer
            .then(|| Arc::clone(&reconciliation));
        let orchestrator = Arc::new(Orchestrator::new(
            service,
            Arc::clone(&bridge),
            Arc::clone(&event_bus),
            fast_path,
        ));
        info!("  [wb-04] Orchestrator ready");

        Ok(Self {
            event_bus,
            clock,
            backends,
            tickets,
            quotas,
            bridge,
            planning,
            reconciliation,
            observer,
            orchestrator,
            config,
        })
    }

    /// Test container on empty in-memory stores.
    pub async fn for_testing(clock: Arc<dyn TimeSource>) -> Result<Self, ContainerError> {
        Self::build(FacilityConfig::for_testing(), FacilityBackends::with_clock(clock)).await
    }

    /// Periodic sweeper over this container's reconciliation service.
    pub fn sweeper(&self) -> SweepScheduler {
        let observer: Arc<dyn TransferObserver> = self.observer.clone();
        SweepScheduler::new(
            Arc::clone(&self.reconciliation),
            observer,
            self.config.reconciliation.clone(),
        )
    }
}
