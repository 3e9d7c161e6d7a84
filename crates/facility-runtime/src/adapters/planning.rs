//! In-memory planning table standing in for the scheduling collaborator.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use shared_types::{
    ClientName, OperationKind, PlanningEntry, PlanningId, PlanningStatus, ProductId, TimeSource,
    TruckId, Weight,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use wb_04_weighing_session::{PlanningAuthority, PortError};

pub struct PlanningBook {
    entries: RwLock<BTreeMap<PlanningId, PlanningEntry>>,
    clock: Arc<dyn TimeSource>,
}

impl PlanningBook {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Add a PENDING entry and return its id.
    pub fn schedule(
        &self,
        date: NaiveDate,
        truck_id: TruckId,
        client: ClientName,
        product: ProductId,
        operation: OperationKind,
        planned_quantity: Weight,
    ) -> PlanningId {
        let mut entries = self.entries.write();
        let id = PlanningId(entries.keys().next_back().map_or(1, |last| last.0 + 1));
        entries.insert(
            id,
            PlanningEntry {
                id,
                date,
                truck_id,
                client,
                product,
                operation,
                planned_quantity,
                status: PlanningStatus::Pending,
            },
        );
        id
    }

    /// Schedule for the clock's current day.
    pub fn schedule_today(
        &self,
        truck_id: impl Into<TruckId>,
        client: impl Into<ClientName>,
        product: impl Into<ProductId>,
        operation: OperationKind,
        planned_quantity: Weight,
    ) -> PlanningId {
        self.schedule(
            self.clock.today(),
            truck_id.into(),
            client.into(),
            product.into(),
            operation,
            planned_quantity,
        )
    }

    pub fn entry(&self, id: PlanningId) -> Option<PlanningEntry> {
        self.entries.read().get(&id).cloned()
    }
}

#[async_trait]
impl PlanningAuthority for PlanningBook {
    async fn authorize_arrival(&self, truck_id: &TruckId) -> Result<Option<PlanningEntry>, PortError> {
        let today = self.clock.today();
        let entry = self
            .entries
            .read()
            .values()
            .find(|e| {
                &e.truck_id == truck_id && e.date == today && e.status == PlanningStatus::Pending
            })
            .cloned();
        debug!(truck_id = %truck_id, found = entry.is_some(), "Planning lookup");
        Ok(entry)
    }

    async fn set_status(&self, id: PlanningId, status: PlanningStatus) -> Result<(), PortError> {
        match self.entries.write().get_mut(&id) {
            Some(entry) => {
                entry.status = status;
                Ok(())
            }
            None => Err(PortError::NotFound(format!("planning entry {id}"))),
        }
    }
}
