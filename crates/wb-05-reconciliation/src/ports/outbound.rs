//! Outbound (Driven) ports for reconciliation.

use crate::domain::errors::{ReconciliationError, StoreError};
use crate::domain::record::{
    HistoricalRecord, NewReference, RecordId, RefId, ReferenceKind, SweepReport,
    TransferCandidate, TransferOutcome,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{SessionId, TicketNumber};
use std::collections::HashMap;
use std::time::Duration;

/// Long-term store of completed weighings.
///
/// Independently keyed: rows reference trucks, clients and products by
/// destination-local ids, found by natural key.
#[async_trait]
pub trait HistoricalStore: Send + Sync {
    async fn find_by_ticket(
        &self,
        ticket: TicketNumber,
    ) -> Result<Option<(RecordId, HistoricalRecord)>, StoreError>;

    async fn find_reference(
        &self,
        kind: ReferenceKind,
        natural_key: &str,
    ) -> Result<Option<RefId>, StoreError>;

    async fn reference_exists(&self, kind: ReferenceKind, id: RefId) -> Result<bool, StoreError>;

    /// Fails with `Constraint` if the natural key is taken.
    async fn create_reference(&self, reference: NewReference) -> Result<RefId, StoreError>;

    /// Fails with `AlreadyExists` if the ticket is taken.
    async fn insert_record(&self, record: HistoricalRecord) -> Result<RecordId, StoreError>;

    /// Highest numeric ticket recorded.
    async fn max_ticket(&self) -> Result<Option<u64>, StoreError>;
}

/// COMPLETED sessions awaiting transfer.
#[async_trait]
pub trait CompletedSessionSource: Send + Sync {
    /// Up to `limit` unconfirmed sessions, lowest ticket first.
    async fn pending(&self, limit: usize) -> Result<Vec<TransferCandidate>, ReconciliationError>;

    async fn confirm(&self, session_id: SessionId) -> Result<(), ReconciliationError>;
}

/// Receives transfer and sweep results, e.g. for metrics and notifications.
pub trait TransferObserver: Send + Sync {
    fn on_transfer(&self, candidate: &TransferCandidate, outcome: &TransferOutcome);

    fn on_sweep(&self, _report: &SweepReport, _elapsed: Duration) {}

    fn on_sweep_failed(&self, _failures: u32) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TransferObserver for NoopObserver {
    fn on_transfer(&self, _candidate: &TransferCandidate, _outcome: &TransferOutcome) {}
}

// =============================================================================
// In-memory historical store
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    references: HashMap<ReferenceKind, Vec<(String, NewReference)>>,
    records: Vec<HistoricalRecord>,
}

/// In-memory historical store with an availability switch.
#[derive(Debug, Default)]
pub struct InMemoryHistoricalStore {
    tables: RwLock<Tables>,
    unavailable: RwLock<bool>,
}

impl InMemoryHistoricalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going down or coming back.
    pub fn set_available(&self, available: bool) {
        *self.unavailable.write() = !available;
    }

    /// Seed a row directly, bypassing reference checks.
    pub fn seed_record(&self, record: HistoricalRecord) {
        self.tables.write().records.push(record);
    }

    pub fn records(&self) -> Vec<HistoricalRecord> {
        self.tables.read().records.clone()
    }

    pub fn record_count(&self) -> usize {
        self.tables.read().records.len()
    }

    pub fn reference_count(&self, kind: ReferenceKind) -> usize {
        self.tables.read().references.get(&kind).map_or(0, Vec::len)
    }

    /// Stored row for a reference id.
    pub fn reference(&self, kind: ReferenceKind, id: RefId) -> Option<NewReference> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.tables
            .read()
            .references
            .get(&kind)
            .and_then(|rows| rows.get(index))
            .map(|(_, row)| row.clone())
    }

    /// Remove a reference row's key so its id no longer resolves.
    pub fn purge_reference(&self, kind: ReferenceKind, id: RefId) {
        let Some(index) = usize::try_from(id.0).ok().and_then(|i| i.checked_sub(1)) else {
            return;
        };
        if let Some(rows) = self.tables.write().references.get_mut(&kind) {
            if let Some(row) = rows.get_mut(index) {
                row.0.clear();
            }
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.unavailable.read() {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl HistoricalStore for InMemoryHistoricalStore {
    async fn find_by_ticket(
        &self,
        ticket: TicketNumber,
    ) -> Result<Option<(RecordId, HistoricalRecord)>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .records
            .iter()
            .enumerate()
            .find(|(_, r)| r.ticket == ticket)
            .map(|(i, r)| (RecordId(i as u64 + 1), r.clone())))
    }

    async fn find_reference(
        &self,
        kind: ReferenceKind,
        natural_key: &str,
    ) -> Result<Option<RefId>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().references.get(&kind).and_then(|rows| {
            rows.iter()
                .position(|(key, _)| key == natural_key)
                .map(|i| RefId(i as u64 + 1))
        }))
    }

    async fn reference_exists(&self, kind: ReferenceKind, id: RefId) -> Result<bool, StoreError> {
        self.check_available()?;
        let index = usize::try_from(id.0).ok().and_then(|i| i.checked_sub(1));
        Ok(self.tables.read().references.get(&kind).is_some_and(|rows| {
            index
                .and_then(|i| rows.get(i))
                .is_some_and(|(key, _)| !key.is_empty())
        }))
    }

    async fn create_reference(&self, reference: NewReference) -> Result<RefId, StoreError> {
        self.check_available()?;
        let kind = reference.kind();
        let key = reference.natural_key().to_string();
        let mut tables = self.tables.write();
        let rows = tables.references.entry(kind).or_default();
        if rows.iter().any(|(k, _)| *k == key) {
            return Err(StoreError::Constraint(format!(
                "{} '{key}' already exists",
                kind.as_str()
            )));
        }
        rows.push((key, reference));
        Ok(RefId(rows.len() as u64))
    }

    async fn insert_record(&self, record: HistoricalRecord) -> Result<RecordId, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write();
        if tables.records.iter().any(|r| r.ticket == record.ticket) {
            return Err(StoreError::AlreadyExists(record.ticket));
        }
        tables.records.push(record);
        Ok(RecordId(tables.records.len() as u64))
    }

    async fn max_ticket(&self) -> Result<Option<u64>, StoreError> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .records
            .iter()
            .map(|r| r.ticket.value())
            .max())
    }
}
