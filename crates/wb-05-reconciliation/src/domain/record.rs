//! Transfer candidates, historical rows and transfer outcomes.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared_types::{
    date_time_of, ClientName, ProductId, SessionId, TicketNumber, Timestamp, TransferStatus,
    TruckId, Weight,
};
use std::fmt;

/// Product name used when the store has never seen the product.
pub const UNKNOWN_PRODUCT: &str = "Unknown product";

/// Destination-local identifier of a reference row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefId(pub u64);

/// Destination-local identifier of a historical row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference tables of the historical store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Truck,
    Client,
    Product,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Truck => "truck",
            ReferenceKind::Client => "client",
            ReferenceKind::Product => "product",
        }
    }
}

/// Reference row to create, keyed by natural key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewReference {
    /// Truck code, linked to its client.
    Truck { code: TruckId, client: RefId },
    /// Client name, linked to the product it was first seen with.
    Client { name: ClientName, product: RefId },
    /// Product key with a display name.
    Product { key: ProductId, name: String },
}

impl NewReference {
    pub fn kind(&self) -> ReferenceKind {
        match self {
            NewReference::Truck { .. } => ReferenceKind::Truck,
            NewReference::Client { .. } => ReferenceKind::Client,
            NewReference::Product { .. } => ReferenceKind::Product,
        }
    }

    pub fn natural_key(&self) -> &str {
        match self {
            NewReference::Truck { code, .. } => code.as_str(),
            NewReference::Client { name, .. } => name.as_str(),
            NewReference::Product { key, .. } => key.as_str(),
        }
    }
}

/// Read-only projection of a COMPLETED session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCandidate {
    pub session_id: SessionId,
    pub ticket: TicketNumber,
    pub truck_id: TruckId,
    pub client: ClientName,
    pub product: ProductId,
    pub tare: Weight,
    pub gross: Weight,
    pub net: Weight,
    pub completed_at: Timestamp,
}

/// Row of the historical weighings table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub ticket: TicketNumber,
    pub truck_ref: RefId,
    pub client_ref: RefId,
    pub product_ref: RefId,
    pub gross: Weight,
    pub tare: Weight,
    pub net: Weight,
}

impl HistoricalRecord {
    pub fn from_candidate(candidate: &TransferCandidate, refs: ResolvedRefs) -> Self {
        let (date, time) = date_time_of(candidate.completed_at);
        Self {
            date,
            time,
            ticket: candidate.ticket,
            truck_ref: refs.truck,
            client_ref: refs.client,
            product_ref: refs.product,
            gross: candidate.gross,
            tare: candidate.tare,
            net: candidate.net,
        }
    }

    /// Whether this row records the same weighing as `candidate`.
    pub fn matches(&self, candidate: &TransferCandidate) -> bool {
        self.ticket == candidate.ticket
            && self.gross == candidate.gross
            && self.tare == candidate.tare
            && self.net == candidate.net
    }
}

/// Reference ids a historical row points to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedRefs {
    pub truck: RefId,
    pub client: RefId,
    pub product: RefId,
}

/// Result of one transfer attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Row inserted by this attempt.
    Confirmed(RecordId),
    /// Row already present with the same contents.
    Duplicate,
    /// Store unreachable or failing; retried next sweep.
    Deferred(String),
    /// Row present for the ticket with different contents. Never retried.
    IntegrityViolation(String),
}

impl TransferOutcome {
    pub fn status(&self) -> TransferStatus {
        match self {
            TransferOutcome::Confirmed(_) => TransferStatus::Confirmed,
            TransferOutcome::Duplicate => TransferStatus::Duplicate,
            TransferOutcome::Deferred(_) => TransferStatus::Deferred,
            TransferOutcome::IntegrityViolation(_) => TransferStatus::IntegrityViolation,
        }
    }

    /// The historical store holds the row; the session may be confirmed.
    pub fn is_settled(&self) -> bool {
        matches!(self, TransferOutcome::Confirmed(_) | TransferOutcome::Duplicate)
    }
}

/// Tally of one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub examined: usize,
    pub confirmed: usize,
    pub duplicate: usize,
    pub deferred: usize,
    pub integrity_violations: usize,
}

impl SweepReport {
    pub fn record(&mut self, outcome: &TransferOutcome) {
        self.examined += 1;
        match outcome {
            TransferOutcome::Confirmed(_) => self.confirmed += 1,
            TransferOutcome::Duplicate => self.duplicate += 1,
            TransferOutcome::Deferred(_) => self.deferred += 1,
            TransferOutcome::IntegrityViolation(_) => self.integrity_violations += 1,
        }
    }

    /// No transfer was deferred.
    pub fn is_clean(&self) -> bool {
        self.deferred == 0
    }
}
