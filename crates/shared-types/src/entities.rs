//! # Domain Entities
//!
//! Identifiers and records that cross subsystem boundaries.
//!
//! | Type | Keyed by | Owner |
//! |------|----------|-------|
//! | `PlanningEntry` | `PlanningId` | external scheduler (status flipped by runtime) |
//! | Weighing session | `SessionId` | orchestrator |
//! | Ticket | `TicketNumber` | sequence allocator |

use crate::weight::Weight;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a weighing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! natural_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Build the key, trimming surrounding whitespace.
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(value.as_ref().trim().to_string())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

natural_key!(
    /// Truck registration plate (matricule).
    TruckId
);
natural_key!(
    /// Client name; the natural key of a quota record.
    ClientName
);
natural_key!(
    /// Product identifier as used by the planning collaborator.
    ProductId
);

/// Externally visible sequential identifier of a completed weighing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(pub u64);

impl TicketNumber {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a planning entry, assigned by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanningId(pub u64);

impl fmt::Display for PlanningId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What the truck does between its two weighings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Arrives empty, leaves loaded: entry weight is tare.
    Load,
    /// Arrives loaded, leaves empty: entry weight is gross.
    Unload,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanningStatus {
    Pending,
    InProgress,
    Completed,
}

/// An authorization record created by the external scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningEntry {
    pub id: PlanningId,
    pub date: NaiveDate,
    pub truck_id: TruckId,
    pub client: ClientName,
    pub product: ProductId,
    pub operation: OperationKind,
    pub planned_quantity: Weight,
    pub status: PlanningStatus,
}

/// Lifecycle states of a weighing session.
///
/// ```text
/// ARRIVAL ─→ ENTRY_WEIGHING ─┬→ LOADING ──┬→ EXIT_WEIGHING ─→ COMPLETED
///                            └→ UNLOADING ┘
///    (any non-terminal) ─→ CANCELLED
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeighingState {
    Arrival,
    EntryWeighing,
    Loading,
    Unloading,
    ExitWeighing,
    Completed,
    Cancelled,
}

impl WeighingState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, WeighingState::Completed | WeighingState::Cancelled)
    }

    /// Phase of bridge occupancy this state corresponds to, if any.
    #[must_use]
    pub const fn weighing_phase(self) -> Option<WeighingPhase> {
        match self {
            WeighingState::EntryWeighing => Some(WeighingPhase::Entry),
            WeighingState::ExitWeighing => Some(WeighingPhase::Exit),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WeighingState::Arrival => "ARRIVAL",
            WeighingState::EntryWeighing => "ENTRY_WEIGHING",
            WeighingState::Loading => "LOADING",
            WeighingState::Unloading => "UNLOADING",
            WeighingState::ExitWeighing => "EXIT_WEIGHING",
            WeighingState::Completed => "COMPLETED",
            WeighingState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for WeighingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two bridge visits a reading or grant belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeighingPhase {
    Entry,
    Exit,
}

impl fmt::Display for WeighingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeighingPhase::Entry => f.write_str("entry"),
            WeighingPhase::Exit => f.write_str("exit"),
        }
    }
}

/// Scale stability flag reported with each reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stability {
    Stable,
    #[default]
    Unstable,
}

/// Tare, gross and net, computed once both weighings are known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedWeights {
    pub tare: Weight,
    pub gross: Weight,
    pub net: Weight,
}

impl DerivedWeights {
    /// Assign entry/exit to tare/gross by operation kind; `net = |gross - tare|`.
    #[must_use]
    pub fn compute(operation: OperationKind, entry: Weight, exit: Weight) -> Self {
        let (tare, gross) = match operation {
            OperationKind::Load => (entry, exit),
            OperationKind::Unload => (exit, entry),
        };
        Self {
            tare,
            gross,
            net: gross.abs_diff(tare),
        }
    }

    /// True when the readings contradict the operation kind (gross below tare).
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.gross < self.tare
    }
}

/// Outcome classes of a historical transfer attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Record written by this attempt.
    Confirmed,
    /// Record already present; nothing written.
    Duplicate,
    /// Store unreachable or rejected the write; retried on next sweep.
    Deferred,
    /// Same ticket already present with different content.
    IntegrityViolation,
}

impl TransferStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TransferStatus::Confirmed => "confirmed",
            TransferStatus::Duplicate => "duplicate",
            TransferStatus::Deferred => "deferred",
            TransferStatus::IntegrityViolation => "integrity_violation",
        }
    }
}
