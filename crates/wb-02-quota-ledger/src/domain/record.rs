//! Quota record and the answers the ledger gives about it.

use serde::{Deserialize, Serialize};
use shared_types::{ClientName, Weight};
use std::fmt;

/// Per-client allotment and consumption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub client: ClientName,
    pub total: Weight,
    pub consumed: Weight,
    pub blocked: bool,
}

impl QuotaRecord {
    pub fn new(client: ClientName, total: Weight, consumed: Weight) -> Self {
        Self {
            client,
            total,
            consumed,
            blocked: false,
        }
    }

    /// `total - consumed`; negative once overdrawn.
    #[must_use]
    pub fn remaining(&self) -> Weight {
        self.total - self.consumed
    }

    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        self.consumed > self.total
    }

    /// Admission answer for this record.
    #[must_use]
    pub fn availability(&self) -> Availability {
        if self.blocked {
            return Availability::Blocked(BlockReason::Exceeded {
                consumed: self.consumed,
                total: self.total,
            });
        }
        if !self.remaining().is_positive() {
            return Availability::Blocked(BlockReason::Exhausted {
                remaining: self.remaining(),
            });
        }
        Availability::Available {
            remaining: Some(self.remaining()),
        }
    }
}

/// Answer to `check_available`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    /// `remaining` is `None` for clients without a record (unlimited).
    Available { remaining: Option<Weight> },
    Blocked(BlockReason),
}

impl Availability {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// Sticky block set when consumption first passed the allotment.
    Exceeded { consumed: Weight, total: Weight },
    /// Nothing left to consume, though not yet overdrawn.
    Exhausted { remaining: Weight },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Exceeded { consumed, total } => {
                write!(f, "client blocked: quota exceeded ({consumed} t of {total} t)")
            }
            BlockReason::Exhausted { remaining } => {
                write!(f, "quota exhausted ({remaining} t remaining)")
            }
        }
    }
}

/// Result of a debit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebitReceipt {
    pub client: ClientName,
    /// `None` when the client has no record (unlimited).
    pub remaining: Option<Weight>,
    pub blocked: bool,
    /// True only on the debit that set the block.
    pub newly_blocked: bool,
}
