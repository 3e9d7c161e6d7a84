//! The in-memory ledger.

use super::errors::QuotaError;
use super::record::{Availability, DebitReceipt, QuotaRecord};
use parking_lot::{Mutex, RwLock};
use shared_types::{ClientName, Weight};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Quota records keyed by client, each behind its own lock.
#[derive(Debug, Default)]
pub struct QuotaLedger {
    records: RwLock<HashMap<ClientName, Arc<Mutex<QuotaRecord>>>>,
}

impl QuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = QuotaRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.client.clone(), Arc::new(Mutex::new(r))))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }

    fn slot(&self, client: &ClientName) -> Option<Arc<Mutex<QuotaRecord>>> {
        self.records.read().get(client).cloned()
    }

    /// Whether a new arrival for `client` may be admitted.
    pub fn check_available(&self, client: &ClientName) -> Availability {
        match self.slot(client) {
            None => Availability::Available { remaining: None },
            Some(slot) => slot.lock().availability(),
        }
    }

    /// Add `amount` to the client's consumption.
    ///
    /// Clients without a record are unlimited; the debit is a no-op.
    pub fn debit(&self, client: &ClientName, amount: Weight) -> Result<DebitReceipt, QuotaError> {
        if amount < Weight::ZERO {
            return Err(QuotaError::NegativeDebit {
                client: client.clone(),
                amount,
            });
        }

        let Some(slot) = self.slot(client) else {
            debug!(client = %client, amount = %amount, "Debit for unlimited client ignored");
            return Ok(DebitReceipt {
                client: client.clone(),
                remaining: None,
                blocked: false,
                newly_blocked: false,
            });
        };

        let mut record = slot.lock();
        record.consumed = record.consumed + amount;

        let newly_blocked = !record.blocked && record.is_exceeded();
        if newly_blocked {
            record.blocked = true;
            warn!(
                client = %client,
                consumed = %record.consumed,
                total = %record.total,
                "Client quota exceeded, blocking further arrivals"
            );
        } else {
            debug!(client = %client, amount = %amount, remaining = %record.remaining(), "Quota debited");
        }

        Ok(DebitReceipt {
            client: client.clone(),
            remaining: Some(record.remaining()),
            blocked: record.blocked,
            newly_blocked,
        })
    }

    /// Take back a debit whose completion was abandoned.
    ///
    /// `lift_block` is set when that debit was the one that blocked the
    /// client; the block is lifted only if consumption is back within the
    /// allotment.
    pub fn refund(
        &self,
        client: &ClientName,
        amount: Weight,
        lift_block: bool,
    ) -> Result<Option<Weight>, QuotaError> {
        if amount < Weight::ZERO {
            return Err(QuotaError::NegativeDebit {
                client: client.clone(),
                amount,
            });
        }
        let Some(slot) = self.slot(client) else {
            return Ok(None);
        };

        let mut record = slot.lock();
        record.consumed = (record.consumed - amount).clamp_non_negative();
        if lift_block && record.blocked && !record.is_exceeded() {
            record.blocked = false;
        }
        debug!(client = %client, amount = %amount, blocked = record.blocked, "Quota refunded");
        Ok(Some(record.remaining()))
    }

    /// External reset: set allotment and consumption, clear the block.
    pub fn reset(
        &self,
        client: &ClientName,
        total: Weight,
        consumed: Weight,
    ) -> Result<QuotaRecord, QuotaError> {
        if total < Weight::ZERO {
            return Err(QuotaError::InvalidAllotment {
                client: client.clone(),
                total,
            });
        }

        let record = QuotaRecord::new(client.clone(), total, consumed.clamp_non_negative());
        if let Some(slot) = self.slot(client) {
            *slot.lock() = record.clone();
        } else {
            self.records
                .write()
                .entry(client.clone())
                .and_modify(|slot| *slot.lock() = record.clone())
                .or_insert_with(|| Arc::new(Mutex::new(record.clone())));
        }
        debug!(client = %client, total = %total, "Quota reset");
        Ok(record)
    }

    /// Drop a client's record, making it unlimited.
    pub fn remove(&self, client: &ClientName) -> Option<QuotaRecord> {
        self.records
            .write()
            .remove(client)
            .map(|slot| slot.lock().clone())
    }

    pub fn record(&self, client: &ClientName) -> Option<QuotaRecord> {
        self.slot(client).map(|slot| slot.lock().clone())
    }

    /// Snapshot of every record, ordered by client.
    pub fn records(&self) -> Vec<QuotaRecord> {
        let slots: Vec<_> = self.records.read().values().cloned().collect();
        let mut out: Vec<_> = slots.iter().map(|s| s.lock().clone()).collect();
        out.sort_by(|a, b| a.client.cmp(&b.client));
        out
    }
}
