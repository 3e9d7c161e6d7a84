//! # Quota Service
//!
//! The ledger plus write-through to a repository. The in-memory ledger is
//! authoritative; every save writes the full record, so a failed save is
//! healed by the next successful one for the same client.

use crate::domain::errors::QuotaError;
use crate::domain::ledger::QuotaLedger;
use crate::domain::record::{Availability, DebitReceipt, QuotaRecord};
use crate::ports::outbound::QuotaRepository;
use shared_types::{ClientName, Weight};
use std::sync::Arc;
use tracing::{info, warn};

pub struct QuotaService<R: QuotaRepository> {
    ledger: QuotaLedger,
    repository: Arc<R>,
}

impl<R: QuotaRepository> QuotaService<R> {
    /// Load every record from the repository.
    pub async fn load(repository: Arc<R>) -> Result<Self, QuotaError> {
        let records = repository.load_all().await?;
        info!(clients = records.len(), "Quota ledger loaded");
        Ok(Self {
            ledger: QuotaLedger::from_records(records),
            repository,
        })
    }

    pub fn check_available(&self, client: &ClientName) -> Availability {
        self.ledger.check_available(client)
    }

    pub async fn debit(
        &self,
        client: &ClientName,
        amount: Weight,
    ) -> Result<DebitReceipt, QuotaError> {
        let receipt = self.ledger.debit(client, amount)?;
        if receipt.remaining.is_some() {
            self.persist(client).await;
        }
        Ok(receipt)
    }

    pub async fn refund(
        &self,
        client: &ClientName,
        amount: Weight,
        lift_block: bool,
    ) -> Result<Option<Weight>, QuotaError> {
        let remaining = self.ledger.refund(client, amount, lift_block)?;
        if remaining.is_some() {
            self.persist(client).await;
        }
        Ok(remaining)
    }

    pub async fn reset(
        &self,
        client: &ClientName,
        total: Weight,
        consumed: Weight,
    ) -> Result<QuotaRecord, QuotaError> {
        let record = self.ledger.reset(client, total, consumed)?;
        self.repository.save(&record).await?;
        Ok(record)
    }

    pub fn records(&self) -> Vec<QuotaRecord> {
        self.ledger.records()
    }

    pub fn record(&self, client: &ClientName) -> Option<QuotaRecord> {
        self.ledger.record(client)
    }

    async fn persist(&self, client: &ClientName) {
        // Snapshot after the record lock is released.
        let Some(record) = self.ledger.record(client) else {
            return;
        };
        if let Err(e) = self.repository.save(&record).await {
            warn!(client = %client, error = %e, "Quota record not persisted, will retry on next change");
        }
    }
}
