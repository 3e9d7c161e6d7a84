//! Outbound (Driven) ports for the quota ledger.

use crate::domain::errors::QuotaError;
use crate::domain::record::QuotaRecord;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ClientName;
use std::collections::BTreeMap;

/// Durable storage of quota records, keyed by client.
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    async fn load_all(&self) -> Result<Vec<QuotaRecord>, QuotaError>;

    /// Upsert the full record.
    async fn save(&self, record: &QuotaRecord) -> Result<(), QuotaError>;
}

#[derive(Debug, Default)]
pub struct InMemoryQuotaRepository {
    records: RwLock<BTreeMap<ClientName, QuotaRecord>>,
    failing: RwLock<bool>,
}

impl InMemoryQuotaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = QuotaRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.client.clone(), r)).collect()),
            failing: RwLock::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.write() = failing;
    }

    pub fn get(&self, client: &ClientName) -> Option<QuotaRecord> {
        self.records.read().get(client).cloned()
    }
}

#[async_trait]
impl QuotaRepository for InMemoryQuotaRepository {
    async fn load_all(&self) -> Result<Vec<QuotaRecord>, QuotaError> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn save(&self, record: &QuotaRecord) -> Result<(), QuotaError> {
        if *self.failing.read() {
            return Err(QuotaError::Repository("quota repository unavailable".into()));
        }
        self.records
            .write()
            .insert(record.client.clone(), record.clone());
        Ok(())
    }
}
