//! Quota gate over the quota service.

use async_trait::async_trait;
use shared_types::{ClientName, Weight};
use std::sync::Arc;
use wb_02_quota_ledger::{Availability, QuotaRepository, QuotaService};
use wb_04_weighing_session::{PortError, QuotaCheck, QuotaDebit, QuotaGate};

pub struct QuotaGateAdapter<R: QuotaRepository> {
    service: Arc<QuotaService<R>>,
}

impl<R: QuotaRepository> QuotaGateAdapter<R> {
    pub fn new(service: Arc<QuotaService<R>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R: QuotaRepository + 'static> QuotaGate for QuotaGateAdapter<R> {
    fn check(&self, client: &ClientName) -> QuotaCheck {
        match self.service.check_available(client) {
            Availability::Available { remaining } => QuotaCheck::Available { remaining },
            Availability::Blocked(reason) => QuotaCheck::Blocked {
                reason: reason.to_string(),
            },
        }
    }

    async fn debit(&self, client: &ClientName, amount: Weight) -> Result<QuotaDebit, PortError> {
        let receipt = self
            .service
            .debit(client, amount)
            .await
            .map_err(|e| PortError::Rejected(e.to_string()))?;
        Ok(QuotaDebit {
            remaining: receipt.remaining,
            newly_blocked: receipt.newly_blocked,
        })
    }

    async fn refund(
        &self,
        client: &ClientName,
        amount: Weight,
        debit: &QuotaDebit,
    ) -> Result<(), PortError> {
        self.service
            .refund(client, amount, debit.newly_blocked)
            .await
            .map(|_| ())
            .map_err(|e| PortError::Rejected(e.to_string()))
    }
}
