//! Get-or-create of reference rows by natural key.

use crate::domain::errors::StoreError;
use crate::domain::record::{
    NewReference, RefId, ReferenceKind, ResolvedRefs, TransferCandidate, UNKNOWN_PRODUCT,
};
use crate::ports::outbound::HistoricalStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// Memoizes natural key → destination id. A cached id is re-checked against
/// the store before use and dropped if the row is gone.
#[derive(Debug, Default)]
pub struct EntityResolver {
    cache: RwLock<HashMap<(ReferenceKind, String), RefId>>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve product, then client (linked to the product), then truck
    /// (linked to the client).
    pub async fn resolve(
        &self,
        store: &dyn HistoricalStore,
        candidate: &TransferCandidate,
    ) -> Result<ResolvedRefs, StoreError> {
        let product = self
            .get_or_create(
                store,
                NewReference::Product {
                    key: candidate.product.clone(),
                    name: UNKNOWN_PRODUCT.to_string(),
                },
            )
            .await?;
        let client = self
            .get_or_create(
                store,
                NewReference::Client {
                    name: candidate.client.clone(),
                    product,
                },
            )
            .await?;
        let truck = self
            .get_or_create(
                store,
                NewReference::Truck {
                    code: candidate.truck_id.clone(),
                    client,
                },
            )
            .await?;

        Ok(ResolvedRefs {
            truck,
            client,
            product,
        })
    }

    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    async fn get_or_create(
        &self,
        store: &dyn HistoricalStore,
        reference: NewReference,
    ) -> Result<RefId, StoreError> {
        let kind = reference.kind();
        let cache_key = (kind, reference.natural_key().to_string());

        let cached = self.cache.read().get(&cache_key).copied();
        if let Some(id) = cached {
            if store.reference_exists(kind, id).await? {
                return Ok(id);
            }
            debug!(kind = kind.as_str(), key = %cache_key.1, "Cached reference is stale");
            self.cache.write().remove(&cache_key);
        }

        let id = match store.find_reference(kind, &cache_key.1).await? {
            Some(id) => id,
            None => match store.create_reference(reference).await {
                Ok(id) => {
                    info!(kind = kind.as_str(), key = %cache_key.1, "Reference created in historical store");
                    id
                }
                // Created concurrently by another transfer.
                Err(StoreError::Constraint(reason)) => store
                    .find_reference(kind, &cache_key.1)
                    .await?
                    .ok_or(StoreError::Constraint(reason))?,
                Err(e) => return Err(e),
            },
        };

        self.cache.write().insert(cache_key, id);
        Ok(id)
    }
}
