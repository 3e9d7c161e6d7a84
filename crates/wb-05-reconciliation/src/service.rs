//! # Reconciliation Service
//!
//! Moves COMPLETED sessions into the historical store.
//!
//! ## Transfer protocol
//!
//! 1. Look the ticket up in the store. A matching row settles the transfer
//!    as `Duplicate`; a row with different weights is an integrity violation.
//! 2. Resolve truck, client and product by natural key.
//! 3. Insert. A unique-ticket conflict here means a concurrent transfer won
//!    the race and is re-checked as in step 1.
//!
//! Settled transfers confirm the session at the source. Everything else
//! leaves it unconfirmed for the next sweep.

use crate::domain::errors::{ReconciliationError, StoreError};
use crate::domain::record::{HistoricalRecord, SweepReport, TransferCandidate, TransferOutcome};
use crate::ports::outbound::{CompletedSessionSource, HistoricalStore, TransferObserver};
use crate::resolver::EntityResolver;
use parking_lot::Mutex;
use shared_types::SessionId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct ReconciliationService {
    store: Arc<dyn HistoricalStore>,
    source: Arc<dyn CompletedSessionSource>,
    observer: Arc<dyn TransferObserver>,
    resolver: EntityResolver,
    batch_size: usize,
    /// Sessions with an integrity violation; skipped until restart.
    quarantined: Mutex<HashSet<SessionId>>,
}

impl ReconciliationService {
    pub fn new(
        store: Arc<dyn HistoricalStore>,
        source: Arc<dyn CompletedSessionSource>,
        observer: Arc<dyn TransferObserver>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            source,
            observer,
            resolver: EntityResolver::new(),
            batch_size: batch_size.max(1),
            quarantined: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn HistoricalStore> {
        &self.store
    }

    pub fn quarantined(&self) -> Vec<SessionId> {
        self.quarantined.lock().iter().copied().collect()
    }

    /// Transfer one session and confirm it if the store now holds it.
    ///
    /// Used by both the sweep and the fast path at completion. Never fails;
    /// the outcome says what happened.
    pub async fn transfer(&self, candidate: &TransferCandidate) -> TransferOutcome {
        let outcome = self.attempt(candidate).await;

        match &outcome {
            TransferOutcome::Confirmed(record) => info!(
                session_id = %candidate.session_id,
                ticket = %candidate.ticket,
                record = %record,
                "Weighing transferred to historical store"
            ),
            TransferOutcome::Duplicate => debug!(
                session_id = %candidate.session_id,
                ticket = %candidate.ticket,
                "Weighing already in historical store"
            ),
            TransferOutcome::Deferred(reason) => warn!(
                session_id = %candidate.session_id,
                ticket = %candidate.ticket,
                reason = %reason,
                "Transfer deferred"
            ),
            TransferOutcome::IntegrityViolation(reason) => {
                error!(
                    session_id = %candidate.session_id,
                    ticket = %candidate.ticket,
                    reason = %reason,
                    "Duplicate ticket with different contents; manual intervention required"
                );
                self.quarantined.lock().insert(candidate.session_id);
            }
        }

        if outcome.is_settled() {
            if let Err(e) = self.source.confirm(candidate.session_id).await {
                // The next sweep sees the row and confirms again.
                warn!(session_id = %candidate.session_id, error = %e, "Transfer not confirmed at source");
            }
        }

        self.observer.on_transfer(candidate, &outcome);
        outcome
    }

    /// One pass over up to `batch_size` unconfirmed sessions.
    ///
    /// Stops at the first deferred transfer; the store is assumed down for
    /// the rest of the batch.
    pub async fn sweep(&self) -> Result<SweepReport, ReconciliationError> {
        let skip = self.quarantined.lock().clone();
        let candidates = self.source.pending(self.batch_size + skip.len()).await?;

        let mut report = SweepReport::default();
        for candidate in candidates
            .iter()
            .filter(|c| !skip.contains(&c.session_id))
            .take(self.batch_size)
        {
            let outcome = self.transfer(candidate).await;
            report.record(&outcome);
            if matches!(outcome, TransferOutcome::Deferred(_)) {
                break;
            }
        }

        if report.examined > 0 {
            debug!(
                examined = report.examined,
                confirmed = report.confirmed,
                duplicate = report.duplicate,
                deferred = report.deferred,
                "Sweep finished"
            );
        }
        Ok(report)
    }

    async fn attempt(&self, candidate: &TransferCandidate) -> TransferOutcome {
        match self.check_existing(candidate).await {
            Ok(Some(outcome)) => return outcome,
            Ok(None) => {}
            Err(e) => return TransferOutcome::Deferred(e.to_string()),
        }

        let refs = match self.resolver.resolve(self.store.as_ref(), candidate).await {
            Ok(refs) => refs,
            Err(e) => return TransferOutcome::Deferred(e.to_string()),
        };

        let record = HistoricalRecord::from_candidate(candidate, refs);
        match self.store.insert_record(record).await {
            Ok(id) => TransferOutcome::Confirmed(id),
            Err(StoreError::AlreadyExists(_)) => match self.check_existing(candidate).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => TransferOutcome::Deferred("insert conflict on absent ticket".into()),
                Err(e) => TransferOutcome::Deferred(e.to_string()),
            },
            Err(e) => TransferOutcome::Deferred(e.to_string()),
        }
    }

    /// Outcome decided by an existing row, if any.
    async fn check_existing(
        &self,
        candidate: &TransferCandidate,
    ) -> Result<Option<TransferOutcome>, StoreError> {
        let Some((id, existing)) = self.store.find_by_ticket(candidate.ticket).await? else {
            return Ok(None);
        };
        if existing.matches(candidate) {
            return Ok(Some(TransferOutcome::Duplicate));
        }
        Ok(Some(TransferOutcome::IntegrityViolation(format!(
            "ticket {} recorded as row {id} with net {}, session has net {}",
            candidate.ticket, existing.net, candidate.net
        ))))
    }
}
