//! Service that pulls both feeds and reconciles them

use tracing::{debug, info};

use crate::reconciliation::Reconciler;
use crate::traits::*;
use crate::types::*;

/// Reconciliation service that wires a deposit feed and a transfer feed into
/// a [`Reconciler`]
pub struct ReconciliationService<D: TransactionFeed, U: TransactionFeed> {
    deposits: D,
    transfers: U,
    reconciler: Reconciler,
}

impl<D: TransactionFeed, U: TransactionFeed> ReconciliationService<D, U> {
    /// Create a new service with a default reconciler
    pub fn new(deposits: D, transfers: U) -> Self {
        Self::with_reconciler(deposits, transfers, Reconciler::new())
    }

    /// Create a new service with a custom reconciler
    pub fn with_reconciler(deposits: D, transfers: U, reconciler: Reconciler) -> Self {
        Self {
            deposits,
            transfers,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Fetch both feeds and reconcile them
    pub async fn run(&self) -> ReconcilerResult<ReconciliationResult> {
        let deposits = self
            .deposits
            .fetch()
            .await
            .map_err(|e| with_feed_name(self.deposits.name(), e))?;
        debug!(feed = self.deposits.name(), records = deposits.len(), "Fetched deposits");

        let transfers = self
            .transfers
            .fetch()
            .await
            .map_err(|e| with_feed_name(self.transfers.name(), e))?;
        debug!(feed = self.transfers.name(), records = transfers.len(), "Fetched transfers");

        info!(
            deposits = deposits.len(),
            transfers = transfers.len(),
            "Starting reconciliation"
        );
        self.reconciler.reconcile(&deposits, &transfers)
    }
}

// Record-level errors already carry their feed and position.
fn with_feed_name(name: &str, error: ReconciliationError) -> ReconciliationError {
    match error {
        ReconciliationError::Feed(message) => {
            ReconciliationError::Feed(format!("{}: {}", name, message))
        }
        other => other,
    }
}
