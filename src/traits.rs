//! Traits for the seams around the reconciler: time, logging, validation and input feeds

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::types::*;

/// Source of decision timestamps
///
/// Matched transactions and discrepancies are stamped with the time the
/// decision was made. Injecting the clock keeps results reproducible in tests.
pub trait Clock: Send + Sync {
    /// Current point in time
    fn now(&self) -> NaiveDateTime;
}

/// Receiver of decision events raised while reconciling
///
/// The reconciler never logs through process-wide state; it reports to the
/// observer it was built with.
pub trait ReconciliationObserver: Send + Sync {
    /// A deposit found a transfer with an equal amount
    fn on_match(&self, matched: &MatchedTransaction);

    /// A deposit found a same-reference transfer with a different amount
    fn on_amount_mismatch(&self, discrepancy: &Discrepancy);

    /// No available transfer carries the deposit's reference ID
    fn on_no_match(&self, discrepancy: &Discrepancy);

    /// The run finished
    fn on_complete(&self, result: &ReconciliationResult);
}

/// Trait for implementing custom structural validation of input records
pub trait TransactionValidator: Send + Sync {
    /// Validate a single record at `index` in `feed`
    fn validate_transaction(
        &self,
        feed: FeedKind,
        index: usize,
        transaction: &Transaction,
    ) -> ReconcilerResult<()>;

    /// Validate a whole feed, stopping at the first violation
    fn validate_feed(&self, feed: FeedKind, transactions: &[Transaction]) -> ReconcilerResult<()> {
        transactions
            .iter()
            .enumerate()
            .try_for_each(|(index, txn)| self.validate_transaction(feed, index, txn))
    }
}

/// Default validator: required string fields must not be blank
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(
        &self,
        feed: FeedKind,
        index: usize,
        transaction: &Transaction,
    ) -> ReconcilerResult<()> {
        if transaction.reference_id.trim().is_empty() {
            return Err(ReconciliationError::MissingField {
                feed,
                index,
                field: "reference_id",
            });
        }

        if transaction.currency.trim().is_empty() {
            return Err(ReconciliationError::MissingField {
                feed,
                index,
                field: "currency",
            });
        }

        Ok(())
    }
}

/// Source of transactions for one side of a reconciliation
///
/// This trait allows the service to reconcile records from any origin
/// (files, message queues, HTTP APIs, in-memory fixtures, etc.).
#[async_trait]
pub trait TransactionFeed: Send + Sync {
    /// Human-readable name used in logs and errors
    fn name(&self) -> &str;

    /// Fetch the feed's records in source order
    async fn fetch(&self) -> ReconcilerResult<Vec<Transaction>>;
}
