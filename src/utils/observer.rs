//! Observer implementations: structured logging and in-memory recording

use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};

use crate::traits::ReconciliationObserver;
use crate::types::*;

/// Emits each decision as a `tracing` event
///
/// Matches log at info, amount mismatches at warn, missing transfers at
/// error. The summary is logged at error when any discrepancy exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconciliationObserver for TracingObserver {
    fn on_match(&self, matched: &MatchedTransaction) {
        info!(
            reference_id = %matched.reference_id,
            amount = %matched.fiat_amount,
            "Match found for reference ID {}",
            matched.reference_id
        );
    }

    fn on_amount_mismatch(&self, discrepancy: &Discrepancy) {
        let usdc = discrepancy
            .usdc_amount
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        warn!(
            reference_id = %discrepancy.reference_id,
            fiat_amount = %discrepancy.fiat_amount,
            usdc_amount = %usdc,
            "Amount mismatch for reference ID {}: fiat {} vs USDC {}",
            discrepancy.reference_id,
            discrepancy.fiat_amount,
            usdc
        );
    }

    fn on_no_match(&self, discrepancy: &Discrepancy) {
        error!(
            reference_id = %discrepancy.reference_id,
            fiat_amount = %discrepancy.fiat_amount,
            "No matching transfer found for reference ID {}",
            discrepancy.reference_id
        );
    }

    fn on_complete(&self, result: &ReconciliationResult) {
        let summary = result.summary();
        if summary.is_clean() {
            info!(
                run_id = %result.run_id,
                matched = summary.matched,
                unclaimed_transfers = summary.unclaimed_transfers,
                "Reconciliation completed successfully with all matches found"
            );
        } else {
            error!(
                run_id = %result.run_id,
                matched = summary.matched,
                discrepancies = summary.discrepancies(),
                unclaimed_transfers = summary.unclaimed_transfers,
                "Reconciliation completed with {} discrepancies found",
                summary.discrepancies()
            );
        }
    }
}

/// Event captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationEvent {
    Matched(MatchedTransaction),
    AmountMismatch(Discrepancy),
    NoMatch(Discrepancy),
    Completed(ReconciliationSummary),
}

/// In-memory observer for testing and development
///
/// Clones share the same event log, so a clone can be handed to the
/// reconciler while the original is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<RwLock<Vec<ReconciliationEvent>>>,
}

impl RecordingObserver {
    /// Create a new recording observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<ReconciliationEvent> {
        self.events
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Clear all recorded events
    pub fn clear(&self) {
        self.events
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn record(&self, event: ReconciliationEvent) {
        self.events
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

impl ReconciliationObserver for RecordingObserver {
    fn on_match(&self, matched: &MatchedTransaction) {
        self.record(ReconciliationEvent::Matched(matched.clone()));
    }

    fn on_amount_mismatch(&self, discrepancy: &Discrepancy) {
        self.record(ReconciliationEvent::AmountMismatch(discrepancy.clone()));
    }

    fn on_no_match(&self, discrepancy: &Discrepancy) {
        self.record(ReconciliationEvent::NoMatch(discrepancy.clone()));
    }

    fn on_complete(&self, result: &ReconciliationResult) {
        self.record(ReconciliationEvent::Completed(result.summary()));
    }
}
