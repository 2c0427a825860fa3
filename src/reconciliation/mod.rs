//! Reconciliation of fiat deposits against stablecoin transfers
//!
//! [`Reconciler`] holds the matching policy, [`TransferPool`] the per-run
//! bookkeeping of consumed transfers and [`ReconciliationService`] the wiring
//! from input feeds.

pub mod engine;
pub mod pool;
pub mod service;

pub use engine::*;
pub use pool::*;
pub use service::*;

use crate::types::{ReconcilerResult, ReconciliationResult, Transaction};

/// Reconcile with a default [`Reconciler`]
pub fn reconcile(
    deposits: &[Transaction],
    transfers: &[Transaction],
) -> ReconcilerResult<ReconciliationResult> {
    Reconciler::new().reconcile(deposits, transfers)
}
