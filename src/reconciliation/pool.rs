//! Pool of transfers still available to be claimed by deposits

use std::collections::{HashMap, VecDeque};

use crate::types::Transaction;

/// Per-run bookkeeping of which transfers are still unclaimed
///
/// Borrows the caller's transfers and never mutates them. Candidates for each
/// reference ID are kept in feed order, so claiming always yields the first
/// available transfer for that reference.
#[derive(Debug)]
pub struct TransferPool<'a> {
    transfers: &'a [Transaction],
    by_reference: HashMap<&'a str, VecDeque<usize>>,
    claimed: Vec<bool>,
}

impl<'a> TransferPool<'a> {
    /// Index the given transfers; all start out available
    pub fn new(transfers: &'a [Transaction]) -> Self {
        let mut by_reference: HashMap<&'a str, VecDeque<usize>> = HashMap::new();
        for (position, transfer) in transfers.iter().enumerate() {
            by_reference
                .entry(transfer.reference_id.as_str())
                .or_default()
                .push_back(position);
        }

        Self {
            transfers,
            by_reference,
            claimed: vec![false; transfers.len()],
        }
    }

    /// Claim the first available transfer carrying `reference_id`
    ///
    /// A claimed transfer is never returned again.
    pub fn claim_first(&mut self, reference_id: &str) -> Option<&'a Transaction> {
        let candidates = self.by_reference.get_mut(reference_id)?;
        let position = candidates.pop_front()?;
        if candidates.is_empty() {
            self.by_reference.remove(reference_id);
        }

        self.claimed[position] = true;
        let transfers = self.transfers;
        Some(&transfers[position])
    }

    /// Unclaimed transfers in original feed order
    pub fn into_unclaimed(self) -> Vec<Transaction> {
        self.transfers
            .iter()
            .zip(self.claimed)
            .filter(|(_, claimed)| !claimed)
            .map(|(transfer, _)| transfer.clone())
            .collect()
    }
}
