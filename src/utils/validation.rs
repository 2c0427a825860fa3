//! Validation utilities

use crate::config::DEFAULT_MAX_REFERENCE_ID_LEN;
use crate::traits::*;
use crate::types::*;

/// Validate that a reference ID is present, bounded and printable
pub fn validate_reference_id(
    feed: FeedKind,
    index: usize,
    reference_id: &str,
    max_len: usize,
) -> ReconcilerResult<()> {
    if reference_id.trim().is_empty() {
        return Err(ReconciliationError::MissingField {
            feed,
            index,
            field: "reference_id",
        });
    }

    if reference_id.chars().count() > max_len {
        return Err(ReconciliationError::InvalidRecord {
            feed,
            index,
            reason: format!("reference ID cannot exceed {} characters", max_len),
        });
    }

    if reference_id.trim() != reference_id {
        return Err(ReconciliationError::InvalidRecord {
            feed,
            index,
            reason: format!("reference ID '{}' has surrounding whitespace", reference_id),
        });
    }

    if reference_id.chars().any(char::is_control) {
        return Err(ReconciliationError::InvalidRecord {
            feed,
            index,
            reason: "reference ID contains control characters".to_string(),
        });
    }

    Ok(())
}

/// Validate that a currency code looks like a code (e.g. `USD`, `USDC`)
pub fn validate_currency(feed: FeedKind, index: usize, currency: &str) -> ReconcilerResult<()> {
    if currency.trim().is_empty() {
        return Err(ReconciliationError::MissingField {
            feed,
            index,
            field: "currency",
        });
    }

    if !(3..=10).contains(&currency.len())
        || !currency.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ReconciliationError::InvalidRecord {
            feed,
            index,
            reason: format!("currency '{}' is not a currency code", currency),
        });
    }

    Ok(())
}

/// Enhanced transaction validator with detailed checks
pub struct EnhancedTransactionValidator {
    max_reference_id_len: usize,
}

impl EnhancedTransactionValidator {
    pub fn new(max_reference_id_len: usize) -> Self {
        Self {
            max_reference_id_len,
        }
    }
}

impl Default for EnhancedTransactionValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REFERENCE_ID_LEN)
    }
}

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(
        &self,
        feed: FeedKind,
        index: usize,
        transaction: &Transaction,
    ) -> ReconcilerResult<()> {
        validate_reference_id(
            feed,
            index,
            &transaction.reference_id,
            self.max_reference_id_len,
        )?;
        validate_currency(feed, index, &transaction.currency)?;

        Ok(())
    }
}
