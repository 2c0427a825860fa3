//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which side of the reconciliation a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedKind {
    /// Fiat deposits received on the banking side
    FiatDeposit,
    /// Stablecoin (USDC) transfers received on-chain
    UsdcTransfer,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::FiatDeposit => write!(f, "fiat deposit"),
            FeedKind::UsdcTransfer => write!(f, "USDC transfer"),
        }
    }
}

/// A single record from either feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// External correlation key, not guaranteed unique within a feed
    pub reference_id: String,
    /// Amount, pre-normalized so that both feeds are comparable
    pub amount: BigDecimal,
    /// Currency code (informational only)
    pub currency: String,
    /// When the source system recorded the transaction
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        reference_id: impl Into<String>,
        amount: BigDecimal,
        currency: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            reference_id: reference_id.into(),
            amount,
            currency: currency.into(),
            timestamp,
        }
    }
}

/// Loosely-typed record as it arrives from an external feed.
///
/// Every field is optional so that an absent field can be reported as a
/// structural violation instead of failing deserialization wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub reference_id: Option<String>,
    pub amount: Option<serde_json::Value>,
    pub currency: Option<String>,
    pub timestamp: Option<String>,
}

impl TransactionRecord {
    /// Convert into a typed [`Transaction`], reporting the first missing or
    /// malformed field against its position in the feed
    pub fn into_transaction(self, feed: FeedKind, index: usize) -> ReconcilerResult<Transaction> {
        let missing = |field: &'static str| ReconciliationError::MissingField { feed, index, field };
        let invalid = |reason: String| ReconciliationError::InvalidRecord {
            feed,
            index,
            reason,
        };

        let reference_id = self.reference_id.ok_or_else(|| missing("reference_id"))?;
        let amount = match self.amount.ok_or_else(|| missing("amount"))? {
            serde_json::Value::String(s) => BigDecimal::from_str(s.trim())
                .map_err(|e| invalid(format!("amount '{}' is not a decimal: {}", s, e)))?,
            // arbitrary_precision keeps the source digits in `n`
            serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string())
                .map_err(|e| invalid(format!("amount {} is not a decimal: {}", n, e)))?,
            serde_json::Value::Null => return Err(missing("amount")),
            other => return Err(invalid(format!("amount has non-numeric type: {}", other))),
        };
        let currency = self.currency.ok_or_else(|| missing("currency"))?;
        let raw_timestamp = self.timestamp.ok_or_else(|| missing("timestamp"))?;
        let timestamp = raw_timestamp
            .parse::<NaiveDateTime>()
            .map_err(|e| invalid(format!("timestamp '{}' is invalid: {}", raw_timestamp, e)))?;

        Ok(Transaction {
            reference_id,
            amount,
            currency,
            timestamp,
        })
    }
}

/// Status of a matched pair. Only clean matches are ever reported as matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    Matched,
}

/// A deposit paired with a transfer of equal amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTransaction {
    pub reference_id: String,
    pub fiat_amount: BigDecimal,
    pub usdc_amount: BigDecimal,
    pub status: MatchStatus,
    /// When the reconciliation decision was made (not the transaction time)
    pub match_time: NaiveDateTime,
}

/// Why a deposit could not be cleanly matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscrepancyIssue {
    /// A transfer with the same reference ID exists but its amount differs
    AmountMismatch,
    /// No available transfer carries the deposit's reference ID
    NoMatchingTransfer,
}

impl fmt::Display for DiscrepancyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyIssue::AmountMismatch => write!(f, "Amount mismatch"),
            DiscrepancyIssue::NoMatchingTransfer => write!(f, "No matching transfer found"),
        }
    }
}

/// A deposit outcome other than a clean one-to-one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub reference_id: String,
    pub issue: DiscrepancyIssue,
    pub fiat_amount: BigDecimal,
    /// Absent when no transfer was found
    pub usdc_amount: Option<BigDecimal>,
    /// When the discrepancy was recorded
    pub timestamp: NaiveDateTime,
}

impl Discrepancy {
    /// Fiat minus USDC amount, for amount mismatches only
    pub fn difference(&self) -> Option<BigDecimal> {
        self.usdc_amount
            .as_ref()
            .map(|usdc| &self.fiat_amount - usdc)
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Identifier correlating the log events of this run
    pub run_id: Uuid,
    /// Clean matches, in deposit order
    pub matched: Vec<MatchedTransaction>,
    /// Mismatches and missing counterparts, in deposit order
    pub discrepancies: Vec<Discrepancy>,
    /// Transfers no deposit claimed, in original transfer order
    pub unclaimed_transfers: Vec<Transaction>,
}

impl ReconciliationResult {
    /// Create an empty result for the given run
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            matched: Vec::new(),
            discrepancies: Vec::new(),
            unclaimed_transfers: Vec::new(),
        }
    }

    /// Number of deposits this result accounts for
    pub fn deposit_count(&self) -> usize {
        self.matched.len() + self.discrepancies.len()
    }

    /// Discrepancies with the given issue
    pub fn discrepancies_with(&self, issue: DiscrepancyIssue) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies.iter().filter(move |d| d.issue == issue)
    }

    /// Summarize counts for reporting
    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary {
            deposits: self.deposit_count(),
            matched: self.matched.len(),
            amount_mismatches: self
                .discrepancies_with(DiscrepancyIssue::AmountMismatch)
                .count(),
            no_matching_transfer: self
                .discrepancies_with(DiscrepancyIssue::NoMatchingTransfer)
                .count(),
            unclaimed_transfers: self.unclaimed_transfers.len(),
        }
    }
}

/// Counts describing a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub deposits: usize,
    pub matched: usize,
    pub amount_mismatches: usize,
    pub no_matching_transfer: usize,
    pub unclaimed_transfers: usize,
}

impl ReconciliationSummary {
    /// Total number of discrepancies
    pub fn discrepancies(&self) -> usize {
        self.amount_mismatches + self.no_matching_transfer
    }

    /// Whether every deposit found an equal-amount transfer
    pub fn is_clean(&self) -> bool {
        self.discrepancies() == 0
    }
}

/// Structural failures that abort a reconciliation run.
///
/// Business-level outcomes (mismatches, missing counterparts) are never
/// reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("{feed} #{index} is missing required field '{field}'")]
    MissingField {
        feed: FeedKind,
        index: usize,
        field: &'static str,
    },
    #[error("{feed} #{index} is invalid: {reason}")]
    InvalidRecord {
        feed: FeedKind,
        index: usize,
        reason: String,
    },
    #[error("Feed error: {0}")]
    Feed(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for reconciliation operations
pub type ReconcilerResult<T> = Result<T, ReconciliationError>;
