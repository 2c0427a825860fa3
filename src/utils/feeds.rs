//! Transaction feed implementations

use async_trait::async_trait;

use crate::traits::TransactionFeed;
use crate::types::*;

/// In-memory feed for fixtures, tests and demos
#[derive(Debug, Clone)]
pub struct MemoryFeed {
    name: String,
    transactions: Vec<Transaction>,
}

impl MemoryFeed {
    /// Create a new memory feed
    pub fn new(name: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            name: name.into(),
            transactions,
        }
    }
}

#[async_trait]
impl TransactionFeed for MemoryFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> ReconcilerResult<Vec<Transaction>> {
        Ok(self.transactions.clone())
    }
}

/// Feed backed by a JSON array of records
///
/// Each element is an object with `reference_id`, `amount` (string or
/// number), `currency` and `timestamp` (`YYYY-MM-DDTHH:MM:SS`).
#[derive(Debug, Clone)]
pub struct JsonFeed {
    name: String,
    kind: FeedKind,
    payload: String,
}

impl JsonFeed {
    pub fn new(name: impl Into<String>, kind: FeedKind, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            payload: payload.into(),
        }
    }

    /// Parse the payload into typed transactions
    pub fn parse(&self) -> ReconcilerResult<Vec<Transaction>> {
        parse_json_records(self.kind, &self.payload)
    }
}

#[async_trait]
impl TransactionFeed for JsonFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> ReconcilerResult<Vec<Transaction>> {
        self.parse()
    }
}

/// Parse a JSON array of records, failing on the first structural violation
pub fn parse_json_records(kind: FeedKind, payload: &str) -> ReconcilerResult<Vec<Transaction>> {
    let records: Vec<TransactionRecord> = serde_json::from_str(payload)
        .map_err(|e| ReconciliationError::Feed(format!("malformed {} payload: {}", kind, e)))?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_transaction(kind, index))
        .collect()
}
