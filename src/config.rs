//! Reconciler configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::types::*;

/// Default upper bound on reference ID length, in characters
pub const DEFAULT_MAX_REFERENCE_ID_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Largest absolute difference still treated as equal. Zero means exact.
    pub amount_tolerance: BigDecimal,
    pub max_reference_id_len: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: BigDecimal::from(0),
            max_reference_id_len: DEFAULT_MAX_REFERENCE_ID_LEN,
        }
    }
}

impl ReconcilerConfig {
    /// Load from `RECON_AMOUNT_TOLERANCE` and `RECON_MAX_REFERENCE_ID_LEN`,
    /// falling back to defaults for unset variables
    pub fn from_env() -> ReconcilerResult<Self> {
        let defaults = Self::default();

        let amount_tolerance = match env::var("RECON_AMOUNT_TOLERANCE") {
            Ok(raw) => BigDecimal::from_str(raw.trim()).map_err(|e| {
                ReconciliationError::Config(format!(
                    "RECON_AMOUNT_TOLERANCE '{}' is not a decimal: {}",
                    raw, e
                ))
            })?,
            Err(_) => defaults.amount_tolerance,
        };

        let max_reference_id_len = match env::var("RECON_MAX_REFERENCE_ID_LEN") {
            Ok(raw) => raw.trim().parse().map_err(|e| {
                ReconciliationError::Config(format!(
                    "RECON_MAX_REFERENCE_ID_LEN '{}' is not a length: {}",
                    raw, e
                ))
            })?,
            Err(_) => defaults.max_reference_id_len,
        };

        let config = Self {
            amount_tolerance,
            max_reference_id_len,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the amount tolerance
    pub fn with_amount_tolerance(mut self, tolerance: BigDecimal) -> Self {
        self.amount_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> ReconcilerResult<()> {
        if self.amount_tolerance < BigDecimal::from(0) {
            return Err(ReconciliationError::Config(format!(
                "amount tolerance must not be negative, got {}",
                self.amount_tolerance
            )));
        }

        if self.max_reference_id_len == 0 {
            return Err(ReconciliationError::Config(
                "max reference ID length must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether two amounts are equal under this configuration
    pub fn amounts_match(&self, fiat: &BigDecimal, usdc: &BigDecimal) -> bool {
        if self.amount_tolerance == BigDecimal::from(0) {
            fiat == usdc
        } else {
            (fiat - usdc).abs() <= self.amount_tolerance
        }
    }
}
