//! # Reconciliation Core
//!
//! Matches fiat deposits against stablecoin (USDC) transfers by their shared
//! reference ID and reports the outcome as matched pairs and discrepancies.
//!
//! ## Features
//!
//! - **Deterministic matching**: first available transfer per reference ID wins, in feed order
//! - **Exact amounts**: `BigDecimal` comparison, with an optional explicit tolerance
//! - **Discrepancy reporting**: amount mismatches, missing transfers and unclaimed transfers
//! - **Injected collaborators**: clock, observer (logging) and validator are pluggable
//! - **Feed abstraction**: in-memory and JSON feeds behind an async trait
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{reconcile, Transaction};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let at = NaiveDate::from_ymd_opt(2024, 11, 1)
//!     .unwrap()
//!     .and_hms_opt(10, 30, 0)
//!     .unwrap();
//! let deposits = vec![Transaction::new("9876", BigDecimal::from(1000), "USD", at)];
//! let transfers = vec![Transaction::new("9876", BigDecimal::from(1000), "USDC", at)];
//!
//! let result = reconcile(&deposits, &transfers).unwrap();
//! assert_eq!(result.matched.len(), 1);
//! assert!(result.discrepancies.is_empty());
//! ```

pub mod config;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
