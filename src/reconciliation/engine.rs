//! Matching of fiat deposits against USDC transfers

use uuid::Uuid;

use crate::config::ReconcilerConfig;
use crate::reconciliation::pool::TransferPool;
use crate::traits::*;
use crate::types::*;
use crate::utils::{SystemClock, TracingObserver};

/// Matches each fiat deposit against the first available USDC transfer that
/// shares its reference ID.
///
/// For every deposit, in input order:
///
/// - no available transfer with the same reference ID yields a
///   [`DiscrepancyIssue::NoMatchingTransfer`] and consumes nothing;
/// - the first such transfer is claimed, and yields a [`MatchedTransaction`]
///   when the amounts are equal or a [`DiscrepancyIssue::AmountMismatch`]
///   otherwise. A mismatched transfer stays consumed and is not offered to
///   later deposits, even if a later same-reference transfer would match.
///
/// Every deposit produces exactly one outcome.
pub struct Reconciler {
    config: ReconcilerConfig,
    clock: Box<dyn Clock>,
    observer: Box<dyn ReconciliationObserver>,
    validator: Box<dyn TransactionValidator>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Create a reconciler with exact amount comparison, the system clock and
    /// `tracing` output
    pub fn new() -> Self {
        Self {
            config: ReconcilerConfig::default(),
            clock: Box::new(SystemClock),
            observer: Box::new(TracingObserver),
            validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Replace the configuration, rejecting invalid settings
    pub fn with_config(mut self, config: ReconcilerConfig) -> ReconcilerResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_observer(mut self, observer: impl ReconciliationObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_validator(mut self, validator: Box<dyn TransactionValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile `deposits` against `transfers`
    ///
    /// Both feeds are validated up front, against the configured reference ID
    /// limit and then the validator; a structural violation aborts the run
    /// with an error and no partial result. Neither slice is modified.
    pub fn reconcile(
        &self,
        deposits: &[Transaction],
        transfers: &[Transaction],
    ) -> ReconcilerResult<ReconciliationResult> {
        self.check_reference_lengths(FeedKind::FiatDeposit, deposits)?;
        self.check_reference_lengths(FeedKind::UsdcTransfer, transfers)?;
        self.validator
            .validate_feed(FeedKind::FiatDeposit, deposits)?;
        self.validator
            .validate_feed(FeedKind::UsdcTransfer, transfers)?;

        let mut pool = TransferPool::new(transfers);
        let mut result = ReconciliationResult::new(Uuid::new_v4());

        for deposit in deposits {
            match pool.claim_first(&deposit.reference_id) {
                Some(transfer)
                    if self.config.amounts_match(&deposit.amount, &transfer.amount) =>
                {
                    let matched = MatchedTransaction {
                        reference_id: deposit.reference_id.clone(),
                        fiat_amount: deposit.amount.clone(),
                        usdc_amount: transfer.amount.clone(),
                        status: MatchStatus::Matched,
                        match_time: self.clock.now(),
                    };
                    self.observer.on_match(&matched);
                    result.matched.push(matched);
                }
                Some(transfer) => {
                    let discrepancy = Discrepancy {
                        reference_id: deposit.reference_id.clone(),
                        issue: DiscrepancyIssue::AmountMismatch,
                        fiat_amount: deposit.amount.clone(),
                        usdc_amount: Some(transfer.amount.clone()),
                        timestamp: self.clock.now(),
                    };
                    self.observer.on_amount_mismatch(&discrepancy);
                    result.discrepancies.push(discrepancy);
                }
                None => {
                    let discrepancy = Discrepancy {
                        reference_id: deposit.reference_id.clone(),
                        issue: DiscrepancyIssue::NoMatchingTransfer,
                        fiat_amount: deposit.amount.clone(),
                        usdc_amount: None,
                        timestamp: self.clock.now(),
                    };
                    self.observer.on_no_match(&discrepancy);
                    result.discrepancies.push(discrepancy);
                }
            }
        }

        result.unclaimed_transfers = pool.into_unclaimed();
        self.observer.on_complete(&result);

        Ok(result)
    }

    fn check_reference_lengths(
        &self,
        feed: FeedKind,
        transactions: &[Transaction],
    ) -> ReconcilerResult<()> {
        let max_len = self.config.max_reference_id_len;
        match transactions
            .iter()
            .position(|txn| txn.reference_id.chars().count() > max_len)
        {
            Some(index) => Err(ReconciliationError::InvalidRecord {
                feed,
                index,
                reason: format!("reference ID cannot exceed {} characters", max_len),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_REFERENCE_ID_LEN;
    use crate::utils::{FixedClock, ReconciliationEvent, RecordingObserver};
    use bigdecimal::BigDecimal;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::str::FromStr;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn deposit(reference_id: &str, amount: &str) -> Transaction {
        Transaction::new(reference_id, dec(amount), "USD", at(10, 30))
    }

    fn transfer(reference_id: &str, amount: &str) -> Transaction {
        Transaction::new(reference_id, dec(amount), "USDC", at(10, 45))
    }

    fn reconciler() -> Reconciler {
        Reconciler::new().with_clock(FixedClock(at(18, 0)))
    }

    #[test]
    fn test_exact_match() {
        let result = reconciler()
            .reconcile(&[deposit("9876", "1000.00")], &[transfer("9876", "1000.00")])
            .unwrap();

        assert!(result.discrepancies.is_empty());
        assert_eq!(
            result.matched,
            vec![MatchedTransaction {
                reference_id: "9876".to_string(),
                fiat_amount: dec("1000.00"),
                usdc_amount: dec("1000.00"),
                status: MatchStatus::Matched,
                match_time: at(18, 0),
            }]
        );
        assert!(result.unclaimed_transfers.is_empty());
    }

    #[test]
    fn test_amount_mismatch() {
        let result = reconciler()
            .reconcile(&[deposit("A1", "100.00")], &[transfer("A1", "99.00")])
            .unwrap();

        assert!(result.matched.is_empty());
        assert_eq!(
            result.discrepancies,
            vec![Discrepancy {
                reference_id: "A1".to_string(),
                issue: DiscrepancyIssue::AmountMismatch,
                fiat_amount: dec("100.00"),
                usdc_amount: Some(dec("99.00")),
                timestamp: at(18, 0),
            }]
        );
        // consumed even though mismatched
        assert!(result.unclaimed_transfers.is_empty());
    }

    #[test]
    fn test_no_counterpart() {
        let result = reconciler()
            .reconcile(&[deposit("B2", "50.00")], &[transfer("Z9", "50.00")])
            .unwrap();

        assert_eq!(result.discrepancies.len(), 1);
        let discrepancy = &result.discrepancies[0];
        assert_eq!(discrepancy.issue, DiscrepancyIssue::NoMatchingTransfer);
        assert_eq!(discrepancy.fiat_amount, dec("50.00"));
        assert_eq!(discrepancy.usdc_amount, None);
        assert_eq!(result.unclaimed_transfers, vec![transfer("Z9", "50.00")]);
    }

    #[test]
    fn test_duplicate_reference_ids_use_distinct_transfers() {
        let deposits = vec![deposit("C3", "10"), deposit("C3", "10")];
        let transfers = vec![transfer("C3", "10"), transfer("C3", "10")];

        let result = reconciler().reconcile(&deposits, &transfers).unwrap();

        assert_eq!(result.matched.len(), 2);
        assert!(result.discrepancies.is_empty());
        assert!(result.unclaimed_transfers.is_empty());
    }

    #[test]
    fn test_third_duplicate_deposit_finds_nothing() {
        let deposits = vec![deposit("C3", "10"), deposit("C3", "10"), deposit("C3", "10")];
        let transfers = vec![transfer("C3", "10"), transfer("C3", "10")];

        let result = reconciler().reconcile(&deposits, &transfers).unwrap();

        assert_eq!(result.matched.len(), 2);
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(
            result.discrepancies[0].issue,
            DiscrepancyIssue::NoMatchingTransfer
        );
    }

    #[test]
    fn test_tie_break_takes_first_in_pool_order() {
        let transfers = vec![transfer("D4", "90.00"), transfer("D4", "100.00")];

        let result = reconciler()
            .reconcile(&[deposit("D4", "100.00")], &transfers)
            .unwrap();

        // first candidate wins even though the second has the exact amount
        assert!(result.matched.is_empty());
        assert_eq!(result.discrepancies[0].issue, DiscrepancyIssue::AmountMismatch);
        assert_eq!(result.discrepancies[0].usdc_amount, Some(dec("90.00")));
        assert_eq!(result.unclaimed_transfers, vec![transfer("D4", "100.00")]);
    }

    #[test]
    fn test_loser_remains_for_next_deposit() {
        let deposits = vec![deposit("D4", "100.00"), deposit("D4", "100.00")];
        let transfers = vec![transfer("D4", "90.00"), transfer("D4", "100.00")];

        let result = reconciler().reconcile(&deposits, &transfers).unwrap();

        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].usdc_amount, dec("100.00"));
    }

    #[test]
    fn test_empty_deposits() {
        let result = reconciler()
            .reconcile(&[], &[transfer("1", "1"), transfer("2", "2")])
            .unwrap();

        assert!(result.matched.is_empty());
        assert!(result.discrepancies.is_empty());
        assert_eq!(result.unclaimed_transfers.len(), 2);
    }

    #[test]
    fn test_scale_does_not_affect_equality() {
        let result = reconciler()
            .reconcile(&[deposit("9876", "1000")], &[transfer("9876", "1000.000")])
            .unwrap();
        assert_eq!(result.matched.len(), 1);
    }

    #[test]
    fn test_coverage_and_consumption() {
        let deposits = vec![
            deposit("1", "10"),
            deposit("2", "20"),
            deposit("2", "20"),
            deposit("3", "30"),
            deposit("4", "40"),
            deposit("1", "10"),
        ];
        let transfers = vec![
            transfer("2", "21"),
            transfer("1", "10"),
            transfer("2", "20"),
            transfer("5", "50"),
            transfer("3", "30"),
        ];

        let result = reconciler().reconcile(&deposits, &transfers).unwrap();
        let summary = result.summary();

        assert_eq!(result.deposit_count(), deposits.len());
        assert_eq!(
            summary.matched + summary.amount_mismatches + summary.unclaimed_transfers,
            transfers.len()
        );
        assert_eq!(summary.matched, 3);
        assert_eq!(summary.amount_mismatches, 1);
        assert_eq!(summary.no_matching_transfer, 2);
        assert_eq!(result.unclaimed_transfers, vec![transfer("5", "50")]);
    }

    #[test]
    fn test_outcomes_follow_deposit_order() {
        let deposits = vec![deposit("B", "1"), deposit("A", "1"), deposit("C", "1")];
        let transfers = vec![transfer("C", "1"), transfer("A", "1"), transfer("B", "1")];

        let result = reconciler().reconcile(&deposits, &transfers).unwrap();
        let ids: Vec<&str> = result
            .matched
            .iter()
            .map(|m| m.reference_id.as_str())
            .collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_inputs_are_untouched() {
        let deposits = vec![deposit("9876", "1000"), deposit("12346", "500")];
        let transfers = vec![transfer("9876", "1000"), transfer("12346", "500")];
        let deposits_before = deposits.clone();
        let transfers_before = transfers.clone();

        reconciler().reconcile(&deposits, &transfers).unwrap();

        assert_eq!(deposits, deposits_before);
        assert_eq!(transfers, transfers_before);
    }

    #[test]
    fn test_runs_are_independent() {
        let reconciler = reconciler();
        let deposits = vec![deposit("9876", "1000")];
        let transfers = vec![transfer("9876", "1000")];

        let first = reconciler.reconcile(&deposits, &transfers).unwrap();
        let second = reconciler.reconcile(&deposits, &transfers).unwrap();

        assert_eq!(first.matched, second.matched);
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_observer_events() {
        let observer = RecordingObserver::new();
        let reconciler = reconciler().with_observer(observer.clone());

        let deposits = vec![deposit("1", "10"), deposit("2", "20"), deposit("3", "30")];
        let transfers = vec![transfer("1", "10"), transfer("2", "25")];
        reconciler.reconcile(&deposits, &transfers).unwrap();

        let events = observer.events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], ReconciliationEvent::Matched(_)));
        assert!(matches!(events[1], ReconciliationEvent::AmountMismatch(_)));
        assert!(matches!(events[2], ReconciliationEvent::NoMatch(_)));
        match &events[3] {
            ReconciliationEvent::Completed(summary) => {
                assert_eq!(summary.discrepancies(), 2);
                assert!(!summary.is_clean());
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn test_structural_violation_aborts_run() {
        let observer = RecordingObserver::new();
        let reconciler = reconciler().with_observer(observer.clone());

        let deposits = vec![deposit("1", "10")];
        let transfers = vec![transfer("1", "10"), transfer("", "5")];

        match reconciler.reconcile(&deposits, &transfers) {
            Err(ReconciliationError::MissingField { feed, index, field }) => {
                assert_eq!(feed, FeedKind::UsdcTransfer);
                assert_eq!(index, 1);
                assert_eq!(field, "reference_id");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_tolerant_comparison() {
        let config = ReconcilerConfig::default().with_amount_tolerance(dec("0.01"));
        let reconciler = reconciler().with_config(config).unwrap();

        let result = reconciler
            .reconcile(
                &[deposit("A", "100.00"), deposit("B", "100.00")],
                &[transfer("A", "99.99"), transfer("B", "99.98")],
            )
            .unwrap();

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].usdc_amount, dec("99.99"));
        assert_eq!(result.discrepancies[0].reference_id, "B");
    }

    #[test]
    fn test_over_long_reference_id_rejected() {
        let config = ReconcilerConfig {
            max_reference_id_len: 4,
            ..ReconcilerConfig::default()
        };
        let observer = RecordingObserver::new();
        let reconciler = reconciler()
            .with_config(config)
            .unwrap()
            .with_observer(observer.clone());

        let long_id = "x".repeat(80);
        match reconciler.reconcile(&[deposit("9876", "1")], &[transfer(&long_id, "1")]) {
            Err(ReconciliationError::InvalidRecord { feed, index, .. }) => {
                assert_eq!(feed, FeedKind::UsdcTransfer);
                assert_eq!(index, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(observer.events().is_empty());

        assert!(reconciler
            .reconcile(&[deposit("9876", "1")], &[transfer("9876", "1")])
            .is_ok());
    }

    #[test]
    fn test_default_reference_id_limit_applies() {
        let long_id = "7".repeat(DEFAULT_MAX_REFERENCE_ID_LEN + 1);
        assert!(matches!(
            reconciler().reconcile(&[deposit(&long_id, "1")], &[]),
            Err(ReconciliationError::InvalidRecord {
                feed: FeedKind::FiatDeposit,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReconcilerConfig::default().with_amount_tolerance(dec("-0.01"));
        assert!(Reconciler::new().with_config(config).is_err());
    }
}
