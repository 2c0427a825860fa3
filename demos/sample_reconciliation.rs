//! Sample reconciliation of fiat deposits against USDC transfers

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use reconciliation_core::utils::MemoryFeed;
use reconciliation_core::{Reconciler, ReconcilerConfig, ReconciliationService, Transaction};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let day = NaiveDate::from_ymd_opt(2024, 11, 1).ok_or("invalid sample date")?;
    let at = |hour: u32, minute: u32| day.and_hms_opt(hour, minute, 0).ok_or("invalid sample time");

    let fiat_deposits = vec![
        Transaction::new("9876", BigDecimal::from_str("1000.00")?, "USD", at(10, 30)?),
        Transaction::new("12346", BigDecimal::from_str("500.00")?, "USD", at(11, 15)?),
    ];
    let usdc_transfers = vec![
        Transaction::new("9876", BigDecimal::from_str("1000.00")?, "USDC", at(10, 45)?),
        Transaction::new("12346", BigDecimal::from_str("500.00")?, "USDC", at(11, 30)?),
    ];

    let reconciler = Reconciler::new().with_config(ReconcilerConfig::from_env()?)?;
    let service = ReconciliationService::with_reconciler(
        MemoryFeed::new("fiat-deposits", fiat_deposits),
        MemoryFeed::new("usdc-transfers", usdc_transfers),
        reconciler,
    );

    let result = service.run().await?;

    println!("Matched Transactions:");
    for matched in &result.matched {
        println!(
            "  {} fiat {} / USDC {} ({:?} at {})",
            matched.reference_id,
            matched.fiat_amount,
            matched.usdc_amount,
            matched.status,
            matched.match_time
        );
    }

    println!("\nDiscrepancies:");
    for discrepancy in &result.discrepancies {
        let usdc = discrepancy
            .usdc_amount
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {}: fiat {} / USDC {} (at {})",
            discrepancy.reference_id,
            discrepancy.issue,
            discrepancy.fiat_amount,
            usdc,
            discrepancy.timestamp
        );
    }

    if !result.unclaimed_transfers.is_empty() {
        println!("\nUnclaimed Transfers:");
        for transfer in &result.unclaimed_transfers {
            println!("  {} {} {}", transfer.reference_id, transfer.amount, transfer.currency);
        }
    }

    Ok(())
}
