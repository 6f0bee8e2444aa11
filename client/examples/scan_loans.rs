//! Example: Loan risk snapshot
//!
//! Scans every borrower of a money market and prints the loans closest to
//! liquidation. Contract addresses can be overridden through the environment:
//! `LCD_URL`, `OVERSEER_CONTRACT`, `MARKET_CONTRACT` and `ORACLE_CONTRACT`.

use anyhow::Context;
use overseer_client::{LoanScanner, Overseer, ScanConfig};
use std::env;
use std::sync::Arc;

const OVERSEER_CONTRACT: &str = "terra1tmnqgvg567ypvsvk6rwsga3srp7e3lg6u0elp8";
const MARKET_CONTRACT: &str = "terra1sepfj7s0aeg5967uxnfk4thzlerrsktkpelm5s";
const ORACLE_CONTRACT: &str = "terra1cgg6yef7qcdm070qftghfulaxmllgmvk77nc7t";

/// Loans at or above this ratio are listed
const RISK_THRESHOLD: f64 = 0.9;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("overseer_client=info")
        .init();

    println!("=== Overseer Loan Scanner Example ===\n");

    let config = match env::var("LCD_URL") {
        Ok(url) => ScanConfig::custom(url).context("invalid LCD_URL")?,
        Err(_) => ScanConfig::mainnet(),
    };
    println!("Network: {:?}", config.network);
    println!("LCD URL: {}\n", config.lcd_url);

    let scanner = LoanScanner::new(Arc::new(config))?;

    println!("Performing health check...");
    scanner
        .health_check()
        .await
        .context("LCD endpoint is not reachable")?;
    println!("✓ Health check passed\n");

    let overseer = Overseer::new(
        env::var("OVERSEER_CONTRACT").unwrap_or_else(|_| OVERSEER_CONTRACT.to_string()),
        env::var("MARKET_CONTRACT").unwrap_or_else(|_| MARKET_CONTRACT.to_string()),
    )
    .with_oracle(env::var("ORACLE_CONTRACT").unwrap_or_else(|_| ORACLE_CONTRACT.to_string()));

    println!("Scanning loans (this takes a while with default throttling)...");
    let snapshot = scanner.scan(&overseer).await.context("scan failed")?;
    println!(
        "✓ {} borrowers with collateral at {}\n",
        snapshot.loans.len(),
        snapshot.taken_at
    );

    let mut at_risk: Vec<_> = snapshot.at_risk(RISK_THRESHOLD).collect();
    at_risk.sort_by(|a, b| {
        b.risk_ratio
            .value()
            .unwrap_or(f64::INFINITY)
            .total_cmp(&a.risk_ratio.value().unwrap_or(f64::INFINITY))
    });

    println!("Loans at or above {}:", RISK_THRESHOLD);
    for loan in &at_risk {
        println!(
            "  - {} loan={} limit={} ratio={}",
            loan.borrower, loan.loan_amount, loan.borrow_limit, loan.risk_ratio
        );
    }
    if at_risk.is_empty() {
        println!("  (none)");
    }

    println!("\n=== Example completed ===");
    Ok(())
}
