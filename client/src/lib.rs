//! Overseer Loan Risk Scanner
//!
//! This library reconstructs the loan book of a lending protocol's collateral overseer
//! from paginated contract queries and computes, per borrower, the borrow limit granted
//! by their collateral and the resulting risk ratio.
//!
//! # Features
//!
//! - **Paginated Collection**: Exhaustive `limit` / `start_after` sweeps with request spacing
//! - **Borrower Exposure**: Net locked collateral summed over every custody contract
//! - **Collateral Positions**: Every borrower's collateral from the overseer
//! - **Outstanding Loans**: Loan amounts from the market contract
//! - **Risk Assembly**: Borrow limits from whitelist LTVs and oracle prices, risk ratios
//! - **LCD Transport**: CosmWasm smart queries over the REST endpoint of a node
//! - **Error Handling**: Typed errors; transport failures abort the whole scan
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use overseer_client::{LoanScanner, Overseer, ScanConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize tracing
//!     tracing_subscriber::fmt::init();
//!
//!     let scanner = LoanScanner::new(Arc::new(ScanConfig::mainnet()))?;
//!
//!     let overseer = Overseer::new("terra1overseer...", "terra1market...")
//!         .with_oracle("terra1oracle...");
//!     let snapshot = scanner.scan(&overseer).await?;
//!
//!     for loan in snapshot.at_risk(0.9) {
//!         println!("{} at {}", loan.borrower, loan.risk_ratio);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Examples
//!
//! ## Supply whitelist and prices yourself
//!
//! ```rust,no_run
//! use overseer_client::{LoanScanner, Overseer, PriceFeed, ScanConfig, Whitelist, WhitelistElem};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = LoanScanner::new(Arc::new(ScanConfig::mainnet()))?;
//!
//! let whitelist = Whitelist::new(vec![
//!     WhitelistElem::new("terra1beth...", "terra1custody...", 0.6),
//! ]);
//! let prices: PriceFeed = [("terra1beth...", 1850.0)].into_iter().collect();
//!
//! let overseer = Overseer::new("terra1overseer...", "terra1market...");
//! let loans = scanner.get_loans(&overseer, &whitelist, &prices).await?;
//! println!("{} borrowers", loans.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod borrowers;
pub mod collaterals;
pub mod config;
pub mod error;
pub mod lcd;
pub mod market;
pub mod oracle;
pub mod pagination;
pub mod query;
pub mod rate_limit;
pub mod risk;
pub mod types;
pub mod whitelist;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use borrowers::BorrowerAggregator;
pub use collaterals::CollateralAggregator;
pub use config::{Network, ScanConfig};
pub use error::{OverseerError, Result};
pub use lcd::LcdClient;
pub use market::LoanAggregator;
pub use pagination::Pagination;
pub use query::ContractQuerier;
pub use rate_limit::{FixedDelay, RateLimiter};
pub use risk::assemble_loans;
pub use types::{
    BorrowerAddress, CollateralPosition, ExposureMap, LoanMap, LoanRecord, LoanSnapshot,
    Overseer, PriceFeed, RiskRatio, Whitelist, WhitelistElem,
};

use std::sync::Arc;
use tracing::info;

/// Loan scanner combining the transport, the three aggregations and the risk
/// assembly into one invocation.
///
/// Nothing is kept between invocations; every call sweeps the contracts again.
#[derive(Debug, Clone)]
pub struct LoanScanner<Q = LcdClient> {
    /// Contract query transport
    querier: Q,
    /// Configuration
    config: Arc<ScanConfig>,
}

impl LoanScanner<LcdClient> {
    /// Create a scanner querying the configured LCD endpoint
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use overseer_client::{LoanScanner, ScanConfig};
    /// use std::sync::Arc;
    ///
    /// let config = Arc::new(ScanConfig::mainnet());
    /// let scanner = LoanScanner::new(config).unwrap();
    /// ```
    pub fn new(config: Arc<ScanConfig>) -> Result<Self> {
        config.validate()?;

        info!(
            "Initializing loan scanner for network: {:?} ({})",
            config.network, config.lcd_url
        );

        let querier = LcdClient::new(config.clone())?;
        Ok(Self { querier, config })
    }

    /// Health check - verify connectivity to the LCD
    pub async fn health_check(&self) -> Result<bool> {
        self.querier.health_check().await
    }
}

impl<Q: ContractQuerier> LoanScanner<Q> {
    /// Create a scanner over any contract query transport
    pub fn with_querier(config: Arc<ScanConfig>, querier: Q) -> Result<Self> {
        config.validate()?;
        Ok(Self { querier, config })
    }

    /// Get the query transport
    pub fn querier(&self) -> &Q {
        &self.querier
    }

    /// Get configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn pagination(&self, limiter: FixedDelay) -> Pagination {
        Pagination::new(self.config.page_size, limiter)
    }

    /// Borrower aggregator using the configured custody paging
    pub fn borrower_aggregator(&self) -> BorrowerAggregator {
        BorrowerAggregator::new(
            self.pagination(self.config.custody_paging),
            self.config.asset_delay,
        )
    }

    /// Collateral aggregator using the configured overseer paging
    pub fn collateral_aggregator(&self) -> CollateralAggregator {
        CollateralAggregator::new(self.pagination(self.config.collateral_paging))
    }

    /// Loan aggregator using the configured market paging
    pub fn loan_aggregator(&self) -> LoanAggregator {
        LoanAggregator::new(self.pagination(self.config.market_paging))
    }

    /// Load the collateral whitelist from the overseer
    pub async fn fetch_whitelist(&self, overseer: &Overseer) -> Result<Whitelist> {
        whitelist::fetch_whitelist(
            &self.querier,
            &overseer.overseer_contract,
            &self.pagination(self.config.whitelist_paging),
        )
        .await
    }

    /// Load collateral prices from the overseer's oracle
    pub async fn fetch_price_feed(&self, overseer: &Overseer) -> Result<PriceFeed> {
        let oracle_contract = overseer.oracle_contract.as_deref().ok_or_else(|| {
            OverseerError::ConfigError("Overseer has no oracle contract".to_string())
        })?;

        oracle::fetch_price_feed(
            &self.querier,
            oracle_contract,
            &self.pagination(self.config.oracle_paging),
        )
        .await
    }

    /// Compute the loan record of every borrower holding collateral.
    ///
    /// Sweeps custody balances, collateral positions and market loans, then
    /// joins them. Any transport failure aborts the whole call; no partial
    /// result is returned.
    pub async fn get_loans(
        &self,
        overseer: &Overseer,
        whitelist: &Whitelist,
        prices: &PriceFeed,
    ) -> Result<Vec<LoanRecord>> {
        info!(
            "Scanning loans of overseer {} (market {})",
            overseer.overseer_contract, overseer.market_contract
        );

        let borrower_aggregator = self.borrower_aggregator();
        let collateral_aggregator = self.collateral_aggregator();
        let loan_aggregator = self.loan_aggregator();

        let exposures = borrower_aggregator.aggregate(&self.querier, whitelist);
        let positions =
            collateral_aggregator.aggregate(&self.querier, &overseer.overseer_contract);
        let loans = loan_aggregator.aggregate(&self.querier, &overseer.market_contract);

        let (exposures, positions, loans) = if self.config.concurrent_aggregation {
            futures::try_join!(exposures, positions, loans)?
        } else {
            (exposures.await?, positions.await?, loans.await?)
        };

        let records = assemble_loans(&positions, &exposures, &loans, whitelist, prices)?;

        info!(
            "Computed {} loan records ({} borrowers, {} collateral positions, {} loans)",
            records.len(),
            exposures.len(),
            positions.len(),
            loans.len()
        );
        Ok(records)
    }

    /// Load whitelist and prices from chain, then compute every loan record
    pub async fn scan(&self, overseer: &Overseer) -> Result<LoanSnapshot> {
        let whitelist = self.fetch_whitelist(overseer).await?;
        let prices = self.fetch_price_feed(overseer).await?;
        let loans = self.get_loans(overseer, &whitelist, &prices).await?;

        Ok(LoanSnapshot {
            taken_at: chrono::Utc::now(),
            loans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChain;
    use std::time::Duration;

    fn create_test_config() -> Arc<ScanConfig> {
        Arc::new(
            ScanConfig::custom("http://localhost:1317".to_string())
                .unwrap()
                .with_request_timeout(Duration::from_secs(5))
                .without_throttling(),
        )
    }

    fn example_chain() -> MockChain {
        MockChain::new()
            .whitelist("overseer", &[("bETH", "c1", "0.5")])
            .prices("oracle", &[("bETH", "1000")])
            .custody("c1", &[("B1", "100", "20")])
            .collaterals("overseer", &[("B1", &[("bETH", "2")][..])])
            .loans("market", &[("B1", "40")])
    }

    fn example_overseer() -> Overseer {
        Overseer::new("overseer", "market").with_oracle("oracle")
    }

    #[test]
    fn test_scanner_creation() {
        let scanner = LoanScanner::new(create_test_config());
        assert!(scanner.is_ok());
    }

    #[test]
    fn test_scanner_result_is_debug() {
        let config = ScanConfig::clone(&create_test_config()).with_page_size(0);
        let result = LoanScanner::new(Arc::new(config));
        assert!(format!("{:?}", result).contains("ConfigError"));

        let scanner = LoanScanner::new(create_test_config()).unwrap();
        assert!(format!("{:?}", scanner).contains("LcdClient"));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ScanConfig::mainnet();
        config.page_size = 0;

        assert!(LoanScanner::new(Arc::new(config.clone())).is_err());
        assert!(LoanScanner::with_querier(Arc::new(config), MockChain::new()).is_err());
    }

    #[tokio::test]
    async fn test_get_loans_example() {
        let scanner = LoanScanner::with_querier(create_test_config(), example_chain()).unwrap();
        let whitelist = Whitelist::new(vec![WhitelistElem::new("bETH", "c1", 0.5)]);
        let prices: PriceFeed = [("bETH", 1000.0)].into_iter().collect();

        let loans = scanner
            .get_loans(&example_overseer(), &whitelist, &prices)
            .await
            .unwrap();

        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].borrower, "B1");
        assert_eq!(loans[0].borrow_limit, 1000.0);
        assert_eq!(loans[0].loan_amount, 40.0);
        assert_eq!(loans[0].risk_ratio, RiskRatio::Ratio(0.04));
    }

    #[tokio::test]
    async fn test_get_loans_queries_in_order() {
        let scanner = LoanScanner::with_querier(create_test_config(), example_chain()).unwrap();
        let whitelist = Whitelist::new(vec![WhitelistElem::new("bETH", "c1", 0.5)]);

        scanner
            .get_loans(&example_overseer(), &whitelist, &PriceFeed::new())
            .await
            .unwrap();

        assert_eq!(
            scanner.querier().queried_contracts(),
            vec!["c1", "overseer", "market"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_aggregation_matches_sequential() {
        let whitelist = Whitelist::new(vec![WhitelistElem::new("bETH", "c1", 0.5)]);
        let prices: PriceFeed = [("bETH", 1000.0)].into_iter().collect();

        let sequential = LoanScanner::with_querier(create_test_config(), example_chain()).unwrap();
        let concurrent_config = ScanConfig::clone(&create_test_config())
            .with_concurrent_aggregation(true);
        let concurrent =
            LoanScanner::with_querier(Arc::new(concurrent_config), example_chain()).unwrap();

        let a = sequential
            .get_loans(&example_overseer(), &whitelist, &prices)
            .await
            .unwrap();
        let b = concurrent
            .get_loans(&example_overseer(), &whitelist, &prices)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_get_loans_fails_on_transport_error() {
        let chain = example_chain().failing("market");
        let scanner = LoanScanner::with_querier(create_test_config(), chain).unwrap();
        let whitelist = Whitelist::new(vec![WhitelistElem::new("bETH", "c1", 0.5)]);

        let result = scanner
            .get_loans(&example_overseer(), &whitelist, &PriceFeed::new())
            .await;
        assert!(matches!(result, Err(OverseerError::QueryError(_))));
    }

    #[tokio::test]
    async fn test_scan_loads_whitelist_and_prices() {
        let scanner = LoanScanner::with_querier(create_test_config(), example_chain()).unwrap();

        let snapshot = scanner.scan(&example_overseer()).await.unwrap();

        assert_eq!(snapshot.loans.len(), 1);
        assert_eq!(snapshot.loans[0].borrow_limit, 1000.0);
        assert_eq!(snapshot.loans[0].risk_ratio, RiskRatio::Ratio(0.04));
        assert_eq!(snapshot.at_risk(0.5).count(), 0);
    }

    #[tokio::test]
    async fn test_scan_requires_oracle() {
        let scanner = LoanScanner::with_querier(create_test_config(), example_chain()).unwrap();

        let result = scanner.scan(&Overseer::new("overseer", "market")).await;
        assert!(matches!(result, Err(OverseerError::ConfigError(_))));
    }
}
