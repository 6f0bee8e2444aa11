//! Network and scan configuration.
//!
//! This module provides configuration for connecting to the LCD endpoint of a
//! network and for pacing the paginated sweeps over the overseer, custody,
//! market and oracle contracts.

use crate::error::{OverseerError, Result};
use crate::rate_limit::FixedDelay;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page size used by every paginated contract query unless overridden
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Production network
    Mainnet,
    /// Public testnet
    Testnet,
    /// Custom network with a user-defined LCD endpoint
    Custom,
}

impl Network {
    /// Get the chain id
    pub fn chain_id(&self) -> &'static str {
        match self {
            Network::Mainnet => "phoenix-1",
            Network::Testnet => "pisco-1",
            Network::Custom => "custom",
        }
    }

    /// Get the default LCD URL for this network
    pub fn default_lcd_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://phoenix-lcd.terra.dev",
            Network::Testnet => "https://pisco-lcd.terra.dev",
            Network::Custom => "",
        }
    }
}

/// Configuration for a loan scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Network to connect to
    pub network: Network,

    /// LCD endpoint URL
    pub lcd_url: String,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Items requested per page
    pub page_size: u32,

    /// Spacing of custody `borrowers` pages
    pub custody_paging: FixedDelay,

    /// Spacing of overseer `all_collaterals` pages
    pub collateral_paging: FixedDelay,

    /// Spacing of market `borrower_infos` pages
    pub market_paging: FixedDelay,

    /// Spacing of overseer `whitelist` pages
    pub whitelist_paging: FixedDelay,

    /// Spacing of oracle `prices` pages
    pub oracle_paging: FixedDelay,

    /// Pause after draining one custody contract, before the next asset
    pub asset_delay: Duration,

    /// Run the three aggregations concurrently instead of one after another
    pub concurrent_aggregation: bool,
}

impl ScanConfig {
    /// Create a new configuration for the specified network
    pub fn new(network: Network) -> Self {
        Self::with_lcd_url(network, network.default_lcd_url().to_string())
    }

    fn with_lcd_url(network: Network, lcd_url: String) -> Self {
        Self {
            network,
            lcd_url,
            request_timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            custody_paging: FixedDelay::uniform(Duration::from_millis(500)),
            collateral_paging: FixedDelay::new(
                Duration::from_millis(1000),
                Duration::from_millis(500),
            ),
            market_paging: FixedDelay::uniform(Duration::from_millis(500)),
            whitelist_paging: FixedDelay::uniform(Duration::from_millis(500)),
            oracle_paging: FixedDelay::uniform(Duration::from_millis(500)),
            asset_delay: Duration::from_millis(2000),
            concurrent_aggregation: false,
        }
    }

    /// Create configuration for mainnet
    pub fn mainnet() -> Self {
        Self::new(Network::Mainnet)
    }

    /// Create configuration for testnet
    pub fn testnet() -> Self {
        Self::new(Network::Testnet)
    }

    /// Create a custom configuration
    pub fn custom(lcd_url: String) -> Result<Self> {
        if lcd_url.is_empty() {
            return Err(OverseerError::ConfigError(
                "LCD URL cannot be empty".to_string(),
            ));
        }

        Ok(Self::with_lcd_url(Network::Custom, lcd_url))
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the spacing of the three aggregation sweeps
    pub fn with_paging(
        mut self,
        custody: FixedDelay,
        collateral: FixedDelay,
        market: FixedDelay,
    ) -> Self {
        self.custody_paging = custody;
        self.collateral_paging = collateral;
        self.market_paging = market;
        self
    }

    /// Set the spacing of the whitelist and price feed sweeps
    pub fn with_input_paging(mut self, whitelist: FixedDelay, oracle: FixedDelay) -> Self {
        self.whitelist_paging = whitelist;
        self.oracle_paging = oracle;
        self
    }

    /// Set the pause between custody contracts
    pub fn with_asset_delay(mut self, delay: Duration) -> Self {
        self.asset_delay = delay;
        self
    }

    /// Remove every delay. Meant for tests and local nodes.
    pub fn without_throttling(self) -> Self {
        self.with_paging(FixedDelay::none(), FixedDelay::none(), FixedDelay::none())
            .with_input_paging(FixedDelay::none(), FixedDelay::none())
            .with_asset_delay(Duration::ZERO)
    }

    /// Run the aggregations concurrently
    pub fn with_concurrent_aggregation(mut self, concurrent: bool) -> Self {
        self.concurrent_aggregation = concurrent;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.lcd_url.is_empty() {
            return Err(OverseerError::ConfigError(
                "LCD URL cannot be empty".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(OverseerError::ConfigError(
                "Page size must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(OverseerError::ConfigError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
