//! Common types used across the loan scanner.
//!
//! This module defines the response shapes of the overseer, custody, market and
//! oracle contracts, the whitelist and price feed inputs, and the loan records
//! produced by a scan.

use crate::error::{parse_amount, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Account address of a borrower
pub type BorrowerAddress = String;

/// Contract address of a collateral token
pub type TokenAddress = String;

/// Contract address
pub type ContractAddress = String;

/// Net exposure per borrower: sum of `balance - spendable` over all custody contracts
pub type ExposureMap = HashMap<BorrowerAddress, f64>;

/// Outstanding loan amount per borrower
pub type LoanMap = HashMap<BorrowerAddress, f64>;

/// Addresses of the contracts making up one money market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overseer {
    /// Overseer contract (collateral positions, whitelist)
    pub overseer_contract: ContractAddress,
    /// Market contract (borrower loan info)
    pub market_contract: ContractAddress,
    /// Oracle contract (collateral prices)
    pub oracle_contract: Option<ContractAddress>,
}

impl Overseer {
    /// Create an overseer description without an oracle
    pub fn new(overseer_contract: impl Into<String>, market_contract: impl Into<String>) -> Self {
        Self {
            overseer_contract: overseer_contract.into(),
            market_contract: market_contract.into(),
            oracle_contract: None,
        }
    }

    /// Attach the oracle contract used to load prices
    pub fn with_oracle(mut self, oracle_contract: impl Into<String>) -> Self {
        self.oracle_contract = Some(oracle_contract.into());
        self
    }
}

/// Custody `borrowers` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowersResponse {
    /// Page of borrower balances
    pub borrowers: Vec<CustodyBorrower>,
}

/// Balance of one borrower in a custody contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyBorrower {
    /// Borrower address
    pub borrower: BorrowerAddress,
    /// Deposited collateral
    pub balance: String,
    /// Part of the balance not locked as collateral
    pub spendable: String,
}

/// Overseer `all_collaterals` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllCollateralsResponse {
    /// Page of collateral positions
    pub all_collaterals: Vec<CollateralPosition>,
}

/// Collateral locked by one borrower, as `(token, amount)` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollateralPosition {
    /// Borrower address
    pub borrower: BorrowerAddress,
    /// Locked collateral per token
    pub collaterals: Vec<(TokenAddress, String)>,
}

/// Market `borrower_infos` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerInfosResponse {
    /// Page of borrower loan info
    pub borrower_infos: Vec<BorrowerInfo>,
}

/// Loan state of one borrower in the market contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerInfo {
    /// Borrower address
    pub borrower: BorrowerAddress,
    /// Outstanding loan
    pub loan_amount: String,
}

/// Overseer `whitelist` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistResponse {
    /// Page of whitelisted collaterals
    pub elems: Vec<WhitelistResponseElem>,
}

/// Whitelisted collateral as returned by the overseer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistResponseElem {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Ticker symbol
    #[serde(default)]
    pub symbol: String,
    /// Maximum loan-to-value ratio as a decimal string
    pub max_ltv: String,
    /// Custody contract holding this collateral
    pub custody_contract: ContractAddress,
    /// Collateral token contract
    pub collateral_token: TokenAddress,
}

/// Whitelisted collateral asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistElem {
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Maximum loan-to-value ratio, e.g. `0.6`
    pub max_ltv: f64,
    /// Custody contract holding this collateral
    pub custody_contract: ContractAddress,
    /// Collateral token contract
    pub collateral_token: TokenAddress,
}

impl WhitelistElem {
    /// Create a whitelist entry
    pub fn new(
        collateral_token: impl Into<String>,
        custody_contract: impl Into<String>,
        max_ltv: f64,
    ) -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            max_ltv,
            custody_contract: custody_contract.into(),
            collateral_token: collateral_token.into(),
        }
    }
}

impl TryFrom<WhitelistResponseElem> for WhitelistElem {
    type Error = crate::error::OverseerError;

    fn try_from(elem: WhitelistResponseElem) -> Result<Self> {
        Ok(Self {
            max_ltv: parse_amount("max_ltv", &elem.max_ltv)?,
            name: elem.name,
            symbol: elem.symbol,
            custody_contract: elem.custody_contract,
            collateral_token: elem.collateral_token,
        })
    }
}

/// Ordered list of whitelisted collateral assets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Whitelist {
    /// Whitelisted assets in overseer order
    pub elems: Vec<WhitelistElem>,
}

impl Whitelist {
    /// Create a whitelist from its entries
    pub fn new(elems: Vec<WhitelistElem>) -> Self {
        Self { elems }
    }

    /// First entry whose collateral token matches exactly
    pub fn find(&self, collateral_token: &str) -> Option<&WhitelistElem> {
        self.elems
            .iter()
            .find(|elem| elem.collateral_token == collateral_token)
    }

    /// Number of whitelisted assets
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Whether the whitelist is empty
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }
}

/// Oracle `prices` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesResponse {
    /// Page of prices
    pub prices: Vec<PriceEntry>,
}

/// Price of one asset as returned by the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Asset (collateral token) address
    pub asset: TokenAddress,
    /// Unit price as a decimal string
    pub price: String,
    /// Unix timestamp of the last price update
    #[serde(default)]
    pub last_updated_time: u64,
}

/// Unit price per collateral token; may be missing entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFeed(HashMap<TokenAddress, f64>);

impl PriceFeed {
    /// Create an empty price feed
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the price of a token
    pub fn insert(&mut self, token: impl Into<String>, price: f64) {
        self.0.insert(token.into(), price);
    }

    /// Price of a token, if known
    pub fn get(&self, token: &str) -> Option<f64> {
        self.0.get(token).copied()
    }

    /// Number of priced tokens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no token is priced
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PriceFeed {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Loan amount relative to borrow limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRatio {
    /// `loan_amount / borrow_limit`
    Ratio(f64),
    /// Outstanding loan against a zero borrow limit
    Unbounded,
}

impl RiskRatio {
    /// Compute the risk ratio of a loan against a borrow limit.
    ///
    /// A zero limit yields [`RiskRatio::Unbounded`] when there is debt and a
    /// zero ratio when there is none.
    pub fn of(loan_amount: f64, borrow_limit: f64) -> Self {
        if borrow_limit > 0.0 {
            RiskRatio::Ratio(loan_amount / borrow_limit)
        } else if loan_amount > 0.0 {
            RiskRatio::Unbounded
        } else {
            RiskRatio::Ratio(0.0)
        }
    }

    /// Numeric ratio, `None` when unbounded
    pub fn value(&self) -> Option<f64> {
        match self {
            RiskRatio::Ratio(ratio) => Some(*ratio),
            RiskRatio::Unbounded => None,
        }
    }

    /// Whether the ratio is at or above `threshold`
    pub fn exceeds(&self, threshold: f64) -> bool {
        match self {
            RiskRatio::Ratio(ratio) => *ratio >= threshold,
            RiskRatio::Unbounded => true,
        }
    }
}

impl Default for RiskRatio {
    fn default() -> Self {
        RiskRatio::Ratio(0.0)
    }
}

impl fmt::Display for RiskRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskRatio::Ratio(ratio) => write!(f, "{}", ratio),
            RiskRatio::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Risk snapshot of one borrower
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Borrower address
    pub borrower: BorrowerAddress,
    /// Locked collateral per token
    pub collaterals: BTreeMap<TokenAddress, f64>,
    /// Maximum loan supported by the collateral
    pub borrow_limit: f64,
    /// Outstanding loan
    pub loan_amount: f64,
    /// Loan amount relative to borrow limit
    pub risk_ratio: RiskRatio,
}

/// Loan records of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSnapshot {
    /// When the scan completed
    pub taken_at: DateTime<Utc>,
    /// Records in collateral retrieval order
    pub loans: Vec<LoanRecord>,
}

impl LoanSnapshot {
    /// Records whose risk ratio is at or above `threshold`
    pub fn at_risk(&self, threshold: f64) -> impl Iterator<Item = &LoanRecord> {
        self.loans
            .iter()
            .filter(move |loan| loan.risk_ratio.exceeds(threshold))
    }
}
