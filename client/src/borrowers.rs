//! Net borrower exposure across custody contracts.
//!
//! Every whitelisted collateral has its own custody contract listing the
//! borrowers that deposited it. Sweeping all of them yields, per borrower, the
//! collateral actually locked (`balance - spendable`) summed over assets.

use crate::error::{parse_amount, Result};
use crate::pagination::Pagination;
use crate::query::{page_query, query_typed, ContractQuerier};
use crate::rate_limit::{FixedDelay, RateLimiter};
use crate::types::{BorrowersResponse, CustodyBorrower, ExposureMap, Whitelist};
use std::time::Duration;
use tracing::{debug, info};

/// Builds the net exposure map from every custody contract in the whitelist
#[derive(Debug, Clone)]
pub struct BorrowerAggregator<L = FixedDelay> {
    /// Paging of each custody `borrowers` sweep
    pagination: Pagination<L>,
    /// Pause after draining one custody contract
    asset_delay: Duration,
}

impl<L: RateLimiter> BorrowerAggregator<L> {
    /// Create a borrower aggregator
    pub fn new(pagination: Pagination<L>, asset_delay: Duration) -> Self {
        Self {
            pagination,
            asset_delay,
        }
    }

    /// Fetch every borrower balance held by one custody contract
    pub async fn fetch_custody_borrowers<Q>(
        &self,
        querier: &Q,
        custody_contract: &str,
    ) -> Result<Vec<CustodyBorrower>>
    where
        Q: ContractQuerier + ?Sized,
    {
        self.pagination
            .collect(
                move |limit, start_after| {
                    fetch_page(querier, custody_contract, limit, start_after)
                },
                |entry: &CustodyBorrower| entry.borrower.as_str(),
            )
            .await
    }

    /// Sweep the custody contract of every whitelisted asset, in whitelist
    /// order, and fold the balances into one exposure map.
    pub async fn aggregate<Q>(&self, querier: &Q, whitelist: &Whitelist) -> Result<ExposureMap>
    where
        Q: ContractQuerier + ?Sized,
    {
        info!(
            "Aggregating borrowers across {} custody contracts",
            whitelist.len()
        );

        let mut exposures = ExposureMap::new();
        for (index, asset) in whitelist.elems.iter().enumerate() {
            let borrowers = self
                .fetch_custody_borrowers(querier, &asset.custody_contract)
                .await?;
            debug!(
                "Custody {} ({}) holds {} borrowers",
                asset.custody_contract,
                asset.collateral_token,
                borrowers.len()
            );

            accumulate_exposure(&mut exposures, &borrowers)?;

            if index + 1 < whitelist.len() && !self.asset_delay.is_zero() {
                tokio::time::sleep(self.asset_delay).await;
            }
        }

        info!("Found {} borrowers with custody balances", exposures.len());
        Ok(exposures)
    }
}

async fn fetch_page<Q>(
    querier: &Q,
    custody_contract: &str,
    limit: u32,
    start_after: Option<String>,
) -> Result<Vec<CustodyBorrower>>
where
    Q: ContractQuerier + ?Sized,
{
    let msg = page_query("borrowers", limit, start_after.as_deref());
    let response: BorrowersResponse = query_typed(querier, custody_contract, &msg).await?;
    Ok(response.borrowers)
}

/// Add `balance - spendable` of every entry to the borrower's exposure
pub fn accumulate_exposure(
    exposures: &mut ExposureMap,
    borrowers: &[CustodyBorrower],
) -> Result<()> {
    for entry in borrowers {
        let balance = parse_amount("balance", &entry.balance)?;
        let spendable = parse_amount("spendable", &entry.spendable)?;
        *exposures.entry(entry.borrower.clone()).or_insert(0.0) += balance - spendable;
    }
    Ok(())
}
