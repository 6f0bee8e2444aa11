//! Collateral positions held by the overseer.

use crate::error::Result;
use crate::pagination::Pagination;
use crate::query::{page_query, query_typed, ContractQuerier};
use crate::rate_limit::{FixedDelay, RateLimiter};
use crate::types::{AllCollateralsResponse, CollateralPosition};
use tracing::info;

/// Lists every borrower's locked collateral from the overseer
#[derive(Debug, Clone)]
pub struct CollateralAggregator<L = FixedDelay> {
    pagination: Pagination<L>,
}

impl<L: RateLimiter> CollateralAggregator<L> {
    /// Create a collateral aggregator
    pub fn new(pagination: Pagination<L>) -> Self {
        Self { pagination }
    }

    /// Page through the overseer's `all_collaterals` list.
    ///
    /// Positions are returned as the overseer orders them; the join step
    /// keeps that order.
    pub async fn aggregate<Q>(
        &self,
        querier: &Q,
        overseer_contract: &str,
    ) -> Result<Vec<CollateralPosition>>
    where
        Q: ContractQuerier + ?Sized,
    {
        let positions = self
            .pagination
            .collect(
                move |limit, start_after| {
                    fetch_page(querier, overseer_contract, limit, start_after)
                },
                |position: &CollateralPosition| position.borrower.as_str(),
            )
            .await?;

        info!(
            "Found {} collateral positions on overseer {}",
            positions.len(),
            overseer_contract
        );
        Ok(positions)
    }
}

async fn fetch_page<Q>(
    querier: &Q,
    overseer_contract: &str,
    limit: u32,
    start_after: Option<String>,
) -> Result<Vec<CollateralPosition>>
where
    Q: ContractQuerier + ?Sized,
{
    let msg = page_query("all_collaterals", limit, start_after.as_deref());
    let response: AllCollateralsResponse = query_typed(querier, overseer_contract, &msg).await?;
    Ok(response.all_collaterals)
}
