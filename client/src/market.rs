//! Outstanding loans from the market contract.

use crate::error::{parse_amount, Result};
use crate::pagination::Pagination;
use crate::query::{page_query, query_typed, ContractQuerier};
use crate::rate_limit::{FixedDelay, RateLimiter};
use crate::types::{BorrowerInfo, BorrowerInfosResponse, LoanMap};
use tracing::info;

/// Maps every borrower with a loan record to its outstanding loan amount
#[derive(Debug, Clone)]
pub struct LoanAggregator<L = FixedDelay> {
    pagination: Pagination<L>,
}

impl<L: RateLimiter> LoanAggregator<L> {
    /// Create a loan aggregator
    pub fn new(pagination: Pagination<L>) -> Self {
        Self { pagination }
    }

    /// Page through the market's `borrower_infos` list.
    ///
    /// A borrower missing from the result has no outstanding loan.
    pub async fn aggregate<Q>(&self, querier: &Q, market_contract: &str) -> Result<LoanMap>
    where
        Q: ContractQuerier + ?Sized,
    {
        let infos = self
            .pagination
            .collect(
                move |limit, start_after| {
                    fetch_page(querier, market_contract, limit, start_after)
                },
                |info: &BorrowerInfo| info.borrower.as_str(),
            )
            .await?;

        let loans = infos
            .into_iter()
            .map(|info| {
                let amount = parse_amount("loan_amount", &info.loan_amount)?;
                Ok((info.borrower, amount))
            })
            .collect::<Result<LoanMap>>()?;

        info!(
            "Found {} loan records on market {}",
            loans.len(),
            market_contract
        );
        Ok(loans)
    }
}

async fn fetch_page<Q>(
    querier: &Q,
    market_contract: &str,
    limit: u32,
    start_after: Option<String>,
) -> Result<Vec<BorrowerInfo>>
where
    Q: ContractQuerier + ?Sized,
{
    let msg = page_query("borrower_infos", limit, start_after.as_deref());
    let response: BorrowerInfosResponse = query_typed(querier, market_contract, &msg).await?;
    Ok(response.borrower_infos)
}
