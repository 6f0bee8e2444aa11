//! Collateral prices from the oracle contract.

use crate::error::{parse_amount, Result};
use crate::pagination::Pagination;
use crate::query::{page_query, query_typed, ContractQuerier};
use crate::rate_limit::RateLimiter;
use crate::types::{PriceEntry, PriceFeed, PricesResponse};
use tracing::{debug, info};

/// Load every price published by the oracle into a price feed
pub async fn fetch_price_feed<Q, L>(
    querier: &Q,
    oracle_contract: &str,
    pagination: &Pagination<L>,
) -> Result<PriceFeed>
where
    Q: ContractQuerier + ?Sized,
    L: RateLimiter,
{
    let entries = pagination
        .collect(
            move |limit, start_after| {
                fetch_page(querier, oracle_contract, limit, start_after)
            },
            |entry: &PriceEntry| entry.asset.as_str(),
        )
        .await?;

    let mut feed = PriceFeed::new();
    for entry in entries {
        let price = parse_amount("price", &entry.price)?;
        debug!(
            "Price of {} = {} (updated {})",
            entry.asset, price, entry.last_updated_time
        );
        feed.insert(entry.asset, price);
    }

    info!(
        "Loaded {} prices from oracle {}",
        feed.len(),
        oracle_contract
    );
    Ok(feed)
}

async fn fetch_page<Q>(
    querier: &Q,
    oracle_contract: &str,
    limit: u32,
    start_after: Option<String>,
) -> Result<Vec<PriceEntry>>
where
    Q: ContractQuerier + ?Sized,
{
    let msg = page_query("prices", limit, start_after.as_deref());
    let response: PricesResponse = query_typed(querier, oracle_contract, &msg).await?;
    Ok(response.prices)
}
