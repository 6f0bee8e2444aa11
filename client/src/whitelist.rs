//! Collateral whitelist of the overseer.

use crate::error::Result;
use crate::pagination::Pagination;
use crate::query::{page_query, query_typed, ContractQuerier};
use crate::rate_limit::RateLimiter;
use crate::types::{Whitelist, WhitelistElem, WhitelistResponse, WhitelistResponseElem};
use tracing::info;

/// Load every whitelisted collateral from the overseer, in overseer order
pub async fn fetch_whitelist<Q, L>(
    querier: &Q,
    overseer_contract: &str,
    pagination: &Pagination<L>,
) -> Result<Whitelist>
where
    Q: ContractQuerier + ?Sized,
    L: RateLimiter,
{
    let elems = pagination
        .collect(
            move |limit, start_after| {
                fetch_page(querier, overseer_contract, limit, start_after)
            },
            |elem: &WhitelistResponseElem| elem.collateral_token.as_str(),
        )
        .await?;

    let whitelist = Whitelist::new(
        elems
            .into_iter()
            .map(WhitelistElem::try_from)
            .collect::<Result<Vec<_>>>()?,
    );

    info!(
        "Loaded {} whitelisted collaterals from overseer {}",
        whitelist.len(),
        overseer_contract
    );
    Ok(whitelist)
}

async fn fetch_page<Q>(
    querier: &Q,
    overseer_contract: &str,
    limit: u32,
    start_after: Option<String>,
) -> Result<Vec<WhitelistResponseElem>>
where
    Q: ContractQuerier + ?Sized,
{
    let msg = page_query("whitelist", limit, start_after.as_deref());
    let response: WhitelistResponse = query_typed(querier, overseer_contract, &msg).await?;
    Ok(response.elems)
}
