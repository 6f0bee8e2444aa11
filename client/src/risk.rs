//! Borrow limits and risk ratios.
//!
//! Joins the three aggregates by borrower address. Collateral positions drive
//! the join: a borrower without collateral never shows up, and a borrower with
//! collateral but no custody balance is skipped.

use crate::error::{parse_amount, Result};
use crate::types::{
    CollateralPosition, ExposureMap, LoanMap, LoanRecord, PriceFeed, RiskRatio, TokenAddress,
    Whitelist,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Parse the `(token, amount)` pairs of a position into a token -> amount map
pub fn collateral_amounts(position: &CollateralPosition) -> Result<BTreeMap<TokenAddress, f64>> {
    position
        .collaterals
        .iter()
        .map(|(token, amount)| Ok((token.clone(), parse_amount("collaterals", amount)?)))
        .collect()
}

/// Floor of `sum(amount * price * max_ltv)` over the held tokens.
///
/// Unpriced tokens contribute nothing. Tokens missing from the whitelist
/// contribute nothing either and are reported.
pub fn borrow_limit(
    collaterals: &BTreeMap<TokenAddress, f64>,
    whitelist: &Whitelist,
    prices: &PriceFeed,
) -> f64 {
    let mut limit: f64 = 0.0;
    for (token, amount) in collaterals {
        let Some(elem) = whitelist.find(token) else {
            warn!("Collateral token {} is not whitelisted, ignoring it", token);
            continue;
        };
        let Some(price) = prices.get(token) else {
            debug!("No price for {}, it does not count towards the limit", token);
            continue;
        };
        limit += amount * price * elem.max_ltv;
    }
    limit.floor()
}

/// Build one loan record per borrower holding collateral, in collateral order
pub fn assemble_loans(
    positions: &[CollateralPosition],
    exposures: &ExposureMap,
    loans: &LoanMap,
    whitelist: &Whitelist,
    prices: &PriceFeed,
) -> Result<Vec<LoanRecord>> {
    let mut records = Vec::with_capacity(positions.len());

    for position in positions {
        if !exposures.contains_key(&position.borrower) {
            warn!("Borrower not found in custody balances: {}", position.borrower);
            continue;
        }

        let collaterals = collateral_amounts(position)?;
        let borrow_limit = borrow_limit(&collaterals, whitelist, prices);

        let mut record = LoanRecord {
            borrower: position.borrower.clone(),
            collaterals,
            borrow_limit,
            ..Default::default()
        };

        if let Some(&loan_amount) = loans.get(&position.borrower) {
            record.loan_amount = loan_amount;
            record.risk_ratio = RiskRatio::of(loan_amount, borrow_limit);
        }

        records.push(record);
    }

    debug!(
        "Assembled {} loan records from {} collateral positions",
        records.len(),
        positions.len()
    );
    Ok(records)
}
