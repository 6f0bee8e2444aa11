//! In-memory contracts for unit tests.

use crate::error::{OverseerError, Result};
use crate::query::ContractQuerier;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A paginated list served by one contract query
struct ListQuery {
    response_field: &'static str,
    key_field: &'static str,
    items: Vec<Value>,
}

/// Contracts answering paginated list queries with `start_after` semantics
#[derive(Default)]
pub(crate) struct MockChain {
    lists: HashMap<(String, String), ListQuery>,
    failing: HashSet<String>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_list(
        mut self,
        contract: &str,
        operation: &str,
        response_field: &'static str,
        key_field: &'static str,
        mut items: Vec<Value>,
    ) -> Self {
        items.sort_by(|a, b| a[key_field].as_str().cmp(&b[key_field].as_str()));
        self.lists.insert(
            (contract.to_string(), operation.to_string()),
            ListQuery {
                response_field,
                key_field,
                items,
            },
        );
        self
    }

    /// Custody `borrowers`: `(borrower, balance, spendable)`
    pub(crate) fn custody(self, contract: &str, borrowers: &[(&str, &str, &str)]) -> Self {
        let items = borrowers
            .iter()
            .map(|(borrower, balance, spendable)| {
                json!({ "borrower": borrower, "balance": balance, "spendable": spendable })
            })
            .collect();
        self.with_list(contract, "borrowers", "borrowers", "borrower", items)
    }

    /// Overseer `all_collaterals`: `(borrower, [(token, amount)])`
    pub(crate) fn collaterals(self, contract: &str, positions: &[(&str, &[(&str, &str)])]) -> Self {
        let items = positions
            .iter()
            .map(|(borrower, collaterals)| {
                json!({ "borrower": borrower, "collaterals": collaterals })
            })
            .collect();
        self.with_list(contract, "all_collaterals", "all_collaterals", "borrower", items)
    }

    /// Market `borrower_infos`: `(borrower, loan_amount)`
    pub(crate) fn loans(self, contract: &str, loans: &[(&str, &str)]) -> Self {
        let items = loans
            .iter()
            .map(|(borrower, loan_amount)| {
                json!({
                    "borrower": borrower,
                    "interest_index": "1",
                    "reward_index": "0",
                    "loan_amount": loan_amount,
                    "pending_rewards": "0"
                })
            })
            .collect();
        self.with_list(contract, "borrower_infos", "borrower_infos", "borrower", items)
    }

    /// Overseer `whitelist`: `(collateral_token, custody_contract, max_ltv)`
    pub(crate) fn whitelist(self, contract: &str, elems: &[(&str, &str, &str)]) -> Self {
        let items = elems
            .iter()
            .map(|(token, custody, max_ltv)| {
                json!({
                    "name": token,
                    "symbol": token,
                    "max_ltv": max_ltv,
                    "custody_contract": custody,
                    "collateral_token": token
                })
            })
            .collect();
        self.with_list(contract, "whitelist", "elems", "collateral_token", items)
    }

    /// Oracle `prices`: `(asset, price)`
    pub(crate) fn prices(self, contract: &str, prices: &[(&str, &str)]) -> Self {
        let items = prices
            .iter()
            .map(|(asset, price)| {
                json!({ "asset": asset, "price": price, "last_updated_time": 1_650_000_000u64 })
            })
            .collect();
        self.with_list(contract, "prices", "prices", "asset", items)
    }

    /// Every query to `contract` fails
    pub(crate) fn failing(mut self, contract: &str) -> Self {
        self.failing.insert(contract.to_string());
        self
    }

    /// Contracts queried, in order
    pub(crate) fn queried_contracts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(contract, _)| contract.clone())
            .collect()
    }

    /// Number of queries sent to `contract`
    pub(crate) fn request_count(&self, contract: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == contract)
            .count()
    }
}

#[async_trait]
impl ContractQuerier for MockChain {
    async fn query_contract(&self, contract: &str, msg: &Value) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((contract.to_string(), msg.clone()));

        if self.failing.contains(contract) {
            return Err(OverseerError::QueryError(format!(
                "HTTP 500 Internal Server Error: {} unavailable",
                contract
            )));
        }

        let (operation, options) = msg
            .as_object()
            .and_then(|m| m.iter().next())
            .ok_or_else(|| OverseerError::QueryError("malformed query".to_string()))?;

        let list = self
            .lists
            .get(&(contract.to_string(), operation.clone()))
            .ok_or_else(|| {
                OverseerError::QueryError(format!("unknown query {} on {}", operation, contract))
            })?;

        let limit = options["limit"].as_u64().unwrap_or(10) as usize;
        let start_after = options["start_after"].as_str();

        let page: Vec<Value> = list
            .items
            .iter()
            .filter(|item| match start_after {
                Some(cursor) => item[list.key_field].as_str().map_or(false, |k| k > cursor),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect();

        let mut response = serde_json::Map::new();
        response.insert(list.response_field.to_string(), Value::Array(page));
        Ok(Value::Object(response))
    }
}
