//! Contract query boundary.
//!
//! Every aggregation talks to the chain through [`ContractQuerier`], which
//! sends a JSON smart query to a contract and returns the JSON answer. The LCD
//! client implements it over HTTP; tests plug in in-memory contracts.

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Query a contract with a JSON request and get its JSON response
#[async_trait]
pub trait ContractQuerier: Send + Sync {
    /// Run a smart query against `contract`
    async fn query_contract(&self, contract: &str, msg: &Value) -> Result<Value>;
}

#[async_trait]
impl<Q: ContractQuerier + ?Sized> ContractQuerier for Arc<Q> {
    async fn query_contract(&self, contract: &str, msg: &Value) -> Result<Value> {
        (**self).query_contract(contract, msg).await
    }
}

/// Run a smart query with typed request and response
pub async fn query_typed<Q, M, R>(querier: &Q, contract: &str, msg: &M) -> Result<R>
where
    Q: ContractQuerier + ?Sized,
    M: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let msg = serde_json::to_value(msg)?;
    let response = querier.query_contract(contract, &msg).await?;
    Ok(serde_json::from_value(response)?)
}

/// Build a paginated list query: `{"<operation>": {"limit": .., "start_after": ..}}`
pub fn page_query(operation: &str, limit: u32, start_after: Option<&str>) -> Value {
    let mut options = serde_json::Map::new();
    options.insert("limit".to_string(), Value::from(limit));
    if let Some(cursor) = start_after {
        options.insert("start_after".to_string(), Value::from(cursor));
    }

    let mut msg = serde_json::Map::new();
    msg.insert(operation.to_string(), Value::Object(options));
    Value::Object(msg)
}
