//! LCD client for CosmWasm smart queries.
//!
//! This module provides a [`ContractQuerier`] backed by the REST (LCD) endpoint
//! of a node. Smart queries are JSON messages, base64 encoded into the request
//! path, and the contract answer comes back under the `data` key.

use crate::config::ScanConfig;
use crate::error::{OverseerError, Result};
use crate::query::ContractQuerier;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

/// LCD (REST) client
#[derive(Debug, Clone)]
pub struct LcdClient {
    /// HTTP client
    client: Client,
    /// Base URL of the LCD endpoint
    base_url: Url,
    /// Configuration
    config: Arc<ScanConfig>,
}

impl LcdClient {
    /// Create a new LCD client
    pub fn new(config: Arc<ScanConfig>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(OverseerError::NetworkError)?;

        let base_url = Url::parse(&config.lcd_url)?;
        if base_url.cannot_be_a_base() {
            return Err(OverseerError::ConfigError(format!(
                "LCD URL cannot be used as a base: {}",
                config.lcd_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Append path segments to the base URL, keeping any base path
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| OverseerError::ConfigError("LCD URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build `{base}/cosmwasm/wasm/v1/contract/{contract}/smart/{base64(msg)}`
    fn smart_query_url(&self, contract: &str, msg: &Value) -> Result<Url> {
        let encoded = URL_SAFE.encode(serde_json::to_vec(msg)?);
        self.endpoint(&[
            "cosmwasm", "wasm", "v1", "contract", contract, "smart", encoded.as_str(),
        ])
    }

    /// GET a path below the base URL and decode the JSON body
    async fn get_json(&self, url: Url) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(OverseerError::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("LCD request failed: HTTP {}: {}", status, error_text);
            return Err(OverseerError::QueryError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OverseerError::InvalidResponse(e.to_string()))
    }

    /// Get the chain id reported by the node
    pub async fn get_chain_id(&self) -> Result<String> {
        info!("Fetching node info from LCD");

        let url = self.endpoint(&["cosmos", "base", "tendermint", "v1beta1", "node_info"])?;
        let result = self.get_json(url).await?;

        let network = result["default_node_info"]["network"]
            .as_str()
            .ok_or_else(|| {
                OverseerError::InvalidResponse("Missing network in node info".to_string())
            })?;

        debug!("Connected to chain: {}", network);
        Ok(network.to_string())
    }

    /// Health check - verify connectivity to the LCD
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Performing LCD health check");

        match self.get_chain_id().await {
            Ok(_) => {
                info!("LCD health check passed");
                Ok(true)
            }
            Err(e) => {
                error!("LCD health check failed: {:?}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ContractQuerier for LcdClient {
    async fn query_contract(&self, contract: &str, msg: &Value) -> Result<Value> {
        debug!("Smart query to {}: {}", contract, msg);

        let url = self.smart_query_url(contract, msg)?;
        let mut body = self.get_json(url).await?;

        match body.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(OverseerError::InvalidResponse(
                "Missing data in smart query response".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_client(lcd_url: &str) -> LcdClient {
        let config = ScanConfig::custom(lcd_url.to_string()).unwrap();
        LcdClient::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_lcd_client_creation() {
        let config = Arc::new(ScanConfig::mainnet());
        assert!(LcdClient::new(config).is_ok());
    }

    #[test]
    fn test_invalid_lcd_url() {
        let config = ScanConfig::custom("not a url".to_string()).unwrap();
        assert!(matches!(
            LcdClient::new(Arc::new(config)),
            Err(OverseerError::UrlParseError(_))
        ));
    }

    #[test]
    fn test_smart_query_url() {
        let client = create_client("http://localhost:1317");
        let msg = json!({ "borrowers": { "limit": 10 } });

        let url = client.smart_query_url("terra1custody", &msg).unwrap();
        let encoded = URL_SAFE.encode(serde_json::to_vec(&msg).unwrap());
        assert_eq!(
            url.as_str(),
            format!(
                "http://localhost:1317/cosmwasm/wasm/v1/contract/terra1custody/smart/{}",
                encoded
            )
        );
    }

    #[test]
    fn test_smart_query_url_keeps_base_path() {
        let client = create_client("https://lcd.example.com/terra/");
        let url = client.smart_query_url("c1", &json!({})).unwrap();
        assert!(url
            .path()
            .starts_with("/terra/cosmwasm/wasm/v1/contract/c1/smart/"));
    }

    #[test]
    fn test_encoded_query_is_path_safe() {
        let client = create_client("http://localhost:1317");
        // '?' and '>' runs encode to '/' in the standard alphabet
        let msg = json!({ "start_after": "?>?>~~~" });
        let url = client.smart_query_url("c1", &msg).unwrap();
        let encoded = url.path_segments().unwrap().last().unwrap().to_string();
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('+'));
        assert_eq!(URL_SAFE.decode(encoded).unwrap(), serde_json::to_vec(&msg).unwrap());
    }
}
