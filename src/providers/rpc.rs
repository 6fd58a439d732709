//! RPC Client Module
//!
//! Plain JSON-RPC over HTTP POST against a single endpoint:
//! 1. One `reqwest::Client` per provider, gzip and a fixed User-Agent
//! 2. Per-request timeout (never above 60s), separate connect timeout
//! 3. No retries and no fallback endpoint; a failed call fails its own item
//! 4. Every failure is classified into an `AppError` code
//!
//! The health engine only sees the `ChainRpc` trait, so tests can swap in an
//! in-memory chain.

use alloy_primitives::{Address, B256, U256, U64};
use alloy_rpc_types::BlockNumberOrTag;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::SyncState;
use crate::providers::types::{parse_sync_state, RpcBlock, RpcReceipt, RpcTransaction};
use crate::utils::constants::{
    MAX_RPC_TIMEOUT_SECS, RPC_CONNECT_TIMEOUT_SECS, USER_AGENT as USER_AGENT_CONST,
};

/// Node operations the health engine depends on.
///
/// Each call is independently fallible. `Ok(None)` means the node answered
/// but has no such object.
pub trait ChainRpc: Send + Sync {
    /// `eth_chainId`; doubles as the connectivity probe
    fn chain_id(&self) -> impl Future<Output = AppResult<u64>> + Send;

    /// `web3_clientVersion`
    fn client_version(&self) -> impl Future<Output = AppResult<String>> + Send;

    /// `eth_getBlockByNumber(tag, false)`
    fn block_by_number(
        &self,
        block: BlockNumberOrTag,
    ) -> impl Future<Output = AppResult<Option<RpcBlock>>> + Send;

    /// `eth_getTransactionByHash`
    fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> impl Future<Output = AppResult<Option<RpcTransaction>>> + Send;

    /// `eth_getTransactionReceipt`
    fn transaction_receipt(
        &self,
        hash: B256,
    ) -> impl Future<Output = AppResult<Option<RpcReceipt>>> + Send;

    /// `eth_getBalance(address, "latest")` in wei
    fn balance(&self, address: Address) -> impl Future<Output = AppResult<U256>> + Send;

    /// `eth_gasPrice` in wei
    fn gas_price(&self) -> impl Future<Output = AppResult<U256>> + Send;

    /// `eth_syncing`
    fn sync_state(&self) -> impl Future<Output = AppResult<SyncState>> + Send;

    /// `net_peerCount`
    fn peer_count(&self) -> impl Future<Output = AppResult<u64>> + Send;
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// HTTP JSON-RPC provider for one endpoint
#[derive(Clone)]
pub struct RpcProvider {
    url: String,
    client: reqwest::Client,
}

impl RpcProvider {
    /// Create a provider; `timeout` is capped at 60 seconds
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let timeout = timeout.min(Duration::from_secs(MAX_RPC_TIMEOUT_SECS));
        Ok(Self {
            url: url.into(),
            client: Self::build_client(timeout)?,
        })
    }

    /// Build HTTP client with custom headers and gzip
    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(RPC_CONNECT_TIMEOUT_SECS).min(timeout))
            .gzip(true)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a call whose result must be present
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        self.execute_call(method, params).await?.ok_or_else(|| {
            AppError::invalid_response(format!("No result in response to {}", method))
        })
    }

    /// Execute a call where `null` is a legitimate answer
    pub async fn call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<Option<T>> {
        self.execute_call(method, params).await
    }

    /// Execute single RPC call
    async fn execute_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<Option<T>> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        debug!("📡 {} -> {}", method, self.url);

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::rpc_error(format!(
                "HTTP error: {} ({})",
                status, method
            )));
        }

        let json: RpcResponse<T> = response.json().await?;

        if let Some(error) = json.error {
            return Err(AppError::rpc_error(format!(
                "RPC error: {} (code: {})",
                error.message, error.code
            )));
        }

        Ok(json.result)
    }
}

impl ChainRpc for RpcProvider {
    async fn chain_id(&self) -> AppResult<u64> {
        let id: U64 = self.call("eth_chainId", serde_json::json!([])).await?;
        Ok(id.to::<u64>())
    }

    async fn client_version(&self) -> AppResult<String> {
        self.call("web3_clientVersion", serde_json::json!([])).await
    }

    async fn block_by_number(&self, block: BlockNumberOrTag) -> AppResult<Option<RpcBlock>> {
        self.call_optional("eth_getBlockByNumber", serde_json::json!([block, false]))
            .await
    }

    async fn transaction_by_hash(&self, hash: B256) -> AppResult<Option<RpcTransaction>> {
        self.call_optional("eth_getTransactionByHash", serde_json::json!([hash]))
            .await
    }

    async fn transaction_receipt(&self, hash: B256) -> AppResult<Option<RpcReceipt>> {
        self.call_optional("eth_getTransactionReceipt", serde_json::json!([hash]))
            .await
    }

    async fn balance(&self, address: Address) -> AppResult<U256> {
        self.call("eth_getBalance", serde_json::json!([address, "latest"]))
            .await
    }

    async fn gas_price(&self) -> AppResult<U256> {
        self.call("eth_gasPrice", serde_json::json!([])).await
    }

    async fn sync_state(&self) -> AppResult<SyncState> {
        let raw: serde_json::Value = self.call("eth_syncing", serde_json::json!([])).await?;
        parse_sync_state(raw)
    }

    async fn peer_count(&self) -> AppResult<u64> {
        let peers: U64 = self.call("net_peerCount", serde_json::json!([])).await?;
        Ok(peers.to::<u64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_block_tag_params() {
        let latest = serde_json::json!([BlockNumberOrTag::Latest, false]);
        assert_eq!(latest, serde_json::json!(["latest", false]));

        let numbered = serde_json::json!([BlockNumberOrTag::Number(255), false]);
        assert_eq!(numbered, serde_json::json!(["0xff", false]));
    }

    #[test]
    fn test_timeout_is_capped() {
        let provider = RpcProvider::new("http://127.0.0.1:8545", Duration::from_secs(600));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().url(), "http://127.0.0.1:8545");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let provider = RpcProvider::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = provider.chain_id().await.unwrap_err();
        assert!(
            matches!(err.code, ErrorCode::RpcConnectionFailed | ErrorCode::RpcTimeout),
            "unexpected code: {}",
            err
        );
    }
}
