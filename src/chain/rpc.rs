// JSON-RPC client for the chain endpoint
//
// Only `eth_call` is needed: every contract interaction is a read-only view.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::Address;

/// Errors raised while talking to the RPC endpoint
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("rate limit exceeded (HTTP 429)")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(StatusCode),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Empty response")]
    EmptyResponse,
}

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: String,
    params: serde_json::Value,
    id: u64,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: serde_json::Value,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// `eth_call` transaction object
#[derive(Debug, Serialize)]
struct CallRequest {
    to: String,
    data: String,
}

/// RPC client for an Ethereum-compatible endpoint
pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create new RPC client
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    /// Get next request ID
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Make a JSON-RPC call
    pub async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: method.to_string(),
            params,
            id: self.next_id(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::RateLimited);
        }
        if !status.is_success() {
            return Err(RpcError::Http(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::Network(e.to_string()))?;

        parse_response(&body)
    }

    /// Execute a read-only call against `to` at the latest block
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, RpcError> {
        let call = CallRequest {
            to: to.to_checksum(None),
            data: format!("0x{}", hex::encode(data)),
        };

        let result: String = self
            .call("eth_call", serde_json::json!([call, "latest"]))
            .await?;

        decode_hex(&result)
    }
}

/// Decode a JSON-RPC response body into its result
fn parse_response<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T, RpcError> {
    let response: JsonRpcResponse<T> =
        serde_json::from_slice(body).map_err(|e| RpcError::Parse(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response.result.ok_or(RpcError::EmptyResponse)
}

/// Decode `0x`-prefixed hex returned by the node
pub fn decode_hex(value: &str) -> Result<Vec<u8>, RpcError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped).map_err(|e| RpcError::Parse(format!("invalid hex result: {}", e)))
}
