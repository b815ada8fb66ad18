//! Wallet provider
//!
//! The wallet extension owns the keys; this client only asks it to connect and
//! to sign-and-submit entry-function payloads. The extension is reached through
//! a local bridge speaking JSON-RPC 2.0 over HTTP, exposing the same two
//! methods the injected browser object does (`connect`, `signAndSubmitTransaction`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::{normalize_endpoint, Config};
use crate::marketplace::EntryFunctionPayload;

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// JSON-RPC error code the extension uses when the user declines a prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Account returned by a successful `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WalletAccount {
    pub address: String,
    #[serde(default, rename = "publicKey")]
    pub public_key: Option<String>,
}

/// Submitted, not yet confirmed, transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// Identity and signing capability of a wallet extension.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to connect. May wait on the extension's approval prompt.
    async fn connect(&self) -> Result<WalletAccount, WalletError>;

    /// Sign the payload with the connected account and submit it to the chain.
    async fn sign_and_submit_transaction(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError>;
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Wallet extension reached through its local JSON-RPC bridge.
#[derive(Debug, Clone)]
pub struct WalletBridge {
    endpoint: String,
    client: Client,
}

impl WalletBridge {
    /// One-shot presence check: a wallet is installed when a bridge endpoint
    /// is configured.
    pub fn detect(config: &Config) -> Result<Option<Self>, WalletError> {
        let Some(endpoint) = config.wallet_url() else {
            return Ok(None);
        };
        log::info!("👛 Wallet bridge configured at {}", endpoint);
        Self::new(endpoint.to_string()).map(Some)
    }

    pub fn new(endpoint: String) -> Result<Self, WalletError> {
        let endpoint = normalize_endpoint(&endpoint);

        // No request timeout: calls wait on the user's approval in the extension.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: REQUEST_ID.fetch_add(1, Ordering::Relaxed).to_string(),
            method,
            params,
        };

        log::debug!("→ wallet {}: {:?}", method, request.params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WalletError::Http(response.status().as_u16()));
        }

        let rpc_response: JsonRpcResponse = response.json().await.map_err(|e| {
            WalletError::InvalidResponse(format!("Failed to parse wallet response: {}", e))
        })?;

        into_result(rpc_response)
    }
}

fn into_result(response: JsonRpcResponse) -> Result<serde_json::Value, WalletError> {
    if let Some(error) = response.error {
        if error.code == USER_REJECTED_CODE {
            return Err(WalletError::Rejected(error.message));
        }
        return Err(WalletError::Rpc(error.code, error.message));
    }

    response
        .result
        .ok_or_else(|| WalletError::InvalidResponse("No result in wallet response".into()))
}

#[async_trait]
impl WalletProvider for WalletBridge {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        let result = self.rpc_call("connect", serde_json::json!([])).await?;
        let account: WalletAccount = serde_json::from_value(result)?;
        log::info!("✅ Wallet connected: {}", account.address);
        Ok(account)
    }

    async fn sign_and_submit_transaction(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError> {
        let result = self
            .rpc_call(
                "signAndSubmitTransaction",
                serde_json::json!([payload]),
            )
            .await?;
        let pending: PendingTransaction = serde_json::from_value(result)?;
        log::info!("📤 Transaction submitted: {}", pending.hash);
        Ok(pending)
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The user declined in the extension.
    #[error("{0}")]
    Rejected(String),

    #[error("Wallet bridge HTTP error {0}")]
    Http(u16),

    #[error("Wallet bridge unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{1}")]
    Rpc(i64, String),

    #[error("Invalid wallet response: {0}")]
    InvalidResponse(String),

    #[error("Invalid wallet response: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> JsonRpcResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_detect_requires_endpoint() {
        let config = Config::default();
        assert!(WalletBridge::detect(&config).unwrap().is_none());

        let config = Config {
            wallet_endpoint: Some("http://127.0.0.1:8765".to_string()),
            ..Config::default()
        };
        let bridge = WalletBridge::detect(&config).unwrap().unwrap();
        assert_eq!(bridge.endpoint(), "http://127.0.0.1:8765");
    }

    #[test]
    fn test_bare_endpoint_gets_scheme() {
        let bridge = WalletBridge::new("127.0.0.1:8765".to_string()).unwrap();
        assert_eq!(bridge.endpoint(), "http://127.0.0.1:8765");
    }

    #[test]
    fn test_user_rejection_code() {
        let err = into_result(response(serde_json::json!({
            "jsonrpc": "2.0",
            "id": "1",
            "error": {"code": 4001, "message": "The user rejected the request"}
        })))
        .unwrap_err();
        assert!(matches!(err, WalletError::Rejected(_)));
        assert_eq!(err.to_string(), "The user rejected the request");
    }

    #[test]
    fn test_other_rpc_error_keeps_message() {
        let err = into_result(response(serde_json::json!({
            "error": {"code": -32000, "message": "Move abort: ENFT_NOT_LISTED"}
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "Move abort: ENFT_NOT_LISTED");
    }

    #[test]
    fn test_missing_result() {
        let err = into_result(response(serde_json::json!({"jsonrpc": "2.0"}))).unwrap_err();
        assert!(matches!(err, WalletError::InvalidResponse(_)));
    }

    #[test]
    fn test_account_deserialization() {
        let account: WalletAccount = serde_json::from_value(serde_json::json!({
            "address": "0xaa",
            "publicKey": "0xbb"
        }))
        .unwrap();
        assert_eq!(account.address, "0xaa");
        assert_eq!(account.public_key.as_deref(), Some("0xbb"));
    }
}
