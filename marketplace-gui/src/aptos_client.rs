//! Aptos fullnode REST client
//!
//! Read side of the marketplace: account resources for listing queries, and
//! transaction lookups to wait for a submitted transaction to commit.
//! Endpoints are relative to the fullnode's `/v1` base URL.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::errors::AbortReason;
use crate::marketplace::AccountResource;

/// How often a pending transaction is re-checked.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub hash: String,
    pub version: Option<u64>,
    pub vm_status: String,
}

/// Chain reads the marketplace needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// All resources stored under `address`, in the order the node returns them.
    async fn get_account_resources(
        &self,
        address: &str,
    ) -> Result<Vec<AccountResource>, ClientError>;

    /// Wait until `hash` commits. A committed but failed transaction is an error.
    async fn wait_for_transaction(&self, hash: &str) -> Result<TransactionOutcome, ClientError>;
}

#[derive(Debug, Clone)]
pub struct AptosClient {
    base_url: String,
    client: Client,
    wait_timeout: Duration,
}

/// Subset of the REST transaction object used to decide commit status.
#[derive(Debug, Deserialize)]
struct TransactionView {
    #[serde(rename = "type")]
    tx_type: String,
    hash: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl AptosClient {
    pub fn new(base_url: String, wait_timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        log::info!("📡 Aptos REST client initialized: {}", base_url);

        Ok(Self {
            base_url,
            client,
            wait_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str) -> Result<Option<serde_json::Value>, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("→ GET {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::http(status, &body));
        }

        let value = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e))
        })?;
        Ok(Some(value))
    }
}

/// Interpret a transaction lookup. `Ok(None)` means still pending.
fn parse_transaction(value: serde_json::Value) -> Result<Option<TransactionOutcome>, ClientError> {
    let tx: TransactionView = serde_json::from_value(value)?;
    if tx.tx_type == "pending_transaction" {
        return Ok(None);
    }

    let vm_status = tx.vm_status.unwrap_or_default();
    if tx.success != Some(true) {
        let abort = AbortReason::from_vm_status(&vm_status);
        return Err(ClientError::TransactionFailed {
            hash: tx.hash,
            vm_status,
            abort,
        });
    }

    Ok(Some(TransactionOutcome {
        hash: tx.hash,
        version: tx.version.and_then(|v| v.parse().ok()),
        vm_status,
    }))
}

#[async_trait]
impl ChainClient for AptosClient {
    async fn get_account_resources(
        &self,
        address: &str,
    ) -> Result<Vec<AccountResource>, ClientError> {
        let path = format!("/accounts/{}/resources", address);
        match self.get_json(&path).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Err(ClientError::AccountNotFound(address.to_string())),
        }
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<TransactionOutcome, ClientError> {
        let path = format!("/transactions/by_hash/{}", hash);
        let outcome = poll_until_committed(hash, self.wait_timeout, || self.get_json(&path)).await?;
        log::info!(
            "✅ Transaction {} committed at version {:?}",
            outcome.hash,
            outcome.version
        );
        Ok(outcome)
    }
}

/// Re-run `lookup` every [`POLL_INTERVAL`] until the transaction commits or
/// `timeout` runs out. A lookup yielding `None` (HTTP 404) means the node has
/// not indexed the transaction yet.
async fn poll_until_committed<F, Fut>(
    hash: &str,
    timeout: Duration,
    mut lookup: F,
) -> Result<TransactionOutcome, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<serde_json::Value>, ClientError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        if let Some(value) = lookup().await? {
            if let Some(outcome) = parse_transaction(value)? {
                return Ok(outcome);
            }
        }

        if tokio::time::Instant::now() + POLL_INTERVAL > deadline {
            log::warn!("⏱ Gave up waiting for transaction {}", hash);
            return Err(ClientError::Timeout(hash.to_string()));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Timed out waiting for transaction {0}")]
    Timeout(String),

    #[error("Transaction {hash} failed: {vm_status}")]
    TransactionFailed {
        hash: String,
        vm_status: String,
        abort: Option<AbortReason>,
    },
}

impl ClientError {
    /// Build an HTTP error, preferring the node's own `message` field.
    pub fn http(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct NodeError {
            message: String,
        }

        let message = serde_json::from_str::<NodeError>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| match status {
                400 => "Bad Request".to_string(),
                429 => "Too Many Requests".to_string(),
                500 => "Internal Server Error".to_string(),
                503 => "Service Unavailable".to_string(),
                _ => "Unknown Error".to_string(),
            });
        Self::Http(status, message)
    }
}
