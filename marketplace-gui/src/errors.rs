//! Service-level errors and their user-facing messages.
//!
//! Every failure is turned into one display string at the action boundary in
//! the service. Purchase failures are classified first from the structured
//! Move abort status, and only then by searching the raw message text.

use crate::aptos_client::ClientError;
use crate::marketplace::{DecodeError, PriceError};
use crate::wallet::WalletError;

/// Marketplace abort codes the UI has a dedicated message for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NftNotListed,
    InsufficientFunds,
}

impl AbortReason {
    pub fn code_name(&self) -> &'static str {
        match self {
            AbortReason::NftNotListed => "ENFT_NOT_LISTED",
            AbortReason::InsufficientFunds => "EINSUFFICIENT_FUNDS",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AbortReason::NftNotListed => "This NFT is no longer listed for sale",
            AbortReason::InsufficientFunds => "Insufficient funds to purchase this NFT",
        }
    }

    fn from_code_name(name: &str) -> Option<Self> {
        match name {
            "ENFT_NOT_LISTED" => Some(AbortReason::NftNotListed),
            "EINSUFFICIENT_FUNDS" => Some(AbortReason::InsufficientFunds),
            _ => None,
        }
    }

    /// Parse a committed transaction's `vm_status`, e.g.
    /// `Move abort in 0xe9c0..::SimpleMarketplace: ENFT_NOT_LISTED(0x2): `.
    pub fn from_vm_status(vm_status: &str) -> Option<Self> {
        let rest = vm_status.trim().strip_prefix("Move abort in ")?;
        let (location, detail) = rest.split_once(": ")?;
        if !location.ends_with(crate::marketplace::MODULE_NAME) {
            return None;
        }
        let code = detail.split('(').next()?.trim();
        Self::from_code_name(code)
    }

    /// Substring fallback for errors that carry no structured status.
    pub fn detect(message: &str) -> Option<Self> {
        [AbortReason::NftNotListed, AbortReason::InsufficientFunds]
            .into_iter()
            .find(|reason| message.contains(reason.code_name()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Petra wallet not found")]
    WalletNotInstalled,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("{0}")]
    Wallet(#[from] WalletError),

    #[error("{0}")]
    Chain(#[from] ClientError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Price(#[from] PriceError),

    #[error("{0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Structured abort reason, when the chain reported one.
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            ServiceError::Chain(ClientError::TransactionFailed { abort, .. }) => *abort,
            _ => None,
        }
    }
}

/// Message shown when a listing submission fails: the failure text as-is.
pub fn listing_error_message(err: &ServiceError) -> String {
    err.to_string()
}

/// Message shown when a purchase fails.
pub fn purchase_error_message(err: &ServiceError) -> String {
    let raw = err.to_string();
    match err.abort_reason().or_else(|| AbortReason::detect(&raw)) {
        Some(reason) => reason.message().to_string(),
        None => raw,
    }
}
