//! Event types for communication between UI and service task.
//!
//! These two enums are the *only* interface between the synchronous egui render
//! loop and the asynchronous service task. No shared state, no Arc, no Mutex.

use crate::marketplace::Nft;

// ============================================================================
// UI → Service
// ============================================================================

/// Commands sent from the UI thread to the background service task.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Ask the wallet extension to connect.
    ConnectWallet,

    /// Re-fetch listings for the connected address.
    RefreshListings,

    /// Submit a `list_nft` transaction. `price` is in APT as entered.
    ListNft { name: String, price: f64 },

    /// Submit a `buy_nft` transaction for the listing created by `creator`.
    BuyNft { creator: String },

    /// Clean shutdown.
    Shutdown,
}

// ============================================================================
// Service → UI
// ============================================================================

/// Events sent from the service task back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    /// Wallet connected; `address` is now the session identity.
    WalletConnected { address: String },

    /// Full replacement of the displayed listing set.
    ListingsUpdated(Vec<Nft>),

    /// `list_nft` confirmed on chain.
    NftListed,

    /// `buy_nft` confirmed on chain.
    NftPurchased,

    /// Error to display in the banner. Ends any in-flight action.
    Error(String),
}
