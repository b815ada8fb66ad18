//! Application state — plain data, no async, no Arc.
//!
//! `AppState` holds everything the UI needs to render. The service task sends
//! `ServiceEvent`s which are applied via `AppState::apply()`. The UI reads
//! fields directly — no locking, no channels.

use chrono::{DateTime, Local};

use crate::events::ServiceEvent;
use crate::marketplace::{same_address, Nft, NftDraft};

pub const LISTED_MESSAGE: &str = "NFT listed successfully!";
pub const PURCHASED_MESSAGE: &str = "NFT purchased successfully!";

/// Coarse view states. Errors are carried alongside any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Disconnected,
    ConnectedIdle,
    ConnectedSubmitting,
}

/// All application state needed for rendering.
#[derive(Debug, Default)]
pub struct AppState {
    // -- Session --
    /// Connected wallet address; empty when disconnected.
    pub wallet_address: String,
    pub connecting: bool,

    // -- Listings --
    pub nfts: Vec<Nft>,
    pub last_refreshed: Option<DateTime<Local>>,

    // -- List form --
    pub draft: NftDraft,

    // -- Action status --
    /// Advisory: disables submit/buy buttons while a transaction is in flight.
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl AppState {
    pub fn is_connected(&self) -> bool {
        !self.wallet_address.is_empty()
    }

    pub fn view_state(&self) -> ViewState {
        if !self.is_connected() {
            ViewState::Disconnected
        } else if self.loading {
            ViewState::ConnectedSubmitting
        } else {
            ViewState::ConnectedIdle
        }
    }

    /// Called by views right before they emit a list or buy command.
    pub fn begin_action(&mut self) {
        self.error = None;
        self.success = None;
        self.loading = true;
    }

    /// Called by the gallery before it emits a refresh command.
    pub fn begin_refresh(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Called by the header before it emits a connect command.
    pub fn begin_connect(&mut self) {
        self.error = None;
        self.success = None;
        self.connecting = true;
    }

    /// The list form is only offered to a connected wallet.
    pub fn can_list(&self) -> bool {
        self.is_connected()
    }

    pub fn can_submit_listing(&self) -> bool {
        self.can_list()
            && !self.loading
            && !self.draft.name.trim().is_empty()
            && self.draft.price.is_finite()
            && self.draft.price >= 0.0
    }

    /// A buy control is offered for listed items not created by this wallet.
    pub fn can_buy(&self, nft: &Nft) -> bool {
        self.is_connected() && nft.is_listed && !same_address(&nft.creator, &self.wallet_address)
    }

    /// Apply a service event to update state. Pure state-machine transition.
    pub fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::WalletConnected { address } => {
                self.wallet_address = address;
                self.connecting = false;
            }

            ServiceEvent::ListingsUpdated(nfts) => {
                self.nfts = nfts;
                self.last_refreshed = Some(Local::now());
            }

            ServiceEvent::NftListed => {
                self.draft = NftDraft::default();
                self.loading = false;
                self.success = Some(LISTED_MESSAGE.to_string());
            }

            ServiceEvent::NftPurchased => {
                self.loading = false;
                self.success = Some(PURCHASED_MESSAGE.to_string());
            }

            ServiceEvent::Error(msg) => {
                self.error = Some(msg);
                self.loading = false;
                self.connecting = false;
            }
        }
    }
}
