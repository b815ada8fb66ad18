//! Background service task — single `select!` loop, no sleeps of its own.
//!
//! The service owns all async I/O. It receives [`UiEvent`]s from the UI thread,
//! drives the wallet provider and chain client, and sends [`ServiceEvent`]s back.
//! Each command runs to completion before the next one is read, so actions are
//! applied in the order the user issued them.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use std::time::Duration;

use crate::aptos_client::{AptosClient, ChainClient, TransactionOutcome};
use crate::config::Config;
use crate::errors::{listing_error_message, purchase_error_message, ServiceError};
use crate::events::{ServiceEvent, UiEvent};
use crate::marketplace::{
    buy_nft_payload, decode_listings, list_nft_payload, same_address, to_minor_units,
    EntryFunctionPayload, Nft,
};
use crate::wallet::{WalletBridge, WalletProvider};

pub const WALLET_NOT_INSTALLED: &str =
    "Petra wallet not installed. Please install Petra wallet extension.";
pub const WALLET_NOT_INSTALLED_SHORT: &str = "Petra wallet not installed";
pub const CONNECT_FAILED: &str = "Failed to connect wallet. Please try again.";
pub const FETCH_FAILED: &str = "Failed to fetch listed NFTs";

/// Page controller: session identity plus the two external collaborators.
pub struct MarketplaceService<W, C> {
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    wallet: Option<W>,
    chain: C,
    module_address: String,
    address: Option<String>,
}

impl<W: WalletProvider, C: ChainClient> MarketplaceService<W, C> {
    pub fn new(
        svc_tx: mpsc::UnboundedSender<ServiceEvent>,
        wallet: Option<W>,
        chain: C,
        module_address: String,
    ) -> Self {
        Self {
            svc_tx,
            wallet,
            chain,
            module_address,
            address: None,
        }
    }

    /// Connected wallet address, if any.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn emit(&self, event: ServiceEvent) {
        let _ = self.svc_tx.send(event);
    }

    fn wallet(&self) -> Result<&W, ServiceError> {
        self.wallet.as_ref().ok_or(ServiceError::WalletNotInstalled)
    }

    fn connected_address(&self) -> Result<String, ServiceError> {
        self.address.clone().ok_or(ServiceError::NotConnected)
    }

    /// Startup check. Reports a missing wallet once; never retries.
    pub fn check_wallet_presence(&self) -> bool {
        if self.wallet.is_none() {
            log::warn!("👛 No wallet extension detected");
            self.emit(ServiceEvent::Error(WALLET_NOT_INSTALLED.to_string()));
            return false;
        }
        true
    }

    pub async fn connect(&mut self) {
        let Some(wallet) = self.wallet.as_ref() else {
            self.emit(ServiceEvent::Error(WALLET_NOT_INSTALLED_SHORT.to_string()));
            return;
        };

        let result = wallet.connect().await;
        match result {
            Ok(account) => {
                log::info!("🔗 Connected as {}", account.address);
                self.address = Some(account.address.clone());
                self.emit(ServiceEvent::WalletConnected {
                    address: account.address.clone(),
                });
                self.fetch_listings(&account.address).await;
            }
            Err(e) => {
                log::error!("Error connecting wallet: {}", e);
                self.emit(ServiceEvent::Error(CONNECT_FAILED.to_string()));
            }
        }
    }

    async fn query_listings(&self, address: &str) -> Result<Vec<Nft>, ServiceError> {
        let resources = self.chain.get_account_resources(address).await?;
        Ok(decode_listings(&resources)?)
    }

    /// Replace the displayed listing set with the listings stored at `address`.
    /// On failure the previous set stays on screen. Returns whether it succeeded.
    pub async fn fetch_listings(&self, address: &str) -> bool {
        match self.query_listings(address).await {
            Ok(nfts) => {
                log::info!("📋 {} listings at {}", nfts.len(), address);
                self.emit(ServiceEvent::ListingsUpdated(nfts));
                true
            }
            Err(e) => {
                log::error!("Error fetching NFTs: {}", e);
                self.emit(ServiceEvent::Error(FETCH_FAILED.to_string()));
                false
            }
        }
    }

    /// Re-fetch the connected address's listings. No-op while disconnected.
    pub async fn refresh(&self) {
        if let Some(address) = self.address.clone() {
            self.fetch_listings(&address).await;
        }
    }

    /// Sign, submit and wait for finality.
    async fn submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<TransactionOutcome, ServiceError> {
        let wallet = self.wallet()?;
        log::info!("✍ Requesting signature for {}", payload.function);
        let pending = wallet.sign_and_submit_transaction(payload).await?;
        let outcome = self.chain.wait_for_transaction(&pending.hash).await?;
        Ok(outcome)
    }

    async fn try_list_nft(
        &self,
        name: &str,
        price: f64,
    ) -> Result<(String, TransactionOutcome), ServiceError> {
        self.wallet()?;
        let address = self.connected_address()?;
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("NFT name is required".to_string()));
        }
        let price_minor = to_minor_units(price)?;

        let payload = list_nft_payload(&self.module_address, name, price_minor);
        let outcome = self.submit(&payload).await?;
        Ok((address, outcome))
    }

    /// List a new NFT for the connected wallet. The UI keeps its draft on failure.
    pub async fn list_nft(&self, name: String, price: f64) {
        match self.try_list_nft(&name, price).await {
            Ok((address, outcome)) => {
                log::info!(
                    "🖼 Listed \"{}\" for {} APT (tx {}, version {:?}, {})",
                    name,
                    price,
                    outcome.hash,
                    outcome.version,
                    outcome.vm_status
                );
                self.fetch_listings(&address).await;
                self.emit(ServiceEvent::NftListed);
            }
            Err(e) => {
                log::error!("Error listing NFT: {}", e);
                self.emit(ServiceEvent::Error(listing_error_message(&e)));
            }
        }
    }

    async fn try_buy_nft(
        &self,
        creator: &str,
    ) -> Result<(String, TransactionOutcome), ServiceError> {
        self.wallet()?;
        let address = self.connected_address()?;
        if same_address(creator, &address) {
            return Err(ServiceError::InvalidInput(
                "You cannot buy your own NFT".to_string(),
            ));
        }

        let payload = buy_nft_payload(&self.module_address, creator);
        let outcome = self.submit(&payload).await?;
        Ok((address, outcome))
    }

    /// Buy the listing created by `creator`.
    pub async fn buy_nft(&self, creator: String) {
        match self.try_buy_nft(&creator).await {
            Ok((address, outcome)) => {
                log::info!(
                    "🛒 Bought listing from {} (tx {}, version {:?}, {})",
                    creator,
                    outcome.hash,
                    outcome.version,
                    outcome.vm_status
                );
                self.fetch_listings(&address).await;
                self.emit(ServiceEvent::NftPurchased);
            }
            Err(e) => {
                log::error!("Error buying NFT: {}", e);
                self.emit(ServiceEvent::Error(purchase_error_message(&e)));
            }
        }
    }

    /// Handle one UI command. Returns `false` when the loop should stop.
    pub async fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::ConnectWallet => self.connect().await,
            UiEvent::RefreshListings => self.refresh().await,
            UiEvent::ListNft { name, price } => self.list_nft(name, price).await,
            UiEvent::BuyNft { creator } => self.buy_nft(creator).await,
            UiEvent::Shutdown => return false,
        }
        true
    }
}

/// Run the service loop until the cancellation token fires.
///
/// This is the **only** `tokio::spawn`ed task in the application. It owns the
/// wallet bridge and the Aptos client.
pub async fn run(
    token: CancellationToken,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Config,
) {
    let chain = match AptosClient::new(
        config.fullnode_url(),
        Duration::from_secs(config.wait_timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to create Aptos client: {}", e);
            let _ = svc_tx.send(ServiceEvent::Error(format!(
                "Failed to create Aptos client: {}",
                e
            )));
            return;
        }
    };

    let wallet = WalletBridge::detect(&config).unwrap_or_else(|e| {
        log::error!("Failed to create wallet bridge: {}", e);
        None
    });

    log::info!(
        "🚀 Service loop started ({}: node {}, wallet {})",
        config.network,
        chain.base_url(),
        wallet.as_ref().map_or("not installed", |w| w.endpoint())
    );
    let service = MarketplaceService::new(svc_tx, wallet, chain, config.module_address.clone());
    drive(token, ui_rx, service).await;
}

/// The `select!` loop, generic over the collaborators.
pub async fn drive<W: WalletProvider, C: ChainClient>(
    token: CancellationToken,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    mut service: MarketplaceService<W, C>,
) {
    service.check_wallet_presence();

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                log::info!("🛑 Service loop shutting down");
                break;
            }

            event = ui_rx.recv() => {
                let Some(event) = event else {
                    log::info!("🛑 UI channel closed");
                    break;
                };
                if !service.handle(event).await {
                    log::info!("🛑 Shutdown requested");
                    break;
                }
            }
        }
    }
}
