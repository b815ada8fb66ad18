//! End-to-end flows through the service and UI state, against an in-memory
//! ledger standing in for the wallet extension and the fullnode.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use marketplace_gui::aptos_client::{ChainClient, ClientError, TransactionOutcome};
use marketplace_gui::errors::AbortReason;
use marketplace_gui::events::{ServiceEvent, UiEvent};
use marketplace_gui::marketplace::{AccountResource, EntryFunctionPayload, NftDraft};
use marketplace_gui::service::MarketplaceService;
use marketplace_gui::state::{AppState, ViewState, LISTED_MESSAGE, PURCHASED_MESSAGE};
use marketplace_gui::wallet::{PendingTransaction, WalletAccount, WalletError, WalletProvider};
use tokio::sync::mpsc;

const MODULE: &str = "0xe9c0c69b92cd4937ee32cefb571cb7ad10d155edfbabdfe0d65bef7771a9d1d6";
const ALICE: &str = "0xaa11";
const BOB: &str = "0xbb22";

#[derive(Debug, Clone)]
struct Listing {
    name: String,
    price: u64,
    is_listed: bool,
}

/// Listings keyed by creator, plus per-transaction outcomes.
#[derive(Default)]
struct Ledger {
    listings: BTreeMap<String, Listing>,
    balances: BTreeMap<String, u64>,
    outcomes: BTreeMap<String, Result<(), String>>,
    submitted: Vec<EntryFunctionPayload>,
    fetches: usize,
    reject_signing: bool,
}

type Shared = Arc<Mutex<Ledger>>;

struct FakeWallet {
    account: String,
    ledger: Shared,
}

#[async_trait::async_trait]
impl WalletProvider for FakeWallet {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        Ok(WalletAccount {
            address: self.account.clone(),
            public_key: None,
        })
    }

    async fn sign_and_submit_transaction(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, WalletError> {
        let mut ledger = self.ledger.lock().unwrap();
        if ledger.reject_signing {
            return Err(WalletError::Rejected(
                "The user rejected the request".to_string(),
            ));
        }
        ledger.submitted.push(payload.clone());
        let hash = format!("0x{:x}", ledger.submitted.len());
        let args = payload.string_arguments();

        let outcome = if payload.function.ends_with("::list_nft") {
            let price = args[1].parse().unwrap();
            ledger.listings.insert(
                self.account.clone(),
                Listing {
                    name: args[0].clone(),
                    price,
                    is_listed: true,
                },
            );
            Ok(())
        } else {
            let creator = args[0].clone();
            let balance = ledger.balances.get(&self.account).copied().unwrap_or(0);
            match ledger.listings.get_mut(&creator) {
                Some(l) if !l.is_listed => Err("ENFT_NOT_LISTED(0x2)".to_string()),
                None => Err("ENFT_NOT_LISTED(0x2)".to_string()),
                Some(l) if balance < l.price => Err("EINSUFFICIENT_FUNDS(0x3)".to_string()),
                Some(l) => {
                    l.is_listed = false;
                    Ok(())
                }
            }
        };
        ledger.outcomes.insert(hash.clone(), outcome);
        Ok(PendingTransaction { hash })
    }
}

struct FakeChain {
    ledger: Shared,
}

#[async_trait::async_trait]
impl ChainClient for FakeChain {
    async fn get_account_resources(
        &self,
        address: &str,
    ) -> Result<Vec<AccountResource>, ClientError> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.fetches += 1;
        let mut resources = vec![AccountResource {
            resource_type: "0x1::account::Account".to_string(),
            data: serde_json::json!({"sequence_number": "0"}),
        }];
        if let Some(l) = ledger.listings.get(address) {
            resources.push(AccountResource {
                resource_type: format!("{}::SimpleMarketplace::ListedNFT", MODULE),
                data: serde_json::json!({
                    "creator": address,
                    "price": l.price.to_string(),
                    "name": l.name,
                    "is_listed": l.is_listed,
                }),
            });
        }
        Ok(resources)
    }

    async fn wait_for_transaction(&self, hash: &str) -> Result<TransactionOutcome, ClientError> {
        let ledger = self.ledger.lock().unwrap();
        match ledger.outcomes.get(hash) {
            Some(Ok(())) => Ok(TransactionOutcome {
                hash: hash.to_string(),
                version: Some(1),
                vm_status: "Executed successfully".to_string(),
            }),
            Some(Err(code)) => {
                let vm_status = format!("Move abort in {}::SimpleMarketplace: {}: ", MODULE, code);
                Err(ClientError::TransactionFailed {
                    hash: hash.to_string(),
                    abort: AbortReason::from_vm_status(&vm_status),
                    vm_status,
                })
            }
            None => Err(ClientError::Timeout(hash.to_string())),
        }
    }
}

struct Harness {
    service: MarketplaceService<FakeWallet, FakeChain>,
    events: mpsc::UnboundedReceiver<ServiceEvent>,
    state: AppState,
}

impl Harness {
    fn new(account: &str, ledger: Shared) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = MarketplaceService::new(
            tx,
            Some(FakeWallet {
                account: account.to_string(),
                ledger: ledger.clone(),
            }),
            FakeChain { ledger },
            MODULE.to_string(),
        );
        Self {
            service,
            events: rx,
            state: AppState::default(),
        }
    }

    /// What a view does on click, followed by the service handling it and the
    /// UI applying every resulting event.
    async fn act(&mut self, event: UiEvent) {
        match event {
            UiEvent::ListNft { .. } | UiEvent::BuyNft { .. } => self.state.begin_action(),
            UiEvent::ConnectWallet => self.state.begin_connect(),
            _ => {}
        }
        self.service.handle(event).await;
        while let Ok(e) = self.events.try_recv() {
            self.state.apply(e);
        }
    }
}

#[tokio::test]
async fn test_list_flow_submits_minor_units_and_resets_form() {
    let ledger = Shared::default();
    let mut ui = Harness::new(ALICE, ledger.clone());

    assert_eq!(ui.state.view_state(), ViewState::Disconnected);
    assert!(!ui.state.can_list());

    ui.act(UiEvent::ConnectWallet).await;
    assert_eq!(ui.state.wallet_address, ALICE);
    assert_eq!(ui.state.view_state(), ViewState::ConnectedIdle);
    assert!(ui.state.nfts.is_empty());

    ui.state.draft = NftDraft {
        name: "Art1".to_string(),
        price: 1.50,
    };
    let (name, price) = (ui.state.draft.name.clone(), ui.state.draft.price);
    ui.act(UiEvent::ListNft { name, price }).await;

    let ledger = ledger.lock().unwrap();
    assert_eq!(ledger.submitted.len(), 1);
    assert_eq!(ledger.submitted[0].string_arguments(), vec!["Art1", "150"]);
    // One fetch on connect, one after confirmation
    assert_eq!(ledger.fetches, 2);

    assert_eq!(ui.state.draft, NftDraft::default());
    assert_eq!(ui.state.success.as_deref(), Some(LISTED_MESSAGE));
    assert!(ui.state.error.is_none());
    assert_eq!(ui.state.nfts.len(), 1);
    assert_eq!(ui.state.nfts[0].format_price(), "1.50 APT");
    // Own listing never offers a buy control
    assert!(!ui.state.can_buy(&ui.state.nfts[0]));
}

#[tokio::test]
async fn test_purchase_flips_listing_to_sold() {
    let ledger = Shared::default();
    ledger.lock().unwrap().listings.insert(
        BOB.to_string(),
        Listing {
            name: "Art2".to_string(),
            price: 250,
            is_listed: true,
        },
    );
    ledger.lock().unwrap().balances.insert(ALICE.to_string(), 1_000);

    let mut ui = Harness::new(ALICE, ledger.clone());
    ui.act(UiEvent::ConnectWallet).await;
    ui.act(UiEvent::BuyNft {
        creator: BOB.to_string(),
    })
    .await;

    assert_eq!(ui.state.success.as_deref(), Some(PURCHASED_MESSAGE));
    assert!(!ui.state.loading);

    // The creator's own view now shows the item as sold, with nothing to buy.
    let mut bob = Harness::new(BOB, ledger);
    bob.act(UiEvent::ConnectWallet).await;
    assert_eq!(bob.state.nfts.len(), 1);
    assert_eq!(bob.state.nfts[0].status_label(), "Sold");
    assert!(bob.state.nfts.iter().all(|n| !bob.state.can_buy(n)));
}

#[tokio::test]
async fn test_purchase_errors_are_classified() {
    let ledger = Shared::default();
    ledger.lock().unwrap().listings.insert(
        BOB.to_string(),
        Listing {
            name: "Art2".to_string(),
            price: 250,
            is_listed: true,
        },
    );

    let mut ui = Harness::new(ALICE, ledger.clone());
    ui.act(UiEvent::ConnectWallet).await;

    ui.act(UiEvent::BuyNft {
        creator: BOB.to_string(),
    })
    .await;
    assert_eq!(
        ui.state.error.as_deref(),
        Some("Insufficient funds to purchase this NFT")
    );
    assert!(!ui.state.loading);

    ledger.lock().unwrap().listings.get_mut(BOB).unwrap().is_listed = false;
    ui.act(UiEvent::BuyNft {
        creator: BOB.to_string(),
    })
    .await;
    assert_eq!(
        ui.state.error.as_deref(),
        Some("This NFT is no longer listed for sale")
    );
}

#[tokio::test]
async fn test_listing_failure_keeps_draft() {
    let ledger = Shared::default();
    let mut ui = Harness::new(ALICE, ledger.clone());
    ui.act(UiEvent::ConnectWallet).await;

    ledger.lock().unwrap().reject_signing = true;
    ui.state.draft = NftDraft {
        name: "Art1".to_string(),
        price: 3.0,
    };
    let draft = ui.state.draft.clone();
    ui.act(UiEvent::ListNft {
        name: draft.name.clone(),
        price: draft.price,
    })
    .await;

    assert_eq!(ui.state.draft, draft);
    assert_eq!(
        ui.state.error.as_deref(),
        Some("The user rejected the request")
    );
    assert!(ui.state.success.is_none());
    assert_eq!(ui.state.view_state(), ViewState::ConnectedIdle);
    assert!(ledger.lock().unwrap().listings.is_empty());
}
